//! The desk landing page.

use crate::config::EnvConfig;
use crate::driver::DriverHandle;
use crate::page::{DESK_READY, Page, PageContext};

/// `/app/home`, the workspace a fresh session lands on.
#[derive(Debug)]
pub struct HomePage {
    context: PageContext,
}

impl HomePage {
    pub fn new(driver: DriverHandle, config: &EnvConfig) -> Self {
        Self {
            context: PageContext::new(driver, config.urls().home)
                .with_config(config)
                .with_ready_condition(DESK_READY),
        }
    }
}

impl Page for HomePage {
    fn context(&self) -> &PageContext {
        &self.context
    }
}
