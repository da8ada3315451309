//! The app switcher screen.

use crate::config::EnvConfig;
use crate::driver::DriverHandle;
use crate::error::{Result, UiError};
use crate::page::{Page, PageContext};

/// Tile on the switcher that routes into the desk.
const DESK_APP_TILE: &str = "a[href='/app']";

/// The `/apps` switcher some deployments show between login and the desk.
#[derive(Debug)]
pub struct AppsPage {
    context: PageContext,
}

impl AppsPage {
    pub fn new(driver: DriverHandle, config: &EnvConfig) -> Self {
        Self {
            context: PageContext::new(driver, config.urls().apps).with_config(config),
        }
    }

    /// Waits for the desk tile and clicks through to the desk. Deployments
    /// without the switcher never render the tile, which surfaces as a
    /// visibility timeout.
    pub fn continue_to_desk(&self) -> Result<()> {
        let timeout = self.context.object_timeout();
        if !self.context.driver().wait_for_visible(DESK_APP_TILE, timeout)? {
            return Err(UiError::VisibilityTimeout {
                locator: DESK_APP_TILE.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }
        self.context.driver().click(DESK_APP_TILE)
    }
}

impl Page for AppsPage {
    fn context(&self) -> &PageContext {
        &self.context
    }
}
