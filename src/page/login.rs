//! The login page and the credential flow into the desk.

use crate::auth::{CredentialProvider, Credentials};
use crate::component::{Component, Input};
use crate::config::EnvConfig;
use crate::driver::DriverHandle;
use crate::error::{Result, UiError};
use crate::page::{AppsPage, HomePage, Page, PageContext};

const USERNAME_INPUT: &str = "#login_email";
const PASSWORD_INPUT: &str = "#login_password";
const LOGIN_BUTTON: &str = ".btn-login";

/// `/login`, plus the flow from credentials to a loaded desk.
#[derive(Debug)]
pub struct LoginPage {
    context: PageContext,
    config: EnvConfig,
    username: Input,
    password: Input,
}

impl LoginPage {
    pub fn new(driver: DriverHandle, config: &EnvConfig) -> Result<Self> {
        let username = Input::from_component(
            Component::new(driver.clone(), USERNAME_INPUT)?
                .with_timeout(config.object_load_timeout),
        );
        let password = Input::from_component(
            Component::new(driver.clone(), PASSWORD_INPUT)?
                .with_timeout(config.object_load_timeout),
        );
        Ok(Self {
            context: PageContext::new(driver, config.urls().login).with_config(config),
            config: config.clone(),
            username,
            password,
        })
    }

    pub fn username(&self) -> &Input {
        &self.username
    }

    pub fn password(&self) -> &Input {
        &self.password
    }

    /// Runs the full login flow and returns the home page it landed on.
    ///
    /// Fails when the credentials are rejected, i.e. the desk home never
    /// loads within the page timeout.
    pub fn login(&self, credentials: &Credentials) -> Result<HomePage> {
        self.context.navigate()?;
        log::info!("logging in as {}", credentials.username);

        self.username.fill(&credentials.username)?;
        self.password.fill(&credentials.password)?;
        self.context.driver().click(LOGIN_BUTTON)?;

        // Multi-app deployments route through the app switcher before the
        // desk; everywhere else the tile never shows up and the login is
        // fine without it.
        let apps = AppsPage::new(self.context.driver().clone(), &self.config);
        if let Err(e) = apps.continue_to_desk() {
            log::warn!("app switcher not taken: {e}");
        }

        let home = HomePage::new(self.context.driver().clone(), &self.config);
        if !home.is_loaded()? {
            return Err(UiError::NavigationFailed(format!(
                "login as {} did not reach {}",
                credentials.username,
                home.context().url()
            )));
        }
        Ok(home)
    }

    /// Resolves `role` through the provider, then logs in.
    pub fn login_by_role(
        &self,
        provider: &dyn CredentialProvider,
        role: &str,
    ) -> Result<HomePage> {
        let credentials = provider.resolve(role)?;
        self.login(&credentials)
    }
}

impl Page for LoginPage {
    fn context(&self) -> &PageContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticCredentials;
    use crate::driver::{MockDriver, MockElement};
    use crate::page::PageState;
    use std::sync::Arc;
    use std::time::Duration;

    const HOME_URL: &str = "https://erp.example.com/app/home";

    fn fast_config() -> EnvConfig {
        EnvConfig {
            base_domain: "https://erp.example.com".to_string(),
            page_load_timeout: Duration::from_millis(10),
            object_load_timeout: Duration::from_millis(10),
            ..EnvConfig::default()
        }
    }

    fn login_form(mock: &MockDriver) {
        mock.add_element(USERNAME_INPUT, MockElement::new());
        mock.add_element(PASSWORD_INPUT, MockElement::new());
        mock.add_element(LOGIN_BUTTON, MockElement::new());
    }

    fn page(mock: &MockDriver) -> LoginPage {
        LoginPage::new(Arc::new(mock.clone()), &fast_config()).unwrap()
    }

    #[test]
    fn login_fills_credentials_and_lands_on_home() {
        let mock = MockDriver::new();
        login_form(&mock);
        mock.redirect_on_click(LOGIN_BUTTON, HOME_URL);

        let home = page(&mock)
            .login(&Credentials::new("admin@example.com", "hunter2"))
            .unwrap();

        assert_eq!(
            mock.fills(),
            vec![
                (USERNAME_INPUT.to_string(), "admin@example.com".to_string()),
                (PASSWORD_INPUT.to_string(), "hunter2".to_string()),
            ]
        );
        assert_eq!(mock.clicks(), vec![LOGIN_BUTTON]);
        assert_eq!(home.state(), PageState::Loaded);
    }

    #[test]
    fn login_takes_the_app_switcher_when_it_appears() {
        let mock = MockDriver::new();
        login_form(&mock);
        mock.add_element("a[href='/app']", MockElement::new());
        mock.redirect_on_click(LOGIN_BUTTON, "https://erp.example.com/apps");
        mock.redirect_on_click("a[href='/app']", HOME_URL);

        let home = page(&mock)
            .login(&Credentials::new("admin@example.com", "hunter2"))
            .unwrap();

        assert_eq!(mock.clicks(), vec![LOGIN_BUTTON, "a[href='/app']"]);
        assert_eq!(home.state(), PageState::Loaded);
    }

    #[test]
    fn rejected_credentials_fail_the_landing_assertion() {
        let mock = MockDriver::new();
        login_form(&mock);
        // No redirect: the click leaves the browser on the login page.

        let err = page(&mock)
            .login(&Credentials::new("admin@example.com", "wrong"))
            .unwrap_err();

        assert!(matches!(err, UiError::NavigationFailed(message)
            if message.contains("admin@example.com")));
        assert_eq!(mock.fills().len(), 2);
    }

    #[test]
    fn login_by_role_resolves_through_the_provider() {
        let mock = MockDriver::new();
        login_form(&mock);
        mock.redirect_on_click(LOGIN_BUTTON, HOME_URL);

        let provider = StaticCredentials::new()
            .with_role("admin", Credentials::new("admin@example.com", "hunter2"));
        page(&mock).login_by_role(&provider, "admin").unwrap();

        assert_eq!(
            mock.fills()[0],
            (USERNAME_INPUT.to_string(), "admin@example.com".to_string())
        );
    }

    #[test]
    fn unknown_role_fails_before_any_interaction() {
        let mock = MockDriver::new();
        login_form(&mock);

        let provider = StaticCredentials::new();
        let err = page(&mock).login_by_role(&provider, "ghost").unwrap_err();

        assert!(matches!(err, UiError::UnknownRole(_)));
        assert_eq!(mock.interaction_count(), 0);
    }
}
