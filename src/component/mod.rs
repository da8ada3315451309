//! UI component wrappers.
//!
//! A [`Component`] binds a driver handle to a CSS selector and carries the
//! state shared by every control: an optional parent scope, a label that can
//! be assigned once, and an enabled flag that gates all mutating actions.
//! Concrete controls ([`Input`], [`Select`]) embed a `Component` by value and
//! add their own behavior on top.

pub mod input;
pub mod select;

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DEFAULT_OBJECT_LOAD_TIMEOUT_MS;
use crate::driver::DriverHandle;
use crate::error::{Result, UiError};

pub use input::{FillStrategy, Input};
pub use select::{OptionSet, Select, SelectTarget};

/// Something that accepts typed text.
pub trait Fillable {
    fn fill(&self, value: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
    fn value(&self) -> Result<String>;
}

/// Something offering a discrete set of options.
pub trait Selectable {
    fn options(&self) -> Result<&OptionSet>;
    fn select(&self, target: SelectTarget) -> Result<String>;
    fn selected_value(&self) -> Result<String>;
}

/// Base state shared by all UI components.
pub struct Component {
    driver: DriverHandle,
    selector: String,
    parent: Option<Arc<Component>>,
    label: OnceCell<String>,
    enabled: Cell<bool>,
    object_timeout: Duration,
}

impl Component {
    /// Creates a component scoped to the whole document.
    pub fn new(driver: DriverHandle, selector: impl Into<String>) -> Result<Self> {
        Self::build(driver, selector.into(), None)
    }

    /// Creates a component scoped under `parent`; its effective selector is
    /// the parent's selector narrowed by this one.
    pub fn with_parent(
        driver: DriverHandle,
        selector: impl Into<String>,
        parent: Arc<Component>,
    ) -> Result<Self> {
        Self::build(driver, selector.into(), Some(parent))
    }

    fn build(
        driver: DriverHandle,
        selector: String,
        parent: Option<Arc<Component>>,
    ) -> Result<Self> {
        if selector.trim().is_empty() {
            return Err(UiError::InvalidLocator {
                reason: "selector is empty or whitespace".to_string(),
            });
        }
        Ok(Self {
            driver,
            selector,
            parent,
            label: OnceCell::new(),
            enabled: Cell::new(true),
            object_timeout: Duration::from_millis(DEFAULT_OBJECT_LOAD_TIMEOUT_MS),
        })
    }

    /// Overrides the element wait timeout (default 10s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.object_timeout = timeout;
        self
    }

    /// Full CSS selector, including all parent scopes.
    pub fn selector(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{} {}", parent.selector(), self.selector),
            None => self.selector.clone(),
        }
    }

    /// The parent component this one is scoped under.
    pub fn parent(&self) -> Result<&Arc<Component>> {
        self.parent.as_ref().ok_or_else(|| UiError::MissingParent {
            component: self.name(),
        })
    }

    /// Assigns the human-readable label. A label can be set exactly once;
    /// blank labels are rejected.
    pub fn set_label(&self, label: impl Into<String>) -> Result<()> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(UiError::InvalidLocator {
                reason: "label is empty or whitespace".to_string(),
            });
        }
        if let Err(attempted) = self.label.set(label) {
            return Err(UiError::LabelAlreadySet {
                current: self.label.get().cloned().unwrap_or_default(),
                attempted,
            });
        }
        Ok(())
    }

    /// The assigned label. Fails if none was ever set.
    pub fn label(&self) -> Result<&str> {
        self.label
            .get()
            .map(String::as_str)
            .ok_or_else(|| UiError::EmptyProperty {
                property: "label".to_string(),
            })
    }

    /// Name used in log and error messages: the label when set, otherwise
    /// the full selector.
    pub fn name(&self) -> String {
        self.label
            .get()
            .cloned()
            .unwrap_or_else(|| self.selector())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Marks the component enabled or disabled. Disabled components refuse
    /// every mutating action until re-enabled.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// Polls for the component to be present and displayed, up to the
    /// configured timeout. Expiry is `Ok(false)`, not an error.
    pub fn is_visible(&self) -> Result<bool> {
        self.driver
            .wait_for_visible(&self.selector(), self.object_timeout)
    }

    /// Attribute of the underlying element; `None` when the attribute is
    /// absent.
    pub fn attribute(&self, name: &str) -> Result<Option<String>> {
        self.driver.read_attribute(&self.selector(), name)
    }

    pub(crate) fn ensure_enabled(&self, action: &str) -> Result<()> {
        if self.enabled.get() {
            Ok(())
        } else {
            Err(UiError::ComponentDisabled {
                component: self.name(),
                action: action.to_string(),
            })
        }
    }

    pub(crate) fn require_visible(&self) -> Result<()> {
        if self.is_visible()? {
            Ok(())
        } else {
            Err(UiError::VisibilityTimeout {
                locator: self.selector(),
                timeout_ms: self.object_timeout.as_millis() as u64,
            })
        }
    }

    pub(crate) fn driver(&self) -> &DriverHandle {
        &self.driver
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("selector", &self.selector())
            .field("label", &self.label.get())
            .field("enabled", &self.enabled.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;

    fn component(selector: &str) -> Component {
        Component::new(Arc::new(MockDriver::new()), selector).unwrap()
    }

    #[test]
    fn blank_selector_is_rejected() {
        let driver: DriverHandle = Arc::new(MockDriver::new());
        assert!(matches!(
            Component::new(driver.clone(), ""),
            Err(UiError::InvalidLocator { .. })
        ));
        assert!(matches!(
            Component::new(driver, "   "),
            Err(UiError::InvalidLocator { .. })
        ));
    }

    #[test]
    fn label_can_be_set_exactly_once() {
        let component = component("input[data-fieldname='customer']");
        assert!(matches!(
            component.label(),
            Err(UiError::EmptyProperty { property }) if property == "label"
        ));

        component.set_label("Customer").unwrap();
        assert_eq!(component.label().unwrap(), "Customer");

        let err = component.set_label("Supplier").unwrap_err();
        assert!(matches!(
            err,
            UiError::LabelAlreadySet { current, attempted }
                if current == "Customer" && attempted == "Supplier"
        ));
        assert_eq!(component.label().unwrap(), "Customer");
    }

    #[test]
    fn blank_label_is_rejected() {
        let component = component("input");
        assert!(matches!(
            component.set_label("  "),
            Err(UiError::InvalidLocator { .. })
        ));
        // A rejected label does not consume the one-time slot.
        component.set_label("Customer").unwrap();
    }

    #[test]
    fn selector_composes_through_parents() {
        let driver: DriverHandle = Arc::new(MockDriver::new());
        let form = Arc::new(Component::new(driver.clone(), "form.new-customer").unwrap());
        let section = Arc::new(
            Component::with_parent(driver.clone(), "section.contact", form.clone()).unwrap(),
        );
        let field = Component::with_parent(driver, "input[data-fieldname='email']", section)
            .unwrap();

        assert_eq!(
            field.selector(),
            "form.new-customer section.contact input[data-fieldname='email']"
        );
        assert_eq!(field.parent().unwrap().selector(), "form.new-customer section.contact");
    }

    #[test]
    fn missing_parent_is_an_error() {
        let component = component("input");
        assert!(matches!(
            component.parent(),
            Err(UiError::MissingParent { .. })
        ));
    }

    #[test]
    fn disabled_component_refuses_actions() {
        let component = component("input");
        assert!(component.is_enabled());
        component.ensure_enabled("fill").unwrap();

        component.set_enabled(false);
        let err = component.ensure_enabled("fill").unwrap_err();
        assert!(matches!(
            err,
            UiError::ComponentDisabled { ref action, .. } if action == "fill"
        ));

        component.set_enabled(true);
        component.ensure_enabled("fill").unwrap();
    }

    #[test]
    fn disabled_error_prefers_label_over_selector() {
        let component = component("input[data-fieldname='status']");
        component.set_label("Status").unwrap();
        component.set_enabled(false);

        let err = component.ensure_enabled("select").unwrap_err();
        assert!(matches!(
            err,
            UiError::ComponentDisabled { component, .. } if component == "Status"
        ));
    }

    #[test]
    fn visibility_goes_through_the_driver() {
        let mock = MockDriver::new();
        mock.add_element("#present", crate::driver::MockElement::new());
        let driver: DriverHandle = Arc::new(mock);

        let present = Component::new(driver.clone(), "#present").unwrap();
        let absent = Component::new(driver, "#absent").unwrap();

        assert!(present.is_visible().unwrap());
        assert!(!absent.is_visible().unwrap());
        assert!(matches!(
            absent.require_visible(),
            Err(UiError::VisibilityTimeout { .. })
        ));
    }

    #[test]
    fn attribute_reads_through_the_driver() {
        let mock = MockDriver::new();
        mock.add_element(
            "input[data-fieldname='status']",
            crate::driver::MockElement::new().with_attribute("placeholder", "Select status"),
        );
        let driver: DriverHandle = Arc::new(mock);

        let component = Component::new(driver, "input[data-fieldname='status']").unwrap();
        assert_eq!(
            component.attribute("placeholder").unwrap(),
            Some("Select status".to_string())
        );
        assert_eq!(component.attribute("title").unwrap(), None);
    }
}
