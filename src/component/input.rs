//! Text input controls and auto-fill strategies.

use std::fmt;
use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::component::{Component, Fillable};
use crate::driver::DriverHandle;
use crate::error::{Result, UiError};

/// How the input element is located relative to the component selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputTarget {
    /// The component selector matches the input element itself.
    Direct,
    /// The component selector matches a Frappe control container. The inner
    /// target depends on state: an `input` while enabled, the read-only
    /// `.like-disabled-input` node Frappe swaps in while disabled.
    Labeled,
}

/// A single-line text input.
pub struct Input {
    component: Component,
    target: InputTarget,
    strategy: Option<FillStrategy>,
}

impl Input {
    /// Input identified by its `data-fieldname` attribute.
    pub fn by_fieldname(driver: DriverHandle, fieldname: &str) -> Result<Self> {
        let component = Component::new(driver, format!("input[data-fieldname='{fieldname}']"))?;
        Ok(Self {
            component,
            target: InputTarget::Direct,
            strategy: None,
        })
    }

    /// Input inside the Frappe control container carrying `label` as its
    /// title. The label doubles as the component label.
    pub fn by_label(driver: DriverHandle, label: &str) -> Result<Self> {
        let component = Component::new(driver, format!(".frappe-control[title='{label}']"))?;
        component.set_label(label)?;
        Ok(Self {
            component,
            target: InputTarget::Labeled,
            strategy: None,
        })
    }

    /// Wraps an already-built component whose selector matches the input
    /// element directly.
    pub fn from_component(component: Component) -> Self {
        Self {
            component,
            target: InputTarget::Direct,
            strategy: None,
        }
    }

    /// Configures the strategy [`auto_fill`](Self::auto_fill) uses.
    pub fn with_strategy(mut self, strategy: FillStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    /// Selector of the element actually typed into or read from.
    fn input_selector(&self) -> String {
        match self.target {
            InputTarget::Direct => self.component.selector(),
            InputTarget::Labeled => {
                if self.component.is_enabled() {
                    format!("{} input", self.component.selector())
                } else {
                    format!("{} .like-disabled-input", self.component.selector())
                }
            }
        }
    }

    /// Replaces the input's content with `value`.
    pub fn fill(&self, value: &str) -> Result<()> {
        self.component.ensure_enabled("fill")?;
        self.component.require_visible()?;
        log::debug!(
            "filling '{}' ({} chars)",
            self.component.name(),
            value.len()
        );
        self.component.driver().fill(&self.input_selector(), value)
    }

    /// Empties the input.
    pub fn clear(&self) -> Result<()> {
        self.fill("")
    }

    /// Current content. Works on disabled components too; a disabled labeled
    /// control renders its value as text, so that is what gets read.
    pub fn value(&self) -> Result<String> {
        match self.target {
            InputTarget::Labeled if !self.component.is_enabled() => {
                self.component.driver().read_text(&self.input_selector())
            }
            _ => self.component.driver().read_value(&self.input_selector()),
        }
    }

    /// Produces a value from the configured strategy, fills it in, and
    /// returns it so the test can assert against it later.
    pub fn auto_fill(&self) -> Result<String> {
        let strategy = self.strategy.as_ref().ok_or_else(|| UiError::EmptyProperty {
            property: "fill strategy".to_string(),
        })?;
        let value = strategy.produce();
        self.fill(&value)?;
        log::debug!(
            "auto-filled '{}' via {} strategy",
            self.component.name(),
            strategy.name()
        );
        Ok(value)
    }
}

impl Fillable for Input {
    fn fill(&self, value: &str) -> Result<()> {
        Input::fill(self, value)
    }

    fn clear(&self) -> Result<()> {
        Input::clear(self)
    }

    fn value(&self) -> Result<String> {
        Input::value(self)
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("component", &self.component)
            .field("target", &self.target)
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// A pure value generator for [`Input::auto_fill`].
///
/// The generator is a function of its configured parameters only; repeated
/// calls may differ (randomness) but never depend on mutable captured state.
#[derive(Clone)]
pub struct FillStrategy {
    name: String,
    params: Vec<String>,
    generator: Arc<dyn Fn(&[String]) -> String>,
}

impl FillStrategy {
    /// Builds a strategy from a custom generator function.
    pub fn from_fn(
        name: impl Into<String>,
        params: Vec<String>,
        generator: impl Fn(&[String]) -> String + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            generator: Arc::new(generator),
        }
    }

    /// Always produces the same value.
    pub fn fixed(value: impl Into<String>) -> Self {
        Self::from_fn("fixed", vec![value.into()], |params| {
            params.first().cloned().unwrap_or_default()
        })
    }

    /// Produces a fresh random alphanumeric string of the given length.
    pub fn random_alphanumeric(len: usize) -> Self {
        Self::from_fn("random_alphanumeric", vec![len.to_string()], move |_| {
            rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn produce(&self) -> String {
        (self.generator)(&self.params)
    }
}

impl fmt::Debug for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FillStrategy")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}
