//! Binding configuration.
//!
//! Read at bind time; changing it does not touch widgets that already exist.
//!
//! ```ignore
//! use spark_bind::config::{set_config, BindConfig};
//!
//! set_config(BindConfig {
//!     class_prefix: "form".into(),
//!     ..BindConfig::default()
//! });
//! ```

use std::cell::RefCell;

/// Host-facing conventions for generated widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindConfig {
    /// Prefix of generated CSS classes, which look like `{prefix}-{kind}`.
    pub class_prefix: String,
    /// Text of a list's add button.
    pub add_text: String,
    /// Text of a list row's remove button.
    pub remove_text: String,
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            class_prefix: "spark".to_string(),
            add_text: "+".to_string(),
            remove_text: "-".to_string(),
        }
    }
}

impl BindConfig {
    /// Class for widgets of `kind`, e.g. `spark-int`.
    pub fn class_for(&self, kind: &str) -> String {
        format!("{}-{}", self.class_prefix, kind)
    }
}

thread_local! {
    static CONFIG: RefCell<BindConfig> = RefCell::new(BindConfig::default());
}

/// The current configuration.
pub fn config() -> BindConfig {
    CONFIG.with(|c| c.borrow().clone())
}

/// Replace the current configuration.
pub fn set_config(config: BindConfig) {
    CONFIG.with(|c| *c.borrow_mut() = config);
}

/// Restore the default configuration (for testing).
pub fn reset_config() {
    set_config(BindConfig::default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        reset_config();
        let c = config();
        assert_eq!(c.class_for("int"), "spark-int");
        assert_eq!(c.add_text, "+");
        assert_eq!(c.remove_text, "-");
    }

    #[test]
    fn test_set_config() {
        set_config(BindConfig {
            class_prefix: "go".into(),
            ..BindConfig::default()
        });
        assert_eq!(config().class_for("list"), "go-list");
        reset_config();
        assert_eq!(config().class_prefix, "spark");
    }
}
