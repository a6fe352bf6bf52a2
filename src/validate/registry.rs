//! Validator Registry - named validators for declarative binding.
//!
//! Record fields name their validator in a tag, so names must resolve to
//! predicates at bind time. Registration is append-only; registering an
//! existing name replaces it.
//!
//! A [`ValidatorRegistry`] is a plain object and can be passed explicitly to
//! [`bind_record_in`](crate::bind::bind_record_in). The UI thread also has a
//! default instance behind [`register_validator`], which
//! [`bind_record`](crate::bind::bind_record) reads.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::Validator;

// =============================================================================
// Registry
// =============================================================================

/// Mapping from validator name to validator.
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: HashMap<String, Rc<dyn Validator>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `name` with `validator`.
    pub fn register(&mut self, name: impl Into<String>, validator: impl Validator + 'static) {
        self.register_rc(name, Rc::new(validator));
    }

    /// Associate `name` with an already shared validator.
    pub fn register_rc(&mut self, name: impl Into<String>, validator: Rc<dyn Validator>) {
        let name = name.into();
        if self.validators.insert(name.clone(), validator).is_some() {
            tracing::debug!(%name, "validator replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Validator>> {
        self.validators.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

// =============================================================================
// Default Registry State
// =============================================================================

thread_local! {
    /// Default registry for the UI thread. Empty at startup.
    static DEFAULT_REGISTRY: RefCell<ValidatorRegistry> = RefCell::new(ValidatorRegistry::new());
}

/// Register a validator in the default registry.
pub fn register_validator(name: impl Into<String>, validator: impl Validator + 'static) {
    DEFAULT_REGISTRY.with(|reg| reg.borrow_mut().register(name, validator));
}

/// Look up a validator in the default registry.
pub fn lookup_validator(name: &str) -> Option<Rc<dyn Validator>> {
    DEFAULT_REGISTRY.with(|reg| reg.borrow().get(name))
}

/// Snapshot of the default registry.
///
/// Entries are shared, so this is cheap and safe to hold across a bind.
pub fn default_registry() -> ValidatorRegistry {
    DEFAULT_REGISTRY.with(|reg| reg.borrow().clone())
}

/// Reset the default registry (for testing).
pub fn reset_validators() {
    DEFAULT_REGISTRY.with(|reg| *reg.borrow_mut() = ValidatorRegistry::new());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scalar;
    use crate::validate::{ValidateBool, ValidateInt};

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ValidatorRegistry::new();
        assert!(registry.is_empty());

        registry.register("BoolTrue", ValidateBool(|b| b));
        assert!(registry.contains("BoolTrue"));
        assert_eq!(registry.len(), 1);

        let v = registry.get("BoolTrue").unwrap();
        assert!(v.accepts(&Scalar::Bool(true)));
        assert!(!v.accepts(&Scalar::Bool(false)));
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = ValidatorRegistry::new();
        registry.register("Int", ValidateInt(|i| i > 0));
        registry.register("Int", ValidateInt(|i| i < 0));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("Int").unwrap().accepts(&Scalar::Int(-1)));
    }

    #[test]
    fn test_default_registry() {
        reset_validators();
        assert!(lookup_validator("IntNot5").is_none());

        register_validator("IntNot5", ValidateInt(|i| i != 5));
        let v = lookup_validator("IntNot5").unwrap();
        assert!(!v.accepts(&Scalar::Int(5)));

        let snapshot = default_registry();
        assert!(snapshot.contains("IntNot5"));

        reset_validators();
        assert!(lookup_validator("IntNot5").is_none());
    }
}
