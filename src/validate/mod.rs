//! Edit validators.
//!
//! A [`Validator`] decides whether a proposed edit may commit. Returning
//! false is not an error: the binder rolls the widget back to the last
//! accepted value and leaves the bound value alone.
//!
//! Typed adapters ([`ValidateBool`], [`ValidateInt`], [`ValidateFloat`],
//! [`ValidateString`]) report the scalar kind they expect, and binders refuse
//! at bind time to attach one to a value of another kind. [`ValidatorFn`]
//! accepts any kind.
//!
//! # Example
//!
//! ```ignore
//! use spark_bind::validate::{register_validator, ValidateInt};
//!
//! register_validator("IntNot5", ValidateInt(|i| i != 5));
//! ```

mod registry;

pub use registry::*;

use std::rc::Rc;

use crate::error::{BindError, Result};
use crate::types::{Scalar, ScalarKind};

/// Predicate over a proposed edit.
pub trait Validator {
    /// True when `candidate` may be committed.
    fn accepts(&self, candidate: &Scalar) -> bool;

    /// The scalar kind this validator understands. `None` means any.
    fn kind(&self) -> Option<ScalarKind> {
        None
    }
}

/// Validator over any scalar kind.
pub struct ValidatorFn<F>(pub F)
where
    F: Fn(&Scalar) -> bool;

impl<F> Validator for ValidatorFn<F>
where
    F: Fn(&Scalar) -> bool,
{
    fn accepts(&self, candidate: &Scalar) -> bool {
        (self.0)(candidate)
    }
}

macro_rules! typed_validator {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $variant:ident) => {
        $(#[$doc])*
        pub struct $name<F>(pub F)
        where
            F: Fn($ty) -> bool;

        impl<F> Validator for $name<F>
        where
            F: Fn($ty) -> bool,
        {
            fn accepts(&self, candidate: &Scalar) -> bool {
                match candidate {
                    Scalar::$variant(v) => (self.0)(v.clone()),
                    other => {
                        tracing::warn!(
                            expected = %ScalarKind::$variant,
                            got = %other.kind(),
                            "typed validator saw a foreign scalar, rejecting"
                        );
                        false
                    }
                }
            }

            fn kind(&self) -> Option<ScalarKind> {
                Some(ScalarKind::$variant)
            }
        }
    };
}

typed_validator!(
    /// Validator over bool edits.
    ValidateBool, bool, Bool
);
typed_validator!(
    /// Validator over int edits.
    ValidateInt, i64, Int
);
typed_validator!(
    /// Validator over float edits.
    ValidateFloat, f64, Float
);
typed_validator!(
    /// Validator over string and choice edits.
    ValidateString, String, String
);

/// Whether `validator` accepts `candidate`. An absent validator accepts all.
pub(crate) fn allows(validator: Option<&Rc<dyn Validator>>, candidate: &Scalar) -> bool {
    validator.is_none_or(|v| v.accepts(candidate))
}

/// Bind-time check that a typed validator matches the binder's kind.
pub(crate) fn ensure_kind(validator: Option<&Rc<dyn Validator>>, expected: ScalarKind) -> Result<()> {
    match validator.and_then(|v| v.kind()) {
        Some(kind) if kind != expected => Err(BindError::invalid(format!(
            "{kind} validator cannot validate a {expected} value"
        ))),
        _ => Ok(()),
    }
}
