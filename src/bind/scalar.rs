//! Scalar binders - bool, int, float and string.
//!
//! One widget and one change handler per value. The handler owns the
//! binder's previous-accepted state; nothing else touches it.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::{contract_violation, new_widget, resolve};
use crate::engine::Widget;
use crate::error::{BindError, Result};
use crate::types::{Bounds, Kind, Range, Scalar, ScalarKind, WidgetKind};
use crate::validate::{allows, ensure_kind, Validator};
use crate::value::{Bound, Value};

// =============================================================================
// Verdict
// =============================================================================

/// Outcome of checking a coerced candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Accept,
    Reject(&'static str),
}

/// Range check first, then the validator. Both must pass.
pub(crate) fn judge(validator: Option<&Rc<dyn Validator>>, candidate: &Scalar, range: Range) -> Verdict {
    match range {
        Range::BelowMin => Verdict::Reject("below min"),
        Range::AboveMax => Verdict::Reject("above max"),
        Range::Within if allows(validator, candidate) => Verdict::Accept,
        Range::Within => Verdict::Reject("validator"),
    }
}

/// Write an accepted candidate through `target`.
pub(crate) fn commit(target: &Bound, widget: Widget, value: Value) {
    tracing::debug!(widget = widget.index(), ?value, "edit committed");
    if !target.set(value) {
        tracing::warn!(widget = widget.index(), "bound value no longer resolves, edit dropped");
    }
}

pub(crate) fn roll_back(widget: Widget, reason: &'static str, previous: &str) {
    tracing::debug!(widget = widget.index(), reason, previous, "edit rolled back");
    widget.show(previous);
}

fn read_scalar<T>(target: &Bound, kind: Kind, get: impl FnOnce(&Value) -> Option<T>) -> Result<T> {
    target
        .read(get)
        .flatten()
        .ok_or_else(|| BindError::invalid(format!("expected a {kind}")))
}

/// Render the set bounds as native attributes. Int bounds render truncated.
fn render_bounds(widget: Widget, bounds: Bounds, as_int: bool) {
    widget.set_bound_flags(bounds.flags());
    let attrs = [("min", bounds.min), ("max", bounds.max), ("step", bounds.step)];
    for (name, bound) in attrs {
        if bound.is_nan() {
            continue;
        }
        if as_int {
            widget.set_attr(name, (bound as i64).to_string());
        } else {
            widget.set_attr(name, bound.to_string());
        }
    }
}

// =============================================================================
// Bool
// =============================================================================

/// Bind a bool to a checkbox.
pub fn bind_bool(
    bound: &Bound,
    label: &str,
    id: &str,
    class: &str,
    validator: Option<Rc<dyn Validator>>,
) -> Result<Widget> {
    let target = resolve(bound, Kind::Bool)?;
    ensure_kind(validator.as_ref(), ScalarKind::Bool)?;
    let current = read_scalar(&target, Kind::Bool, Value::as_bool)?;

    tracing::trace!(label, current, "binding bool");

    let widget = new_widget(WidgetKind::Checkbox, "bool", label, id, class);
    widget.set_attr("type", "checkbox");
    widget.show(current.to_string());

    let previous = Cell::new(current);
    widget.on_change(move |raw| {
        let candidate: bool = raw
            .parse()
            .unwrap_or_else(|_| contract_violation(raw, "bool"));

        match judge(validator.as_ref(), &Scalar::Bool(candidate), Range::Within) {
            Verdict::Accept => {
                commit(&target, widget, Value::Bool(candidate));
                widget.show(candidate.to_string());
                previous.set(candidate);
            }
            Verdict::Reject(reason) => roll_back(widget, reason, &previous.get().to_string()),
        }
    });

    Ok(widget)
}

// =============================================================================
// Int
// =============================================================================

/// Parse an int edit. Fractional input truncates toward zero.
///
/// The second element is true when the input was not already an integer,
/// so the widget must show the truncated value.
fn coerce_int(raw: &str) -> (i64, bool) {
    let raw = raw.trim();
    if let Ok(i) = raw.parse::<i64>() {
        return (i, false);
    }
    match raw.parse::<f64>() {
        Ok(f) if f.is_finite() => (f as i64, true),
        _ => contract_violation(raw, "a number"),
    }
}

/// Bind an int to a number input.
///
/// `bounds` are checked on every edit whether or not the host honours the
/// native attributes.
pub fn bind_int(
    bound: &Bound,
    label: &str,
    id: &str,
    class: &str,
    bounds: Bounds,
    validator: Option<Rc<dyn Validator>>,
) -> Result<Widget> {
    let target = resolve(bound, Kind::Int)?;
    ensure_kind(validator.as_ref(), ScalarKind::Int)?;
    let current = read_scalar(&target, Kind::Int, Value::as_int)?;

    tracing::trace!(label, current, ?bounds, "binding int");

    let widget = new_widget(WidgetKind::NumberInput, "int", label, id, class);
    widget.set_attr("type", "number");
    render_bounds(widget, bounds, true);
    widget.show(current.to_string());

    let previous = Cell::new(current);
    widget.on_change(move |raw| {
        let (candidate, truncated) = coerce_int(raw);
        if truncated {
            widget.show(candidate.to_string());
        }

        let range = bounds.check_int(candidate);
        match judge(validator.as_ref(), &Scalar::Int(candidate), range) {
            Verdict::Accept => {
                commit(&target, widget, Value::Int(candidate));
                widget.show(candidate.to_string());
                previous.set(candidate);
            }
            Verdict::Reject(reason) => roll_back(widget, reason, &previous.get().to_string()),
        }
    });

    Ok(widget)
}

// =============================================================================
// Float
// =============================================================================

/// Bind a float to a number input. Edits must be finite.
pub fn bind_float(
    bound: &Bound,
    label: &str,
    id: &str,
    class: &str,
    bounds: Bounds,
    validator: Option<Rc<dyn Validator>>,
) -> Result<Widget> {
    let target = resolve(bound, Kind::Float)?;
    ensure_kind(validator.as_ref(), ScalarKind::Float)?;
    let current = read_scalar(&target, Kind::Float, Value::as_float)?;

    tracing::trace!(label, current, ?bounds, "binding float");

    let widget = new_widget(WidgetKind::NumberInput, "float", label, id, class);
    widget.set_attr("type", "number");
    render_bounds(widget, bounds, false);
    widget.show(current.to_string());

    let previous = Cell::new(current);
    widget.on_change(move |raw| {
        let candidate = match raw.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => f,
            _ => contract_violation(raw, "a number"),
        };

        let range = bounds.check_float(candidate);
        match judge(validator.as_ref(), &Scalar::Float(candidate), range) {
            Verdict::Accept => {
                commit(&target, widget, Value::Float(candidate));
                widget.show(candidate.to_string());
                previous.set(candidate);
            }
            Verdict::Reject(reason) => roll_back(widget, reason, &previous.get().to_string()),
        }
    });

    Ok(widget)
}

// =============================================================================
// String
// =============================================================================

/// Bind a string to a text input.
pub fn bind_string(
    bound: &Bound,
    label: &str,
    id: &str,
    class: &str,
    validator: Option<Rc<dyn Validator>>,
) -> Result<Widget> {
    let target = resolve(bound, Kind::String)?;
    ensure_kind(validator.as_ref(), ScalarKind::String)?;
    let current = read_scalar(&target, Kind::String, |v| v.as_str().map(str::to_string))?;

    tracing::trace!(label, %current, "binding string");

    let widget = new_widget(WidgetKind::TextInput, "string", label, id, class);
    widget.set_attr("type", "text");
    widget.show(current.clone());

    let previous = RefCell::new(current);
    widget.on_change(move |raw| {
        let candidate = raw.to_string();
        match judge(validator.as_ref(), &Scalar::String(candidate.clone()), Range::Within) {
            Verdict::Accept => {
                commit(&target, widget, Value::String(candidate.clone()));
                widget.show(candidate.clone());
                *previous.borrow_mut() = candidate;
            }
            Verdict::Reject(reason) => roll_back(widget, reason, &previous.borrow()),
        }
    });

    Ok(widget)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::reset_config;
    use crate::engine::reset_registry;
    use crate::types::BoundFlags;
    use crate::validate::{ValidateBool, ValidateFloat, ValidateInt, ValidateString, ValidatorFn};

    fn setup() {
        reset_registry();
        reset_config();
    }

    #[test]
    fn test_bool_round_trip_and_commit() {
        setup();
        let b = Bound::new(true);
        let w = bind_bool(&b, "flag", "f1", "", None).unwrap();

        assert_eq!(w.kind(), WidgetKind::Checkbox);
        assert!(w.checked());
        assert_eq!(w.title(), "flag");
        assert_eq!(w.id(), "f1");
        assert_eq!(w.attr("type").as_deref(), Some("checkbox"));
        assert_eq!(w.classes(), vec!["spark-bool"]);

        w.set_checked(false);
        assert_eq!(b.get(), Some(Value::Bool(false)));
        assert!(!w.checked());
    }

    #[test]
    fn test_bool_validator_rolls_back() {
        setup();
        let b = Bound::new(true);
        let only_true: Rc<dyn Validator> = Rc::new(ValidateBool(|b| b));
        let w = bind_bool(&b, "", "", "", Some(only_true)).unwrap();

        w.toggle();
        assert_eq!(b.get(), Some(Value::Bool(true)));
        assert!(w.checked());
    }

    #[test]
    #[should_panic(expected = "value 'maybe' has invalid type, expected bool")]
    fn test_bool_unparseable_panics() {
        setup();
        let w = bind_bool(&Bound::new(false), "", "", "", None).unwrap();
        w.input("maybe");
    }

    #[test]
    fn test_int_bounds_enforced() {
        setup();
        let i = Bound::new(5i64);
        let w = bind_int(&i, "n", "", "", Bounds::new(0.0, 10.0, f64::NAN), None).unwrap();

        assert_eq!(w.attr("min").as_deref(), Some("0"));
        assert_eq!(w.attr("max").as_deref(), Some("10"));
        assert_eq!(w.attr("step"), None);
        assert_eq!(w.bound_flags(), BoundFlags::MIN | BoundFlags::MAX);

        w.input("15");
        assert_eq!(i.get(), Some(Value::Int(5)));
        assert_eq!(w.value(), "5");

        w.input("-1");
        assert_eq!(i.get(), Some(Value::Int(5)));

        w.input("7");
        assert_eq!(i.get(), Some(Value::Int(7)));
        assert_eq!(w.value(), "7");
    }

    #[test]
    fn test_int_truncates_fraction() {
        setup();
        let i = Bound::new(0i64);
        let w = bind_int(&i, "", "", "", Bounds::NONE, None).unwrap();

        w.input("3.7");
        assert_eq!(i.get(), Some(Value::Int(3)));
        assert_eq!(w.value(), "3");

        w.input("-2.9");
        assert_eq!(i.get(), Some(Value::Int(-2)));
    }

    #[test]
    fn test_int_bound_attrs_truncate() {
        setup();
        let w = bind_int(&Bound::new(2i64), "", "", "", Bounds::new(1.9, 10.5, 2.7), None).unwrap();
        assert_eq!(w.attr("min").as_deref(), Some("1"));
        assert_eq!(w.attr("max").as_deref(), Some("10"));
        assert_eq!(w.attr("step").as_deref(), Some("2"));
    }

    #[test]
    fn test_int_validator_and_rollback_after_commit() {
        setup();
        let i = Bound::new(1i64);
        let not5: Rc<dyn Validator> = Rc::new(ValidateInt(|i| i != 5));
        let w = bind_int(&i, "", "", "", Bounds::NONE, Some(not5)).unwrap();

        w.input("4");
        w.input("5");
        assert_eq!(i.get(), Some(Value::Int(4)));
        assert_eq!(w.value(), "4");
    }

    #[test]
    #[should_panic(expected = "expected a number")]
    fn test_int_unparseable_panics() {
        setup();
        let w = bind_int(&Bound::new(0i64), "", "", "", Bounds::NONE, None).unwrap();
        w.input("abc");
    }

    #[test]
    fn test_float_bounds_and_validator() {
        setup();
        let f = Bound::new(2.5f64);
        let not_three: Rc<dyn Validator> = Rc::new(ValidateFloat(|f| f != 3.0));
        let w = bind_float(&f, "", "", "", Bounds::new(1.2, 10.5, f64::NAN), Some(not_three)).unwrap();

        assert_eq!(w.attr("min").as_deref(), Some("1.2"));
        assert_eq!(w.value(), "2.5");

        w.input("1.1");
        assert_eq!(f.get(), Some(Value::Float(2.5)));
        w.input("3");
        assert_eq!(f.get(), Some(Value::Float(2.5)));
        w.input("7.25");
        assert_eq!(f.get(), Some(Value::Float(7.25)));
        assert_eq!(w.value(), "7.25");
    }

    #[test]
    #[should_panic(expected = "value 'inf' has invalid type, expected a number")]
    fn test_float_infinity_panics() {
        setup();
        let w = bind_float(&Bound::new(0.0f64), "", "", "", Bounds::NONE, None).unwrap();
        w.input("inf");
    }

    #[test]
    #[should_panic(expected = "value '-inf' has invalid type, expected a number")]
    fn test_int_infinity_panics() {
        setup();
        let w = bind_int(&Bound::new(0i64), "", "", "", Bounds::NONE, None).unwrap();
        w.input("-inf");
    }

    #[test]
    fn test_string_commit_and_reject() {
        setup();
        let s = Bound::new("hi");
        let not_hello: Rc<dyn Validator> = Rc::new(ValidateString(|s: String| s != "hello"));
        let w = bind_string(&s, "greeting", "", "wide", Some(not_hello)).unwrap();

        assert_eq!(w.classes(), vec!["spark-string", "wide"]);
        w.input("hey");
        assert_eq!(s.get(), Some(Value::from("hey")));
        w.input("hello");
        assert_eq!(s.get(), Some(Value::from("hey")));
        assert_eq!(w.value(), "hey");
    }

    #[test]
    fn test_wrong_category_is_invalid_argument() {
        setup();
        let err = bind_int(&Bound::new("x"), "", "", "", Bounds::NONE, None).unwrap_err();
        assert!(matches!(err, BindError::InvalidArgument(_)));
        let err = bind_bool(&Bound::new(1i64), "", "", "", None).unwrap_err();
        assert!(matches!(err, BindError::InvalidArgument(_)));
    }

    #[test]
    fn test_mismatched_typed_validator_rejected_at_bind() {
        setup();
        let v: Rc<dyn Validator> = Rc::new(ValidateString(|_: String| true));
        let err = bind_int(&Bound::new(0i64), "", "", "", Bounds::NONE, Some(v)).unwrap_err();
        assert!(matches!(err, BindError::InvalidArgument(_)));

        let any: Rc<dyn Validator> = Rc::new(ValidatorFn(|_: &Scalar| true));
        assert!(bind_int(&Bound::new(0i64), "", "", "", Bounds::NONE, Some(any)).is_ok());
    }

    #[test]
    fn test_binds_through_reference() {
        setup();
        let b = Bound::new(Value::reference(false));
        let w = bind_bool(&b, "", "", "", None).unwrap();
        w.set_checked(true);
        assert_eq!(b.get(), Some(Value::reference(true)));
    }

    #[test]
    fn test_judge_order() {
        let v: Rc<dyn Validator> = Rc::new(ValidateInt(|_| false));
        assert_eq!(judge(Some(&v), &Scalar::Int(1), Range::AboveMax), Verdict::Reject("above max"));
        assert_eq!(judge(Some(&v), &Scalar::Int(1), Range::Within), Verdict::Reject("validator"));
        assert_eq!(judge(None, &Scalar::Int(1), Range::Within), Verdict::Accept);
    }
}
