//! Binders - value to widget conversion.
//!
//! Each binder wraps one value behind one widget (or one container) and owns
//! the edit protocol for it:
//!
//! ```text
//! proposed raw value → coerce → validate + range check → commit | roll back
//! ```
//!
//! A commit writes the bound value, shows the candidate and advances the
//! binder's previous-accepted state. A rollback shows the previous-accepted
//! state again and leaves the bound value alone.
//!
//! [`convert`] is the single place that maps a value's kind to a binder.
//! Record and list binders call it for every field and element, so nesting
//! works the same at any depth.
//!
//! A bind is all or nothing, for widgets and for the value alike. Defaults a
//! binder writes back (an empty choice) are held until the outermost bind
//! succeeds and dropped if it fails.

mod choice;
mod list;
mod record;
mod scalar;

pub use choice::bind_choice;
pub use list::{add_button, bind_list, bind_list_in, list_revision, list_rows, remove_button};
pub use record::{bind_record, bind_record_in, field_widget};
pub use scalar::{bind_bool, bind_float, bind_int, bind_string};

use std::cell::RefCell;

use crate::config::config;
use crate::engine::Widget;
use crate::error::{BindError, Result};
use crate::meta::Meta;
use crate::types::{Kind, WidgetKind};
use crate::validate::{default_registry, ValidatorRegistry};
use crate::value::{Bound, Value};

// =============================================================================
// Dispatcher
// =============================================================================

/// Bind `bound` with the binder its kind calls for.
///
/// One level of reference is seen through. A string with choices becomes a
/// choice field. Nested records resolve validator names through the default
/// registry.
pub fn convert(bound: &Bound, meta: &Meta) -> Result<Widget> {
    convert_in(bound, meta, &default_registry())
}

/// [`convert`], resolving nested validator names through `registry`.
pub fn convert_in(bound: &Bound, meta: &Meta, registry: &ValidatorRegistry) -> Result<Widget> {
    all_or_nothing(|| dispatch(bound, meta, registry))
}

fn dispatch(bound: &Bound, meta: &Meta, registry: &ValidatorRegistry) -> Result<Widget> {
    let target = see_through(bound)?;
    let kind = target
        .kind()
        .ok_or_else(|| BindError::invalid("value path no longer resolves"))?;

    tracing::trace!(%kind, label = %meta.label, "dispatching");

    match kind {
        Kind::Record => bind_record_in(&target, &meta.label, &meta.id, &meta.class, registry),
        Kind::List => bind_list_in(&target, &meta.label, &meta.id, &meta.class, meta.elem(), registry),
        Kind::Bool => bind_bool(&target, &meta.label, &meta.id, &meta.class, meta.validator.clone()),
        Kind::Int => bind_int(
            &target,
            &meta.label,
            &meta.id,
            &meta.class,
            meta.bounds,
            meta.validator.clone(),
        ),
        Kind::Float => bind_float(
            &target,
            &meta.label,
            &meta.id,
            &meta.class,
            meta.bounds,
            meta.validator.clone(),
        ),
        Kind::String if !meta.choices.is_empty() => bind_choice(
            &target,
            &meta.choices,
            &meta.label,
            &meta.id,
            &meta.class,
            meta.validator.clone(),
        ),
        Kind::String => bind_string(&target, &meta.label, &meta.id, &meta.class, meta.validator.clone()),
        Kind::Ref | Kind::Map => Err(BindError::UnsupportedType(kind)),
    }
}

/// Step through one filled reference slot.
///
/// An empty slot has nothing to bind. A slot holding another slot is a
/// reference to a reference, which no binder takes.
fn see_through(bound: &Bound) -> Result<Bound> {
    let inner = bound
        .read(|v| match v {
            Value::Ref(None) => Err(BindError::invalid("cannot bind an empty reference")),
            Value::Ref(Some(inner)) if inner.kind() == Kind::Ref => {
                Err(BindError::UnsupportedType(Kind::Ref))
            }
            Value::Ref(Some(_)) => Ok(true),
            _ => Ok(false),
        })
        .ok_or_else(|| BindError::invalid("value path no longer resolves"))??;

    Ok(if inner { bound.deref() } else { bound.clone() })
}

/// Handle to the `expected` value at `bound`, directly or through one
/// reference slot. Anything else is the wrong category of value.
pub(crate) fn resolve(bound: &Bound, expected: Kind) -> Result<Bound> {
    let target = see_through(bound).map_err(|e| match e {
        BindError::UnsupportedType(_) => {
            BindError::invalid(format!("expected a {expected}, got a reference to a reference"))
        }
        other => other,
    })?;
    match target.kind() {
        Some(kind) if kind == expected => Ok(target),
        Some(kind) => Err(BindError::invalid(format!("expected a {expected}, got a {kind}"))),
        None => Err(BindError::invalid("value path no longer resolves")),
    }
}

// =============================================================================
// Shared widget setup
// =============================================================================

/// Create a widget carrying the common attributes: `title`, `id` when given,
/// and `class` as `{prefix}-{class_kind}` plus the caller's class.
pub(crate) fn new_widget(kind: WidgetKind, class_kind: &str, label: &str, id: &str, class: &str) -> Widget {
    let widget = Widget::create(kind);
    widget.set_attr("title", label);
    if !id.is_empty() {
        widget.set_attr("id", id);
    }
    widget.set_classes(&config().class_for(class_kind), class);
    widget
}

// =============================================================================
// Deferred defaults
// =============================================================================

thread_local! {
    /// Default writes waiting on the outermost bind in progress.
    static PENDING_DEFAULTS: RefCell<Option<Vec<(Bound, Value)>>> = const { RefCell::new(None) };
}

/// One bind. Only the outermost scope applies or drops pending writes.
struct BindScope {
    outermost: bool,
}

impl BindScope {
    fn enter() -> Self {
        let outermost = PENDING_DEFAULTS.with(|pending| {
            let mut pending = pending.borrow_mut();
            if pending.is_some() {
                false
            } else {
                *pending = Some(Vec::new());
                true
            }
        });
        Self { outermost }
    }

    fn apply(self) {
        if !self.outermost {
            return;
        }
        let writes = PENDING_DEFAULTS
            .with(|pending| pending.borrow_mut().take())
            .unwrap_or_default();
        for (target, value) in writes {
            if !target.set(value) {
                tracing::warn!("bound value no longer resolves, default dropped");
            }
        }
    }
}

impl Drop for BindScope {
    fn drop(&mut self) {
        if self.outermost {
            PENDING_DEFAULTS.with(|pending| pending.borrow_mut().take());
        }
    }
}

/// Run `bind`. Defaults written inside it land only if the outermost bind
/// succeeds.
pub(crate) fn all_or_nothing(bind: impl FnOnce() -> Result<Widget>) -> Result<Widget> {
    let scope = BindScope::enter();
    let result = bind();
    if result.is_ok() {
        scope.apply();
    }
    result
}

/// Write a bind-time default into `target`, held back while a bind is in
/// progress. Returns false if the value path no longer resolves.
pub(crate) fn write_default(target: &Bound, value: Value) -> bool {
    let unheld = PENDING_DEFAULTS.with(|pending| match pending.borrow_mut().as_mut() {
        Some(writes) => {
            writes.push((target.clone(), value));
            None
        }
        None => Some(value),
    });
    match unheld {
        Some(value) => target.set(value),
        None => target.kind().is_some(),
    }
}

/// The rendering layer handed back a value outside its own contract.
#[track_caller]
pub(crate) fn contract_violation(raw: &str, expected: &str) -> ! {
    panic!("value '{raw}' has invalid type, expected {expected}")
}

// =============================================================================
// Tests
// =============================================================================
