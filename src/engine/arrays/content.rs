//! Widget Engine - Content Arrays
//!
//! What a host needs to draw a widget:
//! - attrs: `title`, `id`, `class`, `type`, `min`, `max`, `step`
//! - text: Label and button text
//! - options: Select options, in order
//! - bound_flags: Which native numeric bounds are set
//! - value: Displayed value, as a reactive signal
//! - revision: Structural revision of a list, as a reactive signal
//!
//! Signals are cloned out of the arrays before being set, so effects that
//! read the arrays again never hit a held borrow.

use std::cell::RefCell;
use std::collections::BTreeMap;

use spark_signals::{signal, Signal};

use crate::types::BoundFlags;

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    /// Attribute map.
    static ATTRS: RefCell<Vec<BTreeMap<String, String>>> = RefCell::new(Vec::new());

    /// Text content (labels, buttons).
    static TEXT: RefCell<Vec<String>> = RefCell::new(Vec::new());

    /// Select options.
    static OPTIONS: RefCell<Vec<Vec<String>>> = RefCell::new(Vec::new());

    /// Native numeric bounds present on the widget.
    static BOUND_FLAGS: RefCell<Vec<BoundFlags>> = RefCell::new(Vec::new());

    /// Displayed value. Created on first write.
    static VALUE: RefCell<Vec<Option<Signal<String>>>> = RefCell::new(Vec::new());

    /// List revision. Created on first bump.
    static REVISION: RefCell<Vec<Option<Signal<u64>>>> = RefCell::new(Vec::new());
}

// =============================================================================
// Capacity Management
// =============================================================================

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    ATTRS.with(|arr| grow(&mut arr.borrow_mut(), index));
    TEXT.with(|arr| grow(&mut arr.borrow_mut(), index));
    OPTIONS.with(|arr| grow(&mut arr.borrow_mut(), index));
    BOUND_FLAGS.with(|arr| grow(&mut arr.borrow_mut(), index));
    VALUE.with(|arr| grow(&mut arr.borrow_mut(), index));
    REVISION.with(|arr| grow(&mut arr.borrow_mut(), index));
}

fn grow<T: Default>(arr: &mut Vec<T>, index: usize) {
    if arr.len() <= index {
        arr.resize_with(index + 1, T::default);
    }
}

fn clear_slot<T: Default>(arr: &RefCell<Vec<T>>, index: usize) {
    if let Some(slot) = arr.borrow_mut().get_mut(index) {
        *slot = T::default();
    }
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    ATTRS.with(|arr| clear_slot(arr, index));
    TEXT.with(|arr| clear_slot(arr, index));
    OPTIONS.with(|arr| clear_slot(arr, index));
    BOUND_FLAGS.with(|arr| clear_slot(arr, index));
    VALUE.with(|arr| clear_slot(arr, index));
    REVISION.with(|arr| clear_slot(arr, index));
}

/// Reset all content arrays.
pub fn reset() {
    ATTRS.with(|arr| arr.borrow_mut().clear());
    TEXT.with(|arr| arr.borrow_mut().clear());
    OPTIONS.with(|arr| arr.borrow_mut().clear());
    BOUND_FLAGS.with(|arr| arr.borrow_mut().clear());
    VALUE.with(|arr| arr.borrow_mut().clear());
    REVISION.with(|arr| arr.borrow_mut().clear());
}

// =============================================================================
// Attributes
// =============================================================================

pub fn get_attr(index: usize, name: &str) -> Option<String> {
    ATTRS.with(|arr| arr.borrow().get(index).and_then(|m| m.get(name).cloned()))
}

pub fn set_attr(index: usize, name: &str, value: impl Into<String>) {
    let value = value.into();
    ATTRS.with(|arr| {
        if let Some(map) = arr.borrow_mut().get_mut(index) {
            map.insert(name.to_string(), value);
        }
    });
}

pub fn get_attrs(index: usize) -> BTreeMap<String, String> {
    ATTRS.with(|arr| arr.borrow().get(index).cloned().unwrap_or_default())
}

// =============================================================================
// Text, Options, Bound Flags
// =============================================================================

pub fn get_text(index: usize) -> String {
    TEXT.with(|arr| arr.borrow().get(index).cloned().unwrap_or_default())
}

pub fn set_text(index: usize, text: impl Into<String>) {
    let text = text.into();
    TEXT.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(index) {
            *slot = text;
        }
    });
}

pub fn get_options(index: usize) -> Vec<String> {
    OPTIONS.with(|arr| arr.borrow().get(index).cloned().unwrap_or_default())
}

pub fn set_options(index: usize, options: Vec<String>) {
    OPTIONS.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(index) {
            *slot = options;
        }
    });
}

pub fn get_bound_flags(index: usize) -> BoundFlags {
    BOUND_FLAGS.with(|arr| arr.borrow().get(index).copied().unwrap_or_default())
}

pub fn set_bound_flags(index: usize, flags: BoundFlags) {
    BOUND_FLAGS.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(index) {
            *slot = flags;
        }
    });
}

// =============================================================================
// Displayed Value
// =============================================================================

pub fn get_value_signal(index: usize) -> Option<Signal<String>> {
    VALUE.with(|arr| arr.borrow().get(index).cloned().flatten())
}

pub fn get_value(index: usize) -> String {
    get_value_signal(index).map(|s| s.get()).unwrap_or_default()
}

/// Set the displayed value, creating its signal on first write.
pub fn set_value(index: usize, value: impl Into<String>) {
    let value = value.into();
    match get_value_signal(index) {
        Some(sig) => {
            sig.set(value);
        }
        None => VALUE.with(|arr| {
            if let Some(slot) = arr.borrow_mut().get_mut(index) {
                *slot = Some(signal(value));
            }
        }),
    }
}

// =============================================================================
// Revision
// =============================================================================

pub fn get_revision_signal(index: usize) -> Option<Signal<u64>> {
    REVISION.with(|arr| arr.borrow().get(index).cloned().flatten())
}

pub fn get_revision(index: usize) -> u64 {
    get_revision_signal(index).map(|s| s.get()).unwrap_or(0)
}

/// Increment the revision, creating its signal at 1 on first bump.
pub fn bump_revision(index: usize) {
    match get_revision_signal(index) {
        Some(sig) => {
            let next = sig.get() + 1;
            sig.set(next);
        }
        None => REVISION.with(|arr| {
            if let Some(slot) = arr.borrow_mut().get_mut(index) {
                *slot = Some(signal(1));
            }
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_signal_created_on_write() {
        reset();
        ensure_capacity(0);

        assert!(get_value_signal(0).is_none());
        assert_eq!(get_value(0), "");

        set_value(0, "abc");
        let sig = get_value_signal(0).unwrap();
        assert_eq!(sig.get(), "abc");

        set_value(0, "def");
        assert_eq!(sig.get(), "def");
    }

    #[test]
    fn test_revision_bumps() {
        reset();
        ensure_capacity(3);

        assert_eq!(get_revision(3), 0);
        bump_revision(3);
        bump_revision(3);
        assert_eq!(get_revision(3), 2);
    }

    #[test]
    fn test_clear_at_index() {
        reset();
        ensure_capacity(1);
        set_attr(1, "title", "t");
        set_text(1, "x");
        set_value(1, "v");
        set_bound_flags(1, BoundFlags::MIN);

        clear_at_index(1);
        assert_eq!(get_attr(1, "title"), None);
        assert_eq!(get_text(1), "");
        assert!(get_value_signal(1).is_none());
        assert_eq!(get_bound_flags(1), BoundFlags::NONE);
    }
}
