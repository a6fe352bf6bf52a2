//! Widget Engine - Core Arrays
//!
//! Structural state:
//! - kind: What the widget is
//! - parent: Containing widget, if any
//! - children: Contained widgets, in order

use std::cell::RefCell;

use crate::types::WidgetKind;

// =============================================================================
// Arrays
// =============================================================================

thread_local! {
    /// Widget kind.
    static KIND: RefCell<Vec<WidgetKind>> = RefCell::new(Vec::new());

    /// Parent index.
    static PARENT: RefCell<Vec<Option<usize>>> = RefCell::new(Vec::new());

    /// Child indices, in order.
    static CHILDREN: RefCell<Vec<Vec<usize>>> = RefCell::new(Vec::new());
}

// =============================================================================
// Capacity Management
// =============================================================================

/// Ensure arrays have capacity for the given index.
pub fn ensure_capacity(index: usize) {
    KIND.with(|arr| grow(&mut arr.borrow_mut(), index));
    PARENT.with(|arr| grow(&mut arr.borrow_mut(), index));
    CHILDREN.with(|arr| grow(&mut arr.borrow_mut(), index));
}

fn grow<T: Default>(arr: &mut Vec<T>, index: usize) {
    if arr.len() <= index {
        arr.resize_with(index + 1, T::default);
    }
}

/// Clear values at index.
pub fn clear_at_index(index: usize) {
    KIND.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(index) {
            *slot = WidgetKind::None;
        }
    });
    PARENT.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(index) {
            *slot = None;
        }
    });
    CHILDREN.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(index) {
            slot.clear();
        }
    });
}

/// Reset all core arrays.
pub fn reset() {
    KIND.with(|arr| arr.borrow_mut().clear());
    PARENT.with(|arr| arr.borrow_mut().clear());
    CHILDREN.with(|arr| arr.borrow_mut().clear());
}

// =============================================================================
// Kind
// =============================================================================

pub fn get_kind(index: usize) -> WidgetKind {
    KIND.with(|arr| arr.borrow().get(index).copied().unwrap_or_default())
}

pub fn set_kind(index: usize, kind: WidgetKind) {
    KIND.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(index) {
            *slot = kind;
        }
    });
}

// =============================================================================
// Tree
// =============================================================================

pub fn get_parent(index: usize) -> Option<usize> {
    PARENT.with(|arr| arr.borrow().get(index).copied().flatten())
}

pub fn get_children(index: usize) -> Vec<usize> {
    CHILDREN.with(|arr| arr.borrow().get(index).cloned().unwrap_or_default())
}

/// Append `child` as the last child of `parent`.
///
/// A child that already has a parent is moved.
pub fn append_child(parent: usize, child: usize) {
    if let Some(old) = get_parent(child) {
        detach_child(old, child);
    }
    CHILDREN.with(|arr| {
        if let Some(children) = arr.borrow_mut().get_mut(parent) {
            children.push(child);
        }
    });
    PARENT.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(child) {
            *slot = Some(parent);
        }
    });
}

/// Remove `child` from `parent`'s children without releasing it.
pub fn detach_child(parent: usize, child: usize) {
    CHILDREN.with(|arr| {
        if let Some(children) = arr.borrow_mut().get_mut(parent) {
            children.retain(|&c| c != child);
        }
    });
    PARENT.with(|arr| {
        if let Some(slot) = arr.borrow_mut().get_mut(child) {
            if *slot == Some(parent) {
                *slot = None;
            }
        }
    });
}

/// Take all children of `index`, leaving it childless.
pub fn take_children(index: usize) -> Vec<usize> {
    CHILDREN.with(|arr| {
        arr.borrow_mut()
            .get_mut(index)
            .map(std::mem::take)
            .unwrap_or_default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_detach() {
        reset();
        for i in 0..3 {
            ensure_capacity(i);
        }
        append_child(0, 1);
        append_child(0, 2);
        assert_eq!(get_children(0), vec![1, 2]);
        assert_eq!(get_parent(2), Some(0));

        detach_child(0, 1);
        assert_eq!(get_children(0), vec![2]);
        assert_eq!(get_parent(1), None);
    }

    #[test]
    fn test_append_moves_child() {
        reset();
        for i in 0..3 {
            ensure_capacity(i);
        }
        append_child(0, 2);
        append_child(1, 2);
        assert!(get_children(0).is_empty());
        assert_eq!(get_children(1), vec![2]);
    }

    #[test]
    fn test_out_of_range_reads_default() {
        reset();
        assert_eq!(get_kind(99), WidgetKind::None);
        assert_eq!(get_parent(99), None);
        assert!(get_children(99).is_empty());
    }
}
