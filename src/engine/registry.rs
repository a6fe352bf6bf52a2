//! Widget Registry - Index allocation for parallel arrays.
//!
//! Manages the lifecycle of widget indices:
//! - Free index pool for O(1) reuse
//! - Generation per index, bumped on release, so stale handles stop matching
//! - Allocated index set for iteration and liveness checks
//! - Id attribute → index lookup, most recent live registration first
//! - Recursive release of a widget and its subtree
//! - Destroy callbacks

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use super::arrays;
use super::events;

// =============================================================================
// Registry State
// =============================================================================

thread_local! {
    /// Currently allocated indices.
    static ALLOCATED_INDICES: RefCell<BTreeSet<usize>> = RefCell::new(BTreeSet::new());

    /// Pool of freed indices for reuse.
    static FREE_INDICES: RefCell<Vec<usize>> = RefCell::new(Vec::new());

    /// Next index to allocate if pool is empty.
    static NEXT_INDEX: RefCell<usize> = const { RefCell::new(0) };

    /// Generation of each index. Survives the empty-registry reset.
    static GENERATIONS: RefCell<Vec<u32>> = RefCell::new(Vec::new());

    /// Indices registered under each id attribute, oldest first.
    static ID_TO_INDEX: RefCell<HashMap<String, Vec<usize>>> = RefCell::new(HashMap::new());

    /// Destroy callbacks registered per index.
    static DESTROY_CALLBACKS: RefCell<HashMap<usize, Vec<Box<dyn FnOnce()>>>> = RefCell::new(HashMap::new());
}

// =============================================================================
// Index Allocation
// =============================================================================

/// Allocate an index for a new widget.
pub fn allocate_index() -> usize {
    let index = FREE_INDICES.with(|free| free.borrow_mut().pop()).unwrap_or_else(|| {
        NEXT_INDEX.with(|next| {
            let mut next = next.borrow_mut();
            let index = *next;
            *next += 1;
            index
        })
    });

    ALLOCATED_INDICES.with(|set| {
        set.borrow_mut().insert(index);
    });

    GENERATIONS.with(|gens| {
        let mut gens = gens.borrow_mut();
        if gens.len() <= index {
            gens.resize(index + 1, 0);
        }
    });
    arrays::ensure_all_capacity(index);

    index
}

/// Current generation of `index`.
pub fn generation(index: usize) -> u32 {
    GENERATIONS.with(|gens| gens.borrow().get(index).copied().unwrap_or(0))
}

/// Release an index back to the pool.
///
/// Releases the whole subtree first, children before parents.
pub fn release_index(index: usize) {
    if !is_allocated(index) {
        return;
    }

    for child in arrays::core::take_children(index) {
        release_index(child);
    }

    if let Some(parent) = arrays::core::get_parent(index) {
        arrays::core::detach_child(parent, index);
    }

    run_destroy_callbacks(index);
    events::cleanup_index(index);

    ID_TO_INDEX.with(|map| {
        let mut map = map.borrow_mut();
        for indices in map.values_mut() {
            indices.retain(|&i| i != index);
        }
        map.retain(|_, indices| !indices.is_empty());
    });
    ALLOCATED_INDICES.with(|set| {
        set.borrow_mut().remove(&index);
    });
    GENERATIONS.with(|gens| {
        if let Some(generation) = gens.borrow_mut().get_mut(index) {
            *generation = generation.wrapping_add(1);
        }
    });

    arrays::clear_all_at_index(index);

    FREE_INDICES.with(|free| {
        free.borrow_mut().push(index);
    });

    // When every widget is gone, drop array storage too.
    let is_empty = ALLOCATED_INDICES.with(|set| set.borrow().is_empty());
    if is_empty {
        arrays::reset_all_arrays();
        FREE_INDICES.with(|free| free.borrow_mut().clear());
        NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    }
}

// =============================================================================
// Destroy Callbacks
// =============================================================================

/// Register a callback to run when the widget at `index` is released.
pub fn on_destroy(index: usize, callback: impl FnOnce() + 'static) {
    DESTROY_CALLBACKS.with(|callbacks| {
        callbacks
            .borrow_mut()
            .entry(index)
            .or_default()
            .push(Box::new(callback));
    });
}

/// Run and clear destroy callbacks for an index.
fn run_destroy_callbacks(index: usize) {
    let callbacks = DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().remove(&index));
    if let Some(callbacks) = callbacks {
        for callback in callbacks {
            callback();
        }
    }
}

// =============================================================================
// Lookups
// =============================================================================

/// Record `id` as the id attribute of `index`.
///
/// An earlier widget with the same id is shadowed, not forgotten: it answers
/// the lookup again once every later holder is released.
pub(crate) fn register_id(index: usize, id: &str) {
    ID_TO_INDEX.with(|map| {
        let mut map = map.borrow_mut();
        let indices = map.entry(id.to_string()).or_default();
        indices.retain(|&i| i != index);
        indices.push(index);
    });
}

/// Get index for an id attribute.
pub fn get_index(id: &str) -> Option<usize> {
    ID_TO_INDEX.with(|map| map.borrow().get(id).and_then(|indices| indices.last().copied()))
}

/// Check if an index is currently allocated.
pub fn is_allocated(index: usize) -> bool {
    ALLOCATED_INDICES.with(|set| set.borrow().contains(&index))
}

/// Get all currently allocated indices, ascending.
pub fn get_allocated_indices() -> Vec<usize> {
    ALLOCATED_INDICES.with(|set| set.borrow().iter().copied().collect())
}

/// Get the count of currently allocated widgets.
pub fn get_allocated_count() -> usize {
    ALLOCATED_INDICES.with(|set| set.borrow().len())
}

// =============================================================================
// Reset (for testing)
// =============================================================================

/// Reset all registry state (for testing).
pub fn reset_registry() {
    ALLOCATED_INDICES.with(|set| set.borrow_mut().clear());
    FREE_INDICES.with(|free| free.borrow_mut().clear());
    NEXT_INDEX.with(|next| *next.borrow_mut() = 0);
    GENERATIONS.with(|gens| gens.borrow_mut().clear());
    ID_TO_INDEX.with(|map| map.borrow_mut().clear());
    DESTROY_CALLBACKS.with(|callbacks| callbacks.borrow_mut().clear());
    events::reset_events();
    arrays::reset_all_arrays();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_index() {
        reset_registry();

        let idx1 = allocate_index();
        let idx2 = allocate_index();

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert!(is_allocated(0));
        assert!(is_allocated(1));
        assert!(!is_allocated(2));
        assert_eq!(get_allocated_count(), 2);
    }

    #[test]
    fn test_release_and_reuse() {
        reset_registry();

        let idx1 = allocate_index();
        let idx2 = allocate_index();

        release_index(idx1);
        assert!(!is_allocated(idx1));
        assert!(is_allocated(idx2));

        let idx3 = allocate_index();
        assert_eq!(idx3, idx1);
    }

    #[test]
    fn test_release_bumps_generation() {
        reset_registry();

        let idx = allocate_index();
        let keep = allocate_index();
        let before = generation(idx);

        release_index(idx);
        assert_eq!(allocate_index(), idx);
        assert_eq!(generation(idx), before + 1);
        assert_eq!(generation(keep), 0);
    }

    #[test]
    fn test_generation_survives_empty_reset() {
        reset_registry();

        let idx = allocate_index();
        release_index(idx);
        assert_eq!(get_allocated_count(), 0);

        assert_eq!(allocate_index(), idx);
        assert_eq!(generation(idx), 1);
    }

    #[test]
    fn test_release_subtree() {
        reset_registry();

        let root = allocate_index();
        let child = allocate_index();
        let grandchild = allocate_index();
        let keep = allocate_index();
        arrays::core::append_child(root, child);
        arrays::core::append_child(child, grandchild);

        release_index(root);
        assert_eq!(get_allocated_indices(), vec![keep]);
    }

    #[test]
    fn test_release_detaches_from_parent() {
        reset_registry();

        let parent = allocate_index();
        let a = allocate_index();
        let b = allocate_index();
        arrays::core::append_child(parent, a);
        arrays::core::append_child(parent, b);

        release_index(a);
        assert_eq!(arrays::core::get_children(parent), vec![b]);
    }

    #[test]
    fn test_id_mapping() {
        reset_registry();

        let idx = allocate_index();
        register_id(idx, "name");
        assert_eq!(get_index("name"), Some(idx));

        release_index(idx);
        assert_eq!(get_index("name"), None);
    }

    #[test]
    fn test_id_mapping_falls_back_to_earlier_holder() {
        reset_registry();

        let first = allocate_index();
        register_id(first, "name");
        let second = allocate_index();
        register_id(second, "name");
        assert_eq!(get_index("name"), Some(second));

        release_index(second);
        assert_eq!(get_index("name"), Some(first));
    }

    #[test]
    fn test_destroy_callback() {
        use std::cell::Cell;
        use std::rc::Rc;

        reset_registry();

        let called = Rc::new(Cell::new(false));
        let called_clone = called.clone();

        let idx = allocate_index();
        on_destroy(idx, move || {
            called_clone.set(true);
        });

        assert!(!called.get());
        release_index(idx);
        assert!(called.get());
    }
}
