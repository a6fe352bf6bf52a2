//! Widget Engine - Parallel Arrays
//!
//! All widget state lives in these parallel arrays. Each array index
//! corresponds to one widget.
//!
//! # Array Categories
//!
//! - **core**: Widget kind, parent, children
//! - **content**: Attributes, text, options, native bound flags, displayed value

pub mod content;
pub mod core;

use self::content as content_arrays;
use self::core as core_arrays;

/// Ensure all arrays have capacity for the given index.
///
/// Called by registry when allocating.
pub fn ensure_all_capacity(index: usize) {
    core_arrays::ensure_capacity(index);
    content_arrays::ensure_capacity(index);
}

/// Clear all array values at an index.
///
/// Called by registry when releasing.
pub fn clear_all_at_index(index: usize) {
    core_arrays::clear_at_index(index);
    content_arrays::clear_at_index(index);
}

/// Reset all parallel arrays to release memory.
pub fn reset_all_arrays() {
    core_arrays::reset();
    content_arrays::reset();
}
