//! Widget Engine - Headless widget tree, parallel arrays and event dispatch.
//!
//! The engine manages the core data structures:
//! - Registry: Index allocation, id mapping, recursive release
//! - Arrays: Parallel arrays for widget state
//! - Events: Change and click handlers, dispatch
//! - Widget: Typed handle hosts render from and interact through
//!
//! # Architecture
//!
//! Widgets are NOT objects. They are indices into parallel arrays:
//!
//! ```text
//! Index 0: Record      (parent=None, title="cfg", class="spark-record")
//! Index 1: Field       (parent=0)
//! Index 2: NumberInput (parent=1, title="count", min="0", value=Signal("3"))
//! ```
//!
//! Nothing here draws. A host walks the tree, renders each widget from its
//! arrays, and calls back into [`dispatch_change`] / [`dispatch_click`].

mod events;
mod registry;
mod widget;
pub mod arrays;

pub use events::{
    cleanup_index, dispatch_change, dispatch_click, has_change_handler, on_change, on_click,
    reset_events, ChangeHandler, ClickHandler,
};
pub use registry::*;
pub use widget::{outline, Widget};
