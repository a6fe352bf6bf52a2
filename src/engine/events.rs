//! Events - change and click handler registry and dispatch.
//!
//! The host feeds user interaction in through [`dispatch_change`] and
//! [`dispatch_click`]. A change carries the raw value the control now holds,
//! exactly as the rendering layer reports it (`"true"` for a ticked
//! checkbox, the typed text for an input, the option index for a select).
//!
//! Handlers are cloned out of the registry before they run, so a handler may
//! release widgets, including its own, without a re-entrant borrow.
//!
//! Dispatch takes a [`Widget`] handle rather than a bare index. A handle kept
//! across a release never reaches the widget that later reuses its index.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::arrays;
use super::widget::Widget;

// =============================================================================
// TYPES
// =============================================================================

/// Change handler. Receives the proposed raw value.
pub type ChangeHandler = Rc<dyn Fn(&str)>;

/// Click handler.
pub type ClickHandler = Rc<dyn Fn()>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

#[derive(Default)]
struct HandlerRegistry {
    change: HashMap<usize, ChangeHandler>,
    click: HashMap<usize, ClickHandler>,
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::default());
}

/// Install the change handler of widget `index`, replacing any previous one.
pub fn on_change<F>(index: usize, handler: F)
where
    F: Fn(&str) + 'static,
{
    REGISTRY.with(|reg| {
        reg.borrow_mut().change.insert(index, Rc::new(handler));
    });
}

/// Install the click handler of widget `index`, replacing any previous one.
pub fn on_click<F>(index: usize, handler: F)
where
    F: Fn() + 'static,
{
    REGISTRY.with(|reg| {
        reg.borrow_mut().click.insert(index, Rc::new(handler));
    });
}

pub fn has_change_handler(index: usize) -> bool {
    REGISTRY.with(|reg| reg.borrow().change.contains_key(&index))
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================

/// Deliver a change event to `widget`.
///
/// The displayed value becomes `proposed` first, as it would in a real
/// control, then the handler decides whether it sticks.
/// Returns true if a handler ran.
pub fn dispatch_change(widget: Widget, proposed: &str) -> bool {
    if !widget.is_alive() {
        tracing::warn!(index = widget.index(), "change dispatched to a released widget");
        return false;
    }
    let index = widget.index();

    arrays::content::set_value(index, proposed);

    let handler = REGISTRY.with(|reg| reg.borrow().change.get(&index).cloned());
    match handler {
        Some(handler) => {
            handler(proposed);
            true
        }
        None => false,
    }
}

/// Deliver a click to `widget`. Returns true if a handler ran.
pub fn dispatch_click(widget: Widget) -> bool {
    if !widget.is_alive() {
        tracing::warn!(index = widget.index(), "click dispatched to a released widget");
        return false;
    }
    let index = widget.index();

    let handler = REGISTRY.with(|reg| reg.borrow().click.get(&index).cloned());
    match handler {
        Some(handler) => {
            handler();
            true
        }
        None => false,
    }
}

// =============================================================================
// CLEANUP
// =============================================================================

/// Drop all handlers of a widget. Called when it is released.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        reg.change.remove(&index);
        reg.click.remove(&index);
    });
}

/// Reset event state (for testing).
pub fn reset_events() {
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::default());
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reset_registry;
    use crate::types::WidgetKind;
    use std::cell::Cell;

    #[test]
    fn test_dispatch_change_sets_value_then_runs_handler() {
        reset_registry();
        let w = Widget::create(WidgetKind::TextInput);
        let idx = w.index();

        let seen = Rc::new(RefCell::new(String::new()));
        let seen_clone = seen.clone();
        on_change(idx, move |v| {
            *seen_clone.borrow_mut() = format!("{v}|{}", arrays::content::get_value(idx));
        });

        assert!(dispatch_change(w, "42"));
        assert_eq!(*seen.borrow(), "42|42");
    }

    #[test]
    fn test_dispatch_without_handler() {
        reset_registry();
        let w = Widget::create(WidgetKind::TextInput);
        assert!(!dispatch_change(w, "x"));
        assert!(!dispatch_click(w));
    }

    #[test]
    fn test_handler_may_release_own_widget() {
        reset_registry();
        let w = Widget::create(WidgetKind::Button);
        let ran = Rc::new(Cell::new(false));
        let ran_clone = ran.clone();
        on_click(w.index(), move || {
            w.release();
            ran_clone.set(true);
        });

        assert!(dispatch_click(w));
        assert!(ran.get());
        assert!(!dispatch_click(w));
    }

    #[test]
    fn test_stale_handle_does_not_reach_new_occupant() {
        reset_registry();
        let keep = Widget::create(WidgetKind::List);
        let old = Widget::create(WidgetKind::TextInput);
        old.release();

        let new = Widget::create(WidgetKind::TextInput);
        let hits = Rc::new(Cell::new(0));
        let hits_clone = hits.clone();
        on_change(new.index(), move |_| hits_clone.set(hits_clone.get() + 1));
        assert_eq!(new.index(), old.index());

        assert!(!dispatch_change(old, "x"));
        assert_eq!(hits.get(), 0);
        assert_eq!(new.value(), "");
        assert!(dispatch_change(new, "y"));
        assert_eq!(hits.get(), 1);
        assert!(keep.is_alive());
    }

    #[test]
    fn test_cleanup_drops_handlers() {
        reset_registry();
        let w = Widget::create(WidgetKind::TextInput);
        on_change(w.index(), |_| {});
        assert!(has_change_handler(w.index()));
        cleanup_index(w.index());
        assert!(!has_change_handler(w.index()));
    }
}
