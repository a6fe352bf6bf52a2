//! List binder - a resizable, homogeneous sequence.
//!
//! ```text
//! list "scores"
//!   item
//!     number = 2
//!     button '-'
//!   item
//!     number = 4
//!     button '-'
//!   button '+'
//! ```
//!
//! Row handlers close over a positional index, so every add and remove
//! rebuilds all rows from the list. Rows are never patched in place.
//!
//! The element prototype is bound once, off to the side, before anything
//! else. An element created by "add" is a zeroed prototype, so it is known to
//! bind and a rebuild can only fail if the contract is broken.

use std::rc::Rc;

use spark_signals::Signal;

use super::{all_or_nothing, convert_in, new_widget, resolve};
use crate::config::config;
use crate::engine::Widget;
use crate::error::{BindError, Location, Result};
use crate::meta::{ElemMeta, Meta};
use crate::types::{Kind, WidgetKind};
use crate::validate::{default_registry, ValidatorRegistry};
use crate::value::{Bound, List, Value};

// =============================================================================
// List state
// =============================================================================

/// Shared by the add and remove handlers of one list widget.
struct ListState {
    target: Bound,
    elem: Meta,
    registry: ValidatorRegistry,
    widget: Widget,
    add_text: String,
    remove_text: String,
}

impl ListState {
    fn len(&self) -> usize {
        self.target
            .read(|v| v.as_list().map(List::len))
            .flatten()
            .unwrap_or(0)
    }

    /// Build one row per element plus the trailing add button.
    fn populate(self: &Rc<Self>) -> Result<()> {
        for index in 0..self.len() {
            let elem = convert_in(&self.target.index(index), &self.elem, &self.registry)
                .map_err(|e| e.at(Location::Index(index)))?;

            let row = Widget::create(WidgetKind::ListItem);
            row.append(elem);

            let remove = Widget::create(WidgetKind::Button);
            remove.set_text(self.remove_text.as_str());
            let state = self.clone();
            remove.on_click(move || state.remove(index));
            row.append(remove);

            self.widget.append(row);
        }

        let add = Widget::create(WidgetKind::Button);
        add.set_text(self.add_text.as_str());
        let state = self.clone();
        add.on_click(move || state.add());
        self.widget.append(add);

        self.widget.bump_revision();
        Ok(())
    }

    fn rebuild(self: &Rc<Self>) {
        tracing::trace!(widget = self.widget.index(), len = self.len(), "rebuilding list rows");
        self.widget.clear_children();
        if let Err(err) = self.populate() {
            panic!("list element no longer binds after a structural change: {err}");
        }
    }

    fn add(self: &Rc<Self>) {
        let added = self
            .target
            .write(|v| match v {
                Value::List(list) => {
                    list.push_zeroed();
                    true
                }
                _ => false,
            })
            .unwrap_or(false);

        if !added {
            tracing::warn!(widget = self.widget.index(), "list no longer resolves, add ignored");
            return;
        }
        tracing::debug!(widget = self.widget.index(), len = self.len(), "list element added");
        self.rebuild();
    }

    fn remove(self: &Rc<Self>, index: usize) {
        let removed = self
            .target
            .write(|v| match v {
                Value::List(list) => list.remove(index),
                _ => None,
            })
            .flatten();

        if removed.is_none() {
            tracing::warn!(widget = self.widget.index(), index, "list element missing, remove ignored");
            return;
        }
        tracing::debug!(widget = self.widget.index(), index, len = self.len(), "list element removed");
        self.rebuild();
    }
}

// =============================================================================
// Binding
// =============================================================================

/// Bind a list. Every element is bound with the same `elem` metadata.
///
/// Fails with a [`BindError::Conversion`] at the index of the first element
/// that does not bind. An element prototype that does not bind is reported
/// at the index "add" would have given it.
pub fn bind_list(bound: &Bound, label: &str, id: &str, class: &str, elem: ElemMeta) -> Result<Widget> {
    bind_list_in(bound, label, id, class, elem, &default_registry())
}

/// [`bind_list`], resolving validator names of record elements through
/// `registry`.
pub fn bind_list_in(
    bound: &Bound,
    label: &str,
    id: &str,
    class: &str,
    elem: ElemMeta,
    registry: &ValidatorRegistry,
) -> Result<Widget> {
    all_or_nothing(|| list_widget(bound, label, id, class, elem, registry))
}

fn list_widget(
    bound: &Bound,
    label: &str,
    id: &str,
    class: &str,
    elem: ElemMeta,
    registry: &ValidatorRegistry,
) -> Result<Widget> {
    let target = resolve(bound, Kind::List)
        .map_err(|_| BindError::invalid(format!("'{label}' is not a sequence")))?;
    let prototype = target
        .read(|v| v.as_list().map(|l| l.elem().zeroed()))
        .flatten()
        .ok_or_else(|| BindError::invalid("expected a list"))?;

    let elem = elem.to_meta();
    let probe = convert_in(&Bound::new(prototype), &elem, registry).map(Widget::release);

    tracing::trace!(label, "binding list");

    let cfg = config();
    let widget = new_widget(WidgetKind::List, "list", label, id, class);
    let state = Rc::new(ListState {
        target,
        elem,
        registry: registry.clone(),
        widget,
        add_text: cfg.add_text,
        remove_text: cfg.remove_text,
    });

    if let Err(err) = state.populate() {
        widget.release();
        return Err(err);
    }
    if let Err(err) = probe {
        let at = state.len();
        widget.release();
        return Err(err.at(Location::Index(at)));
    }

    Ok(widget)
}

// =============================================================================
// Host helpers
// =============================================================================

/// Rows of a list widget, in element order.
pub fn list_rows(list: Widget) -> Vec<Widget> {
    list.children_of_kind(WidgetKind::ListItem)
}

/// The trailing add button of a list widget.
pub fn add_button(list: Widget) -> Option<Widget> {
    list.children_of_kind(WidgetKind::Button).last().copied()
}

/// The remove button of a list row.
pub fn remove_button(row: Widget) -> Option<Widget> {
    row.children_of_kind(WidgetKind::Button).first().copied()
}

/// Reactive revision of a list widget, bumped each time its rows are built.
pub fn list_revision(list: Widget) -> Option<Signal<u64>> {
    list.revision_signal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind::bind_int;
    use crate::config::{reset_config, set_config, BindConfig};
    use crate::engine::{get_allocated_count, reset_registry};
    use crate::meta::Tags;
    use crate::types::Bounds;
    use crate::validate::ValidateInt;
    use crate::value::{Field, Record};
    use std::collections::BTreeMap;

    fn ints(items: &[i64]) -> Bound {
        let items = items.iter().map(|&i| Value::Int(i)).collect();
        Bound::new(List::from_values(0i64, items).unwrap())
    }

    fn list_ints(bound: &Bound) -> Vec<i64> {
        bound
            .read(|v| v.as_list().unwrap().items().iter().filter_map(Value::as_int).collect())
            .unwrap()
    }

    fn row_values(list: Widget) -> Vec<String> {
        list_rows(list).iter().map(|r| r.children()[0].value()).collect()
    }

    #[test]
    fn test_round_trip() {
        reset_registry();
        reset_config();
        let l = ints(&[2, 4]);
        let w = bind_list(&l, "scores", "", "", ElemMeta::default()).unwrap();

        assert_eq!(w.title(), "scores");
        assert!(w.has_class("spark-list"));
        assert_eq!(row_values(w), vec!["2", "4"]);
        assert_eq!(add_button(w).unwrap().text(), "+");
        assert_eq!(remove_button(list_rows(w)[0]).unwrap().text(), "-");
    }

    #[test]
    fn test_empty_list_has_only_add_button() {
        reset_registry();
        let w = bind_list(&ints(&[]), "", "", "", ElemMeta::default()).unwrap();
        assert!(list_rows(w).is_empty());
        assert_eq!(w.children().len(), 1);
    }

    #[test]
    fn test_add_appends_zero_and_rebuilds() {
        reset_registry();
        let l = ints(&[2, 4]);
        let w = bind_list(&l, "", "", "", ElemMeta::default()).unwrap();
        let before = list_revision(w).unwrap().get();

        add_button(w).unwrap().click();
        assert_eq!(list_ints(&l), vec![2, 4, 0]);
        assert_eq!(list_rows(w).len(), 3);
        assert_eq!(row_values(w), vec!["2", "4", "0"]);
        assert_eq!(list_revision(w).unwrap().get(), before + 1);
    }

    #[test]
    fn test_remove_splices_and_rebuilds() {
        reset_registry();
        let l = ints(&[2, 4, 6]);
        let w = bind_list(&l, "", "", "", ElemMeta::default()).unwrap();

        let row = list_rows(w)[1];
        remove_button(row).unwrap().click();

        assert_eq!(list_ints(&l), vec![2, 6]);
        assert_eq!(row_values(w), vec!["2", "6"]);
        assert!(!row.is_alive());
    }

    #[test]
    fn test_stale_remove_button_is_inert_after_rebuild() {
        reset_registry();
        let l = ints(&[2, 4, 6]);
        let w = bind_list(&l, "", "", "", ElemMeta::default()).unwrap();
        let old_row = list_rows(w)[2];
        let old_remove = remove_button(old_row).unwrap();

        remove_button(list_rows(w)[1]).unwrap().click();
        assert!(!old_remove.click());
        assert!(!old_row.is_alive());
        assert_eq!(old_row.kind(), WidgetKind::None);

        assert_eq!(list_ints(&l), vec![2, 6]);
        assert_eq!(row_values(w), vec!["2", "6"]);
    }

    #[test]
    fn test_failed_choice_list_writes_no_defaults() {
        reset_registry();
        let items = vec![Value::from(""), Value::from("zzz")];
        let l = Bound::new(List::from_values("", items).unwrap());

        let err = bind_list(&l, "", "", "", ElemMeta::default().choices(["a", "b"])).unwrap_err();
        assert_eq!(err.path(), vec![&Location::Index(1)]);
        assert!(matches!(err.root(), BindError::InvalidDefault { .. }));
        let after = l.read(|v| v.as_list().unwrap().items().to_vec()).unwrap();
        assert_eq!(after, vec![Value::from(""), Value::from("zzz")]);
        assert_eq!(get_allocated_count(), 0);
    }

    #[test]
    fn test_choice_list_writes_defaults_on_success() {
        reset_registry();
        let l = Bound::new(List::from_values("", vec![Value::from(""), Value::from("b")]).unwrap());
        bind_list(&l, "", "", "", ElemMeta::default().choices(["a", "b"])).unwrap();

        let after = l.read(|v| v.as_list().unwrap().items().to_vec()).unwrap();
        assert_eq!(after, vec![Value::from("a"), Value::from("b")]);
    }

    #[test]
    fn test_prototype_bind_keeps_existing_id_lookup() {
        reset_registry();
        let qty = Bound::new(1i64);
        let standalone = bind_int(&qty, "", "qty", "", Bounds::NONE, None).unwrap();

        let item = Record::new("Item")
            .with(Field::new("qty", 0i64).tags(Tags::new().with("id", "qty")));
        let l = Bound::new(List::new(item));
        bind_list(&l, "", "", "", ElemMeta::default()).unwrap();

        assert_eq!(Widget::by_id("qty"), Some(standalone));
    }

    #[test]
    fn test_rows_edit_their_own_element_after_rebuild() {
        reset_registry();
        let l = ints(&[2, 4, 6]);
        let w = bind_list(&l, "", "", "", ElemMeta::default()).unwrap();

        remove_button(list_rows(w)[0]).unwrap().click();
        list_rows(w)[1].children()[0].input("60");
        assert_eq!(list_ints(&l), vec![4, 60]);
    }

    #[test]
    fn test_element_meta_is_uniform() {
        reset_registry();
        let l = ints(&[1, 2]);
        let elem = ElemMeta::default()
            .bounds(Bounds::NONE.with_max(10.0))
            .validator(Rc::new(ValidateInt(|i| i != 5)));
        let w = bind_list(&l, "", "", "", elem).unwrap();

        for (i, row) in list_rows(w).into_iter().enumerate() {
            let input = row.children()[0];
            assert_eq!(input.attr("max").as_deref(), Some("10"));
            input.input("5");
            input.input("11");
            assert_eq!(list_ints(&l)[i], (i + 1) as i64);
        }
    }

    #[test]
    fn test_not_a_sequence() {
        reset_registry();
        let err = bind_list(&Bound::new(3i64), "nums", "", "", ElemMeta::default()).unwrap_err();
        assert!(matches!(err, BindError::InvalidArgument(_)));
    }

    #[test]
    fn test_element_failure_releases_partial_widgets() {
        reset_registry();
        let bad = Record::new("R").with(
            Field::new("n", 1i64).tags(Tags::new().with("validator", "DoesNotExist")),
        );
        let l = Bound::new(List::from_values(bad.clone(), vec![bad.into()]).unwrap());

        let err = bind_list(&l, "", "", "", ElemMeta::default()).unwrap_err();
        assert_eq!(err.path(), vec![&Location::Index(0), &Location::Field("n".into())]);
        assert!(matches!(err.root(), BindError::UnregisteredValidator(_)));
        assert_eq!(get_allocated_count(), 0);
    }

    #[test]
    fn test_unbindable_prototype_fails_empty_list() {
        reset_registry();
        let l = Bound::new(List::new(Value::Map(BTreeMap::new())));
        let err = bind_list(&l, "", "", "", ElemMeta::default()).unwrap_err();
        assert_eq!(err.path(), vec![&Location::Index(0)]);
        assert!(matches!(err.root(), BindError::UnsupportedType(Kind::Map)));
        assert_eq!(get_allocated_count(), 0);
    }

    #[test]
    fn test_reference_elements_get_fresh_referents() {
        reset_registry();
        let l = Bound::new(List::from_values(Value::reference(0i64), vec![Value::reference(3i64)]).unwrap());
        let w = bind_list(&l, "", "", "", ElemMeta::default()).unwrap();

        add_button(w).unwrap().click();
        list_rows(w)[1].children()[0].input("8");
        let items = l.read(|v| v.as_list().unwrap().items().to_vec()).unwrap();
        assert_eq!(items, vec![Value::reference(3i64), Value::reference(8i64)]);
    }

    #[test]
    fn test_button_text_from_config() {
        reset_registry();
        set_config(BindConfig {
            add_text: "Add".into(),
            remove_text: "Delete".into(),
            ..BindConfig::default()
        });
        let w = bind_list(&ints(&[1]), "", "", "", ElemMeta::default()).unwrap();
        assert_eq!(add_button(w).unwrap().text(), "Add");
        assert_eq!(remove_button(list_rows(w)[0]).unwrap().text(), "Delete");
        reset_config();
    }
}
