//! Widget - opaque handle over an engine index.
//!
//! Hosts read everything they need to render through [`Widget`] accessors and
//! push user interaction back through its typed helpers, which all go through
//! [`dispatch_change`](super::events::dispatch_change) or
//! [`dispatch_click`](super::events::dispatch_click).
//!
//! A handle outlives the widget it names. Indices are reused, so a handle
//! also carries the generation its index had when it was created. Once the
//! widget is released (a list rebuilds its rows, for example) the generation
//! no longer matches: every accessor reads defaults, every setter and
//! `release` does nothing, and dispatch is a no-op, even after the index has
//! been handed to a new widget.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use spark_signals::Signal;

use super::arrays::{content, core};
use super::events;
use super::registry::{
    allocate_index, generation, get_index, is_allocated, register_id, release_index,
};
use crate::types::{BoundFlags, WidgetKind};

/// Handle to one widget in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Widget {
    index: usize,
    generation: u32,
}

// =============================================================================
// Construction (crate internal)
// =============================================================================

impl Widget {
    /// Allocate a widget of `kind`.
    pub(crate) fn create(kind: WidgetKind) -> Widget {
        let index = allocate_index();
        core::set_kind(index, kind);
        Widget::current(index)
    }

    /// Handle to whatever currently occupies `index`.
    fn current(index: usize) -> Widget {
        Widget {
            index,
            generation: generation(index),
        }
    }

    /// The index, if this handle still names a live widget.
    fn live(self) -> Option<usize> {
        (is_allocated(self.index) && generation(self.index) == self.generation).then_some(self.index)
    }

    pub(crate) fn set_attr(self, name: &str, value: impl Into<String>) {
        let Some(index) = self.live() else { return };
        let value = value.into();
        if name == "id" && !value.is_empty() {
            register_id(index, &value);
        }
        content::set_attr(index, name, value);
    }

    /// Set the `class` attribute from the generated class plus an optional
    /// caller class.
    pub(crate) fn set_classes(self, generated: &str, extra: &str) {
        if extra.is_empty() {
            self.set_attr("class", generated);
        } else {
            self.set_attr("class", format!("{generated} {extra}"));
        }
    }

    pub(crate) fn set_text(self, text: impl Into<String>) {
        if let Some(index) = self.live() {
            content::set_text(index, text);
        }
    }

    pub(crate) fn set_options(self, options: Vec<String>) {
        if let Some(index) = self.live() {
            content::set_options(index, options);
        }
    }

    pub(crate) fn set_bound_flags(self, flags: BoundFlags) {
        if let Some(index) = self.live() {
            content::set_bound_flags(index, flags);
        }
    }

    /// Set the displayed value without running the change handler.
    pub(crate) fn show(self, value: impl Into<String>) {
        if let Some(index) = self.live() {
            content::set_value(index, value);
        }
    }

    pub(crate) fn append(self, child: Widget) {
        if let (Some(parent), Some(child)) = (self.live(), child.live()) {
            core::append_child(parent, child);
        }
    }

    pub(crate) fn on_change(self, handler: impl Fn(&str) + 'static) {
        if let Some(index) = self.live() {
            events::on_change(index, handler);
        }
    }

    pub(crate) fn on_click(self, handler: impl Fn() + 'static) {
        if let Some(index) = self.live() {
            events::on_click(index, handler);
        }
    }

    pub(crate) fn bump_revision(self) {
        if let Some(index) = self.live() {
            content::bump_revision(index);
        }
    }

    /// Release every child, keeping this widget.
    pub(crate) fn clear_children(self) {
        let Some(index) = self.live() else { return };
        for child in core::take_children(index) {
            release_index(child);
        }
    }

    /// Release this widget and its subtree.
    pub fn release(self) {
        if let Some(index) = self.live() {
            release_index(index);
        }
    }
}

// =============================================================================
// Accessors
// =============================================================================

impl Widget {
    /// Look a widget up by its `id` attribute. The most recent bind wins.
    pub fn by_id(id: &str) -> Option<Widget> {
        get_index(id).map(Widget::current)
    }

    /// Engine index. Shared with any later widget that reuses it.
    pub fn index(self) -> usize {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }

    /// True until this widget is released.
    pub fn is_alive(self) -> bool {
        self.live().is_some()
    }

    pub fn kind(self) -> WidgetKind {
        self.live().map(core::get_kind).unwrap_or_default()
    }

    pub fn attr(self, name: &str) -> Option<String> {
        self.live().and_then(|index| content::get_attr(index, name))
    }

    pub fn attrs(self) -> BTreeMap<String, String> {
        self.live().map(content::get_attrs).unwrap_or_default()
    }

    /// The `title` attribute, or empty.
    pub fn title(self) -> String {
        self.attr("title").unwrap_or_default()
    }

    /// The `id` attribute, or empty.
    pub fn id(self) -> String {
        self.attr("id").unwrap_or_default()
    }

    pub fn classes(self) -> Vec<String> {
        self.attr("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn has_class(self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Displayed value, exactly as a host would render it.
    pub fn value(self) -> String {
        self.live().map(content::get_value).unwrap_or_default()
    }

    /// Reactive displayed value. `None` until the widget shows anything.
    pub fn value_signal(self) -> Option<Signal<String>> {
        self.live().and_then(content::get_value_signal)
    }

    /// Checkbox state.
    pub fn checked(self) -> bool {
        self.value() == "true"
    }

    /// Select state. `None` for anything that does not hold an index.
    pub fn selected_index(self) -> Option<usize> {
        self.value().parse().ok()
    }

    /// Select options, in order.
    pub fn options(self) -> Vec<String> {
        self.live().map(content::get_options).unwrap_or_default()
    }

    /// Label and button text.
    pub fn text(self) -> String {
        self.live().map(content::get_text).unwrap_or_default()
    }

    pub fn bound_flags(self) -> BoundFlags {
        self.live().map(content::get_bound_flags).unwrap_or_default()
    }

    pub fn parent(self) -> Option<Widget> {
        self.live().and_then(core::get_parent).map(Widget::current)
    }

    pub fn children(self) -> Vec<Widget> {
        self.live()
            .map(core::get_children)
            .unwrap_or_default()
            .into_iter()
            .map(Widget::current)
            .collect()
    }

    pub fn children_of_kind(self, kind: WidgetKind) -> Vec<Widget> {
        self.children()
            .into_iter()
            .filter(|c| c.kind() == kind)
            .collect()
    }

    /// Structural revision. Zero until the first structural change.
    pub fn revision(self) -> u64 {
        self.live().map(content::get_revision).unwrap_or(0)
    }

    pub fn revision_signal(self) -> Option<Signal<u64>> {
        self.live().and_then(content::get_revision_signal)
    }
}

// =============================================================================
// Interaction
// =============================================================================

impl Widget {
    /// Type `text` into an input.
    pub fn input(self, text: &str) -> bool {
        events::dispatch_change(self, text)
    }

    /// Tick or untick a checkbox.
    pub fn set_checked(self, checked: bool) -> bool {
        events::dispatch_change(self, if checked { "true" } else { "false" })
    }

    pub fn toggle(self) -> bool {
        self.set_checked(!self.checked())
    }

    /// Pick option `index` of a select.
    pub fn select(self, index: usize) -> bool {
        events::dispatch_change(self, &index.to_string())
    }

    pub fn click(self) -> bool {
        events::dispatch_click(self)
    }
}

// =============================================================================
// Outline
// =============================================================================

/// Indented text description of the tree rooted at `widget`.
///
/// One line per widget: kind, then `"title"`, `'text'`, `{options}` and
/// `= value` when present.
///
/// ```text
/// record "cfg"
///   field
///     label 'N'
///     number "count" = 3
/// ```
pub fn outline(widget: Widget) -> String {
    let mut out = String::new();
    outline_into(&mut out, widget, 0);
    out
}

fn outline_into(out: &mut String, widget: Widget, depth: usize) {
    let _ = write!(out, "{:indent$}{}", "", widget.kind(), indent = depth * 2);

    let title = widget.title();
    if !title.is_empty() {
        let _ = write!(out, " \"{title}\"");
    }
    let text = widget.text();
    if !text.is_empty() {
        let _ = write!(out, " '{text}'");
    }
    let options = widget.options();
    if !options.is_empty() {
        let _ = write!(out, " {{{}}}", options.join("|"));
    }
    if let Some(value) = widget.value_signal() {
        let _ = write!(out, " = {}", value.get());
    }
    out.push('\n');

    for child in widget.children() {
        outline_into(out, child, depth + 1);
    }
}
