//! Record binder - a fixed composite of named, tagged fields.
//!
//! Each bindable field becomes a field container holding a label with the
//! field name and the widget its value dispatches to. Tags are parsed once,
//! here, at bind time.

use super::{all_or_nothing, convert_in, new_widget, resolve};
use crate::config::config;
use crate::engine::Widget;
use crate::error::{BindError, Location, Result};
use crate::meta::{Meta, Tags};
use crate::types::{Kind, WidgetKind};
use crate::validate::{default_registry, ValidatorRegistry};
use crate::value::Bound;

/// Bind a record, resolving validator names through the default registry.
pub fn bind_record(bound: &Bound, label: &str, id: &str, class: &str) -> Result<Widget> {
    bind_record_in(bound, label, id, class, &default_registry())
}

/// Bind a record, resolving validator names through `registry`.
///
/// All or nothing: the first field that fails aborts the bind with a
/// [`BindError::Conversion`] naming it. Nothing built so far survives and no
/// choice default is written back.
pub fn bind_record_in(
    bound: &Bound,
    label: &str,
    id: &str,
    class: &str,
    registry: &ValidatorRegistry,
) -> Result<Widget> {
    all_or_nothing(|| record_widget(bound, label, id, class, registry))
}

fn record_widget(
    bound: &Bound,
    label: &str,
    id: &str,
    class: &str,
    registry: &ValidatorRegistry,
) -> Result<Widget> {
    let target = resolve(bound, Kind::Record)?;
    let (name, fields) = target
        .read(|v| {
            v.as_record().map(|r| {
                let fields: Vec<(usize, String, Tags)> = r
                    .fields
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.bindable)
                    .map(|(i, f)| (i, f.name.clone(), f.tags.clone()))
                    .collect();
                (r.name.clone(), fields)
            })
        })
        .flatten()
        .ok_or_else(|| BindError::invalid("expected a record"))?;

    tracing::trace!(label, record = %name, fields = fields.len(), "binding record");

    let widget = new_widget(WidgetKind::Record, "record", label, id, class);
    for (position, field_name, tags) in fields {
        match bind_field(&target, position, &field_name, &tags, registry) {
            Ok(field) => widget.append(field),
            Err(err) => {
                widget.release();
                return Err(err.at(Location::Field(field_name)));
            }
        }
    }

    Ok(widget)
}

fn bind_field(
    record: &Bound,
    position: usize,
    name: &str,
    tags: &Tags,
    registry: &ValidatorRegistry,
) -> Result<Widget> {
    let meta = Meta::parse(tags, registry)?;
    let inner = convert_in(&record.field(position), &meta, registry)?;

    let container = Widget::create(WidgetKind::Field);
    container.set_classes(&config().class_for("record-field"), "");

    let label = Widget::create(WidgetKind::Label);
    label.set_text(name);

    container.append(label);
    container.append(inner);
    Ok(container)
}

/// The widget bound to field `name` of a record widget.
pub fn field_widget(record: Widget, name: &str) -> Option<Widget> {
    record
        .children_of_kind(WidgetKind::Field)
        .into_iter()
        .find(|field| {
            field
                .children_of_kind(WidgetKind::Label)
                .first()
                .is_some_and(|label| label.text() == name)
        })
        .and_then(|field| field.children().get(1).copied())
}
