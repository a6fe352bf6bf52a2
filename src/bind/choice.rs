//! Choice binder - a string restricted to an ordered set of choices.
//!
//! The select widget's value is the selected index, not the string, so
//! duplicate choices stay distinguishable and rollback restores a position.

use std::cell::Cell;
use std::rc::Rc;

use super::scalar::{commit, judge, roll_back, Verdict};
use super::{all_or_nothing, contract_violation, new_widget, resolve, write_default};
use crate::engine::Widget;
use crate::error::{BindError, Result};
use crate::types::{Kind, Range, Scalar, ScalarKind, WidgetKind};
use crate::validate::{ensure_kind, Validator};
use crate::value::{Bound, Value};

/// Bind a string to a select over `choices`.
///
/// An empty string defaults to the first choice and that default is written
/// back once the outermost bind succeeds. Inside a record or list that fails
/// to bind, the value keeps its empty string. A non-empty string that is not
/// a choice fails with [`BindError::InvalidDefault`].
pub fn bind_choice(
    bound: &Bound,
    choices: &[String],
    label: &str,
    id: &str,
    class: &str,
    validator: Option<Rc<dyn Validator>>,
) -> Result<Widget> {
    all_or_nothing(|| choice_widget(bound, choices, label, id, class, validator))
}

fn choice_widget(
    bound: &Bound,
    choices: &[String],
    label: &str,
    id: &str,
    class: &str,
    validator: Option<Rc<dyn Validator>>,
) -> Result<Widget> {
    let target = resolve(bound, Kind::String)?;
    ensure_kind(validator.as_ref(), ScalarKind::String)?;
    if choices.is_empty() {
        return Err(BindError::invalid("choice field needs at least one choice"));
    }

    let current = target
        .read(|v| v.as_str().map(str::to_string))
        .flatten()
        .ok_or_else(|| BindError::invalid("expected a string"))?;

    let selected = if current.is_empty() {
        if !write_default(&target, Value::String(choices[0].clone())) {
            return Err(BindError::invalid("value path no longer resolves"));
        }
        tracing::debug!(label, default = %choices[0], "empty choice defaulted");
        0
    } else {
        choices
            .iter()
            .position(|c| *c == current)
            .ok_or_else(|| BindError::InvalidDefault {
                value: current.clone(),
                choices: choices.to_vec(),
            })?
    };

    tracing::trace!(label, selected, "binding choice");

    let widget = new_widget(WidgetKind::Select, "choice", label, id, class);
    widget.set_options(choices.to_vec());
    widget.show(selected.to_string());

    let choices = choices.to_vec();
    let previous = Cell::new(selected);
    widget.on_change(move |raw| {
        let index = raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&i| i < choices.len())
            .unwrap_or_else(|| contract_violation(raw, "a choice index"));
        let candidate = choices[index].clone();

        match judge(validator.as_ref(), &Scalar::String(candidate.clone()), Range::Within) {
            Verdict::Accept => {
                commit(&target, widget, Value::String(candidate));
                widget.show(index.to_string());
                previous.set(index);
            }
            Verdict::Reject(reason) => roll_back(widget, reason, &previous.get().to_string()),
        }
    });

    Ok(widget)
}
