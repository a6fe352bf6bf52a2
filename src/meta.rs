//! Declarative binding metadata.
//!
//! Record fields carry [`Tags`], struct-tag style key/value pairs:
//!
//! ```text
//! label:"limited int" min:"1" max:"10" step:"2" validator:"IntNot5"
//! ```
//!
//! Tags are data, not code, so validators are referenced by name and
//! resolved through a [`ValidatorRegistry`]. [`Meta::parse`] turns tags into
//! the shapes binders consume, once, at bind time.
//!
//! Recognized keys (aliases after the slash):
//! - `label` / `title` / `desc` - widget title
//! - `id` / `identifier`
//! - `class` / `css-class`
//! - `min`, `max`, `step` - decimal numbers; absent means unconstrained
//! - `choices` / `choice` - comma separated, ordered, each entry trimmed
//!   (`"def, abc"` is `def` and `abc`)
//! - `validator` / `valid` - registered validator name

use std::fmt;
use std::rc::Rc;

use crate::error::{BindError, Result};
use crate::types::Bounds;
use crate::validate::{Validator, ValidatorRegistry};

// =============================================================================
// Tags
// =============================================================================

/// Ordered key/value metadata attached to a record field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    pairs: Vec<(String, String)>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair. Earlier pairs win on lookup.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs.push((key.into(), value.into()));
        self
    }

    /// Parse `key:"value"` pairs separated by whitespace.
    ///
    /// Values are double quoted; `\"` and `\\` escape inside them.
    pub fn parse(src: &str) -> Result<Self> {
        let mut pairs = Vec::new();
        let mut chars = src.char_indices().peekable();

        loop {
            while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
            let Some(&(start, _)) = chars.peek() else { break };

            let mut key = String::new();
            while let Some((_, c)) = chars.next_if(|(_, c)| *c != ':' && !c.is_whitespace()) {
                key.push(c);
            }
            if key.is_empty() || chars.next_if(|(_, c)| *c == ':').is_none() {
                return Err(BindError::invalid(format!("malformed tag at byte {start} in `{src}`")));
            }
            if chars.next_if(|(_, c)| *c == '"').is_none() {
                return Err(BindError::invalid(format!("tag `{key}` value must be quoted")));
            }

            let mut value = String::new();
            let mut closed = false;
            while let Some((_, c)) = chars.next() {
                match c {
                    '"' => {
                        closed = true;
                        break;
                    }
                    '\\' => match chars.next() {
                        Some((_, escaped)) => value.push(escaped),
                        None => break,
                    },
                    c => value.push(c),
                }
            }
            if !closed {
                return Err(BindError::invalid(format!("tag `{key}` value is not terminated")));
            }
            pairs.push((key, value));
        }

        Ok(Self { pairs })
    }

    /// Value of the first pair whose key is `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first pair whose key is any of `keys`.
    fn get_any(&self, keys: &[&str]) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| keys.contains(&k.as_str()))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

// =============================================================================
// Meta
// =============================================================================

/// Everything a binder needs besides the value itself.
#[derive(Clone, Default)]
pub struct Meta {
    pub label: String,
    pub id: String,
    pub class: String,
    pub bounds: Bounds,
    /// Non-empty makes a string field a choice field.
    pub choices: Vec<String>,
    pub validator: Option<Rc<dyn Validator>>,
}

impl fmt::Debug for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meta")
            .field("label", &self.label)
            .field("id", &self.id)
            .field("class", &self.class)
            .field("bounds", &self.bounds)
            .field("choices", &self.choices)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl Meta {
    pub fn labelled(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Parse field tags, resolving the validator name through `registry`.
    pub fn parse(tags: &Tags, registry: &ValidatorRegistry) -> Result<Self> {
        let validator = match tags.get_any(&["validator", "valid"]) {
            None | Some("") => None,
            Some(name) => Some(
                registry
                    .get(name)
                    .ok_or_else(|| BindError::UnregisteredValidator(name.to_string()))?,
            ),
        };

        Ok(Self {
            label: tags.get_any(&["label", "title", "desc"]).unwrap_or_default().to_string(),
            id: tags.get_any(&["id", "identifier"]).unwrap_or_default().to_string(),
            class: tags.get_any(&["class", "css-class"]).unwrap_or_default().to_string(),
            bounds: Bounds::new(
                parse_bound("min", tags.get("min"))?,
                parse_bound("max", tags.get("max"))?,
                parse_bound("step", tags.get("step"))?,
            ),
            choices: parse_choices(tags.get_any(&["choices", "choice"])),
            validator,
        })
    }

    /// Metadata shared by every element of a list: bounds, choices, validator.
    pub fn elem(&self) -> ElemMeta {
        ElemMeta {
            bounds: self.bounds,
            choices: self.choices.clone(),
            validator: self.validator.clone(),
        }
    }
}

/// Per-element metadata for list binding, uniform across all elements.
#[derive(Clone, Default)]
pub struct ElemMeta {
    pub bounds: Bounds,
    pub choices: Vec<String>,
    pub validator: Option<Rc<dyn Validator>>,
}

impl fmt::Debug for ElemMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElemMeta")
            .field("bounds", &self.bounds)
            .field("choices", &self.choices)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

impl ElemMeta {
    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn choices<S: Into<String>>(mut self, choices: impl IntoIterator<Item = S>) -> Self {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    pub fn validator(mut self, validator: Rc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Element metadata as full binder metadata with no label, id or class.
    pub(crate) fn to_meta(&self) -> Meta {
        Meta {
            bounds: self.bounds,
            choices: self.choices.clone(),
            validator: self.validator.clone(),
            ..Meta::default()
        }
    }
}

// =============================================================================
// Parsing helpers
// =============================================================================

fn parse_bound(key: &str, raw: Option<&str>) -> Result<f64> {
    match raw.map(str::trim) {
        None | Some("") => Ok(f64::NAN),
        Some(s) => s
            .parse::<f64>()
            .map_err(|_| BindError::invalid(format!("{key} as value '{s}' expected a number"))),
    }
}

fn parse_choices(raw: Option<&str>) -> Vec<String> {
    match raw {
        None => Vec::new(),
        Some(s) if s.trim().is_empty() => Vec::new(),
        Some(s) => s.split(',').map(|c| c.trim().to_string()).collect(),
    }
}

// =============================================================================
// Tests
// =============================================================================
