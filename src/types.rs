//! Core types for spark-bind.
//!
//! These types are shared by the value model, the widget engine and the
//! binders. Nothing in here knows how a widget is drawn.

use std::fmt;

// =============================================================================
// Value Kinds
// =============================================================================

/// Shape of a [`Value`](crate::value::Value), without its contents.
///
/// The dispatcher decides which binder to run from this alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Bool,
    Int,
    Float,
    String,
    Record,
    List,
    /// Optional reference slot around another value.
    Ref,
    /// String-keyed map. Representable, but no binder exists for it.
    Map,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Record => "record",
            Kind::List => "list",
            Kind::Ref => "ref",
            Kind::Map => "map",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Scalars
// =============================================================================

/// The scalar kinds a validator can be specialised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    String,
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Int => "int",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
        };
        f.write_str(name)
    }
}

/// A candidate value proposed by an edit, handed to validators.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Int(_) => ScalarKind::Int,
            Scalar::Float(_) => ScalarKind::Float,
            Scalar::String(_) => ScalarKind::String,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Float(x) => write!(f, "{x}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

// =============================================================================
// Numeric Bounds
// =============================================================================

bitflags::bitflags! {
    /// Which numeric bounds are set, and therefore rendered as native
    /// attributes on a number input.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BoundFlags: u8 {
        const NONE = 0;
        const MIN = 1 << 0;
        const MAX = 1 << 1;
        const STEP = 1 << 2;
    }
}

/// Numeric constraints for int and float binders.
///
/// Each of `min`, `max` and `step` is independently unset when NaN.
/// Unset bounds are neither rendered nor checked.
#[derive(Debug, Clone, Copy)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Bounds {
    /// No constraints at all.
    pub const NONE: Self = Self {
        min: f64::NAN,
        max: f64::NAN,
        step: f64::NAN,
    };

    pub const fn new(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    pub const fn with_min(mut self, min: f64) -> Self {
        self.min = min;
        self
    }

    pub const fn with_max(mut self, max: f64) -> Self {
        self.max = max;
        self
    }

    pub const fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    pub fn flags(&self) -> BoundFlags {
        let mut flags = BoundFlags::NONE;
        if !self.min.is_nan() {
            flags |= BoundFlags::MIN;
        }
        if !self.max.is_nan() {
            flags |= BoundFlags::MAX;
        }
        if !self.step.is_nan() {
            flags |= BoundFlags::STEP;
        }
        flags
    }

    /// Integer view of the bounds: each set bound truncated toward zero.
    pub fn int_min(&self) -> Option<i64> {
        (!self.min.is_nan()).then(|| self.min as i64)
    }

    pub fn int_max(&self) -> Option<i64> {
        (!self.max.is_nan()).then(|| self.max as i64)
    }

    pub fn int_step(&self) -> Option<i64> {
        (!self.step.is_nan()).then(|| self.step as i64)
    }

    /// Where `candidate` falls relative to the integer bounds.
    pub fn check_int(&self, candidate: i64) -> Range {
        if self.int_min().is_some_and(|min| candidate < min) {
            Range::BelowMin
        } else if self.int_max().is_some_and(|max| candidate > max) {
            Range::AboveMax
        } else {
            Range::Within
        }
    }

    /// Where `candidate` falls relative to the float bounds.
    pub fn check_float(&self, candidate: f64) -> Range {
        if !self.min.is_nan() && candidate < self.min {
            Range::BelowMin
        } else if !self.max.is_nan() && candidate > self.max {
            Range::AboveMax
        } else {
            Range::Within
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::NONE
    }
}

impl PartialEq for Bounds {
    /// NaN compares equal to NaN here: two unset bounds are the same bound.
    fn eq(&self, other: &Self) -> bool {
        fn same(a: f64, b: f64) -> bool {
            (a.is_nan() && b.is_nan()) || a == b
        }
        same(self.min, other.min) && same(self.max, other.max) && same(self.step, other.step)
    }
}

/// Result of a range check against [`Bounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    Within,
    BelowMin,
    AboveMax,
}

// =============================================================================
// Widget Kinds
// =============================================================================

/// What a widget is, for the host that renders it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WidgetKind {
    /// Placeholder for a released index.
    #[default]
    None,
    Checkbox,
    NumberInput,
    TextInput,
    Select,
    /// Ordered container of list rows.
    List,
    /// One list row: element widget plus remove button.
    ListItem,
    Button,
    /// Container of record fields.
    Record,
    /// One record field: label plus field widget.
    Field,
    Label,
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WidgetKind::None => "none",
            WidgetKind::Checkbox => "checkbox",
            WidgetKind::NumberInput => "number",
            WidgetKind::TextInput => "text",
            WidgetKind::Select => "select",
            WidgetKind::List => "list",
            WidgetKind::ListItem => "item",
            WidgetKind::Button => "button",
            WidgetKind::Record => "record",
            WidgetKind::Field => "field",
            WidgetKind::Label => "label",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Tests
// =============================================================================
