//! Bound values.
//!
//! A [`Value`] is a closed set of tagged variants, one per bindable shape.
//! Binders never copy a value out and back: they hold a [`Bound`] handle, a
//! shared root plus a path of steps, and read or write through it.
//!
//! # Caller obligation
//!
//! Once a value is bound, mutate it only through its widgets. Writing to the
//! root directly leaves every widget showing stale state, and nothing detects
//! that.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{BindError, Result};
use crate::meta::Tags;
use crate::types::Kind;

// =============================================================================
// Value
// =============================================================================

/// A typed value that can be bound to widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Record(Record),
    List(List),
    /// Optional reference slot. Binders see through one level of it.
    Ref(Option<Box<Value>>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Wrap a value in a filled reference slot.
    pub fn reference(value: impl Into<Value>) -> Self {
        Value::Ref(Some(Box::new(value.into())))
    }

    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::String(_) => Kind::String,
            Value::Record(_) => Kind::Record,
            Value::List(_) => Kind::List,
            Value::Ref(_) => Kind::Ref,
            Value::Map(_) => Kind::Map,
        }
    }

    /// Zero value of the same shape.
    ///
    /// A filled reference slot gets a freshly allocated, zeroed referent.
    /// An empty slot stays empty: there is nothing to learn its type from.
    pub fn zeroed(&self) -> Value {
        match self {
            Value::Bool(_) => Value::Bool(false),
            Value::Int(_) => Value::Int(0),
            Value::Float(_) => Value::Float(0.0),
            Value::String(_) => Value::String(String::new()),
            Value::Record(record) => Value::Record(record.zeroed()),
            Value::List(list) => Value::List(List::new(list.elem().clone())),
            Value::Ref(Some(inner)) => Value::Ref(Some(Box::new(inner.zeroed()))),
            Value::Ref(None) => Value::Ref(None),
            Value::Map(_) => Value::Map(BTreeMap::new()),
        }
    }

    /// Whether two values have the same shape, ignoring contents.
    pub fn same_shape(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Record(a), Value::Record(b)) => {
                a.name == b.name
                    && a.fields.len() == b.fields.len()
                    && a.fields
                        .iter()
                        .zip(&b.fields)
                        .all(|(fa, fb)| fa.name == fb.name && fa.value.same_shape(&fb.value))
            }
            (Value::List(a), Value::List(b)) => a.elem.same_shape(&b.elem),
            (Value::Ref(Some(a)), Value::Ref(Some(b))) => a.same_shape(b),
            (Value::Ref(_), Value::Ref(_)) => true,
            (a, b) => a.kind() == b.kind(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// The referent of a filled slot, or the value itself.
    pub fn deref_value(&self) -> &Value {
        match self {
            Value::Ref(Some(inner)) => &**inner,
            other => other,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl From<List> for Value {
    fn from(l: List) -> Self {
        Value::List(l)
    }
}

// =============================================================================
// Record
// =============================================================================

/// A fixed composite of named fields, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<Field>,
}

/// One record field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Only bindable fields get a widget.
    pub bindable: bool,
    pub tags: Tags,
    pub value: Value,
}

impl Field {
    /// A bindable field with no metadata.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            bindable: true,
            tags: Tags::new(),
            value: value.into(),
        }
    }

    /// A field that binding skips.
    pub fn hidden(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            bindable: false,
            ..Self::new(name, value)
        }
    }

    pub fn tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }
}

impl Record {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.value)
    }

    fn zeroed(&self) -> Record {
        Record {
            name: self.name.clone(),
            fields: self
                .fields
                .iter()
                .map(|f| Field {
                    value: f.value.zeroed(),
                    ..f.clone()
                })
                .collect(),
        }
    }
}

// =============================================================================
// List
// =============================================================================

/// A resizable, homogeneous sequence.
///
/// `elem` is the element prototype. It fixes the element shape and is what
/// new elements are zeroed from.
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    elem: Box<Value>,
    items: Vec<Value>,
}

impl List {
    /// An empty list of elements shaped like `elem`.
    pub fn new(elem: impl Into<Value>) -> Self {
        Self {
            elem: Box::new(elem.into()),
            items: Vec::new(),
        }
    }

    /// A list holding `items`, each of which must be shaped like `elem`.
    pub fn from_values(elem: impl Into<Value>, items: Vec<Value>) -> Result<Self> {
        let elem = elem.into();
        if let Some((i, bad)) = items.iter().enumerate().find(|(_, v)| !v.same_shape(&elem)) {
            return Err(BindError::invalid(format!(
                "list element {i} is a {}, expected {}",
                bad.kind(),
                elem.kind()
            )));
        }
        Ok(Self {
            elem: Box::new(elem),
            items,
        })
    }

    pub fn elem(&self) -> &Value {
        &self.elem
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append the zero value of the element shape.
    pub fn push_zeroed(&mut self) {
        let fresh = self.elem.zeroed();
        self.items.push(fresh);
    }

    /// Remove element `index`, shifting later ones down. Returns it if present.
    pub fn remove(&mut self, index: usize) -> Option<Value> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub(crate) fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.items.get_mut(index)
    }
}

// =============================================================================
// Bound - read/write handle into a value
// =============================================================================

/// One step from a value to one of its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Field(usize),
    Index(usize),
    Deref,
}

/// A handle to a value inside a shared root.
///
/// Cloning a `Bound` clones the handle, never the value.
#[derive(Debug, Clone)]
pub struct Bound {
    root: Rc<RefCell<Value>>,
    path: Vec<Step>,
}

impl Bound {
    /// Take ownership of `value` and return a handle to it.
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            root: Rc::new(RefCell::new(value.into())),
            path: Vec::new(),
        }
    }

    /// Handle sharing this one's root, pointing at the root itself.
    pub fn root(&self) -> Bound {
        Bound {
            root: self.root.clone(),
            path: Vec::new(),
        }
    }

    pub fn path(&self) -> &[Step] {
        &self.path
    }

    fn child(&self, step: Step) -> Bound {
        let mut path = self.path.clone();
        path.push(step);
        Bound {
            root: self.root.clone(),
            path,
        }
    }

    pub fn field(&self, index: usize) -> Bound {
        self.child(Step::Field(index))
    }

    pub fn index(&self, index: usize) -> Bound {
        self.child(Step::Index(index))
    }

    pub fn deref(&self) -> Bound {
        self.child(Step::Deref)
    }

    /// Handle to the record field called `name`, if the target is a record
    /// (or a reference to one) with such a field.
    pub fn field_named(&self, name: &str) -> Option<Bound> {
        let (through_ref, position) = self.read(|v| match v {
            Value::Record(r) => Some((false, r.position(name)?)),
            Value::Ref(Some(inner)) => Some((true, inner.as_record()?.position(name)?)),
            _ => None,
        })??;
        let base = if through_ref { self.deref() } else { self.clone() };
        Some(base.field(position))
    }

    /// Whether both handles point into the same root.
    pub fn same_root(&self, other: &Bound) -> bool {
        Rc::ptr_eq(&self.root, &other.root)
    }

    /// Run `f` on the target. `None` if the path no longer resolves.
    pub fn read<R>(&self, f: impl FnOnce(&Value) -> R) -> Option<R> {
        let root = self.root.borrow();
        let mut value: &Value = &root;
        for step in &self.path {
            value = match (*step, value) {
                (Step::Field(i), Value::Record(r)) => &r.fields.get(i)?.value,
                (Step::Index(i), Value::List(l)) => l.get(i)?,
                (Step::Deref, Value::Ref(Some(inner))) => &**inner,
                _ => return None,
            };
        }
        Some(f(value))
    }

    /// Run `f` on the target mutably. `None` if the path no longer resolves.
    pub fn write<R>(&self, f: impl FnOnce(&mut Value) -> R) -> Option<R> {
        let mut root = self.root.borrow_mut();
        let mut value: &mut Value = &mut root;
        for step in &self.path {
            value = match (*step, value) {
                (Step::Field(i), Value::Record(r)) => &mut r.fields.get_mut(i)?.value,
                (Step::Index(i), Value::List(l)) => l.get_mut(i)?,
                (Step::Deref, Value::Ref(Some(inner))) => &mut **inner,
                _ => return None,
            };
        }
        Some(f(value))
    }

    /// Clone of the target value.
    pub fn get(&self) -> Option<Value> {
        self.read(Value::clone)
    }

    /// Replace the target value. Returns false if the path no longer resolves.
    pub fn set(&self, value: impl Into<Value>) -> bool {
        let value = value.into();
        self.write(move |slot| *slot = value).is_some()
    }

    pub fn kind(&self) -> Option<Kind> {
        self.read(Value::kind)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(items: &[i64]) -> Value {
        let items = items.iter().map(|&i| Value::Int(i)).collect();
        Value::List(List::from_values(0i64, items).unwrap())
    }

    #[test]
    fn test_zeroed_shapes() {
        assert_eq!(Value::Int(9).zeroed(), Value::Int(0));
        assert_eq!(Value::from("x").zeroed(), Value::from(""));
        assert_eq!(ints(&[1, 2]).zeroed(), ints(&[]));

        let r = Value::reference(5i64).zeroed();
        assert_eq!(r, Value::reference(0i64));
    }

    #[test]
    fn test_zeroed_record_keeps_tags() {
        let rec = Record::new("R").with(Field::new("a", 3i64).tags(Tags::new().with("min", "1")));
        let zero = Value::Record(rec).zeroed();
        let zero = zero.as_record().unwrap();
        assert_eq!(zero.get("a"), Some(&Value::Int(0)));
        assert_eq!(zero.fields[0].tags.get("min"), Some("1"));
    }

    #[test]
    fn test_from_values_rejects_mixed() {
        let err = List::from_values(0i64, vec![Value::Int(1), Value::from("no")]).unwrap_err();
        assert!(matches!(err, BindError::InvalidArgument(_)));
    }

    #[test]
    fn test_list_remove_preserves_neighbours() {
        let mut list = List::from_values(0i64, vec![2i64.into(), 4i64.into(), 6i64.into()]).unwrap();
        assert_eq!(list.remove(1), Some(Value::Int(4)));
        assert_eq!(list.items(), &[Value::Int(2), Value::Int(6)]);
        assert_eq!(list.remove(5), None);
    }

    #[test]
    fn test_bound_paths() {
        let rec = Record::new("R")
            .with(Field::new("n", 1i64))
            .with(Field::new("p", Value::reference(true)))
            .with(Field::new("l", ints(&[7, 8])));
        let root = Bound::new(rec);

        assert_eq!(root.field(0).get(), Some(Value::Int(1)));
        assert_eq!(root.field(1).deref().get(), Some(Value::Bool(true)));
        assert_eq!(root.field(2).index(1).get(), Some(Value::Int(8)));
        assert_eq!(root.field(2).index(2).get(), None);

        assert!(root.field(2).index(0).set(70i64));
        assert_eq!(root.field_named("l").unwrap().index(0).get(), Some(Value::Int(70)));
    }

    #[test]
    fn test_bound_shares_storage() {
        let a = Bound::new(1i64);
        let b = a.clone();
        b.set(2i64);
        assert_eq!(a.get(), Some(Value::Int(2)));
        assert!(a.same_root(&b));
        assert!(!a.same_root(&Bound::new(2i64)));
    }

    #[test]
    fn test_same_shape_records() {
        let a = Value::Record(Record::new("R").with(Field::new("x", 1i64)));
        let b = Value::Record(Record::new("R").with(Field::new("x", 9i64)));
        let c = Value::Record(Record::new("R").with(Field::new("x", "s")));
        assert!(a.same_shape(&b));
        assert!(!a.same_shape(&c));
    }
}
