//! # spark-bind
//!
//! Reflective data binding for Rust: turn a typed value into a live widget
//! tree that renders it, lets a user edit it, validates each edit and writes
//! accepted edits back in place.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals) for
//! reactive widget state.
//!
//! ## Architecture
//!
//! ```text
//! Bound value + metadata → convert → binder → widget tree + change handlers
//! host event → dispatch_change → coerce → validate → commit | roll back
//! ```
//!
//! The widget tree is headless: widgets are indices into parallel arrays, and
//! a host renders them however it likes. Nothing here draws.
//!
//! ## Example
//!
//! ```ignore
//! use spark_bind::*;
//!
//! register_validator("IntNot5", ValidateInt(|i| i != 5));
//!
//! let settings = Bound::new(
//!     Record::new("Settings")
//!         .with(Field::new("Verbose", false))
//!         .with(Field::new("Limit", 3i64).tags(Tags::parse(
//!             r#"label:"limit" min:"0" max:"10" validator:"IntNot5""#,
//!         )?)),
//! );
//! let form = bind_record(&settings, "settings", "", "")?;
//!
//! field_widget(form, "Limit").unwrap().input("7");
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Core types (Kind, Scalar, Bounds, WidgetKind)
//! - [`value`] - Bound values and the handle binders write through
//! - [`meta`] - Field tags and parsed binding metadata
//! - [`validate`] - Validators and the validator registry
//! - [`bind`] - The dispatcher and every binder
//! - [`engine`] - Headless widget tree, parallel arrays, event dispatch
//! - [`config`] - Class prefix and button text

pub mod bind;
pub mod config;
pub mod engine;
pub mod error;
pub mod meta;
pub mod types;
pub mod validate;
pub mod value;

// Re-export commonly used items
pub use types::*;

pub use error::{BindError, Location, Result};

pub use value::{Bound, Field, List, Record, Step, Value};

pub use meta::{ElemMeta, Meta, Tags};

pub use validate::{
    default_registry, lookup_validator, register_validator, reset_validators, ValidateBool,
    ValidateFloat, ValidateInt, ValidateString, Validator, ValidatorFn, ValidatorRegistry,
};

pub use bind::{
    add_button, bind_bool, bind_choice, bind_float, bind_int, bind_list, bind_list_in,
    bind_record, bind_record_in, bind_string, convert, convert_in, field_widget, list_revision,
    list_rows, remove_button,
};

pub use engine::{
    dispatch_change, dispatch_click, get_allocated_count, is_allocated, on_destroy, outline,
    release_index, reset_registry, Widget,
};

pub use config::{config, reset_config, set_config, BindConfig};
