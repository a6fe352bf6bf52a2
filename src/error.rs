//! Bind-time errors.
//!
//! Every failure while building a widget tree is returned as a [`BindError`].
//! Edit-time failures are not errors: a rejected edit rolls back silently, and
//! an edit that cannot even be parsed as its declared type panics.

use std::fmt;

use thiserror::Error;

use crate::types::Kind;

/// Result type for bind operations.
pub type Result<T> = std::result::Result<T, BindError>;

/// Where inside a composite value a nested bind failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Element of a list.
    Index(usize),
    /// Named field of a record.
    Field(String),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Index(i) => write!(f, "element {i}"),
            Location::Field(name) => write!(f, "field {name}"),
        }
    }
}

/// Errors that can occur while binding a value.
#[derive(Debug, Error)]
pub enum BindError {
    /// Wrong category of value for the binder, or malformed metadata.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No binder exists for this kind.
    #[error("unsupported type {0}")]
    UnsupportedType(Kind),

    /// A declarative validator name is not in the registry.
    #[error("unregistered validator '{0}'")]
    UnregisteredValidator(String),

    /// A choice field's initial value is not one of its choices.
    #[error("default value '{value}' is not one of {choices:?}")]
    InvalidDefault { value: String, choices: Vec<String> },

    /// A nested bind failed.
    #[error("converting {at}: {source}")]
    Conversion {
        at: Location,
        #[source]
        source: Box<BindError>,
    },
}

impl BindError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        BindError::InvalidArgument(msg.into())
    }

    pub(crate) fn at(self, at: Location) -> Self {
        BindError::Conversion {
            at,
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping every `Conversion` wrapper.
    pub fn root(&self) -> &BindError {
        let mut err = self;
        while let BindError::Conversion { source, .. } = err {
            err = source;
        }
        err
    }

    /// Path of locations from the outermost wrapper inwards.
    pub fn path(&self) -> Vec<&Location> {
        let mut path = Vec::new();
        let mut err = self;
        while let BindError::Conversion { at, source } = err {
            path.push(at);
            err = source;
        }
        path
    }
}
