//! Results that carry warnings.
//!
//! Graph and action calls return a plain [`Result`](crate::error::Result).
//! Filter, parameter and pipeline calls return an [`Outcome`], which can hold
//! a value together with any number of warnings and errors so that every
//! validation problem is reported at once.

use crate::error::DataGraphError;
use std::fmt;

/// A non-fatal message attached to an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub code: i32,
    pub message: String,
}

impl Warning {
    /// Code of the warning raised when a filter stops early on request.
    pub const CANCELLED: i32 = -400;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn cancelled(context: &str) -> Self {
        Self::new(Self::CANCELLED, format!("Cancelled: {}", context))
    }

    pub fn is_cancellation(&self) -> bool {
        self.code == Self::CANCELLED
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Value plus zero or more warnings and errors.
///
/// An outcome is valid exactly when it has no errors. A valid outcome may
/// still lack a value for `Outcome<()>`-style calls that only report status.
#[derive(Debug)]
#[must_use]
pub struct Outcome<T> {
    pub value: Option<T>,
    pub warnings: Vec<Warning>,
    pub errors: Vec<DataGraphError>,
}

impl<T> Outcome<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value: Some(value),
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn from_error(error: DataGraphError) -> Self {
        Self::from_errors(vec![error])
    }

    pub fn from_errors(errors: Vec<DataGraphError>) -> Self {
        Self {
            value: None,
            warnings: Vec::new(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether a cancellation warning was recorded.
    pub fn was_cancelled(&self) -> bool {
        self.warnings.iter().any(Warning::is_cancellation)
    }

    pub fn with_warning(mut self, warning: Warning) -> Self {
        self.warnings.push(warning);
        self
    }

    pub fn push_warning(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }

    pub fn push_error(&mut self, error: DataGraphError) {
        self.errors.push(error);
    }

    /// Take warnings and errors from `other`, dropping its value.
    pub fn absorb<U>(&mut self, other: Outcome<U>) {
        self.warnings.extend(other.warnings);
        self.errors.extend(other.errors);
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: self.value.map(f),
            warnings: self.warnings,
            errors: self.errors,
        }
    }

    /// Keep the messages, replace the value.
    pub fn replace<U>(self, value: Option<U>) -> Outcome<U> {
        Outcome {
            value,
            warnings: self.warnings,
            errors: self.errors,
        }
    }

    /// Collapse to a `Result`, keeping only the first error.
    pub fn into_result(self) -> crate::error::Result<Option<T>> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }
}

impl Outcome<()> {
    pub fn success() -> Self {
        Self::ok(())
    }
}

impl<T> From<crate::error::Result<T>> for Outcome<T> {
    fn from(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::ok(value),
            Err(error) => Outcome::from_error(error),
        }
    }
}
