//! `twoface::TfError` wraps a Rust error type with a user-facing description. The front end only
//! ever prints the external half; the internal half (HTTP bodies, file paths, provider error
//! codes) goes to the log.

mod extensions;
pub mod externalerror;
mod integrations;

pub use extensions::*;
pub use externalerror::{Cause, ExternalError};
pub use integrations::Transport;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Wraps a Rust error type with a user-facing description.
#[derive(Debug)]
pub struct TfError {
    /// The underlying error, from some function. May contain sensitive information, so it should
    /// not be shown to users.
    pub internal: anyhow::Error,
    /// A user-friendly error that doesn't contain any sensitive information.
    pub external: ExternalError,
}

impl TfError {
    pub fn cause(&self) -> Cause {
        self.external.cause
    }

    /// Build an error from a local validation failure, where the internal and external
    /// descriptions are the same.
    pub fn local(cause: Cause, text: &'static str) -> Self {
        Self {
            internal: anyhow::anyhow!(text),
            external: ExternalError { cause, text },
        }
    }
}

/// Displaying a twoface::Error will only display the external section. The internal error remains
/// private.
impl Display for TfError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::result::Result<(), fmt::Error> {
        write!(f, "{}", self.external)
    }
}

/// Return type of a function that could fail. If it fails, it includes a twoface error (an error with
/// both internal- and external-facing values).
pub type Fallible<T> = Result<T, TfError>;
