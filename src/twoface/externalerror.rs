use std::fmt;

/// What the user gets told when something fails.
#[derive(Debug, Clone, Copy)]
pub struct ExternalError {
    /// A user-facing explanation of what caused the error.
    pub cause: Cause,
    /// Error text that will describe the problem to the user.
    pub text: &'static str,
}

/// A user-facing explanation of what caused the error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    /// Registration password is too short.
    WeakPassword,
    /// The identity provider or the Feed API rejected the credentials exchange.
    AuthenticationFailed,
    /// A Feed API call failed in transport or returned a non-success status.
    Network,
    /// Post or reply content was empty after trimming.
    EmptyInput,
    /// The operation needs a session and there isn't one.
    NotAuthenticated,
    /// Local storage couldn't be read or written.
    Storage,
    Internal,
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        // Make fmt::Display the same as fmt::Debug, i.e. each variant's name.
        write!(f, "{:?}", self)
    }
}

impl fmt::Display for ExternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}: {}", self.cause, self.text)
    }
}

impl Default for ExternalError {
    // Default to Internal and a very vague generic message.
    fn default() -> Self {
        Self {
            cause: Cause::Internal,
            text: "Something went wrong",
        }
    }
}

pub const AUTH_FAILED: ExternalError = ExternalError {
    cause: Cause::AuthenticationFailed,
    text: "Authentication failed",
};

pub const STORAGE_FAILED: ExternalError = ExternalError {
    cause: Cause::Storage,
    text: "Couldn't access local storage",
};
