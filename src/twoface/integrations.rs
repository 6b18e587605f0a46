//! Integrate twoface with the HTTP client.
//!
//! awc's error types hold non-`Send` trait objects, so they can't become `anyhow::Error`
//! directly. Their rendered message is kept instead.

use crate::twoface::{Cause, ExternalError, TfError};
use anyhow::anyhow;
use std::fmt::Display;

pub trait Transport<T> {
    /// Convert an awc error into a `Network` twoface error with the given user-facing text.
    fn or_network(self, text: &'static str) -> Result<T, TfError>;
}

impl<T, E: Display> Transport<T> for Result<T, E> {
    fn or_network(self, text: &'static str) -> Result<T, TfError> {
        self.map_err(|e| TfError {
            internal: anyhow!("{}", e),
            external: ExternalError {
                cause: Cause::Network,
                text,
            },
        })
    }
}
