// Copyright © 2024 AssetFlow. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! # Error Handling for AssetFlow
//!
//! This module defines the error type shared by every stage of the
//! AssetFlow build pipeline. The `thiserror` crate is used to keep the
//! variants declarative and the messages consistent.

use std::path::PathBuf;
use thiserror::Error;

/// A unified result type for the AssetFlow library.
///
/// Every fallible operation in the crate returns this alias, so callers only
/// ever have to match on `AssetFlowError`.
pub type Result<T> = std::result::Result<T, AssetFlowError>;

/// The main error type for AssetFlow, encompassing all potential error cases.
#[derive(Error, Debug)]
pub enum AssetFlowError {
    /// Error related to configuration initialisation or validation.
    ///
    /// Raised for unreadable or malformed configuration files, unknown keys,
    /// a missing source root, or a renderer that cannot be set up.
    #[error("Configuration error: {message}.")]
    ConfigError {
        /// Detailed description of the configuration error.
        message: String,
        /// Optional path of the file or directory that caused the error.
        path: Option<PathBuf>,
    },

    /// Error encountered while rendering content.
    #[error("Content processing error: {message}.")]
    ContentProcessingError {
        /// Detailed description of the content processing error.
        message: String,
        /// Optional source error providing additional context, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// IO error encountered during file operations.
    ///
    /// The path is the file or directory the failing call was made on, or
    /// empty when the error was converted without one.
    #[error("File IO error at `{path:?}`: {source}")]
    IOError {
        /// Path associated with the IO error.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A cache-busting token that is not eight lowercase hex characters.
    #[error("Invalid cache token `{0}`: expected 8 lowercase hexadecimal characters")]
    InvalidToken(String),

    /// General internal error.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for AssetFlowError {
    /// Converts a standard IO error into an `AssetFlowError::IOError`
    /// with an empty path.
    fn from(source: std::io::Error) -> Self {
        AssetFlowError::IOError {
            path: PathBuf::new(),
            source,
        }
    }
}

impl AssetFlowError {
    /// Creates a `ConfigError` with a specific message.
    ///
    /// # Parameters
    /// - `message`: A description of the configuration error.
    /// - `path`: Optional path of the file or directory causing the error.
    pub fn config_error<S: Into<String>>(
        message: S,
        path: Option<PathBuf>,
    ) -> Self {
        AssetFlowError::ConfigError {
            message: message.into(),
            path,
        }
    }

    /// Creates a `ContentProcessingError` with a message and optional source.
    pub fn content_processing_error<S: Into<String>>(
        message: S,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        AssetFlowError::ContentProcessingError {
            message: message.into(),
            source,
        }
    }

    /// Wraps an IO error as an `IOError` variant with the specified path.
    pub fn io_error(path: PathBuf, source: std::io::Error) -> Self {
        AssetFlowError::IOError { path, source }
    }

    /// Creates a general internal error with a custom message.
    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        AssetFlowError::InternalError(message.into())
    }

    /// Returns `true` when the error is an IO error whose kind is
    /// `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AssetFlowError::IOError { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound
        )
    }
}
