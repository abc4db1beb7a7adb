// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for tier operations.

/// An error from a tier operation.
///
/// This is an opaque error type that can wrap any underlying error from a tier
/// implementation. Use [`std::error::Error::source()`] to access the underlying
/// cause if needed.
///
/// # Example
///
/// ```
/// use geotier_tier::Error;
///
/// let error = Error::from_message("storage quota exceeded");
/// ```
#[ohno::error]
pub struct Error {}

impl Error {
    /// Creates a new error from any type that can be converted to an error.
    ///
    /// This is the public API for creating tier errors from external crates.
    ///
    /// # Examples
    ///
    /// ```
    /// use geotier_tier::Error;
    ///
    /// let io = std::io::Error::other("disk unplugged");
    /// let error = Error::from_message(io);
    /// ```
    pub fn from_message(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(cause)
    }

    /// Creates the error returned by tiers that do not accept writes.
    ///
    /// # Examples
    ///
    /// ```
    /// use geotier_tier::Error;
    ///
    /// let error = Error::read_only("remote");
    /// assert!(error.to_string().contains("remote tier is read-only"));
    /// ```
    #[must_use]
    pub fn read_only(tier: &str) -> Self {
        Self::caused_by(format!("{tier} tier is read-only"))
    }
}

/// A specialized [`Result`] type for tier operations.
pub type Result<T> = std::result::Result<T, Error>;
