use crate::common::error::GitgateError;

/// Result alias used across the crate.
///
/// # Examples
///
/// ```
/// use gitgate::common::result::GitgateResult;
/// use gitgate::common::error::GitgateError;
///
/// fn example_function() -> GitgateResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> GitgateResult<()> {
///     Err(GitgateError::internal_error("Something went wrong"))
/// }
/// ```
pub type GitgateResult<T> = Result<T, GitgateError>;

/// Conversions from `Option` into [`GitgateResult`].
pub trait OptionExt<T> {
    /// Converts `None` into the given error.
    ///
    /// ```
    /// use gitgate::common::result::{GitgateResult, OptionExt};
    /// use gitgate::common::error::GitgateError;
    ///
    /// let none_value: Option<String> = None;
    /// let result: GitgateResult<String> =
    ///     none_value.ok_or_gitgate(GitgateError::internal_error("Value not found"));
    /// assert!(result.is_err());
    /// ```
    fn ok_or_gitgate(self, error: GitgateError) -> GitgateResult<T>;

    /// Converts `None` into an internal error with the given message.
    fn ok_or_internal_error(self, message: impl Into<String>) -> GitgateResult<T>;

    /// Converts `None` into a validation error on `field`.
    ///
    /// ```
    /// use gitgate::common::result::{GitgateResult, OptionExt};
    ///
    /// let none_value: Option<String> = None;
    /// let result: GitgateResult<String> = none_value.ok_or_validation_error("owner", "required");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> GitgateResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_gitgate(self, error: GitgateError) -> GitgateResult<T> {
        self.ok_or(error)
    }

    fn ok_or_internal_error(self, message: impl Into<String>) -> GitgateResult<T> {
        self.ok_or_else(|| GitgateError::internal_error(message))
    }

    fn ok_or_validation_error(
        self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> GitgateResult<T> {
        self.ok_or_else(|| GitgateError::validation_error(field, message, None))
    }
}

/// Conversions from foreign `Result`s into [`GitgateResult`].
pub trait ResultExt<T, E> {
    /// Maps the error with `f`.
    fn map_gitgate_err<F>(self, f: F) -> GitgateResult<T>
    where
        F: FnOnce(E) -> GitgateError;

    /// Wraps the error as an internal error with `message`.
    fn with_internal_error(self, message: impl Into<String>) -> GitgateResult<T>
    where
        E: std::error::Error + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for Result<T, E> {
    fn map_gitgate_err<F>(self, f: F) -> GitgateResult<T>
    where
        F: FnOnce(E) -> GitgateError,
    {
        self.map_err(f)
    }

    fn with_internal_error(self, message: impl Into<String>) -> GitgateResult<T>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.map_err(|e| GitgateError::internal_error_with_source(message, e))
    }
}

/// Rejects empty or whitespace-only required fields.
pub fn require_non_empty(field: &str, value: &str) -> GitgateResult<()> {
    if value.trim().is_empty() {
        return Err(GitgateError::validation_error(
            field,
            "is required",
            Some(value.to_string()),
        ));
    }
    Ok(())
}
