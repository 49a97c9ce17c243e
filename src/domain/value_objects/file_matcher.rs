use regex::Regex;
use std::fmt;

use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;

/// Path pattern applied to files listed in push payloads.
#[derive(Clone)]
pub struct FileMatcher {
    regex: Regex,
}

impl FileMatcher {
    pub fn new(pattern: &str) -> GitgateResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            GitgateError::validation_error("pattern", e.to_string(), Some(pattern.to_string()))
        })?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl From<Regex> for FileMatcher {
    fn from(regex: Regex) -> Self {
        Self { regex }
    }
}

impl fmt::Debug for FileMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileMatcher").field(&self.regex.as_str()).finish()
    }
}
