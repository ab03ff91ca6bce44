//! Free-text labels and activity details
//!
//! Labels are platform handles ("alice", "alice#1234", a nickname). They are
//! not checked against any directory, only bounded so a stray paste can't
//! land a megabyte string in the rollup's unique index.

use std::fmt;

use super::ValidationError;

/// Maximum length for member and recruiter labels
pub const MAX_LABEL_LEN: usize = 256;

/// Maximum length for an activity note
pub const MAX_DETAIL_LEN: usize = 2000;

/// Validated member or recruiter label.
///
/// The stored text is exactly what the caller passed; lookups are exact
/// string matches, so no trimming or case folding happens here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(String);

impl Label {
    /// Create a label, rejecting blank and oversized input.
    ///
    /// # Example
    /// ```
    /// use recruitctl_core::models::Label;
    ///
    /// assert!(Label::new("alice#1234").is_ok());
    /// assert!(Label::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        check_text("label", s, MAX_LABEL_LEN)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated activity note
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityDetail(String);

impl ActivityDetail {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        check_text("activity detail", s, MAX_DETAIL_LEN)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn check_text(field: &'static str, s: &str, max: usize) -> Result<(), ValidationError> {
    if s.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    // Characters, not bytes
    if s.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_platform_handles() {
        assert!(Label::new("alice").is_ok());
        assert!(Label::new("alice#1234").is_ok());
        assert!(Label::new("Bobby 🚀").is_ok());
        assert!(Label::new("你好").is_ok());
    }

    #[test]
    fn preserves_text_verbatim() {
        let label = Label::new(" Alice ").unwrap();
        assert_eq!(label.as_str(), " Alice ");
    }

    #[test]
    fn rejects_blank() {
        assert!(matches!(
            Label::new("").unwrap_err(),
            ValidationError::Empty { .. }
        ));
        assert!(matches!(
            Label::new(" \t ").unwrap_err(),
            ValidationError::Empty { .. }
        ));
    }

    #[test]
    fn max_length_counts_chars() {
        // 256 four-byte chars is fine even though it's 1024 bytes
        let emoji_256 = "🚀".repeat(MAX_LABEL_LEN);
        assert!(Label::new(&emoji_256).is_ok());

        let long = "a".repeat(MAX_LABEL_LEN + 1);
        let err = Label::new(&long).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 256, .. }));
    }

    #[test]
    fn detail_limits() {
        assert!(ActivityDetail::new("onboarded").is_ok());
        assert!(ActivityDetail::new("").is_err());
        assert!(ActivityDetail::new(&"x".repeat(MAX_DETAIL_LEN + 1)).is_err());
    }
}
