//! Length rules for user-authored comment and reply text.
use thiserror::Error;

pub const DEFAULT_MIN_LEN: usize = 2;
pub const DEFAULT_MAX_LEN: usize = 1000;

/// Field-level validation failure, shown inline next to the input.
///
/// Messages are the Turkish strings the site displays.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: bu alan boş bırakılamaz")]
    Empty { field: &'static str },

    #[error("{field}: en az {min} karakter olmalıdır ({actual} girildi)")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("{field}: en fazla {max} karakter olabilir ({actual} girildi)")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },

    #[error("{field}: yanıtlanan yorum bulunamadı ({parent_id})")]
    UnknownParent {
        field: &'static str,
        parent_id: String,
    },
}

impl ValidationError {
    /// Name of the form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Empty { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::UnknownParent { field, .. } => field,
        }
    }
}

/// Accepted length range for comment text, counted in characters after
/// trimming surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentRules {
    pub min_len: usize,
    pub max_len: usize,
}

impl Default for CommentRules {
    fn default() -> Self {
        Self {
            min_len: DEFAULT_MIN_LEN,
            max_len: DEFAULT_MAX_LEN,
        }
    }
}

impl CommentRules {
    pub const FIELD: &'static str = "yorum";

    pub fn new(min_len: usize, max_len: usize) -> Self {
        Self { min_len, max_len }
    }

    /// Validate `text`, returning the trimmed text on success.
    pub fn check<'a>(&self, text: &'a str) -> Result<&'a str, ValidationError> {
        let trimmed = text.trim();
        let len = trimmed.chars().count();

        if len == 0 {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if len < self.min_len {
            return Err(ValidationError::TooShort {
                field: Self::FIELD,
                min: self.min_len,
                actual: len,
            });
        }
        if len > self.max_len {
            return Err(ValidationError::TooLong {
                field: Self::FIELD,
                max: self.max_len,
                actual: len,
            });
        }
        Ok(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_whitespace_rejected() {
        let rules = CommentRules::default();
        assert!(matches!(rules.check(""), Err(ValidationError::Empty { .. })));
        assert!(matches!(
            rules.check("   \n"),
            Err(ValidationError::Empty { .. })
        ));
    }

    #[test]
    fn test_below_minimum_rejected() {
        let rules = CommentRules::default();
        assert_eq!(
            rules.check("a"),
            Err(ValidationError::TooShort {
                field: "yorum",
                min: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let rules = CommentRules::new(2, 5);
        assert_eq!(rules.check("ab"), Ok("ab"));
        assert_eq!(rules.check("abcde"), Ok("abcde"));
        assert!(matches!(
            rules.check("abcdef"),
            Err(ValidationError::TooLong { actual: 6, .. })
        ));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let rules = CommentRules::new(2, 4);
        // 4 characters, 8 bytes
        assert_eq!(rules.check("çğüş"), Ok("çğüş"));
    }

    #[test]
    fn test_returns_trimmed_text() {
        let rules = CommentRules::default();
        assert_eq!(rules.check("  Merhaba  "), Ok("Merhaba"));
    }

    #[test]
    fn test_error_field_and_message() {
        let err = CommentRules::default().check("a").unwrap_err();
        assert_eq!(err.field(), "yorum");
        assert_eq!(err.to_string(), "yorum: en az 2 karakter olmalıdır (1 girildi)");
    }
}
