//! Field-shape validation for conversation inputs
//!
//! Each step of a workflow accepts exactly one token shape; these helpers
//! check and normalize a raw user message for that shape.

use thiserror::Error;

/// A single-field shape violation. Recoverable: the caller re-prompts the
/// same step and keeps the session where it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter exactly 2 letters (e.g., AB)")]
    LetterPair,
    #[error("Please enter exactly 2 digits (e.g., 12)")]
    DigitPair,
    #[error("Please enter exactly 4 digits (e.g., 0001)")]
    DigitQuad,
    #[error("Enter at least one valid 2-letter series (e.g., CD,EF,GH)")]
    EmptySeriesList,
}

/// Exactly two alphabetic characters, normalized to upper case.
pub fn letter_pair(input: &str) -> Result<String, ValidationError> {
    let token = input.trim();
    if token.chars().count() == 2 && token.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(token.to_ascii_uppercase())
    } else {
        Err(ValidationError::LetterPair)
    }
}

/// Exactly two decimal digits, unchanged.
pub fn digit_pair(input: &str) -> Result<String, ValidationError> {
    let token = input.trim();
    if token.chars().count() == 2 && token.chars().all(|c| c.is_ascii_digit()) {
        Ok(token.to_string())
    } else {
        Err(ValidationError::DigitPair)
    }
}

/// Exactly four decimal digits, unchanged. Leading zeros are significant for
/// width only, not ordering.
pub fn digit_quad(input: &str) -> Result<String, ValidationError> {
    let token = input.trim();
    if token.chars().count() == 4 && token.chars().all(|c| c.is_ascii_digit()) {
        Ok(token.to_string())
    } else {
        Err(ValidationError::DigitQuad)
    }
}

/// Comma- or whitespace-delimited letter pairs.
///
/// Invalid tokens and duplicates are dropped silently (first occurrence
/// wins); the only error is an empty result.
pub fn series_list(input: &str) -> Result<Vec<String>, ValidationError> {
    let tokens: Vec<&str> = if input.contains(',') {
        input.split(',').collect()
    } else {
        input.split_whitespace().collect()
    };

    let mut valid = Vec::new();
    for token in tokens {
        if let Ok(series) = letter_pair(token) {
            if !valid.contains(&series) {
                valid.push(series);
            }
        }
    }

    if valid.is_empty() {
        Err(ValidationError::EmptySeriesList)
    } else {
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_pair_normalizes_case() {
        assert_eq!(letter_pair("ab").unwrap(), "AB");
        assert_eq!(letter_pair(" cd ").unwrap(), "CD");
    }

    #[test]
    fn letter_pair_rejects_bad_shapes() {
        for bad in ["A", "ABC", "A1", "12", "", "  "] {
            assert_eq!(letter_pair(bad), Err(ValidationError::LetterPair));
        }
    }

    #[test]
    fn digit_pair_accepts_exactly_two_digits() {
        assert_eq!(digit_pair("12").unwrap(), "12");
        assert_eq!(digit_pair("1"), Err(ValidationError::DigitPair));
        assert_eq!(digit_pair("123"), Err(ValidationError::DigitPair));
        assert_eq!(digit_pair("1a"), Err(ValidationError::DigitPair));
    }

    #[test]
    fn digit_quad_keeps_leading_zeros() {
        assert_eq!(digit_quad("0001").unwrap(), "0001");
        assert_eq!(digit_quad("001"), Err(ValidationError::DigitQuad));
        assert_eq!(digit_quad("00001"), Err(ValidationError::DigitQuad));
    }

    #[test]
    fn series_list_splits_on_commas_or_whitespace() {
        assert_eq!(series_list("CD,EF,GH").unwrap(), vec!["CD", "EF", "GH"]);
        assert_eq!(series_list("cd ef gh").unwrap(), vec!["CD", "EF", "GH"]);
        assert_eq!(series_list("cd, ef , gh").unwrap(), vec!["CD", "EF", "GH"]);
    }

    #[test]
    fn series_list_drops_invalid_and_duplicate_tokens() {
        assert_eq!(series_list("CD,XYZ,EF,CD,1A").unwrap(), vec!["CD", "EF"]);
        assert_eq!(series_list("cd CD").unwrap(), vec!["CD"]);
    }

    #[test]
    fn series_list_rejects_empty_result() {
        assert_eq!(series_list(""), Err(ValidationError::EmptySeriesList));
        assert_eq!(series_list("XYZ 123"), Err(ValidationError::EmptySeriesList));
    }
}
