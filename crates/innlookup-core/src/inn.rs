//! INN (taxpayer identification number) validation for legal entities.
//!
//! Legal entities carry a 10-digit INN. Individual entrepreneurs have
//! 12 digits, but those are not served by the registry lookup and are
//! rejected here along with everything else that is not exactly ten
//! ASCII digits. No checksum is verified.

use std::fmt;

use serde::Serialize;

use crate::LookupError;

/// Number of digits in a legal-entity INN.
pub const INN_LEN: usize = 10;

/// Returns `true` when `s` is exactly ten ASCII digits.
pub fn is_valid_inn(s: &str) -> bool {
    s.len() == INN_LEN && s.bytes().all(|b| b.is_ascii_digit())
}

/// A syntactically valid legal-entity INN.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Inn(String);

impl Inn {
    /// Validate `s` and wrap it. Surrounding whitespace is not trimmed.
    pub fn parse(s: &str) -> Result<Self, LookupError> {
        if is_valid_inn(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(LookupError::InvalidIdentifier(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Inn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Inn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for Inn {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digits_accepted() {
        assert!(is_valid_inn("7707083893"));
        assert_eq!(Inn::parse("7707083893").unwrap().as_str(), "7707083893");
    }

    #[test]
    fn too_short() {
        assert!(!is_valid_inn("12345"));
        assert_eq!(
            Inn::parse("12345"),
            Err(LookupError::InvalidIdentifier("12345".into()))
        );
    }

    #[test]
    fn non_digits_rejected() {
        assert!(!is_valid_inn("12345678AB"));
        assert!(!is_valid_inn("12345-7890"));
    }

    #[test]
    fn empty_rejected() {
        assert!(!is_valid_inn(""));
    }

    #[test]
    fn twelve_digit_individual_inn_rejected() {
        assert!(!is_valid_inn("500100732259"));
    }

    #[test]
    fn whitespace_not_trimmed() {
        assert!(!is_valid_inn(" 7707083893"));
        assert!(!is_valid_inn("7707083893\n"));
    }

    #[test]
    fn unicode_digits_rejected() {
        // Arabic-Indic digits are numeric but not ASCII.
        assert!(!is_valid_inn("٠١٢٣٤٥٦٧٨٩"));
    }

    #[test]
    fn from_str_matches_parse() {
        let inn: Inn = "7707083893".parse().unwrap();
        assert_eq!(inn.to_string(), "7707083893");
        assert!("77070838".parse::<Inn>().is_err());
    }
}
