//! Deterministic classification of iteration titles by length.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Read-only category shown by the configure-iteration dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TitleLength {
    Short,
    Medium,
    VeryLong,
}

impl TitleLength {
    pub fn as_str(self) -> &'static str {
        match self {
            TitleLength::Short => "short",
            TitleLength::Medium => "medium",
            TitleLength::VeryLong => "very-long",
        }
    }
}

impl fmt::Display for TitleLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const SHORT_MAX: usize = 15;
const VERY_LONG_MIN: usize = 35;

/// Classify a title by its length in characters.
///
/// - `short` for up to 15 characters.
/// - `medium` for 16 through 34.
/// - `very-long` for 35 and above.
pub fn classify_title(title: &str) -> TitleLength {
    let len = title.chars().count();
    if len <= SHORT_MAX {
        TitleLength::Short
    } else if len < VERY_LONG_MIN {
        TitleLength::Medium
    } else {
        TitleLength::VeryLong
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_five_chars_is_short() {
        assert_eq!(classify_title("Short"), TitleLength::Short);
    }

    #[test]
    fn classify_empty_is_short() {
        assert_eq!(classify_title(""), TitleLength::Short);
    }

    #[test]
    fn classify_boundaries() {
        assert_eq!(classify_title(&"a".repeat(15)), TitleLength::Short);
        assert_eq!(classify_title(&"a".repeat(16)), TitleLength::Medium);
        assert_eq!(classify_title(&"a".repeat(34)), TitleLength::Medium);
        assert_eq!(classify_title(&"a".repeat(35)), TitleLength::VeryLong);
    }

    #[test]
    fn classify_counts_characters_not_bytes() {
        // 15 characters, 30 bytes.
        let title = "é".repeat(15);
        assert_eq!(classify_title(&title), TitleLength::Short);
    }

    #[test]
    fn labels_match_serialized_form() {
        let json = serde_json::to_string(&TitleLength::VeryLong).expect("serialize");
        assert_eq!(json, "\"very-long\"");
        assert_eq!(TitleLength::VeryLong.to_string(), "very-long");
    }
}
