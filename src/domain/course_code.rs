use std::{fmt, ops::Deref, str::FromStr, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Three uppercase letters, four digits and an optional trailing letter.
static COURSE_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<prefix>[A-Z]{3})(?P<level>[0-9]{4})(?P<suffix>[A-Z]?)$")
        .expect("course code pattern is valid")
});

/// A course code with whitespace between prefix and number, e.g. `COP 3503`.
static SPACED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z]{3})\s+([0-9]{4}[A-Z]?)$").expect("spaced course code pattern is valid")
});

/// A validated catalog course code.
///
/// Format: `{PREFIX}{LEVEL}{SUFFIX?}`, where:
/// - `PREFIX` is the three-letter department abbreviation (e.g. `COP`)
/// - `LEVEL` is the four-digit catalog number (e.g. `3503`)
/// - `SUFFIX` is an optional single letter, usually marking a lab (e.g. `L`)
///
/// Examples: `COP3503`, `CHM2045L`, `HUM2020`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseCode {
    code: String,
    level: u16,
}

impl CourseCode {
    /// Parses a course code that is already in canonical form.
    ///
    /// Use [`CourseCode::normalize`] first when the input comes from an
    /// untrusted source.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the string does not match the course code pattern.
    pub fn new(code: String) -> Result<Self, Error> {
        let level = COURSE_CODE
            .captures(&code)
            .and_then(|captures| captures.name("level"))
            .and_then(|level| level.as_str().parse().ok())
            .ok_or_else(|| Error(code.clone()))?;

        Ok(Self { code, level })
    }

    /// Normalizes a raw course code string before matching or parsing.
    ///
    /// Surrounding whitespace is trimmed, non-breaking spaces become ordinary
    /// spaces, and the result is uppercased. Whitespace between the prefix and
    /// the number is removed, so `cop\u{a0}3503` becomes `COP3503`.
    #[must_use]
    pub fn normalize(raw: &str) -> String {
        let code = raw.replace('\u{a0}', " ").trim().to_uppercase();
        SPACED_CODE.replace(&code, "${1}${2}").into_owned()
    }

    /// Normalizes and then parses a raw course code.
    ///
    /// # Errors
    ///
    /// Returns [`Error`] if the normalized string is not a course code.
    pub fn parse_lenient(raw: &str) -> Result<Self, Error> {
        Self::new(Self::normalize(raw))
    }

    /// The three-letter department prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.code[..3]
    }

    /// The four-digit numeric catalog level.
    #[must_use]
    pub const fn level(&self) -> u16 {
        self.level
    }

    /// The trailing letter, if any.
    #[must_use]
    pub fn suffix(&self) -> Option<char> {
        self.code[7..].chars().next()
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.code
    }
}

impl TryFrom<String> for CourseCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CourseCode {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for CourseCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl From<CourseCode> for String {
    fn from(code: CourseCode) -> Self {
        code.code
    }
}

impl AsRef<str> for CourseCode {
    fn as_ref(&self) -> &str {
        &self.code
    }
}

impl Deref for CourseCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.code
    }
}

impl fmt::Display for CourseCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Error returned when a string is not a course code.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error(
    "Invalid course code '{0}': expected three uppercase letters, four digits and an optional \
     trailing letter"
)]
pub struct Error(String);

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test_case("COP3503", "COP", 3503, None; "plain")]
    #[test_case("CHM2045L", "CHM", 2045, Some('L'); "lab suffix")]
    #[test_case("HUM5934", "HUM", 5934, None; "graduate level")]
    #[test_case("ENC0001", "ENC", 1, None; "leading zeros")]
    fn parses_components(raw: &str, prefix: &str, level: u16, suffix: Option<char>) {
        let code = CourseCode::from_str(raw).unwrap();
        assert_eq!(code.prefix(), prefix);
        assert_eq!(code.level(), level);
        assert_eq!(code.suffix(), suffix);
        assert_eq!(code.as_str(), raw);
    }

    #[test_case(""; "empty")]
    #[test_case("COP"; "prefix only")]
    #[test_case("cop3503"; "lowercase")]
    #[test_case("COP 3503"; "inner space")]
    #[test_case("CO3503"; "short prefix")]
    #[test_case("COP350"; "short level")]
    #[test_case("COP35031"; "long level")]
    #[test_case("COP3503LL"; "double suffix")]
    #[test_case("000"; "placeholder code")]
    fn rejects_malformed(raw: &str) {
        assert_eq!(CourseCode::from_str(raw), Err(Error(raw.to_string())));
    }

    #[test]
    fn normalize_trims_and_uppercases() {
        assert_eq!(CourseCode::normalize("  cop3503\t"), "COP3503");
        assert_eq!(CourseCode::normalize("cop\u{a0}3503"), "COP3503");
        assert_eq!(CourseCode::normalize("HUM  2020"), "HUM2020");
        assert_eq!(CourseCode::normalize("Special Topics"), "SPECIAL TOPICS");
        assert_eq!(CourseCode::normalize("\u{a0}chm2045l\u{a0}"), "CHM2045L");
    }

    #[test_case(" chm2045l ", "CHM2045L"; "padded lowercase")]
    #[test_case("COP\u{a0}3503", "COP3503"; "non-breaking space")]
    #[test_case("hum 2020", "HUM2020"; "inner space")]
    fn parse_lenient_accepts_untidy_input(raw: &str, expected: &str) {
        let code = CourseCode::parse_lenient(raw).unwrap();
        assert_eq!(code.as_str(), expected);
    }

    #[test]
    fn serde_round_trips_as_plain_string() {
        let code = CourseCode::from_str("MAC2311").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"MAC2311\"");

        let parsed: CourseCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
    }

    #[test]
    fn deserialize_rejects_malformed_code() {
        let result: Result<CourseCode, _> = serde_json::from_str("\"MAC 2311\"");
        assert!(result.is_err());
    }
}
