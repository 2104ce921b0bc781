//! Requirement rules and their matching strategies.
//!
//! A rule names a degree or general-education requirement and says which
//! course codes satisfy it. Rule documents use loosely typed string tags
//! (`"type"` for rules, `"kind"` for sub-patterns); these are decoded once,
//! at load time, into the closed [`Strategy`] and [`Pattern`] enums. Tags that
//! are not recognised decode to an `Unknown` variant which never matches.

use std::collections::BTreeSet;

use non_empty_string::NonEmptyString;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::CourseCode;

/// A named requirement and the strategy used to decide whether a course
/// satisfies it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawRule")]
pub struct Rule {
    name: NonEmptyString,
    strategy: Strategy,
}

impl Rule {
    /// Creates a rule from its parts.
    #[must_use]
    pub const fn new(name: NonEmptyString, strategy: Strategy) -> Self {
        Self { name, strategy }
    }

    /// The requirement name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// The matching strategy.
    #[must_use]
    pub const fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Whether a course with the given code satisfies this requirement.
    ///
    /// A course without a code satisfies only [`Strategy::AnyCourse`] rules.
    #[must_use]
    pub fn is_satisfied_by(&self, code: Option<&CourseCode>) -> bool {
        self.strategy.matches(code)
    }
}

/// How a rule decides whether a course code satisfies it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// The code is in an explicit allow-list and not in the deny-list.
    ExactAny(CodeList),
    /// The code matches at least one of the sub-patterns.
    Patterns(Vec<Pattern>),
    /// Every course satisfies the rule.
    AnyCourse,
    /// A rule type this version does not understand. Never satisfied.
    Unknown {
        /// The unrecognised `type` tag.
        kind: String,
    },
}

impl Strategy {
    /// The `type` tag this strategy was read from.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::ExactAny(_) => "exact_any",
            Self::Patterns(_) => "patterns",
            Self::AnyCourse => "any_course",
            Self::Unknown { kind } => kind,
        }
    }

    fn matches(&self, code: Option<&CourseCode>) -> bool {
        match (self, code) {
            (Self::AnyCourse, _) => true,
            (Self::Unknown { .. }, _) | (_, None) => false,
            (Self::ExactAny(list), Some(code)) => list.matches(code),
            (Self::Patterns(patterns), Some(code)) => {
                patterns.iter().any(|pattern| pattern.matches(code))
            }
        }
    }
}

/// One predicate inside a [`Strategy::Patterns`] rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// The code is in an explicit allow-list.
    ExactAny(CodeList),
    /// The department prefix is one of `prefixes` and the level is at least
    /// `min_level`.
    PrefixLevelAtLeast {
        /// Accepted department prefixes.
        prefixes: BTreeSet<String>,
        /// Lowest accepted level (inclusive).
        min_level: u16,
        /// Codes excluded even when the predicate holds.
        exclude: BTreeSet<String>,
    },
    /// The department prefix equals `prefix` and the level lies in
    /// `min_level..=max_level`.
    PrefixLevelBetween {
        /// Accepted department prefix.
        prefix: String,
        /// Lowest accepted level (inclusive).
        min_level: u16,
        /// Highest accepted level (inclusive).
        max_level: u16,
        /// Codes excluded even when the predicate holds.
        exclude: BTreeSet<String>,
    },
    /// A pattern kind this version does not understand. Never matches.
    Unknown {
        /// The unrecognised `kind` tag.
        kind: String,
    },
}

impl Pattern {
    fn matches(&self, code: &CourseCode) -> bool {
        match self {
            Self::ExactAny(list) => list.matches(code),
            Self::PrefixLevelAtLeast {
                prefixes,
                min_level,
                exclude,
            } => {
                !exclude.contains(code.as_str())
                    && prefixes.contains(code.prefix())
                    && code.level() >= *min_level
            }
            Self::PrefixLevelBetween {
                prefix,
                min_level,
                max_level,
                exclude,
            } => {
                !exclude.contains(code.as_str())
                    && code.prefix() == prefix.as_str()
                    && (*min_level..=*max_level).contains(&code.level())
            }
            Self::Unknown { .. } => false,
        }
    }
}

/// An allow-list of codes with an optional deny-list.
///
/// Both lists are normalized when the rule is loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeList {
    codes: BTreeSet<String>,
    exclude: BTreeSet<String>,
}

impl CodeList {
    /// Creates a code list, normalizing every entry.
    pub fn new<I, J, S, T>(codes: I, exclude: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            codes: normalize_all(codes),
            exclude: normalize_all(exclude),
        }
    }

    fn matches(&self, code: &CourseCode) -> bool {
        let code = CourseCode::normalize(code);
        !self.exclude.contains(&code) && self.codes.contains(&code)
    }
}

fn normalize_all<I, S>(codes: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|code| CourseCode::normalize(code.as_ref()))
        .collect()
}

/// Error returned when a rule document is malformed.
#[derive(Debug, thiserror::Error)]
pub enum InvalidRule {
    /// The rule has an empty name.
    #[error("rule name must not be empty")]
    EmptyName,

    /// A known rule type is missing fields or has the wrong field types.
    #[error("rule '{name}' of type '{kind}': {source}")]
    Fields {
        /// Rule name.
        name: String,
        /// Rule or pattern type tag.
        kind: String,
        /// Underlying decoding error.
        source: serde_json::Error,
    },

    /// A `prefix_level_between` pattern whose bounds are reversed.
    #[error("rule '{name}': min_level {min} is greater than max_level {max}")]
    EmptyRange {
        /// Rule name.
        name: String,
        /// Lower bound.
        min: u16,
        /// Upper bound.
        max: u16,
    },
}

#[derive(Deserialize)]
struct RawRule {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawPattern {
    kind: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct ExactAnyFields {
    codes: Vec<String>,
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Deserialize)]
struct PatternsFields {
    patterns: Vec<RawPattern>,
}

#[derive(Deserialize)]
struct AtLeastFields {
    prefixes: Vec<String>,
    min_level: u16,
    #[serde(default)]
    exclude: Vec<String>,
}

#[derive(Deserialize)]
struct BetweenFields {
    prefix: String,
    min_level: u16,
    max_level: u16,
    #[serde(default)]
    exclude: Vec<String>,
}

fn decode<T: serde::de::DeserializeOwned>(
    name: &str,
    kind: &str,
    fields: Map<String, Value>,
) -> Result<T, InvalidRule> {
    serde_json::from_value(Value::Object(fields)).map_err(|source| InvalidRule::Fields {
        name: name.to_string(),
        kind: kind.to_string(),
        source,
    })
}

impl TryFrom<RawRule> for Rule {
    type Error = InvalidRule;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        let name = NonEmptyString::new(raw.name.trim().to_string())
            .map_err(|_| InvalidRule::EmptyName)?;
        let label = name.as_str();

        let strategy = match raw.kind.as_str() {
            "exact_any" => {
                let fields: ExactAnyFields = decode(label, &raw.kind, raw.fields)?;
                Strategy::ExactAny(CodeList::new(fields.codes, fields.exclude))
            }
            "patterns" => {
                let fields: PatternsFields = decode(label, &raw.kind, raw.fields)?;
                Strategy::Patterns(
                    fields
                        .patterns
                        .into_iter()
                        .map(|pattern| decode_pattern(label, pattern))
                        .collect::<Result<_, _>>()?,
                )
            }
            "any_course" => Strategy::AnyCourse,
            _ => {
                tracing::warn!(
                    rule = label,
                    kind = %raw.kind,
                    "unknown rule type, rule will never match"
                );
                Strategy::Unknown { kind: raw.kind }
            }
        };

        Ok(Self { name, strategy })
    }
}

fn decode_pattern(name: &str, raw: RawPattern) -> Result<Pattern, InvalidRule> {
    Ok(match raw.kind.as_str() {
        "exact_any" => {
            let fields: ExactAnyFields = decode(name, &raw.kind, raw.fields)?;
            Pattern::ExactAny(CodeList::new(fields.codes, fields.exclude))
        }
        "prefix_level_at_least" => {
            let fields: AtLeastFields = decode(name, &raw.kind, raw.fields)?;
            Pattern::PrefixLevelAtLeast {
                prefixes: normalize_all(fields.prefixes),
                min_level: fields.min_level,
                exclude: normalize_all(fields.exclude),
            }
        }
        "prefix_level_between" => {
            let fields: BetweenFields = decode(name, &raw.kind, raw.fields)?;
            if fields.min_level > fields.max_level {
                return Err(InvalidRule::EmptyRange {
                    name: name.to_string(),
                    min: fields.min_level,
                    max: fields.max_level,
                });
            }
            Pattern::PrefixLevelBetween {
                prefix: CourseCode::normalize(&fields.prefix),
                min_level: fields.min_level,
                max_level: fields.max_level,
                exclude: normalize_all(fields.exclude),
            }
        }
        _ => {
            tracing::warn!(
                rule = name,
                kind = %raw.kind,
                "unknown pattern kind, pattern will never match"
            );
            Pattern::Unknown { kind: raw.kind }
        }
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    fn rule(value: Value) -> Rule {
        serde_json::from_value(value).unwrap()
    }

    fn code(raw: &str) -> CourseCode {
        raw.parse().unwrap()
    }

    fn humanities() -> Rule {
        rule(json!({
            "name": "Humanities",
            "type": "patterns",
            "patterns": [
                {"kind": "prefix_level_between", "prefix": "HUM", "min_level": 1000, "max_level": 4999}
            ]
        }))
    }

    #[test_case("HUM2020", true; "in range")]
    #[test_case("HUM1000", true; "lower bound")]
    #[test_case("HUM4999", true; "upper bound")]
    #[test_case("HUM5934", false; "graduate level")]
    #[test_case("HUM0999", false; "below range")]
    #[test_case("ENC1101", false; "wrong prefix")]
    fn prefix_level_between(raw: &str, expected: bool) {
        assert_eq!(humanities().is_satisfied_by(Some(&code(raw))), expected);
    }

    #[test]
    fn exact_any_honours_exclusions() {
        let rule = rule(json!({
            "name": "Composition",
            "type": "exact_any",
            "codes": ["ENC1101", "enc1102 ", "ENC2210"],
            "exclude": ["ENC2210"]
        }));

        assert!(rule.is_satisfied_by(Some(&code("ENC1101"))));
        assert!(rule.is_satisfied_by(Some(&code("ENC1102"))));
        assert!(!rule.is_satisfied_by(Some(&code("ENC2210"))));
        assert!(!rule.is_satisfied_by(Some(&code("ENC3246"))));
        assert!(!rule.is_satisfied_by(None));
    }

    #[test]
    fn exact_any_exclude_is_optional() {
        let rule = rule(json!({"name": "Lab", "type": "exact_any", "codes": ["CHM2045L"]}));
        assert!(rule.is_satisfied_by(Some(&code("CHM2045L"))));
        assert!(!rule.is_satisfied_by(Some(&code("CHM2045"))));
    }

    #[test]
    fn patterns_match_any_sub_pattern() {
        let rule = rule(json!({
            "name": "Upper Division Science",
            "type": "patterns",
            "patterns": [
                {"kind": "prefix_level_at_least", "prefixes": ["CHM", "PHY"], "min_level": 3000, "exclude": ["PHY3063"]},
                {"kind": "exact_any", "codes": ["BSC2010"]}
            ]
        }));

        assert!(rule.is_satisfied_by(Some(&code("CHM3217"))));
        assert!(rule.is_satisfied_by(Some(&code("PHY4604"))));
        assert!(rule.is_satisfied_by(Some(&code("BSC2010"))));
        assert!(!rule.is_satisfied_by(Some(&code("PHY3063"))));
        assert!(!rule.is_satisfied_by(Some(&code("CHM2045"))));
        assert!(!rule.is_satisfied_by(Some(&code("MAC3311"))));
        assert!(!rule.is_satisfied_by(None));
    }

    #[test]
    fn exclusion_only_applies_to_its_own_pattern() {
        let rule = rule(json!({
            "name": "Either",
            "type": "patterns",
            "patterns": [
                {"kind": "prefix_level_at_least", "prefixes": ["MAC"], "min_level": 2000, "exclude": ["MAC2311"]},
                {"kind": "exact_any", "codes": ["MAC2311"]}
            ]
        }));

        assert!(rule.is_satisfied_by(Some(&code("MAC2311"))));
    }

    #[test]
    fn suffixed_codes_use_their_numeric_level() {
        let rule = rule(json!({
            "name": "Chemistry",
            "type": "patterns",
            "patterns": [{"kind": "prefix_level_at_least", "prefixes": ["chm"], "min_level": 2000}]
        }));

        assert!(rule.is_satisfied_by(Some(&code("CHM2045L"))));
    }

    #[test]
    fn any_course_matches_everything() {
        let rule = rule(json!({"name": "Elective", "type": "any_course"}));
        assert!(rule.is_satisfied_by(Some(&code("COP3503"))));
        assert!(rule.is_satisfied_by(None));
        assert_eq!(rule.strategy(), &Strategy::AnyCourse);
    }

    #[test]
    fn unknown_rule_type_never_matches() {
        let rule = rule(json!({"name": "Future", "type": "gpa_at_least", "gpa": 3.0}));
        assert_eq!(
            rule.strategy(),
            &Strategy::Unknown {
                kind: "gpa_at_least".to_string()
            }
        );
        assert_eq!(rule.strategy().kind(), "gpa_at_least");
        assert!(!rule.is_satisfied_by(Some(&code("COP3503"))));
        assert!(!rule.is_satisfied_by(None));
    }

    #[test]
    fn unknown_pattern_kind_never_matches() {
        let rule = rule(json!({
            "name": "Mixed",
            "type": "patterns",
            "patterns": [
                {"kind": "regex", "pattern": ".*"},
                {"kind": "exact_any", "codes": ["STA2023"]}
            ]
        }));

        assert!(!rule.is_satisfied_by(Some(&code("COP3503"))));
        assert!(rule.is_satisfied_by(Some(&code("STA2023"))));
    }

    #[test]
    fn known_type_with_missing_fields_is_rejected() {
        let result: Result<Rule, _> =
            serde_json::from_value(json!({"name": "Broken", "type": "exact_any"}));
        let error = result.unwrap_err().to_string();
        assert!(error.contains("Broken"), "{error}");
    }

    #[test]
    fn reversed_level_range_is_rejected() {
        let result: Result<Rule, _> = serde_json::from_value(json!({
            "name": "Backwards",
            "type": "patterns",
            "patterns": [{"kind": "prefix_level_between", "prefix": "HUM", "min_level": 4999, "max_level": 1000}]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn blank_name_is_rejected() {
        let result: Result<Rule, _> =
            serde_json::from_value(json!({"name": "  ", "type": "any_course"}));
        assert!(result.is_err());
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(rule(json!({"name": " Elective ", "type": "any_course"})).name(), "Elective");
    }
}
