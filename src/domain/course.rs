//! Course, section and meeting records.
//!
//! These types mirror the upstream schedule-of-courses feed. Field names
//! serialize back to the upstream spelling so that a loaded catalog can be
//! written out as a snapshot and read in again.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{CourseCode, lenient};

/// A single catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Course {
    /// Catalog code, e.g. `COP3503`.
    pub code: Option<CourseCode>,
    /// Upstream primary key.
    #[serde(deserialize_with = "lenient::number")]
    pub course_id: Option<u64>,
    /// Course title.
    #[serde(deserialize_with = "lenient::text")]
    pub name: Option<String>,
    /// Catalog description.
    #[serde(deserialize_with = "lenient::text")]
    pub description: Option<String>,
    /// Prerequisite free text, exactly as published.
    #[serde(deserialize_with = "lenient::text")]
    pub prerequisites: Option<String>,
    /// Open seats summed across all sections.
    #[serde(deserialize_with = "lenient::number")]
    pub open_seats: Option<u32>,
    /// Term indicator.
    #[serde(deserialize_with = "lenient::text")]
    pub term_ind: Option<String>,
    /// Offerings of this course, in upstream order.
    #[serde(deserialize_with = "lenient::list")]
    pub sections: Vec<Section>,
}

impl Course {
    /// All instructor names across every section, in section order.
    ///
    /// Names appearing in several sections are repeated.
    pub fn instructors(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|section| section.instructors.iter().map(String::as_str))
    }

    /// Whether the named instructor teaches any section of this course.
    ///
    /// The comparison ignores case and surrounding whitespace.
    #[must_use]
    pub fn is_taught_by(&self, instructor: &str) -> bool {
        let wanted = instructor.trim().to_lowercase();
        self.instructors()
            .any(|name| name.trim().to_lowercase() == wanted)
    }

    /// Whether the course lists prerequisites.
    ///
    /// The upstream feed uses `"None."` for courses without any.
    #[must_use]
    pub fn has_prerequisites(&self) -> bool {
        self.prerequisites
            .as_deref()
            .map(str::trim)
            .is_some_and(|text| !text.is_empty() && text != "None.")
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code.as_ref().map_or("-------", CourseCode::as_str);
        match &self.name {
            Some(name) => write!(f, "{code} {name}"),
            None => f.write_str(code),
        }
    }
}

/// One offering of a course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Section {
    /// Section number.
    #[serde(deserialize_with = "lenient::text")]
    pub number: Option<String>,
    /// Numeric class (registration) number.
    #[serde(deserialize_with = "lenient::number")]
    pub class_number: Option<u32>,
    /// Display label.
    #[serde(deserialize_with = "lenient::text")]
    pub display: Option<String>,
    /// Credit value.
    #[serde(deserialize_with = "credits")]
    pub credits: Option<Credits>,
    /// Lower bound for variable-credit sections.
    #[serde(rename = "credits_min", deserialize_with = "lenient::number")]
    pub credits_min: Option<f64>,
    /// Upper bound for variable-credit sections.
    #[serde(rename = "credits_max", deserialize_with = "lenient::number")]
    pub credits_max: Option<f64>,
    /// Department code.
    #[serde(deserialize_with = "lenient::text")]
    pub dept_code: Option<String>,
    /// Department name.
    #[serde(deserialize_with = "lenient::text")]
    pub dept_name: Option<String>,
    /// Academic career level, e.g. `UGRD`.
    #[serde(deserialize_with = "lenient::text")]
    pub acad_career: Option<String>,
    /// Grading basis.
    #[serde(deserialize_with = "lenient::text")]
    pub grad_basis: Option<String>,
    /// Web/online delivery code.
    #[serde(deserialize_with = "lenient::text")]
    pub sect_web: Option<String>,
    /// Final exam information.
    #[serde(deserialize_with = "lenient::text")]
    pub final_exam: Option<String>,
    /// First day of instruction.
    #[serde(deserialize_with = "lenient::text")]
    pub start_date: Option<String>,
    /// Last day of instruction.
    #[serde(deserialize_with = "lenient::text")]
    pub end_date: Option<String>,
    /// Drop/add deadline.
    #[serde(rename = "dropaddDeadline", deserialize_with = "lenient::text")]
    pub drop_add_deadline: Option<String>,
    /// Open seats in this section.
    #[serde(deserialize_with = "lenient::number")]
    pub open_seats: Option<u32>,
    /// Course fee, as published.
    #[serde(deserialize_with = "lenient::text")]
    pub course_fee: Option<String>,
    /// Counts towards the writing requirement.
    #[serde(deserialize_with = "lenient::flag")]
    pub gr_writing: Option<bool>,
    /// Experiential-learning flag.
    #[serde(rename = "EEP", deserialize_with = "lenient::flag")]
    pub experiential: Option<bool>,
    /// Section was added after the schedule was published.
    #[serde(deserialize_with = "lenient::flag")]
    pub late_flag: Option<bool>,
    /// AI-focused section.
    #[serde(rename = "isAICourse", deserialize_with = "lenient::flag")]
    pub is_ai_course: Option<bool>,
    /// Affordable course materials.
    #[serde(deserialize_with = "lenient::flag")]
    pub is_affordable: Option<bool>,
    /// Section note.
    #[serde(deserialize_with = "lenient::text")]
    pub note: Option<String>,
    /// Department note.
    #[serde(rename = "dNote", deserialize_with = "lenient::text")]
    pub d_note: Option<String>,
    /// Topic title for rotating-topic courses.
    #[serde(deserialize_with = "lenient::text")]
    pub rotate_title: Option<String>,
    /// Instructor names, in upstream order.
    #[serde(
        deserialize_with = "lenient::instructor_names",
        serialize_with = "lenient::serialize_instructor_names"
    )]
    pub instructors: Vec<String>,
    /// Scheduled meetings, in upstream order.
    #[serde(rename = "meetTimes", deserialize_with = "lenient::list")]
    pub meetings: Vec<Meeting>,
}

/// Credit value of a section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Credits {
    /// A fixed number of credits.
    Fixed(f64),
    /// A variable-credit marker such as `VAR`; see the section's min/max.
    Variable(VariableCredits),
}

/// Marker for variable credit sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VariableCredits {
    /// Credits are chosen at registration.
    #[serde(rename = "VAR")]
    Var,
}

/// One scheduled class session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Meeting {
    /// Sequence number within the section.
    #[serde(deserialize_with = "lenient::number")]
    pub meet_no: Option<u32>,
    /// Days this meeting takes place.
    #[serde(deserialize_with = "weekdays")]
    pub meet_days: BTreeSet<Weekday>,
    /// Start clock time, e.g. `10:40 AM`.
    #[serde(deserialize_with = "lenient::text")]
    pub meet_time_begin: Option<String>,
    /// End clock time.
    #[serde(deserialize_with = "lenient::text")]
    pub meet_time_end: Option<String>,
    /// Start period index.
    #[serde(deserialize_with = "lenient::text")]
    pub meet_period_begin: Option<String>,
    /// End period index.
    #[serde(deserialize_with = "lenient::text")]
    pub meet_period_end: Option<String>,
    /// Building name.
    #[serde(deserialize_with = "lenient::text")]
    pub meet_building: Option<String>,
    /// Building code.
    #[serde(deserialize_with = "lenient::text")]
    pub meet_bldg_code: Option<String>,
    /// Room.
    #[serde(deserialize_with = "lenient::text")]
    pub meet_room: Option<String>,
}

/// Upstream weekday letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    /// Monday
    #[serde(rename = "M")]
    Monday,
    /// Tuesday
    #[serde(rename = "T")]
    Tuesday,
    /// Wednesday
    #[serde(rename = "W")]
    Wednesday,
    /// Thursday
    #[serde(rename = "R")]
    Thursday,
    /// Friday
    #[serde(rename = "F")]
    Friday,
    /// Saturday
    #[serde(rename = "S")]
    Saturday,
    /// Sunday
    #[serde(rename = "U")]
    Sunday,
}

impl TryFrom<char> for Weekday {
    type Error = char;

    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Ok(match letter {
            'M' => Self::Monday,
            'T' => Self::Tuesday,
            'W' => Self::Wednesday,
            'R' => Self::Thursday,
            'F' => Self::Friday,
            'S' => Self::Saturday,
            'U' => Self::Sunday,
            other => return Err(other),
        })
    }
}

/// Credits arrive as a number, a numeric string such as `"3"`, or `"VAR"`.
fn credits<'de, D>(deserializer: D) -> Result<Option<Credits>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(value)) => Ok(Some(Credits::Fixed(value))),
        Some(Raw::Text(text)) => match text.trim() {
            "" => Ok(None),
            "VAR" => Ok(Some(Credits::Variable(VariableCredits::Var))),
            trimmed => trimmed
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .map(|value| Some(Credits::Fixed(value)))
                .ok_or_else(|| D::Error::custom(format!("invalid credits '{text}'"))),
        },
    }
}

/// Days arrive either as `["M", "W"]` or as a run of letters like `"MW"`.
fn weekdays<'de, D>(deserializer: D) -> Result<BTreeSet<Weekday>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(BTreeSet<Weekday>),
        Letters(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(BTreeSet::new()),
        Some(Raw::List(days)) => Ok(days),
        Some(Raw::Letters(letters)) => letters
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(Weekday::try_from)
            .collect::<Result<_, _>>()
            .map_err(|c| D::Error::custom(format!("unknown weekday '{c}'"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use test_case::test_case;

    use super::*;

    #[test]
    fn meeting_reads_upstream_fields() {
        let meeting: Meeting = serde_json::from_value(json!({
            "meetNo": 1,
            "meetDays": ["M", "W", "F"],
            "meetTimeBegin": "10:40 AM",
            "meetTimeEnd": "11:30 AM",
            "meetPeriodBegin": "4",
            "meetPeriodEnd": 4,
            "meetBuilding": "CSE",
            "meetBldgCode": "0042",
            "meetRoom": "E119"
        }))
        .unwrap();

        assert_eq!(meeting.meet_no, Some(1));
        assert_eq!(
            meeting.meet_days.iter().copied().collect::<Vec<_>>(),
            [Weekday::Monday, Weekday::Wednesday, Weekday::Friday]
        );
        assert_eq!(meeting.meet_period_begin.as_deref(), Some("4"));
        assert_eq!(meeting.meet_period_end.as_deref(), Some("4"));
        assert_eq!(meeting.meet_room.as_deref(), Some("E119"));
    }

    #[test]
    fn meeting_days_accept_letter_runs() {
        let meeting: Meeting = serde_json::from_value(json!({"meetDays": "TR"})).unwrap();
        assert_eq!(
            meeting.meet_days.iter().copied().collect::<Vec<_>>(),
            [Weekday::Tuesday, Weekday::Thursday]
        );
    }

    #[test]
    fn meeting_rejects_unknown_days() {
        assert!(serde_json::from_value::<Meeting>(json!({"meetDays": ["X"]})).is_err());
        assert!(serde_json::from_value::<Meeting>(json!({"meetDays": "MQ"})).is_err());
    }

    #[test]
    fn all_meeting_fields_are_optional() {
        let meeting: Meeting = serde_json::from_value(json!({})).unwrap();
        assert_eq!(meeting, Meeting::default());
    }

    #[test]
    fn section_reads_flags_and_instructors() {
        let section: Section = serde_json::from_value(json!({
            "number": "1234",
            "classNumber": "10567",
            "credits": 3,
            "EEP": "N",
            "lateFlag": "Y",
            "isAICourse": false,
            "instructors": [{"name": "Grace Hopper"}],
            "meetTimes": null
        }))
        .unwrap();

        assert_eq!(section.class_number, Some(10_567));
        assert_eq!(section.credits, Some(Credits::Fixed(3.0)));
        assert_eq!(section.experiential, Some(false));
        assert_eq!(section.late_flag, Some(true));
        assert_eq!(section.is_ai_course, Some(false));
        assert_eq!(section.instructors, ["Grace Hopper"]);
        assert!(section.meetings.is_empty());
    }

    #[test]
    fn section_accepts_variable_credits() {
        let section: Section = serde_json::from_value(json!({
            "credits": "VAR",
            "credits_min": 1,
            "credits_max": "4"
        }))
        .unwrap();

        assert_eq!(section.credits, Some(Credits::Variable(VariableCredits::Var)));
        assert_eq!(section.credits_min, Some(1.0));
        assert_eq!(section.credits_max, Some(4.0));
    }

    #[test_case(json!(3), Some(Credits::Fixed(3.0)); "number")]
    #[test_case(json!("3"), Some(Credits::Fixed(3.0)); "numeric string")]
    #[test_case(json!(" 1.5 "), Some(Credits::Fixed(1.5)); "padded fraction")]
    #[test_case(json!("VAR"), Some(Credits::Variable(VariableCredits::Var)); "variable")]
    #[test_case(json!(""), None; "blank")]
    #[test_case(json!(null), None; "null")]
    fn section_accepts_credits(raw: serde_json::Value, expected: Option<Credits>) {
        let section: Section = serde_json::from_value(json!({"credits": raw})).unwrap();
        assert_eq!(section.credits, expected);
    }

    #[test]
    fn section_rejects_unknown_credit_text() {
        assert!(serde_json::from_value::<Section>(json!({"credits": "lots"})).is_err());
        assert!(serde_json::from_value::<Section>(json!({"credits": "NaN"})).is_err());
    }

    #[test]
    fn course_requires_a_well_formed_code() {
        assert!(serde_json::from_value::<Course>(json!({"code": "COP3503"})).is_ok());
        assert!(serde_json::from_value::<Course>(json!({"code": "cop 3503"})).is_err());
        assert!(serde_json::from_value::<Course>(json!({"code": null})).is_ok());
    }

    #[test]
    fn course_serializes_upstream_names() {
        let course = Course {
            code: Some("COP3503".parse().unwrap()),
            course_id: Some(42),
            ..Course::default()
        };
        let value = serde_json::to_value(&course).unwrap();
        assert_eq!(value["code"], "COP3503");
        assert_eq!(value["courseId"], 42);
        assert_eq!(value["sections"], json!([]));
    }

    #[test]
    fn instructor_lookup_spans_sections() {
        let course = Course {
            sections: vec![
                Section {
                    instructors: vec!["Ada Lovelace".into()],
                    ..Section::default()
                },
                Section {
                    instructors: vec!["Alan Turing".into(), "Grace Hopper".into()],
                    ..Section::default()
                },
            ],
            ..Course::default()
        };

        assert!(course.is_taught_by("grace hopper"));
        assert!(course.is_taught_by("  ADA LOVELACE "));
        assert!(!course.is_taught_by("Ada"));
        assert_eq!(course.instructors().count(), 3);
    }

    #[test]
    fn prerequisites_treat_none_marker_as_absent() {
        let mut course = Course::default();
        assert!(!course.has_prerequisites());
        course.prerequisites = Some("None.".into());
        assert!(!course.has_prerequisites());
        course.prerequisites = Some("  ".into());
        assert!(!course.has_prerequisites());
        course.prerequisites = Some("Prereq: COP3502C".into());
        assert!(course.has_prerequisites());
    }
}
