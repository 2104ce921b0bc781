//! Catalog snapshot loading.
//!
//! A snapshot is the JSON produced by crawling the upstream schedule API.
//! Its top level is either a single page object or an array of pages (one per
//! department request); each page holds its courses under a `COURSES` key.
//!
//! Loading is a best-effort pass over untrusted data. A meeting, section or
//! course that fails validation is dropped on its own and reported as a
//! [`Diagnostic`]; the rest of the snapshot still loads. Only an unreadable
//! file, invalid JSON, or an unrecognisable top level abort the load.

use std::{fmt, io, path::Path};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::{
    domain::{Course, CourseCode, Meeting, Section},
    storage::Catalog,
};

/// The result of loading a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Load {
    /// The courses that passed validation.
    pub catalog: Catalog,
    /// One entry per dropped record, in document order.
    pub diagnostics: Vec<Diagnostic>,
}

/// The kind of record a [`Diagnostic`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// A whole page of the snapshot.
    Page,
    /// A course and everything in it.
    Course,
    /// A single section of a course.
    Section,
    /// A single meeting of a section.
    Meeting,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Page => "page",
            Self::Course => "course",
            Self::Section => "section",
            Self::Meeting => "meeting",
        })
    }
}

/// A record that was dropped during loading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// What kind of record was dropped.
    pub level: Level,
    /// JSON-pointer style location of the record, e.g.
    /// `/0/COURSES/3/sections/1/meetTimes/0`.
    pub location: String,
    /// Why the record was rejected.
    pub reason: String,
    /// The raw record, as it appeared in the snapshot.
    pub fragment: Value,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.level, self.location, self.reason)
    }
}

/// Errors that abort loading a snapshot.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The snapshot file could not be read.
    #[error("Failed to read catalog snapshot {path}: {source}")]
    Io {
        /// Path of the snapshot file.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The snapshot is not valid JSON.
    #[error("Failed to parse catalog snapshot: {0}")]
    Json(#[from] serde_json::Error),

    /// The top level is neither a page object nor an array of pages.
    #[error("Unexpected catalog snapshot shape: expected an object or an array, found {0}")]
    Shape(&'static str),
}

/// Loads a snapshot file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid JSON, or its top
/// level is neither an object nor an array.
pub fn load(path: &Path) -> Result<Load, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let load = from_json(&content)?;
    tracing::info!(
        "Loaded {} courses from {} ({} records dropped)",
        load.catalog.len(),
        path.display(),
        load.diagnostics.len()
    );
    Ok(load)
}

/// Loads a snapshot from a JSON string.
///
/// # Errors
///
/// Returns an error if the string is not valid JSON, or its top level is
/// neither an object nor an array.
pub fn from_json(content: &str) -> Result<Load, LoadError> {
    let value: Value = serde_json::from_str(content)?;
    from_value(&value)
}

/// Loads a snapshot from an already parsed JSON document.
///
/// # Errors
///
/// Returns [`LoadError::Shape`] if the top level is neither an object nor an
/// array.
pub fn from_value(value: &Value) -> Result<Load, LoadError> {
    let mut loader = Loader::default();
    let mut courses = Vec::new();

    match value {
        Value::Object(_) => loader.read_page(value, "", &mut courses),
        Value::Array(pages) => {
            for (index, page) in pages.iter().enumerate() {
                loader.read_page(page, &format!("/{index}"), &mut courses);
            }
        }
        other => return Err(LoadError::Shape(kind(other))),
    }

    Ok(Load {
        catalog: Catalog::new(courses),
        diagnostics: loader.diagnostics,
    })
}

type Build<T> = fn(&mut Loader, &Map<String, Value>, &str) -> Result<T, String>;

#[derive(Default)]
struct Loader {
    diagnostics: Vec<Diagnostic>,
}

impl Loader {
    fn read_page(&mut self, page: &Value, location: &str, courses: &mut Vec<Course>) {
        let Value::Object(fields) = page else {
            self.reject(
                Level::Page,
                location.to_string(),
                format!("expected an object, found {}", kind(page)),
                page,
            );
            return;
        };

        match self.build_list(
            fields.get("COURSES"),
            location,
            "COURSES",
            Level::Course,
            Self::build_course,
        ) {
            Ok(mut built) => courses.append(&mut built),
            Err(reason) => self.reject(Level::Page, location.to_string(), reason, page),
        }
    }

    fn build_course(
        &mut self,
        fields: &Map<String, Value>,
        location: &str,
    ) -> Result<Course, String> {
        let mut scalars = without(fields, "sections");
        if let Some(Value::String(code)) = scalars.get_mut("code") {
            *code = CourseCode::normalize(code);
        }

        let mut course: Course = decode(scalars)?;
        course.sections = self.build_list(
            fields.get("sections"),
            location,
            "sections",
            Level::Section,
            Self::build_section,
        )?;
        Ok(course)
    }

    fn build_section(
        &mut self,
        fields: &Map<String, Value>,
        location: &str,
    ) -> Result<Section, String> {
        let mut section: Section = decode(without(fields, "meetTimes"))?;
        section.meetings = self.build_list(
            fields.get("meetTimes"),
            location,
            "meetTimes",
            Level::Meeting,
            Self::build_meeting,
        )?;
        Ok(section)
    }

    fn build_meeting(
        &mut self,
        fields: &Map<String, Value>,
        _location: &str,
    ) -> Result<Meeting, String> {
        decode(fields.clone())
    }

    /// Builds every element of an optional array, dropping the ones that fail.
    ///
    /// A missing or `null` array is empty. Anything else that is not an array
    /// fails the enclosing record.
    fn build_list<T>(
        &mut self,
        raw: Option<&Value>,
        location: &str,
        key: &str,
        level: Level,
        build: Build<T>,
    ) -> Result<Vec<T>, String> {
        let items = match raw {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(format!("`{key}` must be an array, found {}", kind(other)));
            }
        };

        let mut built = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let location = format!("{location}/{key}/{index}");
            let result = match item {
                Value::Object(fields) => build(self, fields, &location),
                other => Err(format!("expected an object, found {}", kind(other))),
            };
            match result {
                Ok(record) => built.push(record),
                Err(reason) => self.reject(level, location, reason, item),
            }
        }
        Ok(built)
    }

    fn reject(&mut self, level: Level, location: String, reason: String, fragment: &Value) {
        tracing::warn!(
            %level,
            %location,
            %reason,
            %fragment,
            "Dropping malformed {level}"
        );
        self.diagnostics.push(Diagnostic {
            level,
            location,
            reason,
            fragment: fragment.clone(),
        });
    }
}

fn without(fields: &Map<String, Value>, key: &str) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(name, _)| name.as_str() != key)
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn decode<T: serde::de::DeserializeOwned>(fields: Map<String, Value>) -> Result<T, String> {
    serde_json::from_value(Value::Object(fields)).map_err(|e| e.to_string())
}

const fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
