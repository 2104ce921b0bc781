//! Filtered queries over a set of courses.

use crate::domain::{Course, CourseCode, RuleSet, UnknownRule};

/// The default maximum number of results returned by a search.
pub const DEFAULT_LIMIT: usize = 20;

/// The literal a boundary layer sends for "this filter was not set".
const UNSET: &str = "null";

/// A conjunction of optional course filters.
///
/// Every filter that is present must hold for a course to match. An empty
/// filter matches every course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    /// Exact, case-insensitive course code.
    pub course_code: Option<String>,
    /// Case-insensitive instructor name; matches if any section lists it.
    pub instructor: Option<String>,
    /// Name of a requirement the course must satisfy.
    pub requirement: Option<String>,
}

impl Filter {
    /// Builds a filter from raw boundary values.
    ///
    /// A value that is missing, blank, or the literal string `"null"` is
    /// treated as unset.
    #[must_use]
    pub fn from_params(
        course_code: Option<String>,
        instructor: Option<String>,
        requirement: Option<String>,
    ) -> Self {
        Self {
            course_code: param(course_code),
            instructor: param(instructor),
            requirement: param(requirement),
        }
    }

    /// Whether no filter is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.course_code.is_none() && self.instructor.is_none() && self.requirement.is_none()
    }
}

fn param(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != UNSET)
}

/// Returns the first `limit` courses that satisfy every filter, in catalog
/// order.
///
/// Filters are applied cheapest first: code, then instructor, then
/// requirement.
///
/// # Errors
///
/// Returns [`UnknownRule`] if the requirement filter names a rule that does
/// not exist. This is checked before any course is examined.
pub fn search<'a>(
    courses: &'a [Course],
    rules: &RuleSet,
    filter: &Filter,
    limit: usize,
) -> Result<Vec<&'a Course>, UnknownRule> {
    let rule = filter
        .requirement
        .as_deref()
        .map(|name| rules.rule(name))
        .transpose()?;
    let code = filter.course_code.as_deref().map(CourseCode::normalize);
    let instructor = filter.instructor.as_deref();

    let results = courses
        .iter()
        .filter(|course| {
            code.as_deref().is_none_or(|wanted| {
                course
                    .code
                    .as_ref()
                    .is_some_and(|actual| actual.as_str() == wanted)
            })
        })
        .filter(|course| instructor.is_none_or(|name| course.is_taught_by(name)))
        .filter(|course| rule.is_none_or(|rule| rule.is_satisfied_by(course.code.as_ref())))
        .take(limit)
        .collect();

    Ok(results)
}
