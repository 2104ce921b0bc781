//! An in-memory catalog of courses for one term.
//!
//! The [`Catalog`] is built once from a snapshot and never mutated
//! afterwards, so it can be shared freely between readers.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::domain::{Course, CourseCode, Filter, RuleSet, UnknownRule, search};

/// An immutable collection of courses, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    /// Creates a catalog from courses in snapshot order.
    #[must_use]
    pub const fn new(courses: Vec<Course>) -> Self {
        Self { courses }
    }

    /// All courses, in snapshot order.
    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// The number of courses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.courses.len()
    }

    /// Whether the catalog has no courses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    /// Courses whose code equals `code` after normalization.
    ///
    /// Codes are not unique: cross-listed or duplicated entries all match.
    pub fn find_by_code(&self, code: &str) -> impl Iterator<Item = &Course> {
        let wanted = CourseCode::normalize(code);
        self.courses
            .iter()
            .filter(move |course| course.code.as_deref() == Some(wanted.as_str()))
    }

    /// The course with the given upstream id, if any.
    #[must_use]
    pub fn find_by_id(&self, course_id: u64) -> Option<&Course> {
        self.courses
            .iter()
            .find(|course| course.course_id == Some(course_id))
    }

    /// Returns at most `limit` courses matching `filter`, in snapshot order.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownRule`] if the filter names a requirement that is not
    /// in `rules`.
    pub fn search(
        &self,
        rules: &RuleSet,
        filter: &Filter,
        limit: usize,
    ) -> Result<Vec<&Course>, UnknownRule> {
        search(&self.courses, rules, filter, limit)
    }

    /// Aggregate statistics about the catalog.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let mut ids = HashSet::new();
        let mut duplicate_ids = 0;
        let mut departments = BTreeSet::new();
        let mut sections = 0;
        let mut with_prerequisites = 0;

        for course in &self.courses {
            if let Some(id) = course.course_id {
                if !ids.insert(id) {
                    duplicate_ids += 1;
                }
            }
            if let Some(code) = &course.code {
                departments.insert(code.prefix().to_string());
            }
            sections += course.sections.len();
            if course.has_prerequisites() {
                with_prerequisites += 1;
            }
        }

        Summary {
            courses: self.courses.len(),
            unique_ids: ids.len(),
            duplicate_ids,
            sections,
            with_prerequisites,
            departments,
        }
    }

    /// A SHA-256 fingerprint of the catalog contents.
    ///
    /// Two catalogs with the same courses in the same order have the same
    /// fingerprint.
    ///
    /// # Panics
    ///
    /// Never in practice: course records contain no non-string map keys.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let encoded = serde_json::to_vec(&self.courses).expect("this should never fail");
        let hash = Sha256::digest(encoded);
        format!("{hash:x}")
    }
}

impl From<Vec<Course>> for Catalog {
    fn from(courses: Vec<Course>) -> Self {
        Self::new(courses)
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Course;
    type IntoIter = std::slice::Iter<'a, Course>;

    fn into_iter(self) -> Self::IntoIter {
        self.courses.iter()
    }
}

impl Serialize for Catalog {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Page<'a> {
            #[serde(rename = "COURSES")]
            courses: &'a [Course],
        }

        Page {
            courses: &self.courses,
        }
        .serialize(serializer)
    }
}

/// Aggregate statistics about a [`Catalog`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Number of courses.
    pub courses: usize,
    /// Number of distinct upstream course ids.
    pub unique_ids: usize,
    /// Number of courses whose id was already seen.
    pub duplicate_ids: usize,
    /// Total sections across all courses.
    pub sections: usize,
    /// Courses that list prerequisites.
    pub with_prerequisites: usize,
    /// Department prefixes present in the catalog.
    pub departments: BTreeSet<String>,
}
