//! Domain models for the course catalog.
//!
//! This module contains the catalog record types (courses, sections and
//! meetings), course codes, requirement rules and the query engine.

/// Course code parsing and normalization.
pub mod course_code;
pub use course_code::{CourseCode, Error as CourseCodeError};

pub mod course;
pub use course::{Course, Credits, Meeting, Section, VariableCredits, Weekday};

mod lenient;

pub mod rule;
pub use rule::{CodeList, InvalidRule, Pattern, Rule, Strategy};

pub mod rule_set;
pub use rule_set::{RuleSet, UnknownRule};

pub mod query;
pub use query::{DEFAULT_LIMIT, Filter, search};

mod config;
pub use config::Config;
