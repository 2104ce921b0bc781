//! Course catalog proxy core
//!
//! Loads a term's course listings from an upstream schedule snapshot,
//! normalizes them into typed course, section and meeting records, and
//! answers filtered queries, including whether a course satisfies a degree
//! requirement.

pub mod domain;
pub use domain::{Config, Course, CourseCode, Filter, Meeting, Rule, RuleSet, Section, UnknownRule};

/// Snapshot loading and the in-memory catalog.
pub mod storage;
pub use storage::{Catalog, Diagnostic, Load};

pub mod service;
pub use service::{Service, StartupError};
