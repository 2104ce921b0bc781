//! The query interface offered to a boundary layer.
//!
//! A [`Service`] owns one [`Catalog`] and one [`RuleSet`], both loaded once at
//! startup and read-only afterwards. Any routing layer (HTTP, CLI, ...) binds
//! its endpoints to the methods here.

use crate::{
    domain::{self, Config, Course, Filter, RuleSet, UnknownRule},
    storage::{self, Catalog, Diagnostic},
};

/// A loaded catalog and rule set, ready to answer queries.
#[derive(Debug, Clone)]
pub struct Service {
    catalog: Catalog,
    rules: RuleSet,
    diagnostics: Vec<Diagnostic>,
    limit: usize,
}

impl Service {
    /// Builds a service from an already loaded catalog and rule set.
    #[must_use]
    pub const fn new(catalog: Catalog, rules: RuleSet, limit: usize) -> Self {
        Self {
            catalog,
            rules,
            diagnostics: Vec::new(),
            limit,
        }
    }

    /// Loads the catalog snapshot and rules named by `config`.
    ///
    /// Records dropped while loading the snapshot do not fail startup; they
    /// are available from [`Service::diagnostics`].
    ///
    /// # Errors
    ///
    /// Returns an error if either file is missing or cannot be parsed. There is
    /// no degraded mode: without both, the service cannot answer queries.
    pub fn open(config: &Config) -> Result<Self, StartupError> {
        let rules = RuleSet::load(&config.rules)?;
        let load = storage::snapshot::load(&config.catalog)?;

        if !load.diagnostics.is_empty() {
            tracing::warn!(
                "{} malformed records were dropped from {}",
                load.diagnostics.len(),
                config.catalog.display()
            );
        }

        Ok(Self {
            catalog: load.catalog,
            rules,
            diagnostics: load.diagnostics,
            limit: config.search_limit(),
        })
    }

    /// The loaded catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The loaded rule set.
    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Records dropped while loading the catalog.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The maximum number of search results.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Searches the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownRule`] if the filter names a requirement that does not
    /// exist. Boundary layers should report this as a bad request.
    pub fn search(&self, filter: &Filter) -> Result<Vec<&Course>, UnknownRule> {
        self.catalog.search(&self.rules, filter, self.limit)
    }

    /// Searches the catalog using raw boundary parameters.
    ///
    /// Missing parameters, blank strings and the literal `"null"` all mean
    /// "no filter".
    ///
    /// # Errors
    ///
    /// Returns [`UnknownRule`] if the requirement names a rule that does not
    /// exist.
    pub fn search_params(
        &self,
        course_code: Option<String>,
        instructor: Option<String>,
        requirement: Option<String>,
    ) -> Result<Vec<&Course>, UnknownRule> {
        self.search(&Filter::from_params(course_code, instructor, requirement))
    }

    /// Names of all requirements, in rule document order.
    #[must_use]
    pub fn requirement_names(&self) -> Vec<&str> {
        self.rules.names().collect()
    }

    /// Whether `course` satisfies the named requirement.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownRule`] if no rule has the given name.
    pub fn fulfills(&self, course: &Course, requirement: &str) -> Result<bool, UnknownRule> {
        self.rules.fulfills(course, requirement)
    }

    /// Names of every requirement `course` satisfies.
    #[must_use]
    pub fn fulfilled<'a>(&'a self, course: &'a Course) -> Vec<&'a str> {
        self.rules.all_satisfied(course).collect()
    }

    /// Every course with the given code, paired with the requirements it
    /// satisfies.
    #[must_use]
    pub fn fulfilled_by_code(&self, code: &str) -> Vec<(&Course, Vec<&str>)> {
        self.catalog
            .find_by_code(code)
            .map(|course| (course, self.fulfilled(course)))
            .collect()
    }
}

/// Errors that prevent the service from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The requirement rules could not be loaded.
    #[error(transparent)]
    Rules(#[from] domain::rule_set::LoadError),

    /// The catalog snapshot could not be loaded.
    #[error(transparent)]
    Catalog(#[from] storage::LoadError),
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    const SNAPSHOT: &str = r#"[
        {"COURSES": [
            {"code": "COP3503", "courseId": "100", "name": "Programming Fundamentals 2",
             "sections": [{"number": "1", "instructors": [{"name": "Alan Turing"}], "meetTimes": []}]},
            {"code": "HUM2020", "courseId": "200", "name": "Introduction to Humanities",
             "sections": [{"number": "2", "instructors": [{"name": "Ada Lovelace"}],
                           "meetTimes": [{"meetNo": 1, "meetDays": ["Funday"]}]}]}
        ]},
        {"COURSES": [
            {"code": "HUM2020", "courseId": "201", "name": "Introduction to Humanities (Honors)"}
        ]}
    ]"#;

    const RULES: &str = r#"{"rules": [
        {"name": "Humanities", "type": "patterns", "patterns": [
            {"kind": "prefix_level_between", "prefix": "HUM", "min_level": 1000, "max_level": 4999}
        ]},
        {"name": "Core Programming", "type": "exact_any", "codes": ["COP3503"]},
        {"name": "Elective", "type": "any_course"}
    ]}"#;

    fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn open() -> (tempfile::TempDir, Service) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.catalog = write(dir.path(), "courses.json", SNAPSHOT);
        config.rules = write(dir.path(), "rules.json", RULES);
        let service = Service::open(&config).unwrap();
        (dir, service)
    }

    #[test]
    fn open_loads_catalog_rules_and_diagnostics() {
        let (_dir, service) = open();
        assert_eq!(service.catalog().len(), 3);
        assert_eq!(
            service.requirement_names(),
            ["Humanities", "Core Programming", "Elective"]
        );
        assert_eq!(service.diagnostics().len(), 1);
        assert_eq!(service.limit(), domain::DEFAULT_LIMIT);
    }

    #[test]
    fn search_params_treat_null_as_unset() {
        let (_dir, service) = open();
        let results = service
            .search_params(Some("null".into()), Some("null".into()), Some("null".into()))
            .unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn search_by_requirement_and_instructor() {
        let (_dir, service) = open();
        let results = service
            .search_params(None, Some("ada lovelace".into()), Some("Humanities".into()))
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].course_id, Some(200));
    }

    #[test]
    fn search_with_unknown_requirement_is_an_error() {
        let (_dir, service) = open();
        assert_eq!(
            service.search_params(None, None, Some("Underwater Basketry".into())),
            Err(UnknownRule("Underwater Basketry".into()))
        );
    }

    #[test]
    fn fulfilled_by_code_covers_duplicate_codes() {
        let (_dir, service) = open();
        let results = service.fulfilled_by_code("hum2020");
        assert_eq!(results.len(), 2);
        for (_, names) in results {
            assert_eq!(names, ["Humanities", "Elective"]);
        }
    }

    #[test]
    fn fulfills_delegates_to_rules() {
        let (_dir, service) = open();
        let course = &service.catalog().courses()[0];
        assert_eq!(service.fulfills(course, "Core Programming"), Ok(true));
        assert_eq!(service.fulfills(course, "Humanities"), Ok(false));
        assert!(service.fulfills(course, "Nope").is_err());
    }

    #[test]
    fn missing_rules_file_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.catalog = write(dir.path(), "courses.json", SNAPSHOT);
        config.rules = dir.path().join("missing.json");

        assert!(matches!(Service::open(&config), Err(StartupError::Rules(_))));
    }

    #[test]
    fn unparsable_catalog_fails_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.catalog = write(dir.path(), "courses.json", "{ not json");
        config.rules = write(dir.path(), "rules.json", RULES);

        assert!(matches!(Service::open(&config), Err(StartupError::Catalog(_))));
    }
}
