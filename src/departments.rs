use std::collections::{BTreeSet, HashMap, HashSet};

use crate::models::{Department, Record};
use crate::settings::TaxonomyConfig;

/// Explicit display-name field, checked first.
const DISPLAY_NAME_FIELD: &str = "department_name";
/// Alternate name fields, checked in order after the display name.
const ALTERNATE_NAME_FIELDS: &[&str] = &["department", "responsible_department"];
/// Foreign key into the department table.
const DEPARTMENT_ID_FIELD: &str = "department_id";

/// Resolve a record's department name.
///
/// Priority: display name, alternate name fields, then the foreign id looked up
/// in `id_to_name`. Returns `None` when nothing resolves.
pub fn resolve_department_name(
    record: &Record,
    id_to_name: &HashMap<String, String>,
) -> Option<String> {
    if let Some(name) = record.text(DISPLAY_NAME_FIELD) {
        return Some(name.to_string());
    }
    for field in ALTERNATE_NAME_FIELDS {
        if let Some(name) = record.text(field) {
            return Some(name.to_string());
        }
    }
    let id = record.key(DEPARTMENT_ID_FIELD)?;
    id_to_name
        .get(&id)
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

pub fn department_map(departments: &[Department]) -> HashMap<String, String> {
    departments
        .iter()
        .filter_map(|d| Some((d.id_key()?, d.name.trim().to_string())))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    Blank,
    Listed,
    Keyword(String),
}

impl std::fmt::Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exclusion::Blank => write!(f, "blank name"),
            Exclusion::Listed => write!(f, "exclusion list"),
            Exclusion::Keyword(k) => write!(f, "keyword \"{k}\""),
        }
    }
}

/// Classifies department names as main (reportable) business units.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    excluded_names: HashSet<String>,
    excluded_keywords: Vec<String>,
}

impl Taxonomy {
    pub fn new(config: &TaxonomyConfig) -> Self {
        Self {
            excluded_names: config
                .excluded_names
                .iter()
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
            excluded_keywords: config
                .excluded_keywords
                .iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Why `name` is not a main department, or `None` if it is one.
    pub fn exclusion(&self, name: &str) -> Option<Exclusion> {
        let name = name.trim();
        if name.is_empty() {
            return Some(Exclusion::Blank);
        }
        if self.excluded_names.contains(name) {
            return Some(Exclusion::Listed);
        }
        self.excluded_keywords
            .iter()
            .find(|k| name.contains(k.as_str()))
            .map(|k| Exclusion::Keyword(k.clone()))
    }

    pub fn is_main_department(&self, name: &str) -> bool {
        self.exclusion(name).is_none()
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new(&TaxonomyConfig::default())
    }
}

/// Department identity resolution bound to one department table and taxonomy.
#[derive(Debug, Clone)]
pub struct DepartmentResolver {
    taxonomy: Taxonomy,
    id_to_name: HashMap<String, String>,
    known: Vec<String>,
}

impl DepartmentResolver {
    pub fn new(taxonomy: Taxonomy, departments: &[Department]) -> Self {
        Self {
            taxonomy,
            id_to_name: department_map(departments),
            known: departments.iter().map(|d| d.name.trim().to_string()).collect(),
        }
    }

    pub fn resolve(&self, record: &Record) -> Option<String> {
        resolve_department_name(record, &self.id_to_name)
    }

    /// Resolved name, kept only when it is a main department.
    pub fn resolve_main(&self, record: &Record) -> Option<String> {
        self.resolve(record)
            .filter(|name| self.taxonomy.is_main_department(name))
    }

    /// Main departments seen in any collection or in the department table,
    /// deduplicated by trimmed name and sorted.
    pub fn department_list(&self, collections: &[&[Record]]) -> Vec<String> {
        let mut names: BTreeSet<String> = collections
            .iter()
            .flat_map(|records| records.iter())
            .filter_map(|r| self.resolve_main(r))
            .collect();
        names.extend(
            self.known
                .iter()
                .filter(|n| self.taxonomy.is_main_department(n))
                .cloned(),
        );
        names.into_iter().collect()
    }

    /// Every name known to the table or the collections, with its exclusion.
    pub fn classify_all(&self, collections: &[&[Record]]) -> Vec<(String, Option<Exclusion>)> {
        let mut names: BTreeSet<String> = collections
            .iter()
            .flat_map(|records| records.iter())
            .filter_map(|r| self.resolve(r))
            .collect();
        names.extend(self.known.iter().filter(|n| !n.is_empty()).cloned());
        names
            .into_iter()
            .map(|n| {
                let why = self.taxonomy.exclusion(&n);
                (n, why)
            })
            .collect()
    }
}
