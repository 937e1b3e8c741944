use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::Result;
use crate::models::{Department, FetchResult, Module, Record};

pub const DEPARTMENTS_FILE: &str = "departments.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearFilter {
    pub year: i32,
}

/// Collaborator that supplies the raw planning collections.
pub trait PlanningSource {
    fn fetch(&self, module: Module, filter: &YearFilter) -> FetchResult<Record>;

    fn departments(&self, kind: Option<&str>) -> FetchResult<Department>;

    fn annual_plans(&self, filter: &YearFilter) -> FetchResult<Record> {
        self.fetch(Module::AnnualPlans, filter)
    }

    fn department_targets(&self, filter: &YearFilter) -> FetchResult<Record> {
        self.fetch(Module::DepartmentTargets, filter)
    }

    fn monthly_progress(&self, filter: &YearFilter) -> FetchResult<Record> {
        self.fetch(Module::MonthlyProgress, filter)
    }

    fn major_events(&self, filter: &YearFilter) -> FetchResult<Record> {
        self.fetch(Module::MajorEvents, filter)
    }

    fn action_plans(&self, filter: &YearFilter) -> FetchResult<Record> {
        self.fetch(Module::ActionPlans, filter)
    }
}

/// A data file is either a `{ success, data }` envelope or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum Payload<T> {
    Envelope(FetchResult<T>),
    Bare(Vec<T>),
}

impl<T> From<Payload<T>> for FetchResult<T> {
    fn from(payload: Payload<T>) -> Self {
        match payload {
            Payload::Envelope(result) => result,
            Payload::Bare(data) => FetchResult::ok(data),
        }
    }
}

pub fn read_payload<T: DeserializeOwned>(path: &Path) -> Result<FetchResult<T>> {
    let content = std::fs::read_to_string(path)?;
    let payload: Payload<T> = serde_json::from_str(&content)?;
    Ok(payload.into())
}

/// Reads one JSON file per collection from a data directory.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, module: Module) -> PathBuf {
        self.dir.join(module.file_name())
    }

    fn load<T: DeserializeOwned>(&self, path: &Path) -> FetchResult<T> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "data file not found");
            return FetchResult::failed();
        }
        match read_payload(path) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable data file");
                FetchResult::failed()
            }
        }
    }
}

/// Records tagged with another year are out; untagged records are kept.
fn in_year(record: &Record, year: i32) -> bool {
    record.integer("year").map_or(true, |y| y == year as i64)
}

impl PlanningSource for JsonDirSource {
    fn fetch(&self, module: Module, filter: &YearFilter) -> FetchResult<Record> {
        let raw: FetchResult<Value> = self.load(&self.path_for(module));
        FetchResult {
            success: raw.success,
            data: raw
                .data
                .into_iter()
                .map(Record::from)
                .filter(|r| in_year(r, filter.year))
                .collect(),
        }
    }

    fn departments(&self, kind: Option<&str>) -> FetchResult<Department> {
        let mut result: FetchResult<Department> = self.load(&self.dir.join(DEPARTMENTS_FILE));
        if let Some(kind) = kind {
            result
                .data
                .retain(|d| d.kind.as_deref().map_or(true, |k| k == kind));
        }
        result
    }
}

/// All collections for one computation, with failed fetches left empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub department_targets: Vec<Record>,
    pub monthly_progress: Vec<Record>,
    pub major_events: Vec<Record>,
    pub action_plans: Vec<Record>,
    pub annual_plans: Vec<Record>,
    pub departments: Vec<Department>,
}

impl Snapshot {
    pub fn fetch(source: &dyn PlanningSource, year: i32, department_type: Option<&str>) -> Self {
        let filter = YearFilter { year };
        let take = |module: Module, result: FetchResult<Record>| {
            if !result.success {
                tracing::warn!(module = module.key(), year, "fetch failed, treating as empty");
            }
            result.into_data()
        };
        let departments = source.departments(department_type);
        if !departments.success {
            tracing::warn!("department list unavailable");
        }
        let snapshot = Self {
            department_targets: take(Module::DepartmentTargets, source.department_targets(&filter)),
            monthly_progress: take(Module::MonthlyProgress, source.monthly_progress(&filter)),
            major_events: take(Module::MajorEvents, source.major_events(&filter)),
            action_plans: take(Module::ActionPlans, source.action_plans(&filter)),
            annual_plans: take(Module::AnnualPlans, source.annual_plans(&filter)),
            departments: departments.into_data(),
        };
        tracing::info!(
            year,
            targets = snapshot.department_targets.len(),
            progress = snapshot.monthly_progress.len(),
            events = snapshot.major_events.len(),
            actions = snapshot.action_plans.len(),
            annual = snapshot.annual_plans.len(),
            departments = snapshot.departments.len(),
            "snapshot loaded"
        );
        snapshot
    }

    pub fn records(&self, module: Module) -> &[Record] {
        match module {
            Module::DepartmentTargets => &self.department_targets,
            Module::MonthlyProgress => &self.monthly_progress,
            Module::MajorEvents => &self.major_events,
            Module::ActionPlans => &self.action_plans,
            Module::AnnualPlans => &self.annual_plans,
        }
    }

    pub fn collections(&self) -> [&[Record]; 5] {
        Module::ALL.map(|m| self.records(m))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, value: Value) {
        std::fs::write(dir.join(name), serde_json::to_string(&value).unwrap()).unwrap();
    }

    #[test]
    fn test_reads_envelope_and_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "department_targets.json",
            json!({"success": true, "data": [{"department": "销售部", "month": 1}]}),
        );
        write(
            dir.path(),
            "monthly_progress.json",
            json!([{"department": "销售部", "month": 1}, {"department": "生产部", "month": 2}]),
        );
        let source = JsonDirSource::new(dir.path());
        let filter = YearFilter { year: 2025 };
        assert_eq!(source.department_targets(&filter).data.len(), 1);
        let progress = source.monthly_progress(&filter);
        assert!(progress.success);
        assert_eq!(progress.data.len(), 2);
    }

    #[test]
    fn test_missing_and_broken_files_fail_softly() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("major_events.json"), "{not json").unwrap();
        let source = JsonDirSource::new(dir.path());
        let filter = YearFilter { year: 2025 };
        assert!(!source.annual_plans(&filter).success);
        assert!(!source.major_events(&filter).success);
    }

    #[test]
    fn test_year_filter_keeps_untagged() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "annual_plans.json",
            json!([{"year": 2025}, {"year": "2024"}, {"title": "untagged"}]),
        );
        let source = JsonDirSource::new(dir.path());
        let data = source.annual_plans(&YearFilter { year: 2025 }).data;
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn test_department_type_filter() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            DEPARTMENTS_FILE,
            json!([
                {"id": 1, "name": "销售部", "type": "business"},
                {"id": 2, "name": "财务部", "type": "function"},
                {"id": 3, "name": "生产部"}
            ]),
        );
        let source = JsonDirSource::new(dir.path());
        assert_eq!(source.departments(None).data.len(), 3);
        let business = source.departments(Some("business")).data;
        assert_eq!(business.len(), 2);
        assert!(business.iter().all(|d| d.name != "财务部"));
    }

    struct PartialSource;

    impl PlanningSource for PartialSource {
        fn fetch(&self, module: Module, _filter: &YearFilter) -> FetchResult<Record> {
            match module {
                Module::MajorEvents => FetchResult {
                    success: false,
                    data: vec![Record::from(json!({"department": "销售部"}))],
                },
                _ => FetchResult::ok(vec![Record::from(json!({"department": "销售部", "month": 1}))]),
            }
        }

        fn departments(&self, _kind: Option<&str>) -> FetchResult<Department> {
            FetchResult::failed()
        }
    }

    #[test]
    fn test_snapshot_treats_failed_fetch_as_empty() {
        let snapshot = Snapshot::fetch(&PartialSource, 2025, None);
        assert!(snapshot.major_events.is_empty());
        assert!(snapshot.departments.is_empty());
        assert_eq!(snapshot.department_targets.len(), 1);
        assert_eq!(snapshot.annual_plans.len(), 1);
        assert_eq!(snapshot.collections().iter().map(|c| c.len()).sum::<usize>(), 4);
    }
}
