use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::month_end;
use crate::departments::{DepartmentResolver, Taxonomy};
use crate::error::{PlanError, Result};
use crate::grid::{build_grid, cell_values, department_scope, month_scope, CellSource, GridCell};
use crate::indexer::{project_month, CellKey, Indices};
use crate::models::{Module, Record};
use crate::source::Snapshot;
use crate::stats::{progress_of, ModuleStats};
use crate::status::{classify_at, record_deadline, record_status, Status, StatusHint};
use crate::totals::Totals;

/// The filter every view is computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub year: i32,
    pub month: Option<u32>,
    pub department: Option<String>,
}

impl Selection {
    pub fn new(year: i32, month: Option<u32>, department: Option<String>) -> Result<Self> {
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(PlanError::InvalidMonth(m));
            }
        }
        Ok(Self {
            year,
            month,
            department: department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }

    pub fn year(year: i32) -> Self {
        Self {
            year,
            month: None,
            department: None,
        }
    }
}

/// Everything the consumers read: grid, totals and completion statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanningView {
    pub year: i32,
    pub months: Vec<u32>,
    pub departments: Vec<String>,
    pub grid: Vec<GridCell>,
    pub totals: Totals,
    pub stats: ModuleStats,
}

impl PlanningView {
    /// Status of a cell, late once its month has ended.
    pub fn cell_status(&self, cell: &GridCell, today: NaiveDate) -> Status {
        cell.status(month_end(self.year, cell.month), today)
    }

    /// Status of a department across the months in scope.
    pub fn department_status(&self, department: &str, today: NaiveDate) -> Status {
        let deadline = self
            .months
            .iter()
            .max()
            .and_then(|&m| month_end(self.year, m));
        classify_at(self.totals.department(department).completion(), deadline, today)
    }

    pub fn cell(&self, month: u32, department: &str) -> Option<&GridCell> {
        self.grid
            .iter()
            .find(|c| c.month == month && c.department == department)
    }
}

pub fn resolver_for(snapshot: &Snapshot, taxonomy: &Taxonomy) -> DepartmentResolver {
    DepartmentResolver::new(taxonomy.clone(), &snapshot.departments)
}

/// Recompute the full view from a snapshot. Pure: same inputs, same output.
pub fn compute(snapshot: &Snapshot, taxonomy: &Taxonomy, selection: &Selection) -> PlanningView {
    let resolver = resolver_for(snapshot, taxonomy);
    let indices = Indices::build(snapshot, &resolver);

    let months = month_scope(selection.month);
    let departments = department_scope(
        resolver.department_list(&snapshot.collections()),
        selection.department.as_deref(),
    );
    let grid = build_grid(&months, &departments, &indices);
    let totals = Totals::compute(&grid);
    let stats = ModuleStats::compute(snapshot);

    PlanningView {
        year: selection.year,
        months,
        departments,
        grid,
        totals,
        stats,
    }
}

// ---------------------------------------------------------------------------
// Drill-down
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellDetail {
    pub month: u32,
    pub department: String,
    pub target: f64,
    pub current: f64,
    pub source: CellSource,
    pub records: BTreeMap<Module, Vec<Record>>,
}

/// The grid value at one coordinate plus every record indexed there.
pub fn drill_down(
    snapshot: &Snapshot,
    taxonomy: &Taxonomy,
    month: u32,
    department: &str,
) -> CellDetail {
    let resolver = resolver_for(snapshot, taxonomy);
    let indices = Indices::build(snapshot, &resolver);
    let key = CellKey::new(month, department.trim());
    let (target, current, source) = cell_values(&key, &indices);
    let records = Module::ALL
        .into_iter()
        .filter_map(|m| {
            let found = indices.get(m).get(&key);
            if found.is_empty() {
                None
            } else {
                Some((m, found.iter().map(|r| (*r).clone()).collect()))
            }
        })
        .collect();
    CellDetail {
        month,
        department: key.department,
        target,
        current,
        source,
        records,
    }
}

// ---------------------------------------------------------------------------
// Per-record listing
// ---------------------------------------------------------------------------

const TITLE_FIELDS: &[&str] = &["title", "name", "event_name", "plan_name", "what", "indicator"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordRow {
    pub title: Option<String>,
    pub department: Option<String>,
    pub month: Option<u32>,
    pub progress: f64,
    pub hint: Option<StatusHint>,
    pub status: Status,
}

/// One row per record with its resolved coordinates and lifecycle status.
///
/// A recognized explicit status wins over the numeric classification, the same
/// precedence the completion statistics use.
pub fn list_records(
    snapshot: &Snapshot,
    taxonomy: &Taxonomy,
    module: Module,
    today: NaiveDate,
) -> Vec<RecordRow> {
    let resolver = resolver_for(snapshot, taxonomy);
    snapshot
        .records(module)
        .iter()
        .map(|record| {
            let progress = progress_of(module, record);
            let hint = record_status(module, record);
            let deadline = record_deadline(module, record);
            let status = match hint {
                Some(StatusHint::Completed) => Status::Completed,
                Some(StatusHint::Delayed) => Status::Delayed,
                Some(StatusHint::NotStarted) => Status::NotStarted,
                Some(StatusHint::InProgress) => {
                    if deadline.is_some_and(|d| d < today) {
                        Status::Delayed
                    } else {
                        Status::InProgress
                    }
                }
                None => classify_at(progress, deadline, today),
            };
            RecordRow {
                title: TITLE_FIELDS
                    .iter()
                    .find_map(|f| record.text(f))
                    .map(str::to_string),
                department: resolver.resolve(record),
                month: project_month(module, record),
                progress,
                hint,
                status,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Department;
    use serde_json::json;

    fn rec(v: serde_json::Value) -> Record {
        Record::from(v)
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            department_targets: vec![
                rec(json!({"department": "销售部", "month": 3, "target_value": 100, "current_value": 40})),
                rec(json!({"department": "生产部", "month": 5, "target_value": 50, "current_value": 50})),
                rec(json!({"department": "设计部", "month": 5, "target_value": 999, "current_value": 1})),
            ],
            monthly_progress: vec![
                rec(json!({"department": "销售部", "month": 3, "target_value": 120, "actual_value": 120})),
            ],
            major_events: vec![
                rec(json!({"department_id": 4, "title": "新品发布会", "status": "已完成"})),
                rec(json!({"department": "销售部", "date": "2025-06-18", "progress": 30, "planned_date": "2025-06-01"})),
            ],
            action_plans: vec![
                rec(json!({"department": "市场部", "when": "7月", "what": "渠道拓展", "progress": 60})),
            ],
            annual_plans: vec![rec(json!({"department": "销售部", "month": 12, "completion_rate": 0}))],
            departments: vec![
                Department { id: json!(4), name: "市场部".to_string(), kind: None },
                Department { id: json!(5), name: "人力资源部".to_string(), kind: None },
            ],
        }
    }

    #[test]
    fn test_end_to_end_progress_wins() {
        let snap = snapshot();
        let view = compute(&snap, &Taxonomy::default(), &Selection::year(2025));
        let cell = view.cell(3, "销售部").unwrap();
        assert_eq!((cell.target, cell.current), (120.0, 120.0));
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(view.cell_status(cell, today), Status::Completed);
    }

    #[test]
    fn test_department_list_and_density() {
        let snap = snapshot();
        let view = compute(&snap, &Taxonomy::default(), &Selection::year(2025));
        let mut expected = vec!["市场部".to_string(), "生产部".to_string(), "销售部".to_string()];
        expected.sort();
        assert_eq!(view.departments, expected);
        assert_eq!(view.grid.len(), 12 * 3);
        assert!(view.cell(5, "设计部").is_none());
    }

    #[test]
    fn test_selection_narrows_scope() {
        let snap = snapshot();
        let selection = Selection::new(2025, Some(5), Some(" 生产部 ".to_string())).unwrap();
        let view = compute(&snap, &Taxonomy::default(), &selection);
        assert_eq!(view.grid.len(), 1);
        assert_eq!(view.totals.grand.target, 50.0);
        assert_eq!(view.stats.overall.total, 8);
    }

    #[test]
    fn test_selection_rejects_bad_month() {
        assert!(Selection::new(2025, Some(13), None).is_err());
        assert!(Selection::new(2025, Some(0), None).is_err());
        let s = Selection::new(2025, None, Some("  ".to_string())).unwrap();
        assert!(s.department.is_none());
    }

    #[test]
    fn test_totals_and_overall_consistency() {
        let snap = snapshot();
        let view = compute(&snap, &Taxonomy::default(), &Selection::year(2025));
        let cell_sum: f64 = view.grid.iter().map(|c| c.target).sum();
        assert_eq!(view.totals.grand.target, cell_sum);
        let month_sum: f64 = view.totals.by_month.values().map(|a| a.target).sum();
        assert_eq!(month_sum, view.totals.grand.target);
        let module_total: u32 = view.stats.modules.values().map(|s| s.total).sum();
        assert_eq!(view.stats.overall.total, module_total);
        let overall = view.stats.overall;
        let expected_rate =
            (overall.completed as f64 / overall.total as f64 * 100.0).round() as u32;
        assert_eq!(view.stats.overall.rate, expected_rate);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let snap = snapshot();
        let selection = Selection::year(2025);
        let a = compute(&snap, &Taxonomy::default(), &selection);
        let b = compute(&snap, &Taxonomy::default(), &selection);
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_drill_down_lists_contributors() {
        let snap = snapshot();
        let detail = drill_down(&snap, &Taxonomy::default(), 3, "销售部");
        assert_eq!(detail.source, CellSource::MonthlyProgress);
        assert_eq!(detail.target, 120.0);
        assert_eq!(detail.records[&Module::DepartmentTargets].len(), 1);
        assert_eq!(detail.records[&Module::MonthlyProgress].len(), 1);
        assert!(!detail.records.contains_key(&Module::MajorEvents));

        let detail = drill_down(&snap, &Taxonomy::default(), 6, "销售部");
        assert_eq!(detail.source, CellSource::Empty);
        assert_eq!(detail.records[&Module::MajorEvents].len(), 1);
    }

    #[test]
    fn test_list_records_statuses() {
        let snap = snapshot();
        let today = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let rows = list_records(&snap, &Taxonomy::default(), Module::MajorEvents, today);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].department.as_deref(), Some("市场部"));
        assert_eq!(rows[0].status, Status::Completed);
        assert_eq!(rows[0].month, None);
        assert_eq!(rows[1].month, Some(6));
        assert_eq!(rows[1].status, Status::Delayed);

        let rows = list_records(&snap, &Taxonomy::default(), Module::ActionPlans, today);
        assert_eq!(rows[0].title.as_deref(), Some("渠道拓展"));
        assert_eq!(rows[0].month, Some(7));
        assert_eq!(rows[0].status, Status::InProgress);
    }
}
