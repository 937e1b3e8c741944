use serde::Serialize;

use crate::indexer::{CellKey, Indices};
use crate::models::Record;
use crate::status::{completion_percent, classify_at, Status};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridCell {
    pub month: u32,
    pub department: String,
    pub target: f64,
    pub current: f64,
}

impl GridCell {
    pub fn completion(&self) -> f64 {
        completion_percent(self.current, self.target)
    }

    pub fn status(&self, deadline: Option<chrono::NaiveDate>, today: chrono::NaiveDate) -> Status {
        classify_at(self.completion(), deadline, today)
    }
}

/// Which collection supplied a cell's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellSource {
    MonthlyProgress,
    DepartmentTargets,
    Empty,
}

impl CellSource {
    pub fn key(&self) -> &'static str {
        match self {
            Self::MonthlyProgress => "monthly_progress",
            Self::DepartmentTargets => "department_targets",
            Self::Empty => "none",
        }
    }
}

fn sum(records: &[&Record], field: &str) -> f64 {
    records.iter().map(|r| r.number(field)).sum()
}

/// Values for one coordinate. Monthly progress wins over department targets
/// whenever it has at least one record for the cell.
pub fn cell_values(key: &CellKey, indices: &Indices<'_>) -> (f64, f64, CellSource) {
    let progress = indices.progress.get(key);
    if !progress.is_empty() {
        return (
            sum(progress, "target_value"),
            sum(progress, "actual_value"),
            CellSource::MonthlyProgress,
        );
    }
    let targets = indices.targets.get(key);
    if !targets.is_empty() {
        return (
            sum(targets, "target_value"),
            sum(targets, "current_value"),
            CellSource::DepartmentTargets,
        );
    }
    (0.0, 0.0, CellSource::Empty)
}

/// Dense grid over `months × departments`, months outermost. Every pair gets a
/// cell, zero-valued when neither source has records for it.
pub fn build_grid(months: &[u32], departments: &[String], indices: &Indices<'_>) -> Vec<GridCell> {
    let mut cells = Vec::with_capacity(months.len() * departments.len());
    for &month in months {
        for department in departments {
            let key = CellKey::new(month, department.as_str());
            let (target, current, _) = cell_values(&key, indices);
            cells.push(GridCell {
                month,
                department: key.department,
                target,
                current,
            });
        }
    }
    tracing::debug!(
        months = months.len(),
        departments = departments.len(),
        cells = cells.len(),
        "grid built"
    );
    cells
}

/// Months in scope: the selected month, or the whole year.
pub fn month_scope(selected: Option<u32>) -> Vec<u32> {
    match selected {
        Some(m) => vec![m],
        None => (1..=12).collect(),
    }
}

/// Narrow the department list to the selected department, if any.
pub fn department_scope(all: Vec<String>, selected: Option<&str>) -> Vec<String> {
    match selected.map(str::trim) {
        Some(name) => all.into_iter().filter(|d| d == name).collect(),
        None => all,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::departments::{DepartmentResolver, Taxonomy};
    use crate::source::Snapshot;
    use serde_json::json;

    fn snapshot() -> Snapshot {
        Snapshot {
            department_targets: vec![
                Record::from(json!({"department": "销售部", "month": 3, "target_value": 100, "current_value": 40})),
                Record::from(json!({"department": "销售部", "month": 4, "target_value": 80, "current_value": 20})),
                Record::from(json!({"department": "销售部", "month": 4, "target_value": "20", "current_value": "n/a"})),
            ],
            monthly_progress: vec![
                Record::from(json!({"department": "销售部", "month": 3, "target_value": 120, "actual_value": 120})),
            ],
            ..Default::default()
        }
    }

    fn departments() -> Vec<String> {
        vec!["生产部".to_string(), "销售部".to_string()]
    }

    #[test]
    fn test_progress_overrides_targets() {
        let snap = snapshot();
        let resolver = DepartmentResolver::new(Taxonomy::default(), &[]);
        let indices = Indices::build(&snap, &resolver);
        let grid = build_grid(&[3], &["销售部".to_string()], &indices);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].target, 120.0);
        assert_eq!(grid[0].current, 120.0);
        assert_eq!(grid[0].completion(), 100.0);
        let today = chrono::NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(grid[0].status(None, today), Status::Completed);
        let (_, _, source) = cell_values(&CellKey::new(3, "销售部"), &indices);
        assert_eq!(source, CellSource::MonthlyProgress);
    }

    #[test]
    fn test_targets_fallback_sums_records() {
        let snap = snapshot();
        let resolver = DepartmentResolver::new(Taxonomy::default(), &[]);
        let indices = Indices::build(&snap, &resolver);
        let (target, current, source) = cell_values(&CellKey::new(4, "销售部"), &indices);
        assert_eq!(source, CellSource::DepartmentTargets);
        assert_eq!(target, 100.0);
        assert_eq!(current, 20.0);
    }

    #[test]
    fn test_grid_is_dense() {
        let snap = snapshot();
        let resolver = DepartmentResolver::new(Taxonomy::default(), &[]);
        let indices = Indices::build(&snap, &resolver);
        let months = month_scope(None);
        let grid = build_grid(&months, &departments(), &indices);
        assert_eq!(grid.len(), months.len() * departments().len());
        let empty = grid
            .iter()
            .find(|c| c.month == 1 && c.department == "生产部")
            .unwrap();
        assert_eq!((empty.target, empty.current), (0.0, 0.0));
        assert_eq!(empty.completion(), 0.0);
    }

    #[test]
    fn test_grid_order_is_month_major() {
        let snap = Snapshot::default();
        let resolver = DepartmentResolver::new(Taxonomy::default(), &[]);
        let indices = Indices::build(&snap, &resolver);
        let grid = build_grid(&[1, 2], &departments(), &indices);
        let order: Vec<(u32, &str)> = grid
            .iter()
            .map(|c| (c.month, c.department.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(1, "生产部"), (1, "销售部"), (2, "生产部"), (2, "销售部")]
        );
    }

    #[test]
    fn test_scopes() {
        assert_eq!(month_scope(Some(5)), vec![5]);
        assert_eq!(month_scope(None).len(), 12);
        assert_eq!(department_scope(departments(), Some(" 销售部 ")), vec!["销售部"]);
        assert!(department_scope(departments(), Some("市场部")).is_empty());
        assert_eq!(department_scope(departments(), None).len(), 2);
    }
}
