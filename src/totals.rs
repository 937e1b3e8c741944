use std::collections::BTreeMap;

use serde::Serialize;

use crate::grid::GridCell;
use crate::status::completion_percent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Amount {
    pub target: f64,
    pub current: f64,
}

impl Amount {
    fn add(&mut self, cell: &GridCell) {
        self.target += finite(cell.target);
        self.current += finite(cell.current);
    }

    pub fn completion(&self) -> f64 {
        completion_percent(self.current, self.target)
    }
}

fn finite(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub by_month: BTreeMap<u32, Amount>,
    pub by_department: BTreeMap<String, Amount>,
    pub grand: Amount,
}

impl Totals {
    pub fn compute(cells: &[GridCell]) -> Self {
        let mut totals = Totals::default();
        for cell in cells {
            totals.by_month.entry(cell.month).or_default().add(cell);
            totals
                .by_department
                .entry(cell.department.clone())
                .or_default()
                .add(cell);
            totals.grand.add(cell);
        }
        totals
    }

    pub fn month(&self, month: u32) -> Amount {
        self.by_month.get(&month).copied().unwrap_or_default()
    }

    pub fn department(&self, department: &str) -> Amount {
        self.by_department.get(department).copied().unwrap_or_default()
    }
}
