use std::collections::HashMap;

use crate::dates::{month_of_date, month_of_text, month_token};
use crate::departments::DepartmentResolver;
use crate::models::{Module, Record};
use crate::source::Snapshot;

/// Composite grid coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub month: u32,
    pub department: String,
}

impl CellKey {
    pub fn new(month: u32, department: impl Into<String>) -> Self {
        Self {
            month,
            department: department.into(),
        }
    }
}

fn month_field(record: &Record) -> Option<u32> {
    let m = record.integer("month")?;
    (1..=12).contains(&m).then_some(m as u32)
}

/// Month a record belongs to, using the module's own projection rules.
pub fn project_month(module: Module, record: &Record) -> Option<u32> {
    match module {
        Module::DepartmentTargets | Module::MonthlyProgress | Module::AnnualPlans => {
            month_field(record)
        }
        Module::MajorEvents => month_field(record)
            .or_else(|| {
                ["date", "event_date"]
                    .iter()
                    .find_map(|f| record.text(f).and_then(month_of_text))
            })
            .or_else(|| record.text("planned_date").and_then(month_of_date))
            .or_else(|| record.text("actual_date").and_then(month_of_date)),
        Module::ActionPlans => record
            .text("when")
            .and_then(month_token)
            .or_else(|| {
                ["due_date", "deadline", "date"]
                    .iter()
                    .find_map(|f| record.text(f).and_then(month_of_date))
            }),
    }
}

/// Records of one collection grouped by grid coordinate.
#[derive(Debug)]
pub struct SourceIndex<'a> {
    entries: HashMap<CellKey, Vec<&'a Record>>,
    dropped: usize,
}

impl<'a> SourceIndex<'a> {
    /// Index `records` by (month, main department). Records without a month,
    /// without a department, or outside the main taxonomy are dropped.
    pub fn build(module: Module, records: &'a [Record], resolver: &DepartmentResolver) -> Self {
        let mut entries: HashMap<CellKey, Vec<&'a Record>> = HashMap::new();
        let mut dropped = 0usize;
        for record in records {
            let month = project_month(module, record);
            let department = resolver.resolve_main(record);
            match (month, department) {
                (Some(month), Some(department)) => {
                    entries
                        .entry(CellKey { month, department })
                        .or_default()
                        .push(record);
                }
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::debug!(module = module.key(), dropped, "records left out of the grid");
        }
        Self { entries, dropped }
    }

    pub fn get(&self, key: &CellKey) -> &[&'a Record] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of records that made it into the index.
    pub fn indexed(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// One index per planning module, all built from the same snapshot.
#[derive(Debug)]
pub struct Indices<'a> {
    pub targets: SourceIndex<'a>,
    pub progress: SourceIndex<'a>,
    pub events: SourceIndex<'a>,
    pub actions: SourceIndex<'a>,
    pub annual: SourceIndex<'a>,
}

impl<'a> Indices<'a> {
    pub fn build(snapshot: &'a Snapshot, resolver: &DepartmentResolver) -> Self {
        let index = |m: Module| SourceIndex::build(m, snapshot.records(m), resolver);
        Self {
            targets: index(Module::DepartmentTargets),
            progress: index(Module::MonthlyProgress),
            events: index(Module::MajorEvents),
            actions: index(Module::ActionPlans),
            annual: index(Module::AnnualPlans),
        }
    }

    pub fn get(&self, module: Module) -> &SourceIndex<'a> {
        match module {
            Module::DepartmentTargets => &self.targets,
            Module::MonthlyProgress => &self.progress,
            Module::MajorEvents => &self.events,
            Module::ActionPlans => &self.actions,
            Module::AnnualPlans => &self.annual,
        }
    }
}
