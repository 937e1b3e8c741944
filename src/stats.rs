use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Module, Record};
use crate::source::Snapshot;
use crate::status::{completion_percent, record_status, StatusHint};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionStat {
    pub total: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub rate: u32,
}

impl CompletionStat {
    pub fn from_counts(total: u32, completed: u32, in_progress: u32) -> Self {
        Self {
            total,
            completed,
            in_progress,
            rate: rate(completed, total),
        }
    }

    pub fn not_started(&self) -> u32 {
        self.total - self.completed - self.in_progress
    }
}

pub fn rate(completed: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

/// Progress percentage of one record, by module.
pub fn progress_of(module: Module, record: &Record) -> f64 {
    match module {
        Module::DepartmentTargets => {
            completion_percent(record.number("current_value"), record.number("target_value"))
        }
        Module::MonthlyProgress => record.opt_number("completion_rate").unwrap_or_else(|| {
            completion_percent(record.number("actual_value"), record.number("target_value"))
        }),
        Module::MajorEvents | Module::ActionPlans => record.number("progress"),
        Module::AnnualPlans => record.opt_number("completion_rate").unwrap_or_else(|| {
            completion_percent(record.number("current_value"), record.number("target_value"))
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Completed,
    InProgress,
    Neither,
}

fn bucket(module: Module, record: &Record) -> Bucket {
    match record_status(module, record) {
        Some(StatusHint::Completed) => Bucket::Completed,
        Some(StatusHint::InProgress) => Bucket::InProgress,
        Some(StatusHint::NotStarted | StatusHint::Delayed) => Bucket::Neither,
        None => {
            let progress = progress_of(module, record);
            if progress >= 100.0 {
                Bucket::Completed
            } else if progress > 0.0 {
                Bucket::InProgress
            } else {
                Bucket::Neither
            }
        }
    }
}

/// Count one module's records. An explicit recognized status decides; records
/// without one fall back to their numeric progress.
pub fn aggregate(module: Module, records: &[Record]) -> CompletionStat {
    let mut completed = 0u32;
    let mut in_progress = 0u32;
    for record in records {
        match bucket(module, record) {
            Bucket::Completed => completed += 1,
            Bucket::InProgress => in_progress += 1,
            Bucket::Neither => {}
        }
    }
    CompletionStat::from_counts(records.len() as u32, completed, in_progress)
}

/// Field-wise sum of module stats. The rate is recomputed from the summed
/// counts, never averaged across modules.
pub fn overall<'a>(stats: impl IntoIterator<Item = &'a CompletionStat>) -> CompletionStat {
    let (total, completed, in_progress) = stats.into_iter().fold((0, 0, 0), |acc, s| {
        (acc.0 + s.total, acc.1 + s.completed, acc.2 + s.in_progress)
    });
    CompletionStat::from_counts(total, completed, in_progress)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleStats {
    pub modules: BTreeMap<Module, CompletionStat>,
    pub overall: CompletionStat,
}

impl ModuleStats {
    pub fn compute(snapshot: &Snapshot) -> Self {
        let modules: BTreeMap<Module, CompletionStat> = Module::ALL
            .into_iter()
            .map(|m| (m, aggregate(m, snapshot.records(m))))
            .collect();
        let overall = overall(modules.values());
        Self { modules, overall }
    }

    pub fn get(&self, module: Module) -> CompletionStat {
        self.modules.get(&module).copied().unwrap_or_default()
    }
}
