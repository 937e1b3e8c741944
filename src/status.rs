use chrono::NaiveDate;
use serde::Serialize;

use crate::dates::parse_date;
use crate::models::{Module, Record};

/// Lifecycle state shared by grid rows and per-record listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    NotStarted,
    InProgress,
    Completed,
    Delayed,
}

impl Status {
    pub fn key(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Delayed => "delayed",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Clamp to `[0, 100]`; NaN reads as 0.
pub fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// `current / target` as a percentage, 0 when the target is zero or unusable.
pub fn completion_percent(current: f64, target: f64) -> f64 {
    if !target.is_finite() || !current.is_finite() || target <= 0.0 {
        return 0.0;
    }
    current / target * 100.0
}

/// Classify against an explicit `today`.
///
/// Completion is checked before lateness so work finished on or after its
/// deadline still reads as completed. Lateness only applies to work that has
/// started; untouched work stays `NotStarted` whatever its deadline.
pub fn classify_at(progress: f64, deadline: Option<NaiveDate>, today: NaiveDate) -> Status {
    let progress = clamp_percent(progress);
    if progress >= 100.0 {
        return Status::Completed;
    }
    if progress > 0.0 {
        if deadline.is_some_and(|d| d < today) {
            return Status::Delayed;
        }
        return Status::InProgress;
    }
    Status::NotStarted
}

/// Classify against the local date. Deadlines are compared as calendar dates, so
/// a deadline earlier today is not yet late. Deadlines that do not parse are ignored.
pub fn classify(progress: f64, deadline: Option<&str>) -> Status {
    let today = chrono::Local::now().date_naive();
    classify_at(progress, deadline.and_then(parse_date), today)
}

// ---------------------------------------------------------------------------
// Status vocabularies
// ---------------------------------------------------------------------------

/// A status hint after lookup in a module's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusHint {
    Completed,
    InProgress,
    NotStarted,
    Delayed,
}

impl StatusHint {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::InProgress => "in_progress",
            Self::NotStarted => "not_started",
            Self::Delayed => "delayed",
        }
    }
}

type Vocabulary = &'static [(&'static str, StatusHint)];

const ENGLISH: Vocabulary = &[
    ("completed", StatusHint::Completed),
    ("complete", StatusHint::Completed),
    ("done", StatusHint::Completed),
    ("finished", StatusHint::Completed),
    ("in_progress", StatusHint::InProgress),
    ("in progress", StatusHint::InProgress),
    ("in-progress", StatusHint::InProgress),
    ("ongoing", StatusHint::InProgress),
    ("processing", StatusHint::InProgress),
    ("not_started", StatusHint::NotStarted),
    ("not started", StatusHint::NotStarted),
    ("pending", StatusHint::NotStarted),
    ("planned", StatusHint::NotStarted),
    ("delayed", StatusHint::Delayed),
    ("overdue", StatusHint::Delayed),
];

const CHINESE: Vocabulary = &[
    ("已完成", StatusHint::Completed),
    ("完成", StatusHint::Completed),
    ("已结束", StatusHint::Completed),
    ("进行中", StatusHint::InProgress),
    ("执行中", StatusHint::InProgress),
    ("推进中", StatusHint::InProgress),
    ("实施中", StatusHint::InProgress),
    ("未开始", StatusHint::NotStarted),
    ("待开始", StatusHint::NotStarted),
    ("计划中", StatusHint::NotStarted),
    ("已延期", StatusHint::Delayed),
    ("延期", StatusHint::Delayed),
    ("逾期", StatusHint::Delayed),
];

/// Accepted status words per module.
pub fn vocabularies(module: Module) -> &'static [Vocabulary] {
    match module {
        Module::DepartmentTargets
        | Module::MonthlyProgress
        | Module::MajorEvents
        | Module::ActionPlans
        | Module::AnnualPlans => &[ENGLISH, CHINESE],
    }
}

/// Look up a raw status in the module's vocabulary (case-insensitive, trimmed).
pub fn normalize_status(module: Module, raw: &str) -> Option<StatusHint> {
    let token = raw.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }
    vocabularies(module)
        .iter()
        .flat_map(|v| v.iter())
        .find(|(word, _)| *word == token)
        .map(|(_, hint)| *hint)
}

pub fn record_status(module: Module, record: &Record) -> Option<StatusHint> {
    record.text("status").and_then(|s| normalize_status(module, s))
}

/// Deadline field for modules whose records carry one.
pub fn record_deadline(module: Module, record: &Record) -> Option<NaiveDate> {
    let fields: &[&str] = match module {
        Module::MajorEvents => &["planned_date"],
        Module::ActionPlans => &["due_date", "deadline"],
        Module::AnnualPlans => &["deadline", "end_date"],
        Module::DepartmentTargets | Module::MonthlyProgress => &[],
    };
    fields
        .iter()
        .find_map(|f| record.text(f).and_then(parse_date))
}
