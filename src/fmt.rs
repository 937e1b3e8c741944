use crate::status::clamp_percent;

/// Format a value with thousands separators and up to two decimals: 1,234.5
pub fn amount(val: f64) -> String {
    let val = if val.is_finite() { val } else { 0.0 };
    let negative = val < 0.0;
    let fixed = format!("{:.2}", val.abs());
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    let dec = dec_part.trim_end_matches('0');
    let sign = if negative && (int_part != "0" || !dec.is_empty()) { "-" } else { "" };
    if dec.is_empty() {
        format!("{sign}{with_commas}")
    } else {
        format!("{sign}{with_commas}.{dec}")
    }
}

/// Whole-number percentage: 42%
pub fn percent(val: f64) -> String {
    let val = if val.is_finite() { val } else { 0.0 };
    format!("{}%", val.round() as i64)
}

/// Display stage of a progress value. Presentation only; lifecycle status
/// comes from the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    None,
    Initial,
    InProgress,
    NearCompletion,
    AboutToFinish,
    Completed,
}

impl ProgressStage {
    pub fn of(progress: f64) -> Self {
        let p = clamp_percent(progress);
        if p >= 100.0 {
            Self::Completed
        } else if p >= 75.0 {
            Self::AboutToFinish
        } else if p >= 50.0 {
            Self::NearCompletion
        } else if p >= 25.0 {
            Self::InProgress
        } else if p > 0.0 {
            Self::Initial
        } else {
            Self::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Initial => "initial",
            Self::InProgress => "in progress",
            Self::NearCompletion => "near completion",
            Self::AboutToFinish => "about to finish",
            Self::Completed => "completed",
        }
    }
}
