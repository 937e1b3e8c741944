use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{PlanError, Result};

/// A loosely-typed planning record as delivered by the data source.
///
/// Field names and value types vary between collections, so accessors are
/// forgiving: blank strings read as absent and non-numeric values read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    /// Trimmed string value, `None` when missing, null or blank.
    pub fn text(&self, field: &str) -> Option<&str> {
        match self.0.get(field)? {
            Value::String(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s)
                }
            }
            _ => None,
        }
    }

    /// String or number rendered as a lookup key (used for foreign ids).
    pub fn key(&self, field: &str) -> Option<String> {
        self.0.get(field).and_then(value_key)
    }

    /// Numeric value if the field holds a finite number or a numeric string.
    pub fn opt_number(&self, field: &str) -> Option<f64> {
        match self.0.get(field)? {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
            Value::String(s) => parse_number(s),
            _ => None,
        }
    }

    /// Numeric value with missing, null and malformed values read as zero.
    pub fn number(&self, field: &str) -> f64 {
        self.opt_number(field).unwrap_or(0.0)
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        let v = self.opt_number(field)?;
        if v.fract() == 0.0 {
            Some(v as i64)
        } else {
            None
        }
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Record(map),
            _ => Record::default(),
        }
    }
}

/// Lookup key for an id value. Integral numbers render without a fraction so
/// `1` and `1.0` name the same department.
pub fn value_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(
            n.as_f64()
                .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < 9.0e15)
                .map(|v| (v as i64).to_string())
                .unwrap_or_else(|| n.to_string()),
        ),
        _ => None,
    }
}

/// Parse a number out of user-entered text: tolerates thousands separators,
/// a trailing percent sign and surrounding whitespace.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "");
    let s = s.trim().trim_end_matches('%').trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Department {
    pub fn id_key(&self) -> Option<String> {
        value_key(&self.id)
    }
}

/// Envelope returned by every collaborator fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult<T> {
    pub success: bool,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> FetchResult<T> {
    pub fn ok(data: Vec<T>) -> Self {
        Self { success: true, data }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            data: Vec::new(),
        }
    }

    /// Failed fetches contribute nothing to the current computation.
    pub fn into_data(self) -> Vec<T> {
        if self.success {
            self.data
        } else {
            Vec::new()
        }
    }
}

// ---------------------------------------------------------------------------
// Planning modules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    DepartmentTargets,
    MonthlyProgress,
    MajorEvents,
    ActionPlans,
    AnnualPlans,
}

impl Module {
    pub const ALL: [Module; 5] = [
        Module::DepartmentTargets,
        Module::MonthlyProgress,
        Module::MajorEvents,
        Module::ActionPlans,
        Module::AnnualPlans,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::DepartmentTargets => "department_targets",
            Self::MonthlyProgress => "monthly_progress",
            Self::MajorEvents => "major_events",
            Self::ActionPlans => "action_plans",
            Self::AnnualPlans => "annual_plans",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::DepartmentTargets => "Department Targets",
            Self::MonthlyProgress => "Monthly Progress",
            Self::MajorEvents => "Major Events",
            Self::ActionPlans => "Action Plans (5W2H)",
            Self::AnnualPlans => "Annual Plans",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.key())
    }

    pub fn from_key(key: &str) -> Result<Self> {
        let normalized = key.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.key() == normalized || m.key().trim_end_matches('s') == normalized)
            .or(match normalized.as_str() {
                "targets" => Some(Self::DepartmentTargets),
                "progress" => Some(Self::MonthlyProgress),
                "events" => Some(Self::MajorEvents),
                "actions" | "5w2h" => Some(Self::ActionPlans),
                "plans" => Some(Self::AnnualPlans),
                _ => None,
            })
            .ok_or_else(|| PlanError::UnknownModule(key.to_string()))
    }
}
