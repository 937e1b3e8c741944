use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, Result};

/// Department names that are never reported as business units, matched exactly.
const DEFAULT_EXCLUDED_NAMES: &[&str] = &[
    "设计部",
    "总经办",
    "总裁办",
    "董事会",
    "财务部",
    "人力资源部",
    "行政部",
    "审计部",
    "法务部",
    "信息中心",
    "采购部",
    "质检部",
];

/// Generic terms (company, external, functional, support, logistics, management)
/// that mark staff or external units wherever they appear in a name.
const DEFAULT_EXCLUDED_KEYWORDS: &[&str] = &["公司", "外部", "职能", "支持", "后勤", "管理"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    #[serde(default = "default_excluded_names")]
    pub excluded_names: Vec<String>,
    #[serde(default = "default_excluded_keywords")]
    pub excluded_keywords: Vec<String>,
}

fn default_excluded_names() -> Vec<String> {
    DEFAULT_EXCLUDED_NAMES.iter().map(|s| s.to_string()).collect()
}

fn default_excluded_keywords() -> Vec<String> {
    DEFAULT_EXCLUDED_KEYWORDS.iter().map(|s| s.to_string()).collect()
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            excluded_names: default_excluded_names(),
            excluded_keywords: default_excluded_keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    /// Passed to the department provider as its `type` filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_type: Option<String>,
    #[serde(default)]
    pub taxonomy: TaxonomyConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir().to_string_lossy().to_string(),
            department_type: None,
            taxonomy: TaxonomyConfig::default(),
        }
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("plangrid")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Documents")
        .join("plangrid")
}

pub fn load_settings() -> Settings {
    let path = settings_path();
    if path.exists() {
        let content = std::fs::read_to_string(&path).unwrap_or_default();
        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "unreadable settings, using defaults"
                );
                Settings::default()
            }
        }
    } else {
        Settings::default()
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    let dir = config_dir();
    std::fs::create_dir_all(&dir)?;
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| PlanError::Settings(e.to_string()))?;
    std::fs::write(settings_path(), format!("{json}\n"))?;
    Ok(())
}

/// Data directory from the command line when given, else from settings.
pub fn resolve_data_dir(override_dir: Option<&str>) -> PathBuf {
    match override_dir {
        Some(dir) => PathBuf::from(shellexpand_path(dir)),
        None => PathBuf::from(&load_settings().data_dir),
    }
}

pub fn shellexpand_path(path: &str) -> String {
    if path.starts_with('~') {
        if let Some(home) = dirs::home_dir() {
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    std::fs::canonicalize(path)
        .unwrap_or_else(|_| PathBuf::from(path))
        .to_string_lossy()
        .to_string()
}
