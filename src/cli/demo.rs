use std::path::Path;

use serde_json::{json, Value};

use crate::cli::current_year;
use crate::error::Result;
use crate::models::Module;
use crate::settings::resolve_data_dir;
use crate::source::DEPARTMENTS_FILE;

struct DemoDept {
    id: i64,
    name: &'static str,
    kind: &'static str,
    /// Monthly target; zero for units that never carry targets.
    monthly_target: f64,
}

const DEPARTMENTS: &[DemoDept] = &[
    DemoDept { id: 1, name: "销售部", kind: "business", monthly_target: 120.0 },
    DemoDept { id: 2, name: "生产部", kind: "business", monthly_target: 300.0 },
    DemoDept { id: 3, name: "市场部", kind: "business", monthly_target: 40.0 },
    DemoDept { id: 4, name: "研发中心", kind: "business", monthly_target: 15.0 },
    DemoDept { id: 5, name: "设计部", kind: "function", monthly_target: 10.0 },
    DemoDept { id: 6, name: "财务部", kind: "function", monthly_target: 0.0 },
    DemoDept { id: 7, name: "行政后勤组", kind: "function", monthly_target: 0.0 },
];

/// Months with reported actuals.
const REPORTED_MONTHS: u32 = 6;

fn departments() -> Value {
    let data: Vec<Value> = DEPARTMENTS
        .iter()
        .map(|d| json!({"id": d.id, "name": d.name, "type": d.kind}))
        .collect();
    json!({"success": true, "data": data})
}

/// Targets for the whole year. Odd departments reference the table by id.
fn department_targets(year: i32) -> Vec<Value> {
    let mut rows = Vec::new();
    for d in DEPARTMENTS.iter().filter(|d| d.monthly_target > 0.0) {
        for month in 1..=12u32 {
            let current = if month <= REPORTED_MONTHS {
                d.monthly_target * (0.6 + 0.1 * (month % 4) as f64)
            } else {
                0.0
            };
            let mut row = json!({
                "year": year,
                "month": month,
                "target_value": d.monthly_target,
                "current_value": current.round(),
            });
            if d.id % 2 == 1 {
                row["department_id"] = json!(d.id);
            } else {
                row["department"] = json!(d.name);
            }
            rows.push(row);
        }
    }
    rows
}

/// Monthly actuals for the first two departments, reported through the
/// progress module.
fn monthly_progress(year: i32) -> Vec<Value> {
    let mut rows = Vec::new();
    for d in &DEPARTMENTS[..2] {
        for month in 1..=REPORTED_MONTHS {
            let actual = d.monthly_target * (0.8 + 0.05 * month as f64);
            let status = if actual >= d.monthly_target { "completed" } else { "in_progress" };
            rows.push(json!({
                "year": year,
                "department_name": d.name,
                "month": month,
                "target_value": d.monthly_target,
                "actual_value": actual.round(),
                "status": status,
            }));
        }
    }
    rows
}

fn major_events(year: i32) -> Vec<Value> {
    vec![
        json!({"year": year, "title": "年度经营大会", "department": "市场部", "date": format!("{year}-01-20"), "status": "已完成"}),
        json!({"year": year, "title": "新品发布会", "department_id": 1, "planned_date": format!("{year}-04-15"), "progress": 100}),
        json!({"year": year, "title": "产线升级", "department": "生产部", "date": "6月中旬", "planned_date": format!("{year}-06-30"), "progress": 45}),
        json!({"year": year, "title": "海外展会", "department": "销售部", "planned_date": format!("{year}-09-10"), "status": "进行中"}),
        json!({"year": year, "title": "年终评审", "department": "研发中心", "planned_date": format!("{year}-12-20"), "status": "未开始"}),
        json!({"year": year, "title": "供应商大会", "department": "外部合作单位", "date": format!("{year}-05-08"), "status": "completed"}),
    ]
}

fn action_plans(year: i32) -> Vec<Value> {
    vec![
        json!({"year": year, "what": "渠道拓展", "department": "销售部", "when": "3月", "progress": 100}),
        json!({"year": year, "what": "成本优化", "department": "生产部", "when": "5月底", "due_date": format!("{year}-05-31"), "progress": 70}),
        json!({"year": year, "what": "品牌升级", "department": "市场部", "due_date": format!("{year}-08-15"), "status": "进行中"}),
        json!({"year": year, "what": "专利申报", "department": "研发中心", "when": "11月", "progress": 0}),
        json!({"year": year, "what": "制度梳理", "department": "财务部", "when": "2月", "status": "已完成"}),
    ]
}

fn annual_plans(year: i32) -> Vec<Value> {
    DEPARTMENTS
        .iter()
        .filter(|d| d.monthly_target > 0.0)
        .enumerate()
        .map(|(i, d)| {
            let rate = [100, 55, 30, 0, 80][i % 5];
            json!({
                "year": year,
                "plan_name": format!("{} {year} 年度计划", d.name),
                "department": d.name,
                "month": 12,
                "completion_rate": rate,
                "deadline": format!("{year}-12-31"),
            })
        })
        .collect()
}

/// Every demo file name with its contents.
pub fn generate(year: i32) -> Vec<(String, Value)> {
    let envelope = |data: Vec<Value>| json!({"success": true, "data": data});
    vec![
        (DEPARTMENTS_FILE.to_string(), departments()),
        (Module::DepartmentTargets.file_name(), envelope(department_targets(year))),
        (Module::MonthlyProgress.file_name(), Value::Array(monthly_progress(year))),
        (Module::MajorEvents.file_name(), envelope(major_events(year))),
        (Module::ActionPlans.file_name(), envelope(action_plans(year))),
        (Module::AnnualPlans.file_name(), envelope(annual_plans(year))),
    ]
}

pub fn write_demo(dir: &Path, year: i32) -> Result<usize> {
    std::fs::create_dir_all(dir)?;
    let files = generate(year);
    for (name, value) in &files {
        let json = serde_json::to_string_pretty(value)?;
        std::fs::write(dir.join(name), format!("{json}\n"))?;
    }
    Ok(files.len())
}

pub fn run(data_dir: Option<&str>, year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(current_year);
    let dir = resolve_data_dir(data_dir);
    let count = write_demo(&dir, year)?;
    tracing::info!(dir = %dir.display(), year, files = count, "demo data written");
    println!("Wrote {count} demo files for {year} to {}", dir.display());
    println!("Try `plangrid report grid --year {year}`.");
    Ok(())
}
