use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Env {
    home: TempDir,
    data: TempDir,
}

impl Env {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
            data: tempfile::tempdir().unwrap(),
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("plangrid").unwrap();
        cmd.env("HOME", self.home.path())
            .env_remove("RUST_LOG")
            .arg("--data-dir")
            .arg(self.data.path());
        cmd
    }

    fn with_demo(self) -> Self {
        self.cmd().args(["demo", "--year", "2025"]).assert().success();
        self
    }
}

#[test]
fn test_demo_writes_collections() {
    let env = Env::new();
    env.cmd()
        .args(["demo", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 6 demo files for 2025"));
    for name in [
        "departments.json",
        "department_targets.json",
        "monthly_progress.json",
        "major_events.json",
        "action_plans.json",
        "annual_plans.json",
    ] {
        assert!(env.data.path().join(name).exists(), "{name} missing");
    }
}

#[test]
fn test_report_grid_lists_main_departments_only() {
    let env = Env::new().with_demo();
    env.cmd()
        .args(["report", "grid", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Planning Grid 2025"))
        .stdout(predicate::str::contains("销售部"))
        .stdout(predicate::str::contains("研发中心"))
        .stdout(predicate::str::contains("设计部").not())
        .stdout(predicate::str::contains("财务部").not());
}

#[test]
fn test_report_grid_single_month() {
    let env = Env::new().with_demo();
    env.cmd()
        .args(["report", "grid", "--month", "2025-03", "--department", "生产部"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3月"))
        .stdout(predicate::str::contains("生产部"))
        .stdout(predicate::str::contains("4月").not());
}

#[test]
fn test_report_stats() {
    let env = Env::new().with_demo();
    env.cmd()
        .args(["report", "stats", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Completion 2025"))
        .stdout(predicate::str::contains("Major Events"))
        .stdout(predicate::str::contains("Overall"));
}

#[test]
fn test_report_records_accepts_aliases() {
    let env = Env::new().with_demo();
    env.cmd()
        .args(["report", "records", "events", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("新品发布会"));
    env.cmd()
        .args(["report", "records", "bogus", "--year", "2025"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_report_cell_drill_down() {
    let env = Env::new().with_demo();
    env.cmd()
        .args(["report", "cell", "--year", "2025", "--month", "2", "--department", "销售部"])
        .assert()
        .success()
        .stdout(predicate::str::contains("monthly_progress"));
}

#[test]
fn test_invalid_month_fails() {
    let env = Env::new().with_demo();
    env.cmd()
        .args(["report", "grid", "--month", "13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid month"));
}

#[test]
fn test_departments_shows_exclusions() {
    let env = Env::new().with_demo();
    env.cmd()
        .args(["departments", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("设计部"))
        .stdout(predicate::str::contains("行政后勤组"));
}

#[test]
fn test_export_grid_and_view() {
    let env = Env::new().with_demo();
    env.cmd()
        .args(["export", "grid", "--year", "2025"])
        .assert()
        .success();
    let csv_path = env.data.path().join("exports").join("grid-2025.csv");
    let text = std::fs::read_to_string(&csv_path).unwrap();
    assert!(text.starts_with("month,department,target,current,completion,status"));
    assert_eq!(text.lines().count(), 1 + 12 * 4);

    let out = env.data.path().join("view.json");
    env.cmd()
        .args(["export", "view", "--year", "2025", "--output"])
        .arg(&out)
        .assert()
        .success();
    let text = std::fs::read_to_string(&out).unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["year"], 2025);
    assert_eq!(json["stats"]["overall"]["total"], 88);
}

#[test]
fn test_missing_data_still_reports() {
    let env = Env::new();
    env.cmd()
        .args(["report", "stats", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Overall"));
    env.cmd()
        .args(["report", "grid", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No departments found"));
}

#[test]
fn test_init_and_status() {
    let env = Env::new();
    env.cmd().arg("init").assert().success();
    assert!(env.home.path().join(".config/plangrid/settings.json").exists());
    assert!(env.data.path().join("exports").is_dir());
    env.cmd()
        .args(["status", "--year", "2025"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Data dir:"));
}
