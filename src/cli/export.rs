use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::{selection, today, Context};
use crate::error::Result;
use crate::pipeline::{compute, PlanningView};

#[derive(Serialize)]
struct GridRow<'a> {
    month: u32,
    department: &'a str,
    target: f64,
    current: f64,
    completion: f64,
    status: &'static str,
}

fn default_path(data_dir: &Path, name: &str, year: i32, ext: &str) -> PathBuf {
    data_dir.join("exports").join(format!("{name}-{year}.{ext}"))
}

fn prepare(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub fn write_grid_csv<W: std::io::Write>(
    view: &PlanningView,
    today: chrono::NaiveDate,
    out: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for cell in &view.grid {
        wtr.serialize(GridRow {
            month: cell.month,
            department: &cell.department,
            target: cell.target,
            current: cell.current,
            completion: (cell.completion() * 100.0).round() / 100.0,
            status: view.cell_status(cell, today).key(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn grid(
    data_dir: Option<&str>,
    year: Option<i32>,
    month: Option<String>,
    department: Option<String>,
    output: Option<String>,
) -> Result<String> {
    let selection = selection(year, &month, department)?;
    let ctx = Context::load(data_dir, selection.year);
    let view = compute(&ctx.snapshot, &ctx.taxonomy, &selection);

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&ctx.data_dir, "grid", selection.year, "csv"));
    prepare(&path)?;
    let file = std::fs::File::create(&path)?;
    write_grid_csv(&view, today(), file)?;

    let display = format!("{}", path.display());
    println!("Wrote {display} ({} cells)", view.grid.len());
    Ok(display)
}

pub fn view(
    data_dir: Option<&str>,
    year: Option<i32>,
    month: Option<String>,
    department: Option<String>,
    output: Option<String>,
) -> Result<String> {
    let selection = selection(year, &month, department)?;
    let ctx = Context::load(data_dir, selection.year);
    let view = compute(&ctx.snapshot, &ctx.taxonomy, &selection);

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&ctx.data_dir, "view", selection.year, "json"));
    prepare(&path)?;
    let json = serde_json::to_string_pretty(&view)?;
    std::fs::write(&path, format!("{json}\n"))?;

    let display = format!("{}", path.display());
    println!("Wrote {display}");
    Ok(display)
}
