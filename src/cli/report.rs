use colored::{ColoredString, Colorize};
use comfy_table::{Cell, Table};

use crate::cli::{current_year, parse_month_opt, selection, today, Context};
use crate::dates::month_end;
use crate::error::{PlanError, Result};
use crate::fmt::{amount, percent, ProgressStage};
use crate::models::Module;
use crate::pipeline::{compute, drill_down, list_records, Selection};
use crate::stats::{progress_of, CompletionStat};
use crate::status::{classify, completion_percent, Status};

pub(crate) fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Completed => status.key().green(),
        Status::InProgress => status.key().cyan(),
        Status::Delayed => status.key().red().bold(),
        Status::NotStarted => status.key().dimmed(),
    }
}

fn pair(current: f64, target: f64) -> String {
    if current == 0.0 && target == 0.0 {
        "—".to_string()
    } else {
        format!("{} / {}", amount(current), amount(target))
    }
}

pub fn grid(
    data_dir: Option<&str>,
    year: Option<i32>,
    month: Option<String>,
    department: Option<String>,
) -> Result<()> {
    let selection = selection(year, &month, department)?;
    let ctx = Context::load(data_dir, selection.year);
    let view = compute(&ctx.snapshot, &ctx.taxonomy, &selection);

    if view.departments.is_empty() {
        println!("No departments found for {}.", selection.year);
        return Ok(());
    }

    let today = today();
    let mut header = vec!["Department".to_string()];
    header.extend(view.months.iter().map(|m| format!("{m}月")));
    header.extend(["Total".to_string(), "Rate".to_string(), "Status".to_string()]);

    let mut table = Table::new();
    table.set_header(header);
    for department in &view.departments {
        let mut row = vec![Cell::new(department)];
        for &month in &view.months {
            let text = match view.cell(month, department) {
                Some(cell) => {
                    let s = pair(cell.current, cell.target);
                    if view.cell_status(cell, today) == Status::Delayed {
                        s.red().to_string()
                    } else {
                        s
                    }
                }
                None => "—".to_string(),
            };
            row.push(Cell::new(text));
        }
        let total = view.totals.department(department);
        row.push(Cell::new(pair(total.current, total.target)));
        row.push(Cell::new(percent(total.completion())));
        row.push(Cell::new(status_label(view.department_status(department, today))));
        table.add_row(row);
    }

    let mut total_row = vec![Cell::new("Total".bold())];
    for &month in &view.months {
        let t = view.totals.month(month);
        total_row.push(Cell::new(pair(t.current, t.target)));
    }
    let grand = view.totals.grand;
    total_row.push(Cell::new(pair(grand.current, grand.target).bold()));
    total_row.push(Cell::new(percent(grand.completion()).bold()));
    total_row.push(Cell::new(""));
    table.add_row(total_row);

    println!("Planning Grid {} (current / target)\n{table}", view.year);
    Ok(())
}

fn stat_row(name: &str, stat: &CompletionStat) -> Vec<Cell> {
    vec![
        Cell::new(name),
        Cell::new(stat.total),
        Cell::new(stat.completed),
        Cell::new(stat.in_progress),
        Cell::new(stat.not_started()),
        Cell::new(format!("{}%", stat.rate)),
    ]
}

pub fn stats(data_dir: Option<&str>, year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(current_year);
    let ctx = Context::load(data_dir, year);
    let view = compute(&ctx.snapshot, &ctx.taxonomy, &Selection::year(year));

    let mut table = Table::new();
    table.set_header(vec!["Module", "Total", "Completed", "In Progress", "Not Started", "Rate"]);
    for module in Module::ALL {
        table.add_row(stat_row(module.name(), &view.stats.get(module)));
    }
    let overall = &view.stats.overall;
    table.add_row(vec![
        Cell::new("Overall".bold()),
        Cell::new(overall.total),
        Cell::new(overall.completed),
        Cell::new(overall.in_progress),
        Cell::new(overall.not_started()),
        Cell::new(format!("{}%", overall.rate).bold()),
    ]);
    println!("Completion {year}\n{table}");
    Ok(())
}

pub fn cell(
    data_dir: Option<&str>,
    year: Option<i32>,
    month: String,
    department: String,
) -> Result<()> {
    let (month_year, m) = parse_month_opt(&Some(month))?;
    let m = m.ok_or_else(|| PlanError::Other("--month is required".to_string()))?;
    let year = year.or(month_year).unwrap_or_else(current_year);
    let ctx = Context::load(data_dir, year);
    let detail = drill_down(&ctx.snapshot, &ctx.taxonomy, m, &department);

    println!("{} {}月 ({})", detail.department.bold(), m, year);
    println!("Target:   {}", amount(detail.target));
    println!("Current:  {}", amount(detail.current));
    let rate = completion_percent(detail.current, detail.target);
    let deadline = month_end(year, m).map(|d| d.to_string());
    println!("Rate:     {}", percent(rate));
    println!("Status:   {}", status_label(classify(rate, deadline.as_deref())));
    println!("Source:   {}", detail.source.key());

    if detail.records.is_empty() {
        println!("\nNo records for this cell.");
        return Ok(());
    }
    for (module, records) in &detail.records {
        let mut table = Table::new();
        table.set_header(vec!["Record", "Target", "Current/Actual", "Progress", "Status"]);
        for record in records {
            let current = record
                .opt_number("actual_value")
                .unwrap_or_else(|| record.number("current_value"));
            table.add_row(vec![
                Cell::new(serde_json::to_string(record)?),
                Cell::new(amount(record.number("target_value"))),
                Cell::new(amount(current)),
                Cell::new(percent(progress_of(*module, record))),
                Cell::new(record.text("status").unwrap_or("")),
            ]);
        }
        println!("\n{}\n{table}", module.name());
    }
    Ok(())
}

pub fn records(data_dir: Option<&str>, module: &str, year: Option<i32>) -> Result<()> {
    let module = Module::from_key(module)?;
    let year = year.unwrap_or_else(current_year);
    let ctx = Context::load(data_dir, year);
    let rows = list_records(&ctx.snapshot, &ctx.taxonomy, module, today());

    if rows.is_empty() {
        println!("No {} records for {year}.", module.name());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "#", "Title", "Department", "Month", "Progress", "Stage", "Given", "Status",
    ]);
    for (i, row) in rows.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(row.title.as_deref().unwrap_or("")),
            Cell::new(row.department.as_deref().unwrap_or("—")),
            Cell::new(row.month.map(|m| format!("{m}月")).unwrap_or_else(|| "—".to_string())),
            Cell::new(percent(row.progress)),
            Cell::new(ProgressStage::of(row.progress).label()),
            Cell::new(row.hint.map(|h| h.key()).unwrap_or("")),
            Cell::new(status_label(row.status)),
        ]);
    }
    println!("{} {year}\n{table}", module.name());
    Ok(())
}
