use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{current_year, Context};
use crate::error::Result;
use crate::pipeline::resolver_for;

pub fn run(data_dir: Option<&str>, year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(current_year);
    let ctx = Context::load(data_dir, year);
    let resolver = resolver_for(&ctx.snapshot, &ctx.taxonomy);
    let all = resolver.classify_all(&ctx.snapshot.collections());

    if all.is_empty() {
        println!("No departments found in {}.", ctx.data_dir.display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Department", "Reported", "Excluded by"]);
    let mut main = 0usize;
    for (name, exclusion) in &all {
        let (reported, why) = match exclusion {
            None => {
                main += 1;
                ("yes".green(), String::new())
            }
            Some(e) => ("no".dimmed(), e.to_string()),
        };
        table.add_row(vec![Cell::new(name), Cell::new(reported), Cell::new(why)]);
    }
    println!("Departments ({main} of {} reported)\n{table}", all.len());
    Ok(())
}
