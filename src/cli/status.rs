use crate::cli::current_year;
use crate::departments::Taxonomy;
use crate::error::Result;
use crate::indexer::Indices;
use crate::models::{Department, Module};
use crate::pipeline::resolver_for;
use crate::settings::{load_settings, resolve_data_dir, settings_path};
use crate::source::{read_payload, JsonDirSource, Snapshot, DEPARTMENTS_FILE};

fn describe<T: serde::de::DeserializeOwned>(path: &std::path::Path) -> String {
    if !path.exists() {
        return "missing".to_string();
    }
    match read_payload::<T>(path) {
        Ok(result) if result.success => format!("{} records", result.data.len()),
        Ok(_) => "marked unsuccessful".to_string(),
        Err(e) => format!("unreadable ({e})"),
    }
}

pub fn run(data_dir: Option<&str>, year: Option<i32>) -> Result<()> {
    let settings = load_settings();
    let data_dir = resolve_data_dir(data_dir);
    let year = year.unwrap_or_else(current_year);

    println!("Settings:    {}", settings_path().display());
    println!("Data dir:    {}", data_dir.display());
    println!(
        "Dept type:   {}",
        settings.department_type.as_deref().unwrap_or("(all)")
    );
    println!(
        "Taxonomy:    {} excluded names, {} keywords",
        settings.taxonomy.excluded_names.len(),
        settings.taxonomy.excluded_keywords.len()
    );

    if !data_dir.exists() {
        println!();
        println!("Data directory not found. Run `plangrid init` or `plangrid demo` to set up.");
        return Ok(());
    }

    let source = JsonDirSource::new(&data_dir);
    println!();
    for module in Module::ALL {
        println!(
            "{:<20} {}",
            module.file_name(),
            describe::<serde_json::Value>(&source.path_for(module))
        );
    }
    println!(
        "{:<20} {}",
        DEPARTMENTS_FILE,
        describe::<Department>(&data_dir.join(DEPARTMENTS_FILE))
    );

    let snapshot = Snapshot::fetch(&source, year, settings.department_type.as_deref());
    let in_year: usize = snapshot.collections().iter().map(|c| c.len()).sum();
    println!();
    println!("Records in {year}: {in_year}");

    let taxonomy = Taxonomy::new(&settings.taxonomy);
    let resolver = resolver_for(&snapshot, &taxonomy);
    let indices = Indices::build(&snapshot, &resolver);
    for module in Module::ALL {
        let index = indices.get(module);
        println!(
            "  {:<20} {} on the grid, {} without month or main department",
            module.name(),
            index.indexed(),
            index.dropped()
        );
    }
    Ok(())
}
