// Entry point and interactive CLI flow.
//
// - Option [1] loads a PBL Startanalyse ZIP archive and prints diagnostics.
// - Option [2] writes the strategy overview, scenario comparison and
//   building-stock reports plus a JSON summary, optionally for one
//   municipality or district only.
use once_cell::sync::Lazy;
use pbl_startanalyse::area::{codes_within, AreaCode};
use pbl_startanalyse::util::{format_int, format_optional};
use pbl_startanalyse::{load_archive_file, output, reports, DatasetHandle, IngestConfig};
use std::io::{self, Write};
use std::path::Path;

const CONFIG_FILE: &str = "pbl_config.json";

// Loaded once; a second load replaces the whole dataset.
static DATASET: Lazy<DatasetHandle> = Lazy::new(DatasetHandle::new);

static CONFIG: Lazy<IngestConfig> = Lazy::new(|| {
    if !Path::new(CONFIG_FILE).exists() {
        return IngestConfig::default();
    }
    match IngestConfig::from_json_file(CONFIG_FILE) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Ignoring {}: {}", CONFIG_FILE, e);
            IngestConfig::default()
        }
    }
});

/// Print `prompt` and read one trimmed line from stdin.
fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the menu after generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        match read_line("Back to Report Selection (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn handle_load() {
    let path = read_line("Path to PBL archive (.zip): ");
    if path.is_empty() {
        println!("No path given.\n");
        return;
    }
    match load_archive_file(&path, &CONFIG) {
        Ok((dataset, report)) => {
            println!(
                "Processing archive... ({} totals rows, {} strategy rows, {} detail rows)",
                format_int(report.totals_rows),
                format_int(report.strategy_rows),
                format_int(report.detail_rows)
            );
            println!(
                "Loaded {} neighborhoods with {} scenario columns.",
                format_int(dataset.metadata.neighborhood_count),
                format_int(dataset.metadata.scenario_column_count)
            );
            let skipped = report.unreadable_rows + report.build.rows_without_code;
            if skipped > 0 {
                println!("Note: {} rows skipped (unreadable or without neighborhood code).", format_int(skipped));
            }
            if report.build.orphan_detail_rows > 0 {
                println!(
                    "Info: {} detail rows refer to unknown neighborhoods.",
                    format_int(report.build.orphan_detail_rows)
                );
            }
            println!();
            DATASET.replace(dataset);
        }
        Err(e) => {
            log::error!("load failed: {}", e);
            eprintln!("Failed to load archive: {}\n", e);
        }
    }
}

fn handle_generate_reports() {
    let Some(dataset) = DATASET.snapshot() else {
        println!("Error: No data loaded. Please load an archive first (option 1).\n");
        return;
    };

    let filter = read_line("Area code (GM/WK, empty for all): ");
    let codes: Vec<&str> = if filter.is_empty() {
        dataset.codes().collect()
    } else {
        match AreaCode::parse(&filter) {
            Some(area) => codes_within(&area, dataset.codes()),
            None => {
                println!("Unknown area code {}. Using all neighborhoods.", filter);
                dataset.codes().collect()
            }
        }
    };

    println!("Generating reports for {} neighborhoods...", format_int(codes.len()));
    println!("Outputs saved to individual files...\n");

    let r1 = reports::generate_strategy_overview(&dataset, &codes, &CONFIG);
    let file1 = "report1_strategy_overview.csv";
    if let Err(e) = output::write_csv(file1, &r1) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Strategy Overview");
    println!("(Strategie_1..4 against {})\n", CONFIG.baseline_column);
    output::preview_table_rows(&r1, 4);
    println!("(Full table exported to {})\n", file1);

    let r2 = reports::generate_scenario_comparison(&dataset, &codes, &CONFIG);
    let file2 = "report2_scenario_comparison.csv";
    if let Err(e) = output::write_csv(file2, &r2) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 2: Scenario Comparison");
    println!("(All scenario columns, display order)\n");
    output::preview_table_rows(&r2, 5);
    println!("(Full table exported to {})\n", file2);

    let r3 = reports::generate_building_stock(&dataset, &codes);
    let file3 = "report3_building_stock.csv";
    if let Err(e) = output::write_csv(file3, &r3) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 3: Non-residential Building Stock");
    println!("(Totals table, summed over selection)\n");
    output::preview_table_rows(&r3, 3);
    println!("(Full table exported to {})\n", file3);

    let summary = reports::generate_summary(&dataset, &codes);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total_dwellings\": {}, \"baseline_co2\": {}}}\n",
        format_optional(Some(summary.total_dwellings), 0),
        format_optional(summary.baseline_co2, 1)
    );
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    loop {
        println!("PBL Startanalyse:");
        println!("[1] Load archive");
        println!("[2] Generate Reports\n");
        match read_line("Enter choice: ").as_str() {
            "1" => handle_load(),
            "2" => {
                println!();
                handle_generate_reports();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}
