// Entry point and interactive menu.
//
// - Option [1] loads the CSV and auto-detects the header/data window.
// - Option [2] adjusts that window (1-based row numbers, like a spreadsheet).
// - Option [3] builds the chart, statistics and agent prompt and writes them
//   next to the configured output directory.
use chrono::Utc;
use indicator_report::config::Settings;
use indicator_report::grid::DataCleaner;
use indicator_report::{loader, output, reports, util};
use std::io::{self, Write};
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

struct AppState {
    settings: Settings,
    cleaner: Option<DataCleaner>,
}

fn prompt_line(label: &str) -> String {
    print!("{}", label);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_choice() -> String {
    prompt_line("Enter choice: ")
}

/// Ask whether to go back to the menu after generating reports.
fn prompt_back_to_menu() -> bool {
    loop {
        match prompt_line("Back to menu (Y/N): ").to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

fn display_row(row: Option<usize>) -> String {
    row.map(|r| (r + 1).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn print_range(cleaner: &DataCleaner) {
    let cfg = cleaner.config();
    println!(
        "Header row: {} | Data rows: {} to {} | Transpose: {}",
        display_row(cfg.header_row),
        display_row(cfg.data_start_row),
        display_row(cfg.data_end_row),
        if cfg.transpose { "yes" } else { "no" }
    );
}

fn handle_load(state: &mut AppState) {
    let path = state.settings.input_path.clone();
    match loader::load_grid(&path) {
        Ok((grid, report)) => {
            println!(
                "Loaded {} rows x {} columns ({} blank rows) from {}",
                util::format_count(report.total_rows),
                util::format_count(report.max_cols),
                util::format_count(report.blank_rows),
                path.display()
            );
            let mut cleaner = DataCleaner::detect(grid);
            cleaner.update_config(|c| c.imported_at = Some(Utc::now()));
            if !cleaner.config().is_ready() {
                println!("The file has no rows to select.");
            }
            print_range(&cleaner);
            if let Some(table) = cleaner.table() {
                output::preview_table(table, state.settings.preview_rows);
            }
            state.cleaner = Some(cleaner);
        }
        Err(e) => {
            error!(error = %e, "failed to load input");
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

fn read_row(label: &str) -> Option<usize> {
    let input = prompt_line(label);
    if input.is_empty() {
        return None;
    }
    match input.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n - 1),
        _ => {
            println!("Ignoring \"{}\": expected a row number.", input);
            None
        }
    }
}

fn handle_adjust(state: &mut AppState) {
    let Some(cleaner) = state.cleaner.as_mut() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    print_range(cleaner);
    println!("Press Enter to keep a value.");
    let total = cleaner.total_rows();

    let header = read_row("Header row: ");
    let start = read_row("First data row: ");
    let end = read_row("Last data row: ");
    let transpose = prompt_line("Transpose (Y/N): ").to_uppercase();

    cleaner.update_config(|cfg| {
        if let Some(h) = header {
            if !cfg.set_header_row(h, total) {
                warn!(row = h + 1, "header row out of range");
            }
        }
        if let Some(s) = start {
            if !cfg.set_data_start(s, total) {
                warn!(row = s + 1, "data start must be below the header row");
            }
        }
        if let Some(e) = end {
            if !cfg.set_data_end(e, total) {
                warn!(row = e + 1, "data end must not precede the data start");
            }
        }
        match transpose.as_str() {
            "Y" => cfg.transpose = true,
            "N" => cfg.transpose = false,
            _ => {}
        }
    });

    print_range(cleaner);
    match cleaner.table() {
        Some(table) => output::preview_table(table, state.settings.preview_rows),
        None => println!("The current selection does not produce a table.\n"),
    }
}

fn handle_generate_reports(state: &mut AppState) {
    let settings = state.settings.clone();
    let Some(cleaner) = state.cleaner.as_mut() else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };
    let Some(table) = cleaner.table() else {
        println!("Error: Header and data rows are not set. Use option [2].\n");
        return;
    };

    let title = settings
        .input_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string());
    let report = reports::generate(table, &settings, title.as_deref());
    let out = &settings.output_dir;

    if let Err(e) = output::write_table_csv(&out.join("table.csv"), table) {
        eprintln!("Write error: {}", e);
    }

    println!("Chart datasets ({:?})\n", settings.chart.kind);
    match &report.chart {
        Some(chart) if !chart.is_empty() => {
            output::preview_table_rows(&reports::dataset_rows(chart), settings.preview_rows);
            if let Err(e) = output::write_json(&out.join("chart.json"), chart) {
                eprintln!("Write error: {}", e);
            }
        }
        _ => println!("Llena la tabla para ver la gráfica.\n"),
    }

    println!("Key data points\n");
    output::preview_table_rows(&reports::key_point_rows(&report.key_points), 5);
    match &report.stats {
        Some(stats) => println!(
            "Max {} ({}) | Min {} ({}) | Avg {} | Trend: {} | Points: {}\n",
            util::format_plain(stats.max),
            stats.max_label,
            util::format_plain(stats.min),
            stats.min_label,
            util::format_total(stats.avg),
            stats.trend,
            stats.total_data_points
        ),
        None => println!("No numeric data for statistics.\n"),
    }
    if let Err(e) = output::write_json(&out.join("summary.json"), &report.summary()) {
        eprintln!("Write error: {}", e);
    }
    if let Err(e) = output::write_text(&out.join("prompt.txt"), &report.prompt) {
        eprintln!("Write error: {}", e);
    }
    println!("(Outputs saved to {})\n", out.display());
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let settings = match Settings::load() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load settings: {}", e);
            std::process::exit(1);
        }
    };
    let mut state = AppState {
        settings,
        cleaner: None,
    };

    loop {
        println!("Indicator report");
        println!("[1] Load the file");
        println!("[2] Adjust data range");
        println!("[3] Generate reports");
        println!("[4] Exit\n");
        match read_choice().as_str() {
            "1" => handle_load(&mut state),
            "2" => handle_adjust(&mut state),
            "3" => {
                println!();
                handle_generate_reports(&mut state);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "4" => break,
            _ => println!("Invalid choice. Please enter 1, 2, 3 or 4.\n"),
        }
    }
}
