//! `camtrack-import`: load legacy spreadsheets into the Camtrack database.
//!
//! Usage:
//!   camtrack-import file <kind> <workbook> [--sheet NAME] [--dry-run]
//!   camtrack-import folder <dir> [--dry-run]
//!
//! `folder` picks workbooks by file name and imports them in dependency order:
//! locations, switches, NVR/DVR, UPS, cameras, then failures.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use std::path::{Path, PathBuf};

use camtrack_server::{
    config::AppConfig,
    logging,
    models::import_report::{ImportKind, ImportReport},
    repository::Repository,
    services::Services,
};

/// Import order; later kinds reference earlier ones
const FOLDER_ORDER: [ImportKind; 6] = [
    ImportKind::Locations,
    ImportKind::Switches,
    ImportKind::Nvrs,
    ImportKind::Ups,
    ImportKind::Cameras,
    ImportKind::Failures,
];

#[derive(Parser, Debug)]
#[command(name = "camtrack-import", version, about = "Import Camtrack spreadsheets")]
struct Cli {
    /// Database URL (defaults to the server configuration)
    #[arg(long, env = "DATABASE_URL", global = true)]
    database_url: Option<String>,

    /// Clean and report rows without writing anything
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print the full JSON report instead of a summary
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import one workbook
    File {
        /// locations, cameras, switches, nvrs, ups or failures
        kind: ImportKind,
        path: PathBuf,
        /// Sheet name, defaults to the first sheet
        #[arg(long)]
        sheet: Option<String>,
    },
    /// Import every recognised workbook of a folder
    Folder { path: PathBuf },
}

/// Guess the sheet kind from a workbook file name
fn kind_for_file(path: &Path) -> Option<ImportKind> {
    let stem = path.file_stem()?.to_str()?;
    let name = camtrack_server::import::clean::fold(stem);
    let has = |words: &[&str]| words.iter().any(|w| name.contains(w));

    if has(&["ubicacion", "location"]) {
        Some(ImportKind::Locations)
    } else if has(&["puerto"]) {
        None
    } else if has(&["switch"]) {
        Some(ImportKind::Switches)
    } else if has(&["nvr", "dvr"]) {
        Some(ImportKind::Nvrs)
    } else if has(&["ups"]) {
        Some(ImportKind::Ups)
    } else if has(&["camara", "camera"]) {
        Some(ImportKind::Cameras)
    } else if has(&["falla", "failure"]) {
        Some(ImportKind::Failures)
    } else {
        None
    }
}

/// Workbooks of a folder grouped in import order
fn plan_folder(dir: &Path) -> anyhow::Result<Vec<(ImportKind, PathBuf)>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir).with_context(|| format!("Cannot read {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file()
            || camtrack_server::services::import::workbook_extension(&path.to_string_lossy())
                .is_err()
        {
            continue;
        }
        match kind_for_file(&path) {
            Some(kind) => found.push((kind, path)),
            None => tracing::warn!(file = %path.display(), "Skipping unrecognised workbook"),
        }
    }
    found.sort_by_key(|(kind, path)| {
        (
            FOLDER_ORDER.iter().position(|k| k == kind).unwrap_or(usize::MAX),
            path.clone(),
        )
    });
    Ok(found)
}

fn print_report(report: &ImportReport, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!(
        "{} {}: {} rows read, {} created, {} updated, {} skipped{}",
        report.kind,
        report.file_name.as_deref().unwrap_or("-"),
        report.rows_read,
        report.created,
        report.updated,
        report.skipped,
        if report.dry_run { " (dry run)" } else { "" }
    );
    if !report.unmapped_columns.is_empty() {
        println!("  unmapped columns: {}", report.unmapped_columns.join(", "));
    }
    for warning in &report.warnings {
        match &warning.column {
            Some(column) => println!("  row {} [{}]: {}", warning.row, column, warning.message),
            None => println!("  row {}: {}", warning.row, warning.message),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(url) = cli.database_url.clone() {
        config.database.url = url;
    }
    let _log_guard = logging::init_logging(&config.logging);

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let services = Services::new(Repository::new(pool), &config);

    let jobs = match cli.command {
        Command::File { kind, path, sheet } => vec![(kind, path, sheet)],
        Command::Folder { path } => plan_folder(&path)?
            .into_iter()
            .map(|(kind, path)| (kind, path, None))
            .collect(),
    };
    if jobs.is_empty() {
        anyhow::bail!("No workbook to import");
    }

    let mut failed = 0;
    for (kind, path, sheet) in jobs {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        tracing::info!(kind = %kind, file = %path.display(), "Importing workbook");
        match services
            .import
            .import_file(kind, path.clone(), sheet, file_name, cli.dry_run, None)
            .await
        {
            Ok(report) => print_report(&report, cli.json)?,
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", kind, path.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} workbook(s) could not be imported", failed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_file() {
        let kind = |name: &str| kind_for_file(Path::new(name));
        assert_eq!(kind("planillas/Ubicaciones.xlsx"), Some(ImportKind::Locations));
        assert_eq!(kind("Listadecámaras_modificada.xlsx"), Some(ImportKind::Cameras));
        assert_eq!(kind("NVR_DVR.xlsx"), Some(ImportKind::Nvrs));
        assert_eq!(kind("Fallas_Actualizada.xlsx"), Some(ImportKind::Failures));
        assert_eq!(kind("Switches.xlsx"), Some(ImportKind::Switches));
        assert_eq!(kind("UPS.xlsx"), Some(ImportKind::Ups));
        assert_eq!(kind("Puertos_Switch.xlsx"), None);
        assert_eq!(kind("Mantenimientos.xlsx"), None);
    }

    #[test]
    fn test_cli_parses_file_command() {
        let cli = Cli::try_parse_from([
            "camtrack-import",
            "file",
            "cameras",
            "camaras.xlsx",
            "--sheet",
            "Hoja1",
            "--dry-run",
        ])
        .unwrap();
        assert!(cli.dry_run);
        match cli.command {
            Command::File { kind, sheet, .. } => {
                assert_eq!(kind, ImportKind::Cameras);
                assert_eq!(sheet.as_deref(), Some("Hoja1"));
            }
            Command::Folder { .. } => panic!("expected file command"),
        }
    }
}
