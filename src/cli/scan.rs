//! Subcomando `scan`.

use console::style;

use super::ScanArgs;
use super::prompt::{Prompter, select_files};
use super::ui;
use crate::engine::MetadataEngine;
use crate::error::Result;
use crate::report::{ExportFormat, build_report, export_report, report_to_json};

pub fn run(args: &ScanArgs, verbose: bool, prompter: &mut dyn Prompter) -> Result<()> {
    let engine = MetadataEngine::new(args.categories.to_config(args.backup));
    let summary = engine.scan_path(&args.input)?;
    let report = build_report(&summary);

    if args.json {
        println!("{}", report_to_json(&report)?);
    } else {
        ui::render_header("Análisis de metadata");
        ui::render_scan_summary(&report);
        ui::render_concerns(&report, None);
        ui::render_scan_files(&summary.results, verbose);
    }

    if let Some(path) = &args.report {
        export_report(&report, ExportFormat::from_path(path)?, path)?;
        if !args.json {
            println!(
                "{} {}",
                style("Reporte exportado en").dim(),
                style(path.display()).cyan()
            );
        }
    }

    if !args.interactive || report.is_clean() {
        return Ok(());
    }

    let approved = select_files(prompter, &report.files_with_metadata)?;
    if approved.is_empty() {
        println!("{}", style("No se limpió ningún archivo.").dim());
        return Ok(());
    }

    let stripped = engine.strip_files(&approved);
    ui::render_header("Limpieza de archivos aprobados");
    ui::render_strip_files(&report, &stripped, verbose);
    Ok(())
}
