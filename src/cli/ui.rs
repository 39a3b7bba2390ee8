//! Renderizado en terminal de resúmenes, hallazgos y resultados.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Row, Table};
use console::style;
use std::collections::HashSet;
use std::path::Path;

use super::formatting::{describe_format, format_size, truncate_value};
use crate::hook::HookOutcome;
use crate::report::{
    DirectoryStripSummary, Report, ReportedConcern, ScanResult, Severity, StripResult,
};
use crate::walker::StripPlan;

const HEADER_WIDTH: usize = 74;
const LABEL_COLOR: Color = Color::Rgb {
    r: 160,
    g: 196,
    b: 255,
};

pub fn render_header(title: &str) {
    let border = "─".repeat(HEADER_WIDTH - 2);
    println!("\n{}", style(format!("┌{border}┐")).cyan());
    println!(
        "{}",
        style(format!(
            "│ {:^inner_width$} │",
            format!("▸ {title} ◂"),
            inner_width = HEADER_WIDTH - 4
        ))
        .cyan()
        .bold()
    );
    println!("{}\n", style(format!("└{border}┘")).cyan());
}

fn build_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(headers.iter().map(|text| header_cell(text)).collect::<Vec<_>>());
    table
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
        .add_attribute(Attribute::Underlined)
}

fn build_row(label: &str, value: &str, value_color: Color) -> Row {
    Row::from(vec![
        Cell::new(label).fg(LABEL_COLOR),
        Cell::new(value).fg(value_color),
    ])
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Blue,
    }
}

fn count_color(count: usize, alert: Color) -> Color {
    if count == 0 { Color::Green } else { alert }
}

pub fn render_scan_summary(report: &Report) {
    let counters = &report.summary;
    let mut table = build_table(&["Resumen", "Valor"]);
    table.add_row(build_row(
        "Archivos encontrados",
        &counters.total_files.to_string(),
        Color::White,
    ));
    table.add_row(build_row(
        "Archivos analizados",
        &counters.scanned_files.to_string(),
        Color::White,
    ));
    table.add_row(build_row(
        "Con metadata",
        &counters.files_with_metadata.to_string(),
        count_color(counters.files_with_metadata, Color::Yellow),
    ));
    for (severity, count) in [
        (Severity::High, counters.high_concerns),
        (Severity::Medium, counters.medium_concerns),
        (Severity::Low, counters.low_concerns),
    ] {
        table.add_row(build_row(
            &format!("Hallazgos de severidad {}", severity.label()),
            &count.to_string(),
            count_color(count, severity_color(severity)),
        ));
    }
    table.add_row(build_row(
        "Errores",
        &counters.errors.to_string(),
        count_color(counters.errors, Color::Red),
    ));
    println!("{table}");
}

/// Tabla de hallazgos por severidad. `status` anota cada fila tras una limpieza.
pub fn render_concerns(report: &Report, status: Option<&DirectoryStripSummary>) {
    if report.is_clean() {
        println!(
            "\n{}",
            style("✓ No se encontró metadata sensible.").green().bold()
        );
        return;
    }

    for severity in [Severity::High, Severity::Medium, Severity::Low] {
        let bucket = report.bucket(severity);
        if bucket.is_empty() {
            continue;
        }

        println!(
            "\n{}",
            style(format!("Severidad {} ({})", severity.label(), bucket.len())).bold()
        );
        let mut headers = vec!["Archivo", "Campo", "Valor", "Descripción"];
        if status.is_some() {
            headers.push("Estado");
        }
        let mut table = build_table(&headers);
        for reported in bucket {
            table.add_row(concern_row(reported, status));
        }
        println!("{table}");
    }
}

fn concern_row(reported: &ReportedConcern, status: Option<&DirectoryStripSummary>) -> Row {
    let color = severity_color(reported.concern.severity);
    let mut cells = vec![
        Cell::new(reported.file_path.display()).fg(LABEL_COLOR),
        Cell::new(&reported.concern.field).fg(color),
        Cell::new(truncate_value(&reported.concern.value)).fg(Color::White),
        Cell::new(&reported.concern.description).fg(Color::White),
    ];
    if let Some(summary) = status {
        cells.push(match summary.result_for(&reported.file_path) {
            Some(result) if result.success => Cell::new("✓ eliminado").fg(Color::Green),
            Some(_) => Cell::new("✗ error").fg(Color::Red),
            None => Cell::new("— sin procesar").fg(Color::DarkGrey),
        });
    }
    Row::from(cells)
}

/// Estado final de cada archivo analizado.
pub fn render_scan_files(results: &[ScanResult], verbose: bool) {
    if results.is_empty() {
        return;
    }
    let mut headers = vec!["Archivo", "Tipo", "Estado"];
    if verbose {
        headers.push("Formato");
    }
    let mut table = build_table(&headers);

    for result in results {
        let state = match (&result.error, result.has_metadata) {
            (Some(error), _) => Cell::new(format!("✗ error: {error}")).fg(Color::Red),
            (None, true) => Cell::new(format!("! {} hallazgos", result.concerns.len())).fg(Color::Yellow),
            (None, false) => Cell::new("✓ limpio").fg(Color::Green),
        };
        let mut cells = vec![
            Cell::new(result.file_path.display()).fg(LABEL_COLOR),
            Cell::new(result.file_category.label()).fg(Color::White),
            state,
        ];
        if verbose {
            let format = result
                .format_metadata
                .as_ref()
                .map(describe_format)
                .unwrap_or_else(|| "No disponible".to_string());
            cells.push(Cell::new(format).fg(Color::White));
        }
        table.add_row(Row::from(cells));
    }

    println!("\n{table}");
}

/// Estado final por archivo tras limpiar: limpio, limpiado o error.
pub fn render_strip_files(before: &Report, summary: &DirectoryStripSummary, verbose: bool) {
    let dirty: HashSet<&Path> = before
        .files_with_metadata
        .iter()
        .map(|result| result.file_path.as_path())
        .collect();

    if !summary.results.is_empty() {
        let mut headers = vec!["Archivo", "Tipo", "Estado"];
        if verbose {
            headers.extend(["Tamaño original", "Respaldo"]);
        }
        let mut table = build_table(&headers);
        for result in &summary.results {
            table.add_row(strip_row(result, dirty.contains(result.file_path.as_path()), verbose));
        }
        println!("\n{table}");
    }

    let counters = &summary.counters;
    let mut table = build_table(&["Limpieza", "Valor"]);
    table.add_row(build_row(
        "Archivos encontrados",
        &counters.total_files.to_string(),
        Color::White,
    ));
    table.add_row(build_row("Procesados", &counters.processed.to_string(), Color::Green));
    table.add_row(build_row("Omitidos", &counters.skipped.to_string(), Color::White));
    table.add_row(build_row(
        "Errores",
        &counters.errors.to_string(),
        count_color(counters.errors, Color::Red),
    ));
    println!("\n{table}");
}

fn strip_row(result: &StripResult, was_dirty: bool, verbose: bool) -> Row {
    let state = match (&result.error, was_dirty) {
        (Some(error), _) => Cell::new(format!("✗ error: {error}")).fg(Color::Red),
        (None, true) => Cell::new("✓ limpiado").fg(Color::Green),
        (None, false) => Cell::new("✓ limpio").fg(Color::Green),
    };
    let mut cells = vec![
        Cell::new(result.file_path.display()).fg(LABEL_COLOR),
        Cell::new(result.file_category.label()).fg(Color::White),
        state,
    ];
    if verbose {
        cells.push(Cell::new(format_size(result.original_size)).fg(Color::White));
        let backup = result
            .backup_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "—".to_string());
        cells.push(Cell::new(backup).fg(Color::White));
    }
    Row::from(cells)
}

pub fn render_plan(plan: &StripPlan, verbose: bool) {
    println!(
        "{}",
        style(format!(
            "Simulación sobre {}: no se modificará ningún archivo.",
            plan.root.display()
        ))
        .dim()
    );

    let mut table = build_table(&["Archivo", "Acción"]);
    for file in &plan.files {
        table.add_row(build_row(
            &file.path.display().to_string(),
            &format!("limpiar ({})", file.category.label()),
            Color::Green,
        ));
    }
    for path in &plan.skipped {
        table.add_row(build_row(
            &path.display().to_string(),
            "omitir (no soportado)",
            Color::DarkGrey,
        ));
    }
    println!("{table}");

    if verbose && !plan.extension_counts.is_empty() {
        let mut items: Vec<_> = plan.extension_counts.iter().collect();
        items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        let mut table = build_table(&["Extensión", "Archivos"]);
        for (extension, count) in items {
            table.add_row(build_row(extension, &count.to_string(), Color::White));
        }
        println!("{table}");
    }

    println!(
        "{}",
        style(format!(
            "Se procesarían {} archivo(s) y se omitirían {}.",
            plan.files.len(),
            plan.skipped.len()
        ))
        .bold()
    );
}

pub fn render_hook_outcome(outcome: &HookOutcome) {
    if outcome.is_noop() {
        println!(
            "{}",
            style(format!(
                "✓ {} archivo(s) revisados, ninguno con metadata.",
                outcome.inspected.len()
            ))
            .green()
        );
        return;
    }

    for path in &outcome.cleaned {
        println!("{} {}", style("✓ limpiado y preparado:").green(), path.display());
    }
}
