//! Exportación de reportes en JSON o texto plano.

use std::fs;
use std::path::Path;

use super::builder::{Report, ReportedConcern};
use super::model::Severity;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExportFormat {
    Json,
    Txt,
}

impl ExportFormat {
    /// Deduce el formato a partir de la extensión del archivo destino.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        parse_export_format(&ext)
    }
}

pub fn parse_export_format(input: &str) -> Result<ExportFormat> {
    match input.to_lowercase().as_str() {
        "json" => Ok(ExportFormat::Json),
        "txt" | "text" => Ok(ExportFormat::Txt),
        other => Err(Error::Report {
            message: format!("Formato de exportación no reconocido: `{other}`"),
        }),
    }
}

pub fn report_to_json(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|err| Error::Report {
        message: format!("No se pudo serializar JSON: {err}"),
    })
}

pub fn export_report(report: &Report, format: ExportFormat, path: &Path) -> Result<()> {
    let contents = match format {
        ExportFormat::Json => report_to_json(report)?,
        ExportFormat::Txt => report_to_text(report),
    };
    fs::write(path, contents).map_err(|err| Error::io(path, err))
}

pub fn report_to_text(report: &Report) -> String {
    let mut output = String::new();
    output.push_str("Reporte de metadata\n");
    output.push_str("===================\n\n");

    let summary = &report.summary;
    output.push_str(&format!("Archivos encontrados: {}\n", summary.total_files));
    output.push_str(&format!("Archivos analizados: {}\n", summary.scanned_files));
    output.push_str(&format!("Con metadata: {}\n", summary.files_with_metadata));
    output.push_str(&format!(
        "Hallazgos: {} altos, {} medios, {} bajos\n",
        summary.high_concerns, summary.medium_concerns, summary.low_concerns
    ));
    output.push_str(&format!("Errores: {}\n\n", summary.errors));

    for severity in [Severity::High, Severity::Medium, Severity::Low] {
        append_txt_section(&mut output, severity, report.bucket(severity));
    }

    output
}

fn append_txt_section(output: &mut String, severity: Severity, concerns: &[ReportedConcern]) {
    let title = format!("Severidad {}", severity.label());
    output.push_str(&title);
    output.push('\n');
    output.push_str(&"-".repeat(title.chars().count()));
    output.push('\n');

    if concerns.is_empty() {
        output.push_str("(Sin datos)\n\n");
        return;
    }

    for reported in concerns {
        output.push_str(&format!(
            "- {}: {} = {} ({})\n",
            reported.file_path.display(),
            reported.concern.field,
            reported.concern.value,
            reported.concern.description
        ));
    }
    output.push('\n');
}
