//! Recorrido recursivo de directorios y agregación de resultados.
//!
//! Cada directorio produce su propio resumen y lo suma campo a campo al del
//! padre. Un archivo que falla se cuenta en `errors` y el recorrido sigue.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::engine::MetadataEngine;
use crate::error::{Error, Result};
use crate::format::{FileCategory, extension_of};
use crate::report::{DirectoryStripSummary, DirectorySummary};

const NO_EXTENSION_LABEL: &str = "sin extensión";

enum EntryKind {
    Directory,
    File,
}

/// Archivo que una limpieza real procesaría.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedFile {
    pub path: PathBuf,
    pub category: FileCategory,
}

/// Resultado de una simulación (`--dry-run`): nada se modifica.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StripPlan {
    pub root: PathBuf,
    pub files: Vec<PlannedFile>,
    pub skipped: Vec<PathBuf>,
    pub extension_counts: BTreeMap<String, usize>,
}

impl MetadataEngine {
    /// Analiza un archivo o un árbol de directorios.
    ///
    /// Un archivo suelto produce un resumen de una sola entrada. Falla solo si
    /// la ruta raíz es inaccesible o es un archivo no soportado.
    pub fn scan_path(&self, path: &Path) -> Result<DirectorySummary> {
        if is_directory(path)? {
            return self.scan_directory(path);
        }
        let result = self.analyze(path)?;
        let mut summary = DirectorySummary::new(path);
        summary.record(result);
        Ok(summary)
    }

    pub fn strip_path(&self, path: &Path) -> Result<DirectoryStripSummary> {
        if is_directory(path)? {
            return self.strip_directory(path);
        }
        let result = self.strip(path)?;
        let mut summary = DirectoryStripSummary::new(path);
        summary.record(result);
        Ok(summary)
    }

    fn scan_directory(&self, dir: &Path) -> Result<DirectorySummary> {
        let mut summary = DirectorySummary::new(dir);

        for (path, kind) in self.sorted_entries(dir)? {
            match kind {
                EntryKind::Directory => match self.scan_directory(&path) {
                    Ok(child) => summary.merge(child),
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "Subdirectorio omitido");
                        summary.record_error();
                    }
                },
                EntryKind::File => {
                    if self.category(&path) == FileCategory::Unsupported {
                        summary.record_skipped();
                        continue;
                    }
                    match self.analyze(&path) {
                        Ok(result) => summary.record(result),
                        Err(err) => {
                            tracing::warn!(path = %path.display(), error = %err, "Archivo omitido");
                            summary.record_error();
                        }
                    }
                }
            }
        }

        Ok(summary)
    }

    fn strip_directory(&self, dir: &Path) -> Result<DirectoryStripSummary> {
        let mut summary = DirectoryStripSummary::new(dir);

        for (path, kind) in self.sorted_entries(dir)? {
            match kind {
                EntryKind::Directory => match self.strip_directory(&path) {
                    Ok(child) => summary.merge(child),
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "Subdirectorio omitido");
                        summary.record_error();
                    }
                },
                EntryKind::File => {
                    if self.category(&path) == FileCategory::Unsupported {
                        summary.record_skipped();
                        continue;
                    }
                    match self.strip(&path) {
                        Ok(result) => summary.record(result),
                        Err(err) => {
                            tracing::warn!(path = %path.display(), error = %err, "Archivo omitido");
                            summary.record_error();
                        }
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Analiza una lista explícita de archivos (modo interactivo y gancho).
    pub fn scan_files(&self, files: &[PathBuf]) -> DirectorySummary {
        let mut summary = DirectorySummary::new(Path::new("."));
        for path in files {
            match self.analyze(path) {
                Ok(result) => summary.record(result),
                Err(_) => summary.record_skipped(),
            }
        }
        summary
    }

    pub fn strip_files(&self, files: &[PathBuf]) -> DirectoryStripSummary {
        let mut summary = DirectoryStripSummary::new(Path::new("."));
        for path in files {
            match self.strip(path) {
                Ok(result) => summary.record(result),
                Err(_) => summary.record_skipped(),
            }
        }
        summary
    }

    /// Lista lo que `strip_path` procesaría, sin invocar a ningún limpiador.
    pub fn plan(&self, root: &Path) -> Result<StripPlan> {
        if !is_directory(root)? && self.category(root) == FileCategory::Unsupported {
            return Err(Error::UnsupportedFormat {
                path: root.to_path_buf(),
            });
        }

        let mut plan = StripPlan {
            root: root.to_path_buf(),
            ..StripPlan::default()
        };
        let walker = WalkDir::new(root)
            .follow_links(self.config().follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "Entrada inaccesible durante la simulación");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.into_path();
            let key = extension_of(&path).unwrap_or_else(|| NO_EXTENSION_LABEL.to_string());
            *plan.extension_counts.entry(key).or_insert(0) += 1;

            match self.category(&path) {
                FileCategory::Unsupported => plan.skipped.push(path),
                category => plan.files.push(PlannedFile { path, category }),
            }
        }

        Ok(plan)
    }

    /// Entradas del directorio ordenadas por nombre para una salida determinista.
    fn sorted_entries(&self, dir: &Path) -> Result<Vec<(PathBuf, EntryKind)>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(|err| Error::io(dir, err))? {
            let entry = entry.map_err(|err| Error::io(dir, err))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|err| Error::io(&path, err))?;

            let kind = if file_type.is_symlink() {
                if !self.config().follow_symlinks {
                    tracing::debug!(path = %path.display(), "Enlace simbólico ignorado");
                    continue;
                }
                match fs::metadata(&path) {
                    Ok(meta) if meta.is_dir() => EntryKind::Directory,
                    Ok(_) => EntryKind::File,
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "Enlace simbólico roto");
                        continue;
                    }
                }
            } else if file_type.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push((path, kind));
        }

        entries.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
        Ok(entries)
    }
}

fn is_directory(path: &Path) -> Result<bool> {
    fs::metadata(path)
        .map(|meta| meta.is_dir())
        .map_err(|err| Error::io(path, err))
}
