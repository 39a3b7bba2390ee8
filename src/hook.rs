//! Variante de pre-commit: limpia solo los archivos preparados que lo necesitan.
//!
//! A diferencia del recorrido de directorios, cualquier fallo aborta la
//! ejecución para que el commit no incluya metadata.

use serde::Serialize;
use std::path::PathBuf;

use crate::engine::MetadataEngine;
use crate::error::{Error, Result};
use crate::tools::VersionControl;

#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookOutcome {
    /// Archivos soportados que se analizaron.
    pub inspected: Vec<PathBuf>,
    /// Archivos limpiados y vueltos a preparar.
    pub cleaned: Vec<PathBuf>,
}

impl HookOutcome {
    pub fn is_noop(&self) -> bool {
        self.cleaned.is_empty()
    }
}

/// Ejecuta el gancho sobre `files` o, si no se indican, sobre lo preparado en el VCS.
pub fn run_hook(
    engine: &MetadataEngine,
    vcs: &dyn VersionControl,
    files: Option<Vec<PathBuf>>,
) -> Result<HookOutcome> {
    let candidates = match files {
        Some(files) => files,
        None => vcs.staged_files()?,
    };

    let mut outcome = HookOutcome::default();
    for path in candidates {
        if !engine.classifier().is_supported(&path) {
            tracing::debug!(path = %path.display(), "Archivo no soportado; se deja intacto");
            continue;
        }

        let scan = engine.analyze(&path)?;
        if let Some(message) = scan.error {
            return Err(Error::Hook { path, message });
        }
        outcome.inspected.push(path.clone());
        if !scan.has_metadata {
            continue;
        }

        let strip = engine.strip(&path)?;
        if !strip.success {
            return Err(Error::Hook {
                path,
                message: strip.error.unwrap_or_default(),
            });
        }
        tracing::info!(path = %path.display(), concerns = scan.concerns.len(), "Archivo limpiado");
        outcome.cleaned.push(path);
    }

    vcs.stage(&outcome.cleaned)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::test_support::{
        FakeVcs, TestResult, fake_capabilities, jpeg_with_gps, pdf_with_info, plain_png,
        write_file,
    };
    use std::cell::RefCell;

    fn engine() -> MetadataEngine {
        MetadataEngine::with_capabilities(EngineConfig::default(), fake_capabilities())
    }

    #[test]
    fn restages_only_files_that_carried_metadata() -> TestResult {
        let dir = tempfile::tempdir()?;
        let clean = write_file(dir.path(), "logo.png", &plain_png());
        let dirty = write_file(dir.path(), "foto.jpg", &jpeg_with_gps(Some("Jane Doe")));
        let notes = write_file(dir.path(), "README.md", b"# notas");
        let vcs = FakeVcs {
            staged: vec![clean.clone(), dirty.clone(), notes],
            restaged: RefCell::new(Vec::new()),
        };

        let engine = engine();
        let outcome = run_hook(&engine, &vcs, None)?;

        assert_eq!(outcome.inspected, vec![clean, dirty.clone()]);
        assert_eq!(outcome.cleaned, vec![dirty.clone()]);
        assert_eq!(*vcs.restaged.borrow(), vec![dirty.clone()]);
        assert!(!engine.analyze(&dirty)?.has_metadata);
        Ok(())
    }

    #[test]
    fn explicit_file_list_overrides_staged_files() -> TestResult {
        let dir = tempfile::tempdir()?;
        let pdf = write_file(dir.path(), "informe.pdf", &pdf_with_info(&[("Author", "Jane Doe")]));
        let vcs = FakeVcs {
            staged: Vec::new(),
            restaged: RefCell::new(Vec::new()),
        };

        let outcome = run_hook(&engine(), &vcs, Some(vec![pdf.clone()]))?;
        assert_eq!(outcome.cleaned, vec![pdf]);
        Ok(())
    }

    #[test]
    fn any_failure_aborts_without_restaging() -> TestResult {
        let dir = tempfile::tempdir()?;
        let dirty = write_file(dir.path(), "a.jpg", &jpeg_with_gps(None));
        let broken = write_file(dir.path(), "b.png", b"no es un png");
        let vcs = FakeVcs {
            staged: vec![dirty, broken],
            restaged: RefCell::new(Vec::new()),
        };

        let result = run_hook(&engine(), &vcs, None);
        assert!(matches!(result, Err(Error::Hook { .. })));
        assert!(vcs.restaged.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn nothing_to_clean_is_a_noop() -> TestResult {
        let vcs = FakeVcs {
            staged: Vec::new(),
            restaged: RefCell::new(Vec::new()),
        };
        let outcome = run_hook(&engine(), &vcs, None)?;
        assert!(outcome.is_noop());
        assert!(outcome.inspected.is_empty());
        Ok(())
    }
}
