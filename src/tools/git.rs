//! Acceso al área de preparación de git para el gancho de pre-commit.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::{VersionControl, run_tool};
use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct Git {
    binary: PathBuf,
    top_level: PathBuf,
}

impl Git {
    /// Localiza `git` y la raíz del repositorio que contiene `work_dir`.
    pub fn discover(work_dir: &Path) -> Result<Self> {
        let binary = which::which("git").map_err(|_| Error::ToolUnavailable {
            tool: "git".to_string(),
        })?;
        let output = run_tool(
            "git",
            Command::new(&binary)
                .current_dir(work_dir)
                .args(["rev-parse", "--show-toplevel"]),
        )
        .map_err(vcs_error)?;

        let top_level = parse_top_level(&output.stdout).ok_or_else(|| Error::Vcs {
            message: format!("{} no está dentro de un repositorio git", work_dir.display()),
        })?;
        Ok(Self { binary, top_level })
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.current_dir(&self.top_level);
        command
    }
}

impl VersionControl for Git {
    fn staged_files(&self) -> Result<Vec<PathBuf>> {
        let output = run_tool(
            "git",
            self.command()
                .args(["diff", "--cached", "--name-only", "--diff-filter=ACM", "-z"]),
        )
        .map_err(vcs_error)?;

        Ok(resolve_names(&self.top_level, &output.stdout))
    }

    fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        run_tool("git", self.command().args(["add", "--"]).args(paths)).map_err(vcs_error)?;
        Ok(())
    }
}

fn vcs_error(err: Error) -> Error {
    Error::Vcs {
        message: err.to_string(),
    }
}

fn parse_top_level(stdout: &[u8]) -> Option<PathBuf> {
    let text = String::from_utf8_lossy(stdout);
    let line = text.trim_end_matches(['\n', '\r']);
    (!line.is_empty()).then(|| PathBuf::from(line))
}

/// Une los nombres `-z` de git, relativos a la raíz del repositorio, a esa raíz.
fn resolve_names(top_level: &Path, stdout: &[u8]) -> Vec<PathBuf> {
    stdout
        .split(|byte| *byte == 0)
        .filter(|name| !name.is_empty())
        .map(|name| top_level.join(String::from_utf8_lossy(name).as_ref()))
        .collect()
}
