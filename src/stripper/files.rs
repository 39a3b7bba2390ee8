//! Utilidades de archivos para la limpieza: respaldo, reemplazo atómico y temporales.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Ruta hermana `<nombre>.backup`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".backup");
    path.with_file_name(name)
}

pub fn write_backup(path: &Path) -> Result<PathBuf> {
    let backup = backup_path(path);
    fs::copy(path, &backup).map_err(|err| Error::io(&backup, err))?;
    tracing::debug!(path = %path.display(), backup = %backup.display(), "Copia de respaldo creada");
    Ok(backup)
}

/// Sustituye el contenido de `path` escribiendo primero un temporal en el mismo directorio.
///
/// Un fallo a mitad de escritura deja el original intacto; se conservan sus permisos.
pub fn replace_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let permissions = fs::metadata(path).map(|meta| meta.permissions()).ok();

    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{stem}_temp_"))
        .tempfile_in(parent)
        .map_err(|err| Error::io(parent, err))?;
    temp.write_all(bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|err| Error::io(temp.path(), err))?;
    if let Some(permissions) = permissions {
        fs::set_permissions(temp.path(), permissions).map_err(|err| Error::io(temp.path(), err))?;
    }

    temp.persist(path).map_err(|err| Error::io(path, err.error))?;
    Ok(())
}

/// Temporal en el directorio del sistema con la extensión indicada; se borra al soltarlo.
pub fn scratch_file(extension: &str, contents: Option<&[u8]>) -> Result<NamedTempFile> {
    let mut temp = tempfile::Builder::new()
        .prefix("metascrub-")
        .suffix(&format!(".{extension}"))
        .tempfile()
        .map_err(|err| Error::io(std::env::temp_dir(), err))?;
    if let Some(contents) = contents {
        temp.write_all(contents)
            .and_then(|_| temp.flush())
            .map_err(|err| Error::io(temp.path(), err))?;
    }
    Ok(temp)
}
