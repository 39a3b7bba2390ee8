//! Interfaz de línea de comandos: `scan`, `strip` y `hook`.

mod formatting;
mod hook;
mod prompt;
mod scan;
mod strip;
mod ui;

use clap::{Args, Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

use crate::config::EngineConfig;
use crate::error::Result;

pub use prompt::{Decision, Prompter, StdinPrompter, select_files};

#[derive(Parser)]
#[command(
    name = "metascrub",
    version,
    about = "Audita y elimina metadata sensible de imágenes, PDFs y videos",
    long_about = "metascrub detecta datos embebidos que comprometen la privacidad \
                  (GPS, autor, número de serie, software) y los elimina antes de publicar."
)]
struct Cli {
    /// Muestra detalles por archivo y registros de depuración
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analiza un archivo o directorio y resume la metadata encontrada
    Scan(ScanArgs),

    /// Elimina la metadata de un archivo o directorio
    Strip(StripArgs),

    /// Limpia los archivos preparados para commit y los vuelve a preparar
    Hook(HookArgs),
}

#[derive(Args)]
pub(crate) struct ScanArgs {
    /// Archivo o directorio a analizar
    pub input: PathBuf,

    /// Crea una copia `.backup` antes de limpiar (modo interactivo)
    #[arg(short, long)]
    pub backup: bool,

    /// Pregunta archivo por archivo qué limpiar
    #[arg(short, long)]
    pub interactive: bool,

    /// Imprime el reporte en JSON por la salida estándar
    #[arg(long, conflicts_with = "interactive")]
    pub json: bool,

    /// Exporta el reporte (`.json` o `.txt`)
    #[arg(short, long, value_name = "ARCHIVO")]
    pub report: Option<PathBuf>,

    #[command(flatten)]
    pub categories: CategoryArgs,
}

#[derive(Args)]
pub(crate) struct StripArgs {
    /// Archivo o directorio a limpiar
    pub input: PathBuf,

    /// Crea una copia `.backup` antes de modificar cada archivo
    #[arg(short, long)]
    pub backup: bool,

    /// Lista lo que se procesaría sin modificar nada
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub categories: CategoryArgs,
}

#[derive(Args)]
pub(crate) struct HookArgs {
    /// Archivos a revisar; por defecto, los preparados en git
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub categories: CategoryArgs,
}

/// Sustituye las extensiones por defecto de cada categoría.
#[derive(Args, Default)]
pub(crate) struct CategoryArgs {
    /// Extensiones de imagen, separadas por comas (ej. `jpg,png`)
    #[arg(long, value_name = "EXT,...")]
    pub images: Option<String>,

    /// Extensiones tratadas como PDF
    #[arg(long, value_name = "EXT,...")]
    pub pdfs: Option<String>,

    /// Extensiones de video
    #[arg(long, value_name = "EXT,...")]
    pub videos: Option<String>,

    /// Sigue enlaces simbólicos al recorrer directorios
    #[arg(long)]
    pub follow_symlinks: bool,
}

impl CategoryArgs {
    pub fn to_config(&self, backup: bool) -> EngineConfig {
        let mut config = EngineConfig::default()
            .with_backup(backup)
            .with_follow_symlinks(self.follow_symlinks);
        if let Some(list) = &self.images {
            config = config.with_image_extensions(EngineConfig::parse_extension_list(list));
        }
        if let Some(list) = &self.pdfs {
            config = config.with_pdf_extensions(EngineConfig::parse_extension_list(list));
        }
        if let Some(list) = &self.videos {
            config = config.with_video_extensions(EngineConfig::parse_extension_list(list));
        }
        config
    }
}

/// Punto de entrada del binario.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome: Result<()> = match cli.command {
        Command::Scan(args) => scan::run(&args, cli.verbose, &mut StdinPrompter),
        Command::Strip(args) => strip::run(&args, cli.verbose),
        Command::Hook(args) => hook::run(&args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
