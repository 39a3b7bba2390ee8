//! Aprobación interactiva archivo por archivo.

use console::style;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::report::ScanResult;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    Approve,
    ApproveAll,
    Skip,
    Quit,
}

impl Decision {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "s" | "si" | "sí" | "y" | "yes" => Some(Decision::Approve),
            "t" | "todos" | "a" | "all" => Some(Decision::ApproveAll),
            "n" | "no" | "omitir" | "skip" => Some(Decision::Skip),
            "q" | "salir" | "quit" | "exit" => Some(Decision::Quit),
            _ => None,
        }
    }
}

pub trait Prompter {
    fn ask(&mut self, result: &ScanResult) -> Result<Decision>;
}

/// Lee las respuestas de la entrada estándar; fin de entrada equivale a salir.
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&mut self, result: &ScanResult) -> Result<Decision> {
        let stdin = io::stdin();
        let mut line = String::new();
        loop {
            print!(
                "{} {} {} ",
                style("¿Limpiar").cyan(),
                style(result.file_path.display()).bold(),
                style("? [s]í / [t]odos / [n]o / [q] salir ›").cyan()
            );
            io::stdout().flush().map_err(|err| Error::io("stdout", err))?;

            line.clear();
            let read = stdin
                .lock()
                .read_line(&mut line)
                .map_err(|err| Error::io("stdin", err))?;
            if read == 0 {
                return Ok(Decision::Quit);
            }
            match Decision::parse(&line) {
                Some(decision) => return Ok(decision),
                None => println!("{}", style("│ Opción inválida. Intenta de nuevo.").yellow()),
            }
        }
    }
}

/// Recorre los archivos con metadata y devuelve los aprobados, en orden.
///
/// `Quit` deja de preguntar pero conserva lo aprobado hasta ese momento.
pub fn select_files(prompter: &mut dyn Prompter, candidates: &[ScanResult]) -> Result<Vec<PathBuf>> {
    let mut approved = Vec::new();
    for (index, result) in candidates.iter().enumerate() {
        match prompter.ask(result)? {
            Decision::Approve => approved.push(result.file_path.clone()),
            Decision::Skip => {}
            Decision::ApproveAll => {
                approved.extend(candidates[index..].iter().map(|r| r.file_path.clone()));
                break;
            }
            Decision::Quit => break,
        }
    }
    Ok(approved)
}
