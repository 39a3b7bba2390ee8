//! Subcomando `hook` para usar desde `.git/hooks/pre-commit`.

use std::env;

use super::HookArgs;
use super::ui;
use crate::engine::MetadataEngine;
use crate::error::{Error, Result};
use crate::hook::run_hook;
use crate::tools::Git;

pub fn run(args: &HookArgs) -> Result<()> {
    let engine = MetadataEngine::new(args.categories.to_config(false));
    let work_dir = env::current_dir().map_err(|err| Error::io(".", err))?;
    let git = Git::discover(&work_dir)?;

    let files = (!args.files.is_empty()).then(|| args.files.clone());
    let outcome = run_hook(&engine, &git, files)?;
    ui::render_hook_outcome(&outcome);
    Ok(())
}
