//! Subcomando `strip`.

use super::StripArgs;
use super::ui;
use crate::engine::MetadataEngine;
use crate::error::Result;
use crate::report::build_report;

pub fn run(args: &StripArgs, verbose: bool) -> Result<()> {
    let engine = MetadataEngine::new(args.categories.to_config(args.backup));

    if args.dry_run {
        let plan = engine.plan(&args.input)?;
        ui::render_header("Simulación de limpieza");
        ui::render_plan(&plan, verbose);
        return Ok(());
    }

    let before = build_report(&engine.scan_path(&args.input)?);
    let stripped = engine.strip_path(&args.input)?;

    ui::render_header("Limpieza de metadata");
    ui::render_concerns(&before, Some(&stripped));
    ui::render_strip_files(&before, &stripped, verbose);
    Ok(())
}
