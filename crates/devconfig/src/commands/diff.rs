//! Diff command handler.

use devconfig_core::{CoreError, DiffOptions};

use super::{CliEngine, util};
use crate::cli::{DiffArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    engine: &CliEngine,
    args: DiffArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_points(engine)?;

    let mut options = DiffOptions {
        zones: args.zone,
        device_types: args.device_type,
        mode: None,
        compare_against_store: args.pmgr,
        show_tooltip: args.tooltip,
    };
    let message = format!("Reading {} device(s)", args.addresses.len());

    let first = util::with_spinner(global, &message, engine.diff(&args.addresses, &options)).await;
    let report = match first {
        // The engine never prompts; ask here and retry with the choice.
        Err(CoreError::AmbiguousInference {
            address,
            candidates,
        }) if util::can_prompt(global) => {
            options.device_types = vec![util::pick_device_type(&address, &candidates)?];
            util::with_spinner(global, &message, engine.diff(&args.addresses, &options)).await?
        }
        other => other?,
    };

    output::print_warnings(&report.warnings, &global.color, global.quiet);
    output::print_output(&output::render_report(&global.output, &report), global.quiet);
    Ok(())
}
