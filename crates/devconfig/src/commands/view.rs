//! View command handler.

use devconfig_core::{CoreError, ViewOptions, ViewTarget};

use super::{CliEngine, util};
use crate::cli::{GlobalOpts, ViewArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    engine: &CliEngine,
    args: ViewArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (target, device_types) = match (args.address, args.id) {
        (_, Some(value)) => {
            let device_type = single_type(args.device_type)?;
            (ViewTarget::Identity { device_type, value }, Vec::new())
        }
        (Some(address), None) => {
            util::require_points(engine)?;
            (ViewTarget::Address(address), args.device_type)
        }
        (None, None) => {
            return Err(CliError::Validation {
                field: "target".into(),
                reason: "give a device address or --id".into(),
            });
        }
    };

    let mut options = ViewOptions {
        summary_only: args.summary,
        show_tooltip: args.tooltip,
        zones: args.zone,
        device_types,
        mode: None,
    };

    let first = util::with_spinner(global, "Reading device", engine.view(&target, &options)).await;
    let report = match first {
        Err(CoreError::AmbiguousInference {
            address,
            candidates,
        }) if util::can_prompt(global) => {
            options.device_types = vec![util::pick_device_type(&address, &candidates)?];
            util::with_spinner(global, "Reading device", engine.view(&target, &options)).await?
        }
        other => other?,
    };

    output::print_warnings(&report.warnings, &global.color, global.quiet);
    output::print_output(&output::render_report(&global.output, &report), global.quiet);
    Ok(())
}

fn single_type(mut types: Vec<String>) -> Result<String, CliError> {
    match types.len() {
        1 => Ok(types.remove(0)),
        n => Err(CliError::Validation {
            field: "type".into(),
            reason: format!("--id needs exactly one --type, got {n}"),
        }),
    }
}
