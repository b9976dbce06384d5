//! Refresh command handler.

use chrono::{DateTime, Utc};
use serde::Serialize;

use devconfig_core::{CatalogMode, SchemaLoadError};

use super::{CliEngine, util};
use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct RefreshSummary {
    requested: CatalogMode,
    loaded_from: CatalogMode,
    fallback_reason: Option<String>,
    zones: usize,
    device_types: usize,
    failures: Vec<SchemaLoadError>,
    loaded_at: DateTime<Utc>,
}

pub async fn handle(engine: &CliEngine, global: &GlobalOpts) -> Result<(), CliError> {
    // --local has already been folded into the engine's configured mode.
    let mode = engine.config().mode;
    let catalog = util::with_spinner(global, "Reloading catalog", engine.refresh(mode)).await?;

    output::print_warnings(&catalog.warnings(), &global.color, global.quiet);

    let summary = RefreshSummary {
        requested: catalog.requested_mode(),
        loaded_from: catalog.mode(),
        fallback_reason: catalog.fallback_reason().map(str::to_owned),
        zones: catalog.zone_names().len(),
        device_types: catalog.device_types().count(),
        failures: catalog.failures().to_vec(),
        loaded_at: catalog.loaded_at(),
    };

    let out = output::render_single(&global.output, &summary, |s| {
        format!(
            "Catalog loaded from {}: {} zones, {} device types, {} schema failure(s)",
            s.loaded_from,
            s.zones,
            s.device_types,
            s.failures.len()
        )
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
