//! Command dispatch: bridges CLI args -> engine calls -> output formatting.

pub mod catalog;
pub mod config_cmd;
pub mod diff;
pub mod refresh;
pub mod util;
pub mod view;

use devconfig_core::Engine;

use crate::backend::{Points, Store};
use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// The engine as the CLI builds it.
pub type CliEngine = Engine<Points, Store>;

/// Dispatch an engine-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    engine: &CliEngine,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Diff(args) => diff::handle(engine, args, global).await,
        Command::View(args) => view::handle(engine, args, global).await,
        Command::Zones(args) => {
            catalog::zones(engine, &args, global);
            Ok(())
        }
        Command::Types => {
            catalog::types(engine, global);
            Ok(())
        }
        Command::Fields(args) => catalog::fields(engine, &args, global),
        Command::Refresh => refresh::handle(engine, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled before an engine is built".into(),
        }),
    }
}
