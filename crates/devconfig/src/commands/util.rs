//! Shared helpers for command handlers.

use std::future::Future;
use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::CliEngine;
use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Whether the operator can be asked a question.
pub fn can_prompt(global: &GlobalOpts) -> bool {
    !global.yes && io::stdin().is_terminal() && io::stderr().is_terminal()
}

/// Ask which of `candidates` the device at `address` is.
pub fn pick_device_type(address: &str, candidates: &[String]) -> Result<String, CliError> {
    let index = dialoguer::Select::new()
        .with_prompt(format!("Device type of {address}"))
        .items(candidates)
        .default(0)
        .interact()
        .map_err(CliError::prompt)?;
    candidates
        .get(index)
        .cloned()
        .ok_or_else(|| CliError::prompt("selection out of range"))
}

/// Live reads need a gateway or a points snapshot.
pub fn require_points(engine: &CliEngine) -> Result<(), CliError> {
    if engine.points().is_configured() {
        Ok(())
    } else {
        Err(CliError::NoBackend {
            what: "control-point gateway".into(),
            hint: "Set `gateway` in the profile, or pass --gateway or --points-file.".into(),
        })
    }
}

/// Run `fut` behind a spinner on an interactive stderr.
pub async fn with_spinner<T>(global: &GlobalOpts, message: &str, fut: impl Future<Output = T>) -> T {
    let bar = (!global.quiet && io::stderr().is_terminal()).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_owned());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar
    });
    let out = fut.await;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    out
}
