//! External command steps (environment sync, lint, test).

use std::io::ErrorKind;
use tokio::process::Command;

/// Run `command` (an argv list) with inherited stdio.
///
/// Returns `true` on a zero exit status. An empty command, a missing
/// program, or a failing exit status is logged and reported as `false`.
pub async fn run_step(name: &str, command: &[String]) -> bool {
    let Some((program, args)) = command.split_first() else {
        tracing::error!("{}: no command configured", name);
        return false;
    };

    tracing::info!("Running {}: {}", name, command.join(" "));
    match Command::new(program).args(args).status().await {
        Ok(status) if status.success() => true,
        Ok(status) => {
            tracing::error!(code = ?status.code(), "{} failed", name);
            false
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::error!("{} failed: {} not found", name, program);
            false
        }
        Err(e) => {
            tracing::error!("{} failed: {}", name, e);
            false
        }
    }
}
