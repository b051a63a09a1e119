//! `bankrec usage`: inspect or reset the run counter.

use bankrec_recon::UsageGate;

use crate::{CliError, GateArgs};

pub fn cmd_usage(args: GateArgs, reset: bool, json: bool) -> Result<(), CliError> {
    let gate = args.open()?;
    if reset {
        gate.reset().map_err(CliError::recon)?;
        eprintln!("reset {}", gate.path().display());
    }

    let (used, limit) = gate.usage().map_err(CliError::recon)?;
    let remaining = limit.saturating_sub(used);

    if json {
        let out = serde_json::json!({
            "used": used,
            "limit": limit,
            "remaining": remaining,
            "path": gate.path().display().to_string(),
        });
        println!("{out}");
    } else {
        println!("{used}/{limit} runs used, {remaining} remaining");
    }
    Ok(())
}
