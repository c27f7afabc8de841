//! `validate` command implementation.

use anyhow::Result;
use tracing::info;

use crate::cli::ValidateArgs;

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    let result = config_loader::ConfigLoader::load_from_path(&args.config);

    if args.json {
        let report = match &result {
            Ok(_) => serde_json::json!({ "valid": true, "config": args.config }),
            Err(e) => serde_json::json!({ "valid": false, "config": args.config, "error": e.to_string() }),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    match result {
        Ok(blueprint) => {
            info!(
                config = %args.config.display(),
                sensors = blueprint.vehicle.sensors.len(),
                "Configuration is valid"
            );
            if !args.json {
                println!("OK: {}", args.config.display());
            }
            Ok(())
        }
        Err(e) => {
            if !args.json {
                eprintln!("INVALID: {e}");
            }
            Err(e.into())
        }
    }
}
