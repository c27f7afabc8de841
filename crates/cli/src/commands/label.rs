//! `label` command implementation.

use anyhow::{Context, Result};
use labeling::LabelPass;
use tracing::info;

use crate::cli::LabelArgs;

/// Execute the `label` command
pub fn run_label(args: &LabelArgs) -> Result<()> {
    if !args.data_path.is_dir() {
        anyhow::bail!(
            "Capture directory not found: {}",
            args.data_path.display()
        );
    }

    info!(data_path = %args.data_path.display(), "Starting label pass");

    let pass = LabelPass::new(args.data_path.clone(), args.output.clone());
    let stats = pass
        .run()
        .with_context(|| format!("Label pass failed over {}", args.data_path.display()))?;

    println!("Label pass finished:");
    println!("  frames scanned: {}", stats.frames_scanned);
    println!("  frames labeled: {}", stats.frames_labeled);
    println!("  frames skipped: {}", stats.frames_skipped);
    println!("  labels emitted: {}", stats.labels_emitted);

    Ok(())
}
