//! Transform listing command implementation.

use anyhow::Result;
use contango_signals::registry::{Stage, available_transforms, transforms_by_stage};

/// List available transforms, optionally filtered by stage.
pub(crate) fn list_transforms(stage: Option<String>, verbose: bool) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Available Transforms                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let stages = [
        (Stage::Spread, "Spread"),
        (Stage::Indicator, "Indicator"),
        (Stage::Regime, "Regime"),
        (Stage::Trading, "Trading"),
        (Stage::Evaluation, "Evaluation"),
    ];

    for (stage_kind, stage_name) in stages {
        if let Some(ref filter) = stage
            && !stage_name.to_lowercase().contains(&filter.to_lowercase())
        {
            continue;
        }

        let transforms = transforms_by_stage(&stage_kind);
        if transforms.is_empty() {
            continue;
        }

        println!("{} - {}:", stage_name, stage_kind.description());
        println!("{}", "-".repeat(60));

        for info in transforms {
            if verbose {
                let window = if info.default_window > 0 {
                    format!(" (window: {})", info.default_window)
                } else {
                    String::new()
                };
                println!("  {:20} - {}{}", info.name, info.description, window);
                println!("  {:20}   writes: {}", "", info.outputs.join(", "));
            } else {
                println!("  {}", info.name);
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for descriptions and output columns.\n");
    }
    println!(
        "{} transforms, listed in the order the pipeline applies them.",
        available_transforms().len()
    );
    println!();

    Ok(())
}
