/// World Linter: checks a generated world document and reports what the
/// pipeline would reject or repair.
///
/// Usage: world_linter <world.json> [--config <pipeline.ron>]
///
/// Exits 1 when the document fails the shape check, 2 when it cannot be read.
use scene_assembly::core::config::PipelineConfig;
use scene_assembly::core::shape::check_shape;
use scene_assembly::core::validator::{validate_document, ValidationWarning};
use serde_json::Value;
use std::path::Path;
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: world_linter <world.json> [--config <pipeline.ron>]");
        process::exit(0);
    }

    let world_path = &args[1];
    let mut config_path = None;

    let mut i = 2;
    while i < args.len() {
        if args[i] == "--config" && i + 1 < args.len() {
            i += 1;
            config_path = Some(args[i].clone());
        }
        i += 1;
    }

    let config = match config_path {
        Some(ref path) => match PipelineConfig::load_from_ron(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("ERROR: Failed to load config '{}': {}", path, e);
                process::exit(2);
            }
        },
        None => PipelineConfig::default(),
    };

    let doc = match read_json(Path::new(world_path)) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(2);
        }
    };

    println!("\n=== World Lint Report ===\n");

    let report = check_shape(&doc);
    if report.is_valid() {
        println!("Shape: OK");
    } else {
        println!("Shape: REJECTED ({} problems)", report.violations.len() + report.omitted);
        for reason in report.reasons() {
            println!("  ERROR: {}", reason);
        }
        if report.omitted > 0 {
            println!("  ... and {} more", report.omitted);
        }
    }

    match validate_document(&doc, &config) {
        Ok(validated) => {
            let counts = validated.value.entity_counts();
            println!(
                "Repaired world: {} zones, {} rooms, {} props, {} clues, {} npcs",
                counts.zones,
                counts.rooms,
                counts.props,
                counts.clues,
                validated.value.spawn_points.npcs.len()
            );
            print_warnings(&validated.warnings);
        }
        Err(e) => println!("Repair: not possible ({})", e),
    }

    if !report.is_valid() {
        process::exit(1);
    }
}

fn read_json(path: &Path) -> Result<Value, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("'{}' is not JSON: {}", path.display(), e))
}

fn print_warnings(warnings: &[ValidationWarning]) {
    if warnings.is_empty() {
        println!("No repairs needed.");
        return;
    }
    let truncated = warnings
        .iter()
        .filter(|w| matches!(w, ValidationWarning::Truncated { .. }))
        .count();
    for warning in warnings {
        println!("  WARNING: {}", warning);
    }
    println!(
        "\nSummary: {} repairs ({} truncations)",
        warnings.len(),
        truncated
    );
}
