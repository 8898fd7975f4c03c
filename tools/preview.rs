/// Preview: builds a scene from a world document and prints what the
/// renderer would receive.
///
/// Usage: preview <world.json> [--config <pipeline.ron>] [--seed <n>] [--json]
///
/// Without `--json`, prints a per-layer node summary and an ASCII
/// walkability map (`#` blocked, `.` open, `@` player spawn).
use scene_assembly::core::pipeline::{SceneBundle, ScenePipeline};
use scene_assembly::schema::scene::SceneNode;
use std::process;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    let world_path = &args[1];
    let mut config_path = None;
    let mut seed = None;
    let mut dump_json = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                i += 1;
                config_path = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().ok();
            }
            "--json" => dump_json = true,
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = ScenePipeline::builder();
    if let Some(ref path) = config_path {
        builder = builder.config_file(path);
    }
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    let pipeline = match builder.build() {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    let input = match std::fs::read_to_string(world_path) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("ERROR: Failed to read '{}': {}", world_path, e);
            process::exit(1);
        }
    };
    let bundle = match pipeline.run_str(&input) {
        Ok(bundle) => bundle,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    };

    if dump_json {
        match serde_json::to_string_pretty(&bundle.graph) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    print_summary(&bundle);
}

fn print_usage() {
    println!("Usage: preview <world.json> [--config <pipeline.ron>] [--seed <n>] [--json]");
}

fn print_summary(bundle: &SceneBundle) {
    if let Some(ref reason) = bundle.rejection {
        println!("Input rejected, showing fallback world: {}\n", reason);
    }

    let meta = &bundle.world.metadata;
    println!(
        "Theme: {} ({:?}, {:?}, {:?})",
        meta.theme, meta.tone, meta.weather, meta.time_of_day
    );
    println!(
        "Scene: {} nodes, {:.0}x{:.0} px\n",
        bundle.graph.node_count(),
        bundle.graph.width,
        bundle.graph.height
    );

    for layer in bundle.graph.layers() {
        println!("[{}] {} ({} nodes)", layer.draw_order, layer.name, layer.nodes.len());
        for node in &layer.nodes {
            print_node(node, 1);
        }
    }

    if !bundle.warnings.is_empty() {
        println!("\n{} repairs applied:", bundle.warnings.len());
        for warning in &bundle.warnings {
            println!("  {}", warning);
        }
    }

    let walk = &bundle.walkability;
    println!(
        "\nWalkability {}x{} ({} blocked):",
        walk.width(),
        walk.depth(),
        walk.blocked_count()
    );
    let player = bundle.world.spawn_points.player;
    let spawn = bundle.index.to_cell(player.x, player.y);
    for (z, row) in walk.render_ascii().lines().enumerate() {
        let line: String = row
            .chars()
            .enumerate()
            .map(|(x, c)| {
                if (x as i64, z as i64) == spawn {
                    '@'
                } else {
                    c
                }
            })
            .collect();
        println!("  {}", line);
    }
}

fn print_node(node: &SceneNode, depth: usize) {
    let asset = node
        .asset
        .as_ref()
        .map(|a| format!(" -> {}", a.sprite))
        .unwrap_or_default();
    println!(
        "{}{:?} {} \"{}\" at ({}, {}, {}){}",
        "  ".repeat(depth),
        node.kind,
        node.id,
        node.name,
        node.grid_position.x,
        node.grid_position.y,
        node.grid_position.z,
        asset
    );
    for child in &node.children {
        print_node(child, depth + 1);
    }
}
