use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use tracing::info;

use keywire_core::{mainboard::PRESETS, Mainboard};
use keywire_keymap::{KeymapTable, ViaDefinition};
use keywire_project::{LayoutCache, Project};
use keywire_render::{render_wiring, RenderOptions};
use keywire_route::{optimize_route, resolve_route};

use crate::error::CliError;
use crate::RouteArgs;

pub fn run_route(args: &RouteArgs) -> Result<(), CliError> {
    println!("Loading project...");
    let mut cache = LayoutCache::new();
    let mut project = Project::load(&args.input, &mut cache)?;

    if let Some(secs) = args.time_limit {
        if !(secs.is_finite() && secs > 0.0) {
            return Err(CliError::usage(format!(
                "--time-limit must be a positive number of seconds, got {secs}"
            )));
        }
        project.solve.time_limit = Duration::from_secs_f64(secs);
    }
    if let Some(threads) = args.threads {
        project.solve.threads = threads.max(1);
    }

    println!("Resolving keys...");
    let input = project.route_input();
    let plan = resolve_route(&input, &project.solve)?;

    println!("Optimizing routes...");
    info!("{} wires to route", plan.wire_count());
    let result = optimize_route(&input, plan, &project.solve)?;

    println!("Generating keymaps...");
    let table = KeymapTable::from_route(&result, &project.mainboard)?;
    let via = ViaDefinition::new(&project.name, &project.mainboard, &result, &project.layout)?;
    let via_json = via.to_json()?;

    println!("Drawing wiring diagrams...");
    let render_opts = RenderOptions {
        mirror: !args.no_mirror,
        ..RenderOptions::default()
    };
    let diagrams = render_wiring(&result, &render_opts)?;

    println!("Writing output to disk...");
    write_outputs(&args.output, &table.to_qmk(), &via_json)
        .and_then(|()| {
            diagrams
                .save(&args.output)
                .context("failed to write wiring diagrams")
        })
        .map_err(|e| CliError::processing(format!("{e:#}")))?;

    info!(
        "{} wires, {:.1} cm total",
        result.routes.len(),
        result.total_length()
    );
    println!("Done.");
    Ok(())
}

fn write_outputs(dir: &Path, qmk: &str, via: &str) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    for (name, content) in [("qmk_keymap.txt", qmk), ("via_keymap.json", via)] {
        let path = dir.join(name);
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

pub fn list_mainboards() {
    for name in PRESETS {
        if let Ok(board) = Mainboard::preset(name) {
            println!(
                "{:<10} {:>2} rows x {:>2} cols, {} cable(s), product {}",
                board.name,
                board.logical_rows,
                board.logical_cols,
                board.cables.len(),
                board.product_id
            );
        }
    }
}
