//! Lays out a generated feed with the masonry grid and prints the result.

mod config;

use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use refresh_components::{
    MasonryGrid, MasonryGridArgs, MasonryItem,
    masonry_grid::GridNode,
};
use refresh_ui::{Px, PxSize, logging::init_tracing};
use tracing::info;

/// Interval between replayed resize reports, shorter than any sensible debounce.
const RESIZE_STEP: Duration = Duration::from_millis(16);

#[derive(Parser, Debug)]
#[command(name = "refresh-demo")]
#[command(version, about = "Masonry grid layout showcase", long_about = None)]
struct Cli {
    /// Grid configuration file (.json or .toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Number of generated items
    #[arg(short = 'n', long, default_value_t = 40)]
    items: usize,
    /// Seed for item heights
    #[arg(short, long, default_value_t = 7)]
    seed: u64,
    /// Initial viewport width in pixels
    #[arg(long, default_value_t = 1280)]
    width: i32,
    /// Viewport height in pixels
    #[arg(long, default_value_t = 900)]
    height: i32,
    /// Widths replayed as one burst of resize reports
    #[arg(long, value_delimiter = ',')]
    resize: Vec<i32>,
    /// Scroll offset applied after layout
    #[arg(long)]
    scroll: Option<i32>,
}

#[derive(Debug, Clone)]
struct Card {
    title: String,
}

fn generate_items(count: usize, seed: u64) -> Vec<MasonryItem<Card>> {
    let mut rng = rand_pcg::Pcg64::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let height = Px(rng.random_range(120..=420));
            MasonryItem::new(
                format!("card-{i}"),
                height,
                Card {
                    title: format!("Card #{i}"),
                },
            )
        })
        .collect()
}

fn print_grid(label: &str, grid: &GridNode<String>) {
    println!(
        "{label}: {} column(s), breakpoint {}, {} of {} item(s) mounted",
        grid.column_count,
        grid.active_breakpoint
            .map(|bp| bp.to_string())
            .unwrap_or_else(|| "-".to_owned()),
        grid.rendered_item_count(),
        grid.assigned_item_count(),
    );
    if let Some(height) = grid.container_height {
        println!(
            "  virtualized: container {height}, content {}, scroll {}",
            grid.content_height, grid.scroll_offset
        );
    }
    for column in &grid.columns {
        println!(
            "  {} x={} width={} height={} items={}",
            column.test_id(),
            column.x,
            column.width,
            column.total_height,
            column.assigned_count
        );
        for item in &column.items {
            println!("    {:>6} +{:<8} {}", item.height, item.offset, item.content);
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let args = match &cli.config {
        Some(path) => config::load(path)
            .with_context(|| format!("failed to load grid configuration from {}", path.display()))?,
        None => MasonryGridArgs::default(),
    };
    let items = generate_items(cli.items, cli.seed);
    info!(items = items.len(), seed = cli.seed, "Generated feed");

    let signal = args.viewport_signal();
    signal.set_size(PxSize::new(Px(cli.width), Px(cli.height)));
    let debounce = args.resize_debounce();
    let grid = MasonryGrid::mount(args, &signal);
    let render = |item: &MasonryItem<Card>| item.payload.title.clone();

    print_grid(&format!("width {}", cli.width), &grid.render(&items, render));

    if !cli.resize.is_empty() {
        let start = Instant::now();
        let mut reported_at = start;
        for width in &cli.resize {
            signal.report_resize(PxSize::new(Px(*width), Px(cli.height)), reported_at);
            reported_at += RESIZE_STEP;
        }
        let settled = signal
            .settle(reported_at + debounce)
            .context("resize burst did not settle")?;
        info!(
            reports = cli.resize.len(),
            width = settled.width.raw(),
            "Resize burst settled"
        );
        if grid.needs_relayout() {
            print_grid(
                &format!("settled at width {}", settled.width.raw()),
                &grid.render(&items, render),
            );
        } else {
            println!("settled at width {}: column count unchanged", settled.width.raw());
        }
    }

    if let Some(offset) = cli.scroll {
        grid.scroll_to(Px(offset));
        print_grid(&format!("scrolled to {offset}px"), &grid.render(&items, render));
    }

    grid.unmount();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_items_are_seeded() {
        let first = generate_items(12, 3);
        let second = generate_items(12, 3);
        let heights = |items: &[MasonryItem<Card>]| items.iter().map(|i| i.height).collect::<Vec<_>>();
        assert_eq!(heights(&first), heights(&second));
        assert!(first.iter().all(|item| (120..=420).contains(&item.height.raw())));
        assert_eq!(first[5].payload.title, "Card #5");
    }

    #[test]
    fn test_cli_parses_resize_list() {
        let cli = Cli::try_parse_from(["refresh-demo", "--resize", "640,900,1300", "-n", "5"])
            .expect("valid arguments");
        assert_eq!(cli.resize, vec![640, 900, 1300]);
        assert_eq!(cli.items, 5);
        assert_eq!(cli.width, 1280);
    }
}
