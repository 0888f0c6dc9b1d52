//! Animated Charts - Main entry point
//!
//! Runs one of the charts on tokio timers and writes every animation frame as
//! an SVG file.
//!
//! Commands:
//! - `race --data <csv>`: race bar chart over the brand dataset
//! - `heatmap [--ticks <n>] [--hover <x,y>]`: load heatmap with random data
//! - `properties`: list every property with its default
//!
//! Common options: `--out <dir>`, `--properties <json>`, `--set <name=value>`

use animated_charts::chart::logger::init_tracing;
use animated_charts::chart::properties::{registry, PropertyReader};
use animated_charts::chart::scene::FrameDirectory;
use animated_charts::config::{HeatmapConfig, OutputMode, RaceConfig, RenderConfig};
use animated_charts::heatmap::{Heatmap, LoadGenerator};
use animated_charts::pipeline::{run_heatmap, run_race, RunSummary};
use animated_charts::race::{BrandDataset, RaceChart};
use anyhow::{bail, Context};
use std::path::PathBuf;

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

/// Parsed command line
#[derive(Debug, Default)]
struct CliArgs {
    command: Option<String>,
    data: Option<PathBuf>,
    out: Option<PathBuf>,
    properties: Option<PathBuf>,
    overrides: Vec<(String, String)>,
    ticks: Option<u64>,
    hover: Option<(f64, f64)>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args).await {
        eprintln!("✗ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> anyhow::Result<()> {
    let cli = parse_args(args)?;
    match cli.command.as_deref() {
        Some("race") => run_race_command(&cli).await,
        Some("heatmap") => run_heatmap_command(&cli).await,
        Some("properties") => {
            print_properties();
            Ok(())
        }
        Some(other) => bail!("unknown command '{}'\n\n{}", other, usage()),
        None => bail!("missing command\n\n{}", usage()),
    }
}

fn usage() -> String {
    format!(
        "animated_charts v{}\n\
         usage:\n  \
           animated_charts race --data <csv> [options]\n  \
           animated_charts heatmap [--ticks <n>] [--hover <x,y>] [options]\n  \
           animated_charts properties\n\
         options:\n  \
           --out <dir>           frame directory (default: frames/<chart>)\n  \
           --properties <json>   JSON object of property values\n  \
           --set <name=value>    override one property (repeatable)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Parse command-line arguments
fn parse_args(args: &[String]) -> anyhow::Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--data", Some(v)) => {
                cli.data = Some(PathBuf::from(v));
                i += 2;
            }
            ("--out", Some(v)) => {
                cli.out = Some(PathBuf::from(v));
                i += 2;
            }
            ("--properties", Some(v)) => {
                cli.properties = Some(PathBuf::from(v));
                i += 2;
            }
            ("--set", Some(v)) => {
                let (name, value) = v
                    .split_once('=')
                    .with_context(|| format!("--set expects name=value, got '{}'", v))?;
                cli.overrides
                    .push((name.trim().to_string(), value.trim().to_string()));
                i += 2;
            }
            ("--ticks", Some(v)) => {
                cli.ticks = Some(
                    v.parse::<u64>()
                        .with_context(|| format!("--ticks expects a count, got '{}'", v))?,
                );
                i += 2;
            }
            ("--hover", Some(v)) => {
                cli.hover = Some(parse_point(v)?);
                i += 2;
            }
            (flag, None) if flag.starts_with("--") => bail!("{} expects a value", flag),
            (flag, _) if flag.starts_with("--") => bail!("unknown option {}", flag),
            (command, _) => {
                if cli.command.is_some() {
                    bail!("unexpected argument '{}'", command);
                }
                cli.command = Some(command.to_string());
                i += 1;
            }
        }
    }
    Ok(cli)
}

/// `x,y` in scene pixels
fn parse_point(text: &str) -> anyhow::Result<(f64, f64)> {
    let (x, y) = text
        .split_once(',')
        .with_context(|| format!("--hover expects x,y, got '{}'", text))?;
    let x: f64 = x.trim().parse().context("invalid x coordinate")?;
    let y: f64 = y.trim().parse().context("invalid y coordinate")?;
    Ok((x, y))
}

/// Defaults overlaid with the property file and `--set` values
fn load_properties(cli: &CliArgs) -> anyhow::Result<PropertyReader> {
    let mut props = match &cli.properties {
        Some(path) => PropertyReader::from_json_file(path)
            .with_context(|| format!("failed to read properties from {}", path.display()))?,
        None => PropertyReader::default(),
    };
    for (name, value) in &cli.overrides {
        props.set(name.as_str(), value.as_str());
    }
    Ok(props)
}

/// Frame directory unless output is disabled
fn open_surface(
    cli: &CliArgs,
    render: &RenderConfig,
    chart: &str,
) -> anyhow::Result<Option<FrameDirectory>> {
    if render.output == OutputMode::None {
        tracing::info!("frame output disabled");
        return Ok(None);
    }
    let dir = cli
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from("frames").join(chart));
    let frames = FrameDirectory::create(&dir)
        .with_context(|| format!("failed to create frame directory {}", dir.display()))?;
    tracing::info!(dir = %dir.display(), "writing frames");
    Ok(Some(frames))
}

async fn run_race_command(cli: &CliArgs) -> anyhow::Result<()> {
    let props = load_properties(cli)?;
    let config = RaceConfig::from_properties(&props);
    let render = RenderConfig::from_properties(&props);

    let path = cli.data.as_ref().context("race needs --data <csv>")?;
    let dataset = BrandDataset::load(path)
        .with_context(|| format!("failed to load race data from {}", path.display()))?;
    tracing::info!(
        records = dataset.len(),
        brands = dataset.names().len(),
        coerced = dataset.coerced(),
        "loaded race data"
    );

    let mut surface = open_surface(cli, &render, "race")?;
    let mut chart = RaceChart::new(config, dataset);
    let summary = run_race(&mut chart, surface.as_mut(), render.frame_interval).await?;
    print_summary("race", &summary);
    Ok(())
}

async fn run_heatmap_command(cli: &CliArgs) -> anyhow::Result<()> {
    let props = load_properties(cli)?;
    let config = HeatmapConfig::from_properties(&props);
    let render = RenderConfig::from_properties(&props);

    let mut generator = LoadGenerator::new(config.seed, config.value_max);
    let mut surface = open_surface(cli, &render, "heatmap")?;
    let mut chart = Heatmap::new(config);
    if cli.ticks.is_none() {
        tracing::info!("no --ticks given, refreshing until interrupted");
    }

    let summary = run_heatmap(
        &mut chart,
        &mut generator,
        surface.as_mut(),
        render.frame_interval,
        cli.ticks,
        cli.hover,
    )
    .await?;
    print_summary("heatmap", &summary);
    Ok(())
}

fn print_summary(chart: &str, summary: &RunSummary) {
    println!(
        "✓ {}: {} ticks, {} frames in {:.1}s",
        chart,
        summary.ticks,
        summary.frames,
        summary.elapsed.as_secs_f64()
    );
}

fn print_properties() {
    let registry = registry();
    for name in registry.names() {
        if let Some(def) = registry.get_property(name) {
            let default = if def.default_value.is_empty() {
                "(unset)"
            } else {
                def.default_value.as_str()
            };
            println!("{:<22} {:<12} {}", name, default, def.description);
            if let Some(values) = &def.valid_values {
                println!("{:<22} one of: {}", "", values.join(", "));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("animated_charts")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_race_args() {
        let cli = parse_args(&args(&[
            "race",
            "--data",
            "brands.csv",
            "--set",
            "race.top.n=5",
            "--out",
            "out",
        ]))
        .unwrap();
        assert_eq!(cli.command.as_deref(), Some("race"));
        assert_eq!(cli.data, Some(PathBuf::from("brands.csv")));
        assert_eq!(cli.out, Some(PathBuf::from("out")));
        assert_eq!(
            cli.overrides,
            vec![("race.top.n".to_string(), "5".to_string())]
        );
    }

    #[test]
    fn test_parse_heatmap_args() {
        let cli = parse_args(&args(&["heatmap", "--ticks", "3", "--hover", "60, 440"])).unwrap();
        assert_eq!(cli.ticks, Some(3));
        assert_eq!(cli.hover, Some((60.0, 440.0)));
    }

    #[test]
    fn test_bad_args_are_errors() {
        assert!(parse_args(&args(&["race", "--data"])).is_err());
        assert!(parse_args(&args(&["race", "--bogus", "x"])).is_err());
        assert!(parse_args(&args(&["heatmap", "--ticks", "many"])).is_err());
        assert!(parse_args(&args(&["heatmap", "--set", "novalue"])).is_err());
        assert!(parse_args(&args(&["race", "heatmap"])).is_err());
    }

    #[test]
    fn test_overrides_reach_config() {
        let cli = parse_args(&args(&["race", "--set", "race.top.n=3"])).unwrap();
        let props = load_properties(&cli).unwrap();
        assert_eq!(RaceConfig::from_properties(&props).top_n, 3);
    }
}
