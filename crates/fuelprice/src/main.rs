use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fuelprice_core::{
    filter_states, latest_value, load_prepared, metric_card, series_to_json, state_series,
    DashboardConfig, PreparedTable, PERCENT_CHANGE_FORMULA,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(author, version, about = "Fuel price dashboard for Brazilian states", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Dataset path, overriding configuration and environment
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Headline cards plus one selected state
    Summary(SummaryArgs),
    /// Price and change over the window for one state
    Metrics(MetricsArgs),
    /// Price series for several states, as JSON for charting
    Compare(CompareArgs),
    /// Current price of two states side by side
    Latest(LatestArgs),
    /// States present in the prepared table
    States,
}

#[derive(Args, Debug, Default)]
struct SummaryArgs {
    /// Selected state; the first state in the table when omitted
    #[arg(long)]
    state: Option<String>,
}

#[derive(Args, Debug)]
struct MetricsArgs {
    state: String,
    /// Print how the change is computed
    #[arg(long)]
    explain: bool,
}

#[derive(Args, Debug, Default)]
struct CompareArgs {
    /// States to compare; the configured defaults when omitted
    states: Vec<String>,
    /// Compare nothing, ignoring the configured defaults
    #[arg(long, conflicts_with = "states")]
    none: bool,
    /// Write the series here instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LatestArgs {
    first: String,
    second: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let table = load_prepared(&config).with_context(|| {
        format!(
            "failed to load dataset from '{}'",
            config.dataset.path.display()
        )
    })?;

    match cli.command {
        Command::Summary(args) => handle_summary(&table, &config, args),
        Command::Metrics(args) => handle_metrics(&table, args),
        Command::Compare(args) => handle_compare(&table, &config, args),
        Command::Latest(args) => handle_latest(&table, args),
        Command::States => {
            let states = table.states()?;
            println!("{}", render::state_list(&states));
            Ok(())
        }
    }
}

fn resolve_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut config = match &cli.config {
        Some(path) => DashboardConfig::from_path(path)
            .with_context(|| format!("failed to load config '{}'", path.display()))?,
        None => DashboardConfig::default(),
    };
    config
        .apply_env_overrides()
        .context("invalid FUELPRICE_* environment override")?;
    if let Some(path) = &cli.dataset {
        config.dataset.path = path.clone();
    }
    Ok(config)
}

fn handle_summary(table: &PreparedTable, config: &DashboardConfig, args: SummaryArgs) -> Result<()> {
    let selected = summary_selection(args.state, &table.states()?);

    let mut cards: Vec<_> = config
        .headline_states
        .iter()
        .map(|state| metric_card(table, state))
        .collect();
    match selected {
        Some(state) => cards.push(metric_card(table, &state)),
        None => warn!("prepared table has no states to select"),
    }

    println!("{}", render::metric_cards(&cards));
    Ok(())
}

fn handle_metrics(table: &PreparedTable, args: MetricsArgs) -> Result<()> {
    let card = metric_card(table, &args.state);
    println!("{}", render::metric_cards(std::slice::from_ref(&card)));
    if args.explain {
        println!("\n{PERCENT_CHANGE_FORMULA}");
    }
    Ok(())
}

fn handle_compare(table: &PreparedTable, config: &DashboardConfig, args: CompareArgs) -> Result<()> {
    let Some(selection) = comparison_selection(args.none, args.states, &config.comparison_states)
    else {
        info!("no states selected; skipping comparison chart");
        return Ok(());
    };

    let selected = filter_states(table, &selection)?;
    let series = state_series(&selected)?;
    let json = series_to_json(&series)?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write series to '{}'", path.display()))?;
            info!(
                path = %path.display(),
                states = series.len(),
                rows = selected.height(),
                "wrote comparison series"
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// The explicit state wins; otherwise the first state of the table.
fn summary_selection(requested: Option<String>, available: &[String]) -> Option<String> {
    requested.or_else(|| available.first().cloned())
}

/// States to chart, or `None` when rendering should be skipped. `--none` and an
/// empty default list both skip; explicit states win over the defaults.
fn comparison_selection(
    none: bool,
    requested: Vec<String>,
    defaults: &[String],
) -> Option<Vec<String>> {
    let selection = if none {
        Vec::new()
    } else if requested.is_empty() {
        defaults.to_vec()
    } else {
        requested
    };
    (!selection.is_empty()).then_some(selection)
}

fn handle_latest(table: &PreparedTable, args: LatestArgs) -> Result<()> {
    let rows: Vec<(String, Option<f64>)> = [args.first, args.second]
        .into_iter()
        .map(|state| match latest_value(table, &state) {
            Ok(value) => (state, Some(value)),
            Err(err) => {
                warn!(state = %state, error = %err, "latest price unavailable");
                (state, None)
            }
        })
        .collect();
    println!("{}", render::latest_prices(&rows));
    Ok(())
}
