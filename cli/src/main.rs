//! Circuitry CLI - build, simulate and tabulate logic circuits from the shell.
//!
//! # Commands
//!
//! - `circuitry list` - saved circuits
//! - `circuitry new <name>` - create an empty circuit
//! - `circuitry add|connect|remove|toggle|label <circuit> ...` - edit a circuit
//! - `circuitry info <circuit>` - summary and feedback-loop report
//! - `circuitry simulate <circuit>` - run ticks and print LED values
//! - `circuitry table <circuit>` - print the truth table, or a page of it
//! - `circuitry export <circuit>` - write the truth table as CSV
//!
//! Circuits are named files in the save directory (see `--save-dir` and
//! `~/.circuitry/config.toml`); a path to a YAML file works anywhere a name
//! does.

mod commands;
mod logging;

use std::ops::Range;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};

use circuitry_config::Settings;
use circuitry_core::CircuitStore;

use commands::{AddArgs, App, RunFor};

#[derive(Parser)]
#[command(name = "circuitry")]
#[command(about = "Digital logic circuits: simulation, truth tables and CSV export")]
#[command(version)]
struct Cli {
    /// Directory holding saved circuits (overrides the configured one)
    #[arg(long, global = true)]
    save_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved circuits
    List,
    /// Create an empty circuit
    New {
        name: String,
        /// Replace an existing circuit with the same name
        #[arg(long)]
        force: bool,
    },
    /// Place a component and print its id
    Add {
        circuit: String,
        /// and, or, not, xor, nand, nor, xnor, mux, demux, encoder, decoder,
        /// input or led
        kind: String,
        /// Input count (gates, encoder, decoder) or select bits (mux, demux)
        #[arg(long)]
        size: Option<u8>,
        #[arg(long)]
        label: Option<String>,
        /// Canvas position as X,Y
        #[arg(long, value_parser = parse_point, default_value = "0,0")]
        at: (f64, f64),
    },
    /// Wire an output pin to an input pin: `SRC[:OUT] DST[:IN]`
    Connect {
        circuit: String,
        from: String,
        to: String,
    },
    /// Remove a component and its wires
    Remove { circuit: String, component: String },
    /// Flip an input switch
    Toggle { circuit: String, input: String },
    /// Set or clear a component label
    Label {
        circuit: String,
        component: String,
        /// New label; omit to clear
        text: Option<String>,
    },
    /// Show counts, inputs, outputs and feedback loops
    Info { circuit: String },
    /// Simulate and print LED values
    Simulate {
        circuit: String,
        /// Run exactly this many ticks instead of running until stable
        #[arg(long)]
        ticks: Option<u64>,
        /// Run in real time for this many milliseconds at the circuit's tick rate
        #[arg(long, conflicts_with = "ticks")]
        duration_ms: Option<u64>,
        /// Override a switch for this run: LABEL=0|1
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, bool)>,
    },
    /// Print the truth table for some or all LEDs
    Table {
        circuit: String,
        /// LED to include (repeatable; default: all LEDs)
        #[arg(long = "output")]
        outputs: Vec<String>,
        /// Only rows START..END (zero-based, end exclusive)
        #[arg(long, value_parser = parse_rows)]
        rows: Option<Range<u64>>,
        /// Enumerate large tables without asking
        #[arg(long)]
        yes: bool,
    },
    /// Export the truth table as CSV
    Export {
        circuit: String,
        #[arg(long = "output")]
        outputs: Vec<String>,
        /// Destination directory (default: configured export dir or Downloads)
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        yes: bool,
    },
    /// Persist the undo history limit in config.toml
    SetHistoryLimit { limit: usize },
}

fn parse_point(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{raw}'"))?;
    let x = x.trim().parse().map_err(|_| format!("invalid X in '{raw}'"))?;
    let y = y.trim().parse().map_err(|_| format!("invalid Y in '{raw}'"))?;
    Ok((x, y))
}

fn parse_rows(raw: &str) -> Result<Range<u64>, String> {
    let (start, end) = raw
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{raw}'"))?;
    let start: u64 = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid START in '{raw}'"))?;
    let end: u64 = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid END in '{raw}'"))?;
    if end <= start {
        return Err(format!("empty row range '{raw}'"));
    }
    Ok(start..end)
}

fn parse_assignment(raw: &str) -> Result<(String, bool), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=0|1, got '{raw}'"))?;
    let value = match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "high" => true,
        "0" | "false" | "off" | "low" => false,
        other => return Err(format!("invalid switch value '{other}'")),
    };
    Ok((name.trim().to_owned(), value))
}

fn main() -> Result<()> {
    logging::init_tracing();

    let cli = Cli::parse();
    let settings = Settings::load();
    let store = match &cli.save_dir {
        Some(dir) => CircuitStore::new(dir),
        None => CircuitStore::from_settings(&settings),
    };
    let app = App { settings, store };

    let result = match cli.command {
        Commands::List => commands::list(&app),
        Commands::New { name, force } => commands::new(&app, &name, force),
        Commands::Add {
            circuit,
            kind,
            size,
            label,
            at,
        } => commands::add(
            &app,
            &circuit,
            AddArgs {
                kind,
                size,
                label,
                at,
            },
        ),
        Commands::Connect { circuit, from, to } => commands::connect(&app, &circuit, &from, &to),
        Commands::Remove { circuit, component } => commands::remove(&app, &circuit, &component),
        Commands::Toggle { circuit, input } => commands::toggle(&app, &circuit, &input),
        Commands::Label {
            circuit,
            component,
            text,
        } => commands::label(&app, &circuit, &component, text),
        Commands::Info { circuit } => commands::info(&app, &circuit),
        Commands::Simulate {
            circuit,
            ticks,
            duration_ms,
            set,
        } => {
            let run_for = match (ticks, duration_ms) {
                (Some(n), _) => RunFor::Ticks(n),
                (None, Some(ms)) => RunFor::Duration(Duration::from_millis(ms)),
                (None, None) => RunFor::Settle,
            };
            commands::simulate(&app, &circuit, run_for, &set)
        }
        Commands::Table {
            circuit,
            outputs,
            rows,
            yes,
        } => commands::table(&app, &circuit, &outputs, rows, yes),
        Commands::Export {
            circuit,
            outputs,
            dir,
            yes,
        } => commands::export(&app, &circuit, &outputs, dir, yes),
        Commands::SetHistoryLimit { limit } => commands::set_history_limit(limit),
    };

    if let Err(err) = &result {
        tracing::error!("{err:#}");
    }
    result
}
