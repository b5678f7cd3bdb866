//! Subcommand implementations.
//!
//! Every editing command opens the named circuit, applies one edit through a
//! [`Session`] and saves it back. Components are addressed by label, by full
//! id, or by an unambiguous id prefix.

use std::fmt::Write;
use std::ops::Range;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow, bail};
use circuitry_config::{Settings, persist_history_limit};
use circuitry_core::{
    CancelToken, CircuitStore, ExportOutcome, Netlist, Overwrite, Progress, Row, Session, Settle,
    Simulator, TickClock, TruthTable, VirtualTable, default_file_name, export_csv_file,
};
use circuitry_types::{Circuit, Component, ComponentId, GateKind, HistoryLimit, PinRef};

/// Shortest id prefix accepted when addressing a component.
const MIN_ID_PREFIX: usize = 4;

pub struct App {
    pub settings: Settings,
    pub store: CircuitStore,
}

impl App {
    fn open(&self, name: &str) -> Result<Session> {
        let mut session = Session::new(self.store.clone(), self.settings.history);
        session
            .open(name)
            .with_context(|| format!("failed to open circuit '{name}'"))?;
        Ok(session)
    }
}

pub fn list(app: &App) -> Result<()> {
    let names = app.store.list()?;
    if names.is_empty() {
        eprintln!(
            "No saved circuits in {}",
            app.store.circuits_dir().display()
        );
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

pub fn new(app: &App, name: &str, force: bool) -> Result<()> {
    let mut session = Session::new(app.store.clone(), app.settings.history);
    session.edit(|circuit| {
        circuit.settings.sim_fps = app.settings.tick_rate.fps();
        Ok(())
    })?;
    let overwrite = if force {
        Overwrite::Allow
    } else {
        Overwrite::Deny
    };
    let path = session
        .save_as(name, overwrite)
        .context("use --force to replace an existing circuit")?;
    println!("Created {}", path.display());
    Ok(())
}

pub struct AddArgs {
    pub kind: String,
    pub size: Option<u8>,
    pub label: Option<String>,
    pub at: (f64, f64),
}

pub fn add(app: &App, circuit: &str, args: AddArgs) -> Result<()> {
    let mut kind = GateKind::from_display_name(&args.kind)
        .or_else(|| GateKind::from_class_name(&args.kind))
        .ok_or_else(|| {
            anyhow!(
                "unknown component kind '{}' (expected and, or, not, xor, nand, nor, xnor, \
                 mux, demux, encoder, decoder, input or led)",
                args.kind
            )
        })?;
    if let Some(size) = args.size {
        kind = kind.with_size(size)?;
    }

    let mut session = app.open(circuit)?;
    let (x, y) = args.at;
    let id = session.edit(|c| {
        let id = c.add_component(kind, x, y)?;
        if let Some(label) = args.label {
            c.set_label(id, Some(label))?;
        }
        Ok(id)
    })?;
    session.save()?;
    println!("{id}");
    Ok(())
}

pub fn connect(app: &App, circuit: &str, from: &str, to: &str) -> Result<()> {
    let mut session = app.open(circuit)?;
    let (src_name, src_pin) = split_endpoint(from);
    let (dst_name, dst_pin) = split_endpoint(to);
    let src = find_component(session.circuit(), src_name)?.id;
    let dst = find_component(session.circuit(), dst_name)?.id;

    session.edit(|c| c.connect(PinRef::new(src, src_pin), PinRef::new(dst, dst_pin)))?;
    session.save()?;
    println!("Connected {src_name}:{src_pin} -> {dst_name}:{dst_pin}");
    Ok(())
}

pub fn remove(app: &App, circuit: &str, component: &str) -> Result<()> {
    let mut session = app.open(circuit)?;
    let target = find_component(session.circuit(), component)?;
    let (id, name) = (target.id, describe(target));

    session.edit(|c| c.remove_component(id))?;
    session.save()?;
    println!("Removed {name}");
    Ok(())
}

pub fn toggle(app: &App, circuit: &str, input: &str) -> Result<()> {
    let mut session = app.open(circuit)?;
    let target = find_component(session.circuit(), input)?;
    let (id, name) = (target.id, describe(target));

    let state = session.edit(|c| c.toggle_input(id))?;
    session.save()?;
    println!("{name} = {}", bit(state));
    Ok(())
}

pub fn label(app: &App, circuit: &str, component: &str, text: Option<String>) -> Result<()> {
    let mut session = app.open(circuit)?;
    let id = find_component(session.circuit(), component)?.id;

    session.edit(|c| c.set_label(id, text))?;
    session.save()?;
    Ok(())
}

pub fn info(app: &App, circuit: &str) -> Result<()> {
    let session = app.open(circuit)?;
    let c = session.circuit();

    println!("{}", session.title());
    if let Some(path) = session.file() {
        println!("  file:        {}", path.display());
    }
    println!("  components:  {}", c.components().len());
    println!("  connections: {}", c.connections().len());
    println!("  annotations: {}", c.annotations().len());
    println!("  sim fps:     {}", c.settings.tick_rate().fps());

    println!("Inputs:");
    for input in c.inputs() {
        let state = input.input_state().unwrap_or(false);
        println!("  {} = {}", describe(input), bit(state));
    }
    println!("Outputs:");
    for led in c.leds() {
        println!("  {}", describe(led));
    }

    let looped = Netlist::compile(c).cyclic_components();
    if looped.is_empty() {
        println!("No feedback loops");
    } else {
        let names: Vec<String> = looped
            .iter()
            .filter_map(|&id| c.component(id))
            .map(describe)
            .collect();
        println!(
            "Feedback loops affect {} components: {}",
            names.len(),
            names.join(", ")
        );
    }
    Ok(())
}

/// How long `simulate` runs.
pub enum RunFor {
    /// Until no output changes, bounded by the component count.
    Settle,
    /// Exactly this many ticks, as fast as possible.
    Ticks(u64),
    /// Wall-clock time, paced at the circuit's tick rate.
    Duration(Duration),
}

pub fn simulate(
    app: &App,
    circuit: &str,
    run_for: RunFor,
    assignments: &[(String, bool)],
) -> Result<()> {
    let session = app.open(circuit)?;
    let c = session.circuit();
    let mut sim = Simulator::new(c);
    for (name, value) in assignments {
        let id = find_component(c, name)?.id;
        sim.set_input(id, *value)?;
    }

    match run_for {
        RunFor::Ticks(n) => sim.run(n),
        RunFor::Settle => match sim.settle(c.components().len() + 1) {
            Settle::Stable { passes } => tracing::debug!(passes, "Circuit settled"),
            Settle::Oscillating => {
                eprintln!(
                    "warning: circuit is still changing after {} ticks",
                    sim.ticks()
                );
            }
        },
        RunFor::Duration(duration) => {
            let rate = c.settings.tick_rate();
            let ran = run_paced(&mut sim, TickClock::new(rate), duration);
            tracing::info!(ticks = ran, fps = rate.fps(), "Paced run finished");
        }
    }

    for (id, value) in sim.led_states() {
        let name = c.component(id).map_or_else(|| id.to_string(), describe);
        println!("{name} = {}", bit(value));
    }
    Ok(())
}

/// Step `sim` in real time for `duration`, one frame interval at a time.
fn run_paced(sim: &mut Simulator, mut clock: TickClock, duration: Duration) -> u64 {
    let start = Instant::now();
    let mut last = start;
    let mut ran = 0;
    while start.elapsed() < duration {
        let remaining = duration.saturating_sub(start.elapsed());
        thread::sleep(clock.interval().min(remaining));
        let now = Instant::now();
        ran += clock.advance(now - last, sim);
        last = now;
    }
    ran
}

pub fn table(
    app: &App,
    circuit: &str,
    outputs: &[String],
    rows: Option<Range<u64>>,
    yes: bool,
) -> Result<()> {
    let session = app.open(circuit)?;
    // A page of rows is cheap however many inputs there are.
    let table = build_table(app, &session, outputs, yes || rows.is_some())?;

    let headers: Vec<String> = table.headers().map(str::to_owned).collect();
    let inputs = table.input_count();
    let widths: Vec<usize> = headers.iter().map(|h| h.chars().count().max(1)).collect();
    let print_row = |row: &Row| {
        let cells: Vec<&str> = row.cells().map(bit).collect();
        let mut line = format_line(cells.into_iter(), &widths, inputs);
        if !row.stable {
            line.push_str("  *");
        }
        println!("{line}");
        !row.stable
    };

    println!("{}", format_line(headers.iter().map(String::as_str), &widths, inputs));
    let mut unstable = 0u64;
    match rows {
        Some(range) => {
            let mut view = VirtualTable::new(table, app.settings.table.cache_size());
            let total = view.row_count();
            if range.start >= total {
                bail!("row {} is past the end of a {total}-row table", range.start);
            }
            for index in range.start..range.end.min(total) {
                let (row, _) = view.row(index)?;
                unstable += u64::from(print_row(row));
            }
        }
        None => {
            let mut table = table;
            for row in table.rows() {
                unstable += u64::from(print_row(&row));
            }
        }
    }
    if unstable > 0 {
        eprintln!("* {unstable} rows did not settle; values shown after the last pass");
    }
    Ok(())
}

pub fn export(
    app: &App,
    circuit: &str,
    outputs: &[String],
    dir: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    let session = app.open(circuit)?;
    let mut table = build_table(app, &session, outputs, yes)?;
    let dir = dir.unwrap_or_else(|| app.settings.export_dir());
    let file_name = default_file_name(&table);

    let mut next_report = 10;
    let report = |p: Progress| {
        let percent = p.rows_done.saturating_mul(100) / p.total.max(1);
        tracing::debug!(rows = p.rows_done, total = p.total, "Export chunk written");
        if percent >= next_report {
            tracing::info!("Export {percent}% ({}/{} rows)", p.rows_done, p.total);
            next_report = (percent / 10 + 1) * 10;
        }
    };
    let outcome = export_csv_file(
        &mut table,
        &dir,
        &file_name,
        app.settings.table.export_chunk_rows(),
        &CancelToken::new(),
        report,
    )?;

    match outcome {
        ExportOutcome::Completed { rows } => {
            println!("Exported {rows} rows to {}", dir.join(&file_name).display());
            Ok(())
        }
        ExportOutcome::Cancelled { rows } => bail!("export cancelled after {rows} rows"),
    }
}

pub fn set_history_limit(limit: usize) -> Result<()> {
    let limit = HistoryLimit::new(limit);
    persist_history_limit(limit)?;
    println!("History limit set to {}", limit.get());
    Ok(())
}

fn build_table(
    app: &App,
    session: &Session,
    outputs: &[String],
    yes: bool,
) -> Result<TruthTable> {
    let ids = outputs
        .iter()
        .map(|name| find_component(session.circuit(), name).map(|c| c.id))
        .collect::<Result<Vec<ComponentId>>>()?;
    let table = session.truth_table(&ids)?;

    let threshold = app.settings.table.confirm_threshold();
    if table.needs_confirmation(threshold) && !yes {
        bail!(
            "{} inputs give {} rows (more than 2^{threshold}); pass --yes to continue",
            table.input_count(),
            table.row_count()
        );
    }
    if !table.is_combinational() {
        eprintln!("note: outputs depend on a feedback loop; each row starts from all-low state");
    }
    Ok(table)
}

/// `name:pin` -> (`name`, pin). A missing or non-numeric suffix means pin 0.
fn split_endpoint(endpoint: &str) -> (&str, usize) {
    endpoint
        .rsplit_once(':')
        .and_then(|(name, pin)| Some((name, pin.trim().parse().ok()?)))
        .unwrap_or((endpoint, 0))
}

fn find_component<'a>(circuit: &'a Circuit, query: &str) -> Result<&'a Component> {
    let query = query.trim();
    if let Some(found) = circuit.find_by_label(query) {
        return Ok(found);
    }
    if let Ok(id) = query.parse::<ComponentId>() {
        return circuit
            .component(id)
            .ok_or_else(|| anyhow!("no component with id {id}"));
    }
    if query.len() >= MIN_ID_PREFIX {
        let mut matches = circuit
            .components()
            .iter()
            .filter(|c| c.id.to_string().starts_with(query));
        if let Some(first) = matches.next() {
            if matches.next().is_some() {
                bail!("id prefix '{query}' is ambiguous");
            }
            return Ok(first);
        }
    }
    bail!("no component labelled or identified by '{query}'")
}

fn describe(component: &Component) -> String {
    match component.label() {
        Some(label) => label.to_owned(),
        None => {
            let id = component.id.to_string();
            format!("{} {}", component.kind, &id[..8.min(id.len())])
        }
    }
}

fn bit(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Cells padded to their column widths, with a bar between inputs and outputs.
fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize], inputs: usize) -> String {
    let mut line = String::new();
    for (i, (cell, width)) in cells.zip(widths).enumerate() {
        if i == inputs {
            line.push_str(" | ");
        } else if i > 0 {
            line.push(' ');
        }
        let _ = write!(line, "{cell:>width$}");
    }
    line
}
