mod cli;
mod export;
mod history;
mod persistence;
mod simulation;
mod truth_table;
