//! Stormline CLI
//!
//! Command-line interface for the stormline engine: alert scoring,
//! queue admission, district fan-out and resource-to-demand
//! assignment, driven by JSON feeds.
//!
//! # Usage
//!
//! ```bash
//! # Rank an alert feed by priority
//! stormline score alerts.json --top 10
//!
//! # Admit a feed into the queue and show the collapsed view
//! stormline queue alerts.json
//!
//! # Match demands to resources
//! stormline allocate --demands demands.json --resources resources.json
//!
//! # Publish a feed to district desks
//! stormline publish alerts.json --listen Castries --listen All
//! ```

use clap::{Parser, Subcommand};

pub mod commands;

/// Stormline Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "stormline")]
#[command(author, version, about = "Disaster alert prioritization and resource assignment")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank an alert feed by priority
    Score(commands::ScoreArgs),

    /// Admit an alert feed into the priority queue
    Queue(commands::QueueArgs),

    /// Match demands to resources at minimum total cost
    Allocate(commands::AllocateArgs),

    /// Publish an alert feed to district desks
    Publish(commands::PublishArgs),

    /// Display version information
    Version,
}
