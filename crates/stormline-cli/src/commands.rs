//! Stormline CLI subcommands
//!
//! This module provides CLI commands for working with alert feeds and
//! resource registries exported as JSON:
//! - Scoring and ranking alert feeds
//! - Queue admission with redundancy collapse
//! - Resource-to-demand assignment
//! - A hub demo that publishes a feed to district desks

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};
use tokio::time::sleep;

use stormline_engine::{
    priority, Alert, AlertHub, AlertQueue, Allocator, AllocatorConfig, Demand, DistrictSubscriber,
    EngineError, Resource, Severity,
};

use crate::Commands;

/// Arguments for the score command
#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Path to a JSON file holding an array of alerts
    pub file: PathBuf,

    /// Include alerts marked inactive
    #[arg(short, long)]
    pub all: bool,

    /// Show only the first N ranked alerts
    #[arg(short, long)]
    pub top: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the queue command
#[derive(Args, Debug)]
pub struct QueueArgs {
    /// Path to a JSON file holding an array of alerts
    pub file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the allocate command
#[derive(Args, Debug)]
pub struct AllocateArgs {
    /// Path to a JSON file holding an array of demands
    #[arg(short, long)]
    pub demands: PathBuf,

    /// Path to a JSON file holding an array of resources
    #[arg(short, long)]
    pub resources: PathBuf,

    /// Expand multi-unit demands into single units before matching
    #[arg(long)]
    pub fan_out: bool,

    /// Override the distance weight in the cost model
    #[arg(long)]
    pub distance_weight: Option<f64>,

    /// Override the load weight in the cost model
    #[arg(long)]
    pub load_weight: Option<f64>,

    /// Override the urgency weight in the cost model
    #[arg(long)]
    pub urgency_weight: Option<f64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Path to a JSON file holding an array of alerts
    pub file: PathBuf,

    /// District desk to register before publishing (repeatable)
    #[arg(short, long, value_name = "DISTRICT")]
    pub listen: Vec<String>,

    /// Delay between published alerts in milliseconds
    #[arg(short, long, default_value = "250")]
    pub interval: u64,
}

/// Output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    /// Pretty table output
    #[default]
    Table,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

// ============================================================================
// Display Structs for Tables
// ============================================================================

/// Ranked alert display row for tables
#[derive(Tabled, Serialize, Deserialize)]
struct ScoreRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Type")]
    hazard: String,
    #[tabled(rename = "District")]
    district: String,
    #[tabled(rename = "Title")]
    title: String,
}

/// Queue entry display row for tables
#[derive(Tabled, Serialize, Deserialize)]
struct QueueRow {
    #[tabled(rename = "Rank")]
    rank: usize,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Type")]
    hazard: String,
    #[tabled(rename = "District")]
    district: String,
    #[tabled(rename = "Title")]
    title: String,
}

/// Assignment display row for tables
#[derive(Tabled, Serialize, Deserialize)]
struct AssignmentRow {
    #[tabled(rename = "Demand")]
    demand: String,
    #[tabled(rename = "Resource")]
    resource: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Distance")]
    distance: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute a top-level command
pub async fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Score(args) => execute_score(args).await,
        Commands::Queue(args) => execute_queue(args).await,
        Commands::Allocate(args) => execute_allocate(args).await,
        Commands::Publish(args) => execute_publish(args).await,
        Commands::Version => execute_version(),
    }
}

/// Execute the score command
async fn execute_score(args: ScoreArgs) -> Result<()> {
    let mut alerts: Vec<Alert> = load_json(&args.file)?;
    if !args.all {
        alerts.retain(|alert| alert.active);
    }

    let mut ranked = rank_alerts(alerts);
    if let Some(top) = args.top {
        ranked.truncate(top);
    }

    let rows: Vec<ScoreRow> = ranked
        .iter()
        .enumerate()
        .map(|(index, (priority, alert))| ScoreRow {
            rank: index + 1,
            priority: format!("{priority:.1}"),
            severity: format_severity(&alert.severity),
            hazard: alert.alert_type.to_string(),
            district: alert.district.to_string(),
            title: alert.title.clone(),
        })
        .collect();

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Compact => {
            for row in &rows {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    row.rank, row.priority, row.severity, row.hazard, row.district, row.title
                );
            }
        }
        OutputFormat::Table => {
            println!("{}", "Ranked Alerts".bold().cyan());
            println!("{}", "=".repeat(70));

            if rows.is_empty() {
                println!("No active alerts in {}.", args.file.display());
            } else {
                let high = count_severity(&ranked, Severity::High);
                let medium = count_severity(&ranked, Severity::Medium);
                let low = count_severity(&ranked, Severity::Low);

                println!(
                    "Total: {} | {} {} | {} {} | {} {}",
                    rows.len().to_string().bold(),
                    "HIGH:".red().bold(),
                    high,
                    "MEDIUM:".yellow().bold(),
                    medium,
                    "LOW:".green().bold(),
                    low
                );
                println!();

                let table = Table::new(rows).with(Style::rounded()).to_string();
                println!("{}", table);
            }
        }
    }

    Ok(())
}

/// Execute the queue command
async fn execute_queue(args: QueueArgs) -> Result<()> {
    let alerts: Vec<Alert> = load_json(&args.file)?;
    let admitted = alerts.len();

    let mut queue = AlertQueue::new();
    for alert in alerts {
        queue.enqueue(alert);
    }

    let rows: Vec<QueueRow> = queue
        .ranked()
        .enumerate()
        .map(|(index, (alert, priority))| queue_row(index + 1, alert, priority))
        .collect();

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Compact => {
            for row in &rows {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    row.rank, row.priority, row.hazard, row.district, row.title
                );
            }
        }
        OutputFormat::Table => {
            println!("{}", "Alert Queue".bold().cyan());
            println!("{}", "=".repeat(70));

            if rows.is_empty() {
                println!("Queue is empty.");
            } else {
                println!(
                    "Admitted: {} | Entries after collapse: {}",
                    admitted.to_string().bold(),
                    rows.len().to_string().bold()
                );
                println!();

                let table = Table::new(rows).with(Style::rounded()).to_string();
                println!("{}", table);
            }
        }
    }

    Ok(())
}

/// Execute the allocate command
async fn execute_allocate(args: AllocateArgs) -> Result<()> {
    let demands: Vec<Demand> = load_json(&args.demands)?;
    let resources: Vec<Resource> = load_json(&args.resources)?;

    let demands: Vec<Demand> = if args.fan_out {
        demands.into_iter().flat_map(Demand::fan_out).collect()
    } else {
        demands
    };

    let allocator = Allocator::with_config(build_config(&args));
    let assignments = allocator.allocate(&demands, &resources)?;

    let demand_index: HashMap<&str, &Demand> = demands
        .iter()
        .map(|demand| (demand.id.as_str(), demand))
        .collect();
    let resource_index: HashMap<i64, &Resource> = resources
        .iter()
        .map(|resource| (resource.id.value(), resource))
        .collect();

    // Join each assignment back to its demand and resource records
    let mut resolved = Vec::with_capacity(assignments.len());
    for assignment in &assignments {
        if let (Some(demand), Some(resource)) = (
            demand_index.get(assignment.demand_id.as_str()),
            resource_index.get(&assignment.resource_id.value()),
        ) {
            resolved.push(ResolvedAssignment {
                demand,
                resource,
                distance_km: demand.location.distance_km(&resource.location),
                cost: assignment.cost,
            });
        }
    }

    let served: HashSet<&str> = assignments
        .iter()
        .map(|assignment| assignment.demand_id.as_str())
        .collect();
    let unserved: Vec<&Demand> = demands
        .iter()
        .filter(|demand| !served.contains(demand.id.as_str()))
        .collect();

    let total_cost: f64 = resolved.iter().map(|pair| pair.cost).sum();
    let max_distance = resolved
        .iter()
        .map(|pair| pair.distance_km)
        .fold(0.0, f64::max);

    match args.format {
        OutputFormat::Json => {
            #[derive(Serialize)]
            struct AssignmentExport {
                demand_id: String,
                resource_id: i64,
                resource_name: String,
                distance_km: f64,
                cost: f64,
            }

            #[derive(Serialize)]
            struct AllocationExport {
                generated_at: DateTime<Utc>,
                assigned: usize,
                total_cost: f64,
                unserved: Vec<String>,
                assignments: Vec<AssignmentExport>,
            }

            let export = AllocationExport {
                generated_at: Utc::now(),
                assigned: resolved.len(),
                total_cost,
                unserved: unserved
                    .iter()
                    .map(|demand| demand.id.to_string())
                    .collect(),
                assignments: resolved
                    .iter()
                    .map(|pair| AssignmentExport {
                        demand_id: pair.demand.id.to_string(),
                        resource_id: pair.resource.id.value(),
                        resource_name: pair.resource.name.clone(),
                        distance_km: pair.distance_km,
                        cost: pair.cost,
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&export)?);
        }
        OutputFormat::Compact => {
            for pair in &resolved {
                println!(
                    "{}\t{}\t{:.1}\t{:.3}",
                    pair.demand.id,
                    pair.resource.id,
                    pair.distance_km,
                    pair.cost
                );
            }
        }
        OutputFormat::Table => {
            println!("{}", "Resource Assignments".bold().cyan());
            println!("{}", "=".repeat(70));

            if resolved.is_empty() {
                println!("No assignments.");
            } else {
                println!(
                    "Assigned: {}/{} | Total cost: {} | Farthest dispatch: {}",
                    resolved.len().to_string().green().bold(),
                    demands.len(),
                    format!("{total_cost:.3}").bold(),
                    format!("{max_distance:.1} km").bold()
                );
                println!();

                let rows: Vec<AssignmentRow> = resolved
                    .iter()
                    .map(|pair| AssignmentRow {
                        demand: pair.demand.id.to_string(),
                        resource: format!("{} (#{})", pair.resource.name, pair.resource.id),
                        kind: pair.resource.resource_type.to_string(),
                        distance: format!("{:.1} km", pair.distance_km),
                        cost: format!("{:.3}", pair.cost),
                    })
                    .collect();
                let table = Table::new(rows).with(Style::rounded()).to_string();
                println!("{}", table);
            }

            if !unserved.is_empty() {
                println!();
                println!(
                    "{} {} demand(s) left unserved:",
                    "[WARN]".yellow().bold(),
                    unserved.len()
                );
                for demand in &unserved {
                    println!(
                        "  - {} ({}, {} unit(s), urgency {:.2})",
                        demand.id.to_string().yellow(),
                        demand.resource_type,
                        demand.quantity,
                        demand.urgency
                    );
                }
            }
        }
    }

    Ok(())
}

/// Execute the publish command
async fn execute_publish(args: PublishArgs) -> Result<()> {
    let alerts: Vec<Alert> = load_json(&args.file)?;
    let hub = AlertHub::new();

    let mut desks = args.listen.clone();
    if desks.is_empty() {
        desks.push("All".to_string());
    }

    let mut subscriptions = Vec::with_capacity(desks.len());
    for desk in &desks {
        let subscriber = Arc::new(ConsoleSubscriber::new(format!("{desk} desk")));
        subscriptions.push(hub.subscribe(desk.as_str(), subscriber));
    }

    println!(
        "{} Publishing {} alert(s) to {} desk(s)...",
        "[HUB]".bright_cyan().bold(),
        alerts.len(),
        subscriptions.len()
    );
    println!();

    let published = alerts.len();
    for alert in alerts {
        hub.publish(alert);
        if args.interval > 0 {
            sleep(Duration::from_millis(args.interval)).await;
        }
    }

    // Let the delivery workers drain before the summary
    sleep(Duration::from_millis(200)).await;

    println!();
    println!("{}", "Queue After Intake".bold().cyan());
    println!("{}", "=".repeat(70));

    let ranked = hub.ranked_snapshot();
    if ranked.is_empty() {
        println!("Queue is empty.");
    } else {
        println!(
            "Published: {} | Entries after collapse: {}",
            published.to_string().bold(),
            ranked.len().to_string().bold()
        );
        println!();

        let rows: Vec<QueueRow> = ranked
            .iter()
            .enumerate()
            .map(|(index, (alert, priority))| queue_row(index + 1, alert, *priority))
            .collect();
        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
    }

    Ok(())
}

/// Print CLI and engine versions
fn execute_version() -> Result<()> {
    println!("stormline {}", env!("CARGO_PKG_VERSION"));
    println!("Engine version: {}", stormline_engine::VERSION);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// One assignment joined back to its demand and resource records
struct ResolvedAssignment<'a> {
    demand: &'a Demand,
    resource: &'a Resource,
    distance_km: f64,
    cost: f64,
}

/// Score and order alerts: highest priority first, newest first among
/// equals.
fn rank_alerts(alerts: Vec<Alert>) -> Vec<(f64, Alert)> {
    let mut ranked: Vec<(f64, Alert)> = alerts
        .into_iter()
        .map(|alert| (priority(&alert), alert))
        .collect();
    ranked.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| b.1.created_at.cmp(&a.1.created_at))
    });
    ranked
}

/// Count ranked alerts at one severity level
fn count_severity(ranked: &[(f64, Alert)], severity: Severity) -> usize {
    ranked
        .iter()
        .filter(|(_, alert)| alert.severity == severity)
        .count()
}

/// Build the allocator config, applying any weight overrides
fn build_config(args: &AllocateArgs) -> AllocatorConfig {
    let mut builder = AllocatorConfig::builder();
    if let Some(weight) = args.distance_weight {
        builder = builder.distance_weight(weight);
    }
    if let Some(weight) = args.load_weight {
        builder = builder.load_weight(weight);
    }
    if let Some(weight) = args.urgency_weight {
        builder = builder.urgency_weight(weight);
    }
    builder.build()
}

/// Build one queue display row
fn queue_row(rank: usize, alert: &Alert, priority: f64) -> QueueRow {
    QueueRow {
        rank,
        priority: format!("{priority:.1}"),
        hazard: alert.alert_type.to_string(),
        district: alert.district.to_string(),
        title: alert.title.clone(),
    }
}

/// Format a severity level with its conventional color
fn format_severity(severity: &Severity) -> String {
    match severity {
        Severity::High => "High".red().bold().to_string(),
        Severity::Medium => "Medium".yellow().to_string(),
        Severity::Low => "Low".green().to_string(),
    }
}

/// Load and parse a JSON input file
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    tracing::debug!(path = %path.display(), "loading JSON input");
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let parsed = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(parsed)
}

/// Subscriber that prints deliveries to the console
struct ConsoleSubscriber {
    name: String,
}

impl ConsoleSubscriber {
    fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl DistrictSubscriber for ConsoleSubscriber {
    fn name(&self) -> &str {
        &self.name
    }

    async fn on_alert(&self, alert: &Alert) -> Result<(), EngineError> {
        println!(
            "{} {} {} in {} | {}",
            format!("[{}]", self.name).bright_cyan().bold(),
            format_severity(&alert.severity),
            alert.alert_type,
            alert.district,
            alert.title.dimmed()
        );
        Ok(())
    }
}
