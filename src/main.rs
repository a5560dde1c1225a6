// Richrule - Main Entry Point
// Copyright (C) 2026 Christos Daggas
// SPDX-License-Identifier: MIT

//! Richrule - inspect and manage firewalld rich rules from the command line.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser as ClapParser, Subcommand};
use tracing_subscriber::EnvFilter;

use richrule::config::Settings;
use richrule::firewall::FirewallClient;
use richrule::{Parser, RejectMode, Rule};

#[derive(Debug, ClapParser)]
#[command(name = "richrule", version, about = "Inspect and manage firewalld rich rules")]
struct Cli {
    /// How `reject` clauses are parsed (compat or keyed)
    #[arg(long, global = true, env = "RICHRULE_REJECT_MODE")]
    reject_mode: Option<RejectMode>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse rich rules and print them in canonical form
    Parse {
        /// Rich rule text, one rule per argument
        #[arg(required = true)]
        rules: Vec<String>,
        /// Print the parsed rules as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render a JSON rule descriptor as rich rule text
    Render {
        /// The rule as JSON, e.g. '{"family":"ipv4","accept":{"flag":true}}'
        json: String,
    },
    /// List the rich rules of a zone
    List {
        /// Zone name (defaults to the configured or firewalld default zone)
        zone: Option<String>,
        /// Read the permanent configuration instead of the runtime one
        #[arg(long)]
        permanent: bool,
        /// Print the rules as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a rich rule to a zone
    Add(Change),
    /// Remove a rich rule from a zone
    Remove(Change),
    /// Check whether a rich rule is active in a zone
    Query(Change),
    /// Reload the firewalld configuration
    Reload,
}

#[derive(Debug, Args)]
struct Change {
    /// Rich rule text
    rule: String,
    /// Zone name (defaults to the configured or firewalld default zone)
    #[arg(long)]
    zone: Option<String>,
    /// Also change the permanent configuration (query checks only the permanent one)
    #[arg(long)]
    permanent: bool,
    /// Lifetime of a runtime rule in seconds
    #[arg(long)]
    timeout: Option<i32>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("richrule: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let settings = Settings::load();
    let parser = Parser::new(cli.reject_mode.unwrap_or(settings.reject_mode));

    match cli.command {
        Command::Parse { rules, json } => {
            let rules = parser
                .parse_all(&rules)
                .map_err(|(index, err)| anyhow::anyhow!("{}: {}", rules[index], err))?;
            print_rules(&rules, json)?;
        }
        Command::Render { json } => {
            let rule: Rule = serde_json::from_str(&json).context("Invalid rule descriptor")?;
            println!("{}", rule);
        }
        Command::List {
            zone,
            permanent,
            json,
        } => {
            let client = FirewallClient::connect_system(parser)?;
            let zone = resolve_zone(&client, zone, &settings)?;
            let rules = if permanent || settings.permanent {
                client.permanent_rich_rules(&zone)?
            } else {
                client.rich_rules(&zone)?
            };
            print_rules(&rules, json)?;
        }
        Command::Add(change) => {
            let rule = parser.parse(&change.rule)?;
            let client = FirewallClient::connect_system(parser)?;
            let zone = resolve_zone(&client, change.zone, &settings)?;
            let timeout = change.timeout.unwrap_or(settings.timeout);
            client.apply_rich_rule(&zone, &rule, timeout, change.permanent || settings.permanent)?;
        }
        Command::Remove(change) => {
            let rule = parser.parse(&change.rule)?;
            let client = FirewallClient::connect_system(parser)?;
            let zone = resolve_zone(&client, change.zone, &settings)?;
            client.revoke_rich_rule(&zone, &rule, change.permanent || settings.permanent)?;
        }
        Command::Query(change) => {
            let rule = parser.parse(&change.rule)?;
            let client = FirewallClient::connect_system(parser)?;
            let zone = resolve_zone(&client, change.zone, &settings)?;
            let enabled = if change.permanent || settings.permanent {
                client.permanent_query_rich_rule(&zone, &rule)?
            } else {
                client.query_rich_rule(&zone, &rule)?
            };
            println!("{}", if enabled { "yes" } else { "no" });
            if !enabled {
                return Ok(ExitCode::from(1));
            }
        }
        Command::Reload => {
            FirewallClient::connect_system(parser)?.reload()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn resolve_zone(client: &FirewallClient, zone: Option<String>, settings: &Settings) -> Result<String> {
    match zone.or_else(|| settings.zone.clone()) {
        Some(zone) => Ok(zone),
        None => client.default_zone(),
    }
}

fn print_rules(rules: &[Rule], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rules)?);
    } else {
        for rule in rules {
            println!("{}", rule);
        }
    }
    Ok(())
}
