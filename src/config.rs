// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Configuration management for router instances
//!
//! Supports both command-line arguments and TOML configuration files; CLI
//! values override file values. A router without a configured parent is the
//! domain root.

use crate::dispatch::{DrainOrder, SweepConfig};
use crate::error::ConfigError;
use crate::identity::NodeIdentity;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Command-line arguments for the arbor router.
#[derive(Parser, Debug, Default)]
#[command(name = "arbor")]
#[command(author = "Arbor Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Hierarchical overlay multicast router", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Router node name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Address to bind the UDP transport (e.g. "0.0.0.0:7000")
    #[arg(long, value_name = "ADDR:PORT")]
    pub bind: Option<String>,

    /// Parent router locator; omit on the domain root
    #[arg(long, value_name = "ADDR:PORT")]
    pub parent_addr: Option<String>,

    /// Parent router node name; required alongside --parent-addr
    #[arg(long, value_name = "NAME")]
    pub parent_id: Option<String>,

    /// Mailbox drain order: lifo (default) or fifo
    #[arg(long, value_name = "ORDER")]
    pub drain_order: Option<DrainOrder>,

    /// Tentative link TTL in seconds; 0 disables expiry
    #[arg(long, value_name = "SECS")]
    pub tentative_ttl_secs: Option<u64>,

    /// Interval between tentative link sweeps in seconds
    #[arg(long, value_name = "SECS")]
    pub sweep_interval_secs: Option<u64>,
}

/// TOML configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub router: RouterSection,
    #[serde(default)]
    pub parent: Option<ParentSection>,
    #[serde(default)]
    pub dispatch: DispatchSection,
}

/// Router section of config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterSection {
    pub name: String,
    pub bind: String,
}

/// Parent section of config; absent on the domain root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParentSection {
    pub addr: String,
    pub name: String,
}

/// Dispatch section of config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchSection {
    #[serde(default)]
    pub drain_order: DrainOrder,
    /// Tentative link TTL in seconds; 0 disables expiry.
    #[serde(default = "default_tentative_ttl")]
    pub tentative_ttl_secs: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_tentative_ttl() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    30
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            drain_order: DrainOrder::default(),
            tentative_ttl_secs: default_tentative_ttl(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

/// Fully resolved router configuration.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub name: String,
    pub bind: String,
    pub parent: Option<ParentSection>,
    pub drain_order: DrainOrder,
    pub tentative_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl RouterConfig {
    /// Resolves configuration from CLI arguments and optional TOML file,
    /// with CLI values taking precedence.
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                Some(toml::from_str::<TomlConfig>(&content)?)
            }
            None => None,
        };

        let name = args
            .name
            .clone()
            .or_else(|| file.as_ref().map(|f| f.router.name.clone()))
            .ok_or_else(|| ConfigError::Invalid("router name not set".to_string()))?;

        let bind = args
            .bind
            .clone()
            .or_else(|| file.as_ref().map(|f| f.router.bind.clone()))
            .ok_or_else(|| ConfigError::Invalid("bind address not set".to_string()))?;

        let parent = match (&args.parent_addr, &args.parent_id) {
            (Some(addr), Some(id)) => Some(ParentSection {
                addr: addr.clone(),
                name: id.clone(),
            }),
            (Some(_), None) | (None, Some(_)) => {
                return Err(ConfigError::Invalid(
                    "parent requires both --parent-addr and --parent-id".to_string(),
                ));
            }
            (None, None) => file.as_ref().and_then(|f| f.parent.clone()),
        };

        let dispatch = file.map(|f| f.dispatch).unwrap_or_default();

        Ok(Self {
            name,
            bind,
            parent,
            drain_order: args.drain_order.unwrap_or(dispatch.drain_order),
            tentative_ttl_secs: args
                .tentative_ttl_secs
                .unwrap_or(dispatch.tentative_ttl_secs),
            sweep_interval_secs: args
                .sweep_interval_secs
                .unwrap_or(dispatch.sweep_interval_secs),
        })
    }

    /// Parent identity, if this router is not the domain root.
    pub fn parent_identity(&self) -> Option<NodeIdentity> {
        self.parent
            .as_ref()
            .map(|p| NodeIdentity::new(p.addr.clone(), p.name.clone()))
    }

    /// Expiry settings for the dispatch loop.
    pub fn sweep_config(&self) -> SweepConfig {
        SweepConfig {
            tentative_ttl: match self.tentative_ttl_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
        }
    }
}
