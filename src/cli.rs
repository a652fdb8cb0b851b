//! Command-line argument parsing
//!
//! Supports:
//! - Choosing the store file and config file
//! - Choosing the scope (global, or a ruleset layout variant)
//! - Inspecting, editing and watching the effective bindings

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::BindingError;
use crate::scope::{RulesetId, RulesetInfo, Scope};

/// Inspect and edit input bindings
#[derive(Parser, Debug)]
#[command(name = "rebind", version, about = "Inspect and edit input bindings")]
pub struct CliArgs {
    /// Binding store file (defaults to ~/.config/rebind/bindings.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Config file (defaults to ~/.config/rebind/config.yaml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Ruleset short name; omit for global bindings
    #[arg(long, value_name = "NAME", global = true)]
    pub ruleset: Option<String>,

    /// Durable ruleset id; without it the ruleset is treated as transient
    #[arg(long, value_name = "ID", global = true)]
    pub ruleset_id: Option<i64>,

    /// Layout variant (required with --ruleset)
    #[arg(long, value_name = "N", global = true)]
    pub variant: Option<i32>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Print the effective bindings
    Show {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Persist an override binding
    Bind {
        /// Key combination, e.g. ctrl+shift+s
        combination: String,
        /// Action name, e.g. SaveAs
        action: String,
    },
    /// Remove override bindings for a combination
    Unbind { combination: String },
    /// Replace the scope's overrides with the defaults
    Reset,
    /// Print the actions a held combination triggers
    Press { combination: String },
    /// Print the effective bindings every time they change
    Watch,
}

impl CliArgs {
    /// The scope selected by `--ruleset`, `--ruleset-id` and `--variant`
    pub fn scope(&self) -> Result<Scope, BindingError> {
        let ruleset = self.ruleset.as_ref().map(|name| match self.ruleset_id {
            Some(id) => RulesetInfo::new(RulesetId(id), name.clone()),
            None => RulesetInfo::transient(name.clone()),
        });
        Scope::new(ruleset, self.variant)
    }
}
