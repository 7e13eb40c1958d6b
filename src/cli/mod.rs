// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// 出力フォーマット
#[derive(Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Structured JSON output
    Json,
}

/// stratum-reconcile - Schema reconciliation for PostgreSQL
///
/// Keeps live tables in line with declared models.
#[derive(Parser, Debug)]
#[command(name = "stratum-reconcile")]
#[command(author = "Stratum Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Schema reconciliation CLI for PostgreSQL")]
#[command(long_about = "stratum-reconcile - Schema reconciliation for PostgreSQL

Declare models in YAML and let the engine bring live tables in line:
  • automigrate drops and recreates tables from the model definitions
  • autoupdate applies only the differences (types, nullability, defaults)
  • discover shows the live columns and their decoded defaults
  • check reports models whose tables are out of date")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Write .stratum-reconcile.yaml with a database environment
  2. Declare models in the models/ directory
  3. Preview changes:      stratum-reconcile autoupdate --dry-run
  4. Apply changes:        stratum-reconcile autoupdate
  5. Verify:               stratum-reconcile check

For detailed help on each command, use: stratum-reconcile <command> --help")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Target environment
    #[arg(short, long, global = true, value_name = "ENV", default_value = "development")]
    pub env: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Output format (text or json)
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Drop and recreate tables from model definitions
    ///
    /// Every column default is applied as its own statement so a rejected
    /// default names the offending column.
    ///
    /// EXAMPLES:
    ///   # Recreate every model
    ///   stratum-reconcile automigrate
    ///
    ///   # Recreate a single model
    ///   stratum-reconcile automigrate SimpleEmployee
    Automigrate {
        /// Models to recreate (all models when omitted)
        #[arg(value_name = "MODEL")]
        models: Vec<String>,
    },

    /// Apply the differences between models and live tables
    ///
    /// EXAMPLES:
    ///   # Update every model
    ///   stratum-reconcile autoupdate
    ///
    ///   # Show planned DDL without executing it
    ///   stratum-reconcile autoupdate --dry-run
    Autoupdate {
        /// Models to update (all models when omitted)
        #[arg(value_name = "MODEL")]
        models: Vec<String>,

        /// Dry run - show SQL without executing
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the live columns of a table
    ///
    /// EXAMPLES:
    ///   stratum-reconcile discover simpleemployee
    ///   stratum-reconcile discover accounts --schema billing --format json
    Discover {
        /// Table name
        #[arg(value_name = "TABLE")]
        table: String,

        /// Schema name (defaults to the configured schema)
        #[arg(short, long, value_name = "SCHEMA")]
        schema: Option<String>,
    },

    /// Check whether live tables match the models
    ///
    /// Exits with a non-zero status when any model has pending changes.
    Check {
        /// Models to check (all models when omitted)
        #[arg(value_name = "MODEL")]
        models: Vec<String>,
    },
}
