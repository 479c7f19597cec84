// CLI Layer
// ユーザー入力の受付とコマンドルーティング

pub mod command_context;
pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Schemadoc - Database schema documentation core
///
/// Merges declared relations and comments into an introspected schema
/// snapshot and emits a deterministically ordered JSON document.
#[derive(Parser, Debug)]
#[command(name = "schemadoc")]
#[command(author = "Schemadoc Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Database schema documentation core")]
#[command(long_about = "Schemadoc - Database schema documentation core

Takes a schema snapshot produced by database introspection, merges
relations and comments declared in YAML files, sorts every collection
by name and writes a reproducible JSON document for renderers.")]
#[command(propagate_version = true)]
#[command(after_help = "GETTING STARTED:
  1. Export your database schema to schema.json
  2. Declare extra relations/comments:  edit schemadoc.yml
  3. Build the document:                schemadoc doc -a schemadoc.yml -o docs/schema.json
  4. Check consistency:                 schemadoc check -a schemadoc.yml")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the sorted schema document
    ///
    /// Loads the schema snapshot, merges every additional data file in
    /// order, sorts the schema and writes it as JSON.
    ///
    /// EXAMPLES:
    ///   # Print to stdout
    ///   schemadoc doc --schema schema.json --additional relations.yml
    ///
    ///   # Write to a file
    ///   schemadoc doc -o docs/schema.json
    Doc {
        /// Schema snapshot (JSON)
        #[arg(short, long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Additional data file (YAML), may be repeated
        #[arg(short, long, value_name = "FILE")]
        additional: Vec<PathBuf>,

        /// Output file (stdout when omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Check that additional data merges cleanly
    ///
    /// Runs the same pipeline as `doc` without writing anything and
    /// reports structural problems in the resulting schema.
    ///
    /// EXAMPLES:
    ///   schemadoc check --additional relations.yml
    Check {
        /// Schema snapshot (JSON)
        #[arg(short, long, value_name = "FILE")]
        schema: Option<PathBuf>,

        /// Additional data file (YAML), may be repeated
        #[arg(short, long, value_name = "FILE")]
        additional: Vec<PathBuf>,
    },
}
