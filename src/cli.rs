//! CLI argument parsing for the content-lake tooling.
//!
//! Store selection flags are global so they can follow any subcommand.
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "scpb-migrate",
    version,
    about = "Schema checks and data migrations for the scpb content lake",
    after_help = "Commands:\n  migrate              Convert team member names to localized objects\n  check                Validate published documents against the schemas\n  schema               Print the studio configuration and schemas as JSON\n\nExamples:\n  SANITY_AUTH_TOKEN=... scpb-migrate migrate\n  scpb-migrate migrate --dry-run --dataset-file export/production.ndjson\n  scpb-migrate check --type teamMember\n  scpb-migrate schema --type exportStatistics",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Emit debug logs on stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Where documents are read from and committed to.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    /// JSON config file with project_id, dataset, api_version, timeout_secs
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Content lake project id
    #[arg(long, global = true, value_name = "ID")]
    pub project_id: Option<String>,

    /// Dataset name
    #[arg(long, global = true, value_name = "NAME")]
    pub dataset: Option<String>,

    /// HTTP API version date, e.g. 2024-01-01
    #[arg(long, global = true, value_name = "DATE")]
    pub api_version: Option<String>,

    /// Use a local NDJSON dataset export instead of the hosted API
    #[arg(long, global = true, value_name = "FILE")]
    pub dataset_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Migrate(MigrateArgs),
    Check(CheckArgs),
    Schema(SchemaArgs),
}

/// Team member name migration.
#[derive(Parser, Debug)]
#[command(about = "Convert team member names from strings to localized objects")]
pub struct MigrateArgs {
    /// Show the planned patches without committing them
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the migration report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Schema validation of published documents.
#[derive(Parser, Debug)]
#[command(about = "Validate published documents against the schema catalog")]
pub struct CheckArgs {
    /// Only check this document type
    #[arg(long = "type", value_name = "NAME")]
    pub type_name: Option<String>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

/// Schema catalog dump.
#[derive(Parser, Debug)]
#[command(about = "Print the studio configuration and schema catalog as JSON")]
pub struct SchemaArgs {
    /// Only print this document type
    #[arg(long = "type", value_name = "NAME")]
    pub type_name: Option<String>,
}
