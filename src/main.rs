use anyhow::{anyhow, Context, Result};
use clap::Parser;
use scpb_migrate::check::{check_all, render_reports};
use scpb_migrate::cli::{CheckArgs, Command, MigrateArgs, RootArgs, SchemaArgs, StoreArgs};
use scpb_migrate::config::{ConfigOverrides, StudioConfig, TOKEN_ENV};
use scpb_migrate::migration::{RunOptions, TEAM_MEMBER_NAMES};
use scpb_migrate::schema::{self, DocumentSchema};
use scpb_migrate::store::{DocumentStore, HttpStore, NdjsonStore};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for `check` when documents violate their schema.
const EXIT_VIOLATIONS: u8 = 2;

fn main() -> ExitCode {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    let failure_label = match args.command {
        Command::Migrate(_) => "migration failed",
        _ => "error",
    };
    let result = match args.command {
        Command::Migrate(cmd) => cmd_migrate(&args.store, cmd),
        Command::Check(cmd) => cmd_check(&args.store, cmd),
        Command::Schema(cmd) => cmd_schema(cmd),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("\n{failure_label}: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,scpb_migrate=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn open_store(args: &StoreArgs) -> Result<Box<dyn DocumentStore>> {
    if let Some(path) = &args.dataset_file {
        let store = NdjsonStore::open(path)
            .with_context(|| format!("open dataset export {}", path.display()))?;
        tracing::info!(path = %store.path().display(), "using local dataset export");
        return Ok(Box::new(store));
    }

    let overrides = ConfigOverrides {
        config_path: args.config.clone(),
        project_id: args.project_id.clone(),
        dataset: args.dataset.clone(),
        api_version: args.api_version.clone(),
    };
    let config = StudioConfig::load(&overrides)?;
    tracing::info!(
        project_id = %config.project_id,
        dataset = %config.dataset,
        api_version = %config.api_version,
        authenticated = config.token.is_some(),
        "using hosted content lake"
    );
    if config.token.is_none() {
        tracing::warn!("{TOKEN_ENV} is not set; drafts are hidden and mutations will be rejected");
    }
    Ok(Box::new(HttpStore::new(&config)))
}

fn cmd_migrate(store_args: &StoreArgs, args: MigrateArgs) -> Result<ExitCode> {
    let mut store = open_store(store_args)?;
    if !args.json {
        println!("Fetching {}...", TEAM_MEMBER_NAMES.label);
    }

    let report = TEAM_MEMBER_NAMES.run(
        store.as_mut(),
        RunOptions {
            dry_run: args.dry_run,
        },
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.summary());
        println!("\nDone!");
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_check(store_args: &StoreArgs, args: CheckArgs) -> Result<ExitCode> {
    let schemas = match &args.type_name {
        Some(name) => vec![find_schema(name)?],
        None => schema::catalog(),
    };
    let store = open_store(store_args)?;
    let reports = check_all(store.as_ref(), &schemas)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print!("{}", render_reports(&reports));
    }

    if reports.iter().all(|report| report.is_clean()) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_VIOLATIONS))
    }
}

fn cmd_schema(args: SchemaArgs) -> Result<ExitCode> {
    let json = match &args.type_name {
        Some(name) => serde_json::to_string_pretty(&find_schema(name)?)?,
        None => serde_json::to_string_pretty(&schema::studio())?,
    };
    println!("{json}");
    Ok(ExitCode::SUCCESS)
}

fn find_schema(name: &str) -> Result<DocumentSchema> {
    schema::find(name).ok_or_else(|| {
        let known = schema::catalog()
            .iter()
            .map(|schema| schema.name)
            .collect::<Vec<_>>()
            .join(", ");
        anyhow!("unknown document type: {name} (expected one of {known})")
    })
}
