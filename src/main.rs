mod cli;
mod status;

use crate::cli::{Cli, Command};
use crate::status::Status;
use clap::Parser;
use miette::{IntoDiagnostic, MietteDiagnostic, Report, Result};
use std::error::Error;
use tracing_subscriber::EnvFilter;
use wheelhouse_catalog::{Catalog, Database};
use wheelhouse_config::Config;

/// Flatten an error tree into a diagnostic: the outermost error becomes the
/// message and every frame below it is listed, indented by depth, with the
/// location it was raised at.
fn report<E: Error + Send + Sync + 'static>(err: exn::Exn<E>) -> Report {
    let frame = err.frame();
    let mut causes = Vec::new();
    collect_causes(frame, 0, &mut causes);
    let diagnostic = MietteDiagnostic::new(frame.error().to_string());
    if causes.is_empty() {
        Report::new(diagnostic)
    } else {
        Report::new(diagnostic.with_help(causes.join("\n")))
    }
}

fn collect_causes(frame: &exn::Frame, depth: usize, out: &mut Vec<String>) {
    for child in frame.children() {
        let location = child.location();
        out.push(format!(
            "{}{} (at {}:{})",
            "  ".repeat(depth),
            child.error(),
            location.file(),
            location.line()
        ));
        collect_causes(child, depth + 1, out);
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = wheelhouse_config::load(cli.config.as_deref()).map_err(report)?;
    init_tracing(&config);

    if let Some(parent) = config.database.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    tracing::debug!(database = %config.database.display(), "opening catalog");
    let db = Database::connect(&config.database).await.map_err(report)?;
    let catalog = Catalog::from(&db);

    let result = run(&catalog, &config, cli.command).await;
    db.close().await;
    result
}

async fn run(catalog: &Catalog, config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Queue { max_size } => {
            let max_size = max_size.or(config.queue.max_artifact_size);
            for artifact in catalog.pending_artifacts(max_size).await.map_err(report)? {
                println!("{}\t{}\t{}", artifact.filename, artifact.size, artifact.url);
            }
        },
        Command::Purge => {
            let purged = catalog.purge_old_versions().await.map_err(report)?;
            for purged in &purged {
                println!("{} {}", purged.project, purged.version.display_name);
            }
            tracing::info!(count = purged.len(), "purge complete");
        },
        Command::Status => {
            let status = Status::collect(catalog, config.orphans.max_age()).await.map_err(report)?;
            println!("{status}");
        },
    }
    Ok(())
}
