//! FluxWatch CLI
//!
//! Command-line front end for the resource dashboard client.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use fluxwatch::resource::{DraftField, Resource};
use fluxwatch::view::ViewState;
use fluxwatch::{load_config, Config, FluxwatchBuilder};
use tracing::Level;

#[derive(Parser)]
#[command(name = "fluxwatch")]
#[command(about = "Register and watch monitored resources")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config file)
    #[arg(long, env = "FLUXWATCH_BACKEND_URL")]
    backend_url: Option<String>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch resources once and print them
    List {
        /// Only show resources whose name, type, region or url contains this
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Register a new resource
    Add {
        #[arg(long)]
        name: String,
        /// URL or connection string
        #[arg(long)]
        url: String,
        /// website, api, server, database or service
        #[arg(long = "type", default_value = "website")]
        kind: String,
        /// auto, us-east, eu-west or ap-south
        #[arg(long, default_value = "auto")]
        region: String,
    },
    /// Keep the list in sync and print it whenever it changes
    Watch {
        #[arg(short, long, default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    tracing::debug!(
        "Parsed command line arguments: config={:?}, backend_url={:?}, log_level={:?}",
        args.config,
        args.backend_url,
        args.log_level
    );

    let mut config = if let Some(config_path) = &args.config {
        tracing::debug!("Loading configuration from {:?}", config_path);
        load_config(config_path)?
    } else {
        tracing::debug!("Using default configuration");
        Config::default()
    };

    if let Some(backend_url) = args.backend_url {
        config.backend_url = backend_url;
    }

    let app = FluxwatchBuilder::new(config).build()?;

    let cancel_for_signal = app.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            cancel_for_signal.cancel();
        }
    });

    match args.command {
        Command::List { query } => {
            let resources = app.list(&query).await?;
            print_resources(&resources);
        }
        Command::Add {
            name,
            url,
            kind,
            region,
        } => {
            let mut onboarding = app.onboarding();
            onboarding.set_field(DraftField::Name, &name);
            onboarding.set_field(DraftField::Url, &url);
            onboarding.set_field(DraftField::Type, &kind);
            onboarding.set_field(DraftField::Region, &region);
            let result = onboarding.submit().await;
            if let Some(message) = onboarding.message() {
                println!("{}", message);
            }
            result?;
        }
        Command::Watch { query } => {
            let view = app.mount().await;
            view.set_query(query).await;
            let mut changes = view.changes();
            let cancel = app.cancellation_token().clone();
            let mut last = None;
            loop {
                let state = view.state().await;
                if state != ViewState::Loading {
                    let rows = view.filtered().await;
                    if last.as_ref() != Some(&(state.clone(), rows.clone())) {
                        print_view(&state, &rows);
                        last = Some((state, rows));
                    }
                }
                tokio::select! {
                    changed = changes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = cancel.cancelled() => break,
                }
            }
            view.unmount().await;
        }
    }

    Ok(())
}

fn print_view(state: &ViewState, rows: &[Resource]) {
    match state {
        ViewState::Empty => {
            println!("No resources yet. Add your first one with `fluxwatch add`.");
        }
        ViewState::Error(message) => {
            eprintln!("{}", message);
            print_resources(rows);
        }
        _ => print_resources(rows),
    }
}

fn print_resources(rows: &[Resource]) {
    if rows.is_empty() {
        println!("No matching resources.");
        return;
    }
    println!("{:<10} {:<24} {:<10} {:<10} URL", "ID", "NAME", "TYPE", "REGION");
    for resource in rows {
        let kind = resource.kind.clone().unwrap_or_default();
        println!(
            "{:<10} {:<24} {:<10} {:<10} {}",
            resource.short_id(),
            resource.name,
            kind.label(),
            resource.display_region(),
            resource.url
        );
    }
}
