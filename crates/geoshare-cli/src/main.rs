mod convert;
mod executor;
mod prompt;

use clap::{Parser, Subcommand};
use geoshare_core::{Automation, Permission};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "geoshare")]
#[command(about = "Convert map links and coordinates into positions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a map link, geo: URI or coordinates
    Convert {
        /// Text containing the link; multiple arguments are joined with spaces
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
        /// Whether to connect to map services (always, ask, never)
        #[arg(long)]
        permission: Option<Permission>,
        /// Automation to run on success (e.g. copy-geo-uri, open-app:net.osmand)
        #[arg(long)]
        automation: Option<Automation>,
        /// Print the position as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the supported map services
    Inputs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut config = geoshare_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert {
            text,
            permission,
            automation,
            json,
        } => {
            if let Some(permission) = permission {
                config.connection_permission = permission;
            }
            if let Some(automation) = automation {
                config.automation = automation;
            }

            let cancel = CancellationToken::new();
            tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

            let text = text.join(" ");
            if !convert::run_convert(&config, &text, json, cancel).await? {
                std::process::exit(1);
            }
        }
        Commands::Inputs => list_inputs(),
    }

    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::info!("received ctrl-c, cancelling");
        cancel.cancel();
    }
}

fn list_inputs() {
    println!("{:<16}{:<22}EXAMPLE", "ID", "SERVICE");
    for input in &geoshare_inputs::INPUTS {
        println!(
            "{:<16}{:<22}{}",
            input.id.to_string(),
            input.name,
            input.examples.first().copied().unwrap_or("\u{2014}")
        );
    }
}
