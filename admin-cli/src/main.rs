mod api;

use anyhow::bail;
use clap::{Parser, Subcommand};
use hacknight_gateway::registration::{ConfigProvider, FileConfigProvider, RegistrationConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "hacknight-admin")]
#[command(about = "Admin CLI for the Hacknight registration gateway")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage provisioned keys through a running gateway
    Keys {
        /// Gateway base URL
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
        /// Admin shared secret
        #[arg(long, env = "HACKNIGHT_ADMIN__TOKEN", hide_env_values = true)]
        token: Option<String>,
        #[command(subcommand)]
        action: KeysAction,
    },
    /// Read or toggle the registration flag
    Registration {
        #[command(subcommand)]
        action: RegistrationAction,
    },
}

#[derive(Subcommand)]
enum KeysAction {
    /// Print every provisioned key, disabled ones included
    List,
    /// Disable every enabled key
    DisableAll,
    /// Permanently delete every key
    DeleteAll {
        /// Required, since this cannot be undone
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RegistrationAction {
    /// Show the flag stored in the local file
    Status {
        #[arg(long, env = "HACKNIGHT_REGISTRATION__CONFIG_PATH", default_value = "config/registration.json")]
        path: PathBuf,
    },
    /// Open public registration
    Enable {
        #[arg(long, env = "HACKNIGHT_REGISTRATION__CONFIG_PATH", default_value = "config/registration.json")]
        path: PathBuf,
    },
    /// Close public registration
    Disable {
        #[arg(long, env = "HACKNIGHT_REGISTRATION__CONFIG_PATH", default_value = "config/registration.json")]
        path: PathBuf,
    },
    /// Ask a running gateway whether registration is open
    Remote {
        #[arg(long, default_value = "http://localhost:3000")]
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hacknight_admin=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keys { url, token, action } => {
            let client = api::GatewayClient::new(&url, token);
            let body = match action {
                KeysAction::List => client.list_keys().await?,
                KeysAction::DisableAll => client.disable_all().await?,
                KeysAction::DeleteAll { yes } => {
                    if !yes {
                        bail!("refusing to delete every key without --yes");
                    }
                    client.delete_all().await?
                }
            };
            print_json(&body)
        }
        Commands::Registration { action } => match action {
            RegistrationAction::Status { path } => {
                let config = FileConfigProvider::new(path).load().await;
                print_json(&serde_json::to_value(config)?)
            }
            RegistrationAction::Enable { path } => set_registration(path, true).await,
            RegistrationAction::Disable { path } => set_registration(path, false).await,
            RegistrationAction::Remote { url } => {
                let body = api::GatewayClient::new(&url, None)
                    .registration_status()
                    .await?;
                print_json(&body)
            }
        },
    }
}

async fn set_registration(path: PathBuf, enabled: bool) -> anyhow::Result<()> {
    let provider = FileConfigProvider::new(path);
    provider
        .store(RegistrationConfig {
            registration_enabled: enabled,
        })
        .await?;
    info!(
        "Registration {} in {}",
        if enabled { "enabled" } else { "disabled" },
        provider.path().display()
    );
    Ok(())
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
