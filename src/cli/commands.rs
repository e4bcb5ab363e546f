//! CLI commands and argument parsing
//!
//! Defines the command-line interface structure using clap and maps each
//! command onto the library operations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::warn;
use url::Url;

use crate::client::{PackageMetadata, ServiceClient};
use crate::config::Config;
use crate::error::{OpwatchError, Result};
use crate::operation::{OperationHandle, OperationPoller, PollOptions};
use crate::transport::{HttpTransport, Transport};
use crate::upload::UploadPayload;

#[derive(Parser)]
#[command(name = "opw")]
#[command(about = "Drive Azure Service Management long-running operations")]
#[command(version, author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Poll an operation-status URL until the operation terminates
    Wait {
        /// Absolute URL of the operation-status resource
        status_url: String,
        /// Operation id for log correlation; derived from the URL if omitted
        #[arg(long)]
        operation_id: Option<String>,
        /// Seconds between status requests
        #[arg(long, default_value = "5")]
        interval: u64,
        /// Maximum number of status requests
        #[arg(long, default_value = "60")]
        max_attempts: u32,
    },
    /// Create or update a resource and wait for the operation to finish
    Create {
        /// Resource path relative to the configured service URL
        path: String,
        /// JSON file holding the resource body
        #[arg(long)]
        body: PathBuf,
    },
    /// Delete a resource and wait for the operation to finish
    Delete {
        /// Resource path relative to the configured service URL
        path: String,
    },
    /// Fetch a resource and print it as JSON
    Show {
        /// Resource path relative to the configured service URL
        path: String,
    },
    /// Register a package and upload its payload, rolling back on failure
    Upload {
        /// Creation endpoint path relative to the configured service URL
        path: String,
        /// Local file to upload
        file: PathBuf,
        /// Package name; defaults to the file name
        #[arg(long)]
        name: Option<String>,
        /// Description attached to the package metadata
        #[arg(long)]
        description: Option<String>,
        /// Skip the activation PUT after the payload transfer
        #[arg(long)]
        no_finalize: bool,
    },
    /// Manage opwatch configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the active configuration
    Show,
    /// Print the config file path
    Path,
    /// Write a default config file to the config path
    Init,
}

impl Cli {
    pub async fn execute(self, config: Config) -> Result<()> {
        let cancel = cancel_on_ctrl_c();

        match self.command {
            Commands::Wait {
                status_url,
                operation_id,
                interval,
                max_attempts,
            } => {
                let transport = build_transport(&config)?;
                let status_url = Url::parse(&status_url)
                    .map_err(|e| OpwatchError::invalid_url(format!("'{status_url}': {e}")))?;
                let operation_id = operation_id.unwrap_or_else(|| {
                    status_url
                        .path_segments()
                        .and_then(|mut segments| segments.next_back())
                        .unwrap_or("unknown")
                        .to_string()
                });

                let poller = OperationPoller::new(transport);
                let options = PollOptions::new(Duration::from_secs(interval), max_attempts);
                let handle = OperationHandle::new(operation_id, status_url);
                let status = poller.poll(&handle, &options, &cancel).await?;

                if status.succeeded() {
                    println!("Operation '{}' succeeded", handle.operation_id);
                } else {
                    let code = status.error_code.as_deref().unwrap_or("Failed");
                    let message = status.error_message.as_deref().unwrap_or("no detail");
                    println!(
                        "Operation '{}' failed ({code}): {message}",
                        handle.operation_id
                    );
                }
            }
            Commands::Create { path, body } => {
                let client = build_client(&config)?;
                let contents = tokio::fs::read_to_string(&body).await?;
                let body: serde_json::Value = serde_json::from_str(&contents)?;

                if client.put_resource(&path, &body, &cancel).await? {
                    println!("Resource '{path}' is ready");
                } else {
                    println!("Resource update for '{path}' did not succeed");
                }
            }
            Commands::Delete { path } => {
                let client = build_client(&config)?;
                if client.delete_resource(&path, &cancel).await? {
                    println!("Resource '{path}' removed");
                } else {
                    println!("Removal of '{path}' did not succeed");
                }
            }
            Commands::Show { path } => {
                let client = build_client(&config)?;
                let resource: serde_json::Value = client.get_json(&path).await?;
                println!("{}", serde_json::to_string_pretty(&resource)?);
            }
            Commands::Upload {
                path,
                file,
                name,
                description,
                no_finalize,
            } => {
                let client = build_client(&config)?;

                let file_name = file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .ok_or_else(|| {
                        OpwatchError::invalid_argument(format!("Invalid file path: {file:?}"))
                    })?
                    .to_string();
                let content = tokio::fs::read(&file).await?;
                let payload = UploadPayload::new(file_name.clone(), content);

                let mut metadata =
                    PackageMetadata::new(name.unwrap_or_else(|| file_name.clone()), file_name);
                if let Some(description) = description {
                    metadata = metadata.with_description(description);
                }

                let finalize = config.finalize_uploads && !no_finalize;
                let receipt = client
                    .create_package(&path, &metadata, payload, finalize)
                    .await?;
                println!(
                    "Uploaded '{}' ({} bytes) as entity {}",
                    metadata.name, receipt.size, receipt.entity_id
                );
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => {
                    let rendered = toml::to_string_pretty(&config).map_err(|e| {
                        OpwatchError::serialization(format!("Failed to render config: {e}"))
                    })?;
                    print!("{rendered}");
                }
                ConfigCommands::Path => {
                    println!("{}", Config::get_config_path()?.display());
                }
                ConfigCommands::Init => {
                    let path = Config::get_config_path()?;
                    if path.exists() {
                        return Err(OpwatchError::config(format!(
                            "Config file already exists at {}",
                            path.display()
                        )));
                    }
                    Config::default().save().await?;
                    println!("Wrote default config to {}", path.display());
                }
            },
        }

        Ok(())
    }
}

fn build_transport(config: &Config) -> Result<Arc<dyn Transport>> {
    let mut transport = HttpTransport::new(&config.network_config())?;
    if config.access_token.is_empty() {
        warn!("no access token configured; requests will be unauthenticated");
    } else {
        transport = transport.with_bearer_token(config.access_token.clone());
    }
    Ok(Arc::new(transport))
}

fn build_client(config: &Config) -> Result<ServiceClient> {
    let transport = build_transport(config)?;
    Ok(ServiceClient::new(
        transport,
        config.service_base_url()?,
        config.poll_options(),
    ))
}

/// Cancellation token that fires on Ctrl-C, so an in-flight poll returns a
/// cancelled status instead of blocking to exhaustion
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });
    cancel
}
