use std::path::PathBuf;

use async_trait::async_trait;
use geoshare_engine::{Action, ActionExecutor};

/// Runs actions on the host: copies go to stdout, apps and shares go
/// through the configured open command, GPX files land in `gpx_dir`.
#[derive(Debug, Clone)]
pub(crate) struct CliExecutor {
    pub(crate) open_command: String,
    pub(crate) gpx_dir: PathBuf,
}

impl CliExecutor {
    async fn open(&self, uri: &str) -> bool {
        match tokio::process::Command::new(&self.open_command)
            .arg(uri)
            .status()
            .await
        {
            Ok(status) if status.success() => true,
            Ok(status) => {
                tracing::error!(command = %self.open_command, %status, "open command failed");
                false
            }
            Err(err) => {
                tracing::error!(command = %self.open_command, error = %err, "failed to spawn open command");
                false
            }
        }
    }
}

#[async_trait]
impl ActionExecutor for CliExecutor {
    async fn execute(&self, action: &Action) -> bool {
        match action {
            Action::Noop => true,
            Action::Copy { text } => {
                println!("{text}");
                true
            }
            Action::OpenApp { package, uri } => {
                tracing::debug!(package, uri, "opening app");
                self.open(uri).await
            }
            Action::Share { text } => self.open(text).await,
            Action::SaveGpx {
                file_name,
                contents,
            } => {
                let path = self.gpx_dir.join(file_name);
                match tokio::fs::write(&path, contents).await {
                    Ok(()) => {
                        tracing::info!(path = %path.display(), "saved gpx");
                        true
                    }
                    Err(err) => {
                        tracing::error!(path = %path.display(), error = %err, "failed to save gpx");
                        false
                    }
                }
            }
            // Resolved into SaveGpx before it becomes ready.
            Action::SaveGpxRoute { .. } => false,
        }
    }
}
