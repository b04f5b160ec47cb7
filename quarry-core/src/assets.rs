//! Stylesheet compilation through an external command (Tailwind by default).

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;
use tracing::info;

use crate::config::AssetConfig;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to prepare asset output {}", .path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

#[derive(Debug, Clone)]
pub struct AssetPipeline {
    command: String,
    input: PathBuf,
    output: PathBuf,
    minify: bool,
}

impl AssetPipeline {
    /// `None` when the asset step is disabled.
    pub fn from_config(config: &AssetConfig, output_root: &Path) -> Option<Self> {
        config.enable.then(|| Self {
            command: config.command.clone(),
            input: config.input.clone(),
            output: output_root.join(&config.output),
            minify: config.minify,
        })
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn run(&self) -> Result<(), AssetError> {
        if let Some(parent) = self.output.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AssetError::Prepare {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut command = Command::new(&self.command);
        command.arg("-i").arg(&self.input).arg("-o").arg(&self.output);
        if self.minify {
            command.arg("--minify");
        }

        info!(command = %self.command, output = %self.output.display(), "compiling styles");
        let output = command.output().map_err(|source| AssetError::Spawn {
            command: self.command.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(AssetError::Failed {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}
