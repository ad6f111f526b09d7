use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{Result, SubtransError};

/// Abstract media processing command representation
#[derive(Debug, Clone)]
pub struct MediaCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl MediaCommand {
    /// Create a new media processing command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add input file
    pub fn input<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg("-i").arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Add output file
    pub fn output<P: AsRef<Path>>(self, path: P) -> Self {
        self.arg(path.as_ref().to_string_lossy().to_string())
    }

    /// Force overwrite output
    pub fn overwrite(self) -> Self {
        self.arg("-y")
    }

    /// Select the n-th subtitle stream of the first input
    pub fn map_subtitle_track(self, track: usize) -> Self {
        self.arg("-map").arg(format!("0:s:{}", track))
    }

    /// Render the command line for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.binary_path.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Execute the command, returning its stdout
    pub async fn execute(&self) -> Result<String> {
        debug!("Executing media processing command: {}", self.command_line());
        debug!("Description: {}", self.description);

        let output = Command::new(&self.binary_path)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| SubtransError::Media(format!("Failed to execute media processor: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubtransError::Media(format!(
                "{} failed: {}",
                self.description,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Builder for the media commands the workflow needs
pub struct MediaCommandBuilder {
    binary_path: String,
}

impl MediaCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    /// Build subtitle track extraction command; the output extension picks the format
    pub fn extract_subtitles<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        video_path: P,
        track: usize,
        output_path: Q,
    ) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Subtitle extraction")
            .overwrite()
            .input(video_path)
            .map_subtitle_track(track)
            .output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> MediaCommand {
        MediaCommand::new(&self.binary_path, "Version check").arg("-version")
    }
}
