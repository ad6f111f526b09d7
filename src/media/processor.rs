use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::{debug, info};

use crate::config::MediaConfig;
use crate::error::{Result, SubtransError};
use super::{MediaCommandBuilder, MediaProcessorTrait};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    /// Extract one subtitle track from a video file
    async fn extract_subtitles(&self, video_path: &Path, track: usize, output_path: &Path) -> Result<()> {
        info!(
            "Extracting subtitle track {} from {} to {}",
            track,
            video_path.display(),
            output_path.display()
        );

        let command = self.command_builder.extract_subtitles(video_path, track, output_path);
        command.execute().await.map_err(|e| SubtransError::VideoExtraction(e.to_string()))?;

        info!("Subtitle extraction completed");
        Ok(())
    }

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| SubtransError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(SubtransError::Media("Media processor version check failed".to_string()))
        }
    }

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String> {
        debug!("Getting media processor version information");

        let stdout = self.command_builder.version_check().execute().await?;
        // The first line carries the version
        Ok(stdout.lines().next().unwrap_or("Unknown version").to_string())
    }
}
