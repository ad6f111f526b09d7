// Media processing
//
// Video input is handled by extracting one of its subtitle tracks with ffmpeg:
// - Processor: FFmpeg-backed implementation of `MediaProcessorTrait`
// - Commands: Command builders and abstractions

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// Main trait for media processing operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Extract the `track`-th subtitle stream of a video into `output_path`
    async fn extract_subtitles(&self, video_path: &Path, track: usize, output_path: &Path) -> Result<()>;

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()>;

    /// Get media processor version information
    async fn get_version_info(&self) -> Result<String>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based)
    pub fn create_processor(config: MediaConfig) -> Box<dyn MediaProcessorTrait> {
        Box::new(processor::MediaProcessorImpl::new(config))
    }
}
