// ffmpeg facing layer
//
// - Commands: invocation builders for the operations below
// - Processor: Transcoder implementation over a CommandRunner

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use std::path::Path;

pub use commands::*;
pub use processor::*;

use crate::error::Result;
use crate::process::{ExitReport, ProcessInvocation};

/// Main trait for transcoding operations
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Re-encode `input_path` to `output_path` at `fps` frames per second
    async fn reencode(
        &self,
        input_path: &Path,
        output_path: &Path,
        fps: u32,
    ) -> Result<ExitReport>;

    /// Check that the transcoder binary can be launched and answers `-version`
    async fn check_availability(&self) -> Result<()>;

    /// First line of the transcoder's version banner
    async fn version_info(&self) -> Result<String>;

    /// Execute an arbitrary invocation to completion
    async fn execute(&self, invocation: ProcessInvocation) -> Result<ExitReport>;
}
