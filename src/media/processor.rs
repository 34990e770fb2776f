use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::config::FfmpegConfig;
use crate::error::{Result, ReframeError};
use crate::process::{CommandRunner, ExitReport, ProcessInvocation, SystemRunner};
use super::{FfmpegCommandBuilder, Transcoder};

/// ffmpeg based transcoder
pub struct FfmpegTranscoder {
    config: FfmpegConfig,
    command_builder: FfmpegCommandBuilder,
    runner: Arc<dyn CommandRunner>,
}

impl FfmpegTranscoder {
    pub fn new(config: FfmpegConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let command_builder = FfmpegCommandBuilder::new(&config.binary_path);

        Self {
            config,
            command_builder,
            runner,
        }
    }

    /// Transcoder that spawns real processes
    pub fn with_system_runner(config: FfmpegConfig) -> Self {
        Self::new(config, Arc::new(SystemRunner::new()))
    }

    pub fn command_builder(&self) -> &FfmpegCommandBuilder {
        &self.command_builder
    }

    /// Run on the blocking pool; the child is waited on synchronously there
    async fn run_blocking(&self, invocation: ProcessInvocation) -> Result<ExitReport> {
        let runner = Arc::clone(&self.runner);
        tokio::task::spawn_blocking(move || runner.run(invocation)).await?
    }

    async fn probe_version(&self) -> Result<String> {
        let runner = Arc::clone(&self.runner);
        let invocation = self.command_builder.version_check();
        let captured = tokio::task::spawn_blocking(move || runner.capture(&invocation)).await??;

        if !captured.report.success() {
            debug!("Version probe stderr: {}", captured.stderr.trim());
        }
        captured.report.into_result()?;
        Ok(captured.stdout)
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn reencode(
        &self,
        input_path: &Path,
        output_path: &Path,
        fps: u32,
    ) -> Result<ExitReport> {
        if !fs::try_exists(input_path).await? {
            return Err(ReframeError::FileNotFound(input_path.display().to_string()));
        }

        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        info!("Re-encoding {} at {} fps -> {}",
              input_path.display(), fps, output_path.display());

        let invocation = self.command_builder.reencode(
            input_path,
            output_path,
            fps,
            &self.config.extra_options,
            self.config.overwrite,
        );
        let report = self.run_blocking(invocation).await?;

        info!("Re-encoding completed successfully");
        Ok(report)
    }

    async fn check_availability(&self) -> Result<()> {
        self.probe_version().await?;
        info!("ffmpeg is available at {}", self.command_builder.binary_path());
        Ok(())
    }

    async fn version_info(&self) -> Result<String> {
        let stdout = self.probe_version().await?;
        let first_line = stdout.lines().next().unwrap_or("Unknown version");
        Ok(first_line.to_string())
    }

    async fn execute(&self, invocation: ProcessInvocation) -> Result<ExitReport> {
        info!("Executing: {}", invocation);
        self.run_blocking(invocation).await
    }
}
