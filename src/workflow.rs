use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, ReframeError};
use crate::media::{FfmpegTranscoder, Transcoder};
use crate::process::{ExitReport, ProcessInvocation};

pub struct Workflow {
    config: Config,
    transcoder: Box<dyn Transcoder>,
}

/// Outcome of a directory run
#[derive(Debug, Default, Serialize)]
pub struct BatchSummary {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<BatchFailure>,
}

#[derive(Debug, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: String,
    pub exit_code: i32,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Workflow {
    pub fn new(config: Config, transcoder: Box<dyn Transcoder>) -> Self {
        Self { config, transcoder }
    }

    /// Workflow driving the configured ffmpeg binary
    pub fn from_config(config: Config) -> Self {
        let transcoder = FfmpegTranscoder::with_system_runner(config.ffmpeg.clone());
        Self::new(config, Box::new(transcoder))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transcoder(&self) -> &dyn Transcoder {
        self.transcoder.as_ref()
    }

    /// Re-encode one file; the output defaults to `<stem>_<fps>fps.<ext>` beside the input
    pub async fn reencode_file<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Option<&Path>,
        fps: Option<u32>,
    ) -> Result<ExitReport> {
        let input_path = input_path.as_ref();
        let fps = self.resolve_fps(fps)?;

        let output_path = match output_path {
            Some(path) => path.to_path_buf(),
            None => {
                let dir = input_path.parent().unwrap_or_else(|| Path::new(""));
                derive_output_path(input_path, dir, fps)?
            }
        };

        info!("Processing single file: {}", input_path.display());
        self.transcoder.reencode(input_path, &output_path, fps).await
    }

    /// Re-encode every video below `input_dir`, one at a time
    ///
    /// Relative layout is mirrored under `output_dir` (the input directory
    /// itself when absent). Per-file failures are collected, not fatal.
    pub async fn reencode_directory<P: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Option<&Path>,
        fps: Option<u32>,
    ) -> Result<BatchSummary> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(ReframeError::Config(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        let fps = self.resolve_fps(fps)?;
        let output_dir = output_dir.unwrap_or(input_dir).to_path_buf();
        fs::create_dir_all(&output_dir).await?;

        let video_files = self.find_videos(input_dir, &output_dir);
        info!("Found {} video files to process", video_files.len());

        let mut summary = BatchSummary::default();
        for video_path in video_files {
            let relative = pathdiff::diff_paths(&video_path, input_dir)
                .ok_or_else(|| ReframeError::Config(format!(
                    "Cannot relate {} to {}",
                    video_path.display(),
                    input_dir.display()
                )))?;
            let target_dir = match relative.parent() {
                Some(parent) => output_dir.join(parent),
                None => output_dir.clone(),
            };
            let output_path = derive_output_path(&video_path, &target_dir, fps)?;

            match self.transcoder.reencode(&video_path, &output_path, fps).await {
                Ok(_) => {
                    info!("Successfully processed: {}", video_path.display());
                    summary.succeeded.push(video_path);
                }
                Err(e) => {
                    warn!("Failed to process {}: {}", video_path.display(), e);
                    summary.failed.push(BatchFailure {
                        path: video_path,
                        exit_code: e.exit_code(),
                        error: e.to_string(),
                    });
                }
            }
        }

        info!("Batch finished: {} succeeded, {} failed",
              summary.succeeded.len(), summary.failed.len());
        Ok(summary)
    }

    /// Run an arbitrary token sequence
    pub async fn run_tokens(&self, tokens: Vec<String>) -> Result<ExitReport> {
        let invocation = ProcessInvocation::from_tokens(tokens)?;
        self.transcoder.execute(invocation).await
    }

    fn resolve_fps(&self, fps: Option<u32>) -> Result<u32> {
        match fps.unwrap_or(self.config.reencode.default_fps) {
            0 => Err(ReframeError::Config("Frame rate must be greater than zero".to_string())),
            fps => Ok(fps),
        }
    }

    fn find_videos(&self, input_dir: &Path, output_dir: &Path) -> Vec<PathBuf> {
        // Compare resolved locations so `videos` and `./videos/out` relate correctly
        let canonical_input = canonical_or_self(input_dir);
        let canonical_output = canonical_or_self(output_dir);
        let in_place = canonical_output == canonical_input;
        let nested_output = !in_place && canonical_output.starts_with(&canonical_input);

        WalkDir::new(&canonical_input)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| self.is_video(path))
            .filter(|path| {
                if nested_output && path.starts_with(&canonical_output) {
                    debug!("Skipping {}: inside the output directory", path.display());
                    return false;
                }
                if in_place && is_generated_output(path) {
                    debug!("Skipping {}: looks like an earlier output", path.display());
                    return false;
                }
                true
            })
            .filter_map(|path| {
                path.strip_prefix(&canonical_input)
                    .ok()
                    .map(|relative| input_dir.join(relative))
            })
            .collect()
    }

    fn is_video(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_lowercase();
                self.config.reencode.video_extensions.iter().any(|known| known.to_lowercase() == ext)
            })
            .unwrap_or(false)
    }
}

fn canonical_or_self(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// `<dir>/<stem>_<fps>fps[.<ext>]`
pub fn derive_output_path(input_path: &Path, dir: &Path, fps: u32) -> Result<PathBuf> {
    let stem = input_path.file_stem()
        .ok_or_else(|| ReframeError::Config(format!("Invalid video filename: {}", input_path.display())))?
        .to_string_lossy();

    let file_name = match input_path.extension() {
        Some(ext) => format!("{}_{}fps.{}", stem, fps, ext.to_string_lossy()),
        None => format!("{}_{}fps", stem, fps),
    };
    Ok(dir.join(file_name))
}

fn is_generated_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit_once('_'))
        .and_then(|(_, tail)| tail.strip_suffix("fps"))
        .map(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type Calls = Arc<Mutex<Vec<(PathBuf, PathBuf, u32)>>>;

    /// Records re-encode calls; inputs whose name contains "broken" fail
    struct RecordingTranscoder {
        calls: Calls,
    }

    fn report(code: i32) -> ExitReport {
        ExitReport {
            program: "ffmpeg".to_string(),
            code: Some(code),
            signal: None,
            elapsed: Duration::ZERO,
        }
    }

    #[async_trait]
    impl Transcoder for RecordingTranscoder {
        async fn reencode(&self, input_path: &Path, output_path: &Path, fps: u32) -> Result<ExitReport> {
            self.calls.lock().unwrap().push((input_path.to_path_buf(), output_path.to_path_buf(), fps));
            if input_path.to_string_lossy().contains("broken") {
                return Err(ReframeError::AbnormalExit {
                    program: "ffmpeg".to_string(),
                    code: Some(69),
                    signal: None,
                });
            }
            Ok(report(0))
        }

        async fn check_availability(&self) -> Result<()> {
            Ok(())
        }

        async fn version_info(&self) -> Result<String> {
            Ok("ffmpeg version test".to_string())
        }

        async fn execute(&self, invocation: ProcessInvocation) -> Result<ExitReport> {
            self.calls.lock().unwrap().push((
                PathBuf::from(invocation.program()),
                PathBuf::from(invocation.arguments().join(" ")),
                0,
            ));
            Ok(report(0))
        }
    }

    fn workflow(config: Config) -> (Workflow, Calls) {
        let calls = Calls::default();
        let transcoder = RecordingTranscoder { calls: Arc::clone(&calls) };
        (Workflow::new(config, Box::new(transcoder)), calls)
    }

    #[test]
    fn test_derive_output_path() {
        let path = derive_output_path(Path::new("/videos/RDT_2020.mp4"), Path::new("/out"), 10).unwrap();
        assert_eq!(path, PathBuf::from("/out/RDT_2020_10fps.mp4"));

        let path = derive_output_path(Path::new("clip"), Path::new(""), 24).unwrap();
        assert_eq!(path, PathBuf::from("clip_24fps"));
    }

    #[test]
    fn test_is_generated_output() {
        assert!(is_generated_output(Path::new("a/clip_10fps.mp4")));
        assert!(!is_generated_output(Path::new("a/clip_fps.mp4")));
        assert!(!is_generated_output(Path::new("a/clip.mp4")));
        assert!(!is_generated_output(Path::new("a/my_clip.mp4")));
    }

    #[tokio::test]
    async fn test_reencode_file_defaults() {
        let (workflow, calls) = workflow(Config::default());
        workflow.reencode_file("/videos/in.mp4", None, None).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, PathBuf::from("/videos/in.mp4"));
        assert_eq!(calls[0].1, PathBuf::from("/videos/in_10fps.mp4"));
        assert_eq!(calls[0].2, 10);
    }

    #[tokio::test]
    async fn test_reencode_file_explicit_output() {
        let (workflow, calls) = workflow(Config::default());
        workflow
            .reencode_file("in.mp4", Some(Path::new("out/vid.mp4")), Some(30))
            .await
            .unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls[0].1, PathBuf::from("out/vid.mp4"));
        assert_eq!(calls[0].2, 30);
    }

    #[tokio::test]
    async fn test_zero_fps_rejected() {
        let (workflow, calls) = workflow(Config::default());
        let err = workflow.reencode_file("in.mp4", None, Some(0)).await.unwrap_err();
        assert!(matches!(err, ReframeError::Config(_)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_directory_mirrors_layout_and_collects_failures() {
        let input = assert_fs::TempDir::new().unwrap();
        input.child("a.mp4").touch().unwrap();
        input.child("nested").create_dir_all().unwrap();
        input.child("nested/b.MKV").touch().unwrap();
        input.child("nested/broken.mov").touch().unwrap();
        input.child("notes.txt").touch().unwrap();
        let output = assert_fs::TempDir::new().unwrap();

        let (workflow, calls) = workflow(Config::default());
        let summary = workflow
            .reencode_directory(input.path(), Some(output.path()), Some(5))
            .await
            .unwrap();

        assert_eq!(summary.succeeded.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.failed[0].exit_code, 69);
        assert!(!summary.is_success());

        let calls = calls.lock().unwrap();
        let outputs: Vec<PathBuf> = calls.iter().map(|(_, out, _)| out.clone()).collect();
        assert_eq!(outputs, vec![
            output.path().join("a_5fps.mp4"),
            output.path().join("nested/b_5fps.MKV"),
            output.path().join("nested/broken_5fps.mov"),
        ]);
        assert!(calls.iter().all(|(_, _, fps)| *fps == 5));
    }

    #[tokio::test]
    async fn test_directory_in_place_skips_previous_outputs() {
        let input = assert_fs::TempDir::new().unwrap();
        input.child("a.mp4").touch().unwrap();
        input.child("a_10fps.mp4").touch().unwrap();

        let (workflow, calls) = workflow(Config::default());
        let summary = workflow.reencode_directory(input.path(), None, None).await.unwrap();

        assert!(summary.is_success());
        assert_eq!(summary.succeeded, vec![input.path().join("a.mp4")]);
        assert_eq!(calls.lock().unwrap()[0].1, input.path().join("a_10fps.mp4"));
    }

    #[tokio::test]
    async fn test_directory_nested_output_keeps_fps_named_inputs() {
        let input = assert_fs::TempDir::new().unwrap();
        input.child("race_60fps.mp4").touch().unwrap();
        input.child("plain.mp4").touch().unwrap();
        input.child("out").create_dir_all().unwrap();
        input.child("out/plain_10fps.mp4").touch().unwrap();
        let output = input.path().join("out");

        let (workflow, calls) = workflow(Config::default());
        let summary = workflow
            .reencode_directory(input.path(), Some(output.as_path()), Some(10))
            .await
            .unwrap();

        assert_eq!(summary.succeeded, vec![
            input.path().join("plain.mp4"),
            input.path().join("race_60fps.mp4"),
        ]);
        let outputs: Vec<PathBuf> = calls.lock().unwrap().iter().map(|(_, out, _)| out.clone()).collect();
        assert_eq!(outputs, vec![
            output.join("plain_10fps.mp4"),
            output.join("race_60fps_10fps.mp4"),
        ]);
    }

    #[tokio::test]
    async fn test_directory_output_detected_through_unnormalized_paths() {
        let temp = assert_fs::TempDir::new().unwrap();
        temp.child("elsewhere").create_dir_all().unwrap();
        temp.child("videos/out").create_dir_all().unwrap();
        temp.child("videos/clip.mp4").touch().unwrap();
        temp.child("videos/out/clip_10fps.mp4").touch().unwrap();

        // Same directory as `videos`, but not a lexical prefix of the output path
        let input_dir = temp.path().join("elsewhere/../videos");
        let output_dir = temp.path().join("videos/out");

        let (workflow, calls) = workflow(Config::default());
        let summary = workflow
            .reencode_directory(&input_dir, Some(output_dir.as_path()), Some(10))
            .await
            .unwrap();

        assert_eq!(summary.succeeded, vec![input_dir.join("clip.mp4")]);
        assert_eq!(calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_directory_requires_directory() {
        let input = assert_fs::TempDir::new().unwrap();
        let file = input.child("a.mp4");
        file.touch().unwrap();

        let (workflow, _) = workflow(Config::default());
        let err = workflow.reencode_directory(file.path(), None, None).await.unwrap_err();
        assert!(matches!(err, ReframeError::Config(_)));
    }

    #[tokio::test]
    async fn test_run_tokens() {
        let (workflow, calls) = workflow(Config::default());
        workflow
            .run_tokens(vec!["ffmpeg".into(), "-i".into(), "x.mp4".into()])
            .await
            .unwrap();
        assert_eq!(calls.lock().unwrap()[0].0, PathBuf::from("ffmpeg"));

        let err = workflow.run_tokens(Vec::new()).await.unwrap_err();
        assert!(matches!(err, ReframeError::EmptyInvocation));
    }
}
