use std::path::Path;

use crate::process::ProcessInvocation;

/// Builder for the ffmpeg invocations this tool issues
#[derive(Debug, Clone)]
pub struct FfmpegCommandBuilder {
    binary_path: String,
}

impl FfmpegCommandBuilder {
    /// Create a new command builder
    pub fn new<S: Into<String>>(binary_path: S) -> Self {
        Self {
            binary_path: binary_path.into(),
        }
    }

    pub fn binary_path(&self) -> &str {
        &self.binary_path
    }

    /// Build frame rate re-encoding command
    ///
    /// `<ffmpeg> [-y] -i <input> -r <fps> [extra options...] <output>`
    pub fn reencode<P: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: P,
        fps: u32,
        extra_options: &[String],
        overwrite: bool,
    ) -> ProcessInvocation {
        let mut cmd = self.custom(format!("Re-encode at {} fps", fps));
        if overwrite {
            cmd = cmd.overwrite();
        }

        cmd.input(input_path)
            .frame_rate(fps)
            .args(extra_options.iter().cloned())
            .output(output_path)
    }

    /// Build version check command
    pub fn version_check(&self) -> ProcessInvocation {
        self.custom("Version check").arg("-version")
    }

    /// Build custom command
    pub fn custom<S: Into<String>>(&self, description: S) -> ProcessInvocation {
        ProcessInvocation::new(&self.binary_path).describe(description)
    }
}
