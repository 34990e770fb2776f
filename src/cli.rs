use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the run result as JSON on stdout
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run an arbitrary program and exit with its exit code
    Run {
        /// Program followed by its arguments, passed through unmodified
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Re-encode a single video file at a fixed frame rate
    Reencode {
        /// Input video file
        #[arg(short, long)]
        input: PathBuf,

        /// Output video file (default: <stem>_<fps>fps.<ext> beside the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Target frame rate (default taken from the configuration)
        #[arg(short = 'r', long)]
        fps: Option<u32>,
    },

    /// Re-encode all video files in a directory
    Batch {
        /// Input directory containing video files
        #[arg(short, long)]
        input_dir: PathBuf,

        /// Output directory for processed files
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Target frame rate (default taken from the configuration)
        #[arg(short = 'r', long)]
        fps: Option<u32>,
    },

    /// Check that ffmpeg can be launched and show its version
    Check,

    /// Write the default configuration to a file
    InitConfig {
        /// Destination file
        #[arg(short, long, default_value = "reframe.toml")]
        output: PathBuf,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}
