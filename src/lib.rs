//! reframe - re-encode videos at a fixed frame rate
//!
//! A small wrapper around the `ffmpeg` binary. Invocations are plain token
//! sequences run as child processes; every run reports how the child ended
//! instead of discarding its exit status.

pub mod cli;
pub mod config;
pub mod workflow;
pub mod process;
pub mod media;
pub mod error;
