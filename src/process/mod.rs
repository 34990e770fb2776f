// Child process execution
//
// - Invocation: the token sequence handed to the operating system
// - Runner: synchronous execution and exit reporting

pub mod invocation;
pub mod runner;

pub use invocation::*;
pub use runner::*;
