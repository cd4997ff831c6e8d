//! The `javah` command: resolves classes on a class path, generates their
//! native method headers and writes them out.

pub mod classpath;
pub mod cli;
pub mod logging;
pub mod output;

pub use cli::{normalize_args, run, Cli};
