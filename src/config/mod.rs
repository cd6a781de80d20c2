#[cfg(feature = "cli")]
pub mod cli;
pub mod suite_config;

#[cfg(feature = "cli")]
use clap::Parser;

/// Command line of the `circle` binary. It takes no arguments; clap still
/// answers `--help` and `--version`.
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "circle", version)]
#[command(about = "Reads a radius from standard input and prints the area of the circle")]
pub struct CircleConfig {}
