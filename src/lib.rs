pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{cli::CheckerArgs, CircleConfig};

pub use crate::adapters::process::ProcessSpawner;
pub use crate::config::suite_config::SuiteConfig;
pub use crate::core::{
    session::CircleSession,
    suite::{Suite, TestCase},
};
pub use crate::utils::error::{CircleError, Result};
