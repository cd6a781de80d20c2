pub mod calculator;
pub mod script;
pub mod session;
pub mod suite;

pub use crate::domain::model::{Action, Area, CaseReport, Radius, SuiteReport};
pub use crate::domain::ports::{ExpectOutcome, Interaction, Spawner};
pub use crate::utils::error::Result;
