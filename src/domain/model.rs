use crate::utils::error::{CircleError, Result};
use serde::Serialize;
use std::fmt;

/// The value of π the calculator has always used.
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.14159;

/// A validated, non-negative circle radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Radius(f64);

impl Radius {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(CircleError::InvalidRadius {
                input: value.to_string(),
            });
        }
        if value < 0.0 {
            return Err(CircleError::NegativeRadius { radius: value });
        }
        // The area must stay finite too.
        if !(PI * value * value).is_finite() {
            return Err(CircleError::InvalidRadius {
                input: value.to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn area(self) -> Area {
        Area(PI * self.0 * self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area(f64);

impl Area {
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Fixed-point with six decimals, e.g. `78.539750`.
impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.0)
    }
}

/// One step of a checker script.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Expect {
        pattern: String,
        timeout: Option<u64>,
    },
    ExpectEof {
        timeout: Option<u64>,
    },
    Send {
        data: String,
    },
}

impl Action {
    pub fn timeout(&self) -> Option<u64> {
        match self {
            Action::Expect { timeout, .. } | Action::ExpectEof { timeout } => *timeout,
            Action::Send { .. } => None,
        }
    }

    pub fn is_expect(&self) -> bool {
        !matches!(self, Action::Send { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CaseReport {
    pub name: String,
    pub errors: Vec<String>,
    pub exit_status: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
}

impl CaseReport {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SuiteReport {
    pub cases: Vec<CaseReport>,
    pub earned: f64,
    pub total: f64,
}

impl SuiteReport {
    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.name == name)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
