use crate::core::script::{compile_expect, substitute_vars, EOF_MARKER};
use crate::core::suite::{Suite, TestCase};
use crate::domain::model::Action;
use crate::utils::error::{CircleError, Result};
use crate::utils::validation::{
    validate_command, validate_non_empty_string, validate_positive_number, validate_range,
    validate_unique_names, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A checker suite as written in TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    #[serde(default)]
    pub vars: HashMap<String, String>,
    #[serde(default, rename = "case")]
    pub cases: Vec<CaseConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseConfig {
    pub name: String,
    #[serde(alias = "r")]
    pub run: String,
    pub timeout: Option<u64>,
    #[serde(default, alias = "x", alias = "exit", alias = "return")]
    pub exits: i32,
    #[serde(alias = "p")]
    pub points: Option<f64>,
    #[serde(default, alias = "b")]
    pub blocker: bool,
    #[serde(default = "default_visible", alias = "v")]
    pub visible: bool,
    pub script: Option<Vec<StepConfig>>,
}

fn default_visible() -> bool {
    true
}

/// One script step: exactly one of `expect` or `send`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    #[serde(alias = "e")]
    pub expect: Option<String>,
    #[serde(alias = "s")]
    pub send: Option<String>,
    pub timeout: Option<u64>,
}

impl StepConfig {
    fn to_action(&self, case_name: &str, index: usize) -> Result<Action> {
        match (&self.expect, &self.send) {
            (Some(data), None) if data == EOF_MARKER => Ok(Action::ExpectEof {
                timeout: self.timeout,
            }),
            (Some(pattern), None) => Ok(Action::Expect {
                pattern: pattern.clone(),
                timeout: self.timeout,
            }),
            (None, Some(data)) => {
                if self.timeout.is_some() {
                    tracing::debug!("{}: timeout on send step {} is ignored", case_name, index);
                }
                Ok(Action::Send { data: data.clone() })
            }
            _ => Err(CircleError::config(format!(
                "{}: script step {} must have exactly one of 'expect' or 'send'",
                case_name, index
            ))),
        }
    }
}

impl CaseConfig {
    fn to_test_case(&self) -> Result<TestCase> {
        let mut case = TestCase::new(&self.name, &self.run)
            .with_timeout(self.timeout)
            .with_exits(self.exits)
            .with_points(self.points)
            .with_blocker(self.blocker)
            .with_visible(self.visible);

        match &self.script {
            // No script: the program only has to finish.
            None => case.add_action(Action::ExpectEof {
                timeout: self.timeout,
            }),
            Some(steps) => {
                for (index, step) in steps.iter().enumerate() {
                    case.add_action(step.to_action(&self.name, index + 1)?);
                }
            }
        }

        Ok(case)
    }

    fn validate_case(&self, vars: &HashMap<String, String>) -> Result<()> {
        validate_non_empty_string("case.name", &self.name)?;
        validate_command(
            &format!("{}.run", self.name),
            &substitute_vars(&self.run, vars),
        )?;

        if let Some(timeout) = self.timeout {
            validate_positive_number(&format!("{}.timeout", self.name), timeout, 1)?;
        }
        if let Some(points) = self.points {
            validate_range(&format!("{}.points", self.name), points, 0.0, f64::MAX)?;
        }

        for (index, step) in self.script.iter().flatten().enumerate() {
            let action = step.to_action(&self.name, index + 1)?;
            if let Some(timeout) = action.timeout() {
                validate_positive_number(
                    &format!("{}.script[{}].timeout", self.name, index + 1),
                    timeout,
                    1,
                )?;
            }
            if let Action::Expect { pattern, .. } = &action {
                compile_expect(&substitute_vars(pattern, vars))?;
            }
        }

        Ok(())
    }
}

impl SuiteConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CircleError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validates, then builds the runnable suite.
    pub fn into_suite(self) -> Result<Suite> {
        self.validate()?;

        let mut suite = Suite::new();
        for case in &self.cases {
            suite.add_case(case.to_test_case()?);
        }
        suite.vars = self.vars;
        Ok(suite)
    }
}

impl Validate for SuiteConfig {
    fn validate(&self) -> Result<()> {
        if self.cases.is_empty() {
            return Err(CircleError::config("No test cases in suite"));
        }

        validate_unique_names("case.name", self.cases.iter().map(|c| c.name.as_str()))?;
        for case in &self.cases {
            case.validate_case(&self.vars)?;
        }

        Ok(())
    }
}
