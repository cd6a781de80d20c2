use crate::core::script::{run_script, substitute_vars};
use crate::domain::model::{Action, CaseReport, SuiteReport};
use crate::domain::ports::Spawner;
use crate::utils::error::Result;
use crate::utils::validation::validate_command;
use std::collections::HashMap;
use std::io::Write;

/// Column the progress dots pad case names to.
pub const NAME_WIDTH: usize = 40;

pub const ERR_EXIT_STATUS: &str = "Incorrect exit status.";

#[derive(Debug, Clone, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub command: String,
    pub script: Vec<Action>,
    pub timeout: Option<u64>,
    pub exits: i32,
    pub points: Option<f64>,
    pub blocker: bool,
    pub visible: bool,
}

impl TestCase {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            script: Vec::new(),
            timeout: None,
            exits: 0,
            points: None,
            blocker: false,
            visible: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<u64>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_exits(mut self, exits: i32) -> Self {
        self.exits = exits;
        self
    }

    pub fn with_points(mut self, points: Option<f64>) -> Self {
        self.points = points;
        self
    }

    pub fn with_blocker(mut self, blocker: bool) -> Self {
        self.blocker = blocker;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn add_action(&mut self, action: Action) {
        self.script.push(action);
    }

    pub async fn run<S: Spawner>(
        &self,
        spawner: &S,
        vars: &HashMap<String, String>,
    ) -> Result<CaseReport> {
        let command = substitute_vars(&self.command, vars);
        tracing::debug!("running command: {}", command);
        let argv = validate_command(&format!("{}.run", self.name), &command)?;

        let session = spawner.spawn(&argv)?;
        let outcome = run_script(session, &self.script, vars, self.timeout).await?;

        let mut errors = outcome.errors;
        match outcome.exit_status {
            Some(status) => tracing::debug!("exit status: {} (expected {})", status, self.exits),
            None => tracing::debug!("exit status: none (expected {})", self.exits),
        }
        if outcome.exit_status != Some(self.exits) {
            errors.push(ERR_EXIT_STATUS.to_string());
        }

        let points = self
            .points
            .map(|points| if errors.is_empty() { points } else { 0.0 });

        Ok(CaseReport {
            name: self.name.clone(),
            errors,
            exit_status: outcome.exit_status,
            points,
        })
    }
}

/// Ordered collection of test cases sharing one variable table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suite {
    pub cases: Vec<TestCase>,
    pub vars: HashMap<String, String>,
}

impl Suite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_case(&mut self, case: TestCase) {
        self.cases.push(case);
    }

    pub fn total_points(&self) -> f64 {
        self.cases.iter().filter_map(|c| c.points).sum()
    }

    /// Runs every case in order, writing progress lines to `out` unless
    /// `quiet`. A failing blocker case ends the run.
    pub async fn run<S: Spawner, W: Write>(
        &self,
        spawner: &S,
        out: &mut W,
        quiet: bool,
    ) -> Result<SuiteReport> {
        let mut report = SuiteReport {
            total: self.total_points(),
            ..SuiteReport::default()
        };

        for case in &self.cases {
            tracing::debug!("starting test {}", case.name);
            let show = !quiet && case.visible;
            if show {
                write!(out, "{} ", progress_label(&case.name))?;
                out.flush()?;
            }

            let result = case.run(spawner, &self.vars).await?;
            let passed = result.passed();

            if show {
                match (result.points, case.points) {
                    (Some(scored), Some(points)) => writeln!(out, "{} / {}", scored, points)?,
                    _ => writeln!(out, "{}", if passed { "PASSED" } else { "FAILED" })?,
                }
            }

            report.earned += result.points.unwrap_or(0.0);
            report.cases.push(result);

            if case.blocker && !passed {
                tracing::debug!("blocker {} failed, skipping remaining cases", case.name);
                break;
            }
        }

        Ok(report)
    }
}

fn progress_label(name: &str) -> String {
    let dots = (NAME_WIDTH + 1).saturating_sub(name.chars().count());
    format!("{} {}", name, ".".repeat(dots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::script::tests::FakeSession;
    use crate::core::script::ERR_NOT_RECEIVED;
    use crate::utils::error::CircleError;
    use std::sync::Mutex;

    /// Hands out prepared sessions in order and records the argv it was given.
    struct FakeSpawner {
        sessions: Mutex<Vec<FakeSession>>,
        spawned: Mutex<Vec<Vec<String>>>,
    }

    impl FakeSpawner {
        fn new(mut sessions: Vec<FakeSession>) -> Self {
            sessions.reverse();
            Self {
                sessions: Mutex::new(sessions),
                spawned: Mutex::new(Vec::new()),
            }
        }
    }

    impl Spawner for FakeSpawner {
        type Session = FakeSession;

        fn spawn(&self, argv: &[String]) -> Result<FakeSession> {
            self.spawned.lock().unwrap().push(argv.to_vec());
            self.sessions
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| CircleError::config("no more sessions"))
        }
    }

    fn circle_case(name: &str, radius: &str) -> TestCase {
        let mut case = TestCase::new(name, "./circle");
        case.add_action(Action::Expect {
            pattern: "Enter radius".to_string(),
            timeout: None,
        });
        case.add_action(Action::Send {
            data: radius.to_string(),
        });
        case
    }

    #[test]
    fn test_progress_label_pads_to_width() {
        let label = progress_label("case_1");
        assert_eq!(label.len(), NAME_WIDTH + 2);
        assert!(label.starts_with("case_1 ..."));

        let long = "x".repeat(50);
        assert_eq!(progress_label(&long), format!("{} ", long));
    }

    #[test]
    fn test_total_points_skips_unscored_cases() {
        let mut suite = Suite::new();
        suite.add_case(TestCase::new("a", "true").with_points(Some(10.0)));
        suite.add_case(TestCase::new("b", "true"));
        suite.add_case(TestCase::new("c", "true").with_points(Some(2.5)));
        assert_eq!(suite.total_points(), 12.5);
    }

    #[tokio::test]
    async fn test_suite_reports_points_and_status() {
        let spawner = FakeSpawner::new(vec![
            FakeSession::new(&["Enter radius of circle: ", "Area: 78.539750\n"], Some(0)),
            FakeSession::new(&["Enter radius of circle: ", "Area: 0.000000\n"], Some(0)),
        ]);
        let mut suite = Suite::new();
        suite.add_case(circle_case("positive", "5").with_points(Some(10.0)));
        suite.add_case(circle_case("negative", "-2").with_exits(1));

        let mut out = Vec::new();
        let report = suite.run(&spawner, &mut out, false).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(report.total, 10.0);
        assert_eq!(report.earned, 10.0);
        assert!(report.case("positive").unwrap().passed());
        assert_eq!(
            report.case("negative").unwrap().errors,
            vec![ERR_EXIT_STATUS.to_string()]
        );
        assert!(out.contains("positive ...."));
        assert!(out.contains("10 / 10\n"));
        assert!(out.contains("FAILED\n"));
        assert_eq!(
            spawner.spawned.lock().unwrap()[0],
            vec!["./circle".to_string()]
        );
    }

    #[tokio::test]
    async fn test_failed_blocker_stops_the_run() {
        let spawner = FakeSpawner::new(vec![
            FakeSession::new(&["Enter radius of circle: ", "nothing\n"], Some(0)),
            FakeSession::new(&["Enter radius of circle: "], Some(0)),
        ]);
        let mut suite = Suite::new();
        let mut blocker = circle_case("blocker", "5").with_blocker(true);
        blocker.add_action(Action::Expect {
            pattern: "Area".to_string(),
            timeout: None,
        });
        suite.add_case(blocker);
        suite.add_case(circle_case("after", "5"));

        let report = suite.run(&spawner, &mut Vec::new(), true).await.unwrap();

        assert_eq!(report.cases.len(), 1);
        assert_eq!(report.cases[0].errors, vec![ERR_NOT_RECEIVED.to_string()]);
    }

    #[tokio::test]
    async fn test_quiet_and_hidden_cases_print_nothing() {
        let spawner = FakeSpawner::new(vec![FakeSession::new(
            &["Enter radius of circle: ", "Area: 0.000000\n"],
            Some(0),
        )]);
        let mut suite = Suite::new();
        suite.add_case(circle_case("hidden", "0").with_visible(false));

        let mut out = Vec::new();
        let report = suite.run(&spawner, &mut out, false).await.unwrap();

        assert!(out.is_empty());
        assert!(report.cases[0].passed());
    }

    #[tokio::test]
    async fn test_failed_case_earns_zero_points() {
        let spawner = FakeSpawner::new(vec![FakeSession::new(
            &["Enter radius of circle: ", "Area: 0.000000\n"],
            Some(2),
        )]);
        let mut suite = Suite::new();
        suite.add_case(circle_case("wrong_exit", "0").with_points(Some(5.0)));

        let report = suite.run(&spawner, &mut Vec::new(), true).await.unwrap();

        assert_eq!(report.earned, 0.0);
        assert_eq!(report.cases[0].points, Some(0.0));
    }
}
