use crate::domain::model::Action;
use crate::domain::ports::{ExpectOutcome, Interaction};
use crate::utils::error::Result;
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const EOF_MARKER: &str = "_EOF_";

pub const ERR_NOT_RECEIVED: &str = "Expected output not received.";
pub const ERR_TIMEOUT: &str = "Timeout exceeded.";

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptOutcome {
    pub exit_status: Option<i32>,
    pub errors: Vec<String>,
}

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("variable pattern is valid"))
}

/// Compiles an expect pattern. `.` also matches a newline so one pattern can
/// span several lines of output.
pub fn compile_expect(pattern: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()?)
}

/// Replaces `${NAME}` with the suite variable, then the environment variable,
/// of that name. Unknown names are left as written.
pub fn substitute_vars(data: &str, vars: &HashMap<String, String>) -> String {
    var_pattern()
        .replace_all(data, |caps: &regex::Captures| {
            let name = &caps[1];
            vars.get(name)
                .cloned()
                .or_else(|| std::env::var(name).ok())
                .unwrap_or_else(|| format!("${{{}}}", name))
        })
        .into_owned()
}

/// Appends an expect-EOF step unless the script already ends with an expect.
pub fn complete_script(script: &[Action]) -> Vec<Action> {
    let mut steps = script.to_vec();
    if !steps.last().is_some_and(Action::is_expect) {
        steps.push(Action::ExpectEof { timeout: None });
    }
    steps
}

fn describe(outcome: &ExpectOutcome) -> String {
    match outcome {
        ExpectOutcome::Matched(text) | ExpectOutcome::Timeout(text) => format!("\"{}\"", text),
        ExpectOutcome::Eof(text) if text.is_empty() => EOF_MARKER.to_string(),
        ExpectOutcome::Eof(text) => format!("\"{}\" then {}", text, EOF_MARKER),
    }
}

/// Drives a running program through `script` and collects its exit status.
///
/// Stops at the first expect that fails. A program that timed out is killed
/// and reports no exit status.
pub async fn run_script<I: Interaction>(
    mut session: I,
    script: &[Action],
    vars: &HashMap<String, String>,
    case_timeout: Option<u64>,
) -> Result<ScriptOutcome> {
    let mut errors = Vec::new();
    let mut timed_out = false;

    for action in complete_script(script) {
        let secs = action
            .timeout()
            .or(case_timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        let timeout = Duration::from_secs(secs);

        let outcome = match &action {
            Action::Send { data } => {
                let data = substitute_vars(data, vars);
                tracing::debug!("  sending: \"{}\"", data);
                // A program that already quit shows up in the next expect.
                if let Err(e) = session.send_line(&data).await {
                    tracing::debug!("  send failed: {}", e);
                }
                continue;
            }
            Action::Expect { pattern, .. } => {
                let pattern = substitute_vars(pattern, vars);
                tracing::debug!("  expecting ({}s): \"{}\"", secs, pattern);
                let regex = compile_expect(&pattern)?;
                session.expect(&regex, timeout).await?
            }
            Action::ExpectEof { .. } => {
                tracing::debug!("  expecting ({}s): {}", secs, EOF_MARKER);
                session.expect_eof(timeout).await?
            }
        };

        tracing::debug!("  received: {}", describe(&outcome));
        match (&action, outcome) {
            (_, ExpectOutcome::Timeout(_)) => {
                tracing::debug!("FAILED: {}", ERR_TIMEOUT);
                errors.push(ERR_TIMEOUT.to_string());
                timed_out = true;
                break;
            }
            (Action::Expect { .. }, ExpectOutcome::Eof(_)) => {
                tracing::debug!("FAILED: {}", ERR_NOT_RECEIVED);
                errors.push(ERR_NOT_RECEIVED.to_string());
                break;
            }
            _ => {}
        }
    }

    let finish_timeout = Duration::from_secs(case_timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));
    let exit_status = session.finish(finish_timeout, timed_out).await?;

    Ok(ScriptOutcome {
        exit_status,
        errors,
    })
}
