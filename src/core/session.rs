use crate::core::calculator::{area_line, parse_radius, PROMPT};
use crate::domain::model::Area;
use crate::utils::error::{CircleError, Result};
use std::io::{BufRead, Write};

/// One prompt → read → validate → compute → print pass over a console.
pub struct CircleSession<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> CircleSession<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn run(&mut self) -> Result<Area> {
        write!(self.output, "{}", PROMPT)?;
        self.output.flush()?;

        let token = self.read_token()?;
        tracing::debug!("Read radius token: {:?}", token);

        let radius = parse_radius(&token)?;
        let area = radius.area();
        tracing::debug!("Radius {} gives area {}", radius.value(), area.value());

        writeln!(self.output, "{}", area_line(area))?;
        self.output.flush()?;

        Ok(area)
    }

    /// First whitespace-delimited token, skipping blank lines.
    ///
    /// Lines are read as bytes so a token that is not UTF-8 is reported as
    /// an invalid radius rather than a console failure.
    fn read_token(&mut self) -> Result<String> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.input.read_until(b'\n', &mut line)? == 0 {
                return Err(CircleError::MissingRadius);
            }
            let token = line
                .split(|b| b.is_ascii_whitespace())
                .find(|t| !t.is_empty());
            if let Some(token) = token {
                return std::str::from_utf8(token)
                    .map(str::to_string)
                    .map_err(|_| CircleError::InvalidRadius {
                        input: String::from_utf8_lossy(token).into_owned(),
                    });
            }
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_with(input: &str) -> (Result<Area>, String) {
        let mut session = CircleSession::new(Cursor::new(input.as_bytes().to_vec()), Vec::new());
        let result = session.run();
        let output = String::from_utf8(session.into_output()).unwrap();
        (result, output)
    }

    #[test]
    fn test_positive_radius() {
        let (result, output) = run_with("5\n");
        assert!(result.is_ok());
        assert_eq!(output, "Enter radius of circle: Area: 78.539750\n");
    }

    #[test]
    fn test_zero_radius() {
        let (_, output) = run_with("0\n");
        assert_eq!(output, "Enter radius of circle: Area: 0.000000\n");
    }

    #[test]
    fn test_fractional_radius_within_tolerance() {
        let (result, output) = run_with("3.5");
        let area = result.unwrap().value();
        assert!(((area - 38.484905) / 38.484905).abs() < 1e-4);
        assert!(output.starts_with("Enter radius of circle: Area: 38.48"));
    }

    #[test]
    fn test_negative_radius_prints_no_area() {
        let (result, output) = run_with("-2\n");
        assert!(matches!(result, Err(CircleError::NegativeRadius { .. })));
        assert_eq!(output, PROMPT);
    }

    #[test]
    fn test_skips_blank_lines_and_extra_tokens() {
        let (_, output) = run_with("\n   \n  5 7 9\n");
        assert_eq!(output, "Enter radius of circle: Area: 78.539750\n");
    }

    #[test]
    fn test_empty_input_is_missing_radius() {
        let (result, output) = run_with("");
        assert!(matches!(result, Err(CircleError::MissingRadius)));
        assert_eq!(output, PROMPT);
    }

    #[test]
    fn test_garbage_input() {
        let (result, _) = run_with("radius\n");
        assert!(matches!(result, Err(CircleError::InvalidRadius { input }) if input == "radius"));
    }

    #[test]
    fn test_non_utf8_token_is_invalid_radius() {
        let mut session = CircleSession::new(Cursor::new(b"\xff\xfe5\n".to_vec()), Vec::new());
        let err = session.run().unwrap_err();
        assert!(matches!(err, CircleError::InvalidRadius { ref input } if input == "\u{FFFD}\u{FFFD}5"));
        assert_eq!(err.exit_code(), crate::utils::error::EXIT_PARSE);
        assert_eq!(session.into_output(), PROMPT.as_bytes());
    }

    #[test]
    fn test_same_input_same_output() {
        let (_, first) = run_with("7.25\n");
        let (_, second) = run_with("7.25\n");
        assert_eq!(first, second);
    }
}
