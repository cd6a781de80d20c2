use crate::domain::model::{Area, Radius};
use crate::utils::error::{CircleError, Result};

pub const PROMPT: &str = "Enter radius of circle: ";

/// Parses one input token into a validated radius.
///
/// Non-numeric tokens, non-finite values and radii whose area overflows are
/// parse errors; negative values are validation errors.
pub fn parse_radius(token: &str) -> Result<Radius> {
    let invalid = || CircleError::InvalidRadius {
        input: token.to_string(),
    };

    let value: f64 = token.trim().parse().map_err(|_| invalid())?;

    match Radius::new(value) {
        Err(CircleError::InvalidRadius { .. }) => Err(invalid()),
        other => other,
    }
}

pub fn area_line(area: Area) -> String {
    format!("Area: {}", area)
}
