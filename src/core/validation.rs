use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be one of: {allowed}")]
    NotAllowed {
        field: &'static str,
        allowed: String,
    },

    #[error("{0} must be between 0 and 100")]
    ScoreOutOfRange(&'static str),

    #[error("{0} must be a positive number")]
    NotPositive(&'static str),

    #[error("{0} has an invalid date format")]
    InvalidDate(&'static str),
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

pub fn one_of(field: &'static str, value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if !allowed.contains(&value) {
        return Err(ValidationError::NotAllowed {
            field,
            allowed: allowed.join(", "),
        });
    }
    Ok(())
}

pub fn score(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::ScoreOutOfRange(field));
    }
    Ok(value)
}

pub fn positive(field: &'static str, value: i32) -> Result<i32, ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NotPositive(field));
    }
    Ok(value)
}
