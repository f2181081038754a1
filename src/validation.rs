//! Boundary checks applied before values reach the journal store.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be a positive number")]
    NotPositive { field: &'static str },
    #[error("{field} must be zero or more")]
    Negative { field: &'static str },
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} is not a valid date (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str },
    #[error("{field} has an unsupported value: {value}")]
    Unsupported { field: &'static str, value: String },
    #[error("{field} must not exceed {max}")]
    TooLarge { field: &'static str, max: f64 },
}

/// Upper bound for a single meal entry, in kcal.
pub const MAX_MEAL_CALORIES: f64 = 20_000.0;

pub fn positive(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive { field })
    }
}

pub fn positive_int(field: &'static str, value: u32) -> Result<u32, ValidationError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(ValidationError::NotPositive { field })
    }
}

pub fn non_negative(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ValidationError::Negative { field })
    }
}

/// Non-negative and no more than [`MAX_MEAL_CALORIES`].
pub fn meal_calories(field: &'static str, value: f64) -> Result<f64, ValidationError> {
    let value = non_negative(field, value)?;
    if value > MAX_MEAL_CALORIES {
        return Err(ValidationError::TooLarge {
            field,
            max: MAX_MEAL_CALORIES,
        });
    }
    Ok(value)
}

pub fn non_empty<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(trimmed)
    }
}
