//! Calendar-specific error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    #[error("Year {0} is outside the supported range")]
    YearOutOfRange(i32),

    #[error("Cannot parse {0:?} as YYYY-MM")]
    Parse(String),
}

impl CalendarError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidMonth { .. } => "That month does not exist".to_string(),
            Self::YearOutOfRange(year) => format!("Year {} is out of range", year),
            Self::Parse(text) => format!("Cannot read {:?} as a month", text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_user_messages() {
        let err = CalendarError::YearOutOfRange(12000);
        assert!(err.user_message().contains("12000"));

        let err = CalendarError::Parse("Octember".into());
        assert!(err.user_message().contains("Octember"));
    }
}
