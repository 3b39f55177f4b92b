//! Error type shared by the loader and the aggregation queries.

/// Errors raised while loading a trip table or querying it.
///
/// Everything except [`TripError::InvalidParameter`] and
/// [`TripError::NotDerived`] is a load-time parse failure and is fatal to the
/// load call that produced it.
#[derive(thiserror::Error, Debug)]
pub enum TripError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("column '{column}' is required but was not found")]
    MissingColumn { column: String },
    #[error("row {row}: cannot parse '{value}' in column '{column}' as a datetime")]
    InvalidDatetime {
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("row {row}: local time '{value}' in column '{column}' is ambiguous or does not exist")]
    AmbiguousLocalTime {
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("{0}")]
    InvalidParameter(String),
    #[error("derived column '{column}' was not computed for this table")]
    NotDerived { column: &'static str },
}

impl TripError {
    /// True for every failure that can happen while reading the source file.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            TripError::Io(_)
                | TripError::Csv(_)
                | TripError::MissingColumn { .. }
                | TripError::InvalidDatetime { .. }
                | TripError::AmbiguousLocalTime { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, TripError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_displays_message_verbatim() {
        let err = TripError::InvalidParameter("step should int or float".to_string());
        assert_eq!(err.to_string(), "step should int or float");
        assert!(!err.is_parse_error());
    }

    #[test]
    fn test_missing_column_is_parse_error() {
        let err = TripError::MissingColumn {
            column: "pickup_datetime".to_string(),
        };
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("pickup_datetime"));
    }
}
