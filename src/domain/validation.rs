use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    TooManyMessages { max: usize, actual: usize },
    InvalidEndpoint { input: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::TooManyMessages { max, actual } => {
                write!(f, "too many messages in batch: {actual} (max {max})")
            }
            Self::InvalidEndpoint { input } => write!(f, "invalid endpoint url: {input}"),
        }
    }
}

impl std::error::Error for ValidationError {}
