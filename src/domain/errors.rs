use super::models::PinId;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    EmptyTitle,
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    UnknownTag(String),
    UnknownPin(PinId),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::EmptyTitle => {
                write!(f, "Title cannot be empty")
            }
            DomainError::LatitudeOutOfRange(lat) => {
                write!(f, "Latitude {} is outside [-90, 90]", lat)
            }
            DomainError::LongitudeOutOfRange(lon) => {
                write!(f, "Longitude {} is outside [-180, 180]", lon)
            }
            DomainError::UnknownTag(tag) => {
                write!(f, "Unknown tag: {}", tag)
            }
            DomainError::UnknownPin(id) => {
                write!(f, "No pin with id {}", id)
            }
        }
    }
}

impl std::error::Error for DomainError {}

pub type DomainResult<T> = Result<T, DomainError>;
