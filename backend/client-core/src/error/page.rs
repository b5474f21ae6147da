use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum PageError {
    #[error("Page Validation Error: {message} {location}")]
    Validation {
        message: String,
        location: ErrorLocation,
    },
}
