//! Errors the engine can return.
//!
//! Form validation has its own [`FormError`] because its messages are shown
//! to the user verbatim; everything else funnels into [`EngineError`].
//!
//! [`FormError`]: crate::FormError
use thiserror::Error;

use crate::FormError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv export failed: {0}")]
    Io(#[from] std::io::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Form(a), Self::Form(b)) => a == b,
            (Self::Csv(a), Self::Csv(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
