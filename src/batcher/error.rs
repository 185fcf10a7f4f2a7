use std::convert::Infallible;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BatchError<E> {
    #[error("invalid max batch size {max_batch_size}: must be at least 1")]
    Configuration { max_batch_size: i64 },

    #[error("batch sink failed: {0}")]
    Sink(E),
}

impl<E> BatchError<E> {
    pub fn is_configuration(&self) -> bool {
        matches!(self, BatchError::Configuration { .. })
    }

    /// The sink's own error, if that is what stopped the pass
    pub fn into_sink(self) -> Option<E> {
        match self {
            BatchError::Sink(e) => Some(e),
            BatchError::Configuration { .. } => None,
        }
    }
}

impl BatchError<Infallible> {
    /// Re-type a configuration error for a pass whose sink can fail with `E`
    pub fn widen<E>(self) -> BatchError<E> {
        match self {
            BatchError::Configuration { max_batch_size } => {
                BatchError::Configuration { max_batch_size }
            }
            BatchError::Sink(never) => match never {},
        }
    }
}
