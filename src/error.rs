use std::sync::Arc;
use thiserror::Error;


#[derive(Clone, Debug, Error)]
pub enum Error {
    #[error("Command failed: {0}")]
    CommandFailed(Arc<std::io::Error>),
    #[error("Internal error: {0}")]
    Internal(String),
}
