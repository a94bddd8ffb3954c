use relaydesk_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Unknown system tool type: {0}")]
    UnknownSystemTool(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}
