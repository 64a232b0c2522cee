use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown object type: {0}")]
    UnknownObjectType(String),

    #[error("malformed {object_type} object: {source}")]
    MalformedObject {
        object_type: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown scratch org type: {0}")]
    UnknownOrgType(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
