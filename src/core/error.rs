use thiserror::Error;

#[derive(Error, Debug)]
pub enum MockError {
    #[error("vbucket {0} out of range, bucket has {1} vbuckets")]
    VBucketOutOfRange(u16, u16),

    #[error("partition map has {0} entries, expected {1}")]
    PartitionMapLength(usize, u16),

    #[error("vbucket {0} assigned to node {1}, topology has {2} nodes")]
    NodeIndexOutOfRange(u16, usize, usize),

    #[error("Bucket '{0}' already exists in pool '{1}'")]
    BucketExists(String, String),

    #[error("Invalid cluster config: {0}")]
    InvalidConfig(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, MockError>;

impl<T> From<std::sync::PoisonError<T>> for MockError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
