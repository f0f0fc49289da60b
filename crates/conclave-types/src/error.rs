use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConclaveError {
    #[error("No peers are registered")]
    NoPeersAvailable,

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("No valid responses in consensus round")]
    NoValidResponses,

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Peer unreachable: {0}")]
    PeerUnreachable(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConclaveError>;
