use thiserror::Error;

/// A record could not be encoded, or a persisted record could not be
/// reconstructed. Reconstruction failures name the record and field.
#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("{record}: missing required field `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("{record}: {source}")]
    Malformed {
        record: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("canonical encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A stored nonce does not hold up under recomputation. Blocks failing
/// these checks are rejected, never silently accepted.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("nonce {nonce} does not reproduce claimed hash {claimed}")]
    WrongProof { nonce: u64, claimed: String },

    #[error("digest {digest} lacks {difficulty} leading zero(s)")]
    DifficultyNotMet { digest: String, difficulty: u32 },

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

/// The nonce search hit a caller-imposed bound before finding a solution.
#[derive(Debug, Error)]
pub enum MineError {
    #[error("nonce search exhausted after {attempts} attempt(s)")]
    AttemptsExhausted { attempts: u64 },

    #[error("nonce search deadline passed after {attempts} attempt(s)")]
    DeadlinePassed { attempts: u64 },

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}
