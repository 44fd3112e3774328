use thiserror::Error;

/// Errors raised while setting up the scheme, signing or decoding signatures.
///
/// A signature that does not verify is not an error: `verify` reports it as
/// `false`.
#[derive(Error, Debug)]
pub enum RainRingError {
    /// Malformed parameter set or key material. Fatal at construction time.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The signer index does not address a slot of the ring.
    #[error("signer index {0} is outside the ring")]
    InvalidIndex(usize),
    /// The randomness source could not produce the requested bytes.
    #[error("randomness source failed: {0}")]
    Entropy(#[from] rand::Error),
    /// The signature bytes do not match the parameter set.
    #[error("malformed signature encoding: {0}")]
    Encoding(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RainRingError>;
