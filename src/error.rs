use std::{error, fmt};

/// `NoiseError` is the stable taxonomy of failures the handshake core can
/// raise. Every variant is terminal: the core never retries on its own.
#[derive(Debug)]
pub enum NoiseError {
    /// The protocol name string didn't split into the five `Noise_*_*_*_*`
    /// fields the grammar requires.
    InvalidProtocolName(String),
    /// A protocol name field named a pattern/dh/cipher/hash the registry
    /// doesn't resolve.
    InvalidComponent(&'static str, String),
    /// The pattern compiler rejected a line for violating a Noise framework
    /// rule.
    InvalidPattern { rule: &'static str, offending_line: String },
    /// The pattern lexer found a token it doesn't recognize.
    InvalidToken(String),
    /// A key required before a token could run (local s/e, remote rs/re) was
    /// never supplied.
    MissingKey(&'static str),
    /// `WriteMessage` was called when it was the peer's turn, or vice versa.
    WrongTurn,
    /// `ReadMessage` was handed fewer bytes than the pattern requires.
    TruncatedMessage,
    /// An AEAD tag failed to verify. The handshake is aborted; which half
    /// of the check failed is never disclosed.
    AuthFailed,
    /// A DH public key was malformed or off-curve.
    InvalidPublicKey,
    /// The cipher's nonce counter would hit the reserved `2^64 - 1` value.
    NonceExhausted,
    /// The number of supplied PSKs didn't match the number of `psk` tokens
    /// in the compiled pattern.
    PSKCountMismatch { expected: usize, got: usize },
}

impl fmt::Display for NoiseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::NoiseError::*;

        match self {
            InvalidProtocolName(name) => write!(f, "invalid protocol name: {}", name),
            InvalidComponent(kind, name) => write!(f, "unknown {}: {}", kind, name),
            InvalidPattern { rule, offending_line } => {
                write!(f, "invalid pattern ({}): {}", rule, offending_line)
            }
            InvalidToken(literal) => write!(f, "invalid token: {}", literal),
            MissingKey(which) => write!(f, "missing required key: {}", which),
            WrongTurn => write!(f, "wrong turn: peer must act next"),
            TruncatedMessage => write!(f, "message shorter than the pattern requires"),
            AuthFailed => write!(f, "authentication failed"),
            InvalidPublicKey => write!(f, "invalid public key"),
            NonceExhausted => write!(f, "nonce space exhausted, renegotiate"),
            PSKCountMismatch { expected, got } => {
                write!(f, "pattern needs {} psks, got {}", expected, got)
            }
        }
    }
}

impl error::Error for NoiseError {}
