//! A handshake-state-machine implementation of the Noise Protocol Framework:
//! a pattern compiler, `CipherState`/`SymmetricState`/`HandshakeState`
//! layering, and a small set of default DH/cipher/hash primitives wired up
//! through a `Registry` rather than global state. Concrete curves, AEAD
//! ciphers, and hash functions beyond the defaults are supplied by
//! implementing the `Dh`/`Cipher`/`Hash` traits and handing them to a
//! `Builder` through a custom `Registry`.

#![forbid(unsafe_code)]

mod cipherstate;
mod error;
mod handshakestate;
mod params;
mod pattern;
mod primitives;
mod symmetricstate;

pub use cipherstate::{CipherState, Rekeyer};
pub use error::NoiseError;
pub use handshakestate::{Builder, HandshakeState};
pub use params::NoiseParams;
pub use pattern::{catalog, Direction, HandshakePattern, PatternLine, Token};
pub use primitives::resolver::DefaultResolver;
pub use primitives::{cipher, dh, hash};
pub use primitives::{hkdf, Cipher, Dh, Hash, Registry};
