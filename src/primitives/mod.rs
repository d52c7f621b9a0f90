//! Capability interfaces the handshake core consumes but never implements
//! itself: DH curves, AEAD ciphers, and hash functions. `resolver` wires up
//! the default concrete primitives named in the protocol-name grammar;
//! callers may substitute their own `Registry`.

pub mod cipher;
pub mod dh;
pub mod hash;
pub mod resolver;

use crate::error::NoiseError;

/// A Diffie-Hellman key-agreement curve.
pub trait Dh {
    fn name(&self) -> &'static str;
    fn dhlen(&self) -> usize;
    fn publen(&self) -> usize;

    /// Generates a fresh keypair, returning `(private_bytes, public_bytes)`.
    /// `entropy` is used verbatim as the private scalar's seed material when
    /// present (test vectors); a CSPRNG is used otherwise.
    fn generate_keypair(&self, entropy: Option<&[u8]>) -> (Vec<u8>, Vec<u8>);

    /// Derives the public key paired with `private`.
    fn public_from_private(&self, private: &[u8]) -> Vec<u8>;

    /// Performs the DH operation, returning a `dhlen()`-byte shared secret.
    fn dh(&self, private: &[u8], public: &[u8]) -> Result<Vec<u8>, NoiseError>;
}

/// An AEAD cipher keyed with a 32-byte key and a 64-bit counter nonce.
pub trait Cipher {
    fn name(&self) -> &'static str;

    /// Encodes a 64-bit counter into this cipher's nonce layout.
    fn encode_nonce(&self, n: u64) -> Vec<u8>;

    fn encrypt(&self, key: &[u8; 32], n: u64, ad: &[u8], plaintext: &[u8]) -> Vec<u8>;
    fn decrypt(&self, key: &[u8; 32], n: u64, ad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError>;

    /// Every default cipher is a stateless, zero-sized handle, so cloning
    /// one to hand to a second `CipherState` after `Split` is free.
    fn clone_box(&self) -> Box<dyn Cipher>;
}

/// A cryptographic hash function with an HMAC construction built on top, the
/// basis for this crate's HKDF implementation.
pub trait Hash {
    fn name(&self) -> &'static str;
    fn hashlen(&self) -> usize;
    fn blocklen(&self) -> usize;

    fn hash(&self, data: &[u8]) -> Vec<u8>;
    fn hmac(&self, key: &[u8], data: &[u8]) -> Vec<u8>;
}

/// A value mapping primitive names to constructors. Passed explicitly
/// rather than looked up in process-wide mutable state, so tests can inject
/// fakes and a process can run more than one registry side by side.
pub trait Registry {
    fn dh(&self, name: &str) -> Option<Box<dyn Dh>>;
    fn cipher(&self, name: &str) -> Option<Box<dyn Cipher>>;
    fn hash(&self, name: &str) -> Option<Box<dyn Hash>>;
}

/// HKDF-Extract-then-Expand built generically on top of any `Hash`,
/// returning `outputs` chaining-key-length byte strings (`T(1)..T(n)`).
///
/// Works across whichever `Hash` impl the registry resolved, rather than
/// being pinned to a single hash function baked in at the call site.
pub fn hkdf(hash: &dyn Hash, chaining_key: &[u8], input_key_material: &[u8], outputs: usize) -> Vec<Vec<u8>> {
    let temp_key = hash.hmac(chaining_key, input_key_material);

    let mut results = Vec::with_capacity(outputs);
    let mut prev: Vec<u8> = Vec::new();
    for i in 1..=outputs {
        let mut data = prev.clone();
        data.push(i as u8);
        let out = hash.hmac(&temp_key, &data);
        prev = out.clone();
        results.push(out);
    }
    results
}
