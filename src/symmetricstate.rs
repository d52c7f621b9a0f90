//! `SymmetricState`: the running chaining key and handshake transcript hash,
//! driven by whichever `Hash` a `Registry` resolves rather than a single
//! hash function fixed at compile time.

use zeroize::Zeroize;

use crate::cipherstate::CipherState;
use crate::error::NoiseError;
use crate::primitives::{hkdf, Cipher, Hash};

pub struct SymmetricState {
    hash: Box<dyn Hash>,
    ck: Vec<u8>,
    h: Vec<u8>,
    cs: CipherState,
}

impl SymmetricState {
    /// `InitializeSymmetric`: derives `h` from the protocol name, padding or
    /// hashing it to `hashlen` bytes, and seeds the chaining key from it.
    pub fn initialize(hash: Box<dyn Hash>, cipher: Box<dyn Cipher>, protocol_name: &[u8]) -> SymmetricState {
        let hashlen = hash.hashlen();
        let h = if protocol_name.len() <= hashlen {
            let mut padded = protocol_name.to_vec();
            padded.resize(hashlen, 0);
            padded
        } else {
            hash.hash(protocol_name)
        };
        let ck = h.clone();

        SymmetricState { hash, ck, h, cs: CipherState::new(cipher) }
    }

    pub fn mix_key(&mut self, input_key_material: &[u8]) {
        let outputs = hkdf(&*self.hash, &self.ck, input_key_material, 2);
        self.ck = outputs[0].clone();
        let key = truncate_to_32(&outputs[1]);
        self.cs.initialize_key(key);
    }

    pub fn mix_hash(&mut self, data: &[u8]) {
        let mut buf = self.h.clone();
        buf.extend_from_slice(data);
        self.h = self.hash.hash(&buf);
    }

    pub fn mix_key_and_hash(&mut self, input_key_material: &[u8]) {
        let outputs = hkdf(&*self.hash, &self.ck, input_key_material, 3);
        self.ck = outputs[0].clone();
        self.mix_hash(&outputs[1]);
        let key = truncate_to_32(&outputs[2]);
        self.cs.initialize_key(key);
    }

    pub fn get_handshake_hash(&self) -> &[u8] {
        &self.h
    }

    pub fn has_key(&self) -> bool {
        self.cs.has_key()
    }

    pub fn encrypt_and_hash(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let ciphertext = self.cs.encrypt_with_ad(&self.h, plaintext)?;
        self.mix_hash(&ciphertext);
        Ok(ciphertext)
    }

    pub fn decrypt_and_hash(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let plaintext = self.cs.decrypt_with_ad(&self.h, ciphertext)?;
        self.mix_hash(ciphertext);
        Ok(plaintext)
    }

    /// `Split`: derives the two transport-direction cipher keys from the
    /// final chaining key and consumes `self`, since a `SymmetricState` has
    /// no further use once the handshake transcript is complete.
    pub fn split(mut self) -> (CipherState, CipherState) {
        let outputs = hkdf(&*self.hash, &self.ck, &[], 2);
        let k1 = truncate_to_32(&outputs[0]);
        let k2 = truncate_to_32(&outputs[1]);

        let mut c1 = CipherState::new(self.cs.clone_cipher());
        let mut c2 = CipherState::new(self.cs.clone_cipher());
        c1.initialize_key(k1);
        c2.initialize_key(k2);

        self.ck.zeroize();
        self.h.zeroize();
        (c1, c2)
    }
}

fn truncate_to_32(bytes: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes[..32]);
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::cipher::CipherChaChaPoly;
    use crate::primitives::hash::HashSha256;

    #[test]
    fn initialize_pads_short_protocol_names() {
        let ss = SymmetricState::initialize(Box::new(HashSha256), Box::new(CipherChaChaPoly), b"short");
        assert_eq!(ss.get_handshake_hash().len(), 32);
        assert_eq!(&ss.get_handshake_hash()[..5], b"short");
    }

    #[test]
    fn mix_key_then_encrypt_and_hash_changes_the_transcript_hash() {
        let mut ss = SymmetricState::initialize(
            Box::new(HashSha256),
            Box::new(CipherChaChaPoly),
            b"Noise_NN_25519_ChaChaPoly_SHA256",
        );
        let h0 = ss.get_handshake_hash().to_vec();
        ss.mix_key(&[1u8; 32]);
        ss.mix_hash(b"e-public-key");
        assert_ne!(ss.get_handshake_hash(), h0.as_slice());
        assert!(ss.has_key());

        let ct = ss.encrypt_and_hash(b"payload").unwrap();
        assert_ne!(ct, b"payload");
    }

    #[test]
    fn split_produces_two_independent_ciphers() {
        let mut a = SymmetricState::initialize(
            Box::new(HashSha256),
            Box::new(CipherChaChaPoly),
            b"Noise_NN_25519_ChaChaPoly_SHA256",
        );
        a.mix_key(&[9u8; 32]);
        let (mut c1, mut c2) = a.split();

        let ct = c1.encrypt_with_ad(b"", b"hello").unwrap();
        assert!(c2.decrypt_with_ad(b"", &ct).is_err());
    }
}
