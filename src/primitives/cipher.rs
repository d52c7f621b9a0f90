//! Default AEAD ciphers: ChaCha20-Poly1305 and AES-256-GCM, covering both
//! cipher names the protocol-name grammar accepts.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use chacha20poly1305::aead::{Aead, NewAead, Payload};
use chacha20poly1305::ChaCha20Poly1305;
use aes_gcm::Aes256Gcm;

use crate::error::NoiseError;

use super::Cipher;

pub struct CipherChaChaPoly;

impl Cipher for CipherChaChaPoly {
    fn name(&self) -> &'static str {
        "ChaChaPoly"
    }

    fn encode_nonce(&self, n: u64) -> Vec<u8> {
        let mut nonce = [0u8; 12];
        LittleEndian::write_u64(&mut nonce[4..], n);
        nonce.to_vec()
    }

    fn encrypt(&self, key: &[u8; 32], n: u64, ad: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let cipher = ChaCha20Poly1305::new((&(*key)).into());
        let nonce = self.encode_nonce(n);
        cipher
            .encrypt(nonce.as_slice().into(), Payload { msg: plaintext, aad: ad })
            .expect("chacha20poly1305 encryption is infallible for valid inputs")
    }

    fn decrypt(&self, key: &[u8; 32], n: u64, ad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let cipher = ChaCha20Poly1305::new((&(*key)).into());
        let nonce = self.encode_nonce(n);
        cipher
            .decrypt(nonce.as_slice().into(), Payload { msg: ciphertext, aad: ad })
            .map_err(|_| NoiseError::AuthFailed)
    }

    fn clone_box(&self) -> Box<dyn Cipher> {
        Box::new(CipherChaChaPoly)
    }
}

pub struct CipherAesGcm;

impl Cipher for CipherAesGcm {
    fn name(&self) -> &'static str {
        "AESGCM"
    }

    fn encode_nonce(&self, n: u64) -> Vec<u8> {
        let mut nonce = [0u8; 12];
        BigEndian::write_u64(&mut nonce[4..], n);
        nonce.to_vec()
    }

    fn encrypt(&self, key: &[u8; 32], n: u64, ad: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let cipher = Aes256Gcm::new((&(*key)).into());
        let nonce = self.encode_nonce(n);
        cipher
            .encrypt(nonce.as_slice().into(), Payload { msg: plaintext, aad: ad })
            .expect("aes-gcm encryption is infallible for valid inputs")
    }

    fn decrypt(&self, key: &[u8; 32], n: u64, ad: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, NoiseError> {
        let cipher = Aes256Gcm::new((&(*key)).into());
        let nonce = self.encode_nonce(n);
        cipher
            .decrypt(nonce.as_slice().into(), Payload { msg: ciphertext, aad: ad })
            .map_err(|_| NoiseError::AuthFailed)
    }

    fn clone_box(&self) -> Box<dyn Cipher> {
        Box::new(CipherAesGcm)
    }
}
