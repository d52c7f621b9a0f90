//! Default DH curves: secp256k1 (compressed-point ECDH folded through
//! SHA-256) and Curve25519 (x25519-dalek), so every DH name the
//! protocol-name grammar accepts by default actually resolves to an
//! implementation.

use rand::RngCore;
use rand_core::{CryptoRng, RngCore as RandCoreRngCore};
use sha2::{Digest, Sha256};
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::NoiseError;

use super::Dh;

/// secp256k1, shared secret = SHA256(compressed shared point), as the
/// Lightning Network's Bolt#8 transport handshake defines it.
pub struct DhSecp256k1;

impl Dh for DhSecp256k1 {
    fn name(&self) -> &'static str {
        "secp256k1"
    }

    fn dhlen(&self) -> usize {
        32
    }

    fn publen(&self) -> usize {
        33
    }

    fn generate_keypair(&self, entropy: Option<&[u8]>) -> (Vec<u8>, Vec<u8>) {
        use secp256k1::Secp256k1;

        let secret = match entropy {
            Some(bytes) => {
                secp256k1::SecretKey::from_slice(&Secp256k1::new(), bytes)
                    .expect("caller supplied entropy must be a valid secp256k1 scalar")
            }
            None => {
                let mut rng = rand::thread_rng();
                loop {
                    let mut bytes = [0u8; 32];
                    rng.fill_bytes(&mut bytes);
                    if let Ok(sk) = secp256k1::SecretKey::from_slice(&Secp256k1::new(), &bytes) {
                        break sk;
                    }
                }
            }
        };

        let public = self.public_from_private(&secret[..]);
        (secret[..].to_vec(), public)
    }

    fn public_from_private(&self, private: &[u8]) -> Vec<u8> {
        use secp256k1::{PublicKey, Secp256k1, SecretKey};

        let sk = SecretKey::from_slice(&Secp256k1::new(), private)
            .expect("private key must already be validated by generate_keypair/load_private");
        let pk = PublicKey::from_secret_key(&Secp256k1::new(), &sk)
            .expect("valid secret key always has a public key");
        pk.serialize().to_vec()
    }

    fn dh(&self, private: &[u8], public: &[u8]) -> Result<Vec<u8>, NoiseError> {
        use secp256k1::{PublicKey, Secp256k1, SecretKey};

        let sk = SecretKey::from_slice(&Secp256k1::new(), private).map_err(|_| NoiseError::InvalidPublicKey)?;
        let mut pk = PublicKey::from_slice(&Secp256k1::new(), public).map_err(|_| NoiseError::InvalidPublicKey)?;
        pk.mul_assign(&Secp256k1::new(), &sk).map_err(|_| NoiseError::InvalidPublicKey)?;

        let mut hasher = Sha256::default();
        hasher.input(&pk.serialize());
        Ok(hasher.result().to_vec())
    }
}

/// Curve25519, the Noise specification's reference DH function.
pub struct Dh25519;

struct OsRng;

impl RandCoreRngCore for OsRng {
    fn next_u32(&mut self) -> u32 {
        rand::thread_rng().next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        rand::thread_rng().next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand::thread_rng().fill_bytes(dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
impl CryptoRng for OsRng {}

impl Dh for Dh25519 {
    fn name(&self) -> &'static str {
        "25519"
    }

    fn dhlen(&self) -> usize {
        32
    }

    fn publen(&self) -> usize {
        32
    }

    fn generate_keypair(&self, entropy: Option<&[u8]>) -> (Vec<u8>, Vec<u8>) {
        let secret = match entropy {
            Some(bytes) => {
                let mut raw = [0u8; 32];
                raw.copy_from_slice(&bytes[..32]);
                StaticSecret::from(raw)
            }
            None => StaticSecret::new(&mut OsRng),
        };
        let public = PublicKey::from(&secret);
        (secret.to_bytes().to_vec(), public.as_bytes().to_vec())
    }

    fn public_from_private(&self, private: &[u8]) -> Vec<u8> {
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(private);
        let secret = StaticSecret::from(scalar);
        PublicKey::from(&secret).as_bytes().to_vec()
    }

    fn dh(&self, private: &[u8], public: &[u8]) -> Result<Vec<u8>, NoiseError> {
        if public.len() != 32 {
            return Err(NoiseError::InvalidPublicKey);
        }
        let mut scalar = [0u8; 32];
        scalar.copy_from_slice(private);
        let mut point = [0u8; 32];
        point.copy_from_slice(public);

        let secret = StaticSecret::from(scalar);
        let shared = secret.diffie_hellman(&PublicKey::from(point));
        // All-zero output means the peer's point was a low-order point.
        if shared.as_bytes().iter().all(|b| *b == 0) {
            return Err(NoiseError::InvalidPublicKey);
        }
        Ok(shared.as_bytes().to_vec())
    }
}
