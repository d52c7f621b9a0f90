//! The default primitive catalog, a plain value (not process-wide state)
//! that the `Builder` consults unless a caller installs its own `Registry`.

use super::cipher::{CipherAesGcm, CipherChaChaPoly};
use super::dh::{Dh25519, DhSecp256k1};
use super::hash::{HashBlake2b, HashBlake2s, HashSha256, HashSha512};
use super::{Cipher, Dh, Hash, Registry};

#[derive(Default)]
pub struct DefaultResolver;

impl Registry for DefaultResolver {
    fn dh(&self, name: &str) -> Option<Box<dyn Dh>> {
        match name {
            "25519" => Some(Box::new(Dh25519)),
            "secp256k1" => Some(Box::new(DhSecp256k1)),
            _ => None,
        }
    }

    fn cipher(&self, name: &str) -> Option<Box<dyn Cipher>> {
        match name {
            "ChaChaPoly" => Some(Box::new(CipherChaChaPoly)),
            "AESGCM" => Some(Box::new(CipherAesGcm)),
            _ => None,
        }
    }

    fn hash(&self, name: &str) -> Option<Box<dyn Hash>> {
        match name {
            "SHA256" => Some(Box::new(HashSha256)),
            "SHA512" => Some(Box::new(HashSha512)),
            "BLAKE2s" => Some(Box::new(HashBlake2s)),
            "BLAKE2b" => Some(Box::new(HashBlake2b)),
            _ => None,
        }
    }
}

/// Names the protocol-name grammar recognizes even when this crate
/// ships no default implementation for them, so `InvalidComponent` is only
/// raised for genuinely unknown names rather than every unresolvable one.
pub fn is_known_component(kind: &str, name: &str) -> bool {
    match kind {
        "dh" => matches!(name, "25519" | "448" | "secp256k1"),
        "cipher" => matches!(name, "AESGCM" | "ChaChaPoly"),
        "hash" => matches!(name, "SHA256" | "SHA512" | "BLAKE2s" | "BLAKE2b"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_every_default_primitive() {
        let r = DefaultResolver::default();
        assert!(r.dh("25519").is_some());
        assert!(r.dh("secp256k1").is_some());
        assert!(r.cipher("ChaChaPoly").is_some());
        assert!(r.cipher("AESGCM").is_some());
        assert!(r.hash("SHA256").is_some());
        assert!(r.hash("SHA512").is_some());
        assert!(r.hash("BLAKE2s").is_some());
        assert!(r.hash("BLAKE2b").is_some());
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        let r = DefaultResolver::default();
        assert!(r.dh("448").is_none());
        assert!(r.dh("bogus").is_none());
    }
}
