//! The `Noise_pattern_dh_cipher_hash` protocol-name grammar.

use crate::error::NoiseError;
use crate::pattern::catalog;
use crate::pattern::HandshakePattern;
use crate::primitives::resolver::is_known_component;

/// A parsed, but not yet resolved-against-a-registry, protocol name.
#[derive(Clone, Debug)]
pub struct NoiseParams {
    pub name: String,
    pub pattern_name: String,
    pub dh_name: String,
    pub cipher_name: String,
    pub hash_name: String,
}

impl NoiseParams {
    pub fn parse(name: &str) -> Result<NoiseParams, NoiseError> {
        let fields: Vec<&str> = name.split('_').collect();
        if fields.len() != 5 || fields[0] != "Noise" {
            return Err(NoiseError::InvalidProtocolName(name.to_string()));
        }

        let (pattern_name, dh_name, cipher_name, hash_name) =
            (fields[1].to_string(), fields[2].to_string(), fields[3].to_string(), fields[4].to_string());

        if !is_known_component("dh", &dh_name) {
            return Err(NoiseError::InvalidComponent("dh", dh_name));
        }
        if !is_known_component("cipher", &cipher_name) {
            return Err(NoiseError::InvalidComponent("cipher", cipher_name));
        }
        if !is_known_component("hash", &hash_name) {
            return Err(NoiseError::InvalidComponent("hash", hash_name));
        }

        Ok(NoiseParams { name: name.to_string(), pattern_name, dh_name, cipher_name, hash_name })
    }

    pub fn pattern(&self) -> Result<HandshakePattern, NoiseError> {
        catalog::lookup(&self.pattern_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_well_formed_name() {
        let p = NoiseParams::parse("Noise_XK_secp256k1_ChaChaPoly_SHA256").unwrap();
        assert_eq!(p.pattern_name, "XK");
        assert_eq!(p.dh_name, "secp256k1");
        assert_eq!(p.cipher_name, "ChaChaPoly");
        assert_eq!(p.hash_name, "SHA256");
    }

    #[test]
    fn rejects_wrong_field_count() {
        assert!(NoiseParams::parse("Noise_XK_25519").is_err());
    }

    #[test]
    fn rejects_wrong_prefix() {
        assert!(NoiseParams::parse("Nosie_XK_25519_ChaChaPoly_SHA256").is_err());
    }

    #[test]
    fn rejects_unknown_cipher() {
        let err = NoiseParams::parse("Noise_XK_25519_Bogus_SHA256").unwrap_err();
        match err {
            NoiseError::InvalidComponent(kind, name) => {
                assert_eq!(kind, "cipher");
                assert_eq!(name, "Bogus");
            }
            _ => panic!("wrong error: {}", err),
        }
    }
}
