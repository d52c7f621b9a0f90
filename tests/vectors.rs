//! End-to-end scenarios exercising the pattern compiler and the full
//! CipherState/SymmetricState/HandshakeState stack together, the way a
//! caller embedding this crate would.

use noiseguard::{Builder, DefaultResolver, Dh, HandshakePattern, NoiseError, Registry, Rekeyer};

#[test]
fn s1_nn_handshake_round_trips_a_transport_message() {
    let mut initiator = Builder::new().build_initiator("Noise_NN_25519_ChaChaPoly_SHA256").unwrap();
    let mut responder = Builder::new().build_responder("Noise_NN_25519_ChaChaPoly_SHA256").unwrap();

    let msg1 = initiator.write_message(b"").unwrap();
    responder.read_message(&msg1).unwrap();
    let msg2 = responder.write_message(b"").unwrap();
    initiator.read_message(&msg2).unwrap();

    assert!(initiator.is_handshake_complete());
    assert_eq!(initiator.get_handshake_hash(), responder.get_handshake_hash());

    let (mut i_c1, _i_c2) = initiator.split();
    let (mut r_c1, _r_c2) = responder.split();

    let ct = i_c1.encrypt_with_ad(b"", b"hello").unwrap();
    assert_eq!(r_c1.decrypt_with_ad(b"", &ct).unwrap(), b"hello");
}

#[test]
fn s2_xx_handshake_with_static_keys_round_trips_and_detects_tampering() {
    let resolver = DefaultResolver::default();
    let dh = resolver.dh("25519").unwrap();
    let (i_private, _) = dh.generate_keypair(None);
    let (r_private, _) = dh.generate_keypair(None);

    let mut initiator =
        Builder::new().local_private_key(&i_private).build_initiator("Noise_XX_25519_AESGCM_SHA256").unwrap();
    let mut responder =
        Builder::new().local_private_key(&r_private).build_responder("Noise_XX_25519_AESGCM_SHA256").unwrap();

    let msg1 = initiator.write_message(b"").unwrap();
    responder.read_message(&msg1).unwrap();
    let msg2 = responder.write_message(b"").unwrap();
    initiator.read_message(&msg2).unwrap();
    let msg3 = initiator.write_message(b"").unwrap();
    responder.read_message(&msg3).unwrap();

    assert!(initiator.is_handshake_complete());
    assert!(responder.is_handshake_complete());

    let (mut i_c1, mut i_c2) = initiator.split();
    let (mut r_c1, mut r_c2) = responder.split();

    let ct = i_c1.encrypt_with_ad(b"", b"abc").unwrap();
    assert_eq!(r_c1.decrypt_with_ad(b"", &ct).unwrap(), b"abc");

    let mut tampered = r_c2.encrypt_with_ad(b"", b"abc").unwrap();
    tampered[0] ^= 0xFF;
    let err = i_c2.decrypt_with_ad(b"", &tampered).unwrap_err();
    assert!(matches!(err, NoiseError::AuthFailed));
}

#[test]
fn s3_ik_handshake_fails_when_the_initiator_has_the_wrong_remote_static() {
    let resolver = DefaultResolver::default();
    let dh = resolver.dh("25519").unwrap();
    let (i_private, _) = dh.generate_keypair(None);
    let (r_private, r_public) = dh.generate_keypair(None);
    let (_, wrong_public) = dh.generate_keypair(None);

    // Baseline: the correct rs lets the handshake complete.
    let mut initiator = Builder::new()
        .local_private_key(&i_private)
        .remote_public_key(&r_public)
        .build_initiator("Noise_IK_25519_ChaChaPoly_BLAKE2s")
        .unwrap();
    let mut responder =
        Builder::new().local_private_key(&r_private).build_responder("Noise_IK_25519_ChaChaPoly_BLAKE2s").unwrap();
    let msg1 = initiator.write_message(b"").unwrap();
    responder.read_message(&msg1).unwrap();

    // The same exchange with a wrong rs on the initiator's side fails on
    // the responder's very first read, since the `es`/`ss` shared secrets
    // the two sides compute no longer agree.
    let mut bad_initiator = Builder::new()
        .local_private_key(&i_private)
        .remote_public_key(&wrong_public)
        .build_initiator("Noise_IK_25519_ChaChaPoly_BLAKE2s")
        .unwrap();
    let mut responder2 =
        Builder::new().local_private_key(&r_private).build_responder("Noise_IK_25519_ChaChaPoly_BLAKE2s").unwrap();
    let bad_msg1 = bad_initiator.write_message(b"").unwrap();
    let err = responder2.read_message(&bad_msg1).unwrap_err();
    assert!(matches!(err, NoiseError::AuthFailed));
}

#[test]
fn s4_nnpsk0_diverges_from_plain_nn_given_the_same_ephemerals() {
    let seed_i = [0x01u8; 32];
    let seed_r = [0x02u8; 32];

    let mut plain_i =
        Builder::new().local_ephemeral_seed(&seed_i).build_initiator("Noise_NN_25519_ChaChaPoly_SHA256").unwrap();
    let mut plain_r =
        Builder::new().local_ephemeral_seed(&seed_r).build_responder("Noise_NN_25519_ChaChaPoly_SHA256").unwrap();
    let m1 = plain_i.write_message(b"").unwrap();
    plain_r.read_message(&m1).unwrap();
    let m2 = plain_r.write_message(b"").unwrap();
    plain_i.read_message(&m2).unwrap();
    let plain_hash = plain_i.get_handshake_hash().to_vec();

    let psk = [0u8; 32];
    let mut psk_i = Builder::new()
        .local_ephemeral_seed(&seed_i)
        .psks(&[psk])
        .build_initiator("Noise_NNpsk0_25519_ChaChaPoly_SHA256")
        .unwrap();
    let mut psk_r = Builder::new()
        .local_ephemeral_seed(&seed_r)
        .psks(&[psk])
        .build_responder("Noise_NNpsk0_25519_ChaChaPoly_SHA256")
        .unwrap();
    let m1 = psk_i.write_message(b"").unwrap();
    psk_r.read_message(&m1).unwrap();
    let m2 = psk_r.write_message(b"").unwrap();
    psk_i.read_message(&m2).unwrap();
    let psk_hash = psk_i.get_handshake_hash().to_vec();

    assert_ne!(plain_hash, psk_hash);
}

#[test]
fn s5_default_rekeyer_rotates_the_key_after_ten_thousand_messages() {
    let seed_i = [0x11u8; 32];
    let seed_r = [0x22u8; 32];

    // The live stream: a fresh default Rekeyer installed on both ends.
    let mut live_i = Builder::new()
        .local_ephemeral_seed(&seed_i)
        .rekeyer(Rekeyer::default())
        .build_initiator("Noise_NN_25519_ChaChaPoly_SHA256")
        .unwrap();
    let mut live_r = Builder::new()
        .local_ephemeral_seed(&seed_r)
        .rekeyer(Rekeyer::default())
        .build_responder("Noise_NN_25519_ChaChaPoly_SHA256")
        .unwrap();
    let m1 = live_i.write_message(b"").unwrap();
    live_r.read_message(&m1).unwrap();
    let m2 = live_r.write_message(b"").unwrap();
    live_i.read_message(&m2).unwrap();
    let (mut live_c1, _) = live_i.split();
    let (mut live_c1_peer, _) = live_r.split();

    let mut last_ct = Vec::new();
    for _ in 0..10_001 {
        last_ct = live_c1.encrypt_with_ad(b"", b"x").unwrap();
        assert_eq!(live_c1_peer.decrypt_with_ad(b"", &last_ct).unwrap(), b"x");
    }

    // A second, identical handshake (same ephemerals -> same split keys)
    // with no Rekeyer installed never rotates. Its very first message, at
    // nonce zero under the original key, must differ from the live
    // stream's 10001st message, which landed at nonce zero too but under
    // the key the default interval-10000 Rekeyer just rotated to.
    let mut stale_i =
        Builder::new().local_ephemeral_seed(&seed_i).build_initiator("Noise_NN_25519_ChaChaPoly_SHA256").unwrap();
    let mut stale_r =
        Builder::new().local_ephemeral_seed(&seed_r).build_responder("Noise_NN_25519_ChaChaPoly_SHA256").unwrap();
    let m1 = stale_i.write_message(b"").unwrap();
    stale_r.read_message(&m1).unwrap();
    let m2 = stale_r.write_message(b"").unwrap();
    stale_i.read_message(&m2).unwrap();
    let (mut stale_c1, _) = stale_i.split();

    let stale_ct = stale_c1.encrypt_with_ad(b"", b"x").unwrap();
    assert_ne!(stale_ct, last_ct);
}

#[test]
fn s6_pattern_validator_rejects_malformed_patterns_with_the_named_rule() {
    let err = HandshakePattern::compile("bad", "-> e\n-> ee").unwrap_err();
    match err {
        NoiseError::InvalidPattern { rule, offending_line } => {
            assert_eq!(rule, "consecutive_same_direction");
            assert!(offending_line.contains("ee"));
        }
        other => panic!("wrong error: {:?}", other),
    }

    let err = HandshakePattern::compile("bad", "-> e\n<- e, ee, ee").unwrap_err();
    match err {
        NoiseError::InvalidPattern { rule, offending_line } => {
            assert_eq!(rule, "repeated_token");
            assert!(offending_line.contains("ee"));
        }
        other => panic!("wrong error: {:?}", other),
    }
}
