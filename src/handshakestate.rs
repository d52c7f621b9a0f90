//! `HandshakeState`: drives a compiled token program to completion, in place
//! of a hardcoded three-act Noise_XK exchange
//! (`gen_act_one`/`recv_act_one`/`gen_act_two`/...), dispatching over any
//! compiled pattern through a single `write_message`/`read_message` pair.
//!
//! `Builder` is the public entry point: it resolves primitives from a
//! `Registry`, validates PSK counts, and folds in pre-message public keys
//! before handing back a ready-to-run `HandshakeState`.

use std::collections::VecDeque;

use zeroize::Zeroize;

use crate::cipherstate::{CipherState, Rekeyer};
use crate::error::NoiseError;
use crate::params::NoiseParams;
use crate::pattern::{PatternLine, Token};
use crate::primitives::resolver::DefaultResolver;
use crate::primitives::{Dh, Registry};
use crate::symmetricstate::SymmetricState;

struct Keypair {
    private: Vec<u8>,
    public: Vec<u8>,
}

impl Drop for Keypair {
    fn drop(&mut self) {
        self.private.zeroize();
    }
}

/// A thin wrapper so PSKs zeroize on drop without giving `HandshakeState`
/// itself a `Drop` impl, which would forbid moving `self.ss` out in
/// `split()`.
struct Psks(VecDeque<[u8; 32]>);

impl Drop for Psks {
    fn drop(&mut self) {
        for psk in self.0.iter_mut() {
            psk.zeroize();
        }
    }
}

pub struct HandshakeState {
    ss: SymmetricState,
    dh: Box<dyn Dh>,
    s: Option<Keypair>,
    e: Option<Keypair>,
    rs: Option<Vec<u8>>,
    re: Option<Vec<u8>>,
    initiator: bool,
    should_write: bool,
    psks: Psks,
    is_psk: bool,
    message_patterns: VecDeque<PatternLine>,
    local_ephemeral_seed: Option<Vec<u8>>,
    rekeyer: Option<Rekeyer>,
}

impl HandshakeState {
    pub fn is_handshake_complete(&self) -> bool {
        self.message_patterns.is_empty()
    }

    pub fn get_handshake_hash(&self) -> &[u8] {
        self.ss.get_handshake_hash()
    }

    /// `Split`. Only meaningful once [`is_handshake_complete`] is `true`;
    /// calling it earlier hands back transport ciphers keyed on an
    /// incomplete transcript. The configured `Rekeyer`, if any, is installed
    /// on both resulting transport `CipherState`s.
    ///
    /// Both peers derive the same two keys in the same order: the first
    /// `CipherState` carries initiator-to-responder traffic, the second
    /// carries responder-to-initiator traffic. The initiator encrypts with
    /// its first and decrypts with its second; the responder does the
    /// opposite with its own copies of the same two keys.
    pub fn split(self) -> (CipherState, CipherState) {
        let rekeyer = self.rekeyer;
        let (mut c1, mut c2) = self.ss.split();
        if let Some(rekeyer) = rekeyer {
            c1.set_rekeyer(rekeyer);
            c2.set_rekeyer(rekeyer);
        }
        (c1, c2)
    }

    pub fn write_message(&mut self, payload: &[u8]) -> Result<Vec<u8>, NoiseError> {
        if !self.should_write {
            return Err(NoiseError::WrongTurn);
        }
        let line = self.message_patterns.pop_front().ok_or(NoiseError::WrongTurn)?;

        let mut buffer = Vec::new();
        for tok in &line.tokens {
            match tok {
                Token::E => {
                    self.generate_local_e();
                    let public = self.e.as_ref().expect("just generated").public.clone();
                    buffer.extend_from_slice(&public);
                    self.ss.mix_hash(&public);
                    if self.is_psk {
                        self.ss.mix_key(&public);
                    }
                }
                Token::S => {
                    let public = self.s.as_ref().ok_or(NoiseError::MissingKey("s"))?.public.clone();
                    let ct = self.ss.encrypt_and_hash(&public)?;
                    buffer.extend_from_slice(&ct);
                }
                Token::Ee | Token::Es | Token::Se | Token::Ss => self.mix_dh(*tok)?,
                Token::Psk => {
                    let psk = self.psks.0.pop_front().expect("builder validated the psk count");
                    self.ss.mix_key_and_hash(&psk);
                }
            }
        }

        let ct = self.ss.encrypt_and_hash(payload)?;
        buffer.extend_from_slice(&ct);
        self.should_write = false;
        Ok(buffer)
    }

    pub fn read_message(&mut self, message: &[u8]) -> Result<Vec<u8>, NoiseError> {
        if self.should_write {
            return Err(NoiseError::WrongTurn);
        }
        let line = self.message_patterns.pop_front().ok_or(NoiseError::WrongTurn)?;

        let mut cursor = 0usize;
        for tok in &line.tokens {
            match tok {
                Token::E => {
                    let len = self.dh.publen();
                    let bytes = take(message, &mut cursor, len)?.to_vec();
                    self.ss.mix_hash(&bytes);
                    if self.is_psk {
                        self.ss.mix_key(&bytes);
                    }
                    self.re = Some(bytes);
                }
                Token::S => {
                    let len = self.dh.publen() + if self.ss.has_key() { 16 } else { 0 };
                    let bytes = take(message, &mut cursor, len)?;
                    let rs = self.ss.decrypt_and_hash(bytes)?;
                    self.rs = Some(rs);
                }
                Token::Ee | Token::Es | Token::Se | Token::Ss => self.mix_dh(*tok)?,
                Token::Psk => {
                    let psk = self.psks.0.pop_front().expect("builder validated the psk count");
                    self.ss.mix_key_and_hash(&psk);
                }
            }
        }

        let payload_ciphertext = &message[cursor..];
        let plaintext = self.ss.decrypt_and_hash(payload_ciphertext)?;
        self.should_write = true;
        Ok(plaintext)
    }

    fn generate_local_e(&mut self) {
        let (private, public) = self.dh.generate_keypair(self.local_ephemeral_seed.as_deref());
        self.e = Some(Keypair { private, public });
    }

    /// Performs one of the four asymmetric DH tokens. Which side's static or
    /// ephemeral key plays which role in `es`/`se` depends on the overall
    /// initiator/responder role, not on who sent the current line.
    fn mix_dh(&mut self, tok: Token) -> Result<(), NoiseError> {
        let (priv_key, pub_key): (&[u8], &[u8]) = match tok {
            Token::Ee => (
                &self.e.as_ref().ok_or(NoiseError::MissingKey("e"))?.private,
                self.re.as_ref().ok_or(NoiseError::MissingKey("re"))?,
            ),
            Token::Es if self.initiator => (
                &self.e.as_ref().ok_or(NoiseError::MissingKey("e"))?.private,
                self.rs.as_ref().ok_or(NoiseError::MissingKey("rs"))?,
            ),
            Token::Es => (
                &self.s.as_ref().ok_or(NoiseError::MissingKey("s"))?.private,
                self.re.as_ref().ok_or(NoiseError::MissingKey("re"))?,
            ),
            Token::Se if self.initiator => (
                &self.s.as_ref().ok_or(NoiseError::MissingKey("s"))?.private,
                self.re.as_ref().ok_or(NoiseError::MissingKey("re"))?,
            ),
            Token::Se => (
                &self.e.as_ref().ok_or(NoiseError::MissingKey("e"))?.private,
                self.rs.as_ref().ok_or(NoiseError::MissingKey("rs"))?,
            ),
            Token::Ss => (
                &self.s.as_ref().ok_or(NoiseError::MissingKey("s"))?.private,
                self.rs.as_ref().ok_or(NoiseError::MissingKey("rs"))?,
            ),
            Token::E | Token::S | Token::Psk => unreachable!("only dispatched for the four dh tokens"),
        };
        let shared = self.dh.dh(priv_key, pub_key)?;
        self.ss.mix_key(&shared);
        Ok(())
    }

    fn process_premessages(&mut self, tokens: &[Token], sender_is_initiator: bool) -> Result<(), NoiseError> {
        let we_are_sender = self.initiator == sender_is_initiator;
        for tok in tokens {
            let public = match (tok, we_are_sender) {
                (Token::S, true) => self.s.as_ref().ok_or(NoiseError::MissingKey("s"))?.public.clone(),
                (Token::S, false) => self.rs.clone().ok_or(NoiseError::MissingKey("rs"))?,
                (Token::E, true) => self.e.as_ref().ok_or(NoiseError::MissingKey("e"))?.public.clone(),
                (Token::E, false) => self.re.clone().ok_or(NoiseError::MissingKey("re"))?,
                _ => unreachable!("the pattern compiler only allows e/s in pre-messages"),
            };
            self.ss.mix_hash(&public);
        }
        Ok(())
    }
}

fn take<'a>(message: &'a [u8], cursor: &mut usize, len: usize) -> Result<&'a [u8], NoiseError> {
    if message.len() < *cursor + len {
        return Err(NoiseError::TruncatedMessage);
    }
    let bytes = &message[*cursor..*cursor + len];
    *cursor += len;
    Ok(bytes)
}

/// Configures and constructs a `HandshakeState` for one side of a handshake.
/// Chained setters in place of a closures-as-options constructor
/// (`Machine::new(..., &[options])`).
pub struct Builder {
    registry: Box<dyn Registry>,
    prologue: Vec<u8>,
    local_private: Option<Vec<u8>>,
    local_ephemeral_seed: Option<Vec<u8>>,
    remote_static: Option<Vec<u8>>,
    psks: Vec<[u8; 32]>,
    rekeyer: Option<Rekeyer>,
    auto_padding: bool,
}

impl Default for Builder {
    fn default() -> Builder {
        Builder {
            registry: Box::new(DefaultResolver::default()),
            prologue: Vec::new(),
            local_private: None,
            local_ephemeral_seed: None,
            remote_static: None,
            psks: Vec::new(),
            rekeyer: None,
            auto_padding: false,
        }
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn with_registry(mut self, registry: Box<dyn Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn prologue(mut self, prologue: &[u8]) -> Self {
        self.prologue = prologue.to_vec();
        self
    }

    pub fn local_private_key(mut self, private: &[u8]) -> Self {
        self.local_private = Some(private.to_vec());
        self
    }

    pub fn remote_public_key(mut self, public: &[u8]) -> Self {
        self.remote_static = Some(public.to_vec());
        self
    }

    /// Fixes the ephemeral scalar instead of drawing it from the system
    /// CSPRNG, for reproducing published test vectors.
    pub fn local_ephemeral_seed(mut self, seed: &[u8]) -> Self {
        self.local_ephemeral_seed = Some(seed.to_vec());
        self
    }

    pub fn psks(mut self, psks: &[[u8; 32]]) -> Self {
        self.psks = psks.to_vec();
        self
    }

    pub fn rekeyer(mut self, rekeyer: Rekeyer) -> Self {
        self.rekeyer = Some(rekeyer);
        self
    }

    /// When enabled, a local `s` required by the pattern's pre-messages but
    /// never supplied via `local_private_key` is generated instead of
    /// failing with `MissingKey`. Local `e` is always generated on demand
    /// regardless of this flag, since there is no "supplied ephemeral"
    /// alternative other than seeding its entropy.
    pub fn auto_padding(mut self, enabled: bool) -> Self {
        self.auto_padding = enabled;
        self
    }

    pub fn build_initiator(self, protocol_name: &str) -> Result<HandshakeState, NoiseError> {
        self.build(protocol_name, true)
    }

    pub fn build_responder(self, protocol_name: &str) -> Result<HandshakeState, NoiseError> {
        self.build(protocol_name, false)
    }

    fn build(self, protocol_name: &str, initiator: bool) -> Result<HandshakeState, NoiseError> {
        let params = NoiseParams::parse(protocol_name)?;

        let dh = self
            .registry
            .dh(&params.dh_name)
            .ok_or_else(|| NoiseError::InvalidComponent("dh", params.dh_name.clone()))?;
        let cipher = self
            .registry
            .cipher(&params.cipher_name)
            .ok_or_else(|| NoiseError::InvalidComponent("cipher", params.cipher_name.clone()))?;
        let hash = self
            .registry
            .hash(&params.hash_name)
            .ok_or_else(|| NoiseError::InvalidComponent("hash", params.hash_name.clone()))?;
        let pattern = params.pattern()?;

        if self.psks.len() != pattern.psk_count() {
            return Err(NoiseError::PSKCountMismatch { expected: pattern.psk_count(), got: self.psks.len() });
        }

        let local_static = match self.local_private {
            Some(private) => {
                let public = dh.public_from_private(&private);
                Some(Keypair { private, public })
            }
            None => None,
        };

        let mut ss = SymmetricState::initialize(hash, cipher, protocol_name.as_bytes());
        ss.mix_hash(&self.prologue);

        let mut handshake = HandshakeState {
            ss,
            dh,
            s: local_static,
            e: None,
            rs: self.remote_static,
            re: None,
            initiator,
            should_write: initiator,
            psks: Psks(VecDeque::from(self.psks)),
            is_psk: pattern.psk_count() > 0,
            message_patterns: VecDeque::from(pattern.message_patterns),
            local_ephemeral_seed: self.local_ephemeral_seed,
            rekeyer: self.rekeyer,
        };

        if (initiator && pattern.pre_initiator.contains(&Token::E))
            || (!initiator && pattern.pre_responder.contains(&Token::E))
        {
            handshake.generate_local_e();
        }

        let our_premessage_tokens = if initiator { &pattern.pre_initiator } else { &pattern.pre_responder };
        if self.auto_padding && our_premessage_tokens.contains(&Token::S) && handshake.s.is_none() {
            let (private, public) = handshake.dh.generate_keypair(None);
            handshake.s = Some(Keypair { private, public });
        }

        handshake.process_premessages(&pattern.pre_initiator, true)?;
        handshake.process_premessages(&pattern.pre_responder, false)?;

        Ok(handshake)
    }
}
