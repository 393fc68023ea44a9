//! # Key Material
//!
//! Seed handling and the two keypairs the provider holds:
//!
//! - an Ed25519 **signing keypair**, derived directly from the 32-byte seed;
//! - an X25519 **encryption keypair**, obtained by converting the signing
//!   keypair from Edwards to Montgomery form. It is never generated on its
//!   own, so one seed always yields one identity.
//!
//! ## Conversion
//!
//! The public half goes through the birational map `u = (1 + y) / (1 - y)`
//! (`VerifyingKey::to_montgomery`). The secret half is the first 32 bytes of
//! `SHA-512(seed)`, the same scalar Ed25519 signs with; X25519 clamps it on
//! use. Both conversions are total for keys derived here.
//!
//! ## Security considerations
//!
//! - Seeds are zeroized on drop, and so are the dalek secret types.
//! - `Debug` never prints secret material. Key bytes are never logged.

use std::fmt;
use std::sync::OnceLock;

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use thiserror::Error;
use x25519_dalek::{PublicKey as X25519PublicKey, SharedSecret, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::{PUBLIC_KEY_LENGTH, SEED_LENGTH, SIGNATURE_LENGTH, X25519_KEY_LENGTH};
use crate::identity::did::encode_did;

/// Errors that can occur while building key material.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid seed length: expected {expected} bytes, got {actual}")]
    InvalidSeedLength { expected: usize, actual: usize },

    #[error("seed is not valid hex")]
    InvalidHex,

    #[error("invalid public key bytes: not a valid Ed25519 point")]
    InvalidPublicKey,
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

/// The 32 raw bytes every key in the provider is derived from.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_LENGTH]);

impl Seed {
    /// Wrap an exact 32-byte seed.
    pub fn new(bytes: [u8; SEED_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Build a seed from a byte slice, rejecting anything but 32 bytes.
    ///
    /// No truncation or padding ever happens: a 31- or 33-byte seed is a
    /// caller bug and is reported as one.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, KeyError> {
        let arr: [u8; SEED_LENGTH] = bytes.try_into().map_err(|_| KeyError::InvalidSeedLength {
            expected: SEED_LENGTH,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Parse a hex-encoded seed (surrounding whitespace is ignored).
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let mut bytes = hex::decode(hex_str.trim()).map_err(|_| KeyError::InvalidHex)?;
        let seed = Self::from_slice(&bytes);
        bytes.zeroize();
        seed
    }

    pub(crate) fn as_bytes(&self) -> &[u8; SEED_LENGTH] {
        &self.0
    }
}

impl From<[u8; SEED_LENGTH]> for Seed {
    fn from(bytes: [u8; SEED_LENGTH]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(<redacted>)")
    }
}

// ---------------------------------------------------------------------------
// SigningKeypair
// ---------------------------------------------------------------------------

/// Ed25519 keypair derived from a [`Seed`].
///
/// Not `Serialize`.
pub struct SigningKeypair {
    signing_key: SigningKey,
}

impl SigningKeypair {
    /// Returns the 32-byte Ed25519 public key.
    pub fn public_key(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Hex-encoded public key. Safe to log.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key())
    }

    /// The dalek verifying key, for callers that verify directly.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// Sign `message`. Deterministic per RFC 8032.
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        self.signing_key.sign(message).to_bytes()
    }

    /// The Montgomery-form secret scalar bytes (unclamped).
    pub fn to_x25519_secret(&self) -> [u8; X25519_KEY_LENGTH] {
        self.signing_key.to_scalar_bytes()
    }

    /// The Montgomery-form public key.
    pub fn to_x25519_public(&self) -> [u8; X25519_KEY_LENGTH] {
        self.signing_key.verifying_key().to_montgomery().to_bytes()
    }
}

impl fmt::Debug for SigningKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningKeypair(pub={})", self.public_key_hex())
    }
}

// ---------------------------------------------------------------------------
// EncryptionKeypair
// ---------------------------------------------------------------------------

/// X25519 keypair converted from a [`SigningKeypair`].
#[derive(Clone)]
pub struct EncryptionKeypair {
    secret: StaticSecret,
    public: X25519PublicKey,
}

impl EncryptionKeypair {
    /// Returns the 32-byte X25519 public key.
    pub fn public_key(&self) -> [u8; X25519_KEY_LENGTH] {
        self.public.to_bytes()
    }

    /// Raw X25519 agreement with a peer public key.
    pub(crate) fn diffie_hellman(&self, peer_public: &[u8; X25519_KEY_LENGTH]) -> SharedSecret {
        self.secret
            .diffie_hellman(&X25519PublicKey::from(*peer_public))
    }
}

impl fmt::Debug for EncryptionKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionKeypair(pub={})", hex::encode(self.public_key()))
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive the Ed25519 signing keypair. The seed is the RFC 8032 secret key.
pub fn derive_signing_keypair(seed: &Seed) -> SigningKeypair {
    SigningKeypair {
        signing_key: SigningKey::from_bytes(seed.as_bytes()),
    }
}

/// Convert a signing keypair into its X25519 counterpart.
///
/// The two halves are converted independently; the public half is taken from
/// the Edwards point rather than recomputed from the converted secret, and
/// the two always agree.
pub fn derive_encryption_keypair(signing: &SigningKeypair) -> EncryptionKeypair {
    let secret = StaticSecret::from(signing.to_x25519_secret());
    let public = X25519PublicKey::from(signing.to_x25519_public());
    EncryptionKeypair { secret, public }
}

/// Convert any Ed25519 public key into its X25519 form.
///
/// Fails with [`KeyError::InvalidPublicKey`] when the bytes do not decode to
/// a point on the Edwards curve.
pub fn edwards_to_montgomery(
    public_key: &[u8; PUBLIC_KEY_LENGTH],
) -> Result<[u8; X25519_KEY_LENGTH], KeyError> {
    CompressedEdwardsY(*public_key)
        .decompress()
        .map(|point| point.to_montgomery().to_bytes())
        .ok_or(KeyError::InvalidPublicKey)
}

// ---------------------------------------------------------------------------
// KeyMaterial
// ---------------------------------------------------------------------------

/// Everything derived from one seed: the signing keypair, its DID, and the
/// encryption keypair.
///
/// The DID is computed once at construction. The encryption keypair is only
/// needed by decryption, so it is derived on first use and cached; the
/// `OnceLock` makes that safe under concurrent first calls.
pub struct KeyMaterial {
    signing: SigningKeypair,
    did: String,
    encryption: OnceLock<EncryptionKeypair>,
}

impl KeyMaterial {
    /// Derive the key material for `seed`. The seed is dropped (and zeroized)
    /// once the signing key holds its own copy.
    pub fn from_seed(seed: Seed) -> Self {
        let signing = derive_signing_keypair(&seed);
        let did = encode_did(&signing.public_key());
        Self {
            signing,
            did,
            encryption: OnceLock::new(),
        }
    }

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn signing(&self) -> &SigningKeypair {
        &self.signing
    }

    /// The X25519 keypair, derived on first call.
    pub fn encryption(&self) -> &EncryptionKeypair {
        self.encryption.get_or_init(|| {
            tracing::debug!(did = %self.did, "deriving X25519 encryption keypair");
            derive_encryption_keypair(&self.signing)
        })
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("did", &self.did)
            .field("encryption_derived", &self.encryption.get().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signature, Verifier};

    /// RFC 8032 section 7.1, TEST 1.
    const RFC8032_SEED: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
    const RFC8032_PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";
    const RFC8032_X25519_PUBLIC: &str =
        "d85e07ec22b0ad881537c2f44d662d1a143cf830c57aca4305d85c7a90f6b62e";
    const RFC8032_X25519_SECRET: &str =
        "357c83864f2833cb427a2ef1c00a013cfdff2768d980c0a3a520f006904de90f";

    fn rfc_keypair() -> SigningKeypair {
        derive_signing_keypair(&Seed::from_hex(RFC8032_SEED).unwrap())
    }

    #[test]
    fn test_known_seed_vector() {
        let kp = rfc_keypair();
        assert_eq!(kp.public_key_hex(), RFC8032_PUBLIC);
    }

    #[test]
    fn test_deterministic_from_seed() {
        let seed = Seed::new([42u8; 32]);
        let kp1 = derive_signing_keypair(&seed);
        let kp2 = derive_signing_keypair(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn test_seed_rejects_wrong_length() {
        assert_eq!(
            Seed::from_slice(&[0u8; 31]).unwrap_err(),
            KeyError::InvalidSeedLength {
                expected: 32,
                actual: 31
            }
        );
        assert_eq!(
            Seed::from_slice(&[0u8; 33]).unwrap_err(),
            KeyError::InvalidSeedLength {
                expected: 32,
                actual: 33
            }
        );
        assert!(Seed::from_slice(&[]).is_err());
        assert!(Seed::from_slice(&[0u8; 32]).is_ok());
    }

    #[test]
    fn test_seed_from_hex() {
        assert!(Seed::from_hex(RFC8032_SEED).is_ok());
        assert!(Seed::from_hex(&format!("  {RFC8032_SEED}\n")).is_ok());
        assert_eq!(Seed::from_hex("not-hex").unwrap_err(), KeyError::InvalidHex);
        assert!(matches!(
            Seed::from_hex("deadbeef"),
            Err(KeyError::InvalidSeedLength { actual: 4, .. })
        ));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let seed = Seed::from_hex(RFC8032_SEED).unwrap();
        assert_eq!(format!("{:?}", seed), "Seed(<redacted>)");

        let kp = derive_signing_keypair(&seed);
        let debug_str = format!("{:?}", kp);
        assert!(debug_str.contains(RFC8032_PUBLIC));
        assert!(!debug_str.contains(RFC8032_SEED));

        let enc = derive_encryption_keypair(&kp);
        assert!(!format!("{:?}", enc).contains(RFC8032_X25519_SECRET));
    }

    #[test]
    fn test_signatures_verify_and_are_deterministic() {
        let kp = rfc_keypair();
        let sig1 = kp.sign(b"determinism is underrated");
        let sig2 = kp.sign(b"determinism is underrated");
        assert_eq!(sig1, sig2);

        let sig = Signature::from_bytes(&sig1);
        assert!(kp
            .verifying_key()
            .verify(b"determinism is underrated", &sig)
            .is_ok());
        assert!(kp.verifying_key().verify(b"something else", &sig).is_err());
    }

    #[test]
    fn test_x25519_conversion_vector() {
        let kp = rfc_keypair();
        assert_eq!(hex::encode(kp.to_x25519_secret()), RFC8032_X25519_SECRET);

        let enc = derive_encryption_keypair(&kp);
        assert_eq!(hex::encode(enc.public_key()), RFC8032_X25519_PUBLIC);
    }

    #[test]
    fn test_converted_halves_agree() {
        // The public key converted from the Edwards point must match the one
        // computed from the converted secret scalar.
        for byte in [0u8, 1, 7, 99, 255] {
            let kp = derive_signing_keypair(&Seed::new([byte; 32]));
            let enc = derive_encryption_keypair(&kp);
            let from_secret = X25519PublicKey::from(&StaticSecret::from(kp.to_x25519_secret()));
            assert_eq!(enc.public_key(), from_secret.to_bytes());
        }
    }

    #[test]
    fn test_edwards_to_montgomery_matches_keypair_conversion() {
        let kp = rfc_keypair();
        assert_eq!(
            edwards_to_montgomery(&kp.public_key()).unwrap(),
            kp.to_x25519_public()
        );
    }

    #[test]
    fn test_edwards_to_montgomery_rejects_non_point() {
        // y = 2 has no matching x on edwards25519.
        let mut not_a_point = [0u8; 32];
        not_a_point[0] = 2;
        assert_eq!(
            edwards_to_montgomery(&not_a_point).unwrap_err(),
            KeyError::InvalidPublicKey
        );
    }

    #[test]
    fn test_diffie_hellman_agrees_with_peer() {
        let alice = derive_encryption_keypair(&derive_signing_keypair(&Seed::new([1u8; 32])));
        let bob = derive_encryption_keypair(&derive_signing_keypair(&Seed::new([2u8; 32])));
        let ab = alice.diffie_hellman(&bob.public_key());
        let ba = bob.diffie_hellman(&alice.public_key());
        assert_eq!(ab.as_bytes(), ba.as_bytes());
    }

    #[test]
    fn test_key_material_caches_encryption_keypair() {
        let keys = KeyMaterial::from_seed(Seed::from_hex(RFC8032_SEED).unwrap());
        assert_eq!(
            keys.did(),
            "did:key:z6MktwupdmLXVVqTzCw4i46r4uGyosGXRnR3XjN4Zq7oMMsw"
        );
        assert!(format!("{:?}", keys).contains("encryption_derived: false"));

        let first = keys.encryption();
        let second = keys.encryption();
        assert!(std::ptr::eq(first, second));
        assert_eq!(hex::encode(first.public_key()), RFC8032_X25519_PUBLIC);
        assert!(format!("{:?}", keys).contains("encryption_derived: true"));
    }

    #[test]
    fn test_key_material_concurrent_first_use() {
        let keys = KeyMaterial::from_seed(Seed::new([9u8; 32]));
        let publics: Vec<[u8; 32]> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| keys.encryption().public_key()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(publics.windows(2).all(|w| w[0] == w[1]));
    }
}
