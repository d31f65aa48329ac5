//! Ed25519 identity decoding and peer id derivation.

use ed25519_dalek::pkcs8::DecodePrivateKey;
use ed25519_dalek::SigningKey;
use libp2p_identity::{Keypair, PeerId};
use peerlink_types::IdentityError;
use pkcs8::der::pem;
use pkcs8::PrivateKeyInfo;

/// The local node's durable key pair and the peer id derived from it.
///
/// Read once at startup and immutable for the life of the process.
pub struct Identity {
    signing_key: SigningKey,
    peer_id: PeerId,
}

impl Identity {
    /// Wrap an Ed25519 signing key, deriving its libp2p peer id.
    pub fn from_signing_key(signing_key: SigningKey) -> Result<Self, IdentityError> {
        let keypair = Keypair::ed25519_from_bytes(signing_key.to_bytes())
            .map_err(|e| IdentityError::PeerId(e.to_string()))?;
        let peer_id = keypair.public().to_peer_id();
        Ok(Self {
            signing_key,
            peer_id,
        })
    }

    /// Identity multihash of the protobuf-encoded public key.
    pub fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}

/// Decode a PEM document holding a PKCS#8-wrapped Ed25519 private key.
///
/// The three failure stages are reported separately: the PEM armour, the
/// PKCS#8 structure, and the key algorithm.
pub fn decode_identity_pem(pem_text: &str) -> Result<Identity, IdentityError> {
    let (_label, der) = pem::decode_vec(pem_text.trim().as_bytes())
        .map_err(|e| IdentityError::Pem(e.to_string()))?;

    let info = PrivateKeyInfo::try_from(der.as_slice())
        .map_err(|e| IdentityError::Pkcs8(e.to_string()))?;
    if info.algorithm.oid != ed25519_dalek::pkcs8::ALGORITHM_OID {
        return Err(IdentityError::NotEd25519(info.algorithm.oid.to_string()));
    }

    let signing_key =
        SigningKey::from_pkcs8_der(&der).map_err(|e| IdentityError::Pkcs8(e.to_string()))?;
    Identity::from_signing_key(signing_key)
}
