//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use veridid::{Node, NodeConfig};
use veridid_core::{Challenge, Credential, Ed25519PublicKey, Keypair, Schema, SchemaId};
use veridid_proof::{Issuer, IssuerPublicParams, ProofRequest, Wallet};
use veridid_store::MemoryLedger;

/// A named DID and the key that controls it.
#[derive(Debug, Clone)]
pub struct Party {
    pub did: String,
    pub keypair: Keypair,
}

impl Party {
    /// `did:example:<name>` with a deterministic key.
    pub fn new(name: &str, seed: [u8; 32]) -> Self {
        Self {
            did: format!("did:example:{name}"),
            keypair: Keypair::from_seed(&seed),
        }
    }

    /// `did:example:<name>` with a random key.
    pub fn random(name: &str) -> Self {
        Self::new(name, rand::random())
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.keypair.public_key()
    }
}

/// `count` parties `did:example:party-<i>` with distinct seeds.
pub fn multi_party(count: usize) -> Vec<Party> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&(i as u64).to_le_bytes());
            seed[31] = 0xA5;
            Party::new(&format!("party-{i}"), seed)
        })
        .collect()
}

/// The KYC schema used across scenarios.
pub fn kyc_schema() -> Schema {
    Schema::new("kyc", "1.0", ["age", "country", "verified"])
}

/// An in-memory node with an active issuer and holder, and the KYC schema
/// registered by the issuer.
pub struct TestFixture {
    pub node: Node<MemoryLedger>,
    pub issuer: Party,
    pub holder: Party,
    pub schema_id: SchemaId,
}

impl TestFixture {
    /// Build the fixture with fixed keys.
    ///
    /// # Panics
    ///
    /// Panics if registration fails, which only happens on a broken build.
    pub async fn new() -> Self {
        let node = Node::in_memory(NodeConfig::default());
        let issuer = Party::new("issuer", [0x11; 32]);
        let holder = Party::new("holder", [0x22; 32]);

        for party in [&issuer, &holder] {
            node.register_did(&party.did, &party.keypair, vec![])
                .await
                .expect("fixture DID registration");
        }

        let schema_id = node
            .issuer(issuer.did.clone(), issuer.keypair.clone())
            .register_schema(kyc_schema())
            .await
            .expect("fixture schema registration");

        Self {
            node,
            issuer,
            holder,
            schema_id,
        }
    }

    pub fn issuer(&self) -> Issuer<MemoryLedger> {
        self.node
            .issuer(self.issuer.did.clone(), self.issuer.keypair.clone())
    }

    pub fn params(&self) -> IssuerPublicParams {
        self.issuer()
            .public_params(&self.schema_id)
            .expect("fixture schema is registered")
    }

    /// Issue a KYC credential to the holder.
    pub async fn issue(&self, age: &str, country: &str, verified: &str) -> Credential {
        self.issuer()
            .issue(&self.holder.did, &self.schema_id, &[age, country, verified])
            .await
            .expect("fixture issuance")
    }

    /// The holder's wallet, already holding `credentials`.
    pub fn wallet(&self, credentials: impl IntoIterator<Item = Credential>) -> Wallet {
        let mut wallet = self
            .node
            .wallet(self.holder.did.clone(), self.holder.keypair.clone());
        for credential in credentials {
            wallet.store(credential).expect("fixture credential");
        }
        wallet
    }

    /// A request for `indices` of the KYC schema under `nonce`.
    pub fn request(&self, indices: Vec<u32>, nonce: &str) -> ProofRequest {
        ProofRequest::with_challenge(self.schema_id, indices, Challenge::from(nonce))
    }
}
