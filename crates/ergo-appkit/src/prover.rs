//! Transaction signing.
//!
//! A prover is built from exactly one primary secret (mnemonic, unlocked
//! secret storage or an extended master key) plus any number of extra
//! DLog / DH-tuple secrets, and signs unsigned transactions with the
//! protocol parameters captured when it was built.

use crate::contract::encode_address;
use crate::secret_storage::SecretStorage;
use crate::transaction::{SignedTx, UnsignedTx};
use crate::{AppkitError, AppkitResult};
use ergo_lib::{
    chain::parameters::Parameters,
    ergotree_interpreter::sigma_protocol::private_input::{DhTupleProverInput, DlogProverInput},
    ergotree_ir::chain::address::{Address, NetworkPrefix},
    wallet::{
        ext_secret_key::ExtSecretKey, mnemonic::Mnemonic, secret_key::SecretKey,
        signing::TransactionContext, Wallet,
    },
};
use tracing::{debug, info};

/// Where the prover's master key comes from.
pub enum SecretSource {
    /// Mnemonic phrase with its optional BIP39 password.
    Mnemonic { phrase: String, password: String },
    /// Key read from a secret storage that was unlocked at the time.
    UnlockedStorage(ExtSecretKey),
    /// Extended master key supplied directly.
    MasterKey(ExtSecretKey),
}

impl SecretSource {
    fn master_key(self) -> AppkitResult<ExtSecretKey> {
        match self {
            SecretSource::Mnemonic { phrase, password } => {
                let seed = Mnemonic::to_seed(&phrase, &password);
                ExtSecretKey::derive_master(seed).map_err(|e| {
                    AppkitError::KeyDerivation(format!("failed to derive master key: {}", e))
                })
            }
            SecretSource::UnlockedStorage(key) | SecretSource::MasterKey(key) => Ok(key),
        }
    }
}

/// Builder for an `ErgoProver`.
pub struct ErgoProverBuilder {
    network: NetworkPrefix,
    parameters: Parameters,
    primary: Option<SecretSource>,
    dlog_secrets: Vec<DlogProverInput>,
    dht_secrets: Vec<DhTupleProverInput>,
}

impl ErgoProverBuilder {
    /// New builder signing with `parameters`.
    pub fn new(network: NetworkPrefix, parameters: Parameters) -> Self {
        Self {
            network,
            parameters,
            primary: None,
            dlog_secrets: Vec::new(),
            dht_secrets: Vec::new(),
        }
    }

    fn set_primary(&mut self, source: SecretSource) -> AppkitResult<&mut Self> {
        if self.primary.is_some() {
            return Err(AppkitError::AlreadyConfigured("primary secret"));
        }
        self.primary = Some(source);
        Ok(self)
    }

    pub fn with_mnemonic(&mut self, phrase: &str, password: &str) -> AppkitResult<&mut Self> {
        self.set_primary(SecretSource::Mnemonic {
            phrase: phrase.to_string(),
            password: password.to_string(),
        })
    }

    /// Use the master key of an unlocked storage.
    pub fn with_secret_storage(&mut self, storage: &SecretStorage) -> AppkitResult<&mut Self> {
        if storage.is_locked() {
            return Err(AppkitError::SecretStorageLocked);
        }
        let key = storage.secret()?;
        self.set_primary(SecretSource::UnlockedStorage(key))
    }

    pub fn with_master_key(&mut self, key: ExtSecretKey) -> AppkitResult<&mut Self> {
        self.set_primary(SecretSource::MasterKey(key))
    }

    /// Additional discrete-log secret.
    pub fn with_dlog_secret(&mut self, secret: DlogProverInput) -> &mut Self {
        self.dlog_secrets.push(secret);
        self
    }

    /// Additional Diffie-Hellman tuple secret.
    pub fn with_dht_secret(&mut self, secret: DhTupleProverInput) -> &mut Self {
        self.dht_secrets.push(secret);
        self
    }

    pub fn build(self) -> AppkitResult<ErgoProver> {
        let master_key = self
            .primary
            .ok_or(AppkitError::MissingConfiguration("primary secret"))?
            .master_key()?;

        let mut secrets = vec![master_key.secret_key()];
        secrets.extend(self.dlog_secrets.into_iter().map(SecretKey::DlogSecretKey));
        secrets.extend(self.dht_secrets.into_iter().map(SecretKey::DhtSecretKey));
        debug!(secrets = secrets.len(), "Prover built");

        Ok(ErgoProver {
            network: self.network,
            parameters: self.parameters,
            master_key,
            wallet: Wallet::from_secrets(secrets),
        })
    }
}

/// Signs unsigned transactions with a fixed set of secrets.
pub struct ErgoProver {
    network: NetworkPrefix,
    parameters: Parameters,
    master_key: ExtSecretKey,
    wallet: Wallet,
}

impl ErgoProver {
    /// Pay-to-public-key address of the master key.
    pub fn p2pk_address(&self) -> AppkitResult<Address> {
        let public_key = self
            .master_key
            .public_key()
            .map_err(|e| AppkitError::KeyDerivation(e.to_string()))?;
        Ok(public_key.into())
    }

    /// Encoded `p2pk_address` for the prover's network.
    pub fn address(&self) -> AppkitResult<String> {
        Ok(encode_address(self.network, &self.p2pk_address()?))
    }

    pub fn network(&self) -> NetworkPrefix {
        self.network
    }

    /// Produce a proof for every input of `unsigned`.
    ///
    /// Fails with `Signing` when any input guard cannot be satisfied with
    /// the prover's secrets. `unsigned` is left untouched either way.
    pub fn sign(&self, unsigned: &UnsignedTx) -> AppkitResult<SignedTx> {
        let tx_context = TransactionContext::new(
            unsigned.unsigned_transaction().clone(),
            unsigned.input_boxes().to_vec(),
            unsigned.data_boxes().to_vec(),
        )?;
        let mut state_context = unsigned.state_context().clone();
        state_context.parameters = self.parameters.clone();

        let tx = self
            .wallet
            .sign_transaction(tx_context, &state_context, None)?;
        let signed = SignedTx::new(tx);
        info!(tx_id = %signed.id(), "Signed transaction");
        Ok(signed)
    }
}
