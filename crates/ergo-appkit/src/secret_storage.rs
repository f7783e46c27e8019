//! Encrypted storage for a wallet seed.
//!
//! The seed is encrypted with AES-256-GCM under a key derived from the
//! password with Argon2id, and kept on disk as JSON. The decrypted master
//! key lives in memory only while the storage is unlocked.

use crate::contract::encode_address;
use crate::{AppkitError, AppkitResult};
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{password_hash::SaltString, Algorithm, Argon2, Params, Version};
use ergo_lib::{
    ergotree_ir::chain::address::{Address, NetworkPrefix},
    wallet::{
        ext_secret_key::ExtSecretKey,
        mnemonic::{Mnemonic, MnemonicSeed},
    },
};
use parking_lot::RwLock;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENCRYPTION_VERSION: u8 = 1;
const NONCE_LEN: usize = 12;

/// File name used by `create_from_mnemonic_in`.
pub const SECRET_FILE_NAME: &str = "secret.json";

/// Argon2id cost settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_cost: 65536,
            time_cost: 3,
            parallelism: 4,
        }
    }
}

/// On-disk form of the encrypted seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedSeed {
    #[serde(default = "default_version")]
    pub version: u8,
    pub cipher_text: Vec<u8>,
    /// Argon2id salt (base64, 22 chars).
    pub salt: String,
    /// AES-GCM nonce (12 bytes).
    pub nonce: Vec<u8>,
    #[serde(flatten)]
    pub kdf: KdfParams,
}

impl EncryptedSeed {
    fn nonce(&self) -> AppkitResult<[u8; NONCE_LEN]> {
        self.nonce.as_slice().try_into().map_err(|_| {
            AppkitError::CorruptedStorage(format!(
                "nonce must be {} bytes, found {}",
                NONCE_LEN,
                self.nonce.len()
            ))
        })
    }
}

fn default_version() -> u8 {
    ENCRYPTION_VERSION
}

/// Password protected seed storage.
pub struct SecretStorage {
    file: PathBuf,
    encrypted: EncryptedSeed,
    master_key: RwLock<Option<ExtSecretKey>>,
}

impl SecretStorage {
    /// Encrypt the seed of `mnemonic` and write it to `dir/secret.json`.
    ///
    /// The returned storage is locked.
    pub fn create_from_mnemonic_in<P: AsRef<Path>>(
        dir: P,
        mnemonic: &str,
        mnemonic_password: &str,
        encryption_password: &str,
    ) -> AppkitResult<Self> {
        Self::create_with_params(
            dir,
            mnemonic,
            mnemonic_password,
            encryption_password,
            KdfParams::default(),
        )
    }

    /// Same as `create_from_mnemonic_in` with explicit Argon2id costs.
    pub fn create_with_params<P: AsRef<Path>>(
        dir: P,
        mnemonic: &str,
        mnemonic_password: &str,
        encryption_password: &str,
        kdf: KdfParams,
    ) -> AppkitResult<Self> {
        let word_count = mnemonic.split_whitespace().count();
        if ![12, 15, 18, 21, 24].contains(&word_count) {
            return Err(AppkitError::InvalidMnemonic(format!(
                "invalid word count {}, expected 12, 15, 18, 21 or 24",
                word_count
            )));
        }

        let seed = Mnemonic::to_seed(mnemonic, mnemonic_password);
        let encrypted = encrypt_seed(&seed, encryption_password, kdf)?;

        std::fs::create_dir_all(dir.as_ref())?;
        let file = dir.as_ref().join(SECRET_FILE_NAME);
        std::fs::write(&file, serde_json::to_string_pretty(&encrypted)?)?;
        debug!(file = %file.display(), "Secret storage created");

        Ok(Self {
            file,
            encrypted,
            master_key: RwLock::new(None),
        })
    }

    /// Load a previously created storage file. The storage starts locked.
    pub fn load_from<P: AsRef<Path>>(file: P) -> AppkitResult<Self> {
        let file = file.as_ref().to_path_buf();
        if !file.exists() {
            return Err(AppkitError::NotInitialized);
        }
        let encrypted: EncryptedSeed = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
        encrypted.nonce()?;
        debug!(file = %file.display(), "Secret storage loaded");
        Ok(Self {
            file,
            encrypted,
            master_key: RwLock::new(None),
        })
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn is_locked(&self) -> bool {
        self.master_key.read().is_none()
    }

    /// Decrypt the seed and keep the master key in memory.
    pub fn unlock(&self, password: &str) -> AppkitResult<()> {
        let nonce = self.encrypted.nonce()?;
        let key = derive_cipher_key(password, &self.encrypted.salt, self.encrypted.kdf)?;
        let cipher = Aes256Gcm::new_from_slice(&key).map_err(|_| AppkitError::InvalidPassword)?;
        let decrypted = cipher
            .decrypt(
                Nonce::from_slice(&nonce),
                self.encrypted.cipher_text.as_ref(),
            )
            .map_err(|_| AppkitError::InvalidPassword)?;

        let seed: MnemonicSeed = decrypted
            .as_slice()
            .try_into()
            .map_err(|_| AppkitError::InvalidPassword)?;
        let master_key =
            ExtSecretKey::derive_master(seed).map_err(|_| AppkitError::InvalidPassword)?;

        *self.master_key.write() = Some(master_key);
        debug!("Secret storage unlocked");
        Ok(())
    }

    /// Drop the decrypted key.
    pub fn lock(&self) {
        *self.master_key.write() = None;
        debug!("Secret storage locked");
    }

    /// Master key, available only while unlocked.
    pub fn secret(&self) -> AppkitResult<ExtSecretKey> {
        self.master_key
            .read()
            .clone()
            .ok_or(AppkitError::SecretStorageLocked)
    }

    /// P2PK address of the master key.
    pub fn address(&self) -> AppkitResult<Address> {
        let public_key = self
            .secret()?
            .public_key()
            .map_err(|e| AppkitError::KeyDerivation(e.to_string()))?;
        Ok(public_key.into())
    }

    pub fn address_for(&self, network: NetworkPrefix) -> AppkitResult<String> {
        Ok(encode_address(network, &self.address()?))
    }
}

fn encrypt_seed(seed: &MnemonicSeed, password: &str, kdf: KdfParams) -> AppkitResult<EncryptedSeed> {
    let salt = SaltString::generate(&mut OsRng);
    let nonce_bytes: [u8; NONCE_LEN] = rand::random();

    let key = derive_cipher_key(password, salt.as_str(), kdf)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| AppkitError::KeyDerivation(format!("cipher init failed: {}", e)))?;
    let cipher_text = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), seed.as_ref())
        .map_err(|e| AppkitError::KeyDerivation(format!("encryption failed: {}", e)))?;

    Ok(EncryptedSeed {
        version: ENCRYPTION_VERSION,
        cipher_text,
        salt: salt.as_str().to_string(),
        nonce: nonce_bytes.to_vec(),
        kdf,
    })
}

/// 32-byte AES key from the password.
fn derive_cipher_key(password: &str, salt: &str, kdf: KdfParams) -> AppkitResult<[u8; 32]> {
    let params = Params::new(kdf.memory_cost, kdf.time_cost, kdf.parallelism, Some(32))
        .map_err(|e| AppkitError::KeyDerivation(format!("invalid Argon2 params: {}", e)))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; 32];
    argon2
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut output)
        .map_err(|e| AppkitError::KeyDerivation(format!("Argon2id failed: {}", e)))?;
    Ok(output)
}
