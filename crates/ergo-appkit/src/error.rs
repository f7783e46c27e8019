//! Appkit error types.

use ergo_lib::{
    chain::ergo_box::box_builder::ErgoBoxCandidateBuilderError,
    ergotree_ir::serialization::SigmaParsingError,
    wallet::{tx_context::TransactionContextError, WalletError as SigningError},
};
use thiserror::Error;

/// Errors raised while selecting boxes, building, signing or submitting
/// transactions.
#[derive(Error, Debug)]
pub enum AppkitError {
    /// The scanned boxes do not hold enough nanoERG.
    #[error("Insufficient funds: need {needed} nanoERG, have {available}")]
    InsufficientFunds { needed: u64, available: u64 },

    /// The scanned boxes do not hold enough of the requested token.
    #[error("Insufficient tokens {token_id}: need {needed}, found {found}")]
    InsufficientTokens {
        token_id: String,
        needed: u64,
        found: u64,
    },

    /// A single-use builder setter was called twice.
    #[error("{0} is already configured")]
    AlreadyConfigured(&'static str),

    /// A builder was finalized before a required value was supplied.
    #[error("Missing configuration: {0}")]
    MissingConfiguration(&'static str),

    /// More registers than R4..R9 can hold.
    #[error("Too many registers: {0} (at most 6 allowed)")]
    TooManyRegisters(usize),

    /// Secret storage must be unlocked before its key can be used.
    #[error("Secret storage is locked")]
    SecretStorageLocked,

    /// Secret storage file was never created or loaded.
    #[error("Secret storage not initialized")]
    NotInitialized,

    /// Secret storage file is malformed.
    #[error("Corrupted secret storage: {0}")]
    CorruptedStorage(String),

    /// Wrong secret storage password.
    #[error("Invalid password")]
    InvalidPassword,

    /// Invalid mnemonic.
    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    /// Key derivation error.
    #[error("Key derivation error: {0}")]
    KeyDerivation(String),

    /// The proving interpreter could not produce proofs.
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    /// Inputs handed to the prover do not match the transaction.
    #[error("Transaction context error: {0}")]
    TxContext(#[from] TransactionContextError),

    /// Output box candidate could not be built.
    #[error("Box candidate error: {0}")]
    BoxCandidate(#[from] ErgoBoxCandidateBuilderError),

    /// Unsigned transaction could not be assembled.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Script parsing error.
    #[error("Script parsing error: {0}")]
    ScriptParsing(#[from] SigmaParsingError),

    /// A remote API call failed.
    #[error("Error executing API request to {endpoint}: {message}")]
    Api { endpoint: String, message: String },

    /// The node returned fewer headers than a state context needs.
    #[error("Not enough headers: need {needed}, got {got}")]
    NotEnoughHeaders { needed: usize, got: usize },

    /// Box lookup by id failed.
    #[error("Cannot load UTXO box {0}")]
    BoxNotFound(String),

    /// Invalid amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Invalid address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// JSON encoding or decoding error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for appkit operations.
pub type AppkitResult<T> = Result<T, AppkitError>;
