//! Tool configuration.

use crate::Args;
use anyhow::{bail, Context, Result};
use ergo_appkit::NetworkPrefix;
use ergo_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Network (mainnet, testnet).
    pub network: String,
    /// Node and explorer connection.
    #[serde(default)]
    pub node: NodeApiConfig,
    /// Signing secrets.
    #[serde(default)]
    pub wallet: WalletConfig,
}

/// Node API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeApiConfig {
    /// Node REST API URL.
    pub api_url: String,
    /// API key for wallet endpoints.
    pub api_key: Option<String>,
    /// Explorer URL; the public explorer for the network when unset.
    pub explorer_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for NodeApiConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:9053".to_string(),
            api_key: None,
            explorer_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Wallet configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Mnemonic phrase.
    pub mnemonic: Option<String>,
    /// Optional BIP39 password for the mnemonic.
    #[serde(default)]
    pub mnemonic_password: String,
    /// Encrypted secret storage file, used when no mnemonic is given.
    pub storage_file: Option<PathBuf>,
}

impl ToolConfig {
    /// Load configuration from file and CLI args.
    pub fn load(config_path: &Path, args: &Args) -> Result<Self> {
        let mut config = if config_path.exists() {
            let content =
                std::fs::read_to_string(config_path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")?
        } else {
            Self::default_for_network(args.network.as_deref().unwrap_or("mainnet"))
        };

        // CLI args win over the file
        if let Some(ref network) = args.network {
            config.network = network.clone();
        }
        if let Some(ref url) = args.node_url {
            config.node.api_url = url.clone();
        }
        if let Some(ref key) = args.api_key {
            config.node.api_key = Some(key.clone());
        }

        config.network_prefix()?;
        Ok(config)
    }

    /// Default configuration for a network.
    pub fn default_for_network(network: &str) -> Self {
        let api_url = match network {
            "testnet" => "http://127.0.0.1:9052",
            _ => "http://127.0.0.1:9053",
        };
        Self {
            network: network.to_string(),
            node: NodeApiConfig {
                api_url: api_url.to_string(),
                ..Default::default()
            },
            wallet: WalletConfig::default(),
        }
    }

    pub fn network_prefix(&self) -> Result<NetworkPrefix> {
        match self.network.to_lowercase().as_str() {
            "mainnet" => Ok(NetworkPrefix::Mainnet),
            "testnet" => Ok(NetworkPrefix::Testnet),
            other => bail!("Unknown network '{}', expected mainnet or testnet", other),
        }
    }

    /// Settings for the REST client.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.node.api_url, self.network_prefix()?)
            .with_timeout(Duration::from_secs(self.node.timeout_secs));
        if let Some(ref key) = self.node.api_key {
            config = config.with_api_key(key);
        }
        if let Some(ref url) = self.node.explorer_url {
            config = config.with_explorer_url(url);
        }
        Ok(config)
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self::default_for_network("mainnet")
    }
}
