use serde::Deserialize;

/// Network variants for Bitcoin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Bitcoin,
    Testnet,
}

impl Network {
    pub fn into_bitcoin(self) -> bitcoin::Network {
        match self {
            Network::Bitcoin => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
        }
    }

    pub fn is_mainnet(self) -> bool {
        matches!(self, Network::Bitcoin)
    }

    /// Base URL of the mempool.space-style REST API (UTXOs, fee rates, raw txs).
    pub fn mempool_api_url(self) -> &'static str {
        match self {
            Network::Bitcoin => "https://mempool.space/api",
            Network::Testnet => "https://mempool.space/testnet/api",
        }
    }

    /// Base URL of the UniSat-style wallet API (inscription locations).
    pub fn inscription_api_url(self) -> &'static str {
        match self {
            Network::Bitcoin => "https://unisat.io/wallet-api-v4",
            Network::Testnet => "https://unisat.io/testnet/wallet-api-v4",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Bitcoin => "mainnet",
            Network::Testnet => "testnet",
        }
    }
}

impl std::str::FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" | "bitcoin" => Ok(Network::Bitcoin),
            "testnet" => Ok(Network::Testnet),
            _ => Err(format!("invalid network: {}", s)),
        }
    }
}
