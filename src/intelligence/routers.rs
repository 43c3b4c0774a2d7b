use std::collections::HashSet;

use alloy::primitives::{address, Address};

/// A DEX protocol and the router contracts that front it.
#[derive(Debug, Clone)]
pub struct DexProtocol {
    pub name: String,
    pub routers: HashSet<Address>,
}

/// Known router addresses grouped by protocol. Lookups compare raw 20-byte
/// addresses, so the checksum casing of the source list is irrelevant.
#[derive(Debug, Clone, Default)]
pub struct RouterRegistry {
    protocols: Vec<DexProtocol>,
}

impl RouterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a protocol. Earlier registrations win when a transaction
    /// touches routers of several protocols.
    pub fn with_protocol(
        mut self,
        name: impl Into<String>,
        routers: impl IntoIterator<Item = Address>,
    ) -> Self {
        self.protocols.push(DexProtocol {
            name: name.into(),
            routers: routers.into_iter().collect(),
        });
        self
    }

    /// Routers deployed on Base mainnet.
    pub fn base_mainnet() -> Self {
        Self::new()
            .with_protocol(
                "Uniswap V3",
                [
                    address!("2626664c2603336E57B271c5C0b26F421741e481"), // SwapRouter02
                    address!("198EF79F1F515F02dFE9e3115eD9fC07183f02fC"), // Universal Router
                ],
            )
            .with_protocol(
                "Uniswap V4",
                [address!("6ff5693b99212da76ad316178a184ab56d299b43")],
            )
            .with_protocol(
                "BaseSwap",
                [address!("327Df1E6de05895d2ab08513aaDD9313Fe505d86")],
            )
            .with_protocol(
                "Aerodrome",
                [address!("cF77a3Ba9A5CA399B7c97c74d54e5b1Beb874E43")],
            )
            .with_protocol(
                "SushiSwap",
                [address!("8c47ED459d3688Ca14d67CE84E053600fcB9EC31")],
            )
            .with_protocol(
                "Alienbase",
                [address!("94cC0AaC535CCDB3C01d6787D6413C27ae39Bf77")],
            )
            .with_protocol(
                "PancakeSwap",
                [address!("678Aa4bF4E210cf2166753e054d5b7c31cc7fa86")],
            )
            .with_protocol(
                "Maverick",
                [address!("32AED3Bce901DA12ca8489788F3A99fCE1056e14")],
            )
    }

    /// First protocol with a router among `involved`.
    pub fn match_protocol(&self, involved: &HashSet<Address>) -> Option<&str> {
        self.protocols
            .iter()
            .find(|p| !p.routers.is_disjoint(involved))
            .map(|p| p.name.as_str())
    }
}
