//! Network parameters the sender depends on

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    address::Prefix,
    errors::{SenderError, SenderResult},
};

/// Coinbase outputs need this many DAA score units before they can be spent
pub const DEFAULT_COINBASE_MATURITY: u64 = 100;

/// Port a node's REST service listens on unless configured otherwise
pub const DEFAULT_REST_PORT: u16 = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Mainnet,
    #[default]
    Testnet,
    Simnet,
    Devnet,
}

impl NetworkId {
    /// Address prefix of the network
    pub fn prefix(&self) -> Prefix {
        match self {
            NetworkId::Mainnet => Prefix::Mainnet,
            NetworkId::Testnet => Prefix::Testnet,
            NetworkId::Simnet => Prefix::Simnet,
            NetworkId::Devnet => Prefix::Devnet,
        }
    }

    pub fn coinbase_maturity(&self) -> u64 {
        DEFAULT_COINBASE_MATURITY
    }
}

/// Fill in a missing host or port for the REST server address.
///
/// An empty address becomes `localhost:8000`. An address with a scheme
/// such as `https://` keeps its port as written, so the scheme's own default
/// applies. A bare host gets [`DEFAULT_REST_PORT`]. Bare IPv6 hosts are
/// bracketed.
pub fn normalize_rpc_server_address(address: &str) -> SenderResult<String> {
    let address = address.trim().trim_end_matches('/');
    let (scheme, rest) = match address.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, address),
    };
    let (host_port, path) = match rest.split_once('/') {
        Some((host_port, path)) => (host_port, Some(path)),
        None => (rest, None),
    };
    let with_default_port = |host: &str| match scheme {
        Some(_) => host.to_string(),
        None => format!("{host}:{DEFAULT_REST_PORT}"),
    };

    let host_port = if host_port.is_empty() {
        format!("localhost:{DEFAULT_REST_PORT}")
    } else if let Some(rest) = host_port.strip_prefix('[') {
        // Bracketed IPv6, optionally followed by :port
        let (host, tail) = rest.split_once(']').ok_or_else(|| {
            SenderError::ConfigurationError(format!("Unterminated IPv6 host in '{address}'"))
        })?;
        match tail.strip_prefix(':') {
            Some(port) => format!("[{host}]:{}", parse_port(port, address)?),
            None if tail.is_empty() => with_default_port(&format!("[{host}]")),
            None => {
                return Err(SenderError::ConfigurationError(format!(
                    "Unexpected characters after IPv6 host in '{address}'"
                )))
            }
        }
    } else if host_port.matches(':').count() > 1 {
        with_default_port(&format!("[{host_port}]"))
    } else if let Some((host, port)) = host_port.split_once(':') {
        let host = if host.is_empty() { "localhost" } else { host };
        format!("{host}:{}", parse_port(port, address)?)
    } else {
        with_default_port(host_port)
    };

    let normalized = match scheme {
        Some(scheme) => format!("{scheme}://{host_port}"),
        None => host_port,
    };
    Ok(match path {
        Some(path) => format!("{normalized}/{path}"),
        None => normalized,
    })
}

fn parse_port(port: &str, address: &str) -> SenderResult<u16> {
    port.parse::<u16>().map_err(|_| {
        SenderError::ConfigurationError(format!("Invalid port '{port}' in RPC address '{address}'"))
    })
}

impl Display for NetworkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NetworkId::Mainnet => "mainnet",
            NetworkId::Testnet => "testnet",
            NetworkId::Simnet => "simnet",
            NetworkId::Devnet => "devnet",
        };
        f.write_str(name)
    }
}

impl FromStr for NetworkId {
    type Err = SenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(NetworkId::Mainnet),
            "testnet" => Ok(NetworkId::Testnet),
            "simnet" => Ok(NetworkId::Simnet),
            "devnet" => Ok(NetworkId::Devnet),
            other => Err(SenderError::ConfigurationError(format!(
                "Unknown network '{other}'"
            ))),
        }
    }
}
