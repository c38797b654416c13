use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::ParseError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 27017;

/// The address of a single MongoDB server.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct ServerAddress {
    host: String,
    port: u16,
}

impl ServerAddress {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            host: host.trim().to_lowercase(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Parses a comma separated list of addresses, skipping empty entries.
    pub fn parse_list(addresses: &str) -> Result<Vec<ServerAddress>, ParseError> {
        addresses
            .split(',')
            .map(str::trim)
            .filter(|address| !address.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl Default for ServerAddress {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl FromStr for ServerAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = s.trim();
        let invalid = |reason: &str| ParseError::InvalidServerAddress {
            address: s.to_string(),
            reason: reason.to_string(),
        };

        if address.is_empty() {
            return Err(invalid("host is empty"));
        }

        let (host, port) = if let Some(rest) = address.strip_prefix('[') {
            let (host, rest) = rest
                .split_once(']')
                .ok_or_else(|| invalid("IPv6 literal is missing the closing `]`"))?;
            match rest {
                "" => (host, None),
                _ => {
                    let port = rest
                        .strip_prefix(':')
                        .ok_or_else(|| invalid("unexpected characters after the IPv6 literal"))?;
                    (host, Some(port))
                }
            }
        } else {
            match address.split_once(':') {
                Some((_, port)) if port.contains(':') => {
                    return Err(invalid("IPv6 literals must be enclosed in `[` and `]`"));
                }
                Some((host, port)) => (host, Some(port)),
                None => (address, None),
            }
        };

        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        let port = match port {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| invalid("port is not a number between 0 and 65535"))?,
            None => DEFAULT_PORT,
        };

        Ok(Self::new(host, port))
    }
}

impl TryFrom<String> for ServerAddress {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
