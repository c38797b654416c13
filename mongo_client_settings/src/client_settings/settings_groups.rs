use std::{fmt, str::FromStr, time::Duration};

use serde::Deserialize;

use crate::{ParseError, SecurityContext, ServerAddress};

/// Socket level timeouts and buffer sizes. A zero read timeout means no timeout and zero
/// buffer sizes leave the operating system defaults in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SocketSettings {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub receive_buffer_size: u32,
    pub send_buffer_size: u32,
}

impl Default for SocketSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(10_000),
            read_timeout: Duration::ZERO,
            receive_buffer_size: 0,
            send_buffer_size: 0,
        }
    }
}

/// Server monitoring settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerSettings {
    pub heartbeat_frequency: Duration,
    pub min_heartbeat_frequency: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            heartbeat_frequency: Duration::from_millis(10_000),
            min_heartbeat_frequency: Duration::from_millis(500),
        }
    }
}

/// How the client discovers and talks to the servers of a cluster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ClusterConnectionMode {
    /// Connect directly to one server.
    #[default]
    Single,
    /// Discover and connect to every member of the cluster.
    Multiple,
}

impl FromStr for ClusterConnectionMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "single" => Ok(Self::Single),
            "multiple" => Ok(Self::Multiple),
            _ => Err(ParseError::invalid_value("cluster connection mode", s)),
        }
    }
}

impl TryFrom<String> for ClusterConnectionMode {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ClusterConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "SINGLE"),
            Self::Multiple => write!(f, "MULTIPLE"),
        }
    }
}

/// The kind of cluster the client requires the deployment to be.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ClusterType {
    Standalone,
    ReplicaSet,
    Sharded,
    /// Accept whatever kind of cluster is discovered.
    #[default]
    Unknown,
}

impl FromStr for ClusterType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "standalone" => Ok(Self::Standalone),
            "replicaset" => Ok(Self::ReplicaSet),
            "sharded" => Ok(Self::Sharded),
            "unknown" => Ok(Self::Unknown),
            _ => Err(ParseError::invalid_value("cluster type", s)),
        }
    }
}

impl TryFrom<String> for ClusterType {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ClusterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Standalone => "STANDALONE",
            Self::ReplicaSet => "REPLICA_SET",
            Self::Sharded => "SHARDED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

/// Cluster topology settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClusterSettings {
    /// When set, hosts are discovered through a DNS SRV lookup and `hosts` is ignored.
    pub srv_host: Option<String>,
    pub hosts: Vec<ServerAddress>,
    pub mode: ClusterConnectionMode,
    pub required_cluster_type: ClusterType,
    pub required_replica_set_name: Option<String>,
    pub local_threshold: Duration,
    pub server_selection_timeout: Duration,
    pub max_wait_queue_size: u32,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            srv_host: None,
            hosts: vec![ServerAddress::default()],
            mode: ClusterConnectionMode::default(),
            required_cluster_type: ClusterType::default(),
            required_replica_set_name: None,
            local_threshold: Duration::from_millis(15),
            server_selection_timeout: Duration::from_millis(30_000),
            max_wait_queue_size: 500,
        }
    }
}

/// Connection pool settings. A zero lifetime or idle time means connections never expire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionPoolSettings {
    pub max_size: u32,
    pub min_size: u32,
    pub max_wait_queue_size: u32,
    pub max_wait_time: Duration,
    pub max_connection_lifetime: Duration,
    pub max_connection_idle_time: Duration,
    pub maintenance_initial_delay: Duration,
    pub maintenance_frequency: Duration,
}

impl Default for ConnectionPoolSettings {
    fn default() -> Self {
        Self {
            max_size: 100,
            min_size: 0,
            max_wait_queue_size: 500,
            max_wait_time: Duration::from_millis(120_000),
            max_connection_lifetime: Duration::ZERO,
            max_connection_idle_time: Duration::ZERO,
            maintenance_initial_delay: Duration::ZERO,
            maintenance_frequency: Duration::from_millis(60_000),
        }
    }
}

/// Transport security settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SslSettings {
    pub enabled: bool,
    pub invalid_hostname_allowed: bool,
    pub context: Option<SecurityContext>,
}

/// Lower-cases a configuration name and strips `_` and `-` so `REPLICA_SET`, `replica-set`
/// and `replicaSet` all compare equal.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use std::time::Duration;

    use crate::{ClusterConnectionMode, ClusterSettings, ClusterType, ServerAddress};

    #[test]
    fn clustertype_parses_every_spelling_of_replica_set() {
        for name in ["REPLICA_SET", "replica-set", "replicaSet", " ReplicaSet "] {
            assert_eq!(name.parse::<ClusterType>().unwrap(), ClusterType::ReplicaSet);
        }
    }

    #[test]
    fn clusterconnectionmode_rejects_unknown_names() {
        let result = "LOAD_BALANCED".parse::<ClusterConnectionMode>();

        assert!(result.is_err());
    }

    #[test]
    fn clustersettings_default_points_at_local_server() {
        let settings = ClusterSettings::default();

        assert_eq!(settings.hosts, vec![ServerAddress::new("127.0.0.1", 27017)]);
        assert_eq!(settings.mode, ClusterConnectionMode::Single);
        assert_eq!(settings.server_selection_timeout, Duration::from_secs(30));
        assert!(settings.srv_host.is_none());
    }
}
