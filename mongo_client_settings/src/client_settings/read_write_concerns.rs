use std::{fmt, str::FromStr, time::Duration};

use serde::Deserialize;

use crate::{client_settings::settings_groups::normalize_name, ParseError};

/// Which members of a replica set reads are routed to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ReadPreference {
    #[default]
    Primary,
    PrimaryPreferred,
    Secondary,
    SecondaryPreferred,
    Nearest,
}

impl FromStr for ReadPreference {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "primary" => Ok(Self::Primary),
            "primarypreferred" => Ok(Self::PrimaryPreferred),
            "secondary" => Ok(Self::Secondary),
            "secondarypreferred" => Ok(Self::SecondaryPreferred),
            "nearest" => Ok(Self::Nearest),
            _ => Err(ParseError::invalid_value("read preference", s)),
        }
    }
}

impl TryFrom<String> for ReadPreference {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ReadPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Primary => "primary",
            Self::PrimaryPreferred => "primaryPreferred",
            Self::Secondary => "secondary",
            Self::SecondaryPreferred => "secondaryPreferred",
            Self::Nearest => "nearest",
        };
        f.write_str(name)
    }
}

/// The consistency and isolation level requested for reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ReadConcern {
    /// Don't send a level and let the server pick.
    #[default]
    Default,
    Local,
    Majority,
    Linearizable,
    Snapshot,
    Available,
}

impl FromStr for ReadConcern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "default" => Ok(Self::Default),
            "local" => Ok(Self::Local),
            "majority" => Ok(Self::Majority),
            "linearizable" => Ok(Self::Linearizable),
            "snapshot" => Ok(Self::Snapshot),
            "available" => Ok(Self::Available),
            _ => Err(ParseError::invalid_value("read concern", s)),
        }
    }
}

impl TryFrom<String> for ReadConcern {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How many nodes must acknowledge a write.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Acknowledgment {
    Nodes(u32),
    Majority,
    /// A tag set name configured on the replica set.
    Custom(String),
}

/// The durability guarantee requested for writes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct WriteConcern {
    pub w: Option<Acknowledgment>,
    pub w_timeout: Option<Duration>,
    pub journal: Option<bool>,
}

impl WriteConcern {
    /// Acknowledged by the server's default write concern.
    pub const ACKNOWLEDGED: WriteConcern = WriteConcern {
        w: None,
        w_timeout: None,
        journal: None,
    };
    pub const UNACKNOWLEDGED: WriteConcern = WriteConcern::nodes(0);
    pub const W1: WriteConcern = WriteConcern::nodes(1);
    pub const W2: WriteConcern = WriteConcern::nodes(2);
    pub const W3: WriteConcern = WriteConcern::nodes(3);
    pub const JOURNALED: WriteConcern = WriteConcern {
        w: None,
        w_timeout: None,
        journal: Some(true),
    };
    pub const MAJORITY: WriteConcern = WriteConcern {
        w: Some(Acknowledgment::Majority),
        w_timeout: None,
        journal: None,
    };

    const fn nodes(count: u32) -> Self {
        Self {
            w: Some(Acknowledgment::Nodes(count)),
            w_timeout: None,
            journal: None,
        }
    }

    pub fn with_w_timeout(mut self, timeout: Duration) -> Self {
        self.w_timeout = Some(timeout);
        self
    }

    pub fn with_journal(mut self, journal: bool) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn is_acknowledged(&self) -> bool {
        !matches!(self.w, Some(Acknowledgment::Nodes(0))) || self.journal == Some(true)
    }
}

impl FromStr for WriteConcern {
    type Err = ParseError;

    /// Accepts the named constants (`ACKNOWLEDGED`, `W2`, `majority`, ...), a node count, or
    /// any other non-empty text, which becomes a custom tag acknowledgment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ParseError::invalid_value("write concern", s));
        }

        let concern = match normalize_name(trimmed).as_str() {
            "acknowledged" | "safe" => Self::ACKNOWLEDGED,
            "unacknowledged" | "normal" => Self::UNACKNOWLEDGED,
            "w1" => Self::W1,
            "w2" => Self::W2,
            "w3" => Self::W3,
            "journaled" | "journalsafe" => Self::JOURNALED,
            "majority" => Self::MAJORITY,
            _ => match trimmed.parse::<u32>() {
                Ok(count) => Self::nodes(count),
                Err(_) => Self {
                    w: Some(Acknowledgment::Custom(trimmed.to_string())),
                    ..Self::ACKNOWLEDGED
                },
            },
        };
        Ok(concern)
    }
}

impl TryFrom<String> for WriteConcern {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use crate::{Acknowledgment, ReadConcern, ReadPreference, WriteConcern};

    #[test]
    fn readpreference_parses_constant_and_camel_case_names() {
        assert_eq!(
            "SECONDARY_PREFERRED".parse::<ReadPreference>().unwrap(),
            ReadPreference::SecondaryPreferred
        );
        assert_eq!(
            "primaryPreferred".parse::<ReadPreference>().unwrap(),
            ReadPreference::PrimaryPreferred
        );
        assert!("tertiary".parse::<ReadPreference>().is_err());
    }

    #[test]
    fn readconcern_parses_levels() {
        assert_eq!("MAJORITY".parse::<ReadConcern>().unwrap(), ReadConcern::Majority);
        assert_eq!("default".parse::<ReadConcern>().unwrap(), ReadConcern::Default);
    }

    #[test]
    fn writeconcern_parses_named_constants() {
        assert_eq!("W2".parse::<WriteConcern>().unwrap(), WriteConcern::W2);
        assert_eq!("JOURNALED".parse::<WriteConcern>().unwrap(), WriteConcern::JOURNALED);
        assert_eq!("majority".parse::<WriteConcern>().unwrap(), WriteConcern::MAJORITY);
        assert_eq!(
            "ACKNOWLEDGED".parse::<WriteConcern>().unwrap(),
            WriteConcern::default()
        );
    }

    #[test]
    fn writeconcern_turns_unknown_names_into_tag_sets() {
        // Act
        let concern = "dataCenterAware".parse::<WriteConcern>().unwrap();

        // Assert
        assert_eq!(
            concern.w,
            Some(Acknowledgment::Custom("dataCenterAware".to_string()))
        );
        assert!(concern.is_acknowledged());
    }

    #[test]
    fn writeconcern_unacknowledged_is_not_acknowledged() {
        assert!(!WriteConcern::UNACKNOWLEDGED.is_acknowledged());
        assert!("5".parse::<WriteConcern>().unwrap().is_acknowledged());
        assert!("".parse::<WriteConcern>().is_err());
    }
}
