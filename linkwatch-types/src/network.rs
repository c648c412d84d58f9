//! Network identifiers.
//!
//! The monitor identifies a network as `{netloc}-{nid}`, derived from its
//! BTP address `btp://{netloc}/{nid}`. Both forms appear in the wild: the
//! web API uses the identifier form in paths, while relay configuration
//! uses the address form.

use std::fmt;

use thiserror::Error;

/// Errors produced when converting between identifiers and addresses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkIdError {
    /// The identifier does not have the `{netloc}-{nid}` shape.
    #[error("invalid network id: {0}")]
    InvalidId(String),

    /// The address does not have the `btp://{netloc}/{nid}` shape.
    #[error("invalid btp address: {0}")]
    InvalidAddress(String),
}

/// Identifier for one network endpoint of a link.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkId(String);

impl NetworkId {
    /// Create an identifier from its string form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an identifier from a BTP address such as `btp://0x1.icon/cx01`.
    pub fn from_address(addr: &str) -> Result<Self, NetworkIdError> {
        let rest = addr
            .strip_prefix("btp://")
            .ok_or_else(|| NetworkIdError::InvalidAddress(addr.to_string()))?;
        let (netloc, nid) = rest
            .split_once('/')
            .ok_or_else(|| NetworkIdError::InvalidAddress(addr.to_string()))?;
        if netloc.is_empty() || nid.is_empty() {
            return Err(NetworkIdError::InvalidAddress(addr.to_string()));
        }
        Ok(Self(format!("{netloc}-{nid}")))
    }

    /// Render the identifier back into its BTP address form.
    pub fn to_address(&self) -> Result<String, NetworkIdError> {
        let parts: Vec<&str> = self.0.split('-').collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(NetworkIdError::InvalidId(self.0.clone()));
        }
        Ok(format!("btp://{}/{}", parts[0], parts[1]))
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NetworkId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_address_round_trips() {
        let id = NetworkId::from_address("btp://0x1.icon/cx0123").unwrap();
        assert_eq!(id.as_str(), "0x1.icon-cx0123");
        assert_eq!(id.to_address().unwrap(), "btp://0x1.icon/cx0123");
    }

    #[test]
    fn from_address_rejects_other_schemes() {
        let err = NetworkId::from_address("http://0x1.icon/cx0123").unwrap_err();
        assert!(matches!(err, NetworkIdError::InvalidAddress(_)));
    }

    #[test]
    fn from_address_rejects_missing_parts() {
        assert!(NetworkId::from_address("btp://0x1.icon").is_err());
        assert!(NetworkId::from_address("btp:///cx0123").is_err());
        assert!(NetworkId::from_address("btp://0x1.icon/").is_err());
    }

    #[test]
    fn to_address_rejects_malformed_ids() {
        let err = NetworkId::new("no-dash-here-extra").to_address().unwrap_err();
        assert!(matches!(err, NetworkIdError::InvalidId(_)));
        assert!(NetworkId::new("plain").to_address().is_err());
    }

    #[test]
    fn display_is_the_raw_id() {
        let id = NetworkId::new("0x1.icon-cx0123");
        assert_eq!(id.to_string(), "0x1.icon-cx0123");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_is_transparent() {
        let id = NetworkId::new("0x1.icon-cx0123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"0x1.icon-cx0123\"");
        let parsed: NetworkId = serde_json::from_str("\"0x1.icon-cx0123\"").unwrap();
        assert_eq!(parsed, id);
    }
}
