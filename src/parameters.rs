//! Connectivity test dimensions
//!
//! Every scenario is described by an MTU class, a pod placement topology and a
//! traffic protocol. Each dimension is a closed set; values outside it are
//! rejected with a [`ParameterError`] so the caller can skip or fail the case.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::ParameterError;

/// Interface MTU classes exercised by the suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Mtu {
    /// 1450, below the Ethernet default
    Custom,
    /// 1500
    Standard,
    /// 9000
    Jumbo,
}

impl Mtu {
    pub const fn value(self) -> u32 {
        match self {
            Mtu::Custom => 1450,
            Mtu::Standard => 1500,
            Mtu::Jumbo => 9000,
        }
    }

    /// ICMP payload that fills the MTU exactly once headers are added
    pub const fn probe_payload(self) -> u32 {
        match self {
            Mtu::Custom => 1400,
            Mtu::Standard => 1460,
            Mtu::Jumbo => 8972,
        }
    }
}

impl TryFrom<u32> for Mtu {
    type Error = ParameterError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Mtu::iter()
            .find(|mtu| mtu.value() == value)
            .ok_or(ParameterError::InvalidMtu(value))
    }
}

impl std::fmt::Display for Mtu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl Serialize for Mtu {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.value())
    }
}

impl<'de> Deserialize<'de> for Mtu {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u32::deserialize(deserializer)?;
        Mtu::try_from(value).map_err(serde::de::Error::custom)
    }
}

/// Placement of the two pods relative to nodes and physical functions
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr, Serialize,
    Deserialize,
)]
pub enum Connectivity {
    #[strum(serialize = "diff-node")]
    #[serde(rename = "diff-node")]
    DiffNode,
    #[strum(serialize = "same-node-diff-pf")]
    #[serde(rename = "same-node-diff-pf")]
    SameNodeDiffPf,
    #[strum(serialize = "same-node-same-pf")]
    #[serde(rename = "same-node-same-pf")]
    SameNodeSamePf,
    #[strum(serialize = "pod-ext")]
    #[serde(rename = "pod-ext")]
    PodExternal,
}

/// Traffic used to probe connectivity
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Protocol {
    Icmp,
    Tcp,
    Udp,
    MulticastUdp,
    BroadcastUdp,
    Sctp,
}

/// A validated point in the scenario matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConnectivityTestParameters {
    pub protocol: Protocol,
    #[serde(rename = "MTU")]
    pub mtu: Mtu,
    pub connectivity: Connectivity,
}

impl ConnectivityTestParameters {
    /// Validate raw dimension values
    pub fn new(mtu: u32, connectivity: &str, protocol: &str) -> Result<Self, ParameterError> {
        let mtu = Mtu::try_from(mtu)?;
        let connectivity = connectivity
            .parse::<Connectivity>()
            .map_err(|_| ParameterError::InvalidConnectivity(connectivity.to_string()))?;
        let protocol = protocol
            .parse::<Protocol>()
            .map_err(|_| ParameterError::InvalidProtocol(protocol.to_string()))?;

        Ok(Self::from_parts(mtu, connectivity, protocol))
    }

    pub const fn from_parts(mtu: Mtu, connectivity: Connectivity, protocol: Protocol) -> Self {
        Self {
            protocol,
            mtu,
            connectivity,
        }
    }

    /// Human readable entry name: `<desc> {"Protocol":..,"MTU":..,"Connectivity":..}`
    pub fn describe(&self, desc: &str) -> String {
        let params = serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
        format!("{} {}", desc, params).trim_start().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_valid_combinations_construct() {
        for mtu in Mtu::iter() {
            for connectivity in Connectivity::iter() {
                for protocol in Protocol::iter() {
                    let params = ConnectivityTestParameters::new(
                        mtu.value(),
                        connectivity.as_ref(),
                        protocol.as_ref(),
                    )
                    .unwrap();
                    assert_eq!(params.mtu, mtu);
                    assert_eq!(params.connectivity, connectivity);
                    assert_eq!(params.protocol, protocol);
                }
            }
        }
    }

    #[test]
    fn test_invalid_mtu_rejected() {
        let err = ConnectivityTestParameters::new(1280, "diff-node", "icmp").unwrap_err();
        assert_eq!(err, ParameterError::InvalidMtu(1280));
    }

    #[test]
    fn test_invalid_connectivity_rejected() {
        let err = ConnectivityTestParameters::new(1500, "cross-cluster", "icmp").unwrap_err();
        assert_eq!(
            err,
            ParameterError::InvalidConnectivity("cross-cluster".to_string())
        );
    }

    #[test]
    fn test_invalid_protocol_rejected() {
        let err = ConnectivityTestParameters::new(9000, "diff-node", "ICMP").unwrap_err();
        assert_eq!(err, ParameterError::InvalidProtocol("ICMP".to_string()));
    }

    #[test]
    fn test_probe_payloads() {
        assert_eq!(Mtu::Custom.probe_payload(), 1400);
        assert_eq!(Mtu::Standard.probe_payload(), 1460);
        assert_eq!(Mtu::Jumbo.probe_payload(), 8972);
    }

    #[test]
    fn test_describe() {
        let params =
            ConnectivityTestParameters::from_parts(Mtu::Jumbo, Connectivity::DiffNode, Protocol::Icmp);
        assert_eq!(
            params.describe(""),
            r#"{"Protocol":"icmp","MTU":9000,"Connectivity":"diff-node"}"#
        );
    }
}
