//! The connectivity matrix exercised by the suite

use crate::parameters::{Connectivity, ConnectivityTestParameters, Mtu, Protocol};

/// Title shared by every entry of the static-addressing table
pub const TABLE_TITLE: &str = "IP Static, Ip Stack: Dual-stack, Mac address: MAC static";

/// Positive ICMP entries: every MTU class across and within nodes
pub fn connectivity_matrix() -> Vec<ConnectivityTestParameters> {
    let mut entries = Vec::new();
    for mtu in [Mtu::Custom, Mtu::Standard, Mtu::Jumbo] {
        for connectivity in [Connectivity::DiffNode, Connectivity::SameNodeSamePf] {
            entries.push(ConnectivityTestParameters::from_parts(
                mtu,
                connectivity,
                Protocol::Icmp,
            ));
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_shape() {
        let matrix = connectivity_matrix();
        assert_eq!(matrix.len(), 6);
        assert!(matrix.iter().all(|p| p.protocol == Protocol::Icmp));
        assert_eq!(
            matrix[0],
            ConnectivityTestParameters::from_parts(Mtu::Custom, Connectivity::DiffNode, Protocol::Icmp)
        );
        assert_eq!(matrix[5].mtu, Mtu::Jumbo);
        assert_eq!(matrix[5].connectivity, Connectivity::SameNodeSamePf);
    }
}
