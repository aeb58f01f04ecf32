//! SR-IOV conformance suite library
//!
//! Drives a separately deployed SR-IOV network operator through its custom
//! resources, then checks VF-backed pod connectivity across a fixed matrix of
//! MTU classes, topologies and protocols.

pub mod config;
pub mod error;
pub mod k8s;
pub mod parameters;
pub mod report;
pub mod scenario;
pub mod sriov;
pub mod stability;
pub mod suite;

pub use error::{ParameterError, SuiteError, SuiteResult};
pub use parameters::{Connectivity, ConnectivityTestParameters, Mtu, Protocol};
pub use suite::Suite;
