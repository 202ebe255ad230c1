//! Test infrastructure for switchctl
//!
//! Provides:
//! - An in-memory SNMP agent implementing the session seam, with Q-BRIDGE
//!   row-status semantics, a set log and fault injection
//! - MIB fixtures for common switch layouts
//! - Verification helpers for VLAN membership and issued sets

pub mod agent;
pub mod fixtures;
mod verification;

pub use agent::{Fault, MockAgent};
pub use fixtures::*;
pub use verification::*;
