//! Verification helpers for switch control tests
//!
//! Assertion helpers over VLAN inventory and the mock agent's set log.

use switchctl_common::{SnmpValue, SwitchError, Vlan};
use thiserror::Error;

use crate::agent::MockAgent;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Switch error: {0}")]
    Switch(#[from] SwitchError),

    #[error("Expected VLAN {vlan} in inventory")]
    VlanMissing { vlan: u16 },

    #[error("Expected VLAN {vlan} to be absent from inventory")]
    VlanPresent { vlan: u16 },

    #[error("VLAN {vlan} {list} port {port}: expected member={expected}, got member={actual}")]
    MembershipMismatch {
        vlan: u16,
        list: &'static str,
        port: u32,
        expected: bool,
        actual: bool,
    },

    #[error("Expected a set of {oid} to {expected:?}, agent received {actual:?}")]
    SetMismatch {
        oid: String,
        expected: SnmpValue,
        actual: Vec<SnmpValue>,
    },

    #[error("Expected {expected} set bindings, agent received {actual}")]
    SetCountMismatch { expected: usize, actual: usize },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Finds a VLAN by ID.
pub fn find_vlan(vlans: &[Vlan], vlan: u16) -> VerifyResult<&Vlan> {
    vlans
        .iter()
        .find(|v| v.index == vlan)
        .ok_or(VerificationError::VlanMissing { vlan })
}

/// Verifies that no VLAN has the given ID.
pub fn assert_vlan_absent(vlans: &[Vlan], vlan: u16) -> VerifyResult<()> {
    if vlans.iter().any(|v| v.index == vlan) {
        return Err(VerificationError::VlanPresent { vlan });
    }
    Ok(())
}

fn check_member(vlan: &Vlan, list: &'static str, port: u32, expected: bool) -> VerifyResult<()> {
    let bits = if list == "egress" {
        &vlan.egress_ports
    } else {
        &vlan.access_ports
    };
    let i = port as usize - 1;
    let actual = i < bits.capacity() && bits.is_set(i);
    if actual != expected {
        return Err(VerificationError::MembershipMismatch {
            vlan: vlan.index,
            list,
            port,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Verifies untagged membership: the port is in both egress and access lists
/// (or in neither, when `expected` is false).
pub fn assert_access_member(vlan: &Vlan, port: u32, expected: bool) -> VerifyResult<()> {
    check_member(vlan, "egress", port, expected)?;
    check_member(vlan, "access", port, expected)
}

/// Verifies egress membership only.
pub fn assert_egress_member(vlan: &Vlan, port: u32, expected: bool) -> VerifyResult<()> {
    check_member(vlan, "egress", port, expected)
}

/// Verifies that the agent received a set of `oid` to `value`.
pub fn assert_set_issued(agent: &MockAgent, oid: &str, value: &SnmpValue) -> VerifyResult<()> {
    let oid = switchctl_common::normalize_oid(oid);
    let seen: Vec<SnmpValue> = agent
        .set_log()
        .iter()
        .filter(|b| b.oid == oid)
        .map(|b| b.value.clone())
        .collect();
    if seen.contains(value) {
        return Ok(());
    }
    Err(VerificationError::SetMismatch {
        oid: oid.to_string(),
        expected: value.clone(),
        actual: seen,
    })
}

/// Verifies the number of bindings the agent received.
pub fn assert_set_count(agent: &MockAgent, expected: usize) -> VerifyResult<()> {
    let actual = agent.set_log().len();
    if actual != expected {
        return Err(VerificationError::SetCountMismatch { expected, actual });
    }
    Ok(())
}
