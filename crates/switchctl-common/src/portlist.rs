//! RFC 2674 `PortList` codec.
//!
//! A `PortList` is an OCTET STRING in which each bit stands for one bridge
//! port. Port `n` (1-based) lives in byte `(n-1) / 8`, and within that byte
//! the most significant bit comes first:
//!
//! ```text
//! byte 0: 0x80 = port 1, 0x40 = port 2, ... 0x01 = port 8
//! byte 1: 0x80 = port 9, ...
//! ```
//!
//! The accessors take 0-based bit indices (`port - 1`). Indexing past the
//! end of the byte string is a caller bug and panics; callers validate port
//! numbers against [`PortList::capacity`] before touching the bitmap.

use serde::{Serialize, Serializer};

use crate::error::{SwitchError, SwitchResult};

/// Bit-packed bridge port membership, as carried by Q-BRIDGE-MIB
/// `dot1qVlanStaticEgressPorts` / `dot1qVlanStaticUntaggedPorts`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct PortList(Vec<u8>);

impl PortList {
    /// Wraps raw PortList bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Creates an empty PortList able to address `port_count` ports.
    pub fn zeroed(port_count: usize) -> Self {
        Self(vec![0; port_count.div_ceil(8)])
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the list, returning the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of ports the list can address.
    pub fn capacity(&self) -> usize {
        self.0.len() * 8
    }

    /// Returns whether the port at 0-based index `i` is a member.
    pub fn is_set(&self, i: usize) -> bool {
        self.0[i / 8] & mask(i) != 0
    }

    /// Adds the port at 0-based index `i`.
    pub fn set(&mut self, i: usize) {
        self.0[i / 8] |= mask(i);
    }

    /// Removes the port at 0-based index `i`.
    pub fn clear(&mut self, i: usize) {
        self.0[i / 8] &= !mask(i);
    }

    /// Bitwise OR of two lists of equal length.
    pub fn merge(&self, other: &PortList) -> SwitchResult<PortList> {
        if self.len() != other.len() {
            return Err(SwitchError::LengthMismatch {
                left: self.len(),
                right: other.len(),
            });
        }
        Ok(PortList(
            self.0.iter().zip(&other.0).map(|(a, b)| a | b).collect(),
        ))
    }

    /// Iterates over member ports as 1-based port numbers, ascending.
    pub fn ports(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity())
            .filter(move |&i| self.is_set(i))
            .map(|i| i + 1)
    }

    /// Returns true if no port is a member.
    pub fn is_clear(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }
}

#[inline]
fn mask(i: usize) -> u8 {
    1 << (7 - (i % 8))
}

impl From<Vec<u8>> for PortList {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for PortList {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for PortList {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Serialized as the list of member port numbers.
impl Serialize for PortList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.ports())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_layout() {
        let mut ports = PortList::zeroed(16);
        ports.set(0);
        assert_eq!(ports.as_bytes(), &[0x80, 0x00]);

        let mut ports = PortList::zeroed(16);
        ports.set(7);
        assert_eq!(ports.as_bytes(), &[0x01, 0x00]);

        let mut ports = PortList::zeroed(16);
        ports.set(8);
        assert_eq!(ports.as_bytes(), &[0x00, 0x80]);
    }

    #[test]
    fn test_set_then_clear_every_bit() {
        let mut ports = PortList::zeroed(24);
        for i in 0..ports.capacity() {
            ports.set(i);
            assert!(ports.is_set(i));
            ports.clear(i);
            assert!(!ports.is_set(i));
        }
        assert!(ports.is_clear());
    }

    #[test]
    fn test_bit_independence() {
        let mut ports = PortList::new(vec![0b1010_0101, 0xff]);
        let before = ports.clone();

        ports.set(3);
        for i in (0..16).filter(|&i| i != 3) {
            assert_eq!(ports.is_set(i), before.is_set(i), "bit {} changed", i);
        }

        ports.clear(8);
        assert!(!ports.is_set(8));
        for i in 9..16 {
            assert!(ports.is_set(i));
        }
    }

    #[test]
    fn test_set_is_idempotent() {
        let mut ports = PortList::zeroed(8);
        ports.set(2);
        ports.set(2);
        assert_eq!(ports.as_bytes(), &[0x20]);
        ports.clear(5);
        assert_eq!(ports.as_bytes(), &[0x20]);
    }

    #[test]
    fn test_zeroed_rounds_up() {
        assert_eq!(PortList::zeroed(0).len(), 0);
        assert_eq!(PortList::zeroed(1).len(), 1);
        assert_eq!(PortList::zeroed(8).len(), 1);
        assert_eq!(PortList::zeroed(9).len(), 2);
        assert_eq!(PortList::zeroed(52).len(), 7);
    }

    #[test]
    fn test_merge() {
        let a = PortList::new(vec![0x80, 0x01]);
        let b = PortList::new(vec![0x40, 0x01]);

        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.as_bytes(), &[0xc0, 0x01]);
        assert_eq!(merged, b.merge(&a).unwrap());
        assert_eq!(a.merge(&a).unwrap(), a);
    }

    #[test]
    fn test_merge_length_mismatch() {
        let a = PortList::zeroed(8);
        let b = PortList::zeroed(16);
        match a.merge(&b) {
            Err(SwitchError::LengthMismatch { left, right }) => {
                assert_eq!((left, right), (1, 2));
            }
            other => panic!("Expected LengthMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_ports_iterator() {
        let ports = PortList::new(vec![0x50, 0x80]);
        assert_eq!(ports.ports().collect::<Vec<_>>(), vec![2, 4, 9]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        let ports = PortList::zeroed(8);
        ports.is_set(8);
    }

    #[test]
    fn test_serialize_as_port_numbers() {
        let ports = PortList::new(vec![0x50, 0x80]);
        assert_eq!(serde_json::to_string(&ports).unwrap(), "[2,4,9]");
    }
}
