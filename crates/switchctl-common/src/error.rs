//! Error types for switch control operations.
//!
//! This module defines the error types used throughout the switchctl crates.
//! All errors implement `std::error::Error` via `thiserror`.

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for switch operations.
pub type SwitchResult<T> = Result<T, SwitchError>;

/// SNMP error-status codes a device can return on a response PDU (RFC 3416).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    TooBig,
    NoSuchName,
    BadValue,
    ReadOnly,
    GenErr,
    NoAccess,
    WrongType,
    WrongLength,
    WrongEncoding,
    WrongValue,
    NoCreation,
    InconsistentValue,
    ResourceUnavailable,
    CommitFailed,
    UndoFailed,
    AuthorizationError,
    NotWritable,
    InconsistentName,
    /// A code outside the RFC 3416 range.
    Other(u32),
}

impl DeviceStatus {
    /// Decodes a non-zero error-status code.
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => DeviceStatus::TooBig,
            2 => DeviceStatus::NoSuchName,
            3 => DeviceStatus::BadValue,
            4 => DeviceStatus::ReadOnly,
            5 => DeviceStatus::GenErr,
            6 => DeviceStatus::NoAccess,
            7 => DeviceStatus::WrongType,
            8 => DeviceStatus::WrongLength,
            9 => DeviceStatus::WrongEncoding,
            10 => DeviceStatus::WrongValue,
            11 => DeviceStatus::NoCreation,
            12 => DeviceStatus::InconsistentValue,
            13 => DeviceStatus::ResourceUnavailable,
            14 => DeviceStatus::CommitFailed,
            15 => DeviceStatus::UndoFailed,
            16 => DeviceStatus::AuthorizationError,
            17 => DeviceStatus::NotWritable,
            18 => DeviceStatus::InconsistentName,
            other => DeviceStatus::Other(other),
        }
    }

    /// Returns the numeric error-status code.
    pub fn code(&self) -> u32 {
        match self {
            DeviceStatus::TooBig => 1,
            DeviceStatus::NoSuchName => 2,
            DeviceStatus::BadValue => 3,
            DeviceStatus::ReadOnly => 4,
            DeviceStatus::GenErr => 5,
            DeviceStatus::NoAccess => 6,
            DeviceStatus::WrongType => 7,
            DeviceStatus::WrongLength => 8,
            DeviceStatus::WrongEncoding => 9,
            DeviceStatus::WrongValue => 10,
            DeviceStatus::NoCreation => 11,
            DeviceStatus::InconsistentValue => 12,
            DeviceStatus::ResourceUnavailable => 13,
            DeviceStatus::CommitFailed => 14,
            DeviceStatus::UndoFailed => 15,
            DeviceStatus::AuthorizationError => 16,
            DeviceStatus::NotWritable => 17,
            DeviceStatus::InconsistentName => 18,
            DeviceStatus::Other(code) => *code,
        }
    }

    /// Returns the MIB name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::TooBig => "tooBig",
            DeviceStatus::NoSuchName => "noSuchName",
            DeviceStatus::BadValue => "badValue",
            DeviceStatus::ReadOnly => "readOnly",
            DeviceStatus::GenErr => "genErr",
            DeviceStatus::NoAccess => "noAccess",
            DeviceStatus::WrongType => "wrongType",
            DeviceStatus::WrongLength => "wrongLength",
            DeviceStatus::WrongEncoding => "wrongEncoding",
            DeviceStatus::WrongValue => "wrongValue",
            DeviceStatus::NoCreation => "noCreation",
            DeviceStatus::InconsistentValue => "inconsistentValue",
            DeviceStatus::ResourceUnavailable => "resourceUnavailable",
            DeviceStatus::CommitFailed => "commitFailed",
            DeviceStatus::UndoFailed => "undoFailed",
            DeviceStatus::AuthorizationError => "authorizationError",
            DeviceStatus::NotWritable => "notWritable",
            DeviceStatus::InconsistentName => "inconsistentName",
            DeviceStatus::Other(_) => "other",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.code())
    }
}

/// Errors that can occur during switch control operations.
#[derive(Debug, Error)]
pub enum SwitchError {
    /// Failed to open the UDP session to the agent.
    #[error("Failed to connect to SNMP agent '{target}': {source}")]
    Connect {
        /// The agent address.
        target: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// A request could not be completed (socket error, malformed response).
    #[error("SNMP {operation} failed at {oid}: {message}")]
    Transport {
        /// The request kind ("get", "walk", "set").
        operation: String,
        /// The OID the request addressed.
        oid: String,
        /// Error message.
        message: String,
    },

    /// No response arrived within the configured timeout.
    #[error("SNMP request for {oid} timed out after {timeout:?}")]
    Timeout {
        /// The OID the request addressed.
        oid: String,
        /// The configured per-request timeout.
        timeout: Duration,
    },

    /// The device answered with a non-zero error-status.
    #[error("Device rejected request at {oid}: {status}")]
    Device {
        /// The OID the request addressed.
        oid: String,
        /// The decoded error-status.
        status: DeviceStatus,
    },

    /// A required scalar object is absent on the device.
    #[error("Scalar {oid} is not available on the device")]
    MissingScalar {
        /// The scalar OID.
        oid: String,
    },

    /// A row key could not be extracted from an OID.
    #[error("Cannot extract row key from {oid}: {reason}")]
    RowKey {
        /// The row OID.
        oid: String,
        /// Why extraction failed.
        reason: String,
    },

    /// A value had a different SNMP type than expected.
    #[error("Unexpected value type at {oid}: expected {expected}, got {actual}")]
    UnexpectedType {
        /// The OID carrying the value.
        oid: String,
        /// The expected type name.
        expected: String,
        /// The actual type name.
        actual: String,
    },

    /// Two PortLists of different byte lengths were combined.
    #[error("PortList length mismatch: {left} bytes vs {right} bytes")]
    LengthMismatch {
        /// Length of the left operand.
        left: usize,
        /// Length of the right operand.
        right: usize,
    },

    /// A port number is beyond the device's PortList.
    #[error("Port {port} is out of range (device PortList holds {capacity} ports)")]
    PortOutOfRange {
        /// The 1-based port number.
        port: u32,
        /// Number of ports the PortList can address.
        capacity: usize,
    },

    /// A port number is not a valid 1-based bridge port.
    #[error("Invalid port number {port}")]
    InvalidPort {
        /// The rejected port number.
        port: u32,
    },

    /// A VLAN ID is outside 1..=4094.
    #[error("Invalid VLAN ID {vlan}")]
    InvalidVlan {
        /// The rejected VLAN ID.
        vlan: u32,
    },

    /// Session configuration is invalid.
    #[error("Invalid configuration for {field}: {message}")]
    Config {
        /// The offending field.
        field: String,
        /// Error message.
        message: String,
    },
}

impl SwitchError {
    /// Creates a transport error.
    pub fn transport(
        operation: impl Into<String>,
        oid: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Transport {
            operation: operation.into(),
            oid: oid.into(),
            message: message.into(),
        }
    }

    /// Creates a device error from a raw error-status code.
    pub fn device(oid: impl Into<String>, code: u32) -> Self {
        Self::Device {
            oid: oid.into(),
            status: DeviceStatus::from_code(code),
        }
    }

    /// Creates a row key error.
    pub fn row_key(oid: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RowKey {
            oid: oid.into(),
            reason: reason.into(),
        }
    }

    /// Creates an unexpected type error.
    pub fn unexpected_type(
        oid: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::UnexpectedType {
            oid: oid.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error indicates a transient condition
    /// that may succeed on retry.
    ///
    /// Nothing in this workspace retries; the classification is for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SwitchError::Timeout { .. } | SwitchError::Transport { .. } | SwitchError::Connect { .. }
        )
    }

    /// Returns true if the error was raised while validating caller input,
    /// before any request reached the device.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            SwitchError::InvalidPort { .. }
                | SwitchError::InvalidVlan { .. }
                | SwitchError::PortOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_status_round_trip() {
        for code in 1..=18 {
            assert_eq!(DeviceStatus::from_code(code).code(), code);
        }
        assert_eq!(DeviceStatus::from_code(42), DeviceStatus::Other(42));
    }

    #[test]
    fn test_device_error_display() {
        let err = SwitchError::device("1.3.6.1.2.1.17.7.1.4.3.1.5.101", 12);
        assert_eq!(
            err.to_string(),
            "Device rejected request at 1.3.6.1.2.1.17.7.1.4.3.1.5.101: inconsistentValue (12)"
        );
    }

    #[test]
    fn test_transport_error() {
        let err = SwitchError::transport("walk", "1.3.6.1.2.1.2.2.1.1", "connection refused");
        assert_eq!(
            err.to_string(),
            "SNMP walk failed at 1.3.6.1.2.1.2.2.1.1: connection refused"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(SwitchError::transport("get", "1.3", "reset").is_retryable());
        assert!(SwitchError::Timeout {
            oid: "1.3".to_string(),
            timeout: Duration::from_secs(5),
        }
        .is_retryable());
        assert!(!SwitchError::device("1.3", 6).is_retryable());
        assert!(!SwitchError::config("community", "must not be empty").is_retryable());
    }

    #[test]
    fn test_is_input_error() {
        assert!(SwitchError::InvalidVlan { vlan: 5000 }.is_input_error());
        assert!(SwitchError::InvalidPort { port: 0 }.is_input_error());
        assert!(!SwitchError::device("1.3", 12).is_input_error());
    }
}
