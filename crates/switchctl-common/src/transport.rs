//! SNMPv2c transport over UDP.
//!
//! [`UdpSession`] implements [`SnmpSession`] on top of the `snmp2` crate's
//! tokio session. Every request is bounded by the configured timeout and
//! attempted exactly once; failures surface immediately as errors.
//!
//! Walks use GETBULK starting at the base OID and continue from the last
//! returned OID until the agent leaves the subtree or reports
//! endOfMibView.

use async_trait::async_trait;
use snmp2::{AsyncSession, Oid, Value};
use std::future::Future;
use std::net::{Ipv6Addr, SocketAddr};
use std::time::Duration;
use tracing::{debug, trace};

use crate::config::SessionConfig;
use crate::error::{SwitchError, SwitchResult};
use crate::session::{
    normalize_oid, oid_in_subtree, parse_oid, SetResponse, SnmpSession, SnmpValue, VarBind,
};

/// A live SNMPv2c session with one agent.
pub struct UdpSession {
    session: AsyncSession,
    timeout: Duration,
    max_repetitions: u32,
}

impl UdpSession {
    /// Opens a session to `host`, which may carry an explicit port.
    pub async fn connect(host: &str, config: &SessionConfig) -> SwitchResult<Self> {
        config.validate()?;
        let target = agent_address(host, config.port);
        debug!(target = %target, "Opening SNMPv2c session");

        let session = AsyncSession::new_v2c(target.as_str(), config.community.as_bytes(), 0)
            .await
            .map_err(|source| SwitchError::Connect {
                target: target.clone(),
                source,
            })?;

        Ok(Self {
            session,
            timeout: config.timeout,
            max_repetitions: config.max_repetitions,
        })
    }
}

#[async_trait]
impl SnmpSession for UdpSession {
    async fn get(&mut self, oid: &str) -> SwitchResult<Option<SnmpValue>> {
        let name = to_oid(oid)?;
        let limit = self.timeout;
        let mut pdu = bounded(limit, "get", oid, self.session.get(&name)).await?;

        if pdu.error_status != 0 {
            // v1-style agents answer a missing object with noSuchName
            if pdu.error_status == 2 {
                return Ok(None);
            }
            return Err(SwitchError::device(oid, pdu.error_status));
        }

        let result = pdu.varbinds.next().and_then(|(_, value)| from_wire(value));
        trace!(oid = %oid, found = result.is_some(), "get");
        Ok(result)
    }

    async fn walk(&mut self, base: &str) -> SwitchResult<Vec<VarBind>> {
        let base = normalize_oid(base).to_string();
        let limit = self.timeout;
        let mut rows = Vec::new();
        let mut cursor = base.clone();
        let mut previous = parse_oid(&base)?;

        loop {
            let start = to_oid(&cursor)?;
            let pdu = bounded(
                limit,
                "walk",
                &base,
                self.session.getbulk(&[&start], 0, self.max_repetitions),
            )
            .await?;

            if pdu.error_status != 0 {
                return Err(SwitchError::device(&base, pdu.error_status));
            }

            let mut last = None;
            let mut finished = true;
            for (name, value) in pdu.varbinds {
                let name = name.to_id_string();
                if matches!(value, Value::EndOfMibView) || !oid_in_subtree(&name, &base) {
                    finished = true;
                    break;
                }
                previous = next_in_order(&base, &previous, &name)?;
                finished = false;
                if let Some(value) = from_wire(value) {
                    rows.push(VarBind {
                        oid: name.clone(),
                        value,
                    });
                }
                last = Some(name);
            }

            match last {
                Some(next) if !finished => cursor = next,
                _ => break,
            }
        }

        debug!(base = %base, rows = rows.len(), "walk complete");
        Ok(rows)
    }

    async fn set(&mut self, bindings: &[VarBind]) -> SwitchResult<SetResponse> {
        let first = bindings.first().map(|b| b.oid.clone()).unwrap_or_default();
        let names = bindings
            .iter()
            .map(|b| to_oid(&b.oid))
            .collect::<SwitchResult<Vec<_>>>()?;
        let values = bindings
            .iter()
            .map(to_wire)
            .collect::<SwitchResult<Vec<_>>>()?;
        let request: Vec<(&Oid<'_>, Value<'_>)> = names.iter().zip(values).collect();

        let limit = self.timeout;
        let pdu = bounded(limit, "set", &first, self.session.set(&request)).await?;

        Ok(SetResponse {
            error_status: pdu.error_status,
            error_index: pdu.error_index,
        })
    }
}

/// Runs one request under the per-request timeout.
async fn bounded<T, E, F>(limit: Duration, operation: &str, oid: &str, request: F) -> SwitchResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    match tokio::time::timeout(limit, request).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => Err(SwitchError::transport(operation, oid, format!("{:?}", e))),
        Err(_) => Err(SwitchError::Timeout {
            oid: oid.to_string(),
            timeout: limit,
        }),
    }
}

fn to_oid(oid: &str) -> SwitchResult<Oid<'static>> {
    let arcs = parse_oid(oid)?;
    Oid::from(&arcs[..])
        .map_err(|e| SwitchError::transport("encode", oid, format!("invalid OID: {:?}", e)))
}

/// Converts a response value, dropping exceptions and constructed types.
fn from_wire(value: Value<'_>) -> Option<SnmpValue> {
    Some(match value {
        Value::Integer(v) => SnmpValue::Integer(v),
        Value::OctetString(b) => SnmpValue::OctetString(b.to_vec()),
        Value::ObjectIdentifier(o) => SnmpValue::ObjectIdentifier(o.to_id_string()),
        Value::IpAddress(a) => SnmpValue::IpAddress(a),
        Value::Counter32(v) => SnmpValue::Counter32(v),
        Value::Unsigned32(v) => SnmpValue::Gauge32(v),
        Value::Timeticks(v) => SnmpValue::TimeTicks(v),
        Value::Opaque(b) => SnmpValue::Opaque(b.to_vec()),
        Value::Counter64(v) => SnmpValue::Counter64(v),
        Value::Null => SnmpValue::Null,
        _ => return None,
    })
}

fn to_wire(binding: &VarBind) -> SwitchResult<Value<'_>> {
    Ok(match &binding.value {
        SnmpValue::Integer(v) => Value::Integer(*v),
        SnmpValue::OctetString(b) => Value::OctetString(b),
        SnmpValue::IpAddress(a) => Value::IpAddress(*a),
        SnmpValue::Counter32(v) => Value::Counter32(*v),
        SnmpValue::Gauge32(v) => Value::Unsigned32(*v),
        SnmpValue::TimeTicks(v) => Value::Timeticks(*v),
        SnmpValue::Counter64(v) => Value::Counter64(*v),
        SnmpValue::Opaque(b) => Value::Opaque(b),
        SnmpValue::Null => Value::Null,
        SnmpValue::ObjectIdentifier(_) => {
            return Err(SwitchError::unexpected_type(
                &binding.oid,
                "writable scalar",
                "OBJECT IDENTIFIER",
            ))
        }
    })
}

/// Parses the next OID of a walk, which must sort strictly after the
/// previous one. Agents that go backwards would otherwise loop forever.
fn next_in_order(base: &str, previous: &[u64], name: &str) -> SwitchResult<Vec<u64>> {
    let arcs = parse_oid(name)?;
    if arcs.as_slice() <= previous {
        return Err(SwitchError::transport(
            "walk",
            base,
            format!("agent returned non-increasing OID {}", name),
        ));
    }
    Ok(arcs)
}

/// Appends the default port unless `host` already names one.
fn agent_address(host: &str, port: u16) -> String {
    if host.parse::<SocketAddr>().is_ok() {
        host.to_string()
    } else if host.parse::<Ipv6Addr>().is_ok() {
        format!("[{}]:{}", host, port)
    } else if host.contains(':') {
        host.to_string()
    } else {
        format!("{}:{}", host, port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_address() {
        assert_eq!(agent_address("10.47.1.5", 161), "10.47.1.5:161");
        assert_eq!(agent_address("10.47.1.5:1161", 161), "10.47.1.5:1161");
        assert_eq!(agent_address("switch1.lab", 161), "switch1.lab:161");
        assert_eq!(agent_address("switch1.lab:1161", 161), "switch1.lab:1161");
        assert_eq!(agent_address("fe80::1", 161), "[fe80::1]:161");
        assert_eq!(agent_address("[fe80::1]:1161", 161), "[fe80::1]:1161");
    }

    #[test]
    fn test_walk_order_must_increase() {
        let base = "1.3.6.1.2.1.2.2.1.1";
        let previous = parse_oid("1.3.6.1.2.1.2.2.1.1.10").unwrap();

        assert_eq!(
            next_in_order(base, &previous, "1.3.6.1.2.1.2.2.1.1.11").unwrap(),
            parse_oid("1.3.6.1.2.1.2.2.1.1.11").unwrap()
        );
        // arcs compare numerically, not as text
        assert!(next_in_order(base, &parse_oid("1.3.6.1.2.1.2.2.1.1.9").unwrap(), "1.3.6.1.2.1.2.2.1.1.10").is_ok());
        assert!(matches!(
            next_in_order(base, &previous, "1.3.6.1.2.1.2.2.1.1.10"),
            Err(SwitchError::Transport { .. })
        ));
        assert!(matches!(
            next_in_order(base, &previous, "1.3.6.1.2.1.2.2.1.1.2"),
            Err(SwitchError::Transport { .. })
        ));
    }

    #[test]
    fn test_to_oid_rejects_garbage() {
        assert!(to_oid("1.3.6.1.2.1.2.2.1.1").is_ok());
        assert!(to_oid("1.3.six").is_err());
    }

    #[test]
    fn test_to_wire_rejects_oid_values() {
        let binding = VarBind {
            oid: "1.3.6.1.2.1.1.2.0".to_string(),
            value: SnmpValue::ObjectIdentifier("1.3.6.1.4.1".to_string()),
        };
        assert!(to_wire(&binding).is_err());
    }

    #[tokio::test]
    async fn test_connect_rejects_invalid_config() {
        let config = SessionConfig::default().with_community("");
        let result = UdpSession::connect("127.0.0.1", &config).await;
        assert!(matches!(result, Err(SwitchError::Config { .. })));
    }
}
