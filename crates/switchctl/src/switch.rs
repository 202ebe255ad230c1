//! SnmpSwitch - Q-BRIDGE-MIB switch controller

use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

use switchctl_common::{
    validate_ports, validate_vlan_id, Interface, Neighbor, PortList, SessionConfig, SnmpSession,
    SnmpValue, SwitchControl, SwitchError, SwitchResult, UdpSession, VarBind, Vlan, VlanCreation,
};

use crate::interfaces::build_interfaces;
use crate::neighbors::build_neighbors;
use crate::oids::{self, row_status};
use crate::vlans::build_vlans;
use crate::walk::read_scalar;

/// Controls one switch through its standard bridge MIBs.
///
/// Operation flow:
/// 1. Inventory queries walk the device and correlate tables into records
/// 2. Mutations fetch the VLAN inventory, edit PortLists and write each
///    touched VLAN back with one set per PortList
pub struct SnmpSwitch<S> {
    /// The session this controller owns
    session: S,

    /// How VLANs unknown to the device are brought into existence
    vlan_creation: VlanCreation,
}

impl SnmpSwitch<UdpSession> {
    /// Opens an SNMPv2c session to `host` and binds a controller to it.
    pub async fn connect(host: &str, config: &SessionConfig) -> SwitchResult<Self> {
        let session = UdpSession::connect(host, config).await?;
        Ok(Self::new(session).with_vlan_creation(config.vlan_creation))
    }
}

impl<S: SnmpSession> SnmpSwitch<S> {
    /// Creates a controller over an existing session.
    pub fn new(session: S) -> Self {
        Self {
            session,
            vlan_creation: VlanCreation::default(),
        }
    }

    /// Sets the VLAN creation policy for this device.
    pub fn with_vlan_creation(mut self, vlan_creation: VlanCreation) -> Self {
        self.vlan_creation = vlan_creation;
        self
    }

    pub fn vlan_creation(&self) -> VlanCreation {
        self.vlan_creation
    }

    /// Gets the underlying session.
    pub fn session(&self) -> &S {
        &self.session
    }

    /// Releases the controller, returning its session.
    pub fn into_session(self) -> S {
        self.session
    }

    /// Number of bridge ports, which sizes every PortList on the device.
    async fn bridge_port_count(&mut self) -> SwitchResult<u32> {
        read_scalar(&mut self.session, oids::DOT1D_BASE_NUM_PORTS)
            .await?
            .ok_or_else(|| SwitchError::MissingScalar {
                oid: oids::DOT1D_BASE_NUM_PORTS.to_string(),
            })
    }

    /// VLAN inventory ready for write-back. A static row without egress or
    /// untagged cells reads as an empty PortList, which the agent would
    /// reject, so those lists are sized from the bridge port count.
    async fn current_vlans(&mut self) -> SwitchResult<Vec<Vlan>> {
        let mut vlans = build_vlans(&mut self.session).await?;
        if vlans
            .iter()
            .any(|v| v.egress_ports.is_empty() || v.access_ports.is_empty())
        {
            let port_count = self.bridge_port_count().await? as usize;
            for vlan in &mut vlans {
                if vlan.egress_ports.is_empty() {
                    debug!(vlan = vlan.index, "No egress PortList on device, starting empty");
                    vlan.egress_ports = PortList::zeroed(port_count);
                }
                if vlan.access_ports.is_empty() {
                    debug!(vlan = vlan.index, "No untagged PortList on device, starting empty");
                    vlan.access_ports = PortList::zeroed(port_count);
                }
            }
        }
        Ok(vlans)
    }

    /// Writes a single binding and converts a device rejection into an error.
    async fn write(&mut self, binding: VarBind) -> SwitchResult<()> {
        let oid = binding.oid.clone();
        let response = self.session.set(std::slice::from_ref(&binding)).await?;
        response.into_result(&oid)
    }

    async fn write_row_status(&mut self, vlan: u16, status: i64) -> SwitchResult<()> {
        self.write(VarBind::new(oids::vlan_row_status(vlan), SnmpValue::Integer(status)))
            .await
    }

    /// Writes both PortLists of `vlan`, egress first. The two sets are
    /// separate requests.
    async fn write_port_lists(&mut self, vlan: &Vlan) -> SwitchResult<()> {
        self.write(VarBind::new(
            oids::vlan_egress(vlan.index),
            vlan.egress_ports.as_bytes().to_vec(),
        ))
        .await?;
        self.write(VarBind::new(
            oids::vlan_access(vlan.index),
            vlan.access_ports.as_bytes().to_vec(),
        ))
        .await?;
        debug!(vlan = vlan.index, "Wrote PortLists");
        Ok(())
    }
}

/// Fails if any port lies beyond the PortList.
fn check_capacity(ports: &[u32], list: &PortList) -> SwitchResult<()> {
    let capacity = list.capacity();
    match ports.iter().find(|&&p| p as usize > capacity) {
        Some(&port) => Err(SwitchError::PortOutOfRange { port, capacity }),
        None => Ok(()),
    }
}

/// 0-based PortList bit of a 1-based port.
fn bit(port: u32) -> usize {
    port as usize - 1
}

#[async_trait]
impl<S: SnmpSession> SwitchControl for SnmpSwitch<S> {
    fn driver_name(&self) -> &str {
        "q-bridge"
    }

    async fn interfaces(&mut self) -> SwitchResult<Vec<Interface>> {
        build_interfaces(&mut self.session).await
    }

    async fn vlans(&mut self) -> SwitchResult<Vec<Vlan>> {
        build_vlans(&mut self.session).await
    }

    async fn neighbors(&mut self) -> SwitchResult<BTreeMap<u32, Neighbor>> {
        build_neighbors(&mut self.session).await
    }

    #[instrument(skip(self))]
    async fn create_vlan(&mut self, vlan: u16) -> SwitchResult<()> {
        validate_vlan_id(vlan)?;
        self.write_row_status(vlan, row_status::CREATE_AND_GO).await?;
        info!("Created VLAN {}", vlan);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_vlan(&mut self, vlan: u16) -> SwitchResult<()> {
        validate_vlan_id(vlan)?;
        self.write_row_status(vlan, row_status::DESTROY).await?;
        info!("Deleted VLAN {}", vlan);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_port_access(&mut self, ports: &[u32], vlan: u16) -> SwitchResult<()> {
        validate_vlan_id(vlan)?;
        validate_ports(ports)?;

        let existing = self
            .current_vlans()
            .await?
            .into_iter()
            .find(|v| v.index == vlan);

        let mut target = match existing {
            Some(target) => {
                check_capacity(ports, &target.egress_ports)?;
                check_capacity(ports, &target.access_ports)?;
                target
            }
            None => {
                let port_count = self.bridge_port_count().await?;
                let mut target = Vlan::new(vlan);
                target.egress_ports = PortList::zeroed(port_count as usize);
                target.access_ports = PortList::zeroed(port_count as usize);
                check_capacity(ports, &target.egress_ports)?;

                match self.vlan_creation {
                    VlanCreation::Explicit => {
                        self.write_row_status(vlan, row_status::CREATE_AND_GO).await?;
                        info!("Created VLAN {} for access ports", vlan);
                    }
                    VlanCreation::ImplicitOnWrite => {
                        warn!(
                            "VLAN {} does not exist, relying on the agent to create it on write",
                            vlan
                        );
                    }
                }
                target
            }
        };

        for &port in ports {
            target.egress_ports.set(bit(port));
            target.access_ports.set(bit(port));
        }
        self.write_port_lists(&target).await?;

        info!("Set ports {:?} to access VLAN {}", ports, vlan);
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_port_trunk(&mut self, ports: &[u32], vlans: &[u16]) -> SwitchResult<()> {
        for &vlan in vlans {
            validate_vlan_id(vlan)?;
        }
        validate_ports(ports)?;

        let mut inventory: BTreeMap<u16, Vlan> = self
            .current_vlans()
            .await?
            .into_iter()
            .map(|v| (v.index, v))
            .collect();

        let mut targets: Vec<Vlan> = Vec::with_capacity(vlans.len());
        for &vlan in vlans {
            if targets.iter().any(|t| t.index == vlan) {
                continue;
            }
            match inventory.remove(&vlan) {
                Some(target) => {
                    check_capacity(ports, &target.egress_ports)?;
                    targets.push(target);
                }
                None => warn!("VLAN {} does not exist, not trunking ports to it", vlan),
            }
        }

        for mut target in targets {
            for &port in ports {
                target.egress_ports.set(bit(port));
            }
            self.write_port_lists(&target).await?;
            info!("Added ports {:?} to trunk VLAN {}", ports, target.index);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_ports(&mut self, ports: &[u32]) -> SwitchResult<()> {
        validate_ports(ports)?;

        let vlans = self.current_vlans().await?;
        for mut vlan in vlans {
            for &port in ports {
                let i = bit(port);
                if i < vlan.egress_ports.capacity() {
                    vlan.egress_ports.clear(i);
                }
                if i < vlan.access_ports.capacity() {
                    vlan.access_ports.clear(i);
                }
            }
            self.write_port_lists(&vlan).await?;
        }

        info!("Cleared ports {:?} from all VLANs", ports);
        Ok(())
    }
}
