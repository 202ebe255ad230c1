//! Text and JSON rendering of switch inventory.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

use switchctl_common::{Interface, Neighbor, PortList, Vlan};

/// VLAN reported by the switchmac export when none is given.
pub const CONTROL_VLAN: u16 = 2003;

/// Everything `show` reports about one switch.
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    pub interfaces: Vec<Interface>,
    pub vlans: Vec<Vlan>,
    pub neighbors: Vec<Neighbor>,
}

impl Inventory {
    pub fn new(
        interfaces: Vec<Interface>,
        vlans: Vec<Vlan>,
        neighbors: BTreeMap<u32, Neighbor>,
    ) -> Self {
        Self {
            interfaces,
            vlans,
            neighbors: neighbors.into_values().collect(),
        }
    }
}

/// One interface per line: index, label, kind and status.
pub fn interface_line(ifx: &Interface) -> String {
    let mut line = format!("{} {}", ifx.index, ifx.label);
    match ifx.kind.describe() {
        Some(kind) => {
            let _ = write!(line, " {}", kind);
        }
        None => {
            let _ = write!(line, " type:{}", ifx.kind.0);
        }
    }
    let _ = write!(
        line,
        " admin:{} op:{}",
        ifx.admin_status.as_str(),
        ifx.oper_status.as_str()
    );
    if ifx.is_bridge_port() {
        let _ = write!(line, " port:{}", ifx.bridge_index);
    }
    line
}

fn port_numbers(list: &PortList) -> String {
    list.ports()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A VLAN header line followed by its egress and access ports.
pub fn vlan_block(vlan: &Vlan) -> String {
    format!(
        "{} {}\negress ports: {}\naccess ports: {}",
        vlan.index,
        vlan.name,
        port_numbers(&vlan.egress_ports),
        port_numbers(&vlan.access_ports)
    )
}

/// `<index> <name>` per VLAN.
pub fn vlan_list(vlans: &[Vlan]) -> String {
    vlans
        .iter()
        .map(|v| format!("{} {}", v.index, v.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Neighbor lines with the name and port columns aligned.
pub fn neighbor_lines<'a>(neighbors: impl IntoIterator<Item = &'a Neighbor> + Clone) -> Vec<String> {
    let name_width = neighbors
        .clone()
        .into_iter()
        .map(|n| n.remote_name.len())
        .max()
        .unwrap_or(0);
    let port_width = neighbors
        .clone()
        .into_iter()
        .map(|n| n.remote_port_name.len())
        .max()
        .unwrap_or(0);

    neighbors
        .into_iter()
        .map(|n| {
            format!(
                "{:2} <==> {:<nw$} {:>pw$} [{}] {}",
                n.local_if_index,
                n.remote_name,
                n.remote_port_name,
                n.mac_hex(),
                n.remote_description,
                nw = name_width,
                pw = port_width,
            )
        })
        .collect()
}

/// The full `show` report.
pub fn show(inventory: &Inventory) -> String {
    let mut out = String::new();

    section(&mut out, "Interfaces");
    for ifx in &inventory.interfaces {
        let _ = writeln!(out, "{}", interface_line(ifx));
    }

    section(&mut out, "Vlans");
    for vlan in &inventory.vlans {
        let _ = writeln!(out, "{}\n", vlan_block(vlan));
    }

    section(&mut out, "Neighbors");
    for line in neighbor_lines(&inventory.neighbors) {
        let _ = writeln!(out, "{}", line);
    }
    out
}

fn section(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{}\n{}", title, "=".repeat(title.len()));
}

/// One switchmac CSV record:
/// `<mac>,<switch>/<module>.<port>,<vlan>,<name>:<port name>,<class>`.
pub fn switchmac_line(neighbor: &Neighbor, host: &str, vlan: u16, class: &str) -> String {
    format!(
        "{},{}/0.{},{},{}:{},{}",
        neighbor.mac_hex(),
        host,
        neighbor.local_if_index,
        vlan,
        neighbor.remote_name,
        neighbor.remote_port_name,
        class
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use switchctl_common::{AdminStatus, IfType, OperStatus};

    fn neighbor(port: u32, name: &str, port_name: &str) -> Neighbor {
        let mut n = Neighbor::new(port, vec![0x00, 0x1b, 0x21, 0x0a, 0x0b, port as u8]);
        n.remote_name = name.to_string();
        n.remote_port_name = port_name.to_string();
        n.remote_description = "Linux".to_string();
        n
    }

    #[test]
    fn test_interface_line() {
        let mut ifx = Interface::new(12);
        ifx.label = "ge-0/0/11 uplink".to_string();
        ifx.kind = IfType::ETHERNET;
        ifx.admin_status = AdminStatus::Up;
        ifx.oper_status = OperStatus::LowerLayerDown;
        ifx.bridge_index = 11;
        assert_eq!(
            interface_line(&ifx),
            "12 ge-0/0/11 uplink ethernet admin:up op:lower-down port:11"
        );

        let mut mgmt = Interface::new(1);
        mgmt.label = "mgmt0".to_string();
        mgmt.kind = IfType(1);
        assert_eq!(interface_line(&mgmt), "1 mgmt0 type:1 admin:unknown op:unreported");
    }

    #[test]
    fn test_vlan_block() {
        let mut vlan = Vlan::new(101);
        vlan.name = "sales".to_string();
        vlan.egress_ports = PortList::new(vec![0b0101_0000, 0x01]);
        vlan.access_ports = PortList::new(vec![0b0001_0000, 0x00]);
        assert_eq!(
            vlan_block(&vlan),
            "101 sales\negress ports: 2 4 16\naccess ports: 4"
        );
    }

    #[test]
    fn test_neighbor_lines_align() {
        let neighbors = [neighbor(3, "node-a", "eth0"), neighbor(17, "storage01", "ens1f0")];
        let lines = neighbor_lines(&neighbors);
        assert_eq!(
            lines,
            vec![
                " 3 <==> node-a      eth0 [001b210a0b03] Linux".to_string(),
                "17 <==> storage01 ens1f0 [001b210a0b11] Linux".to_string(),
            ]
        );
    }

    #[test]
    fn test_switchmac_line() {
        let n = neighbor(3, "node-a", "eth0");
        assert_eq!(
            switchmac_line(&n, "10.47.1.5", CONTROL_VLAN, "control"),
            "001b210a0b03,10.47.1.5/0.3,2003,node-a:eth0,control"
        );
    }

    #[test]
    fn test_show_sections() {
        let inventory = Inventory::new(Vec::new(), vec![Vlan::new(1)], BTreeMap::new());
        let text = show(&inventory);
        assert!(text.starts_with("Interfaces\n==========\n"));
        assert!(text.contains("\nVlans\n=====\n1 \negress ports: \naccess ports: \n"));
        assert!(text.ends_with("Neighbors\n=========\n"));
    }

    #[test]
    fn test_inventory_json() {
        let mut neighbors = BTreeMap::new();
        neighbors.insert(3, neighbor(3, "node-a", "eth0"));
        let inventory = Inventory::new(Vec::new(), Vec::new(), neighbors);
        let json = serde_json::to_value(&inventory).unwrap();
        assert_eq!(json["neighbors"][0]["remote_mac"], "001b210a0b03");
        assert_eq!(json["neighbors"][0]["local_if_index"], 3);
    }
}
