//! Command execution against the in-memory agent.

use pretty_assertions::assert_eq;

use switchctl::cli::{execute, Command, PortCommand, VlanCommand};
use switchctl::SnmpSwitch;
use switchctl_common::{DeviceStatus, SwitchControl, SwitchError};
use switchctl_test::{assert_access_member, find_vlan, lab_switch};

const HOST: &str = "10.47.1.5";

#[tokio::test]
async fn test_neighbors_export() {
    let mut switch = SnmpSwitch::new(lab_switch().build());
    let command = Command::Neighbors {
        class: "control".to_string(),
        vlan: 2003,
    };

    let output = execute(&mut switch, HOST, &command, false).await.unwrap();
    assert_eq!(
        output,
        "001b210a0b0c,10.47.1.5/0.11,2003,node-a:eth0,control\n\
         3cfdfe010203,10.47.1.5/0.12,2003,storage01:ens1f0,control"
    );
}

#[tokio::test]
async fn test_neighbors_json() {
    let mut switch = SnmpSwitch::new(lab_switch().build());
    let command = Command::Neighbors {
        class: "control".to_string(),
        vlan: 2003,
    };

    let output = execute(&mut switch, HOST, &command, true).await.unwrap();
    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json[1]["remote_name"], "storage01");
    assert_eq!(json[1]["remote_mac"], "3cfdfe010203");
}

#[tokio::test]
async fn test_show_report() {
    let mut switch = SnmpSwitch::new(lab_switch().build());
    let output = execute(&mut switch, HOST, &Command::Show, false).await.unwrap();

    assert!(output.starts_with("Interfaces\n==========\n1 mgmt0 "));
    assert!(output.contains("111 ge-0/0/10 uplink ethernet admin:up op:up port:11\n"));
    assert!(output.contains("101 sales\negress ports: 11 12\naccess ports: 11\n"));
    assert!(output.contains("11 <==> node-a      eth0 [001b210a0b0c] Debian GNU/Linux 12\n"));
}

#[tokio::test]
async fn test_vlan_list() {
    let mut switch = SnmpSwitch::new(lab_switch().build());
    let command = Command::Vlan {
        action: VlanCommand::List,
    };

    let output = execute(&mut switch, HOST, &command, false).await.unwrap();
    assert_eq!(output, "1 default\n101 sales\n2003 control");
}

#[tokio::test]
async fn test_mutations_print_nothing() {
    let mut switch = SnmpSwitch::new(lab_switch().build());

    let create = Command::Vlan {
        action: VlanCommand::Create { vlan: 300 },
    };
    assert_eq!(execute(&mut switch, HOST, &create, false).await.unwrap(), "");

    let access = Command::Port {
        action: PortCommand::Access {
            vlan: 300,
            ports: vec![4],
        },
    };
    assert_eq!(execute(&mut switch, HOST, &access, false).await.unwrap(), "");

    let vlans = switch.vlans().await.unwrap();
    assert_access_member(find_vlan(&vlans, 300).unwrap(), 4, true).unwrap();
}

#[tokio::test]
async fn test_failure_carries_context() {
    let mut switch = SnmpSwitch::new(lab_switch().build());
    let command = Command::Vlan {
        action: VlanCommand::Create { vlan: 101 },
    };

    let err = execute(&mut switch, HOST, &command, false).await.unwrap_err();
    assert_eq!(err.to_string(), "creating VLAN 101");
    match err.downcast_ref::<SwitchError>() {
        Some(SwitchError::Device { status, .. }) => {
            assert_eq!(*status, DeviceStatus::InconsistentValue)
        }
        other => panic!("Expected Device error, got {:?}", other),
    }
}
