//! Command line interface.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use std::time::Duration;

use switchctl_common::{
    defaults, validate_vlan_id, SessionConfig, SwitchControl, VlanCreation,
};

use crate::render::{self, Inventory, CONTROL_VLAN};

/// Control VLANs and ports and list LLDP neighbors on Q-BRIDGE-MIB switches
#[derive(Parser, Debug)]
#[command(name = "switchctl")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Switch address, optionally with a UDP port (10.47.1.5, switch1:1161)
    pub host: String,

    /// SNMPv2c read/write community
    #[arg(short, long, env = "SWITCHCTL_COMMUNITY", default_value = defaults::COMMUNITY)]
    pub community: String,

    /// Per-request timeout in seconds
    #[arg(short, long, env = "SWITCHCTL_TIMEOUT", default_value_t = defaults::TIMEOUT.as_secs())]
    pub timeout: u64,

    /// GETBULK max-repetitions used for table walks
    #[arg(long, default_value_t = defaults::MAX_REPETITIONS)]
    pub max_repetitions: u32,

    /// Let the agent create unknown VLANs on first PortList write instead of
    /// creating the row explicitly
    #[arg(long)]
    pub implicit_vlan_create: bool,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    /// Session settings derived from the flags.
    pub fn session_config(&self) -> SessionConfig {
        let vlan_creation = if self.implicit_vlan_create {
            VlanCreation::ImplicitOnWrite
        } else {
            VlanCreation::Explicit
        };
        SessionConfig::default()
            .with_community(self.community.clone())
            .with_timeout(Duration::from_secs(self.timeout))
            .with_max_repetitions(self.max_repetitions)
            .with_vlan_creation(vlan_creation)
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show interfaces, VLANs and LLDP neighbors
    Show,

    /// Manage VLANs
    Vlan {
        #[command(subcommand)]
        action: VlanCommand,
    },

    /// Change port VLAN membership
    Port {
        #[command(subcommand)]
        action: PortCommand,
    },

    /// Export LLDP neighbors as switchmac CSV
    Neighbors {
        /// Class written in the last CSV field
        #[arg(long, default_value = "control")]
        class: String,

        /// VLAN written in the third CSV field
        #[arg(long, default_value_t = CONTROL_VLAN, value_parser = parse_vlan)]
        vlan: u16,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum VlanCommand {
    /// List VLAN IDs and names
    List,

    /// Create a VLAN
    Create {
        #[arg(value_parser = parse_vlan)]
        vlan: u16,
    },

    /// Delete a VLAN
    Delete {
        #[arg(value_parser = parse_vlan)]
        vlan: u16,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PortCommand {
    /// Make ports untagged members of a VLAN
    Access {
        #[arg(value_parser = parse_vlan)]
        vlan: u16,

        /// Bridge port numbers
        #[arg(required = true, value_parser = parse_port)]
        ports: Vec<u32>,
    },

    /// Make ports tagged members of one or more VLANs
    Trunk {
        /// VLAN IDs, comma separated or repeated
        #[arg(long = "vlan", required = true, value_delimiter = ',', value_parser = parse_vlan)]
        vlans: Vec<u16>,

        /// Bridge port numbers
        #[arg(required = true, value_parser = parse_port)]
        ports: Vec<u32>,
    },

    /// Remove ports from every VLAN
    Clear {
        /// Bridge port numbers
        #[arg(required = true, value_parser = parse_port)]
        ports: Vec<u32>,
    },
}

fn parse_vlan(s: &str) -> Result<u16, String> {
    let vlan: u16 = s
        .parse()
        .map_err(|_| format!("'{}' is not a VLAN number", s))?;
    validate_vlan_id(vlan).map_err(|e| e.to_string())
}

fn parse_port(s: &str) -> Result<u32, String> {
    match s.parse::<u32>() {
        Ok(0) => Err("ports are numbered from 1".to_string()),
        Ok(port) => Ok(port),
        Err(_) => Err(format!("'{}' is not a port number", s)),
    }
}

/// Runs `command` against `switch` and returns what should be printed.
pub async fn execute<C>(switch: &mut C, host: &str, command: &Command, json: bool) -> Result<String>
where
    C: SwitchControl + ?Sized,
{
    let output = match command {
        Command::Show => {
            let interfaces = switch.interfaces().await.context("reading interfaces")?;
            let vlans = switch.vlans().await.context("reading VLANs")?;
            let neighbors = switch.neighbors().await.context("reading LLDP neighbors")?;
            let inventory = Inventory::new(interfaces, vlans, neighbors);
            if json {
                serde_json::to_string_pretty(&inventory)?
            } else {
                render::show(&inventory)
            }
        }

        Command::Vlan { action } => match action {
            VlanCommand::List => {
                let vlans = switch.vlans().await.context("reading VLANs")?;
                if json {
                    serde_json::to_string_pretty(&vlans)?
                } else {
                    render::vlan_list(&vlans)
                }
            }
            VlanCommand::Create { vlan } => {
                switch
                    .create_vlan(*vlan)
                    .await
                    .with_context(|| format!("creating VLAN {}", vlan))?;
                String::new()
            }
            VlanCommand::Delete { vlan } => {
                switch
                    .delete_vlan(*vlan)
                    .await
                    .with_context(|| format!("deleting VLAN {}", vlan))?;
                String::new()
            }
        },

        Command::Port { action } => {
            match action {
                PortCommand::Access { vlan, ports } => switch
                    .set_port_access(ports, *vlan)
                    .await
                    .context("setting port access failed")?,
                PortCommand::Trunk { vlans, ports } => switch
                    .set_port_trunk(ports, vlans)
                    .await
                    .context("setting port trunk failed")?,
                PortCommand::Clear { ports } => switch
                    .clear_ports(ports)
                    .await
                    .context("clearing ports failed")?,
            }
            String::new()
        }

        Command::Neighbors { class, vlan } => {
            let neighbors = switch.neighbors().await.context("reading LLDP neighbors")?;
            if json {
                serde_json::to_string_pretty(&neighbors.into_values().collect::<Vec<_>>())?
            } else {
                neighbors
                    .values()
                    .map(|n| render::switchmac_line(n, host, *vlan, class))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("switchctl").chain(argv.iter().copied()))
    }

    #[test]
    fn test_parse_show() {
        let args = parse(&["10.47.1.5", "show"]).unwrap();
        assert_eq!(args.host, "10.47.1.5");
        assert_eq!(args.command, Command::Show);
        assert!(!args.json);
    }

    #[test]
    fn test_parse_port_access() {
        let args = parse(&["10.47.1.5", "port", "access", "47", "2", "4", "6", "8"]).unwrap();
        assert_eq!(
            args.command,
            Command::Port {
                action: PortCommand::Access {
                    vlan: 47,
                    ports: vec![2, 4, 6, 8]
                }
            }
        );
    }

    #[test]
    fn test_parse_port_trunk() {
        let args = parse(&[
            "10.47.1.5", "port", "trunk", "--vlan", "101,201", "--vlan", "303", "1", "3",
        ])
        .unwrap();
        assert_eq!(
            args.command,
            Command::Port {
                action: PortCommand::Trunk {
                    vlans: vec![101, 201, 303],
                    ports: vec![1, 3]
                }
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_numbers() {
        assert!(parse(&["h", "vlan", "create", "abc"]).is_err());
        assert!(parse(&["h", "vlan", "create", "0"]).is_err());
        assert!(parse(&["h", "vlan", "create", "4095"]).is_err());
        assert!(parse(&["h", "port", "clear", "0"]).is_err());
        assert!(parse(&["h", "port", "clear", "x"]).is_err());
        assert!(parse(&["h", "port", "clear"]).is_err());
    }

    #[test]
    fn test_neighbors_defaults() {
        let args = parse(&["10.47.1.5", "neighbors"]).unwrap();
        assert_eq!(
            args.command,
            Command::Neighbors {
                class: "control".to_string(),
                vlan: 2003
            }
        );
    }

    #[test]
    fn test_session_config_from_flags() {
        let args = parse(&[
            "-c", "private", "-t", "2", "--implicit-vlan-create", "10.47.1.5", "show",
        ])
        .unwrap();
        let config = args.session_config();
        assert_eq!(config.community, "private");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.vlan_creation, VlanCreation::ImplicitOnWrite);
    }
}
