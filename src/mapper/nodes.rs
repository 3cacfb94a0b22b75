//! Wired node configurations: hosts, switches, routers, controllers and
//! plain Docker hosts.

use super::params::{ParamValue, ParameterSet};
use crate::properties::Properties;
use crate::utils::validation::{is_valid_ipv4, is_valid_mac, parse_ipv4_cidr};

/// Address Mininet assigns to the first host anyway.
pub const DEFAULT_HOST_IP: &str = "10.0.0.1";
pub const DEFAULT_CONTROLLER_IP: &str = "127.0.0.1";
pub const DEFAULT_CONTROLLER_PORT: i64 = 6633;
pub const DEFAULT_CONTROLLER_CLASS: &str = "RemoteController";
pub const DEFAULT_SWITCH_PROTOCOLS: &str = "OpenFlow13";

/// Host-like settings shared by Host, STA and DockerHost.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostConfig {
    pub ip: Option<String>,
    pub default_route: Option<String>,
    pub cpu: Option<f64>,
    pub mem: Option<i64>,
    pub mac: Option<String>,
}

impl HostConfig {
    /// Read `<prefix>_IPAddress`, `<prefix>_DefaultRoute`, `<prefix>_AmountCPU`,
    /// `<prefix>_Memory` and `<prefix>_MACAddress`.
    pub fn from_properties(props: &Properties, prefix: &str) -> Self {
        let ip = props
            .text(&format!("{}_IPAddress", prefix))
            .filter(|ip| ip != DEFAULT_HOST_IP)
            .filter(|ip| {
                let ok = parse_ipv4_cidr(ip).is_some();
                if !ok {
                    log::warn!("Ignoring invalid {} IP address '{}'", prefix, ip);
                }
                ok
            });
        let mac = props
            .text(&format!("{}_MACAddress", prefix))
            .filter(|mac| is_valid_mac(mac));

        Self {
            ip,
            default_route: props.text(&format!("{}_DefaultRoute", prefix)),
            cpu: props
                .number(&format!("{}_AmountCPU", prefix))
                .filter(|cpu| *cpu > 0.0 && *cpu != 1.0),
            mem: props.integer(&format!("{}_Memory", prefix)).filter(|mem| *mem > 0),
            mac,
        }
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set_opt("ip", self.ip.clone().map(ParamValue::Str));
        params.set_opt(
            "defaultRoute",
            self.default_route.as_ref().map(|r| ParamValue::Str(format!("via {}", r))),
        );
        params.set_opt("cpu", self.cpu.map(ParamValue::Float));
        params.set_opt("mem", self.mem.map(ParamValue::Int));
        params.set_opt("mac", self.mac.clone().map(ParamValue::Str));
        params
    }
}

/// OpenFlow switch or router.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchConfig {
    pub dpid: Option<String>,
    pub protocols: String,
}

impl SwitchConfig {
    pub fn from_properties(props: &Properties, prefix: &str) -> Self {
        let protocols = props
            .text(&format!("{}_Protocol", prefix))
            .filter(|p| p != "OpenFlow")
            .unwrap_or_else(|| DEFAULT_SWITCH_PROTOCOLS.to_string());
        Self {
            dpid: props.text(&format!("{}_DPID", prefix)),
            protocols,
        }
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set("protocols", ParamValue::str(self.protocols.as_str()));
        params.set_opt("dpid", self.dpid.clone().map(ParamValue::Str));
        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    pub ip: Option<String>,
    pub port: Option<i64>,
    pub class: String,
}

impl ControllerConfig {
    pub fn from_properties(props: &Properties) -> Self {
        Self {
            ip: props
                .text("Controller_IPAddress")
                .filter(|ip| ip != DEFAULT_CONTROLLER_IP && is_valid_ipv4(ip)),
            port: props
                .integer("Controller_Port")
                .filter(|port| *port > 0 && *port <= 65535 && *port != DEFAULT_CONTROLLER_PORT),
            class: props.text_or("Controller_Type", DEFAULT_CONTROLLER_CLASS),
        }
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set("controller", ParamValue::symbol(self.class.as_str()));
        params.set_opt("ip", self.ip.clone().map(ParamValue::Str));
        params.set_opt("port", self.port.map(ParamValue::Int));
        params
    }
}

/// Generic container host. Image defaults come from the Docker profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DockerHostConfig {
    pub host: HostConfig,
    pub image: Option<String>,
    pub command: Option<String>,
    pub ports: Option<String>,
    pub volumes: Option<String>,
}

impl DockerHostConfig {
    pub fn from_properties(props: &Properties) -> Self {
        Self {
            host: HostConfig::from_properties(props, "DockerHost"),
            image: props.first_text(&["DockerHost_ContainerImage", "DockerHost_Image"]),
            command: props.first_text(&["DockerHost_Command", "DockerHost_Cmd"]),
            ports: props.text("DockerHost_PortForward"),
            volumes: props.text("DockerHost_VolumeMapping"),
        }
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set_opt("dimage", self.image.clone().map(ParamValue::Str));
        params.set_opt("dcmd", self.command.clone().map(ParamValue::Str));
        params.set_opt("ports", self.ports.as_deref().map(split_list));
        params.set_opt("volumes", self.volumes.as_deref().map(split_list));
        params.extend(self.host.parameters());
        params
    }
}

/// Comma separated field to a list value.
fn split_list(value: &str) -> ParamValue {
    ParamValue::List(
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    )
}
