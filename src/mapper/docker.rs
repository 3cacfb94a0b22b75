//! Fixed container settings for container-backed node types.

use super::five_g::CoreFunction;
use super::params::{ParamValue, ParameterSet};
use crate::topology::ComponentType;

pub const UERANSIM_IMAGE: &str = "adaptive/ueransim:latest";
pub const OPEN5GS_IMAGE: &str = "adaptive/open5gs:latest";
pub const DOCKER_HOST_IMAGE: &str = "ubuntu:trusty";

/// Name of the Docker network variable in generated scripts.
pub const NETWORK_MODE_VAR: &str = "NETWORK_MODE";

#[derive(Debug, Clone, PartialEq)]
pub struct DockerProfile {
    pub class: &'static str,
    pub image: &'static str,
    pub command: Option<&'static str>,
    pub cap_add: Vec<&'static str>,
    pub devices: Vec<&'static str>,
    pub privileged: bool,
    pub publish_all_ports: bool,
    /// Attach to the shared Docker network.
    pub shared_network: bool,
}

impl DockerProfile {
    fn five_g(image: &'static str) -> Self {
        Self {
            class: "DockerSta",
            image,
            command: Some("/bin/bash"),
            cap_add: vec!["net_admin"],
            devices: Vec::new(),
            privileged: false,
            publish_all_ports: false,
            shared_network: true,
        }
    }

    /// Container settings for `kind`, or `None` for non-container types.
    /// `function` picks the core network function for VGcore nodes.
    pub fn for_component(kind: ComponentType, function: Option<CoreFunction>) -> Option<Self> {
        let profile = match kind {
            ComponentType::UserEquipment => Self {
                devices: vec!["/dev/net/tun"],
                ..Self::five_g(UERANSIM_IMAGE)
            },
            ComponentType::BaseStation => Self {
                privileged: true,
                publish_all_ports: true,
                ..Self::five_g(UERANSIM_IMAGE)
            },
            ComponentType::CoreNetwork => Self {
                privileged: function == Some(CoreFunction::Upf),
                publish_all_ports: true,
                ..Self::five_g(OPEN5GS_IMAGE)
            },
            ComponentType::DockerHost => Self {
                class: "Docker",
                image: DOCKER_HOST_IMAGE,
                command: None,
                cap_add: Vec::new(),
                devices: Vec::new(),
                privileged: false,
                publish_all_ports: false,
                shared_network: false,
            },
            _ => return None,
        };
        Some(profile)
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set("cls", ParamValue::symbol(self.class));
        params.set("dimage", ParamValue::str(self.image));
        if let Some(command) = self.command {
            params.set("dcmd", ParamValue::str(command));
        }
        if !self.devices.is_empty() {
            params.set("devices", list(&self.devices));
        }
        if !self.cap_add.is_empty() {
            params.set("cap_add", list(&self.cap_add));
        }
        if self.shared_network {
            params.set("network_mode", ParamValue::symbol(NETWORK_MODE_VAR));
        }
        if self.publish_all_ports {
            params.set("publish_all_ports", ParamValue::Bool(true));
        }
        if self.privileged {
            params.set("privileged", ParamValue::Bool(true));
        }
        params
    }
}

fn list(values: &[&str]) -> ParamValue {
    ParamValue::List(values.iter().map(|v| v.to_string()).collect())
}
