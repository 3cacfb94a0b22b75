//! Configuration mapper.
//!
//! Turns the loosely typed property bag of a node or link into a typed
//! configuration struct once, at this boundary, and from there into an
//! ordered `ParameterSet`. Mapping never fails: malformed or missing fields
//! fall back to documented defaults, and fields equal to their default are
//! left out of the parameter set.

pub mod docker;
pub mod five_g;
pub mod link;
pub mod nodes;
pub mod params;
pub mod post_config;
pub mod radio;

pub use docker::DockerProfile;
pub use five_g::{CoreConfig, CoreFunction, GnbConfig, UeConfig};
pub use link::LinkConfig;
pub use nodes::{ControllerConfig, DockerHostConfig, HostConfig, SwitchConfig};
pub use params::{Param, ParamValue, ParameterSet};
pub use post_config::{post_config_actions, PostConfigAction};
pub use radio::{AccessPointConfig, StationConfig};

use crate::properties::Properties;
use crate::topology::ComponentType;

/// Typed configuration of one node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeConfig {
    Host(HostConfig),
    Station(StationConfig),
    UserEquipment(UeConfig),
    BaseStation(GnbConfig),
    DockerHost(DockerHostConfig),
    AccessPoint(AccessPointConfig),
    CoreNetwork(CoreConfig),
    Switch(SwitchConfig),
    Controller(ControllerConfig),
}

impl NodeConfig {
    pub fn from_properties(kind: ComponentType, props: &Properties) -> Self {
        match kind {
            ComponentType::Host => NodeConfig::Host(HostConfig::from_properties(props, "Host")),
            ComponentType::Station => NodeConfig::Station(StationConfig::from_properties(props)),
            ComponentType::UserEquipment => NodeConfig::UserEquipment(UeConfig::from_properties(props)),
            ComponentType::BaseStation => NodeConfig::BaseStation(GnbConfig::from_properties(props)),
            ComponentType::DockerHost => NodeConfig::DockerHost(DockerHostConfig::from_properties(props)),
            ComponentType::AccessPoint => NodeConfig::AccessPoint(AccessPointConfig::from_properties(props)),
            ComponentType::CoreNetwork => NodeConfig::CoreNetwork(CoreConfig::from_properties(props)),
            ComponentType::Switch => NodeConfig::Switch(SwitchConfig::from_properties(props, "Switch")),
            ComponentType::Router => NodeConfig::Switch(SwitchConfig::from_properties(props, "Router")),
            ComponentType::Controller => NodeConfig::Controller(ControllerConfig::from_properties(props)),
        }
    }

    pub fn parameters(&self) -> ParameterSet {
        match self {
            NodeConfig::Host(c) => c.parameters(),
            NodeConfig::Station(c) => c.parameters(),
            NodeConfig::UserEquipment(c) => c.parameters(),
            NodeConfig::BaseStation(c) => c.parameters(),
            NodeConfig::DockerHost(c) => c.parameters(),
            NodeConfig::AccessPoint(c) => c.parameters(),
            NodeConfig::CoreNetwork(c) => c.parameters(),
            NodeConfig::Switch(c) => c.parameters(),
            NodeConfig::Controller(c) => c.parameters(),
        }
    }

    /// Resolved transmit power for radio nodes.
    pub fn txpower(&self) -> Option<f64> {
        match self {
            NodeConfig::Station(c) => Some(c.txpower),
            NodeConfig::UserEquipment(c) => Some(c.txpower),
            NodeConfig::BaseStation(c) => Some(c.txpower),
            NodeConfig::AccessPoint(c) => Some(c.txpower),
            _ => None,
        }
    }

    /// Core network function, for VGcore nodes.
    pub fn core_function(&self) -> Option<CoreFunction> {
        match self {
            NodeConfig::CoreNetwork(c) => Some(c.function),
            _ => None,
        }
    }
}

/// Emulator parameters for a node of type `kind`.
pub fn map_config(kind: ComponentType, props: &Properties) -> ParameterSet {
    NodeConfig::from_properties(kind, props).parameters()
}

/// Emulator parameters for a link.
pub fn map_link(props: &Properties) -> ParameterSet {
    LinkConfig::from_properties(props).parameters()
}
