//! Topology type definitions.
//!
//! Component kinds, stable identifiers and positions shared by the graph,
//! the identity registry, the mapper and the exporter.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of network device placed on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentType {
    Host,
    #[serde(rename = "STA")]
    Station,
    #[serde(rename = "UE")]
    UserEquipment,
    #[serde(rename = "GNB")]
    BaseStation,
    DockerHost,
    #[serde(rename = "AP")]
    AccessPoint,
    #[serde(rename = "VGcore")]
    CoreNetwork,
    Router,
    Switch,
    Controller,
}

impl ComponentType {
    pub const ALL: [ComponentType; 10] = [
        ComponentType::Host,
        ComponentType::Station,
        ComponentType::UserEquipment,
        ComponentType::BaseStation,
        ComponentType::DockerHost,
        ComponentType::AccessPoint,
        ComponentType::CoreNetwork,
        ComponentType::Router,
        ComponentType::Switch,
        ComponentType::Controller,
    ];

    /// Prefix used for display names (`UE3`, `GNB1`, ...). Also the name the
    /// editor stores in saved documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Host => "Host",
            ComponentType::Station => "STA",
            ComponentType::UserEquipment => "UE",
            ComponentType::BaseStation => "GNB",
            ComponentType::DockerHost => "DockerHost",
            ComponentType::AccessPoint => "AP",
            ComponentType::CoreNetwork => "VGcore",
            ComponentType::Router => "Router",
            ComponentType::Switch => "Switch",
            ComponentType::Controller => "Controller",
        }
    }

    /// Radio-capable types get a transmit power and a coverage range.
    pub fn is_radio(&self) -> bool {
        matches!(
            self,
            ComponentType::AccessPoint
                | ComponentType::Station
                | ComponentType::UserEquipment
                | ComponentType::BaseStation
        )
    }

    /// Types the emulator runs as Docker containers.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ComponentType::UserEquipment
                | ComponentType::BaseStation
                | ComponentType::CoreNetwork
                | ComponentType::DockerHost
        )
    }

    /// Position of this type's group in exported output.
    pub fn export_rank(&self) -> u8 {
        match self {
            ComponentType::Controller => 0,
            ComponentType::AccessPoint => 1,
            ComponentType::Station => 2,
            ComponentType::Host => 3,
            ComponentType::Switch => 4,
            ComponentType::Router => 5,
            ComponentType::CoreNetwork => 6,
            ComponentType::BaseStation => 7,
            ComponentType::UserEquipment => 8,
            ComponentType::DockerHost => 9,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown component type name in a document or CLI argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown component type: {0}")]
pub struct UnknownComponentType(pub String);

impl FromStr for ComponentType {
    type Err = UnknownComponentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim() {
            "Host" | "host" => ComponentType::Host,
            "STA" | "sta" | "Station" | "station" => ComponentType::Station,
            "UE" | "ue" => ComponentType::UserEquipment,
            "GNB" | "gnb" | "gNB" => ComponentType::BaseStation,
            "DockerHost" | "dockerhost" | "docker_host" => ComponentType::DockerHost,
            "AP" | "ap" => ComponentType::AccessPoint,
            "VGcore" | "VGCore" | "vgcore" => ComponentType::CoreNetwork,
            "Router" | "router" => ComponentType::Router,
            "Switch" | "switch" => ComponentType::Switch,
            "Controller" | "controller" => ComponentType::Controller,
            other => return Err(UnknownComponentType(other.to_string())),
        };
        Ok(kind)
    }
}

/// Process-unique node identifier. Never reused, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// Process-unique link identifier. Ids grow monotonically, so ordering by id
/// is creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link#{}", self.0)
    }
}

/// Canvas coordinate. One canvas unit is treated as one metre by the
/// coverage computations.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn offset(&self, dx: f64, dy: f64) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_type_round_trip_names() {
        for kind in ComponentType::ALL {
            assert_eq!(kind.as_str().parse::<ComponentType>(), Ok(kind));
        }
        assert!("Satellite".parse::<ComponentType>().is_err());
    }

    #[test]
    fn test_serde_names_match_prefixes() {
        for kind in ComponentType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_radio_and_container_sets() {
        let radio: Vec<_> = ComponentType::ALL.iter().filter(|k| k.is_radio()).collect();
        assert_eq!(radio.len(), 4);
        assert!(ComponentType::CoreNetwork.is_container());
        assert!(!ComponentType::Switch.is_container());
    }

    #[test]
    fn test_export_ranks_are_distinct() {
        let mut ranks: Vec<u8> = ComponentType::ALL.iter().map(|k| k.export_rank()).collect();
        ranks.sort();
        ranks.dedup();
        assert_eq!(ranks.len(), ComponentType::ALL.len());
        assert!(ComponentType::Host.export_rank() < ComponentType::UserEquipment.export_rank());
    }
}
