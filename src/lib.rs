//! # NetFlux5G - Topology core for 5G and WiFi network emulation
//!
//! This library holds the editing model behind the NetFlux5G topology
//! editor and the generator that turns a finished topology into a
//! Mininet-WiFi / Containernet script.
//!
//! ## Overview
//!
//! A topology is a graph of components (hosts, WiFi stations, UEs, gNBs,
//! access points, switches, routers, controllers, Docker hosts and 5G core
//! functions) joined by links. Every component gets a short per-type name
//! (`UE3`, `GNB1`) from an identity registry that reuses freed numbers, so
//! names stay low even after heavy editing.
//!
//! ## Architecture
//!
//! - `properties`: loosely typed property bags as entered in the editor
//! - `topology`: graph model, identity registry, cut/copy/paste and the
//!   saved document form
//! - `propagation`: transmit power to coverage range conversion
//! - `mapper`: property bags to typed configuration and emulator parameters
//! - `export`: ordered topology description and its renderers
//! - `config`: editor configuration structures
//! - `config_loader`: configuration and topology file loading
//! - `utils`: identifier naming and field validation
//!
//! ## Example Usage
//!
//! ```rust
//! use netflux5g::config::ExportSettings;
//! use netflux5g::export::{export, render_python};
//! use netflux5g::topology::{ComponentType, Position, TopologyGraph};
//!
//! let mut graph = TopologyGraph::new();
//! let gnb = graph.add_node(ComponentType::BaseStation, Position::new(0.0, 0.0));
//! let ue = graph.add_node(ComponentType::UserEquipment, Position::new(40.0, 0.0));
//! graph.add_link(gnb, ue)?;
//!
//! let description = export(&graph, &ExportSettings::default())?;
//! let script = render_python(&description);
//! assert!(script.contains("UE1 = net.addStation('UE1'"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Editing and export failures are typed (`GraphError`, `ExportError`,
//! `DocumentError`) and never leave the graph half modified. File helpers
//! and the binary use `color_eyre` for error reporting with context.

pub mod config;
pub mod config_loader;
pub mod export;
pub mod mapper;
pub mod propagation;
pub mod properties;
pub mod topology;
pub mod utils;
