//! Structured form of a generated topology script.
//!
//! The engine builds a [`TopologyDescription`]; renderers turn it into text.
//! Keeping the statements structured lets the same description be written
//! as a Python script or dumped as YAML/JSON for inspection.

use crate::mapper::{ParamValue, ParameterSet};
use serde::Serialize;

/// What a construction statement creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeMethod {
    AddController,
    AddAccessPoint,
    AddStation,
    AddHost,
    AddSwitch,
    AddDocker,
}

impl NodeMethod {
    /// Method name on the emulator's network object.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeMethod::AddController => "addController",
            NodeMethod::AddAccessPoint => "addAccessPoint",
            NodeMethod::AddStation => "addStation",
            NodeMethod::AddHost => "addHost",
            NodeMethod::AddSwitch => "addSwitch",
            NodeMethod::AddDocker => "addDocker",
        }
    }
}

/// Which emulator class the network object is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NetworkKind {
    /// Plain wired emulation.
    Mininet,
    /// Containers plus wireless medium emulation.
    Containernet,
}

/// One line (or short block) of the generated script.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "statement", rename_all = "snake_case")]
pub enum Statement {
    Comment {
        text: String,
    },
    /// `ident = net.<method>('<name>', params...)`
    AddNode {
        ident: String,
        method: NodeMethod,
        name: String,
        params: ParameterSet,
    },
    /// `net.addLink(source, destination, params...)`
    AddLink {
        source: String,
        destination: String,
        params: ParameterSet,
    },
    /// `net.<method>(params...)` with no result kept.
    NetCall {
        method: String,
        params: ParameterSet,
    },
    /// `<node>.start([<controllers>])`
    StartNode {
        ident: String,
        controllers: Vec<String>,
    },
    /// `<controller>.start()`
    StartController {
        ident: String,
    },
    /// `<node>.cmd('<command>')`
    NodeCommand {
        ident: String,
        command: String,
    },
    /// `CLI.do_sh(net, 'sleep <seconds>')`
    Sleep {
        seconds: f64,
    },
    /// Interactive emulator prompt.
    Cli,
}

impl Statement {
    pub fn comment(text: impl Into<String>) -> Self {
        Statement::Comment { text: text.into() }
    }

    pub fn net_call(method: &str) -> Self {
        Statement::NetCall {
            method: method.to_string(),
            params: ParameterSet::new(),
        }
    }

    pub fn net_call_with(method: &str, params: ParameterSet) -> Self {
        Statement::NetCall {
            method: method.to_string(),
            params,
        }
    }
}

/// A titled group of statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: String,
    pub statements: Vec<Statement>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            statements: Vec::new(),
        }
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Network object construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkInit {
    pub kind: NetworkKind,
    /// Docker network shared by the 5G containers.
    pub network_mode: String,
    pub ip_base: String,
    /// Wireless medium emulation (`wmediumd` in interference mode).
    pub wireless_medium: bool,
}

impl NetworkInit {
    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set("topo", ParamValue::symbol("None"));
        params.set("build", ParamValue::Bool(false));
        if self.wireless_medium {
            params.set("link", ParamValue::symbol("wmediumd"));
            params.set("wmediumd_mode", ParamValue::symbol("interference"));
        }
        params.set("ipBase", ParamValue::str(self.ip_base.clone()));
        params
    }
}

/// Complete description of a topology ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopologyDescription {
    pub header: Vec<String>,
    pub network: NetworkInit,
    pub sections: Vec<Section>,
}

impl TopologyDescription {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.sections.iter().flat_map(|s| s.statements.iter())
    }

    /// Display names of constructed nodes, in emission order.
    pub fn node_names(&self) -> Vec<&str> {
        self.statements()
            .filter_map(|s| match s {
                Statement::AddNode { method, name, .. } if *method != NodeMethod::AddController => {
                    Some(name.as_str())
                }
                _ => None,
            })
            .collect()
    }

    /// Parameters of the node constructed as `name`.
    pub fn node_params(&self, name: &str) -> Option<&ParameterSet> {
        self.statements().find_map(|s| match s {
            Statement::AddNode { name: n, params, .. } if n == name => Some(params),
            _ => None,
        })
    }
}
