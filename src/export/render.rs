//! Text renderers for a [`TopologyDescription`].

use super::types::{NetworkKind, Statement, TopologyDescription};
use crate::mapper::{ParamValue, ParameterSet};

const INDENT: &str = "    ";

/// Python literal for a parameter value.
pub fn python_value(value: &ParamValue) -> String {
    match value {
        ParamValue::Str(s) => python_string(s),
        ParamValue::Int(i) => i.to_string(),
        ParamValue::Float(f) => python_float(*f),
        ParamValue::Bool(true) => "True".to_string(),
        ParamValue::Bool(false) => "False".to_string(),
        ParamValue::List(items) => {
            let items: Vec<String> = items.iter().map(|i| python_string(i)).collect();
            format!("[{}]", items.join(", "))
        }
        ParamValue::Env(pairs) => {
            let pairs: Vec<String> = pairs
                .iter()
                .map(|(k, v)| format!("{}: {}", python_string(k), python_string(v)))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
        ParamValue::Symbol(s) => s.clone(),
    }
}

/// Single-quoted Python string literal.
pub fn python_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Whole numbers render without a fractional part (`txpower=20`).
fn python_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else if value.is_finite() {
        value.to_string()
    } else {
        "float('nan')".to_string()
    }
}

fn keyword_args(params: &ParameterSet) -> Vec<String> {
    params
        .iter()
        .map(|p| format!("{}={}", p.name, python_value(&p.value)))
        .collect()
}

fn call_args(mut positional: Vec<String>, params: &ParameterSet) -> String {
    positional.extend(keyword_args(params));
    positional.join(", ")
}

fn imports(kind: NetworkKind) -> Vec<&'static str> {
    let mut lines = vec![
        "import sys",
        "",
        "from mininet.net import Mininet",
        "from mininet.node import RemoteController, OVSKernelSwitch, Host, Node",
        "from mininet.link import TCLink",
        "from mininet.log import setLogLevel, info",
    ];
    match kind {
        NetworkKind::Containernet => lines.extend([
            "from mininet.node import Docker",
            "from mn_wifi.node import Station, OVSKernelAP",
            "from mn_wifi.link import wmediumd",
            "from mn_wifi.wmediumdConnector import interference",
            "from containernet.net import Containernet",
            "from containernet.cli import CLI",
            "from containernet.node import DockerSta",
        ]),
        NetworkKind::Mininet => lines.push("from mininet.cli import CLI"),
    }
    lines
}

fn statement_line(statement: &Statement) -> String {
    match statement {
        Statement::Comment { text } => format!("# {}", text.replace(['\r', '\n'], " ")),
        Statement::AddNode { ident, method, name, params } => format!(
            "{} = net.{}({})",
            ident,
            method.as_str(),
            call_args(vec![python_string(name)], params)
        ),
        Statement::AddLink { source, destination, params } => format!(
            "net.addLink({})",
            call_args(vec![source.clone(), destination.clone()], params)
        ),
        Statement::NetCall { method, params } => format!("net.{}({})", method, call_args(Vec::new(), params)),
        Statement::StartNode { ident, controllers } => format!("{}.start([{}])", ident, controllers.join(", ")),
        Statement::StartController { ident } => format!("{}.start()", ident),
        Statement::NodeCommand { ident, command } => format!("{}.cmd({})", ident, python_string(command)),
        Statement::Sleep { seconds } => format!("CLI.do_sh(net, 'sleep {}')", python_float(*seconds)),
        Statement::Cli => "CLI(net)".to_string(),
    }
}

/// Render an executable Mininet-WiFi / Containernet script.
pub fn render_python(description: &TopologyDescription) -> String {
    let mut out = String::new();
    out.push_str("#!/usr/bin/env python\n");
    for line in &description.header {
        out.push_str(&format!("# {}\n", line));
    }
    out.push('\n');
    for line in imports(description.network.kind) {
        out.push_str(line);
        out.push('\n');
    }

    out.push_str("\n\ndef topology(args):\n");
    let network = &description.network;
    let class = match network.kind {
        NetworkKind::Containernet => {
            out.push_str(&format!(
                "{}NETWORK_MODE = {}\n",
                INDENT,
                python_string(&network.network_mode)
            ));
            "Containernet"
        }
        NetworkKind::Mininet => "Mininet",
    };
    out.push_str(&format!(
        "{}net = {}({})\n",
        INDENT,
        class,
        call_args(Vec::new(), &network.parameters())
    ));

    for section in &description.sections {
        out.push('\n');
        out.push_str(&format!("{}info(\"*** {}\\n\")\n", INDENT, section.title));
        for statement in &section.statements {
            out.push_str(INDENT);
            out.push_str(&statement_line(statement));
            out.push('\n');
        }
    }

    out.push_str("\n\nif __name__ == '__main__':\n");
    out.push_str(&format!("{}setLogLevel('info')\n", INDENT));
    out.push_str(&format!("{}topology(sys.argv)\n", INDENT));
    out
}

pub fn render_yaml(description: &TopologyDescription) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(description)
}

pub fn render_json(description: &TopologyDescription) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(description)
}
