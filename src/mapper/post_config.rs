//! Follow-up actions that run once the emulated network is up.

use super::five_g::{CoreConfig, UeConfig};
use crate::properties::Properties;
use crate::topology::ComponentType;
use serde::Serialize;

/// One post-start action for a node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum PostConfigAction {
    /// Shell command run inside the node.
    Command(String),
    /// Informational line in the generated script.
    Comment(String),
}

/// Route a UE installs for its APN's data network.
pub fn apn_route(apn: &str) -> Option<&'static str> {
    match apn {
        "internet" => Some("10.100.0.0/16"),
        "internet2" => Some("10.200.0.0/16"),
        "web1" => Some("10.51.0.0/16"),
        "web2" => Some("10.52.0.0/16"),
        _ => None,
    }
}

/// Actions for a node, in the order they should run. `ident` is the
/// node's script identifier, used for log file names.
pub fn post_config_actions(kind: ComponentType, ident: &str, props: &Properties) -> Vec<PostConfigAction> {
    let prefix = kind.as_str();
    let mut actions = Vec::new();

    let custom_start = props.text(&format!("{}_StartCommand", prefix));
    match (custom_start, default_start_command(kind, ident, props)) {
        (Some(command), _) => actions.push(PostConfigAction::Command(command)),
        (None, Some(command)) => actions.push(PostConfigAction::Command(command)),
        (None, None) => {}
    }

    if kind == ComponentType::UserEquipment {
        let ue = UeConfig::from_properties(props);
        match apn_route(&ue.apn) {
            Some(route) => actions.push(PostConfigAction::Command(format!(
                "ip route add {} dev {}",
                route, ue.tunnel_iface
            ))),
            None => actions.push(PostConfigAction::Comment(format!(
                "APN '{}' has no known data network route",
                ue.apn
            ))),
        }
    }

    if let Some(stop) = props.text(&format!("{}_StopCommand", prefix)) {
        actions.push(PostConfigAction::Comment(format!("stop command: {}", stop)));
    }

    match kind {
        ComponentType::Station => station_auth_comments(props, &mut actions),
        ComponentType::DockerHost => {
            if let Some(image) = props.first_text(&["DockerHost_ContainerImage", "DockerHost_Image"]) {
                actions.push(PostConfigAction::Comment(format!("container image: {}", image)));
            }
            if let Some(ports) = props.text("DockerHost_PortForward") {
                actions.push(PostConfigAction::Comment(format!("port forwarding: {}", ports)));
            }
        }
        _ => {}
    }

    actions
}

/// Wireless authentication notes for a station. `none` means open access.
fn station_auth_comments(props: &Properties, actions: &mut Vec<PostConfigAction>) {
    let password_set = props.first_text(&["STA_Password", "STA_Passwd"]).is_some();
    let auth = props
        .first_text(&["STA_AuthenticationType", "STA_Encrypt"])
        .filter(|a| !a.eq_ignore_ascii_case("none"));

    match auth {
        Some(auth) => {
            actions.push(PostConfigAction::Comment(format!("authentication type: {}", auth)));
            if let Some(username) = props.text("STA_Username") {
                actions.push(PostConfigAction::Comment(format!("username: {}", username)));
            }
            let wpa = auth.eq_ignore_ascii_case("wpa") || auth.eq_ignore_ascii_case("wpa2");
            if wpa && password_set {
                actions.push(PostConfigAction::Comment("WPA/WPA2 passphrase set".to_string()));
            }
        }
        None if password_set => {
            actions.push(PostConfigAction::Comment("authentication: passphrase set".to_string()));
        }
        None => {}
    }
}

fn default_start_command(kind: ComponentType, ident: &str, props: &Properties) -> Option<String> {
    match kind {
        ComponentType::CoreNetwork => {
            let core = CoreConfig::from_properties(props);
            Some(format!(
                "setsid nohup /opt/open5gs/etc/open5gs/entrypoint.sh {} 2>&1 | tee -a /logging/{}.log &",
                core.function.daemon(),
                ident
            ))
        }
        ComponentType::BaseStation => Some(format!(
            "setsid nohup /entrypoint.sh gnb 2>&1 | tee -a /logging/{}.log &",
            ident
        )),
        ComponentType::UserEquipment => Some(format!(
            "setsid nohup /entrypoint.sh ue 2>&1 | tee -a /logging/{}.log &",
            ident
        )),
        _ => None,
    }
}
