//! 5G components: UERANSIM user equipment and gNBs, and Open5GS core
//! network functions.
//!
//! Everything here ends up in a container environment, so values are kept
//! as strings exactly as the container entrypoints expect them.

use super::params::{ParamValue, ParameterSet};
use crate::propagation;
use crate::properties::Properties;
use crate::topology::ComponentType;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_MCC: &str = "999";
pub const DEFAULT_MNC: &str = "70";
pub const DEFAULT_SST: &str = "1";
pub const DEFAULT_SD: &str = "0xffffff";
pub const DEFAULT_TAC: &str = "1";
pub const DEFAULT_DB_URI: &str = "mongodb://mongo/open5gs";

type Env = Vec<(String, String)>;

fn push(env: &mut Env, key: &str, value: impl Into<String>) {
    env.push((key.to_string(), value.into()));
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// PLMN and slice identifiers shared by every 5G component.
#[derive(Debug, Clone, PartialEq)]
pub struct Plmn {
    pub mcc: String,
    pub mnc: String,
    pub sst: String,
    pub sd: String,
    pub tac: String,
}

impl Plmn {
    fn from_properties(props: &Properties, prefix: &str) -> Self {
        let field = |name: &str, default: &str| props.text_or(&format!("{}_{}", prefix, name), default);
        Self {
            mcc: field("MCC", DEFAULT_MCC),
            mnc: field("MNC", DEFAULT_MNC),
            sst: field("SST", DEFAULT_SST),
            sd: field("SD", DEFAULT_SD),
            tac: field("TAC", DEFAULT_TAC),
        }
    }
}

/// Open vSwitch bridge settings for gNB and core containers.
#[derive(Debug, Clone, PartialEq)]
pub struct OvsSettings {
    pub bridge_name: String,
    pub fail_mode: String,
    pub protocols: String,
    pub datapath: String,
    pub bridge_priority: String,
    pub stp_enabled: bool,
    pub controller: Option<String>,
    pub controller_port: Option<String>,
}

impl OvsSettings {
    fn append_env(&self, env: &mut Env) {
        push(env, "OVS_ENABLED", "true");
        push(env, "OVS_BRIDGE_NAME", self.bridge_name.as_str());
        push(env, "OVS_FAIL_MODE", self.fail_mode.as_str());
        push(env, "OPENFLOW_PROTOCOLS", self.protocols.as_str());
        push(env, "OVS_DATAPATH", self.datapath.as_str());
        push(env, "BRIDGE_PRIORITY", self.bridge_priority.as_str());
        push(env, "STP_ENABLED", bool_str(self.stp_enabled));
        if let Some(controller) = &self.controller {
            push(env, "OVS_CONTROLLER", controller.as_str());
        }
        if let Some(port) = &self.controller_port {
            push(env, "CONTROLLER_PORT", port.as_str());
        }
    }
}

// ----------------------------------------------------------------------
// UE
// ----------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct UeConfig {
    pub gnb_hostname: String,
    pub gnb_ip: Option<String>,
    pub apn: String,
    pub msisdn: String,
    pub plmn: Plmn,
    pub key: String,
    pub op_type: String,
    pub op: String,
    pub imei: String,
    pub imeisv: String,
    pub tunnel_iface: String,
    pub radio_iface: String,
    pub session_type: String,
    pub pdu_sessions: i64,
    pub mobility: bool,
    pub txpower: f64,
}

impl UeConfig {
    pub fn from_properties(props: &Properties) -> Self {
        Self {
            gnb_hostname: props.text_or("UE_GNBHostName", "gnb"),
            gnb_ip: props.text("UE_GNB_IP"),
            apn: props.text_or("UE_APN", "internet"),
            msisdn: props.text_or("UE_MSISDN", "0000000001"),
            plmn: Plmn::from_properties(props, "UE"),
            key: props.text_or("UE_KEY", "465B5CE8B199B49FAA5F0A2EE238A6BC"),
            op_type: props.text_or("UE_OPType", "OPC"),
            op: props.text_or("UE_OP", "E8ED289DEBA952E4283B54E88E6183CA"),
            imei: props.text_or("UE_IMEI", "356938035643803"),
            imeisv: props.text_or("UE_IMEISV", "4370816125816151"),
            tunnel_iface: props.text_or("UE_TunnelInterface", "uesimtun0"),
            radio_iface: props.text_or("UE_RadioInterface", "eth0"),
            session_type: props.text_or("UE_SessionType", "IPv4"),
            pdu_sessions: props.integer("UE_PDUSessions").filter(|n| *n > 0).unwrap_or(1),
            mobility: props.flag("UE_MobilityEnabled").unwrap_or(false),
            txpower: propagation::component_power(ComponentType::UserEquipment, props),
        }
    }

    pub fn environment(&self) -> Env {
        let mut env = Env::new();
        push(&mut env, "GNB_HOSTNAME", self.gnb_hostname.as_str());
        push(&mut env, "APN", self.apn.as_str());
        push(&mut env, "MSISDN", self.msisdn.as_str());
        push(&mut env, "MCC", self.plmn.mcc.as_str());
        push(&mut env, "MNC", self.plmn.mnc.as_str());
        push(&mut env, "SST", self.plmn.sst.as_str());
        push(&mut env, "SD", self.plmn.sd.as_str());
        push(&mut env, "TAC", self.plmn.tac.as_str());
        push(&mut env, "KEY", self.key.as_str());
        push(&mut env, "OP_TYPE", self.op_type.as_str());
        push(&mut env, "OP", self.op.as_str());
        push(&mut env, "IMEI", self.imei.as_str());
        push(&mut env, "IMEISV", self.imeisv.as_str());
        push(&mut env, "TUNNEL_IFACE", self.tunnel_iface.as_str());
        push(&mut env, "RADIO_IFACE", self.radio_iface.as_str());
        push(&mut env, "SESSION_TYPE", self.session_type.as_str());
        push(&mut env, "PDU_SESSIONS", self.pdu_sessions.to_string());
        push(&mut env, "MOBILITY_ENABLED", bool_str(self.mobility));
        push(&mut env, "UERANSIM_COMPONENT", "ue");
        if let Some(ip) = &self.gnb_ip {
            push(&mut env, "GNB_IP", ip.as_str());
        }
        push(&mut env, "OVS_ENABLED", "false");
        env
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set("txpower", ParamValue::Float(self.txpower));
        params.set("environment", ParamValue::Env(self.environment()));
        params
    }
}

// ----------------------------------------------------------------------
// gNB
// ----------------------------------------------------------------------

/// WiFi hotspot a gNB can expose next to its radio.
#[derive(Debug, Clone, PartialEq)]
pub struct GnbAccessPoint {
    pub ssid: String,
    pub channel: String,
    pub mode: String,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GnbConfig {
    pub amf_hostname: String,
    pub amf_ip: Option<String>,
    pub gnb_hostname: String,
    pub plmn: Plmn,
    pub n2_iface: String,
    pub n3_iface: String,
    pub radio_iface: String,
    pub txpower: f64,
    pub ovs: Option<OvsSettings>,
    pub access_point: Option<GnbAccessPoint>,
}

impl GnbConfig {
    pub fn from_properties(props: &Properties) -> Self {
        let ovs = props.flag("GNB_OVS_Enabled").unwrap_or(false).then(|| OvsSettings {
            bridge_name: props.text_or("GNB_OVS_BridgeName", "br-gnb"),
            fail_mode: props.text_or("GNB_OVS_FailMode", "secure"),
            protocols: props.text_or("GNB_OVS_Protocols", "OpenFlow14"),
            datapath: props.text_or("GNB_OVS_Datapath", "kernel"),
            bridge_priority: props.text_or("GNB_Bridge_Priority", "32768"),
            stp_enabled: props.flag("GNB_STP_Enabled").unwrap_or(false),
            controller: props.text("GNB_OVS_Controller"),
            controller_port: None,
        });
        let access_point = props.flag("GNB_AP_Enabled").unwrap_or(false).then(|| GnbAccessPoint {
            ssid: props.text_or("GNB_AP_SSID", "gnb-hotspot"),
            channel: props.text_or("GNB_AP_Channel", "6"),
            mode: props.text_or("GNB_AP_Mode", "g"),
            password: props.text("GNB_AP_Password"),
        });

        Self {
            amf_hostname: props.text_or("GNB_AMFHostName", "amf"),
            amf_ip: props.text("GNB_AMF_IP"),
            gnb_hostname: props.text_or("GNB_GNBHostName", "gnb"),
            plmn: Plmn::from_properties(props, "GNB"),
            n2_iface: props.text_or("GNB_N2_Interface", "eth0"),
            n3_iface: props.text_or("GNB_N3_Interface", "eth0"),
            radio_iface: props.text_or("GNB_Radio_Interface", "eth0"),
            txpower: propagation::component_power(ComponentType::BaseStation, props),
            ovs,
            access_point,
        }
    }

    pub fn environment(&self) -> Env {
        let mut env = Env::new();
        push(&mut env, "AMF_HOSTNAME", self.amf_hostname.as_str());
        if let Some(ip) = &self.amf_ip {
            push(&mut env, "AMF_IP", ip.as_str());
        }
        push(&mut env, "GNB_HOSTNAME", self.gnb_hostname.as_str());
        push(&mut env, "N2_IFACE", self.n2_iface.as_str());
        push(&mut env, "N3_IFACE", self.n3_iface.as_str());
        push(&mut env, "RADIO_IFACE", self.radio_iface.as_str());
        push(&mut env, "MCC", self.plmn.mcc.as_str());
        push(&mut env, "MNC", self.plmn.mnc.as_str());
        push(&mut env, "SST", self.plmn.sst.as_str());
        push(&mut env, "SD", self.plmn.sd.as_str());
        push(&mut env, "TAC", self.plmn.tac.as_str());
        push(&mut env, "UERANSIM_COMPONENT", "gnb");

        match &self.ovs {
            Some(ovs) => ovs.append_env(&mut env),
            None => push(&mut env, "OVS_ENABLED", "false"),
        }
        match &self.access_point {
            Some(ap) => {
                let (fail_mode, protocols) = match &self.ovs {
                    Some(ovs) => (ovs.fail_mode.as_str(), ovs.protocols.as_str()),
                    None => ("secure", "OpenFlow14"),
                };
                push(&mut env, "AP_ENABLED", "true");
                push(&mut env, "AP_SSID", ap.ssid.as_str());
                push(&mut env, "AP_CHANNEL", ap.channel.as_str());
                push(&mut env, "AP_MODE", ap.mode.as_str());
                push(&mut env, "AP_PASSWD", ap.password.clone().unwrap_or_default());
                push(&mut env, "AP_FAILMODE", fail_mode);
                if self.ovs.is_none() {
                    push(&mut env, "OPENFLOW_PROTOCOLS", protocols);
                }
                push(&mut env, "AP_TXPOWER", format_power(self.txpower));
            }
            None => push(&mut env, "AP_ENABLED", "false"),
        }
        env
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set("txpower", ParamValue::Float(self.txpower));
        params.set("environment", ParamValue::Env(self.environment()));
        params
    }
}

fn format_power(power: f64) -> String {
    if power.fract() == 0.0 {
        format!("{}", power as i64)
    } else {
        power.to_string()
    }
}

// ----------------------------------------------------------------------
// Core network function
// ----------------------------------------------------------------------

/// Open5GS network function run by a VGcore node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CoreFunction {
    Nrf,
    Scp,
    Ausf,
    Udm,
    Udr,
    Pcf,
    Bsf,
    Nssf,
    Smf,
    Amf,
    Upf,
}

impl CoreFunction {
    /// Start-up order: discovery first, user plane last.
    pub const STARTUP_ORDER: [CoreFunction; 11] = [
        CoreFunction::Nrf,
        CoreFunction::Scp,
        CoreFunction::Ausf,
        CoreFunction::Udm,
        CoreFunction::Udr,
        CoreFunction::Pcf,
        CoreFunction::Bsf,
        CoreFunction::Nssf,
        CoreFunction::Smf,
        CoreFunction::Amf,
        CoreFunction::Upf,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoreFunction::Nrf => "nrf",
            CoreFunction::Scp => "scp",
            CoreFunction::Ausf => "ausf",
            CoreFunction::Udm => "udm",
            CoreFunction::Udr => "udr",
            CoreFunction::Pcf => "pcf",
            CoreFunction::Bsf => "bsf",
            CoreFunction::Nssf => "nssf",
            CoreFunction::Smf => "smf",
            CoreFunction::Amf => "amf",
            CoreFunction::Upf => "upf",
        }
    }

    /// Daemon binary inside the Open5GS image.
    pub fn daemon(&self) -> String {
        format!("open5gs-{}d", self.as_str())
    }

    pub fn startup_rank(&self) -> usize {
        Self::STARTUP_ORDER
            .iter()
            .position(|f| f == self)
            .unwrap_or(Self::STARTUP_ORDER.len())
    }
}

impl fmt::Display for CoreFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoreFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::STARTUP_ORDER
            .iter()
            .copied()
            .find(|f| f.as_str() == lowered)
            .ok_or_else(|| format!("Unknown 5G core function: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoreConfig {
    pub function: CoreFunction,
    pub image: Option<String>,
    pub database_uri: String,
    pub network_interface: String,
    pub plmn: Plmn,
    pub enable_nat: bool,
    pub ovs: Option<OvsSettings>,
}

impl CoreConfig {
    pub fn from_properties(props: &Properties) -> Self {
        let function = match props.text("VGCore_Component") {
            Some(name) => name.parse().unwrap_or_else(|e| {
                log::warn!("{}, using amf", e);
                CoreFunction::Amf
            }),
            None => CoreFunction::Amf,
        };
        let ovs = props.flag("VGCore_OVSEnabled").unwrap_or(false).then(|| OvsSettings {
            bridge_name: props.text_or("VGCore_OVSBridgeName", "br-open5gs"),
            fail_mode: props.text_or("VGCore_OVSFailMode", "standalone"),
            protocols: props.text_or("VGCore_OpenFlowProtocols", "OpenFlow14"),
            datapath: props.text_or("VGCore_OVSDatapath", "kernel"),
            bridge_priority: props.text_or("VGCore_BridgePriority", "32768"),
            stp_enabled: props.flag("VGCore_STPEnabled").unwrap_or(false),
            controller: props.text("VGCore_OVSController"),
            controller_port: Some(props.text_or("VGCore_ControllerPort", "6633")),
        });

        Self {
            function,
            image: props.text("VGCore_DockerImage"),
            database_uri: props.text_or("VGCore_DatabaseURI", DEFAULT_DB_URI),
            network_interface: props.text_or("VGCore_NetworkInterface", "eth0"),
            plmn: Plmn::from_properties(props, "VGCore"),
            enable_nat: props.flag("VGCore_EnableNAT").unwrap_or(true),
            ovs,
        }
    }

    pub fn environment(&self) -> Env {
        let mut env = Env::new();
        push(&mut env, "COMPONENT_NAME", self.function.as_str());
        push(&mut env, "DB_URI", self.database_uri.as_str());
        push(&mut env, "NETWORK_INTERFACE", self.network_interface.as_str());
        push(&mut env, "MCC", self.plmn.mcc.as_str());
        push(&mut env, "MNC", self.plmn.mnc.as_str());
        push(&mut env, "TAC", self.plmn.tac.as_str());
        push(&mut env, "SST", self.plmn.sst.as_str());
        push(&mut env, "SD", self.plmn.sd.as_str());
        push(&mut env, "ENABLE_NAT", bool_str(self.enable_nat));
        match &self.ovs {
            Some(ovs) => ovs.append_env(&mut env),
            None => push(&mut env, "OVS_ENABLED", "false"),
        }
        env
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set_opt("dimage", self.image.clone().map(ParamValue::Str));
        params.set("environment", ParamValue::Env(self.environment()));
        params
    }
}
