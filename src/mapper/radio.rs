//! WiFi node configurations: access points and stations.
//!
//! Transmit power is always resolved (explicit value or type default) and
//! always emitted. Range is never emitted: the emulator derives it from
//! `txpower` with the same propagation model the editor draws with.

use super::nodes::HostConfig;
use super::params::{ParamValue, ParameterSet};
use crate::propagation;
use crate::properties::Properties;
use crate::topology::ComponentType;

pub const DEFAULT_SSID: &str = "my-ssid";
pub const DEFAULT_CHANNEL: i64 = 1;
pub const DEFAULT_MODE: &str = "g";

/// WPA settings shared by APs and stations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Security {
    pub encrypt: Option<String>,
    pub passwd: Option<String>,
}

impl Security {
    fn from_properties(props: &Properties, prefix: &str) -> Self {
        Self {
            encrypt: props.text(&format!("{}_Encrypt", prefix)),
            passwd: props.first_text(&[
                format!("{}_Passwd", prefix).as_str(),
                format!("{}_Password", prefix).as_str(),
            ]),
        }
    }

    fn apply(&self, params: &mut ParameterSet) {
        params.set_opt("encrypt", self.encrypt.clone().map(ParamValue::Str));
        params.set_opt("passwd", self.passwd.clone().map(ParamValue::Str));
    }

    pub fn is_configured(&self) -> bool {
        self.encrypt.is_some() || self.passwd.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessPointConfig {
    pub ssid: Option<String>,
    pub channel: Option<i64>,
    pub mode: Option<String>,
    pub protocol: Option<String>,
    pub txpower: f64,
    pub security: Security,
}

impl AccessPointConfig {
    pub fn from_properties(props: &Properties) -> Self {
        Self {
            ssid: props.text("AP_SSID").filter(|s| s != DEFAULT_SSID),
            channel: props
                .integer("AP_Channel")
                .filter(|c| *c > 0 && *c != DEFAULT_CHANNEL),
            mode: props.text("AP_Mode").filter(|m| m != DEFAULT_MODE),
            protocol: props.text("AP_WirelessProtocol"),
            txpower: propagation::component_power(ComponentType::AccessPoint, props),
            security: Security::from_properties(props, "AP"),
        }
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set_opt("ssid", self.ssid.clone().map(ParamValue::Str));
        params.set_opt("channel", self.channel.map(ParamValue::Int));
        params.set_opt("mode", self.mode.clone().map(ParamValue::Str));
        params.set_opt("protocol", self.protocol.clone().map(ParamValue::Str));
        params.set("txpower", ParamValue::Float(self.txpower));
        self.security.apply(&mut params);
        params
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationConfig {
    pub host: HostConfig,
    pub txpower: f64,
    pub security: Security,
}

impl StationConfig {
    pub fn from_properties(props: &Properties) -> Self {
        Self {
            host: HostConfig::from_properties(props, "STA"),
            txpower: propagation::component_power(ComponentType::Station, props),
            security: Security::from_properties(props, "STA"),
        }
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = self.host.parameters();
        params.set("txpower", ParamValue::Float(self.txpower));
        self.security.apply(&mut params);
        params
    }
}
