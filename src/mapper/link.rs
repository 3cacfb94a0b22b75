//! Link parameters: traffic shaping and optional static endpoint addresses.

use super::params::{ParamValue, ParameterSet};
use crate::properties::Properties;
use crate::utils::validation::{normalize_delay, parse_ipv4_cidr};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkConfig {
    /// Mbit/s. Zero means unset.
    pub bandwidth: Option<i64>,
    pub delay: Option<String>,
    /// Percent.
    pub loss: Option<f64>,
    pub source_ip: Option<String>,
    pub destination_ip: Option<String>,
}

impl LinkConfig {
    pub fn from_properties(props: &Properties) -> Self {
        let bandwidth = ["bandwidth", "bw"]
            .iter()
            .find_map(|key| props.integer(key))
            .filter(|bw| *bw > 0);
        let delay = props.text("delay").and_then(|raw| {
            let normalized = normalize_delay(&raw);
            if normalized.is_none() {
                log::warn!("Ignoring invalid link delay '{}'", raw);
            }
            normalized
        });
        let loss = props.number("loss").filter(|loss| *loss > 0.0);

        let (source_ip, destination_ip) = if props.flag("enable_ip").unwrap_or(false) {
            (endpoint_ip(props, "source_ip"), endpoint_ip(props, "dest_ip"))
        } else {
            (None, None)
        };

        Self { bandwidth, delay, loss, source_ip, destination_ip }
    }

    pub fn parameters(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.set_opt("bw", self.bandwidth.map(ParamValue::Int));
        params.set_opt("delay", self.delay.clone().map(ParamValue::Str));
        params.set_opt("loss", self.loss.map(ParamValue::Float));
        params.set_opt("params1", self.source_ip.as_deref().map(ip_params));
        params.set_opt("params2", self.destination_ip.as_deref().map(ip_params));
        params
    }

    /// True when the link needs traffic control in the emulator.
    pub fn is_shaped(&self) -> bool {
        self.bandwidth.is_some() || self.delay.is_some() || self.loss.is_some()
    }
}

fn endpoint_ip(props: &Properties, key: &str) -> Option<String> {
    props.text(key).filter(|ip| {
        let ok = parse_ipv4_cidr(ip).is_some();
        if !ok {
            log::warn!("Ignoring invalid link {} '{}'", key, ip);
        }
        ok
    })
}

fn ip_params(ip: &str) -> ParamValue {
    ParamValue::Env(vec![("ip".to_string(), ip.to_string())])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_bandwidth_is_unset() {
        let props: Properties = [("bandwidth", "0")].into_iter().collect();
        let params = LinkConfig::from_properties(&props).parameters();
        assert!(!params.contains("bw"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_shaping_values() {
        let props: Properties = [("bandwidth", "100"), ("delay", "5"), ("loss", "0.5")]
            .into_iter()
            .collect();
        let config = LinkConfig::from_properties(&props);
        assert!(config.is_shaped());
        let params = config.parameters();
        assert_eq!(params.get("bw"), Some(&ParamValue::Int(100)));
        assert_eq!(params.get("delay").and_then(ParamValue::as_str), Some("5ms"));
        assert_eq!(params.get("loss"), Some(&ParamValue::Float(0.5)));
    }

    #[test]
    fn test_malformed_values_are_dropped() {
        let props: Properties = [("bandwidth", "fast"), ("delay", "soon"), ("loss", "0")]
            .into_iter()
            .collect();
        let config = LinkConfig::from_properties(&props);
        assert_eq!(config, LinkConfig::default());
    }

    #[test]
    fn test_static_ips_need_enable_flag() {
        let mut props: Properties = [("source_ip", "10.0.0.1/24"), ("dest_ip", "10.0.0.2/24")]
            .into_iter()
            .collect();
        assert!(LinkConfig::from_properties(&props).source_ip.is_none());

        props.set("enable_ip", true);
        let params = LinkConfig::from_properties(&props).parameters();
        assert_eq!(params.names(), vec!["params1", "params2"]);
    }
}
