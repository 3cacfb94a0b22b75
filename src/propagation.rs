//! Power/range propagation model.
//!
//! The editor draws a coverage circle around every radio node, and the
//! emulator decides connectivity from transmit power with its own propagation
//! model. Both sides must agree, so the range shown on the canvas is always
//! derived from power with the same formulas and defaults the emulator uses
//! (Mininet-WiFi: noise threshold -91 dBm, antenna gain 5 dBi, system loss 1,
//! log-distance exponent 3).
//!
//! `power_from_range` is the algebraic inverse of `range_from_power` for the
//! log-distance and Friis models; a round trip returns the original power as
//! long as neither clamp (`range >= 0.1 m`, `power >= 1 dBm`) is hit.

use crate::properties::Properties;
use crate::topology::types::ComponentType;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Speed of light in m/s.
const SPEED_OF_LIGHT: f64 = 299_792_458.0;
/// Reference distance for the log-distance model, metres.
const REFERENCE_DISTANCE: f64 = 1.0;
/// Exponent used for the two-ray-ground approximation.
pub const TWO_RAY_GROUND_EXPONENT: f64 = 3.5;

pub const DEFAULT_NOISE_FLOOR_DBM: f64 = -91.0;
pub const DEFAULT_FREQUENCY_GHZ: f64 = 2.4;
pub const DEFAULT_ANTENNA_GAIN_DBI: f64 = 5.0;
pub const DEFAULT_SYSTEM_LOSS: f64 = 1.0;
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 3.0;

pub const MIN_RANGE_M: f64 = 0.1;
pub const MIN_POWER_DBM: f64 = 1.0;

/// Propagation models understood by the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PropagationModel {
    #[default]
    #[serde(rename = "logDistance")]
    LogDistance,
    #[serde(rename = "friis")]
    Friis,
    /// Approximated as log-distance with exponent 3.5, not a real two-ray
    /// computation (antenna heights are not part of the topology).
    #[serde(rename = "twoRayGround")]
    TwoRayGround,
}

impl PropagationModel {
    /// Name the emulator's `setPropagationModel` expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            PropagationModel::LogDistance => "logDistance",
            PropagationModel::Friis => "friis",
            PropagationModel::TwoRayGround => "twoRayGround",
        }
    }
}

impl fmt::Display for PropagationModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropagationModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "logDistance" | "log_distance" | "logdistance" => Ok(PropagationModel::LogDistance),
            "friis" | "Friis" => Ok(PropagationModel::Friis),
            "twoRayGround" | "two_ray_ground" | "tworayground" => Ok(PropagationModel::TwoRayGround),
            other => Err(format!("Unknown propagation model: {}", other)),
        }
    }
}

/// Link-budget parameters other than transmit power.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadioParams {
    pub frequency_ghz: f64,
    pub antenna_gain_dbi: f64,
    pub noise_floor_dbm: f64,
    /// System loss factor, the emulator's `sL` (linear, 1 = no loss).
    pub system_loss: f64,
    /// Only used by the log-distance model.
    pub path_loss_exponent: f64,
}

impl Default for RadioParams {
    fn default() -> Self {
        Self {
            frequency_ghz: DEFAULT_FREQUENCY_GHZ,
            antenna_gain_dbi: DEFAULT_ANTENNA_GAIN_DBI,
            noise_floor_dbm: DEFAULT_NOISE_FLOOR_DBM,
            system_loss: DEFAULT_SYSTEM_LOSS,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
        }
    }
}

impl RadioParams {
    pub fn with_frequency(mut self, frequency_ghz: f64) -> Self {
        self.frequency_ghz = frequency_ghz;
        self
    }

    pub fn with_path_loss_exponent(mut self, exponent: f64) -> Self {
        self.path_loss_exponent = exponent;
        self
    }

    fn wavelength(&self) -> f64 {
        SPEED_OF_LIGHT / (self.frequency_ghz * 1e9)
    }

    /// Transmit power plus both antenna gains minus the receiver threshold:
    /// the path loss the link can absorb at a given power.
    fn budget(&self, power_dbm: f64) -> f64 {
        power_dbm + 2.0 * self.antenna_gain_dbi - self.noise_floor_dbm
    }

    /// Free-space loss at the reference distance, dB.
    fn reference_loss(&self) -> f64 {
        let lambda = self.wavelength();
        10.0 * ((4.0 * PI * REFERENCE_DISTANCE).powi(2) * self.system_loss / lambda.powi(2)).log10()
    }
}

/// Coverage range in metres for a transmit power in dBm.
pub fn range_from_power(power_dbm: f64, params: &RadioParams, model: PropagationModel) -> f64 {
    let range = match model {
        PropagationModel::LogDistance => log_distance_range(power_dbm, params, params.path_loss_exponent),
        PropagationModel::Friis => friis_range(power_dbm, params),
        PropagationModel::TwoRayGround => log_distance_range(power_dbm, params, TWO_RAY_GROUND_EXPONENT),
    };
    if range.is_finite() {
        range.max(MIN_RANGE_M)
    } else {
        MIN_RANGE_M
    }
}

/// Transmit power in dBm needed to cover `range_m`.
pub fn power_from_range(range_m: f64, params: &RadioParams, model: PropagationModel) -> f64 {
    let range_m = range_m.max(MIN_RANGE_M);
    let power = match model {
        PropagationModel::LogDistance => log_distance_power(range_m, params, params.path_loss_exponent),
        PropagationModel::Friis => friis_power(range_m, params),
        PropagationModel::TwoRayGround => log_distance_power(range_m, params, TWO_RAY_GROUND_EXPONENT),
    };
    if power.is_finite() {
        power.max(MIN_POWER_DBM)
    } else {
        MIN_POWER_DBM
    }
}

fn log_distance_range(power_dbm: f64, params: &RadioParams, exponent: f64) -> f64 {
    let excess = params.budget(power_dbm) - params.reference_loss();
    10f64.powf(excess / (10.0 * exponent)) * REFERENCE_DISTANCE
}

fn log_distance_power(range_m: f64, params: &RadioParams, exponent: f64) -> f64 {
    let path_loss = params.reference_loss() + 10.0 * exponent * (range_m / REFERENCE_DISTANCE).log10();
    path_loss + params.noise_floor_dbm - 2.0 * params.antenna_gain_dbi
}

fn friis_range(power_dbm: f64, params: &RadioParams) -> f64 {
    let lambda = params.wavelength();
    let received_ratio = 10f64.powf(params.budget(power_dbm) / 10.0);
    (received_ratio * lambda.powi(2) / ((4.0 * PI).powi(2) * params.system_loss)).sqrt()
}

fn friis_power(range_m: f64, params: &RadioParams) -> f64 {
    let lambda = params.wavelength();
    let path_loss = 10.0 * (range_m.powi(2) * (4.0 * PI).powi(2) * params.system_loss / lambda.powi(2)).log10();
    path_loss + params.noise_floor_dbm - 2.0 * params.antenna_gain_dbi
}

/// Transmit power used when a radio node has none configured.
pub fn default_power(kind: ComponentType) -> f64 {
    match kind {
        ComponentType::BaseStation => 30.0,
        _ => 20.0,
    }
}

/// Property keys that may hold a node's transmit power, in priority order.
fn power_keys(kind: ComponentType) -> Vec<String> {
    let mut keys = Vec::with_capacity(4);
    if kind.is_radio() {
        keys.push(format!("{}_Power", kind.as_str()));
        keys.push(format!("{}_TxPower", kind.as_str()));
    }
    keys.push("txpower".to_string());
    keys.push("power".to_string());
    keys
}

/// Explicitly configured transmit power, if any valid positive value is set.
pub fn configured_power(kind: ComponentType, properties: &Properties) -> Option<f64> {
    power_keys(kind)
        .iter()
        .find_map(|key| properties.number(key).filter(|p| *p > 0.0))
}

/// Transmit power for a node: the configured value, else the type default.
pub fn component_power(kind: ComponentType, properties: &Properties) -> f64 {
    configured_power(kind, properties).unwrap_or_else(|| default_power(kind))
}

/// Operating frequency in GHz for a node.
///
/// Explicit frequency properties win; values above 100 are read as MHz
/// (the base-station dialog stores `3500`). Access points fall back on the
/// channel (5 GHz from channel 36 up), base stations on 3.5 GHz mid-band.
pub fn component_frequency(kind: ComponentType, properties: &Properties) -> f64 {
    let keys: &[&str] = match kind {
        ComponentType::AccessPoint => &["AP_Frequency", "frequency", "freq"],
        ComponentType::BaseStation => &["GNB_Frequency", "frequency", "freq"],
        ComponentType::UserEquipment | ComponentType::Station => &["frequency", "freq"],
        _ => &[],
    };
    let explicit = keys
        .iter()
        .find_map(|key| properties.number(key).filter(|f| *f > 0.0))
        .map(|f| if f > 100.0 { f / 1000.0 } else { f });
    if let Some(frequency) = explicit {
        return frequency;
    }

    match kind {
        ComponentType::AccessPoint => match properties.integer("AP_Channel") {
            Some(channel) if channel >= 36 => 5.0,
            _ => 2.4,
        },
        ComponentType::BaseStation => 3.5,
        _ => DEFAULT_FREQUENCY_GHZ,
    }
}

/// Coverage radius for a radio node, computed from its resolved power and
/// frequency. Non-radio nodes have no coverage.
pub fn component_range(
    kind: ComponentType,
    properties: &Properties,
    model: PropagationModel,
    path_loss_exponent: f64,
) -> Option<f64> {
    if !kind.is_radio() {
        return None;
    }
    let params = RadioParams::default()
        .with_frequency(component_frequency(kind, properties))
        .with_path_loss_exponent(path_loss_exponent);
    Some(range_from_power(component_power(kind, properties), &params, model))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        let tolerance = 1e-6 * a.abs().max(b.abs()).max(1.0);
        assert!((a - b).abs() <= tolerance, "{} != {}", a, b);
    }

    #[test]
    fn test_round_trip_log_distance_and_friis() {
        for model in [PropagationModel::LogDistance, PropagationModel::Friis] {
            for frequency in [2.4, 3.5, 5.0] {
                for gain in [0.0, 5.0, 8.0] {
                    let params = RadioParams { frequency_ghz: frequency, antenna_gain_dbi: gain, ..Default::default() };
                    for power in [1.0, 5.0, 14.5, 20.0, 30.0, 40.0] {
                        let range = range_from_power(power, &params, model);
                        assert_close(power_from_range(range, &params, model), power);
                    }
                }
            }
        }
    }

    #[test]
    fn test_round_trip_two_ray_ground_approximation() {
        let params = RadioParams::default();
        let range = range_from_power(25.0, &params, PropagationModel::TwoRayGround);
        assert_close(power_from_range(range, &params, PropagationModel::TwoRayGround), 25.0);
    }

    #[test]
    fn test_range_strictly_increasing_in_power() {
        let params = RadioParams::default();
        for model in [PropagationModel::LogDistance, PropagationModel::Friis, PropagationModel::TwoRayGround] {
            let mut previous = 0.0;
            for step in 0..40 {
                let range = range_from_power(1.0 + step as f64, &params, model);
                assert!(range > previous, "{} not increasing at step {}", model, step);
                previous = range;
            }
        }
    }

    #[test]
    fn test_friis_equals_log_distance_with_exponent_two() {
        let params = RadioParams::default().with_path_loss_exponent(2.0);
        let friis = range_from_power(20.0, &params, PropagationModel::Friis);
        let log = range_from_power(20.0, &params, PropagationModel::LogDistance);
        assert_close(friis, log);
    }

    #[test]
    fn test_clamps() {
        let params = RadioParams::default();
        assert_eq!(range_from_power(-500.0, &params, PropagationModel::LogDistance), MIN_RANGE_M);
        assert_eq!(power_from_range(0.0, &params, PropagationModel::LogDistance), MIN_POWER_DBM);
        assert_eq!(power_from_range(-10.0, &params, PropagationModel::Friis), MIN_POWER_DBM);
    }

    #[test]
    fn test_default_ap_range_is_plausible() {
        // 20 dBm at 2.4 GHz with exponent 3 covers roughly half a kilometre.
        let range = range_from_power(20.0, &RadioParams::default(), PropagationModel::LogDistance);
        assert!(range > 400.0 && range < 600.0, "range {}", range);
    }

    #[test]
    fn test_default_power_per_type() {
        assert_eq!(default_power(ComponentType::BaseStation), 30.0);
        for kind in [ComponentType::AccessPoint, ComponentType::UserEquipment, ComponentType::Station] {
            assert_eq!(default_power(kind), 20.0, "{}", kind);
        }
    }

    #[test]
    fn test_component_power_resolution() {
        let mut props = Properties::new();
        assert_eq!(component_power(ComponentType::AccessPoint, &props), 20.0);
        assert_eq!(component_power(ComponentType::BaseStation, &props), 30.0);
        props.set("AP_Power", "not a number");
        props.set("txpower", "17");
        assert_eq!(component_power(ComponentType::AccessPoint, &props), 17.0);
        props.set("AP_Power", "15");
        assert_eq!(component_power(ComponentType::AccessPoint, &props), 15.0);
        props.set("AP_Power", "-3");
        assert_eq!(component_power(ComponentType::AccessPoint, &props), 17.0);
    }

    #[test]
    fn test_component_frequency() {
        let mut props = Properties::new();
        assert_eq!(component_frequency(ComponentType::AccessPoint, &props), 2.4);
        props.set("AP_Channel", "36");
        assert_eq!(component_frequency(ComponentType::AccessPoint, &props), 5.0);
        props.set("AP_Channel", "eleven");
        assert_eq!(component_frequency(ComponentType::AccessPoint, &props), 2.4);
        assert_eq!(component_frequency(ComponentType::BaseStation, &Properties::new()), 3.5);
        let gnb: Properties = [("GNB_Frequency", "3700")].into_iter().collect();
        assert_close(component_frequency(ComponentType::BaseStation, &gnb), 3.7);
        assert_eq!(component_frequency(ComponentType::UserEquipment, &Properties::new()), 2.4);
    }

    #[test]
    fn test_component_range_only_for_radio_nodes() {
        let props = Properties::new();
        assert!(component_range(ComponentType::Switch, &props, PropagationModel::LogDistance, 3.0).is_none());
        let ap = component_range(ComponentType::AccessPoint, &props, PropagationModel::LogDistance, 3.0).unwrap();
        let gnb = component_range(ComponentType::BaseStation, &props, PropagationModel::LogDistance, 3.0).unwrap();
        assert!(gnb > 0.0 && ap > 0.0);
    }

    #[test]
    fn test_model_names() {
        for model in [PropagationModel::LogDistance, PropagationModel::Friis, PropagationModel::TwoRayGround] {
            assert_eq!(model.as_str().parse::<PropagationModel>(), Ok(model));
        }
        assert!("okumura".parse::<PropagationModel>().is_err());
    }
}
