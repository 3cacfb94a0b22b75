//! Identifier helpers for generated scripts and saved display names.

use crate::topology::ComponentType;
use regex::Regex;
use std::sync::LazyLock;

static INVALID_IDENT_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_]").expect("Invalid identifier regex"));

static DISPLAY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)([0-9]+)$").expect("Invalid display name regex"));

/// Turn a display name into a Python identifier.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`, and a leading digit
/// gets an `_` prefix.
///
/// # Examples
/// ```
/// use netflux5g::utils::naming::sanitize_identifier;
///
/// assert_eq!(sanitize_identifier("UE1"), "UE1");
/// assert_eq!(sanitize_identifier("my ap-2"), "my_ap_2");
/// assert_eq!(sanitize_identifier("5g"), "_5g");
/// ```
pub fn sanitize_identifier(name: &str) -> String {
    let cleaned = INVALID_IDENT_CHARS.replace_all(name.trim(), "_");
    match cleaned.chars().next() {
        None => "_".to_string(),
        Some(c) if c.is_ascii_digit() => format!("_{}", cleaned),
        Some(_) => cleaned.into_owned(),
    }
}

/// Split a display name such as `GNB2` into its type and number.
/// Returns `None` for unknown prefixes and for number 0.
pub fn parse_display_name(name: &str) -> Option<(ComponentType, u32)> {
    let caps = DISPLAY_NAME.captures(name.trim())?;
    let kind = caps.get(1)?.as_str().parse::<ComponentType>().ok()?;
    let number = caps.get(2)?.as_str().parse::<u32>().ok()?;
    (number > 0).then_some((kind, number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("Host1"), "Host1");
        assert_eq!(sanitize_identifier("core.amf"), "core_amf");
        assert_eq!(sanitize_identifier("9lives"), "_9lives");
        assert_eq!(sanitize_identifier(""), "_");
        assert_eq!(sanitize_identifier("é"), "_");
    }

    #[test]
    fn test_parse_display_name() {
        assert_eq!(parse_display_name("UE3"), Some((ComponentType::UserEquipment, 3)));
        assert_eq!(parse_display_name("DockerHost12"), Some((ComponentType::DockerHost, 12)));
        assert_eq!(parse_display_name("VGcore1"), Some((ComponentType::CoreNetwork, 1)));
        assert_eq!(parse_display_name("UE0"), None);
        assert_eq!(parse_display_name("Satellite1"), None);
        assert_eq!(parse_display_name("UE"), None);
        assert_eq!(parse_display_name("UE1a"), None);
    }
}
