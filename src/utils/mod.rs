//! Shared utilities: identifier naming and field validation.

pub mod naming;
pub mod validation;

pub use naming::{parse_display_name, sanitize_identifier};
pub use validation::{is_valid_cidr, is_valid_ipv4, is_valid_mac, normalize_delay, parse_ipv4_cidr};
