//! Huawei AT command builders.
//!
//! Only the GNSS engine is driven on Huawei modules. Positioning is started
//! with the `^WP*` command family and results are delivered by the module
//! itself, so there is no single-shot read command here.

/// Standalone positioning, no assistance server.
pub fn cmd_positioning_mode() -> String {
    "AT^WPDOM=0".to_string()
}

/// Single positioning session rather than tracking.
pub fn cmd_session_type() -> String {
    "AT^WPDST=0".to_string()
}

/// Response time 255 s, horizontal accuracy threshold 500 m.
pub fn cmd_quality_of_service() -> String {
    "AT^WPQOS=255,500".to_string()
}

/// Start positioning.
pub fn cmd_start_positioning() -> String {
    "AT^WPDGP".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positioning_commands() {
        assert_eq!(cmd_positioning_mode(), "AT^WPDOM=0");
        assert_eq!(cmd_session_type(), "AT^WPDST=0");
        assert_eq!(cmd_quality_of_service(), "AT^WPQOS=255,500");
        assert_eq!(cmd_start_positioning(), "AT^WPDGP");
    }
}
