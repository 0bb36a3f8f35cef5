//! GNSS field decoder.
//!
//! Vendors answer a single-shot location query with a response keyword, a
//! colon and a comma-delimited field list (`+CGPSINFO: 3113.343286,N,...`).
//! Which field sits at which index differs per vendor, so decoding is driven
//! by a [`GnssLayout`] table that each vendor crate provides.
//!
//! Coordinates arrive as `DDDMM.MMMMM` and are rendered as
//! `"DD deg MM.MMMMM min"`. Packed `HHMMSS` times and `DDMMYY` dates are
//! rendered as `HH:MM:SS` and `DD/MM/YY`.

use crate::error::{Error, Result};
use crate::types::{PositionFix, NO_ERROR};

/// Payloads shorter than this are rejected without being parsed.
pub const MIN_PAYLOAD_LEN: usize = 10;

/// Field positions of one vendor's positioning payload.
///
/// Indices count comma-separated fields after the response keyword. `None`
/// means the vendor does not report the field; it decodes to `""`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GnssLayout {
    pub time: Option<usize>,
    pub latitude: Option<usize>,
    pub latitude_dir: Option<usize>,
    pub longitude: Option<usize>,
    pub longitude_dir: Option<usize>,
    pub altitude: Option<usize>,
    pub speed: Option<usize>,
    pub true_course: Option<usize>,
    pub date: Option<usize>,
}

/// Decode a raw positioning payload into a [`PositionFix`].
///
/// Empty or missing fields yield empty strings; only an undersized payload or
/// one without a response keyword is an error.
pub fn decode_position(payload: &str, layout: &GnssLayout) -> Result<PositionFix> {
    if payload.len() < MIN_PAYLOAD_LEN {
        return Err(Error::Decode("Invalid GNSS data".into()));
    }

    let (_, body) = payload
        .split_once(':')
        .ok_or_else(|| Error::Decode(format!("GNSS payload has no response keyword: {payload}")))?;
    let fields: Vec<&str> = body.split(',').map(str::trim).collect();

    Ok(PositionFix {
        time: mapped(&fields, layout.time, format_time),
        latitude: mapped(&fields, layout.latitude, convert_coordinate),
        latitude_dir: field(&fields, layout.latitude_dir).to_string(),
        longitude: mapped(&fields, layout.longitude, convert_coordinate),
        longitude_dir: field(&fields, layout.longitude_dir).to_string(),
        altitude: field(&fields, layout.altitude).to_string(),
        speed: field(&fields, layout.speed).to_string(),
        true_course: field(&fields, layout.true_course).to_string(),
        date: mapped(&fields, layout.date, format_date),
        error: NO_ERROR.to_string(),
    })
}

fn field<'a>(fields: &[&'a str], index: Option<usize>) -> &'a str {
    index.and_then(|i| fields.get(i).copied()).unwrap_or("")
}

fn mapped(fields: &[&str], index: Option<usize>, convert: fn(&str) -> String) -> String {
    match field(fields, index) {
        "" => String::new(),
        raw => convert(raw),
    }
}

/// Convert `DDDMM.MMMMM` notation to `"DD deg MM.MMMMM min"`.
///
/// The last two digits before the decimal point are the whole minutes, the
/// rest are degrees.
///
/// # Example
///
/// ```
/// use cellmodem_core::gnss::convert_coordinate;
///
/// assert_eq!(convert_coordinate("4916.45"), "49 deg 16.45 min");
/// assert_eq!(convert_coordinate("12311.12"), "123 deg 11.12 min");
/// ```
pub fn convert_coordinate(coord: &str) -> String {
    let (head, tail) = coord.split_once('.').unwrap_or((coord, ""));
    let split = head.len().saturating_sub(2);
    let (degrees, minutes) = (
        head.get(..split).unwrap_or(""),
        head.get(split..).unwrap_or(head),
    );
    if tail.is_empty() {
        format!("{degrees} deg {minutes} min")
    } else {
        format!("{degrees} deg {minutes}.{tail} min")
    }
}

/// Render a packed `HHMMSS[.ss]` time as `HH:MM:SS`.
pub fn format_time(raw: &str) -> String {
    format!(
        "{}:{}:{}",
        clamped(raw, 0, 2),
        clamped(raw, 2, 4),
        clamped(raw, 4, 6)
    )
}

/// Render a packed `DDMMYY` date as `DD/MM/YY`.
pub fn format_date(raw: &str) -> String {
    format!(
        "{}/{}/{}",
        clamped(raw, 0, 2),
        clamped(raw, 2, 4),
        clamped(raw, 4, 6)
    )
}

/// Substring by byte offsets, clamped to the string length.
fn clamped(s: &str, start: usize, end: usize) -> &str {
    let end = end.min(s.len());
    let start = start.min(end);
    s.get(start..end).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_LAYOUT: GnssLayout = GnssLayout {
        latitude: Some(0),
        latitude_dir: Some(1),
        longitude: Some(2),
        longitude_dir: Some(3),
        date: Some(4),
        time: Some(5),
        altitude: Some(6),
        speed: Some(7),
        true_course: Some(8),
    };

    #[test]
    fn convert_coordinate_latitude() {
        assert_eq!(convert_coordinate("4916.45"), "49 deg 16.45 min");
    }

    #[test]
    fn convert_coordinate_three_digit_degrees() {
        assert_eq!(convert_coordinate("12118.764648"), "121 deg 18.764648 min");
    }

    #[test]
    fn convert_coordinate_without_fraction() {
        assert_eq!(convert_coordinate("4916"), "49 deg 16 min");
    }

    #[test]
    fn convert_coordinate_short_head() {
        assert_eq!(convert_coordinate("5.5"), " deg 5.5 min");
    }

    #[test]
    fn format_time_drops_fraction() {
        assert_eq!(format_time("123519.00"), "12:35:19");
    }

    #[test]
    fn format_time_short_input_clamps() {
        assert_eq!(format_time("1235"), "12:35:");
    }

    #[test]
    fn format_date_packed() {
        assert_eq!(format_date("230394"), "23/03/94");
    }

    #[test]
    fn decode_rejects_short_payload() {
        let err = decode_position("+X: 1,2", &TEST_LAYOUT).unwrap_err();
        assert!(matches!(err, Error::Decode(ref m) if m == "Invalid GNSS data"));
    }

    #[test]
    fn decode_rejects_missing_keyword() {
        let err = decode_position("3113.343286,N,12121.234064,E", &TEST_LAYOUT).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn decode_full_payload() {
        let payload = "+CGPSINFO: 3113.343286,N,12121.234064,E,250311,072809.3,44.1,0.0,0";
        let fix = decode_position(payload, &TEST_LAYOUT).unwrap();
        assert_eq!(fix.latitude, "31 deg 13.343286 min");
        assert_eq!(fix.latitude_dir, "N");
        assert_eq!(fix.longitude, "121 deg 21.234064 min");
        assert_eq!(fix.longitude_dir, "E");
        assert_eq!(fix.date, "25/03/11");
        assert_eq!(fix.time, "07:28:09");
        assert_eq!(fix.altitude, "44.1");
        assert_eq!(fix.speed, "0.0");
        assert_eq!(fix.true_course, "0");
        assert_eq!(fix.error, NO_ERROR);
    }

    #[test]
    fn decode_empty_fields_are_empty_strings() {
        let fix = decode_position("+CGPSINFO: ,,,,,,,,", &TEST_LAYOUT).unwrap();
        assert_eq!(fix.latitude, "");
        assert_eq!(fix.longitude, "");
        assert_eq!(fix.time, "");
        assert_eq!(fix.date, "");
        assert_eq!(fix.error, NO_ERROR);
    }

    #[test]
    fn decode_missing_trailing_fields_are_empty() {
        let fix = decode_position("+CGPSINFO: 3113.3,N", &TEST_LAYOUT).unwrap();
        assert_eq!(fix.latitude, "31 deg 13.3 min");
        assert_eq!(fix.longitude, "");
        assert_eq!(fix.true_course, "");
    }

    #[test]
    fn decode_unreported_field_is_empty() {
        let layout = GnssLayout {
            speed: None,
            ..TEST_LAYOUT
        };
        let payload = "+CGPSINFO: 3113.343286,N,12121.234064,E,250311,072809.3,44.1,0.0,0";
        let fix = decode_position(payload, &layout).unwrap();
        assert_eq!(fix.speed, "");
        assert_eq!(fix.altitude, "44.1");
    }
}
