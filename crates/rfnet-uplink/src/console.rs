//! Local console rendering, used when no collector endpoint is configured.

use crate::error::{UplinkError, UplinkResult};
use chrono::{DateTime, Local, TimeZone};
use rfnet_core::Reading;

/// Render one reading in the local timezone.
///
/// Fails on a sensor id or reading type outside the known tables.
pub fn render_line(reading: &Reading) -> UplinkResult<String> {
    render_line_in(reading, &Local)
}

/// Render one reading in `tz`.
pub fn render_line_in<Tz>(reading: &Reading, tz: &Tz) -> UplinkResult<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let slot = reading.slot()?;
    let rtype = reading.reading_type()?;
    let nanos = i64::try_from(reading.time).map_err(|_| UplinkError::Timestamp(reading.time))?;
    let at = DateTime::from_timestamp_nanos(nanos).with_timezone(tz);

    Ok(format!(
        "{} {:<20} {:>13} = {:5.3} ({})",
        at.format("%Y-%m-%d %H:%M:%S"),
        slot.display_name(),
        rtype.label(),
        reading.value,
        reading.seqno
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rfnet_core::CoreError;

    fn reading(sensor_id: u8, rtype: u16) -> Reading {
        Reading {
            time: 1_700_000_000_000_000_000,
            sensor_id,
            seqno: 42,
            rtype,
            value: 21.5,
        }
    }

    #[test]
    fn test_render_known_sensor() {
        let line = render_line_in(&reading(2, 1), &Utc).unwrap();
        assert_eq!(
            line,
            "2023-11-14 22:13:20 Sensor 3             T_TEMPERATURE = 21.500 (42)"
        );
    }

    #[test]
    fn test_render_unknown_sensor_fails_closed() {
        let err = render_line_in(&reading(6, 1), &Utc).unwrap_err();
        assert!(matches!(
            err,
            UplinkError::Render(CoreError::UnknownSensor(6))
        ));
    }

    #[test]
    fn test_render_unknown_type_fails_closed() {
        let err = render_line_in(&reading(0, 4), &Utc).unwrap_err();
        assert!(matches!(
            err,
            UplinkError::Render(CoreError::UnknownReadingType(4))
        ));
    }
}
