use crate::error::ProcessingError;
use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

/// Transform an uploaded object, stamping it with the current time
pub fn apply(raw: &[u8]) -> Result<String, ProcessingError> {
    apply_at(raw, Utc::now())
}

/// Transform an uploaded object
///
/// The content must be UTF-8. It is uppercased and prefixed with a
/// `Processed at: <timestamp>` line followed by a blank line.
pub fn apply_at(raw: &[u8], processed_at: DateTime<Utc>) -> Result<String, ProcessingError> {
    let text = std::str::from_utf8(raw)?;

    let processed = format!(
        "Processed at: {}\n\n{}",
        processed_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        text.to_uppercase()
    );

    debug!(
        input_bytes = raw.len(),
        output_bytes = processed.len(),
        "Data processing completed"
    );

    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn header_timestamp(output: &str) -> DateTime<Utc> {
        let first_line = output.lines().next().unwrap();
        let timestamp = first_line.strip_prefix("Processed at: ").unwrap();
        DateTime::parse_from_rfc3339(timestamp)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_hello_world() {
        let result = apply(b"hello world").unwrap();

        assert!(result.contains("HELLO WORLD"));
        assert!(result.starts_with("Processed at: "));
    }

    #[test]
    fn test_exact_layout() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 45).unwrap();
        let result = apply_at(b"line one\nline two", at).unwrap();

        assert_eq!(
            result,
            "Processed at: 2024-01-15T10:30:45.000000Z\n\nLINE ONE\nLINE TWO"
        );
    }

    #[test]
    fn test_header_is_call_time() {
        let before = Utc::now();
        let result = apply(b"data").unwrap();
        let after = Utc::now();

        let stamped = header_timestamp(&result);
        // The header carries microsecond precision
        assert!(stamped >= before - Duration::microseconds(1) && stamped <= after);
    }

    #[test]
    fn test_unicode_uppercase() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let result = apply_at("straße ñandú ǆ".as_bytes(), at).unwrap();

        assert!(result.ends_with("STRASSE ÑANDÚ Ǆ"));
    }

    #[test]
    fn test_empty_input() {
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let result = apply_at(b"", at).unwrap();

        assert_eq!(result, "Processed at: 2024-01-15T00:00:00.000000Z\n\n");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let inputs: [&[u8]; 3] = [b"\xff\xfe", b"valid prefix \xc3\x28", b"\xe2\x82"];

        for input in inputs {
            let err = apply(input).unwrap_err();
            assert!(matches!(err, ProcessingError::Decode(_)));
        }
    }
}
