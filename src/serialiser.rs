use crate::error::Result;
use crate::srt::Subtitle;

use std::io::Write;

/// Serialise entries back to SRT text.
///
/// Ordinals are regenerated as 1-based positions regardless of what the input
/// file carried, so a filtered or range-extracted sequence stays well-formed.
pub fn format(entries: &[Subtitle]) -> String {
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&(i + 1).to_string());
        out.push('\n');
        out.push_str(&format_timestamp(entry.start));
        out.push_str(" --> ");
        out.push_str(&format_timestamp(entry.end));
        out.push('\n');
        for line in entry.text.lines() {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Serialise entries as SRT into a writer.
pub fn write_entries<W: Write>(writer: &mut W, entries: &[Subtitle]) -> Result<()> {
    writer.write_all(format(entries).as_bytes())?;
    Ok(())
}

/// Format seconds as an SRT timestamp, `HH:MM:SS,mmm`.
///
/// Fractional seconds are truncated into whole-millisecond buckets, never
/// rounded, so the decomposition exactly inverts the parser's field
/// arithmetic. Negative values clamp to zero; hours wider than two digits are
/// written as-is.
pub fn format_timestamp(seconds: f64) -> String {
    let total_millis = (seconds.max(0.0) * 1000.0) as u64;
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let seconds = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;
    format!(
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, seconds, millis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_format_ts {
        ($($name:ident: $value:expr,)*) => {
        $(
            #[test]
            fn $name() {
                let (input, expected) = $value;

                assert_eq!(format_timestamp(input), expected);
            }
        )*
        }
    }

    // Inputs stick to millisecond values with an exact binary representation
    // (multiples of 1/8 s) so the truncation is deterministic.
    test_format_ts! {
        test_format_ts_0: (0.0, "00:00:00,000"),
        test_format_ts_1: (0.125, "00:00:00,125"),
        test_format_ts_2: (0.5, "00:00:00,500"),
        test_format_ts_3: (1.0, "00:00:01,000"),
        test_format_ts_4: (5.5, "00:00:05,500"),
        test_format_ts_5: (8.25, "00:00:08,250"),
        test_format_ts_6: (59.875, "00:00:59,875"),
        test_format_ts_7: (60.0, "00:01:00,000"),
        test_format_ts_8: (3600.0, "01:00:00,000"),
        test_format_ts_9: (7326.125, "02:02:06,125"),
        test_format_ts_10: (34380.25, "09:33:00,250"),
        test_format_ts_11: (360000.125, "100:00:00,125"),
        test_format_ts_12: (-1.0, "00:00:00,000"),
    }

    #[test]
    fn format_emits_ordinals_timestamps_and_separators() {
        let entries = vec![
            Subtitle::new(1.0, 4.0, "Hello"),
            Subtitle::new(5.5, 8.25, "World\nLine2"),
        ];

        assert_eq!(
            format(&entries),
            "1\n00:00:01,000 --> 00:00:04,000\nHello\n\n\
             2\n00:00:05,500 --> 00:00:08,250\nWorld\nLine2\n\n"
        );
    }

    #[test]
    fn format_renumbers_from_one() {
        let entries = vec![Subtitle::new(10.0, 12.0, "late cue")];
        assert!(format(&entries).starts_with("1\n00:00:10,000"));
    }

    #[test]
    fn format_of_empty_sequence_is_empty() {
        assert_eq!(format(&[]), "");
    }

    #[test]
    fn write_entries_matches_format() {
        let entries = vec![Subtitle::new(0.0, 1.5, "x")];
        let mut buf = Vec::new();

        write_entries(&mut buf, &entries).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), format(&entries));
    }

    #[test]
    fn round_trip_preserves_entries_within_a_millisecond() {
        let entries = vec![
            Subtitle::new(0.0, 2.2, "One"),
            Subtitle::new(3.791, 5.003, "Two\nlines"),
            Subtitle::new(3600.5, 3661.999, "Third"),
        ];

        let reparsed = crate::parser::parse(&format(&entries));

        assert_eq!(reparsed.len(), entries.len());
        for (before, after) in entries.iter().zip(&reparsed) {
            assert!((before.start - after.start).abs() < 0.0011);
            assert!((before.end - after.end).abs() < 0.0011);
            assert_eq!(before.text, after.text);
        }
    }
}
