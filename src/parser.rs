use crate::srt::Subtitle;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::character::complete::space0;
use nom::combinator::map_res;
use nom::IResult;

/// Parse SRT text into entries, in file order.
///
/// The parse never fails as a whole: a block that is missing its timing line
/// or resolves to empty text is skipped with a warning and the rest of the
/// input still goes through. Empty or fully unparsable input yields an empty
/// sequence. Callers that need sorted, non-overlapping entries rely on the
/// source file being authored that way; nothing is re-sorted here.
pub fn parse(input: &str) -> Vec<Subtitle> {
    let input = input.strip_prefix('\u{FEFF}').unwrap_or(input);

    let mut entries = Vec::new();
    for (index, block) in blocks(input).into_iter().enumerate() {
        match parse_block(&block) {
            Some(entry) => entries.push(entry),
            None => tracing::warn!(
                block = index + 1,
                first_line = block[0],
                "skipping malformed subtitle block"
            ),
        }
    }
    tracing::debug!(entries = entries.len(), "parsed subtitle input");
    entries
}

/// Split input into runs of non-blank lines. A line is blank when it is empty
/// after trimming, so stray whitespace between blocks still separates them.
/// `str::lines` drops the `\r` of CRLF endings.
fn blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Parse one block: an optional ordinal line, the timing line, then text.
///
/// The timing line sits at the first or second line of the block; in the
/// latter case the first line is the ordinal, which is ignored without being
/// validated (serialisation regenerates ordinals anyway). Returns `None` for
/// any block the format does not account for.
fn parse_block(lines: &[&str]) -> Option<Subtitle> {
    let (timing_index, (start, end)) = lines
        .iter()
        .take(2)
        .enumerate()
        .find_map(|(index, line)| timing(line).map(|times| (index, times)))?;

    let text = lines[timing_index + 1..]
        .iter()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    if text.trim().is_empty() {
        return None;
    }

    Some(Subtitle::new(start, end, text))
}

/// Match a complete timing line, `HH:MM:SS,mmm --> HH:MM:SS,mmm`. Anything
/// left over besides surrounding whitespace disqualifies the line.
fn timing(line: &str) -> Option<(f64, f64)> {
    match timing_line(line.trim()) {
        Ok(("", times)) => Some(times),
        _ => None,
    }
}

fn timing_line(input: &str) -> IResult<&str, (f64, f64)> {
    let (input, start) = timestamp(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space0(input)?;
    let (input, end) = timestamp(input)?;

    Ok((input, (start, end)))
}

/// `HH:MM:SS,mmm` with exactly two digits per clock field and exactly three
/// millisecond digits, as the interchange format prescribes. Each field is
/// parsed as a plain integer, so the conversion is locale-independent.
fn timestamp(input: &str) -> IResult<&str, f64> {
    let (input, hours) = fixed_digits(input, 2)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = fixed_digits(input, 2)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = fixed_digits(input, 2)?;
    let (input, _) = tag(",")(input)?;
    let (input, millis) = fixed_digits(input, 3)?;

    let seconds = (hours * 3600 + minutes * 60 + seconds) as f64 + millis as f64 / 1000.0;
    Ok((input, seconds))
}

fn fixed_digits(input: &str, width: usize) -> IResult<&str, u64> {
    map_res(
        take_while_m_n(width, width, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse(),
    )(input)
}
