//! Subtitle timing engine.
//!
//! Owns the loaded entry sequence, a signed display offset, an enable flag,
//! and a cached cursor pointing at the most recently matched entry. The host
//! polls [`Engine::lookup`] with its playback clock at a fixed cadence; under
//! normal forward playback the answer is almost always the cached entry or
//! its successor, so the lookup stays O(1) amortized and only falls back to a
//! binary search after seeks or other discontinuities.

use crate::srt::Subtitle;

/// Derived, read-only summary of the loaded entries.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStats {
    pub count: usize,
    /// End time of the last entry in seconds; 0 when nothing is loaded.
    pub total_duration: f64,
    /// Mean cue text length in Unicode chars.
    pub average_text_chars: f64,
    /// Longest cue text length in Unicode chars.
    pub longest_text_chars: usize,
}

/// The timing engine. One instance per subtitle track, owned by the host and
/// driven from a single sequential caller; all mutation goes through
/// `&mut self`, so there is no interior locking to reason about.
///
/// Entries are trusted to be sorted ascending by start time and
/// non-overlapping, as the interchange format convention has them. Nothing is
/// validated at load time; lookups against a sequence that breaks the
/// convention return unspecified (but memory-safe) results.
#[derive(Debug)]
pub struct Engine {
    entries: Vec<Subtitle>,
    offset: f64,
    enabled: bool,
    cursor: Option<usize>,
    // Fallback searches performed since construction. Read by tests to pin
    // the neighbour-stepping behaviour; not part of the stats view.
    full_searches: u64,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            offset: 0.0,
            enabled: true,
            cursor: None,
            full_searches: 0,
        }
    }

    /// Replace the entry sequence wholesale and forget the cached position.
    ///
    /// Entries must be sorted by start and non-overlapping; see the type
    /// docs. This is the only load-time contract.
    pub fn load_entries(&mut self, entries: Vec<Subtitle>) {
        tracing::debug!(entries = entries.len(), "loading subtitle entries");
        self.entries = entries;
        self.cursor = None;
    }

    /// Drop all entries and the cached position.
    pub fn clear(&mut self) {
        tracing::debug!("clearing subtitle entries");
        self.entries.clear();
        self.cursor = None;
    }

    /// Replace the display offset, in seconds.
    ///
    /// The cursor is invalidated: a new offset moves every cue relative to
    /// the playback clock, so the cached position no longer says anything
    /// about where the next match will land.
    pub fn set_offset(&mut self, offset: f64) {
        tracing::debug!(offset, "setting subtitle offset");
        self.offset = offset;
        self.cursor = None;
    }

    /// Enable or disable matching. Toggling keeps the cached position, so
    /// re-enabling mid-playback resumes with full locality.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Forget the cached position.
    ///
    /// The engine never detects seeks itself; the host must call this after
    /// any playback discontinuity, because the neighbour checks in `lookup`
    /// assume consecutive calls are close together in time.
    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }

    /// Find the entry active at `playback_time`, if any.
    ///
    /// The display offset is added to the playback time before matching.
    /// Containment is inclusive on both ends of a cue. Every branch is a
    /// plain return; nothing allocates or logs on this path.
    pub fn lookup(&mut self, playback_time: f64) -> Option<&Subtitle> {
        if !self.enabled || self.entries.is_empty() {
            return None;
        }
        let adjusted = playback_time + self.offset;

        if let Some(cursor) = self.cursor {
            // Steady-state polling nearly always lands on the cached entry
            // again, or on a neighbour right as a cue changes over; check
            // those three before paying for a search.
            if self.entries[cursor].contains(adjusted) {
                return Some(&self.entries[cursor]);
            }
            if cursor + 1 < self.entries.len() && self.entries[cursor + 1].contains(adjusted) {
                self.cursor = Some(cursor + 1);
                return Some(&self.entries[cursor + 1]);
            }
            if cursor > 0 && self.entries[cursor - 1].contains(adjusted) {
                self.cursor = Some(cursor - 1);
                return Some(&self.entries[cursor - 1]);
            }
        }

        match self.search(adjusted) {
            Some(index) => {
                self.cursor = Some(index);
                Some(&self.entries[index])
            }
            // A miss keeps the previous cursor: in the gap between two cues
            // the next match is still likely adjacent to it.
            None => None,
        }
    }

    /// Containment binary search over the whole sequence. Sorted,
    /// non-overlapping entries mean at most one can contain `time`.
    fn search(&mut self, time: f64) -> Option<usize> {
        self.full_searches += 1;
        let mut low = 0;
        let mut high = self.entries.len();
        while low < high {
            let mid = low + (high - low) / 2;
            let entry = &self.entries[mid];
            if time < entry.start {
                high = mid;
            } else if time > entry.end {
                low = mid + 1;
            } else {
                return Some(mid);
            }
        }
        None
    }

    /// All entries whose span intersects `[start + offset, end + offset]`,
    /// in order, as clones the caller can re-serialise or re-time freely.
    /// Linear scan; this is the batch path, not the per-tick one.
    pub fn range_query(&self, start: f64, end: f64) -> Vec<Subtitle> {
        let (start, end) = (start + self.offset, end + self.offset);
        self.entries
            .iter()
            .filter(|entry| entry.start <= end && entry.end >= start)
            .cloned()
            .collect()
    }

    /// Summarise the loaded entries. Pure function of current state.
    pub fn stats(&self) -> EngineStats {
        let count = self.entries.len();
        let total_duration = self.entries.last().map_or(0.0, |entry| entry.end);

        let mut total_chars = 0usize;
        let mut longest_text_chars = 0usize;
        for entry in &self.entries {
            let chars = entry.text.chars().count();
            total_chars += chars;
            longest_text_chars = longest_text_chars.max(chars);
        }
        let average_text_chars = if count == 0 {
            0.0
        } else {
            total_chars as f64 / count as f64
        };

        EngineStats {
            count,
            total_duration,
            average_text_chars,
            longest_text_chars,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Subtitle] {
        &self.entries
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}
