/// A single subtitle cue: a span of playback time and the text shown during it.
///
/// Times are seconds from the start of playback. `start` is never negative and
/// `end` is always after `start` in well-formed input; the parser only emits
/// cues that satisfy the format, but nothing re-checks cues built by hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtitle {
    pub start: f64,
    pub end: f64,
    /// Display text. Multi-line cues keep their internal line breaks as `'\n'`.
    pub text: String,
}

impl Subtitle {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Whether `time` falls inside this cue's span, inclusive on both ends.
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Length of the visible span in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_inclusive_on_both_ends() {
        let sub = Subtitle::new(1.0, 4.0, "Hello");
        assert!(sub.contains(1.0));
        assert!(sub.contains(2.5));
        assert!(sub.contains(4.0));
        assert!(!sub.contains(0.999));
        assert!(!sub.contains(4.001));
    }

    #[test]
    fn duration_spans_start_to_end() {
        assert_eq!(Subtitle::new(5.5, 8.25, "x").duration(), 2.75);
    }
}
