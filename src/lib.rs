//! Subtitle timing for a polling host.
//!
//! The [`engine::Engine`] owns a parsed subtitle track and answers "which
//! cue is on screen now?" against a playback clock, amortizing consecutive
//! lookups through a cached cursor. The [`parser`] and [`serialiser`]
//! modules read and write the SubRip interchange format, leniently on the
//! way in and canonically on the way out.
//!
//! ```
//! use subtick::{parser, Engine};
//!
//! let entries = parser::parse("1\n00:00:01,000 --> 00:00:04,000\nHello\n");
//! let mut engine = Engine::new();
//! engine.load_entries(entries);
//! engine.set_offset(0.5);
//!
//! assert_eq!(engine.lookup(1.0).map(|cue| cue.text.as_str()), Some("Hello"));
//! ```

pub mod engine;
pub mod error;
pub mod parser;
pub mod serialiser;
pub mod settings;
pub mod srt;

pub use engine::{Engine, EngineStats};
pub use error::{Result, SubtickError};
pub use srt::Subtitle;
