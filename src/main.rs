use std::io::{self, Read};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use regex::Regex;
use tracing_subscriber::EnvFilter;

use subtick::engine::Engine;
use subtick::serialiser::{self, format_timestamp};
use subtick::settings::{Settings, SettingsPatch};
use subtick::{parser, Subtitle};

fn main() {
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Match, retime and export SRT subtitles against a playback clock", version)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The SRT file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-",
        global = true
    )]
    input: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Settings file to load. Without this, subtick.toml is used when it exists.",
        global = true
    )]
    settings: Option<PathBuf>,
    #[arg(
        long,
        value_name = "SECONDS",
        help = "Display offset added to the playback clock, overriding the settings file.",
        allow_negative_numbers = true,
        global = true
    )]
    offset: Option<f64>,
    #[arg(long, help = "Disable subtitle matching.", global = true)]
    disabled: bool,
    #[arg(
        long,
        value_name = "MILLIS",
        help = "Polling cadence for playback simulation, overriding the settings file.",
        global = true
    )]
    interval_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print the cue active at a single playback time")]
    At {
        #[arg(value_name = "SECONDS", allow_negative_numbers = true)]
        time: f64,
    },
    #[command(about = "Simulate playback, polling the engine once per tick")]
    Play {
        #[arg(
            long,
            value_name = "SECONDS",
            default_value_t = 0.0,
            help = "Playback clock to start from."
        )]
        from: f64,
        #[arg(
            long,
            value_name = "SECONDS",
            help = "Playback clock to stop at. Defaults to the end of the track."
        )]
        to: Option<f64>,
        #[arg(
            long,
            value_name = "SECONDS",
            requires = "seek_to",
            help = "Clock at which to simulate a seek."
        )]
        seek_at: Option<f64>,
        #[arg(
            long,
            value_name = "SECONDS",
            requires = "seek_at",
            help = "Clock the simulated seek jumps to."
        )]
        seek_to: Option<f64>,
        #[arg(
            long,
            value_name = "FACTOR",
            default_value_t = 1.0,
            help = "Speed multiplier for the simulation. 0 runs without sleeping."
        )]
        speed: f64,
    },
    #[command(about = "Export the cues intersecting a playback window as SRT")]
    Range {
        #[arg(value_name = "FROM", allow_negative_numbers = true)]
        from: f64,
        #[arg(value_name = "TO", allow_negative_numbers = true)]
        to: f64,
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
            default_value = "-"
        )]
        output: String,
    },
    #[command(about = "Shift every cue by a signed number of seconds")]
    Shift {
        #[arg(value_name = "SECONDS", allow_negative_numbers = true)]
        delta: f64,
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
            default_value = "-"
        )]
        output: String,
    },
    #[command(about = "List the cues whose text matches a regular expression")]
    Find {
        #[arg(value_name = "PATTERN")]
        pattern: String,
    },
    #[command(about = "Summarise the loaded subtitle track")]
    Stats,
    #[command(about = "Print the effective settings as TOML")]
    Settings,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let mut settings =
        Settings::load(cli.settings.as_deref()).context("Failed to load settings")?;
    settings.apply(cli_patch(&cli));

    // Resolving settings never needs the subtitle input; answer before
    // touching stdin so `subtick settings` does not block on a pipe.
    if let Command::Settings = cli.command {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    let data = read_input(&cli.input)?;
    let entries = parser::parse(&data);
    if entries.is_empty() {
        tracing::warn!(input = cli.input.as_str(), "no usable subtitle entries");
    }

    let mut engine = Engine::new();
    engine.load_entries(entries);
    engine.set_offset(settings.offset);
    engine.set_enabled(settings.enabled);

    match cli.command {
        Command::At { time } => {
            if let Some(cue) = engine.lookup(time) {
                println!("{}", cue.text);
            }
        }
        Command::Play {
            from,
            to,
            seek_at,
            seek_to,
            speed,
        } => {
            play(&mut engine, &settings, from, to, seek_at.zip(seek_to), speed);
        }
        Command::Range { from, to, output } => {
            let cues = engine.range_query(from, to);
            write_output(&output, &cues)?;
        }
        Command::Shift { delta, output } => {
            let shifted = shift(engine.entries(), delta);
            write_output(&output, &shifted)?;
        }
        Command::Find { pattern } => {
            let regex = Regex::new(&pattern).context("Invalid search pattern")?;
            for cue in engine.entries() {
                if cue.text.lines().any(|line| regex.is_match(line)) {
                    println!(
                        "{} --> {}  {}",
                        format_timestamp(cue.start),
                        format_timestamp(cue.end),
                        cue.text.replace('\n', " / ")
                    );
                }
            }
        }
        Command::Stats => {
            let stats = engine.stats();
            println!("Entries:          {}", stats.count);
            println!("Track length:     {}", format_timestamp(stats.total_duration));
            println!("Average cue text: {:.1} chars", stats.average_text_chars);
            println!("Longest cue text: {} chars", stats.longest_text_chars);
            println!("Offset:           {:+.3}s", engine.offset());
            println!("Enabled:          {}", engine.is_enabled());
        }
        // Handled above, before the input was read.
        Command::Settings => {}
    }

    Ok(())
}

/// Drive the engine with a simulated playback clock, printing a line for
/// every cue transition. This is the polling loop a real host would run.
fn play(
    engine: &mut Engine,
    settings: &Settings,
    from: f64,
    to: Option<f64>,
    seek: Option<(f64, f64)>,
    speed: f64,
) {
    let tick = Duration::from_millis(settings.tick_interval_ms.max(1));
    let step = tick.as_secs_f64();
    // The last cue ends at total_duration in adjusted time; undo the offset
    // to get the playback clock that reaches it.
    let end = to.unwrap_or_else(|| (engine.stats().total_duration - engine.offset()).max(from));

    let mut pending_seek = seek;
    let mut clock = from;
    let mut current: Option<String> = None;

    while clock <= end {
        if let Some((at, target)) = pending_seek {
            if clock >= at {
                println!(
                    "[{}] seek -> {}",
                    format_timestamp(clock),
                    format_timestamp(target)
                );
                clock = target;
                engine.reset_cursor();
                pending_seek = None;
            }
        }

        let hit = engine.lookup(clock).map(|cue| cue.text.clone());
        if hit != current {
            match &hit {
                Some(text) => println!(
                    "[{}] {}",
                    format_timestamp(clock),
                    text.replace('\n', " / ")
                ),
                None => println!("[{}] ---", format_timestamp(clock)),
            }
            current = hit;
        }

        if speed > 0.0 {
            thread::sleep(tick.div_f64(speed));
        }
        clock += step;
    }
}

/// Retime a cue sequence by `delta` seconds. Cues pushed entirely before
/// zero are dropped; a cue straddling zero keeps its tail.
fn shift(entries: &[Subtitle], delta: f64) -> Vec<Subtitle> {
    entries
        .iter()
        .filter_map(|cue| {
            let mut cue = cue.clone();
            cue.start = (cue.start + delta).max(0.0);
            cue.end += delta;
            (cue.end > cue.start).then_some(cue)
        })
        .collect()
}

fn cli_patch(cli: &Cli) -> SettingsPatch {
    SettingsPatch {
        offset: cli.offset,
        enabled: cli.disabled.then_some(false),
        tick_interval_ms: cli.interval_ms,
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).context(format!("Failed to open input file: '{}'", input))
    }
}

fn write_output(output: &str, entries: &[Subtitle]) -> Result<()> {
    if output == "-" {
        let mut dst = io::stdout();
        serialiser::write_entries(&mut dst, entries)?;
    } else {
        let mut dst = std::fs::File::create(output)
            .context(format!("Failed to create output file: '{}'", output))?;
        serialiser::write_entries(&mut dst, entries)?;
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "subtick=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(start: f64, end: f64, text: &str) -> Subtitle {
        Subtitle::new(start, end, text)
    }

    #[test]
    fn shift_moves_both_endpoints() {
        let shifted = shift(&[cue(1.0, 2.0, "a")], 1.5);

        assert_eq!(shifted.len(), 1);
        assert_eq!(shifted[0].start, 2.5);
        assert_eq!(shifted[0].end, 3.5);
    }

    #[test]
    fn shift_clips_a_cue_straddling_zero() {
        let shifted = shift(&[cue(1.0, 3.0, "a")], -2.0);

        assert_eq!(shifted.len(), 1);
        assert_eq!(shifted[0].start, 0.0);
        assert_eq!(shifted[0].end, 1.0);
    }

    #[test]
    fn shift_drops_cues_pushed_entirely_before_zero() {
        let shifted = shift(&[cue(1.0, 2.0, "gone"), cue(5.0, 6.0, "kept")], -3.0);

        assert_eq!(shifted.len(), 1);
        assert_eq!(shifted[0].text, "kept");
        assert_eq!(shifted[0].start, 2.0);
    }

    #[test]
    fn cli_patch_maps_disabled_flag_to_enabled_false() {
        let cli = Cli {
            input: "-".into(),
            settings: None,
            offset: Some(2.0),
            disabled: true,
            interval_ms: None,
            command: Command::Stats,
        };

        let patch = cli_patch(&cli);

        assert_eq!(patch.offset, Some(2.0));
        assert_eq!(patch.enabled, Some(false));
        assert_eq!(patch.tick_interval_ms, None);
    }

    #[test]
    fn cli_parses_a_play_invocation() {
        let cli = Cli::try_parse_from([
            "subtick",
            "play",
            "--from",
            "10",
            "--seek-at",
            "12",
            "--seek-to",
            "40",
            "--offset",
            "-1.5",
            "-i",
            "subs.srt",
        ])
        .unwrap();

        assert_eq!(cli.input, "subs.srt");
        assert_eq!(cli.offset, Some(-1.5));
        match cli.command {
            Command::Play { from, seek_at, seek_to, .. } => {
                assert_eq!(from, 10.0);
                assert_eq!(seek_at, Some(12.0));
                assert_eq!(seek_to, Some(40.0));
            }
            _ => panic!("expected play subcommand"),
        }
    }

    #[test]
    fn cli_rejects_a_seek_time_without_a_target() {
        let result = Cli::try_parse_from(["subtick", "play", "--seek-at", "12"]);

        assert!(result.is_err());
    }
}
