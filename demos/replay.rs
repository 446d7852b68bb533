// Capture replay example
//
// Feeds transfer words from a text file (or stdin) through a logic capture
// session and prints every released window as ASCII traces.
//
// Words may be written as decimal, 0x/$ hex or 0b/% binary, separated by
// whitespace or commas. A line reading `clear` resets the capture.

use clap::Parser;
use logic_capture::{DrawDecision, LogicConfig, LogicSession, PackedMode, TriggerSpec};
use std::io::{self, BufRead, BufReader};

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Replay captured transfer words through the logic trigger")]
struct Args {
    /// File with transfer words, stdin when omitted
    input: Option<std::path::PathBuf>,

    #[arg(short, long, default_value_t = 32, help = "Samples shown per window")]
    window: usize,

    #[arg(short, long, default_value_t = 8, help = "Number of channels to print")]
    channels: usize,

    #[arg(long, num_args = 1.., help = "Packed mode tokens, e.g. LONGS_4BIT ALT")]
    packed: Vec<String>,

    #[arg(long, value_parser = parse_word, help = "Trigger mask (0 disables the trigger)")]
    mask: Option<u32>,

    #[arg(long = "match", value_parser = parse_word, default_value = "0")]
    match_bits: u32,

    #[arg(long, help = "Samples behind the newest the trigger checks")]
    offset: Option<usize>,

    #[arg(long, help = "Minimum samples between captures")]
    holdoff: Option<usize>,

    #[arg(short, long, help = "Show debug information and detailed logs")]
    verbose: bool,
}

fn parse_word(text: &str) -> Result<u32, String> {
    let text = text.trim().replace('_', "");
    let parsed = if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix('$')) {
        u32::from_str_radix(hex, 16)
    } else if let Some(bin) = text.strip_prefix("0b").or_else(|| text.strip_prefix('%')) {
        u32::from_str_radix(bin, 2)
    } else {
        text.parse()
    };
    parsed.map_err(|e| format!("invalid word '{}': {}", text, e))
}

fn print_window(session: &LogicSession) {
    let Some(window) = session.draw_window() else {
        return;
    };
    println!(
        "--- {} window, {} samples ---",
        if window.triggered { "triggered" } else { "live" },
        window.len
    );
    for (channel, trace) in session.channel_traces().iter().enumerate() {
        let line: String = trace.iter().map(|&bit| if bit { '#' } else { '_' }).collect();
        println!("{:>3} {}", channel, line);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let mode = if args.packed.is_empty() {
        PackedMode::UNPACKED
    } else {
        PackedMode::from_tokens(args.packed.iter().map(String::as_str))?
    };

    let mut trigger = match args.mask {
        Some(mask) => TriggerSpec::new(mask, args.match_bits),
        None => TriggerSpec::disabled(),
    };
    trigger.lookback_offset = args.offset;
    trigger.holdoff = args.holdoff;

    let (mut session, warnings) = LogicSession::new(
        LogicConfig::new()
            .with_window_size(args.window)
            .with_channels(args.channels)
            .with_mode(mode)
            .with_trigger(trigger),
    );
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(std::fs::File::open(path)?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut shown: Option<usize> = None;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.eq_ignore_ascii_case("clear") {
            session.clear();
            shown = None;
            continue;
        }
        for token in line.split(|c: char| c.is_whitespace() || c == ',') {
            if token.is_empty() {
                continue;
            }
            let word = parse_word(token)?;
            // A held trigger keeps redrawing the same frozen window.
            if let DrawDecision::Redraw { end_pointer } = session.push_word(word) {
                if session.config().trigger.is_active() && shown != Some(end_pointer) {
                    print_window(&session);
                    shown = Some(end_pointer);
                }
            }
        }
    }

    if !session.config().trigger.is_active() {
        print_window(&session);
    }

    let stats = session.stats();
    println!(
        "{} words, {} samples, {} captures",
        stats.words_pushed, stats.samples_pushed, stats.captures
    );
    Ok(())
}
