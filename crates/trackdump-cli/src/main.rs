//! trackdump CLI
//!
//! Converts a text dump of simulated events into Phoenix event-display JSON,
//! and merges converted files.
//!
//! Examples:
//!   trackdump run.txt                      - writes run.json
//!   trackdump run.txt -o out.json -p sim   - custom output and event prefix
//!   trackdump - --mark-recoil              - stdin to stdout
//!   trackdump merge a.json b.json -o all.json

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};

use facet::Facet;
use figue as args;
use trackdump::merge::{DEFAULT_MERGE_OUTPUT, MERGE_INDENT, MergeError, merge_files};
use trackdump::{ConvertOptions, Error, color, convert_str, write_json};

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_SYNTAX_ERROR: i32 = 1;
const EXIT_CONFIG_ERROR: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// File mode arguments: `trackdump <input> [options]`
#[derive(Facet, Debug, Default)]
struct FileArgs {
    /// Input file path (or "-" for stdin)
    #[facet(args::positional)]
    input: String,

    /// Output file (default: input with .txt replaced by .json)
    #[facet(args::named, args::short = 'o', default)]
    output_file: Option<String>,

    /// Prefix for event names
    #[facet(args::named, args::short = 'p', default = "event")]
    event_prefix: String,

    /// Mark the first electron of each event with a special color
    #[facet(args::named, default)]
    mark_recoil: bool,

    /// Palette color used by --mark-recoil
    #[facet(args::named, default = "radiant_red")]
    recoil_color: String,
}

/// Top-level CLI with optional subcommand
#[derive(Facet, Debug)]
struct Args {
    /// Subcommand to run
    #[facet(args::subcommand, default)]
    command: Option<Command>,
}

/// Available subcommands
#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    /// Merge converted event files; later files win on name collisions
    Merge {
        /// Input JSON files
        #[facet(args::positional)]
        inputs: Vec<String>,

        /// Output file
        #[facet(args::named, args::short = 'o', default = "combined_data.json")]
        output: String,
    },
}

const SUBCOMMANDS: &[&str] = &["merge"];

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let raw_args: Vec<String> = std::env::args().skip(1).collect();

    if raw_args.is_empty() {
        print_help();
        std::process::exit(EXIT_SUCCESS);
    }

    if raw_args[0] == "--version" || raw_args[0] == "-V" {
        println!("trackdump {VERSION}");
        std::process::exit(EXIT_SUCCESS);
    }

    if raw_args[0] == "--help" || raw_args[0] == "-h" {
        print_help();
        std::process::exit(EXIT_SUCCESS);
    }

    init_tracing();

    let result = if SUBCOMMANDS.contains(&raw_args[0].as_str()) {
        run_subcommand_mode(&raw_args)
    } else {
        run_file_mode(&raw_args)
    };

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            match &e {
                CliError::Convert {
                    error,
                    source,
                    filename,
                } => error.write_report(filename, source, io::stderr()),
                _ => eprintln!("error: {e}"),
            }
            std::process::exit(e.exit_code());
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn print_help() {
    eprintln!("trackdump {VERSION} - convert simulation track dumps to Phoenix JSON\n");
    eprintln!("USAGE:");
    eprintln!("    trackdump <input> [options]     Convert a dump ('-' for stdin)");
    eprintln!("    trackdump merge <files...>      Merge converted JSON files\n");
    eprintln!("CONVERT OPTIONS:");
    eprintln!("    -o, --output-file <FILE>        Output file (default: <input>.json, '-' for stdout)");
    eprintln!("    -p, --event-prefix <PREFIX>     Prefix for event names (default: event)");
    eprintln!("        --mark-recoil               Highlight the first e- track of each event");
    eprintln!("        --recoil-color <NAME>       Highlight color (default: {})\n", color::RECOIL_HIGHLIGHT);
    eprintln!("MERGE OPTIONS:");
    eprintln!("    -o, --output <FILE>             Output file (default: {DEFAULT_MERGE_OUTPUT})\n");
    eprintln!("COLORS:");
    for (name, value) in color::PALETTE {
        eprintln!("    {name:<12} {value}");
    }
    eprintln!("\nLogging is controlled with RUST_LOG (e.g. RUST_LOG=trackdump=debug).");
}

fn run_file_mode(args: &[String]) -> Result<(), CliError> {
    let args_strs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let opts: FileArgs =
        figue::from_slice(&args_strs).into_result().map(|o| o.value).map_err(|e| CliError::Usage(format!("{e:?}")))?;

    let output = match opts.output_file {
        Some(ref output) => output.clone(),
        None => default_output_path(&opts.input),
    };

    if opts.input != "-" && output != "-" && is_same_file(&opts.input, &output) {
        return Err(CliError::Usage(
            "input and output are the same file".into(),
        ));
    }

    let options = ConvertOptions::new()
        .event_prefix(opts.event_prefix.as_str())
        .mark_recoil(opts.mark_recoil)
        .recoil_color(opts.recoil_color.as_str());

    tracing::info!(
        prefix = %options.event_prefix,
        mark_recoil = options.mark_recoil,
        input = %opts.input,
        output = %output,
        "converting"
    );

    let source = read_input(&opts.input)?;
    let filename = if opts.input == "-" {
        "<stdin>".to_string()
    } else {
        opts.input.clone()
    };

    let conversion = convert_str(&source, &options).map_err(|error| match error {
        Error::Lookup(e) => CliError::Config(e.to_string()),
        Error::Io(e) => CliError::Io(e),
        error => CliError::Convert {
            error,
            source: source.clone(),
            filename: filename.clone(),
        },
    })?;

    let summary = conversion.summary;
    tracing::info!(
        events = summary.events,
        tracks = summary.tracks,
        points = summary.points,
        replaced = summary.replaced_events,
        recoil_marked = summary.recoil_marked,
        "converted"
    );

    write_output(&output, |w| write_json(&conversion.events, w, options.indent))?;
    Ok(())
}

fn run_subcommand_mode(args: &[String]) -> Result<(), CliError> {
    let args_strs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    let parsed: Args =
        figue::from_slice(&args_strs).into_result().map(|o| o.value).map_err(|e| CliError::Usage(format!("{e:?}")))?;

    match parsed.command {
        Some(Command::Merge { inputs, output }) => run_merge(&inputs, &output),
        None => {
            print_help();
            Ok(())
        }
    }
}

fn run_merge(inputs: &[String], output: &str) -> Result<(), CliError> {
    if inputs.is_empty() {
        return Err(CliError::Usage("merge needs at least one input file".into()));
    }
    let merged = merge_files(inputs)?;
    tracing::info!(files = inputs.len(), events = merged.len(), output, "merged");
    write_output(output, |w| write_json(&merged, w, MERGE_INDENT))?;
    Ok(())
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io(io::Error),
    Convert {
        error: Error,
        source: String,
        filename: String,
    },
    Merge(MergeError),
    Config(String),
    Usage(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io(_) => EXIT_IO_ERROR,
            CliError::Convert { .. } => EXIT_SYNTAX_ERROR,
            CliError::Merge(MergeError::Io { .. }) => EXIT_IO_ERROR,
            CliError::Merge(_) => EXIT_SYNTAX_ERROR,
            CliError::Config(_) => EXIT_CONFIG_ERROR,
            CliError::Usage(_) => EXIT_SYNTAX_ERROR,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Convert { error, .. } => write!(f, "{error}"),
            CliError::Merge(e) => write!(f, "{e}"),
            CliError::Config(e) => write!(f, "{e}"),
            CliError::Usage(e) => write!(f, "{e}"),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<MergeError> for CliError {
    fn from(e: MergeError) -> Self {
        CliError::Merge(e)
    }
}

// ============================================================================
// I/O helpers
// ============================================================================

/// Output path used when none is given: `.txt` becomes `.json`, any other
/// name gets `.json` appended. Stdin input goes to stdout.
fn default_output_path(input: &str) -> String {
    if input == "-" {
        return "-".to_string();
    }
    match input.strip_suffix(".txt") {
        Some(stem) => format!("{stem}.json"),
        None => format!("{input}.json"),
    }
}

fn read_input(path: &str) -> Result<String, io::Error> {
    if path == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path)
    }
}

fn write_output<F>(path: &str, write: F) -> Result<(), io::Error>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    if path == "-" {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        write(&mut lock)
    } else {
        let mut file = BufWriter::new(File::create(path)?);
        write(&mut file)?;
        file.flush()
    }
}

fn is_same_file(a: &str, b: &str) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
