/// LateBind - interpolated pattern filter
///
/// Builds a pattern from the given fragments through a pattern call site and
/// prints every input line it matches.
use latebind::backend::*;
use std::env;
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("LateBind v{}", VERSION);
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    latebind [OPTIONS] <FRAGMENT>...");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -h, --help             Print this help message");
    eprintln!("    -V, --version          Print version information");
    eprintln!("    -i                     Ignore case");
    eprintln!("    -m                     Let '.' match newlines");
    eprintln!("    -x                     Extended syntax (ignore whitespace and comments)");
    eprintln!("    -n                     No encoding (byte-oriented pattern)");
    eprintln!("    -u                     Fixed encoding (UTF-8)");
    eprintln!("    -c, --config <FILE>    Read cache limits from a TOML file");
    eprintln!("    --input <FILE>         Read input from FILE (default: stdin)");
    eprintln!("    --count                Print the number of matching lines only");
    eprintln!("    -v, --verbose          Log cache activity to stderr");
    eprintln!();
    eprintln!("ARGUMENTS:");
    eprintln!("    <FRAGMENT>...          Pattern fragments, joined in order");
    eprintln!();
    eprintln!("EXAMPLES:");
    eprintln!("    latebind -i 'err' 'or'");
    eprintln!("    cat app.log | latebind --count 'timeout'");
}

fn print_version() {
    println!("LateBind {}", VERSION);
}

struct Options {
    fragments: Vec<String>,
    flags: String,
    config: Option<PathBuf>,
    input: Option<PathBuf>,
    count_only: bool,
    verbose: bool,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();

    let mut fragments = Vec::new();
    let mut flags = String::new();
    let mut config = None;
    let mut input = None;
    let mut count_only = false;
    let mut verbose = false;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            "-V" | "--version" => {
                print_version();
                process::exit(0);
            }
            "-i" | "-m" | "-x" | "-n" | "-u" => {
                flags.push_str(&args[i][1..]);
            }
            "-c" | "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing file after --config".to_string());
                }
                config = Some(PathBuf::from(&args[i]));
            }
            "--input" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing file after --input".to_string());
                }
                input = Some(PathBuf::from(&args[i]));
            }
            "--count" => {
                count_only = true;
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "--" => {
                fragments.extend(args[i + 1..].iter().cloned());
                break;
            }
            arg if arg.starts_with('-') && arg.len() > 1 => {
                return Err(format!("Unknown option: {}", arg));
            }
            arg => {
                fragments.push(arg.to_string());
            }
        }
        i += 1;
    }

    if fragments.is_empty() {
        return Err("Missing pattern fragments".to_string());
    }

    Ok(Options {
        fragments,
        flags,
        config,
        input,
        count_only,
        verbose,
    })
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();
}

fn open_input(input: Option<&PathBuf>) -> Result<Box<dyn Read>, String> {
    match input {
        Some(path) => fs::File::open(path)
            .map(|f| Box::new(f) as Box<dyn Read>)
            .map_err(|e| format!("Failed to open '{}': {}", path.display(), e)),
        None => Ok(Box::new(io::stdin())),
    }
}

fn run(options: &Options) -> Result<(), String> {
    let config = match &options.config {
        Some(path) => CacheConfig::load(path).map_err(|e| e.to_string())?,
        None => CacheConfig::from_env(),
    };
    let pattern_options = PatternOptions::parse(&options.flags).map_err(|e| e.to_string())?;
    let site = PatternSite::new(pattern_options, Arc::new(RegexBackend::new()), &config);

    let fragments = options
        .fragments
        .iter()
        .map(|text| Fragment::utf8(text))
        .collect();
    let mut pattern = site.build(fragments).map_err(|e| e.to_string())?;
    tracing::debug!(target: "latebind::cli", %pattern, encoding = %pattern.encoding(), "Pattern built");

    let reader = BufReader::new(open_input(options.input.as_ref())?);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut count = 0usize;

    for line in reader.split(b'\n') {
        let line = line.map_err(|e| format!("Failed to read input: {}", e))?;
        if pattern.match_at(&line, 0).is_some() {
            count += 1;
            if !options.count_only {
                out.write_all(&line)
                    .and_then(|_| out.write_all(b"\n"))
                    .map_err(|e| format!("Failed to write output: {}", e))?;
            }
        }
    }

    if options.count_only {
        writeln!(out, "{}", count).map_err(|e| format!("Failed to write output: {}", e))?;
    }
    Ok(())
}

fn main() {
    let options = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    init_logging(options.verbose);

    if let Err(e) = run(&options) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
