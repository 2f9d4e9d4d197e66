//! One-shot summarizer: reads a document from a file or stdin and prints its summary.
//!
//! Run with: `cargo run --bin summarize -- [--max-length N] [--min-length N] [--sample] [FILE]`

use std::io::Read;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use text_summarizer::core::config::SummarizerConfig;
use text_summarizer::start_summarizer::{init_tracing, load_service};
use text_summarizer::summarization::{CompressionStats, SummarizationRequest};

const USAGE: &str = "usage: summarize [--max-length N] [--min-length N] [--sample] [FILE]";

/// Parsed command-line options.
struct Options {
    max_length: Option<usize>,
    min_length: Option<usize>,
    sample: bool,
    file: Option<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut options = Options {
        max_length: None,
        min_length: None,
        sample: false,
        file: None,
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--max-length" => options.max_length = Some(parse_number(&arg, args.next())?),
            "--min-length" => options.min_length = Some(parse_number(&arg, args.next())?),
            "--sample" => options.sample = true,
            "-h" | "--help" => bail!(USAGE),
            flag if flag.starts_with("--") => bail!("unknown flag {flag}\n{USAGE}"),
            path => {
                if options.file.is_some() {
                    bail!("only one input file is supported\n{USAGE}");
                }
                options.file = Some(path.to_string());
            }
        }
    }

    Ok(options)
}

fn parse_number(flag: &str, value: Option<String>) -> Result<usize> {
    let value = value.with_context(|| format!("{flag} expects a value"))?;
    value
        .parse()
        .with_context(|| format!("{flag} expects a positive integer, got {value:?}"))
}

fn read_input(file: Option<&str>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {path}")),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading stdin")?;
            Ok(text)
        }
    }
}

fn run() -> Result<bool> {
    let options = parse_args(std::env::args().skip(1))?;
    let text = read_input(options.file.as_deref())?;

    let config = SummarizerConfig::from_env().context("loading configuration")?;
    let service = load_service(&config).context("loading summarization model")?;

    let mut request = SummarizationRequest::new(text).with_sampling(options.sample);
    if let Some(max_length) = options.max_length {
        request = request.with_max_length(max_length);
    }
    if let Some(min_length) = options.min_length {
        request = request.with_min_length(min_length);
    }

    let response = service.summarize(&request);
    if response.is_success() {
        println!("{}", response.summary());
        println!();
        println!("{}", CompressionStats::compute(&request.text, response.summary()));
        Ok(true)
    } else {
        eprintln!("error: {}", response.summary());
        Ok(false)
    }
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
