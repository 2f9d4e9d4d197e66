//! Summarizer HTTP server binary.
//! Run with: cargo run --bin summarizer-server

use std::process::ExitCode;

use text_summarizer::start_summarizer;

fn main() -> ExitCode {
    start_summarizer::run()
}
