// src/main.rs
mod changelog;
mod extractors;
mod utils;

use std::ffi::OsString;
use std::process::ExitCode;

use changelog::{ChangelogReader, CHANGELOG_FILE};
use clap::error::ErrorKind;
use clap::Parser;
use utils::error::ExtractError;
use utils::AppError;

/// Prints the CHANGELOG.md section for one release version
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Version to look up, matched as a substring of each `## ` header
    #[arg(value_name = "VERSION", allow_hyphen_values = true)]
    versions: Vec<String>,

    /// Print the section as JSON (version, header, content); must precede VERSION
    #[arg(long)]
    json: bool,
}

/// Parses `raw` (program name first) and counts every `--` as a version argument.
///
/// clap drops the first `--` as the end-of-options marker; it is put back in
/// front of the values so the argument count sees it.
fn parse_args<I, T>(raw: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let raw: Vec<OsString> = raw.into_iter().map(Into::into).collect();
    let mut args = Args::try_parse_from(raw.iter())?;

    let given = raw.iter().skip(1).filter(|a| *a == "--").count();
    let kept = args.versions.iter().filter(|v| *v == "--").count();
    let swallowed = given.saturating_sub(kept);
    if swallowed > 0 {
        let mut versions = vec!["--".to_string(); swallowed];
        versions.append(&mut args.versions);
        args.versions = versions;
    }
    Ok(args)
}

fn usage_message(given: &[String]) -> String {
    let quoted: Vec<String> = given.iter().map(|a| format!("'{}'", a)).collect();
    format!("Expected 1 argument got {}: [{}]", given.len(), quoted.join(", "))
}

fn main() -> Result<ExitCode, AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => return Ok(usage_failure(AppError::Usage(e.to_string().trim_end().to_string()))),
        },
    };
    tracing::debug!("Parsed args: {:?}", args);

    // 3. Exactly one version token
    let version = match args.versions.as_slice() {
        [version] => version.as_str(),
        other => return Ok(usage_failure(AppError::Usage(usage_message(other)))),
    };

    // 4. Extract; I/O errors propagate out of main
    match ChangelogReader::open(CHANGELOG_FILE)?.extract(version) {
        Ok(section) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&section)?);
            } else {
                println!("{}", section.content);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(AppError::Extraction(e @ ExtractError::SectionNotFound(_))) => {
            tracing::warn!("No header matched '{}'", version);
            println!("{}", e);
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(e),
    }
}

fn usage_failure(error: AppError) -> ExitCode {
    tracing::debug!("Usage error: {:?}", error);
    println!("{}", error);
    ExitCode::from(1)
}
