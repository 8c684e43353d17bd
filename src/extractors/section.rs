// src/extractors/section.rs

// --- Imports ---
use crate::utils::error::ExtractError;
use serde::Serialize;

// --- Constants ---
/// A level-2 heading. Only these lines can open or close a section.
const HEADER_MARKER: &str = "## ";
/// Any line with this prefix that is not a `HEADER_MARKER` line.
const HEADING_PREFIX: &str = "##";

// --- Data Structures ---
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedSection {
    pub version: String, // The token the caller asked for
    pub header: String,  // e.g., "## 1.1.0 (2024-02-01)", without the line terminator
    pub content: String, // Body lines, verbatim, terminators included
}

/// Outcome of feeding one line to a [`SectionScanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    Continue,
    /// The next header after the target section was reached; feed no more lines.
    Stop,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Accumulator {
    Inactive,
    Active(String),
}

/// Incremental form of the extractor: one line in, one decision out.
///
/// Lets a reader stop pulling lines from its source as soon as the target
/// section is closed.
#[derive(Debug)]
pub struct SectionScanner<'a> {
    version: &'a str,
    header: Option<String>,
    state: Accumulator,
}

impl<'a> SectionScanner<'a> {
    pub fn new(version: &'a str) -> Self {
        Self {
            version,
            header: None,
            state: Accumulator::Inactive,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, Accumulator::Active(_))
    }

    /// Applies a single line, in document order.
    pub fn push(&mut self, line: &str) -> Scan {
        if line.starts_with(HEADER_MARKER) {
            if line.contains(self.version) {
                if self.is_active() {
                    tracing::debug!("Header '{}' also matches '{}', restarting section", line.trim_end(), self.version);
                } else {
                    tracing::debug!("Entered section at header '{}'", line.trim_end());
                }
                self.header = Some(line.trim_end_matches(&['\r', '\n'][..]).to_string());
                self.state = Accumulator::Active(String::new());
            } else if self.is_active() {
                tracing::debug!("Reached next header '{}', stopping scan", line.trim_end());
                return Scan::Stop;
            }
            return Scan::Continue;
        }

        if let Accumulator::Active(body) = &mut self.state {
            // "##Note" and friends are folded into the body minus one '#'.
            // This mirrors loose prefix matching in older tooling and is most
            // likely a latent defect, but callers rely on the output shape.
            if line.starts_with(HEADING_PREFIX) {
                tracing::trace!("Folding pseudo-header '{}' into body", line.trim_end());
                body.push_str(&line[1..]);
            } else {
                body.push_str(line);
            }
        }
        Scan::Continue
    }

    /// `None` if no header ever matched.
    pub fn finish(self) -> Option<ExtractedSection> {
        match self.state {
            Accumulator::Inactive => None,
            Accumulator::Active(content) => Some(ExtractedSection {
                version: self.version.to_string(),
                header: self.header.unwrap_or_default(),
                content,
            }),
        }
    }
}

// --- Main Extractor Structure ---
#[derive(Debug, Default)]
pub struct SectionExtractor;

impl SectionExtractor {
    pub fn new() -> Self {
        Self {}
    }

    /// Extracts the body of the section whose `## ` header contains `version`.
    ///
    /// Lines are expected to carry their own terminators; they are copied
    /// into the result untouched. An existing but empty section yields
    /// `Ok` with empty content, a missing one yields
    /// [`ExtractError::SectionNotFound`].
    #[allow(dead_code)]
    pub fn extract<I, S>(&self, lines: I, version: &str) -> Result<ExtractedSection, ExtractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.try_extract(lines.into_iter().map(Ok::<S, ExtractError>), version)
    }

    /// Same as [`extract`](Self::extract) over a fallible line source.
    ///
    /// The first `Err` aborts the scan. Lines after the end of the target
    /// section are never pulled from `lines`.
    pub fn try_extract<I, S, E>(&self, lines: I, version: &str) -> Result<ExtractedSection, E>
    where
        I: IntoIterator<Item = Result<S, E>>,
        S: AsRef<str>,
        E: From<ExtractError>,
    {
        let mut scanner = SectionScanner::new(version);
        let mut consumed = 0usize;
        for line in lines {
            consumed += 1;
            if scanner.push(line?.as_ref()) == Scan::Stop {
                break;
            }
        }
        tracing::debug!("Scanned {} lines for '{}'", consumed, version);

        let section = scanner
            .finish()
            .ok_or_else(|| ExtractError::SectionNotFound(version.to_string()))?;
        tracing::info!("Extracted section '{}' ({} bytes)", section.header, section.content.len());
        Ok(section)
    }
}
