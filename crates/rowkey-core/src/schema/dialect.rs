//! Delimiter and quoting detection from a bounded input sample.
//!
//! Scoring is delegated to [`csv_nose::Sniffer`]. Candidates present in the
//! sample are tried in priority order with the sniffer constrained to that
//! delimiter, and the first one that splits every line (header included) into
//! the same number of fields wins. When none does, the sniffer's unconstrained
//! best guess is kept if it is one of the candidates. Otherwise callers fall
//! back to [`Dialect::fallback`].

use std::io::{self, Read};

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use csv_nose::{Metadata, Quote, SampleSize, Sniffer};

/// Candidate delimiters, in priority order.
pub const DEFAULT_CANDIDATES: [u8; 3] = [b',', b';', b'\t'];

/// Default sample size in bytes.
pub const DEFAULT_SAMPLE_SIZE: usize = 1024;

/// Line terminator used by a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineTerminator {
    #[default]
    Lf,
    CrLf,
}

impl LineTerminator {
    fn detect(text: &str) -> Self {
        if text.contains("\r\n") {
            Self::CrLf
        } else {
            Self::Lf
        }
    }

    fn to_csv(self) -> Terminator {
        match self {
            Self::Lf => Terminator::Any(b'\n'),
            Self::CrLf => Terminator::CRLF,
        }
    }
}

/// How a line of text is split into fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
    pub terminator: LineTerminator,
}

impl Dialect {
    /// Comma-delimited, double-quoted dialect used when sniffing fails.
    pub fn fallback(sample: &Sample) -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            terminator: LineTerminator::detect(sample.text()),
        }
    }

    /// Reader configured for this dialect. Rows may be ragged; callers check
    /// field counts themselves.
    pub fn reader_builder(&self) -> ReaderBuilder {
        let mut builder = ReaderBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .flexible(true)
            .has_headers(true);
        builder
    }

    /// Writer producing the same dialect.
    pub fn writer_builder(&self) -> WriterBuilder {
        let mut builder = WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote(self.quote)
            .terminator(self.terminator.to_csv());
        builder
    }

    /// Printable delimiter name for logs and reports.
    pub fn delimiter_name(&self) -> String {
        match self.delimiter {
            b'\t' => "tab".to_string(),
            b',' => "comma".to_string(),
            b';' => "semicolon".to_string(),
            other => format!("'{}'", other as char),
        }
    }
}

/// A bounded prefix of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    text: String,
    truncated: bool,
}

impl Sample {
    /// Wraps text that is the complete input.
    pub fn complete(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            truncated: false,
        }
    }

    /// Reads at most `limit` bytes.
    ///
    /// When the input is longer than `limit` the trailing partial line is
    /// dropped so it cannot skew delimiter counts.
    pub fn read<R: Read>(reader: R, limit: usize) -> io::Result<Self> {
        let mut bytes = Vec::with_capacity(limit.min(64 * 1024));
        reader.take((limit as u64).saturating_add(1)).read_to_end(&mut bytes)?;
        let truncated = bytes.len() > limit;
        bytes.truncate(limit);

        let mut text = String::from_utf8_lossy(&bytes).into_owned();
        if truncated && let Some(end) = text.rfind('\n') {
            text.truncate(end + 1);
        }
        Ok(Self { text, truncated })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Sniffs the dialect of `sample`, trying `candidates` in order.
///
/// Returns `None` when no candidate present in the sample splits its rows
/// into more than one field.
pub fn sniff(sample: &Sample, candidates: &[u8]) -> Option<Dialect> {
    let text = sniffable_text(sample.text());
    let present: Vec<u8> = candidates
        .iter()
        .copied()
        .filter(|delimiter| text.as_bytes().contains(delimiter))
        .collect();

    let sniffed = present
        .iter()
        .find_map(|&delimiter| {
            run_sniffer(&text, Some(delimiter)).filter(|sniffed| !sniffed.dialect.flexible)
        })
        .or_else(|| {
            run_sniffer(&text, None)
                .filter(|sniffed| present.contains(&sniffed.dialect.delimiter))
        })?;

    let quote = match sniffed.dialect.quote {
        Quote::Some(quote) => quote,
        Quote::None => b'"',
    };
    Some(Dialect {
        delimiter: sniffed.dialect.delimiter,
        quote,
        terminator: LineTerminator::detect(sample.text()),
    })
}

/// Sniffs the dialect and falls back to comma-delimited when sniffing fails.
pub fn detect(sample: &Sample, candidates: &[u8]) -> Dialect {
    match sniff(sample, candidates) {
        Some(dialect) => dialect,
        None => {
            tracing::debug!("dialect sniffing failed, falling back to comma");
            Dialect::fallback(sample)
        }
    }
}

/// Runs the sniffer over `text`, optionally constrained to one delimiter.
/// Single-field results count as failures.
fn run_sniffer(text: &str, delimiter: Option<u8>) -> Option<Metadata> {
    let mut sniffer = Sniffer::new();
    sniffer.sample_size(SampleSize::All);
    if let Some(delimiter) = delimiter {
        sniffer.delimiter(delimiter);
    }
    match sniffer.sniff_bytes(text.as_bytes()) {
        Ok(metadata) if metadata.num_fields > 1 => Some(metadata),
        Ok(metadata) => {
            tracing::trace!(
                delimiter = %(metadata.dialect.delimiter as char).escape_default(),
                "sniffed a single-field table"
            );
            None
        }
        Err(error) => {
            tracing::trace!(%error, "dialect sniffing failed");
            None
        }
    }
}

/// Sample text without whitespace-only lines, which carry no delimiters and
/// are skipped when rows are streamed.
fn sniffable_text(text: &str) -> String {
    text.split_inclusive('\n')
        .filter(|line| !line.trim().is_empty())
        .collect()
}
