//! Incremental newline-delimited JSON decoding.
//!
//! Bytes arrive in network-sized chunks that do not respect line boundaries.
//! [`LineDecoder`] buffers the partial tail between chunks and hands out only
//! complete lines; [`decode_stream`] drives it over an async byte stream,
//! parses each line and reports records, parse failures and progress to a
//! [`DecodeHandler`].

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::Result;

/// Byte-level progress through the dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Progress {
    /// Fraction of the declared length consumed, in `[0, 1]`.
    Fraction(f64),
    /// The total length is unknown; only a byte count is available.
    Indeterminate { bytes_read: u64 },
}

impl Progress {
    pub fn fraction(&self) -> Option<f64> {
        match self {
            Progress::Fraction(f) => Some(*f),
            Progress::Indeterminate { .. } => None,
        }
    }
}

/// A dataset line that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseFailure {
    /// 1-based physical line number in the stream.
    pub line_number: usize,
    /// The offending line, lossily decoded.
    pub raw: String,
    pub message: String,
}

/// Receives the decoder's output.
pub trait DecodeHandler<T> {
    /// Called once per parsed record; `count` includes this record.
    fn on_record(&mut self, record: T, count: usize);

    fn on_progress(&mut self, _progress: Progress) {}

    fn on_parse_error(&mut self, _failure: ParseFailure) {}
}

/// One complete line taken from the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub number: usize,
    pub bytes: Vec<u8>,
}

impl RawLine {
    /// Line content without surrounding ASCII whitespace (including `\r`).
    pub fn trimmed(&self) -> &[u8] {
        self.bytes.trim_ascii()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(self.trimmed()).into_owned()
    }
}

/// Splits an arbitrary chunk sequence into complete lines.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    lines_seen: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<RawLine> {
        let mut lines = Vec::new();
        let mut start = 0;

        for (i, byte) in chunk.iter().enumerate() {
            if *byte == b'\n' {
                self.buffer.extend_from_slice(&chunk[start..i]);
                self.lines_seen += 1;
                lines.push(RawLine {
                    number: self.lines_seen,
                    bytes: std::mem::take(&mut self.buffer),
                });
                start = i + 1;
            }
        }

        self.buffer.extend_from_slice(&chunk[start..]);
        lines
    }

    /// Take the unterminated trailing line, if it has any content.
    pub fn finish(&mut self) -> Option<RawLine> {
        let bytes = std::mem::take(&mut self.buffer);
        let line = RawLine {
            number: self.lines_seen + 1,
            bytes,
        };
        if line.is_blank() {
            return None;
        }
        self.lines_seen += 1;
        Some(line)
    }
}

/// Monotonic progress computation over a possibly unknown total.
#[derive(Debug)]
struct ProgressTracker {
    total: Option<u64>,
    consumed: u64,
    last_fraction: f64,
}

impl ProgressTracker {
    fn new(total: Option<u64>) -> Self {
        Self {
            total: total.filter(|t| *t > 0),
            consumed: 0,
            last_fraction: 0.0,
        }
    }

    fn advance(&mut self, bytes: usize) -> Progress {
        self.consumed += bytes as u64;
        match self.total {
            Some(total) => {
                let fraction = (self.consumed as f64 / total as f64).min(1.0);
                self.last_fraction = self.last_fraction.max(fraction);
                Progress::Fraction(self.last_fraction)
            }
            None => Progress::Indeterminate {
                bytes_read: self.consumed,
            },
        }
    }
}

fn parse_line<T, H>(line: RawLine, count: &mut usize, handler: &mut H)
where
    T: DeserializeOwned,
    H: DecodeHandler<T>,
{
    if line.is_blank() {
        return;
    }
    match serde_json::from_slice::<T>(line.trimmed()) {
        Ok(record) => {
            *count += 1;
            handler.on_record(record, *count);
        }
        Err(e) => handler.on_parse_error(ParseFailure {
            line_number: line.number,
            raw: line.text(),
            message: e.to_string(),
        }),
    }
}

/// Decode a newline-delimited JSON byte stream.
///
/// Malformed lines are passed to [`DecodeHandler::on_parse_error`] and skipped;
/// an error from the stream itself ends decoding and is returned. On success
/// the handler's last progress report is exactly `Progress::Fraction(1.0)`.
///
/// Returns the number of records parsed.
pub async fn decode_stream<S, T, H>(
    mut stream: S,
    total_bytes: Option<u64>,
    handler: &mut H,
) -> Result<usize>
where
    S: Stream<Item = Result<Bytes>> + Unpin,
    T: DeserializeOwned,
    H: DecodeHandler<T>,
{
    let mut decoder = LineDecoder::new();
    let mut tracker = ProgressTracker::new(total_bytes);
    let mut count = 0usize;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        for line in decoder.push(&chunk) {
            parse_line(line, &mut count, handler);
        }
        handler.on_progress(tracker.advance(chunk.len()));
    }

    if let Some(line) = decoder.finish() {
        parse_line(line, &mut count, handler);
    }

    handler.on_progress(Progress::Fraction(1.0));
    debug!(
        "Decoded {} records from {} bytes",
        count, tracker.consumed
    );

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FunderError;
    use futures::stream;
    use serde_json::Value;

    #[derive(Default)]
    struct Collector {
        records: Vec<Value>,
        counts: Vec<usize>,
        failures: Vec<ParseFailure>,
        progress: Vec<Progress>,
    }

    impl DecodeHandler<Value> for Collector {
        fn on_record(&mut self, record: Value, count: usize) {
            self.records.push(record);
            self.counts.push(count);
        }

        fn on_progress(&mut self, progress: Progress) {
            self.progress.push(progress);
        }

        fn on_parse_error(&mut self, failure: ParseFailure) {
            self.failures.push(failure);
        }
    }

    fn chunks(parts: &[&str]) -> impl Stream<Item = Result<Bytes>> + Unpin {
        let owned: Vec<Result<Bytes>> = parts
            .iter()
            .map(|p| Ok(Bytes::copy_from_slice(p.as_bytes())))
            .collect();
        stream::iter(owned)
    }

    #[test]
    fn test_line_decoder_buffers_partial_lines() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"{\"id\":").is_empty());

        let lines = decoder.push(b"\"a\"}\n{\"id\"");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text(), r#"{"id":"a"}"#);
        assert_eq!(lines[0].number, 1);

        let tail = decoder.finish().unwrap();
        assert_eq!(tail.text(), r#"{"id""#);
        assert_eq!(tail.number, 2);
    }

    #[test]
    fn test_line_decoder_keeps_split_utf8_intact() {
        let text = "{\"name\":\"Caf\u{e9}\"}\n";
        let bytes = text.as_bytes();
        // Split inside the two-byte encoding of 'é'.
        let split = text.find('\u{e9}').unwrap() + 1;

        let mut decoder = LineDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        let lines = decoder.push(&bytes[split..]);
        assert_eq!(lines[0].text(), "{\"name\":\"Caf\u{e9}\"}");
    }

    #[test]
    fn test_finish_ignores_blank_tail() {
        let mut decoder = LineDecoder::new();
        decoder.push(b"{}\n  \r");
        assert!(decoder.finish().is_none());
    }

    #[tokio::test]
    async fn test_bad_line_is_reported_not_fatal() {
        let input = [
            "{\"id\":\"1\"}\n{\"id\":\"2\"}\n",
            "{\"id\": oops\n",
            "{\"id\":\"4\"}\n{\"id\":\"5\"}\n",
        ];
        let total: usize = input.iter().map(|s| s.len()).sum();
        let mut collector = Collector::default();

        let count = decode_stream(chunks(&input), Some(total as u64), &mut collector)
            .await
            .unwrap();

        assert_eq!(count, 4);
        assert_eq!(collector.records.len(), 4);
        assert_eq!(collector.counts, vec![1, 2, 3, 4]);
        assert_eq!(collector.failures.len(), 1);
        assert_eq!(collector.failures[0].raw, "{\"id\": oops");
        assert_eq!(collector.failures[0].line_number, 3);
        assert_eq!(collector.progress.last(), Some(&Progress::Fraction(1.0)));
    }

    #[tokio::test]
    async fn test_trailing_line_without_newline_is_parsed() {
        let mut collector = Collector::default();
        let count = decode_stream(
            chunks(&["{\"id\":\"a\"}\r\n\n{\"id\":", "\"b\"}"]),
            None,
            &mut collector,
        )
        .await
        .unwrap();

        assert_eq!(count, 2);
        assert!(collector.failures.is_empty());
        assert_eq!(collector.records[1]["id"], "b");
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_ends_at_one() {
        // Declared length smaller than the body: fractions clamp at 1.0.
        let mut collector = Collector::default();
        decode_stream(
            chunks(&["{\"id\":1}\n", "{\"id\":2}\n", "{\"id\":3}\n"]),
            Some(12),
            &mut collector,
        )
        .await
        .unwrap();

        let fractions: Vec<f64> = collector
            .progress
            .iter()
            .filter_map(|p| p.fraction())
            .collect();
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
        assert!(fractions.iter().all(|f| (0.0..=1.0).contains(f)));
        assert_eq!(fractions.last(), Some(&1.0));
    }

    #[tokio::test]
    async fn test_unknown_length_reports_indeterminate_progress() {
        let mut collector = Collector::default();
        decode_stream(chunks(&["{}\n", "{}\n"]), None, &mut collector)
            .await
            .unwrap();

        assert_eq!(
            collector.progress[0],
            Progress::Indeterminate { bytes_read: 3 }
        );
        assert_eq!(collector.progress.last(), Some(&Progress::Fraction(1.0)));
    }

    #[tokio::test]
    async fn test_stream_error_is_fatal() {
        let items: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"{\"id\":\"1\"}\n")),
            Err(FunderError::Network {
                message: "connection reset".into(),
                cause: None,
            }),
        ];
        let mut collector = Collector::default();

        let result = decode_stream(stream::iter(items), None, &mut collector).await;
        assert!(result.is_err());
        assert_eq!(collector.records.len(), 1);
    }
}
