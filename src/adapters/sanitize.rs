//! Log sanitization for user-supplied text.
//!
//! Form values end up in log lines (for example the warning emitted for an
//! unseen categorical value). Anything typed into a free field can contain
//! contact details or forged log lines, so formatted output passes through
//! [`SanitizingMakeWriter`] before reaching the sink:
//! - e-mail addresses and phone-like numbers are redacted
//! - long digit runs (IDs, card numbers) are redacted
//! - carriage returns and other control characters (except tab and the line
//!   terminator) are replaced; SGR colour sequences written by the formatter
//!   pass through
//!
//! Each call is capped at `MAX_SANITIZE_BYTES` of input.

use std::sync::OnceLock;

use regex::{Regex, RegexSet};
use tracing_subscriber::fmt::MakeWriter;

/// Maximum number of bytes sanitized per call; the rest is dropped.
const MAX_SANITIZE_BYTES: usize = 16 * 1024;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

struct Pattern {
    regex: Regex,
    replacement: &'static str,
}

struct Patterns {
    any: RegexSet,
    rules: Vec<Pattern>,
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let rules: [(&str, &str); 3] = [
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            (
                r"\b(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
                "[REDACTED-PHONE]",
            ),
            (r"\b\d{9,}\b", "[REDACTED-NUMBER]"),
        ];

        let any = RegexSet::new(rules.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = rules
            .into_iter()
            .map(|(pattern, replacement)| Pattern {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        Patterns { any, rules }
    })
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }
    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

/// Length in chars of an SGR sequence (`ESC [ params m`) starting at `chars[0]`.
fn sgr_len(chars: &[char]) -> Option<usize> {
    if chars.first() != Some(&'\u{1b}') || chars.get(1) != Some(&'[') {
        return None;
    }
    let params = chars[2..]
        .iter()
        .take_while(|c| c.is_ascii_digit() || **c == ';')
        .count();
    (chars.get(2 + params) == Some(&'m')).then_some(3 + params)
}

/// Replace control characters except tab (and a trailing newline) with `\u{FFFD}`.
///
/// Well-formed SGR sequences are kept so coloured output stays readable; any
/// other escape sequence is broken up.
fn neutralize_controls(line: &str) -> String {
    let (body, newline) = match line.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (line, false),
    };
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len());
    let mut i = 0;
    while i < chars.len() {
        if let Some(len) = sgr_len(&chars[i..]) {
            out.extend(&chars[i..i + len]);
            i += len;
            continue;
        }
        let c = chars[i];
        out.push(if c.is_control() && c != '\t' { '\u{FFFD}' } else { c });
        i += 1;
    }
    if newline {
        out.push('\n');
    }
    out
}

/// Sanitize one log line.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, MAX_SANITIZE_BYTES)
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);
    let patterns = patterns();

    let mut result = neutralize_controls(prefix);
    for idx in patterns.any.matches(&result).into_iter().collect::<Vec<_>>() {
        let rule = &patterns.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).into_owned();
    }

    if truncated {
        result.push_str(" [TRUNCATED]\n");
    }
    result
}

/// A `tracing_subscriber` writer wrapper that sanitizes formatted log output
/// line by line before it is written to the underlying sink.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

pub struct SanitizingWriter<W: std::io::Write> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
        }
    }

    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A single huge line without newlines is written out capped.
        if self.buffer.len() > MAX_SANITIZE_BYTES * 2 {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<W: std::io::Write> Drop for SanitizingWriter<W> {
    fn drop(&mut self) {
        let _ = std::io::Write::flush(self);
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter::new(self.inner.make_writer())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::LogCapture;
    use std::io::Write;
    use tracing_subscriber::layer::SubscriberExt;

    #[test]
    fn test_plain_text_unchanged() {
        let line = "Unseen categorical value column=diet_type value=XYZ\n";
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_redacts_email_and_phone() {
        let out = sanitize("value=jane.doe@example.com phone 555-123-4567");
        assert!(out.contains("[REDACTED-EMAIL]"));
        assert!(out.contains("[REDACTED-PHONE]"));
        assert!(!out.contains("jane.doe"));
        assert!(!out.contains("4567"));
    }

    #[test]
    fn test_redacts_long_numbers() {
        let out = sanitize("value=123456789012");
        assert!(out.contains("[REDACTED-"));
        assert!(!out.contains("123456789012"));
    }

    #[test]
    fn test_neutralizes_injected_newlines() {
        let out = sanitize("value=Vegan\r INFO forged line\n");
        assert_eq!(out.matches('\n').count(), 1);
        assert!(!out.contains('\r'));
    }

    #[test]
    fn test_truncates_large_inputs() {
        let out = sanitize_with_limit("é".repeat(10).as_str(), 5);
        assert!(out.starts_with("éé"));
        assert!(out.contains("[TRUNCATED]"));
    }

    #[test]
    fn test_writer_sanitizes_per_line() {
        let capture = LogCapture::default();
        {
            let mut writer = SanitizingWriter::new(capture.clone());
            writer.write_all(b"first contact a@b.org\nsecond ").expect("write");
            writer.write_all(b"line\n").expect("write");
        }
        assert_eq!(capture.contents(), "first contact [REDACTED-EMAIL]\nsecond line\n");
    }

    #[test]
    fn test_colour_codes_pass_through() {
        let line = "\u{1b}[2mtimestamp\u{1b}[0m \u{1b}[32m INFO\u{1b}[0m started\n";
        assert_eq!(sanitize(line), line);
    }

    #[test]
    fn test_other_escapes_are_neutralized() {
        let out = sanitize("value=\u{1b}[2Kerased \u{1b}]0;title\u{7} \u{1b}\n");
        assert!(!out.contains('\u{1b}'));
        assert!(!out.contains('\u{7}'));
        assert_eq!(out.matches('\u{FFFD}').count(), 4);
    }

    #[test]
    fn test_coloured_fmt_layer_output_is_intact() {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_writer(SanitizingMakeWriter::new(capture.writer_factory())),
        );

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Starting Nutrisense...");
            tracing::warn!(column = "diet_type", value = "XYZ", "Unseen categorical value");
        });

        let out = capture.contents();
        assert!(!out.contains('\u{FFFD}'), "garbled output: {out:?}");
        assert!(out.contains("\u{1b}["));
        assert!(out.contains("Starting Nutrisense..."));
        assert!(out.contains("XYZ"));
        assert_eq!(out.matches('\n').count(), 2);
    }
}
