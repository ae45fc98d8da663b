//! Stack dump parsing.
//!
//! A dump is line-oriented text in the conventional multi-thread format:
//!
//! ```text
//! <name> [<state>]:
//! <function line>
//! \t<source line>
//! <function line>
//! \t<source line>
//! ```
//!
//! [`Stack::parse`] turns such text into a tree of threads and frames,
//! tolerating malformed or truncated input: whatever does not match the
//! grammar is dropped, and the raw bytes are always retained so callers can
//! fall back to the unstructured text.

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::backtrace::Backtrace;
use std::borrow::Cow;
use std::io::{self, BufRead};
use std::thread;

static THREAD_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+?)\s\[(.+?)\]:$").unwrap());
static FUNCTION_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\S.+)$").unwrap());
static SOURCE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+(.+)$").unwrap());

/// One frame of a call stack: the function, and the source location when a
/// following indented line supplied one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    #[serde(rename = "func", skip_serializing_if = "String::is_empty")]
    pub function: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// One unit of execution recorded in the dump, with its frames in the order
/// they appear (innermost first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thread {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Frame>,
}

/// A parsed stack dump.
///
/// `raw` always equals the exact input bytes regardless of how much of the
/// dump matched the grammar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stack {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub threads: Vec<Thread>,
    #[serde(skip)]
    pub raw: Bytes,
}

impl Stack {
    /// Parses a textual stack dump.
    ///
    /// Malformed content never fails: lines before the first thread header
    /// are dropped, unmatched lines are skipped, and the result carries as
    /// much structure as the text yielded. The only error is a line-read
    /// fault (for example non-UTF-8 bytes), the moral equivalent of a
    /// scanner failure on a streamed source.
    pub fn parse(raw: impl Into<Bytes>) -> io::Result<Stack> {
        let raw = raw.into();
        let mut stack = Stack { threads: Vec::new(), raw: raw.clone() };

        let mut reader: &[u8] = &raw;
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            let text = line.trim_end_matches(['\r', '\n']);

            if let Some(captures) = THREAD_HEADER.captures(text) {
                stack.threads.push(Thread {
                    name: captures[1].to_string(),
                    state: captures[2].to_string(),
                    frames: Vec::new(),
                });
            } else if let Some(current) = stack.threads.last_mut() {
                if let Some(captures) = FUNCTION_LINE.captures(text) {
                    current.frames.push(Frame { function: captures[1].to_string(), source: None });
                } else if let Some(frame) = current.frames.last_mut() {
                    // Consecutive source lines overwrite: the last one wins.
                    if let Some(captures) = SOURCE_LINE.captures(text) {
                        frame.source = Some(captures[1].to_string());
                    }
                }
            }
        }

        Ok(stack)
    }

    /// A stack with no structure, only the raw text. The fallback when the
    /// dump could not be scanned at all.
    pub fn unparsed(raw: impl Into<Bytes>) -> Stack {
        Stack { threads: Vec::new(), raw: raw.into() }
    }

    /// Captures the current thread's backtrace as a parsed stack.
    ///
    /// The backtrace is rendered into the dump grammar first, so the raw
    /// text and the structured view are two faces of the same bytes.
    pub fn capture() -> Stack {
        let backtrace = Backtrace::force_capture();
        let current = thread::current();
        let rendered = render_dump(current.name().unwrap_or("unnamed"), "panicked", &backtrace.to_string());
        match Stack::parse(rendered.clone()) {
            Ok(stack) => stack,
            Err(_) => Stack::unparsed(rendered),
        }
    }

    /// The raw dump as text, lossy where it is not valid UTF-8.
    pub fn raw_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}

static BACKTRACE_FRAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+:\s+(.+)$").unwrap());
static BACKTRACE_SOURCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s+at\s+(.+)$").unwrap());

/// Renders `std::backtrace` text into the dump grammar: a `<name> [<state>]:`
/// header, one non-indented line per function, an indented source line below.
fn render_dump(name: &str, state: &str, backtrace: &str) -> String {
    let mut out = format!("{name} [{state}]:\n");
    for line in backtrace.lines() {
        if let Some(captures) = BACKTRACE_FRAME.captures(line) {
            out.push_str(&captures[1]);
            out.push('\n');
        } else if let Some(captures) = BACKTRACE_SOURCE.captures(line) {
            out.push('\t');
            out.push_str(&captures[1]);
            out.push('\n');
        }
    }
    out
}
