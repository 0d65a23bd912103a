//! Conversation transcript: protocol parsing, bounded log, word wrapping.
//!
//! The backend's stdout is newline-delimited noise except for lines carrying
//! the command marker. One line is one entry; there is no escaping and no
//! multi-line payload. The tags below are the protocol contract — changing
//! them is a versioned interface change, not something the parser tolerates.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Marker that makes a backend line meaningful at all.
pub const COMMAND_TAG: &str = "[COMMAND]";
/// Role tag for user speech.
pub const YOU_TAG: &str = "[YOU]";
/// Role tag for assistant replies.
pub const SIDD_TAG: &str = "[SIDD]";

/// Most entries retained before the oldest are discarded.
pub const TRANSCRIPT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    You,
    Sidd,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::You => "YOU",
            Speaker::Sidd => "SIDD",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub text: String,
}

impl TranscriptEntry {
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// Parse one backend output line into a transcript entry.
///
/// Lines without the command marker, or with an unknown role tag, are
/// diagnostic noise and yield `None`. An empty payload is still an entry.
pub fn parse_line(line: &str) -> Option<TranscriptEntry> {
    let line = line.trim();
    let payload = line.strip_prefix(COMMAND_TAG)?.trim_start();
    if let Some(text) = payload.strip_prefix(YOU_TAG) {
        return Some(TranscriptEntry::new(Speaker::You, text.trim()));
    }
    if let Some(text) = payload.strip_prefix(SIDD_TAG) {
        return Some(TranscriptEntry::new(Speaker::Sidd, text.trim()));
    }
    None
}

/// Append-only bounded log shared between the backend reader thread and the
/// render loop. The reader is the sole producer; the render loop snapshots
/// once per frame instead of iterating live state.
#[derive(Debug, Clone)]
pub struct TranscriptLog {
    entries: Arc<Mutex<VecDeque<TranscriptEntry>>>,
    capacity: usize,
}

impl TranscriptLog {
    pub fn new() -> Self {
        Self::with_capacity(TRANSCRIPT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(256)))),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, entry: TranscriptEntry) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Chronological copy of the retained window.
    pub fn snapshot(&self) -> Vec<TranscriptEntry> {
        let entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TranscriptLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Greedy word wrap by rendered cell width.
///
/// Words wider than `max_width` are hard-broken so no output line ever
/// exceeds the panel; for text whose words all fit, joining the lines with
/// single spaces reproduces the input with spacing collapsed.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let max_width = max_width.max(1);
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return vec![String::new()];
    };

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in std::iter::once(first).chain(words) {
        for piece in split_oversized(word, max_width) {
            if current.is_empty() {
                current = piece;
            } else if current.width() + 1 + piece.width() <= max_width {
                current.push(' ');
                current.push_str(&piece);
            } else {
                lines.push(std::mem::take(&mut current));
                current = piece;
            }
        }
    }
    lines.push(current);
    lines
}

fn split_oversized(word: &str, max_width: usize) -> Vec<String> {
    if word.width() <= max_width {
        return vec![word.to_string()];
    }
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if !current.is_empty() && current.width() + ch_width > max_width {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
