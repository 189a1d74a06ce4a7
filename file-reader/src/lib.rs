//! Load-once, rewindable line reader over a FASTA file.
//!
//! The reader slurps the whole file into an owned buffer up front so that
//! repeated scans (one per model, during classification) cost a rewind
//! instead of a re-open. This mirrors the cost model of scanning a
//! multi-hundred-megabyte genome file against many models without
//! re-reading it from disk each time.

use anyhow::{Context, Result};
use std::path::Path;

/// Anything that can hand back one line at a time and be rewound.
///
/// `context-tree` depends only on this trait so the tree-building and
/// scoring automata stay decoupled from how bytes actually reach them
/// (disk file, in-memory fixture, anything else a test wants to stub).
pub trait LineSource {
    /// Copies the next line (including its trailing `\n`, if present)
    /// into `buf`, replacing its previous contents, and returns the
    /// number of bytes written. Returns 0 at end of input without
    /// touching `buf`. Consecutive blank lines are skipped silently.
    fn next_line(&mut self, buf: &mut Vec<u8>) -> usize;

    /// Resets the read position to the start of the input.
    fn rewind(&mut self);
}

/// An in-memory, rewindable FASTA file.
pub struct FastaReader {
    buf: Vec<u8>,
    cursor: usize,
}

impl FastaReader {
    /// Loads `path` entirely into memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let buf = std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Ok(Self { buf, cursor: 0 })
    }

    /// Builds a reader directly from bytes already in memory (tests, and
    /// any caller that already has the file contents).
    pub fn from_bytes(buf: Vec<u8>) -> Self {
        Self { buf, cursor: 0 }
    }
}

impl LineSource for FastaReader {
    fn next_line(&mut self, buf: &mut Vec<u8>) -> usize {
        // Skip empty lines.
        while self.buf.get(self.cursor) == Some(&b'\n') {
            self.cursor += 1;
        }
        if self.cursor >= self.buf.len() {
            return 0;
        }

        let start = self.cursor;
        let mut end = start;
        while end < self.buf.len() && self.buf[end] != b'\n' {
            end += 1;
        }
        // Include the trailing newline in the returned line, if present.
        let line_end = if end < self.buf.len() { end + 1 } else { end };

        buf.clear();
        buf.extend_from_slice(&self.buf[start..line_end]);
        self.cursor = line_end;
        buf.len()
    }

    fn rewind(&mut self) {
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_for(contents: &str) -> FastaReader {
        FastaReader::from_bytes(contents.as_bytes().to_vec())
    }

    #[test]
    fn reads_lines_with_trailing_newline() {
        let mut r = reader_for(">seq1\nACGT\n>seq2\nTTTT\n");
        let mut buf = Vec::new();
        let mut lines = Vec::new();
        loop {
            let n = r.next_line(&mut buf);
            if n == 0 {
                break;
            }
            lines.push(String::from_utf8(buf[..n].to_vec()).unwrap());
        }
        assert_eq!(lines, vec![">seq1\n", "ACGT\n", ">seq2\n", "TTTT\n"]);
    }

    #[test]
    fn last_line_without_trailing_newline_is_preserved() {
        let mut r = reader_for(">seq1\nACGT");
        let mut buf = Vec::new();
        assert_eq!(r.next_line(&mut buf), 6);
        assert_eq!(&buf[..], b">seq1\n");
        assert_eq!(r.next_line(&mut buf), 4);
        assert_eq!(&buf[..], b"ACGT");
        assert_eq!(r.next_line(&mut buf), 0);
    }

    #[test]
    fn blank_lines_are_skipped_silently() {
        let mut r = reader_for("A\n\n\nC\n");
        let mut buf = Vec::new();
        assert_eq!(r.next_line(&mut buf), 2);
        assert_eq!(&buf[..], b"A\n");
        assert_eq!(r.next_line(&mut buf), 2);
        assert_eq!(&buf[..], b"C\n");
        assert_eq!(r.next_line(&mut buf), 0);
    }

    #[test]
    fn rewind_restarts_from_the_beginning() {
        let mut r = reader_for("A\nC\n");
        let mut buf = Vec::new();
        r.next_line(&mut buf);
        r.next_line(&mut buf);
        assert_eq!(r.next_line(&mut buf), 0);
        r.rewind();
        assert_eq!(r.next_line(&mut buf), 2);
        assert_eq!(&buf[..], b"A\n");
    }

    #[test]
    fn empty_file_yields_no_lines() {
        let mut r = reader_for("");
        let mut buf = Vec::new();
        assert_eq!(r.next_line(&mut buf), 0);
    }

    #[test]
    fn open_missing_file_errors_with_path_context() {
        let err = FastaReader::open("/no/such/path/genezip-test.fa").unwrap_err();
        assert!(err.to_string().contains("genezip-test.fa"));
    }
}
