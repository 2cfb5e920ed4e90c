//! Decoded character sources consumed by the tokenizer.
//!
//! Encoding detection is the caller's job: a source is built from text that
//! is already decoded, or from bytes plus a caller-chosen [`Encoding`].
//! `encoding_rs` honors a byte order mark when one is present.

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use encoding_rs::{Decoder, Encoding, UTF_8};

use crate::error::{IngestError, Result};

const BYTE_BUFFER: usize = 8 * 1024;

/// A decoded character stream with look-ahead.
///
/// Positions count characters consumed from the start of the source.
pub trait CharSource {
    /// Character `offset` places ahead of the cursor, without consuming.
    fn peek_at(&mut self, offset: usize) -> Option<char>;

    /// Consume and return the next character.
    fn next_char(&mut self) -> Option<char>;

    /// Characters consumed so far.
    fn position(&self) -> usize;

    fn peek(&mut self) -> Option<char> {
        self.peek_at(0)
    }

    /// True when [`CharSource::seek`] can move the cursor backwards.
    fn is_rewindable(&self) -> bool {
        false
    }

    /// Move the cursor to `position`; returns false when not supported.
    fn seek(&mut self, _position: usize) -> bool {
        false
    }

    /// A read or decode failure that ended the stream early.
    fn take_error(&mut self) -> Option<io::Error> {
        None
    }

    /// Fraction of the source consumed, when the total size is known.
    fn progress(&self) -> Option<f64> {
        None
    }
}

impl<S: CharSource + ?Sized> CharSource for &mut S {
    fn peek_at(&mut self, offset: usize) -> Option<char> {
        (**self).peek_at(offset)
    }

    fn next_char(&mut self) -> Option<char> {
        (**self).next_char()
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn is_rewindable(&self) -> bool {
        (**self).is_rewindable()
    }

    fn seek(&mut self, position: usize) -> bool {
        (**self).seek(position)
    }

    fn take_error(&mut self) -> Option<io::Error> {
        (**self).take_error()
    }

    fn progress(&self) -> Option<f64> {
        (**self).progress()
    }
}

impl<S: CharSource + ?Sized> CharSource for Box<S> {
    fn peek_at(&mut self, offset: usize) -> Option<char> {
        (**self).peek_at(offset)
    }

    fn next_char(&mut self) -> Option<char> {
        (**self).next_char()
    }

    fn position(&self) -> usize {
        (**self).position()
    }

    fn is_rewindable(&self) -> bool {
        (**self).is_rewindable()
    }

    fn seek(&mut self, position: usize) -> bool {
        (**self).seek(position)
    }

    fn take_error(&mut self) -> Option<io::Error> {
        (**self).take_error()
    }

    fn progress(&self) -> Option<f64> {
        (**self).progress()
    }
}

/// In-memory decoded text. Always rewindable.
#[derive(Debug, Clone)]
pub struct TextSource {
    chars: Vec<char>,
    position: usize,
}

impl TextSource {
    /// Wraps decoded text, dropping a leading byte order mark.
    pub fn new(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        Self {
            chars: text.chars().collect(),
            position: 0,
        }
    }

    /// Decodes `bytes` with `encoding` (a BOM overrides the encoding).
    pub fn from_bytes(bytes: &[u8], encoding: &'static Encoding) -> Self {
        let (text, actual, had_errors) = encoding.decode(bytes);
        if had_errors {
            tracing::debug!(
                encoding = actual.name(),
                "Malformed byte sequences replaced while decoding"
            );
        }
        Self::new(&text)
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl CharSource for TextSource {
    fn peek_at(&mut self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.chars.get(self.position).copied()?;
        self.position += 1;
        Some(ch)
    }

    fn position(&self) -> usize {
        self.position
    }

    fn is_rewindable(&self) -> bool {
        true
    }

    fn seek(&mut self, position: usize) -> bool {
        self.position = position.min(self.chars.len());
        true
    }

    fn progress(&self) -> Option<f64> {
        if self.chars.is_empty() {
            Some(1.0)
        } else {
            Some(self.position as f64 / self.chars.len() as f64)
        }
    }
}

/// Incremental decoder shared by the streaming sources.
struct Decoded<R> {
    reader: R,
    encoding: &'static Encoding,
    decoder: Decoder,
    bytes: Vec<u8>,
    pending: VecDeque<char>,
    decoded: String,
    finished: bool,
    error: Option<io::Error>,
    position: usize,
    bytes_read: u64,
    total_bytes: Option<u64>,
}

impl<R: Read> Decoded<R> {
    fn new(reader: R, encoding: &'static Encoding, total_bytes: Option<u64>) -> Self {
        Self {
            reader,
            encoding,
            decoder: encoding.new_decoder(),
            bytes: vec![0; BYTE_BUFFER],
            pending: VecDeque::new(),
            decoded: String::new(),
            finished: false,
            error: None,
            position: 0,
            bytes_read: 0,
            total_bytes,
        }
    }

    /// Decode until at least `wanted` characters are pending or input ends.
    fn fill(&mut self, wanted: usize) {
        while self.pending.len() < wanted && !self.finished {
            let read = match self.reader.read(&mut self.bytes) {
                Ok(read) => read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.error = Some(err);
                    self.finished = true;
                    break;
                }
            };
            let last = read == 0;
            self.bytes_read += read as u64;
            self.decoded.clear();
            let capacity = self
                .decoder
                .max_utf8_buffer_length(read)
                .unwrap_or(read * 4 + 16);
            self.decoded.reserve(capacity);
            let (_, _, had_errors) =
                self.decoder
                    .decode_to_string(&self.bytes[..read], &mut self.decoded, last);
            if had_errors {
                tracing::debug!(
                    encoding = self.encoding.name(),
                    offset = self.bytes_read,
                    "Malformed byte sequences replaced while decoding"
                );
            }
            self.pending.extend(self.decoded.chars());
            if last {
                self.finished = true;
            }
        }
    }

    fn peek_at(&mut self, offset: usize) -> Option<char> {
        self.fill(offset + 1);
        self.pending.get(offset).copied()
    }

    fn next_char(&mut self) -> Option<char> {
        self.fill(1);
        let ch = self.pending.pop_front()?;
        self.position += 1;
        Some(ch)
    }

    fn progress(&self) -> Option<f64> {
        let total = self.total_bytes?;
        if total == 0 {
            return Some(1.0);
        }
        Some((self.bytes_read as f64 / total as f64).min(1.0))
    }
}

/// Streaming decoder over any reader. Cannot be rewound.
pub struct DecodingSource<R> {
    inner: Decoded<R>,
}

impl<R: Read> DecodingSource<R> {
    pub fn new(reader: R, encoding: &'static Encoding) -> Self {
        Self {
            inner: Decoded::new(reader, encoding, None),
        }
    }

    /// UTF-8 (or BOM-indicated) stream.
    pub fn utf8(reader: R) -> Self {
        Self::new(reader, UTF_8)
    }
}

impl<R: Read> CharSource for DecodingSource<R> {
    fn peek_at(&mut self, offset: usize) -> Option<char> {
        self.inner.peek_at(offset)
    }

    fn next_char(&mut self) -> Option<char> {
        self.inner.next_char()
    }

    fn position(&self) -> usize {
        self.inner.position
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.inner.error.take()
    }

    fn progress(&self) -> Option<f64> {
        self.inner.progress()
    }
}

/// Streaming decoder over a seekable reader.
///
/// Seeking restarts decoding from the first byte and skips forward, so it is
/// meant for occasional rewinds (look-ahead at open, reset).
pub struct SeekableSource<R> {
    inner: Decoded<R>,
}

impl<R: Read + Seek> SeekableSource<R> {
    pub fn new(reader: R, encoding: &'static Encoding, total_bytes: Option<u64>) -> Self {
        Self {
            inner: Decoded::new(reader, encoding, total_bytes),
        }
    }

    fn restart(&mut self) -> io::Result<()> {
        self.inner.reader.seek(SeekFrom::Start(0))?;
        self.inner.decoder = self.inner.encoding.new_decoder();
        self.inner.pending.clear();
        self.inner.finished = false;
        self.inner.error = None;
        self.inner.position = 0;
        self.inner.bytes_read = 0;
        Ok(())
    }
}

impl<R: Read + Seek> CharSource for SeekableSource<R> {
    fn peek_at(&mut self, offset: usize) -> Option<char> {
        self.inner.peek_at(offset)
    }

    fn next_char(&mut self) -> Option<char> {
        self.inner.next_char()
    }

    fn position(&self) -> usize {
        self.inner.position
    }

    fn is_rewindable(&self) -> bool {
        true
    }

    fn seek(&mut self, position: usize) -> bool {
        if position < self.inner.position {
            if let Err(err) = self.restart() {
                self.inner.error = Some(err);
                self.inner.finished = true;
                return false;
            }
        }
        while self.inner.position < position {
            if self.inner.next_char().is_none() {
                break;
            }
        }
        true
    }

    fn take_error(&mut self) -> Option<io::Error> {
        self.inner.error.take()
    }

    fn progress(&self) -> Option<f64> {
        self.inner.progress()
    }
}

/// Resolves a code page label such as `utf-8`, `latin1`, or `windows-1252`.
///
/// # Errors
///
/// Returns [`IngestError::UnknownEncoding`] when the label is not known.
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IngestError::UnknownEncoding {
        label: label.to_string(),
    })
}

/// Opens a file as a rewindable decoded source.
///
/// # Errors
///
/// Returns [`IngestError::FileNotFound`] for missing files and
/// [`IngestError::Open`] for other failures.
pub fn open_file(
    path: &Path,
    encoding: &'static Encoding,
) -> Result<SeekableSource<BufReader<File>>> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::Open {
                description: path.display().to_string(),
                source: e,
            }
        }
    })?;
    let total_bytes = file.metadata().ok().map(|metadata| metadata.len());
    Ok(SeekableSource::new(
        BufReader::new(file),
        encoding,
        total_bytes,
    ))
}
