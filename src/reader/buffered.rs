//! Buffered Input
//!
//! Reads XML from any source implementing `Read` through a fixed-size
//! chunk buffer, and opens profile files from disk.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Buffer size for reading chunks
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Chunked reader over a byte stream
pub struct BufferedReader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    pos: usize,
    end: usize,
    eof: bool,
}

impl<R: Read> BufferedReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    /// A zero capacity is bumped to one byte so reads always make progress
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        BufferedReader {
            reader,
            buffer: vec![0u8; capacity.max(1)],
            pos: 0,
            end: 0,
            eof: false,
        }
    }

    /// Refill the buffer; returns false once the source is exhausted
    pub fn fill_buffer(&mut self) -> io::Result<bool> {
        if self.eof {
            return Ok(false);
        }

        // Compact: move unconsumed bytes to the front
        if self.pos > 0 {
            self.buffer.copy_within(self.pos..self.end, 0);
            self.end -= self.pos;
            self.pos = 0;
        }

        let read = loop {
            match self.reader.read(&mut self.buffer[self.end..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        };
        if read == 0 {
            self.eof = true;
            return Ok(false);
        }
        self.end += read;
        Ok(true)
    }

    /// Unconsumed buffered bytes
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[self.pos..self.end]
    }

    pub fn consume(&mut self, n: usize) {
        self.pos += n.min(self.end - self.pos);
    }

    pub fn is_eof(&self) -> bool {
        self.eof && self.pos >= self.end
    }

    /// Drain the source chunk by chunk into a single Vec
    pub fn read_to_end(&mut self) -> io::Result<Vec<u8>> {
        let mut result = Vec::with_capacity(self.buffer.len());
        loop {
            let chunk = self.buffered().len();
            result.extend_from_slice(self.buffered());
            self.consume(chunk);
            if !self.fill_buffer()? {
                break;
            }
        }
        Ok(result)
    }
}

/// Read an entire document from a `Read` source
pub fn read_all<R: Read>(reader: R, capacity: usize) -> io::Result<Vec<u8>> {
    BufferedReader::with_capacity(reader, capacity).read_to_end()
}

/// Open and read a document from disk
///
/// Fails with `NotFound` (or another I/O kind) when the path cannot be opened.
pub fn open_file(path: &Path, capacity: usize) -> io::Result<Vec<u8>> {
    let file = File::open(path)?;
    read_all(file, capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_fill_and_consume() {
        let data = b"<root>content</root>";
        let mut reader = BufferedReader::with_capacity(Cursor::new(data.to_vec()), 8);

        assert!(reader.fill_buffer().unwrap());
        assert_eq!(reader.buffered(), b"<root>co");
        reader.consume(6);
        assert!(reader.fill_buffer().unwrap());
        assert_eq!(reader.buffered(), b"content<");
    }

    #[test]
    fn test_read_to_end_small_chunks() {
        let data = b"<root><user id=\"u1\"/></root>";
        let result = read_all(Cursor::new(data.to_vec()), 3).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_zero_capacity_still_reads() {
        let result = read_all(Cursor::new(b"<r/>".to_vec()), 0).unwrap();
        assert_eq!(result, b"<r/>");
    }

    #[test]
    fn test_eof() {
        let mut reader = BufferedReader::new(Cursor::new(Vec::new()));
        assert!(!reader.fill_buffer().unwrap());
        assert!(reader.is_eof());
    }

    #[test]
    fn test_open_missing_file() {
        let err = open_file(Path::new("/nonexistent/profile.xml"), DEFAULT_BUFFER_SIZE).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
