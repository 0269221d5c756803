//! Input sources for the `,` command.

use std::io::{self, BufRead, Read};

/// Supplies one character per `,`.
///
/// `Ok(None)` signals end-of-stream; the interpreter stores 0 in that case.
pub trait InputSource: Send {
    fn read_char(&mut self) -> io::Result<Option<u8>>;
}

impl<T: InputSource + ?Sized> InputSource for Box<T> {
    fn read_char(&mut self) -> io::Result<Option<u8>> {
        (**self).read_char()
    }
}

/// Reads exactly one byte per `,`.
pub struct ByteInput<R> {
    reader: R,
}

impl<R: Read + Send> ByteInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl ByteInput<io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: Read + Send> InputSource for ByteInput<R> {
    fn read_char(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

/// Reads a whole line per `,`, keeps its first byte and drops the rest.
///
/// A blank line yields the newline itself.
pub struct LineInput<R> {
    reader: R,
    line: Vec<u8>,
}

impl<R: BufRead + Send> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: Vec::new(),
        }
    }
}

impl LineInput<io::BufReader<io::Stdin>> {
    pub fn stdin() -> Self {
        Self::new(io::BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send> InputSource for LineInput<R> {
    fn read_char(&mut self) -> io::Result<Option<u8>> {
        self.line.clear();
        match self.reader.read_until(b'\n', &mut self.line)? {
            0 => Ok(None),
            _ => Ok(self.line.first().copied()),
        }
    }
}

/// Always at end-of-stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoInput;

impl InputSource for NoInput {
    fn read_char(&mut self) -> io::Result<Option<u8>> {
        Ok(None)
    }
}
