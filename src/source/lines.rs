use super::ReadString;
use std::io::BufRead;

/// Reads one item per line from a buffered stream.
///
/// Lines are trimmed and blank lines are skipped, so an item is never an empty string.
/// Bytes that are not valid UTF-8 are replaced rather than ending the stream.
/// A read error ends the sequence; it is logged rather than returned because the
/// producer contract only knows about "next item" and "no more items".
pub struct LineReader {
    reader: Box<dyn BufRead + Send>,
    buf: Vec<u8>,
    done: bool,
}

impl LineReader {
    pub fn new<R: BufRead + Send + 'static>(reader: R) -> Self {
        Self {
            reader: Box::new(reader),
            buf: Vec::new(),
            done: false,
        }
    }
}

impl ReadString for LineReader {
    fn read_string(&mut self) -> Option<String> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buf);
                    let line = line.trim();
                    if !line.is_empty() {
                        return Some(line.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!("Stopped reading items: {}", e);
                    self.done = true;
                }
            }
        }
        None
    }
}
