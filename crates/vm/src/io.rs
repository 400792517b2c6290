//! Output sinks and input sources used by WRITE, DPRINT, BREAK and READ.

use std::io::{self, BufRead, Write};

/// Where WRITE (and, for the debug sink, DPRINT/BREAK) output goes.
pub trait OutputSink {
    fn write_int(&mut self, value: i64) -> io::Result<()>;

    /// Booleans are written as `true` / `false`.
    fn write_bool(&mut self, value: bool) -> io::Result<()>;

    /// Raw bytes, as produced by decoding string escapes.
    fn write_bytes(&mut self, value: &[u8]) -> io::Result<()>;

    fn write_string(&mut self, value: &str) -> io::Result<()> {
        self.write_bytes(value.as_bytes())
    }

    /// Flush buffered output. Called once when a run ends.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where READ takes its values from.
///
/// Every method returns `None` at end of input or when the next line does
/// not parse as the requested kind.
pub trait InputSource {
    fn read_int(&mut self) -> Option<i64>;
    fn read_bool(&mut self) -> Option<bool>;
    fn read_string(&mut self) -> Option<String>;
}

/// An [`OutputSink`] over any [`Write`].
#[derive(Debug)]
pub struct WriterSink<W> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn write_int(&mut self, value: i64) -> io::Result<()> {
        write!(self.inner, "{value}")
    }

    fn write_bool(&mut self, value: bool) -> io::Result<()> {
        write!(self.inner, "{value}")
    }

    fn write_bytes(&mut self, value: &[u8]) -> io::Result<()> {
        self.inner.write_all(value)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// An [`InputSource`] reading one value per line from any [`BufRead`].
#[derive(Debug)]
pub struct LineSource<R> {
    inner: R,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Next line without its terminator; `None` at end of input or on a
    /// read error.
    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.inner.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

impl<R: BufRead> InputSource for LineSource<R> {
    fn read_int(&mut self) -> Option<i64> {
        self.next_line()?.trim().parse().ok()
    }

    fn read_bool(&mut self) -> Option<bool> {
        self.next_line()
            .map(|line| line.trim().eq_ignore_ascii_case("true"))
    }

    fn read_string(&mut self) -> Option<String> {
        self.next_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_sink_formats() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write_int(-12).unwrap();
        sink.write_bool(true).unwrap();
        sink.write_bool(false).unwrap();
        sink.write_string(" ok").unwrap();
        sink.write_bytes(&[b' ', 0xff]).unwrap();
        assert_eq!(sink.into_inner(), b"-12truefalse ok \xff");
    }

    #[test]
    fn line_source_reads_each_kind() {
        let mut input = LineSource::new("42\nTrue\nhello world\r\n".as_bytes());
        assert_eq!(input.read_int(), Some(42));
        assert_eq!(input.read_bool(), Some(true));
        assert_eq!(input.read_string(), Some("hello world".into()));
        assert_eq!(input.read_string(), None);
    }

    #[test]
    fn line_source_parse_failures() {
        let mut input = LineSource::new("4x\nnope\n".as_bytes());
        assert_eq!(input.read_int(), None);
        // READ bool never fails on a present line.
        assert_eq!(input.read_bool(), Some(false));
        assert_eq!(input.read_bool(), None);
    }

    #[test]
    fn line_source_last_line_without_newline() {
        let mut input = LineSource::new("first\nlast".as_bytes());
        assert_eq!(input.read_string(), Some("first".into()));
        assert_eq!(input.read_string(), Some("last".into()));
        assert_eq!(input.read_int(), None);
    }

    #[test]
    fn line_source_empty_line_is_a_value() {
        let mut input = LineSource::new("\n".as_bytes());
        assert_eq!(input.read_string(), Some(String::new()));
    }
}
