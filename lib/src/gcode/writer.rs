//! Line-oriented G-code writer.

use super::GCodeCommand;
use crate::Result;
use std::io::Write;

/// Writes [`GCodeCommand`]s to a sink, one per line.
///
/// Every write error is returned to the caller as it happens; nothing is
/// buffered here beyond what the sink itself buffers.
pub struct GCodeWriter<W: Write> {
    out: W,
}

impl<W: Write> GCodeWriter<W> {
    /// Wrap a sink.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write one command.
    pub fn write(&mut self, command: &GCodeCommand) -> Result<()> {
        writeln!(self.out, "{}", command.to_gcode())?;
        Ok(())
    }

    /// Flush the sink.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Get the sink back after flushing it.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io;

    #[test]
    fn test_writes_lines() {
        let mut writer = GCodeWriter::new(Vec::new());
        writer.write(&GCodeCommand::Comment("hello".to_string())).unwrap();
        writer.write(&GCodeCommand::FanOff).unwrap();
        writer.write(&GCodeCommand::Blank).unwrap();
        writer.write(&GCodeCommand::Raw("G28\nG29".to_string())).unwrap();

        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(text, "; hello\nM107\n\nG28\nG29\n");
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut writer = GCodeWriter::new(FailingSink);
        let err = writer.write(&GCodeCommand::FanOff).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
