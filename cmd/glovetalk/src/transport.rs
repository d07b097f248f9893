//! Line-oriented frame sources.
//!
//! The glove prints one comma-separated frame per line. [`LineReader`]
//! turns any byte stream into [`Reading`]s, and [`SerialSource`] drives it
//! over a serial port, reopening the port after transport errors.

use std::io::{self, Read};
use std::time::Duration;

use glovetalk_gesture::Reading;
use serialport::{ClearBuffer, SerialPort};
use tracing::{debug, info, warn};

const READ_CHUNK: usize = 256;

/// Longest line kept while waiting for a newline.
pub const MAX_LINE_LEN: usize = 4096;

/// Something the driver can pull one reading from per cycle.
///
/// Implementations block; the driver calls them on the blocking pool.
pub trait FrameSource: Send {
    fn next_reading(&mut self) -> Reading;

    /// Returns true once the source can never produce another line.
    fn is_exhausted(&self) -> bool {
        false
    }
}

/// Splits a byte stream into readings.
///
/// A read timeout yields [`Reading::NoData`] and keeps any partial line for
/// the next call. Other I/O errors and end of stream yield
/// [`Reading::TransportError`]. So does a line longer than [`MAX_LINE_LEN`];
/// the rest of that line is discarded.
pub struct LineReader<R> {
    inner: R,
    buf: Vec<u8>,
    /// Prefix of `buf` known to hold no newline.
    scanned: usize,
    skip_partial: bool,
    eof: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            scanned: 0,
            skip_partial: false,
            eof: false,
        }
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Drops buffered bytes and the next (possibly partial) line, so the
    /// following read returns a frame that started after this call.
    pub fn resync(&mut self) {
        self.buf.clear();
        self.scanned = 0;
        self.skip_partial = true;
    }

    /// Reads until one complete line, a timeout or an error.
    pub fn read_reading(&mut self) -> Reading {
        loop {
            while let Some(line) = self.take_line() {
                if self.skip_partial {
                    self.skip_partial = false;
                    continue;
                }
                let text = String::from_utf8_lossy(&line);
                let text = text.trim();
                if text.is_empty() {
                    return Reading::NoData;
                }
                return Reading::Line(text.to_string());
            }

            if self.buf.len() > MAX_LINE_LEN {
                debug!(len = self.buf.len(), "line: dropping over-long line");
                self.resync();
                return Reading::TransportError(format!(
                    "line exceeds {MAX_LINE_LEN} bytes"
                ));
            }

            let mut chunk = [0u8; READ_CHUNK];
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    if self.buf.is_empty() {
                        return Reading::TransportError("end of stream".to_string());
                    }
                    // Unterminated last line.
                    self.buf.push(b'\n');
                }
                Ok(n) => self.buf.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
                    ) =>
                {
                    return Reading::NoData;
                }
                Err(e) => return Reading::TransportError(e.to_string()),
            }
        }
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') else {
            self.scanned = self.buf.len();
            return None;
        };
        let end = self.scanned + offset;
        self.scanned = 0;
        let mut line: Vec<u8> = self.buf.drain(..=end).collect();
        line.pop();
        Some(line)
    }
}

/// Reads every line in order, without resyncing between cycles.
impl<R: Read + Send> FrameSource for LineReader<R> {
    fn next_reading(&mut self) -> Reading {
        self.read_reading()
    }

    fn is_exhausted(&self) -> bool {
        self.eof && self.buf.is_empty()
    }
}

/// Serial link settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub timeout: Duration,
}

/// A glove attached to a serial port.
///
/// Each cycle discards whatever accumulated in the OS input buffer so the
/// frame read is current, not one queued up during the previous announcement.
pub struct SerialSource {
    config: SerialConfig,
    reader: Option<LineReader<Box<dyn SerialPort>>>,
}

impl SerialSource {
    /// Opens the port. Failure here is fatal to the caller.
    pub fn open(config: SerialConfig) -> Result<Self, serialport::Error> {
        let port = open_port(&config)?;
        info!(port = %config.port, baud = config.baud_rate, "serial: opened");
        Ok(Self {
            config,
            reader: Some(LineReader::new(port)),
        })
    }
}

impl FrameSource for SerialSource {
    fn next_reading(&mut self) -> Reading {
        if self.reader.is_none() {
            match open_port(&self.config) {
                Ok(port) => {
                    info!(port = %self.config.port, "serial: reopened");
                    self.reader = Some(LineReader::new(port));
                }
                Err(e) => return Reading::TransportError(e.to_string()),
            }
        }
        let Some(reader) = self.reader.as_mut() else {
            return Reading::TransportError("serial port not open".to_string());
        };

        if let Err(e) = reader.get_mut().clear(ClearBuffer::Input) {
            debug!(error = %e, "serial: cannot clear input buffer");
        }
        reader.resync();

        let reading = reader.read_reading();
        if let Reading::TransportError(msg) = &reading {
            warn!(port = %self.config.port, error = %msg, "serial: closing port after error");
            self.reader = None;
        }
        reading
    }
}

fn open_port(config: &SerialConfig) -> Result<Box<dyn SerialPort>, serialport::Error> {
    serialport::new(&config.port, config.baud_rate)
        .timeout(config.timeout)
        .open()
}
