//! Sink that writes the line format to any `io::Write`.

use crate::data::line_format::{write_empty_marker, write_fault, write_row};
use crate::data::Sample;
use crate::hardware::capabilities::Sink;
use anyhow::{Context, Result};
use std::io::{self, BufWriter, Stdout, Write};

/// Buffered line writer.
///
/// Output is buffered per drain batch and pushed out on [`Sink::flush`].
pub struct LineSink<W: Write> {
    out: BufWriter<W>,
    lines: u64,
}

impl LineSink<Stdout> {
    /// Write rows to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> LineSink<W> {
    /// Wrap `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: BufWriter::new(out),
            lines: 0,
        }
    }

    /// Lines written so far, including markers and faults.
    pub fn lines_written(&self) -> u64 {
        self.lines
    }

    /// Flush and return the inner writer.
    pub fn into_inner(self) -> Result<W> {
        self.out
            .into_inner()
            .map_err(|e| anyhow::anyhow!("failed to flush line sink: {}", e.error()))
    }
}

impl<W: Write + Send + 'static> Sink for LineSink<W> {
    fn emit(&mut self, row: &[Sample]) -> Result<()> {
        write_row(&mut self.out, row).context("failed to write row")?;
        self.lines += 1;
        Ok(())
    }

    fn emit_empty_marker(&mut self) -> Result<()> {
        write_empty_marker(&mut self.out).context("failed to write empty marker")?;
        self.lines += 1;
        Ok(())
    }

    fn report_fault(&mut self, message: &str) -> Result<()> {
        write_fault(&mut self.out, message).context("failed to write fault line")?;
        self.lines += 1;
        self.out.flush().context("failed to flush fault line")
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush().context("failed to flush line sink")
    }
}
