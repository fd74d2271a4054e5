//! Report output with scoped suppression.
//!
//! A [`ReportSink`] owns the writer human-readable report lines go to.
//! [`ReportSink::suppress`] returns a guard that discards writes until it is
//! dropped, whichever way the guarded scope exits.

use std::io::{self, Write};
use std::ops::{Deref, DerefMut};

/// Destination for report lines.
pub struct ReportSink {
    out: Box<dyn Write>,
    suppressed: bool,
}

impl ReportSink {
    pub fn new(out: Box<dyn Write>) -> Self {
        Self {
            out,
            suppressed: false,
        }
    }

    /// Sink writing to standard output.
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Discard output until the returned guard is dropped.
    pub fn suppress(&mut self) -> Suppressed<'_> {
        let previous = self.suppressed;
        self.suppressed = true;
        Suppressed {
            sink: self,
            previous,
        }
    }

    /// Write one line unless suppressed.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        if self.suppressed {
            return Ok(());
        }
        writeln!(self.out, "{}", text)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Guard returned by [`ReportSink::suppress`]; restores the prior state on drop.
pub struct Suppressed<'a> {
    sink: &'a mut ReportSink,
    previous: bool,
}

impl Drop for Suppressed<'_> {
    fn drop(&mut self) {
        self.sink.suppressed = self.previous;
    }
}

impl Deref for Suppressed<'_> {
    type Target = ReportSink;

    fn deref(&self) -> &ReportSink {
        &*self.sink
    }
}

impl DerefMut for Suppressed<'_> {
    fn deref_mut(&mut self) -> &mut ReportSink {
        &mut *self.sink
    }
}
