use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriter;

/// `MakeWriter` that copies every formatted log line to stdout and, when a
/// path is given, appends it to that file as well.
///
/// The file is opened in append mode, so restarts of the server keep earlier
/// logs. All writer handles share the one file behind a mutex.
#[derive(Clone)]
pub struct TeeWriter {
    file: Option<Arc<Mutex<File>>>,
}

impl TeeWriter {
    /// # Errors
    /// Returns the I/O error if the log file cannot be opened for appending.
    pub fn new(path: Option<&Path>) -> io::Result<Self> {
        let file = path
            .map(|path| OpenOptions::new().create(true).append(true).open(path))
            .transpose()?
            .map(|file| Arc::new(Mutex::new(file)));
        Ok(Self { file })
    }

    /// Run `op` against the log file, if any. A writer that panicked mid-line
    /// leaves the file usable, so a poisoned lock is taken over.
    fn with_file(&self, op: impl FnOnce(&mut File) -> io::Result<()>) -> io::Result<()> {
        match &self.file {
            Some(file) => op(&mut file.lock().unwrap_or_else(PoisonError::into_inner)),
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for TeeWriter {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.with_file(|file| file.write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.with_file(File::flush)
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the default `info` level.
///
/// # Errors
/// Returns the I/O error if the log file cannot be opened.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let writer = TeeWriter::new(log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_target(false)
        .init();
    Ok(())
}
