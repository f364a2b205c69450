// Standard library
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

// External crates
use is_terminal::IsTerminal;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Output stream shared by every handle derived from the same configuration.
#[derive(Clone)]
pub struct Sink {
    writer: SharedWriter,
    is_stderr: bool,
}

impl Sink {
    pub fn stderr() -> Self {
        Self {
            writer: Arc::new(Mutex::new(Box::new(io::stderr()))),
            is_stderr: true,
        }
    }

    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
            is_stderr: false,
        }
    }

    /// Write one rendered event followed by a newline.
    ///
    /// The line is written with a single `write_all` while holding the lock so
    /// concurrent events never interleave. I/O errors are dropped.
    pub fn write_line(&self, line: &str) {
        let mut buf = Vec::with_capacity(line.len() + 1);
        buf.extend_from_slice(line.as_bytes());
        buf.push(b'\n');

        let mut writer = self.lock();
        let _ = writer.write_all(&buf);
    }

    pub fn flush(&self) {
        let _ = self.lock().flush();
    }

    /// Colors are only used for a real terminal on stderr.
    pub fn supports_color(&self) -> bool {
        self.is_stderr && io::stderr().is_terminal()
    }

    /// Whether two sinks write to the same underlying stream.
    pub fn same_stream(&self, other: &Sink) -> bool {
        Arc::ptr_eq(&self.writer, &other.writer)
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        // A panic while writing must not silence every later event.
        self.writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sink")
            .field("is_stderr", &self.is_stderr)
            .finish()
    }
}

/// In-memory writer whose clones all append to the same buffer.
///
/// Handy as a `Config::output` in tests: keep one clone, hand the other to the
/// logger, then inspect what was written.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Clone, Default, Debug)]
pub struct SharedBuffer {
    bytes: Arc<Mutex<Vec<u8>>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }

    pub fn clear(&self) {
        self.bytes().clear();
    }

    fn bytes(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bytes().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
