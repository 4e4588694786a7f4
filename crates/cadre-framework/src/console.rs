//! Console abstraction for user-facing output.
//!
//! The pipeline never writes to the process streams directly; it goes through
//! a [`Console`] so tests (and embedding hosts) can capture output with
//! [`Console::in_memory`].

use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Clone)]
enum ConsoleTarget {
    Stdout,
    Stderr,
    Buffer(Arc<Mutex<String>>),
}

impl ConsoleTarget {
    fn write_line(&self, line: &str) {
        match self {
            ConsoleTarget::Stdout => println!("{line}"),
            ConsoleTarget::Stderr => eprintln!("{line}"),
            ConsoleTarget::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(line);
                buffer.push('\n');
            }
        }
    }
}

/// The output half of a command run: an out stream and an error stream.
#[derive(Clone)]
pub struct Console {
    out: ConsoleTarget,
    err: ConsoleTarget,
}

impl Console {
    /// A console writing to the process stdout/stderr.
    pub fn system() -> Self {
        Self {
            out: ConsoleTarget::Stdout,
            err: ConsoleTarget::Stderr,
        }
    }

    /// A console capturing into memory, with a handle to read it back.
    pub fn in_memory() -> (Self, ConsoleCapture) {
        let out = Arc::new(Mutex::new(String::new()));
        let err = Arc::new(Mutex::new(String::new()));
        let console = Self {
            out: ConsoleTarget::Buffer(out.clone()),
            err: ConsoleTarget::Buffer(err.clone()),
        };
        (console, ConsoleCapture { out, err })
    }

    pub fn write_line(&self, line: impl AsRef<str>) {
        self.out.write_line(line.as_ref());
    }

    pub fn write_error_line(&self, line: impl AsRef<str>) {
        self.err.write_line(line.as_ref());
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::system()
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = |t: &ConsoleTarget| match t {
            ConsoleTarget::Stdout => "stdout",
            ConsoleTarget::Stderr => "stderr",
            ConsoleTarget::Buffer(_) => "buffer",
        };
        f.debug_struct("Console")
            .field("out", &name(&self.out))
            .field("err", &name(&self.err))
            .finish()
    }
}

/// Read-back handle for an in-memory [`Console`].
#[derive(Clone)]
pub struct ConsoleCapture {
    out: Arc<Mutex<String>>,
    err: Arc<Mutex<String>>,
}

impl ConsoleCapture {
    pub fn stdout(&self) -> String {
        self.out.lock().clone()
    }

    pub fn stderr(&self) -> String {
        self.err.lock().clone()
    }
}
