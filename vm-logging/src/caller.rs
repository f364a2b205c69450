use std::fmt::{self, Display, Formatter};
use std::panic::Location;

/// Source location of the code that issued a logging call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    file: &'static str,
    line: u32,
}

impl CallSite {
    /// The location of the nearest caller not marked `#[track_caller]`.
    ///
    /// Every public logging entry point carries `#[track_caller]`, so from
    /// inside the facade this resolves to the user's call site rather than to
    /// a wrapper. `None` means the location is unavailable and the event goes
    /// out without a `caller` field.
    #[track_caller]
    pub fn current() -> Option<Self> {
        let location = Location::caller();
        Some(Self {
            file: location.file(),
            line: location.line(),
        })
    }

    pub fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    pub fn file(&self) -> &'static str {
        self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl Display for CallSite {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
