//! Host platform detection used for conditional job registration

use std::env;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Operating systems a job can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    Macos,
    Linux,
}

impl Os {
    /// Detect the current platform
    pub fn current() -> Self {
        Self::from_name(env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value onto a supported platform.
    ///
    /// Anything that is neither Windows nor macOS is treated as Linux, which is
    /// how the unix-like build steps behave anyway.
    pub fn from_name(os: &str) -> Self {
        match os {
            "windows" => Os::Windows,
            "macos" => Os::Macos,
            _ => Os::Linux,
        }
    }

    pub fn is_windows(self) -> bool {
        self == Os::Windows
    }

    /// Shell program and flag used to run single-string commands
    pub fn shell(self) -> (&'static str, &'static str) {
        match self {
            Os::Windows => ("cmd", "/C"),
            Os::Macos | Os::Linux => ("sh", "-c"),
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Os::Windows => "windows",
            Os::Macos => "macos",
            Os::Linux => "linux",
        };
        write!(f, "{}", name)
    }
}
