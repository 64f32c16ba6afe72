//! Open-mode parsing.
//!
//! The stream accepts exactly four fopen-style mode strings: "r", "w",
//! "r+", "w+". Append modes are rejected outright rather than silently
//! reinterpreted.

use std::fmt;

/// Which operations the stream permits, fixed at open time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn readable(self) -> bool {
        matches!(self, AccessMode::ReadOnly | AccessMode::ReadWrite)
    }

    pub fn writable(self) -> bool {
        matches!(self, AccessMode::WriteOnly | AccessMode::ReadWrite)
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AccessMode::ReadOnly => "read-only",
            AccessMode::WriteOnly => "write-only",
            AccessMode::ReadWrite => "read-write",
        })
    }
}

/// Flags the OS open call needs, derived from the mode string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenFlags {
    pub readable: bool,
    pub writable: bool,
    pub create: bool,
    pub truncate: bool,
}

impl OpenFlags {
    pub fn access(&self) -> AccessMode {
        match (self.readable, self.writable) {
            (true, true) => AccessMode::ReadWrite,
            (false, true) => AccessMode::WriteOnly,
            _ => AccessMode::ReadOnly,
        }
    }
}

/// Parse an fopen mode string.
///
/// "w" and "w+" create and truncate, "r+" does neither. Returns `None`
/// for append modes and anything else unrecognized.
pub fn parse_mode(mode: &str) -> Option<OpenFlags> {
    match mode {
        "r" => Some(OpenFlags {
            readable: true,
            ..Default::default()
        }),
        "r+" => Some(OpenFlags {
            readable: true,
            writable: true,
            ..Default::default()
        }),
        "w" => Some(OpenFlags {
            writable: true,
            create: true,
            truncate: true,
            ..Default::default()
        }),
        "w+" => Some(OpenFlags {
            readable: true,
            writable: true,
            create: true,
            truncate: true,
        }),
        _ => None,
    }
}
