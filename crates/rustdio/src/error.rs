//! Stream error taxonomy.
//!
//! Three families map onto distinct recovery stories: construction
//! failures (no stream escapes), access-mode rejections (the stream
//! stays fully usable for permitted operations), and OS-level I/O
//! failures (the stream latches a sticky error marker). End-of-file is
//! not represented here: it is a normal condition, and read operations
//! report it through short counts and `Option`.

use std::io;

use rustdio_core::fmt::FmtError;
use rustdio_core::mode::AccessMode;
use thiserror::Error;

/// Errors surfaced by [`FileStream`](crate::FileStream) operations.
#[derive(Debug, Error)]
pub enum StreamError {
    /// The OS refused to open the file.
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The mode string is not one of "r", "w", "r+", "w+".
    #[error("unsupported open mode {mode:?}")]
    UnsupportedMode { mode: String },

    /// Operation rejected by the stream's access mode. Not sticky.
    #[error("{op} on a {mode} stream")]
    Access { op: &'static str, mode: AccessMode },

    /// An OS read/write/seek/close failed. Sets the sticky marker.
    #[error("{op} failed: {source}")]
    Io {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Buffer replacement was requested after I/O had already occurred.
    #[error("buffer cannot be replaced after I/O has started")]
    BufferInUse,

    /// A formatted write was handed an argument list that does not match
    /// its directives. Nothing is written in this case.
    #[error("formatted write: {0}")]
    Format(#[from] FmtError),
}
