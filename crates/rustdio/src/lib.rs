//! # rustdio
//!
//! Buffered FILE-style streams implemented directly over raw POSIX file
//! descriptors (open/read/write/lseek/close), re-creating classic
//! standard-I/O semantics: buffered sequential reads and writes, byte
//! and line access, a restricted formatted-write, and explicit
//! flush/seek control.
//!
//! The buffering state machine lives in `rustdio-core` and is pure
//! logic; this crate owns the descriptor and performs the OS calls.
//!
//! ```no_run
//! use rustdio::{FileStream, FmtArg};
//!
//! # fn main() -> Result<(), rustdio::StreamError> {
//! let mut out = FileStream::open("counts.txt", "w")?;
//! out.write_formatted("%s=%d\n", &[FmtArg::Str("total"), FmtArg::Int(42)])?;
//! out.close()?;
//!
//! let mut input = FileStream::open("counts.txt", "r")?;
//! while let Some(line) = input.read_line(256)? {
//!     let _ = line;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod stream;
mod sys;

pub use error::StreamError;
pub use rustdio_core::buffer::BufMode;
pub use rustdio_core::fmt::{FmtArg, FmtError};
pub use rustdio_core::mode::AccessMode;
pub use stream::{FileStream, Whence};
