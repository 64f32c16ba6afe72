//! FILE-style buffered stream over a raw descriptor.
//!
//! One `FileStream` owns one descriptor and one buffer. All public
//! operations route through the state machine in `rustdio_core::buffer`:
//! the transition table decides when a direction switch forces a flush,
//! and the flush plan decides whether reconciling means draining staged
//! bytes or seeking the descriptor back over read-ahead the caller never
//! consumed. Transfers larger than the buffer bypass it entirely, so
//! large I/O is never double-copied.

use std::io;
use std::path::Path;

use rustdio_core::buffer::{BufMode, FlushPlan, IoDirection, LastOp, Prelude, StreamBuffer, prelude};
use rustdio_core::fmt::{self as corefmt, FmtArg};
use rustdio_core::mode::{AccessMode, OpenFlags, parse_mode};

use crate::error::StreamError;
use crate::sys;

/// Seek origin, mirroring SEEK_SET / SEEK_CUR / SEEK_END.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    Set,
    Current,
    End,
}

impl Whence {
    fn raw(self) -> i32 {
        match self {
            Whence::Set => libc::SEEK_SET,
            Whence::Current => libc::SEEK_CUR,
            Whence::End => libc::SEEK_END,
        }
    }
}

/// A buffered stream over one exclusively-owned file descriptor.
///
/// Reads and writes go through an internal buffer unless the transfer
/// exceeds its capacity. End-of-file and OS errors latch into sticky
/// indicators queried with [`is_at_end`](Self::is_at_end) and
/// [`has_error`](Self::has_error); end-of-file is not an error.
///
/// Not protected against concurrent use; callers share a stream across
/// threads only behind their own synchronization.
#[derive(Debug)]
pub struct FileStream {
    /// Owned descriptor; -1 once torn down.
    fd: i32,
    buf: StreamBuffer,
    access: AccessMode,
    eof: bool,
    /// Raw errno of the most recent OS failure.
    last_errno: Option<i32>,
}

impl FileStream {
    /// Open `path` in one of "r", "w", "r+", "w+".
    ///
    /// "w" and "w+" create and truncate. Append modes are rejected with
    /// [`StreamError::UnsupportedMode`]. The buffer is allocated only
    /// after the descriptor is acquired, so a failed open leaks nothing.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, StreamError> {
        let flags = parse_mode(mode).ok_or_else(|| StreamError::UnsupportedMode {
            mode: mode.to_string(),
        })?;
        let path = path.as_ref();
        let fd = sys::open(path, oflags(&flags), 0o666).map_err(|source| StreamError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            fd,
            buf: StreamBuffer::default_full(),
            access: flags.access(),
            eof: false,
            last_errno: None,
        })
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    /// Whether an OS-level failure has been recorded. Does not clear it.
    pub fn has_error(&self) -> bool {
        self.last_errno.is_some()
    }

    /// Raw errno of the most recent OS failure, if any.
    pub fn last_errno(&self) -> Option<i32> {
        self.last_errno
    }

    /// Whether a read has observed end-of-file. Not an error condition;
    /// cleared by a successful [`seek`](Self::seek).
    pub fn is_at_end(&self) -> bool {
        self.eof
    }

    /// Reset both sticky indicators (clearerr-equivalent).
    pub fn clear_error(&mut self) {
        self.last_errno = None;
        self.eof = false;
    }

    pub fn access_mode(&self) -> AccessMode {
        self.access
    }

    pub fn buffer_capacity(&self) -> usize {
        self.buf.capacity()
    }

    // -----------------------------------------------------------------------
    // Buffering control
    // -----------------------------------------------------------------------

    /// Replace the buffer and policy (setvbuf-equivalent).
    ///
    /// A caller-supplied vector is adopted and resized to `size`;
    /// `BufMode::None` forces pass-through I/O; `BufMode::Line` is
    /// accepted but buffers exactly like `BufMode::Full`. Refused with
    /// [`StreamError::BufferInUse`] once any I/O has occurred, because
    /// the old buffer's cursors already describe descriptor state.
    pub fn set_buffer(
        &mut self,
        storage: Option<Vec<u8>>,
        mode: BufMode,
        size: usize,
    ) -> Result<(), StreamError> {
        if self.buf.replace(storage, mode, size) {
            Ok(())
        } else {
            Err(StreamError::BufferInUse)
        }
    }

    // -----------------------------------------------------------------------
    // Flush
    // -----------------------------------------------------------------------

    /// Reconcile buffered state with the descriptor and empty the buffer.
    ///
    /// Write mode drains staged bytes with one OS write; read mode seeks
    /// the descriptor back over unconsumed read-ahead so the OS offset
    /// matches the caller's logical position. Calling again with nothing
    /// buffered is a no-op.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        match self.buf.flush_plan() {
            FlushPlan::Nothing => {}
            FlushPlan::WritePending => {
                let wanted = self.buf.pending().len();
                let n = match sys::write(self.fd, self.buf.pending()) {
                    Ok(n) => n,
                    Err(e) => return Err(self.io_failure("flush write", e)),
                };
                if n < wanted {
                    let e = io::Error::new(io::ErrorKind::WriteZero, "short write draining buffer");
                    return Err(self.io_failure("flush write", e));
                }
            }
            FlushPlan::RewindBy(overshoot) => {
                if overshoot > 0 {
                    if let Err(e) = sys::seek(self.fd, -(overshoot as i64), libc::SEEK_CUR) {
                        return Err(self.io_failure("flush seek", e));
                    }
                }
            }
        }
        self.buf.reset();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Read path
    // -----------------------------------------------------------------------

    /// Read up to `dest.len()` bytes, returning the count transferred.
    ///
    /// A short count means end-of-file (the `eof` indicator is set, no
    /// error). Buffered bytes are drained first; once the buffer is
    /// exhausted the remainder is satisfied either by one pass-through
    /// OS read (requests larger than the buffer) or by refilling the
    /// buffer with one OS read and copying out of it.
    pub fn read(&mut self, dest: &mut [u8]) -> Result<usize, StreamError> {
        if !self.access.readable() {
            return Err(StreamError::Access {
                op: "read",
                mode: self.access,
            });
        }
        if prelude(self.buf.last(), IoDirection::Read) == Prelude::FlushFirst {
            self.flush()?;
        }
        if dest.is_empty() {
            return Ok(0);
        }

        let mut delivered = self.buf.take(dest);
        if delivered == dest.len() {
            return Ok(delivered);
        }
        if self.buf.last() == LastOp::Read {
            // Buffer exhausted mid-request: reconcile (a zero-length
            // rewind) so the refill below starts from a clean state.
            self.flush()?;
        }

        let fd = self.fd;
        let remaining = dest.len() - delivered;
        if remaining > self.buf.capacity() {
            // Pass-through: one OS read straight into the destination.
            let n = match sys::read(fd, &mut dest[delivered..]) {
                Ok(n) => n,
                Err(e) => return Err(self.io_failure("read", e)),
            };
            self.buf.note_passthrough(IoDirection::Read);
            if n < remaining {
                self.eof = true;
            }
            return Ok(delivered + n);
        }

        let n = match sys::read(fd, self.buf.fill_space()) {
            Ok(n) => n,
            Err(e) => return Err(self.io_failure("read", e)),
        };
        self.buf.finish_fill(n);
        if n == 0 {
            self.eof = true;
            return Ok(delivered);
        }
        delivered += self.buf.take(&mut dest[delivered..]);
        if delivered < dest.len() {
            // The fill came up short and was drained dry.
            self.eof = true;
        }
        Ok(delivered)
    }

    /// fread-equivalent: read whole elements of `size` bytes.
    ///
    /// Transfers at most `dest.len() / size` elements and returns the
    /// number fully read (integer division of bytes by `size`).
    pub fn read_records(&mut self, dest: &mut [u8], size: usize) -> Result<usize, StreamError> {
        if size == 0 {
            return Ok(0);
        }
        let usable = dest.len() - dest.len() % size;
        let bytes = self.read(&mut dest[..usable])?;
        Ok(bytes / size)
    }

    /// Read one byte; `None` at end-of-file.
    pub fn read_byte(&mut self) -> Result<Option<u8>, StreamError> {
        let mut one = [0u8; 1];
        let n = self.read(&mut one)?;
        Ok((n == 1).then_some(one[0]))
    }

    /// fgets-equivalent: read bytes until `max - 1` are consumed, a
    /// newline is consumed (kept in the result), or end-of-file.
    ///
    /// Returns `None` only when nothing could be read at end-of-file.
    /// On a genuine OS error mid-line the descriptor is repositioned to
    /// exactly where the call began, so the operation is atomic from the
    /// caller's perspective; only the sticky error marker survives.
    pub fn read_line(&mut self, max: usize) -> Result<Option<Vec<u8>>, StreamError> {
        if !self.access.readable() {
            return Err(StreamError::Access {
                op: "read_line",
                mode: self.access,
            });
        }
        // Do the direction switch up front so the rollback below only
        // ever has to undo reads.
        if prelude(self.buf.last(), IoDirection::Read) == Prelude::FlushFirst {
            self.flush()?;
        }

        let mut line = Vec::new();
        while line.len() + 1 < max {
            match self.read_byte() {
                Ok(Some(b)) => {
                    line.push(b);
                    if b == b'\n' {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    self.rewind_failed_line(line.len());
                    return Err(err);
                }
            }
        }
        if line.is_empty() && self.eof {
            return Ok(None);
        }
        Ok(Some(line))
    }

    /// Undo a partial line read after an OS failure.
    ///
    /// The descriptor sits ahead of the call's starting position by the
    /// unread buffered bytes plus every byte already delivered, so the
    /// corrective seek is derived from those two counts directly.
    fn rewind_failed_line(&mut self, delivered: usize) {
        let overshoot = (self.buf.unread() + delivered) as i64;
        self.buf.reset();
        if overshoot > 0 {
            if let Err(e) = sys::seek(self.fd, -overshoot, libc::SEEK_CUR) {
                let _ = self.io_failure("line rollback seek", e);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Write path
    // -----------------------------------------------------------------------

    /// Write `src`, returning the count transferred.
    ///
    /// Bytes are staged in the buffer when they fit in the remaining
    /// room; a write that would overflow flushes first, and one larger
    /// than the whole buffer goes straight to the OS.
    pub fn write(&mut self, src: &[u8]) -> Result<usize, StreamError> {
        if !self.access.writable() {
            return Err(StreamError::Access {
                op: "write",
                mode: self.access,
            });
        }
        if prelude(self.buf.last(), IoDirection::Write) == Prelude::FlushFirst {
            self.flush()?;
        }
        if src.is_empty() {
            return Ok(0);
        }
        if src.len() > self.buf.room() {
            self.flush()?;
        }
        if src.len() > self.buf.capacity() {
            let n = match sys::write(self.fd, src) {
                Ok(n) => n,
                Err(e) => return Err(self.io_failure("write", e)),
            };
            self.buf.note_passthrough(IoDirection::Write);
            return Ok(n);
        }
        Ok(self.buf.stage(src))
    }

    /// fwrite-equivalent: write whole elements of `size` bytes, returning
    /// the number fully transferred.
    pub fn write_records(&mut self, src: &[u8], size: usize) -> Result<usize, StreamError> {
        if size == 0 {
            return Ok(0);
        }
        let usable = src.len() - src.len() % size;
        let bytes = self.write(&src[..usable])?;
        Ok(bytes / size)
    }

    /// Write one byte.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), StreamError> {
        let n = self.write(&[byte])?;
        if n == 0 {
            let e = io::Error::new(io::ErrorKind::WriteZero, "byte not accepted");
            return Err(self.io_failure("write", e));
        }
        Ok(())
    }

    /// fputs-equivalent: write the full bytes of `text` (no newline
    /// appended), returning the count transferred.
    pub fn write_str(&mut self, text: &str) -> Result<usize, StreamError> {
        self.write(text.as_bytes())
    }

    /// Restricted fprintf: `%d`, `%s`, `%%`, with any other directive
    /// emitted literally. Returns the number of characters written.
    ///
    /// Arguments are checked against the directives before anything is
    /// emitted, so a mismatched call writes nothing. Every rendered byte
    /// then goes through the single-byte write path, inheriting all
    /// buffering and error semantics.
    pub fn write_formatted(
        &mut self,
        format: &str,
        args: &[FmtArg<'_>],
    ) -> Result<usize, StreamError> {
        let mut rendered = Vec::new();
        corefmt::render(format, args, &mut rendered)?;
        for &b in &rendered {
            self.write_byte(b)?;
        }
        Ok(rendered.len())
    }

    // -----------------------------------------------------------------------
    // Position
    // -----------------------------------------------------------------------

    /// Flush, then reposition the descriptor. Clears the end-of-file
    /// indicator on success. A failed OS seek is an error return, never
    /// a panic.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64, StreamError> {
        self.flush()?;
        let pos = match sys::seek(self.fd, offset, whence.raw()) {
            Ok(p) => p,
            Err(e) => return Err(self.io_failure("seek", e)),
        };
        self.eof = false;
        Ok(pos)
    }

    /// ftell-equivalent: the caller's logical position.
    ///
    /// The OS offset is adjusted by whatever the buffer has over-read
    /// (read mode) or not yet drained (write mode).
    pub fn position(&mut self) -> Result<u64, StreamError> {
        let os_offset = match sys::seek(self.fd, 0, libc::SEEK_CUR) {
            Ok(p) => p,
            Err(e) => return Err(self.io_failure("position", e)),
        };
        Ok(match self.buf.last() {
            LastOp::Read => os_offset - self.buf.unread() as u64,
            LastOp::Write => os_offset + self.buf.pending().len() as u64,
            LastOp::Idle => os_offset,
        })
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Flush pending writes and close the descriptor, reporting either
    /// failure. `Drop` performs the same sequence best-effort; use this
    /// when a close failure must not be swallowed.
    pub fn close(mut self) -> Result<(), StreamError> {
        self.teardown()
    }

    fn teardown(&mut self) -> Result<(), StreamError> {
        let flushed = self.flush();
        let fd = self.fd;
        self.fd = -1;
        let closed = sys::close(fd).map_err(|e| self.io_failure("close", e));
        flushed.and(closed)
    }

    fn io_failure(&mut self, op: &'static str, source: io::Error) -> StreamError {
        self.last_errno = source.raw_os_error().or(Some(libc::EIO));
        StreamError::Io { op, source }
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        if self.fd >= 0 {
            let _ = self.teardown();
        }
    }
}

fn oflags(flags: &OpenFlags) -> i32 {
    let mut bits = match flags.access() {
        AccessMode::ReadOnly => libc::O_RDONLY,
        AccessMode::WriteOnly => libc::O_WRONLY,
        AccessMode::ReadWrite => libc::O_RDWR,
    };
    if flags.create {
        bits |= libc::O_CREAT;
    }
    if flags.truncate {
        bits |= libc::O_TRUNC;
    }
    bits
}
