//! Buffered I/O engine.
//!
//! A single fixed-capacity buffer shadows the file descriptor for both
//! directions, one at a time. Two cursors describe it: `at` is the next
//! byte to consume (read side) or the number of bytes staged (write
//! side); `end` is the high-water mark of valid bytes after a fill.
//!
//! Direction switches are governed by an explicit transition table
//! rather than scattered conditionals: the owning stream asks
//! [`prelude`] whether a flush must precede the next operation, then
//! asks [`StreamBuffer::flush_plan`] what that flush requires.

/// Default buffer capacity (POSIX BUFSIZ).
pub const BUFSIZ: usize = 8192;

/// Buffering policy, matching the classic setvbuf modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufMode {
    /// Fully buffered: transfers go through the buffer when they fit.
    Full,
    /// Line buffered. Accepted but handled as [`BufMode::Full`].
    Line,
    /// Unbuffered: zero capacity, every transfer passes straight through.
    None,
}

/// The most recent buffer-affecting operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastOp {
    /// Buffer is empty and direction-neutral (fresh, or just flushed).
    #[default]
    Idle,
    /// Buffer holds read-ahead data from the descriptor.
    Read,
    /// Buffer holds staged bytes not yet written to the descriptor.
    Write,
}

/// Direction of a requested transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoDirection {
    Read,
    Write,
}

/// What must happen before a transfer in the given direction may proceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prelude {
    Proceed,
    FlushFirst,
}

/// State-transition table: last operation x requested direction.
///
/// Only a genuine direction switch forces a flush; same-direction
/// traffic and idle streams proceed untouched.
pub fn prelude(last: LastOp, next: IoDirection) -> Prelude {
    match (last, next) {
        (LastOp::Read, IoDirection::Write) | (LastOp::Write, IoDirection::Read) => {
            Prelude::FlushFirst
        }
        _ => Prelude::Proceed,
    }
}

/// Action required to reconcile the buffer with the descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPlan {
    /// Nothing buffered; only the cursors need resetting.
    Nothing,
    /// Staged write bytes (`pending()`) must be drained to the descriptor.
    WritePending,
    /// The descriptor has over-read by this many bytes; seek backward so
    /// the OS offset matches what the caller has logically consumed.
    RewindBy(u64),
}

/// Stream buffer with explicit consume/high-water cursors.
///
/// Invariants:
/// - read side: `at <= end <= capacity`
/// - write side: `at <= capacity`, `end == 0`
/// - at most one side is active, per `last`
#[derive(Debug)]
pub struct StreamBuffer {
    data: Vec<u8>,
    /// Next byte to consume (read) / bytes staged so far (write).
    at: usize,
    /// High-water mark of valid bytes after a fill.
    end: usize,
    mode: BufMode,
    last: LastOp,
    /// Latched by the first transfer; blocks buffer replacement after.
    io_started: bool,
}

impl StreamBuffer {
    /// Create a buffer with the given policy and capacity.
    pub fn new(mode: BufMode, capacity: usize) -> Self {
        let cap = match mode {
            BufMode::None => 0,
            BufMode::Full | BufMode::Line => capacity.max(1),
        };
        Self {
            data: vec![0u8; cap],
            at: 0,
            end: 0,
            mode,
            last: LastOp::Idle,
            io_started: false,
        }
    }

    /// Fully-buffered buffer with the default BUFSIZ capacity.
    pub fn default_full() -> Self {
        Self::new(BufMode::Full, BUFSIZ)
    }

    pub fn mode(&self) -> BufMode {
        self.mode
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn last(&self) -> LastOp {
        self.last
    }

    pub fn io_started(&self) -> bool {
        self.io_started
    }

    /// Bytes filled but not yet consumed (read side).
    pub fn unread(&self) -> usize {
        self.end - self.at
    }

    /// Space left for staging before the buffer overflows (write side).
    pub fn room(&self) -> usize {
        self.data.len() - self.at
    }

    /// Staged write bytes awaiting a drain.
    pub fn pending(&self) -> &[u8] {
        &self.data[..self.at]
    }

    // -----------------------------------------------------------------------
    // Flush
    // -----------------------------------------------------------------------

    /// What reconciling this buffer with the descriptor requires.
    pub fn flush_plan(&self) -> FlushPlan {
        match self.last {
            LastOp::Idle => FlushPlan::Nothing,
            LastOp::Write => {
                if self.at == 0 {
                    FlushPlan::Nothing
                } else {
                    FlushPlan::WritePending
                }
            }
            LastOp::Read => FlushPlan::RewindBy(self.unread() as u64),
        }
    }

    /// Reset to the empty, direction-neutral state.
    ///
    /// Called after the flush plan has been carried out, and when a
    /// failed line read discards buffered state wholesale.
    pub fn reset(&mut self) {
        self.at = 0;
        self.end = 0;
        self.last = LastOp::Idle;
    }

    // -----------------------------------------------------------------------
    // Read side
    // -----------------------------------------------------------------------

    /// The whole storage area, for one OS read to fill.
    pub fn fill_space(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    /// Record the result of a fill: `n` valid bytes, cursor rewound.
    ///
    /// A zero fill leaves the buffer idle (end-of-input is the stream's
    /// call to make, not the buffer's).
    pub fn finish_fill(&mut self, n: usize) {
        debug_assert!(n <= self.data.len());
        self.io_started = true;
        if n == 0 {
            self.reset();
        } else {
            self.at = 0;
            self.end = n;
            self.last = LastOp::Read;
        }
    }

    /// Copy unconsumed bytes out to `dest`, advancing `at`.
    ///
    /// Returns the number copied, bounded by both `dest` and `unread()`.
    pub fn take(&mut self, dest: &mut [u8]) -> usize {
        let n = self.unread().min(dest.len());
        dest[..n].copy_from_slice(&self.data[self.at..self.at + n]);
        self.at += n;
        n
    }

    // -----------------------------------------------------------------------
    // Write side
    // -----------------------------------------------------------------------

    /// Stage bytes into the buffer at `at`, switching to write state.
    ///
    /// Returns the number staged, bounded by `room()`. Callers flush
    /// beforehand when `src` would not fit, so a partial stage here
    /// means the caller skipped that step.
    pub fn stage(&mut self, src: &[u8]) -> usize {
        let n = self.room().min(src.len());
        self.data[self.at..self.at + n].copy_from_slice(&src[..n]);
        self.at += n;
        self.last = LastOp::Write;
        self.io_started = true;
        n
    }

    /// Note a transfer that bypassed the buffer entirely.
    ///
    /// Keeps `last` honest for the transition table and latches
    /// `io_started` so replacement is refused afterward.
    pub fn note_passthrough(&mut self, direction: IoDirection) {
        self.io_started = true;
        if direction == IoDirection::Write {
            self.last = LastOp::Write;
        }
    }

    // -----------------------------------------------------------------------
    // Replacement (setvbuf)
    // -----------------------------------------------------------------------

    /// Replace storage and policy. Refused once any I/O has occurred,
    /// since the cursors would no longer describe the descriptor state.
    ///
    /// A caller-supplied vector is adopted and resized to `size`; with no
    /// vector, fresh storage is allocated.
    pub fn replace(&mut self, storage: Option<Vec<u8>>, mode: BufMode, size: usize) -> bool {
        if self.io_started {
            return false;
        }
        let cap = match mode {
            BufMode::None => 0,
            BufMode::Full | BufMode::Line => size.max(1),
        };
        let mut data = storage.unwrap_or_default();
        data.resize(cap, 0);
        self.data = data;
        self.mode = mode;
        self.at = 0;
        self.end = 0;
        self.last = LastOp::Idle;
        true
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
