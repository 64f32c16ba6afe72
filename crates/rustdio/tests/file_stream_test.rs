//! Integration test: buffered stream semantics over real files.
//!
//! Exercises the full operation surface against a temp directory:
//! round-trips, direction switches, buffer-size independence (including
//! pass-through transfers larger than the buffer), EOF vs. error
//! signaling, line reads, seeking, and setvbuf-style reconfiguration.
//!
//! Run: cargo test -p rustdio --test file_stream_test

use std::fs;
use std::path::{Path, PathBuf};

use rustdio::{BufMode, FileStream, FmtArg, StreamError, Whence};
use tempfile::TempDir;

fn fixture(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn read_back(path: &Path) -> Vec<u8> {
    fs::read(path).expect("read back")
}

// ---------------------------------------------------------------------
// Round trip
// ---------------------------------------------------------------------

#[test]
fn write_flush_reopen_read_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("round_trip.bin");
    let payload: Vec<u8> = (0..2000u32).map(|i| (i % 251) as u8).collect();

    let mut out = FileStream::open(&path, "w").unwrap();
    assert_eq!(out.write(&payload).unwrap(), payload.len());
    out.close().unwrap();

    let mut input = FileStream::open(&path, "r").unwrap();
    let mut got = vec![0u8; payload.len()];
    assert_eq!(input.read(&mut got).unwrap(), payload.len());
    assert_eq!(got, payload);
}

#[test]
fn close_reports_success_and_flushes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("close.txt");

    let mut out = FileStream::open(&path, "w").unwrap();
    out.write_str("buffered until close").unwrap();
    // Still staged: nothing on disk yet.
    assert_eq!(read_back(&path), b"");
    out.close().unwrap();
    assert_eq!(read_back(&path), b"buffered until close");
}

// ---------------------------------------------------------------------
// Mode exclusivity
// ---------------------------------------------------------------------

#[test]
fn write_on_read_only_stream_is_rejected_without_side_effects() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "ro.txt", b"abc");

    let mut stream = FileStream::open(&path, "r").unwrap();
    let err = stream.write(b"nope").unwrap_err();
    assert!(matches!(err, StreamError::Access { .. }));
    assert!(!stream.has_error());

    // The stream stays usable for permitted operations.
    let mut got = [0u8; 3];
    assert_eq!(stream.read(&mut got).unwrap(), 3);
    assert_eq!(&got, b"abc");
    drop(stream);
    assert_eq!(read_back(&path), b"abc");
}

#[test]
fn read_on_write_only_stream_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("wo.txt");

    let mut stream = FileStream::open(&path, "w").unwrap();
    let mut got = [0u8; 4];
    assert!(matches!(
        stream.read(&mut got),
        Err(StreamError::Access { .. })
    ));
    assert!(matches!(
        stream.read_line(16),
        Err(StreamError::Access { .. })
    ));
    assert!(!stream.has_error());
}

#[test]
fn append_modes_are_rejected_not_reinterpreted() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "a.txt", b"x");

    for mode in ["a", "a+", "rw", ""] {
        let err = FileStream::open(&path, mode).unwrap_err();
        assert!(matches!(err, StreamError::UnsupportedMode { .. }), "{mode}");
    }
}

#[test]
fn open_missing_file_read_only_fails() {
    let dir = TempDir::new().unwrap();
    let err = FileStream::open(dir.path().join("absent"), "r").unwrap_err();
    assert!(matches!(err, StreamError::Open { .. }));
}

// ---------------------------------------------------------------------
// Buffer-size independence
// ---------------------------------------------------------------------

#[test]
fn chunked_reads_match_one_shot_for_any_capacity() {
    let dir = TempDir::new().unwrap();
    let payload: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 253) as u8).collect();
    let path = fixture(&dir, "chunks.bin", &payload);

    // Chunk sizes deliberately straddle every capacity under test, so
    // both the buffered and the pass-through paths get exercised.
    let chunk_sizes = [1usize, 2, 3, 5, 7, 64, 100, 5000];

    for capacity in [1usize, 3, 7, 64, 4096, 8192] {
        let mut stream = FileStream::open(&path, "r").unwrap();
        stream
            .set_buffer(None, BufMode::Full, capacity)
            .unwrap_or_else(|e| panic!("set_buffer({capacity}): {e}"));

        let mut collected = Vec::new();
        let mut turn = 0usize;
        loop {
            let want = chunk_sizes[turn % chunk_sizes.len()];
            turn += 1;
            let mut chunk = vec![0u8; want];
            let n = stream.read(&mut chunk).unwrap();
            collected.extend_from_slice(&chunk[..n]);
            if n < want {
                break;
            }
        }
        assert!(stream.is_at_end());
        assert!(!stream.has_error());
        assert_eq!(collected, payload, "capacity {capacity}");
    }
}

#[test]
fn oversized_write_takes_the_pass_through_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("big.bin");
    let small = b"small";
    let big: Vec<u8> = vec![0xAB; 64];

    let mut out = FileStream::open(&path, "w").unwrap();
    out.set_buffer(None, BufMode::Full, 16).unwrap();
    out.write(small).unwrap();
    // Larger than the 16-byte buffer: flushes "small", then lands
    // directly, so everything is on disk before any explicit flush.
    out.write(&big).unwrap();
    let mut expect = small.to_vec();
    expect.extend_from_slice(&big);
    assert_eq!(read_back(&path), expect);
    out.close().unwrap();
    assert_eq!(read_back(&path), expect);
}

// ---------------------------------------------------------------------
// EOF and error signaling
// ---------------------------------------------------------------------

#[test]
fn short_read_sets_eof_without_error() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "five.bin", b"12345");

    let mut stream = FileStream::open(&path, "r").unwrap();
    let mut got = [0u8; 16];
    assert_eq!(stream.read(&mut got).unwrap(), 5);
    assert!(stream.is_at_end());
    assert!(!stream.has_error());

    // Reading past EOF keeps returning zero, still no error.
    assert_eq!(stream.read(&mut got).unwrap(), 0);
    assert_eq!(stream.read_byte().unwrap(), None);
    assert!(!stream.has_error());
}

#[test]
fn os_level_read_failure_sets_sticky_error() {
    let dir = TempDir::new().unwrap();
    // Opening a directory read-only succeeds on Linux; reading it fails
    // with EISDIR — a genuine OS failure, not end-of-file.
    let mut stream = FileStream::open(dir.path(), "r").unwrap();
    let mut got = [0u8; 8];
    let err = stream.read(&mut got).unwrap_err();
    assert!(matches!(err, StreamError::Io { .. }));
    assert!(stream.has_error());
    assert!(stream.last_errno().is_some());
    assert!(!stream.is_at_end());
}

#[test]
fn seek_clears_eof() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "seekme.txt", b"0123456789");

    let mut stream = FileStream::open(&path, "r").unwrap();
    let mut all = [0u8; 32];
    assert_eq!(stream.read(&mut all).unwrap(), 10);
    assert!(stream.is_at_end());

    assert_eq!(stream.seek(0, Whence::Set).unwrap(), 0);
    assert!(!stream.is_at_end());
    let mut again = [0u8; 10];
    assert_eq!(stream.read(&mut again).unwrap(), 10);
    assert_eq!(&again, b"0123456789");
}

#[test]
fn seek_from_end_and_current() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "whence.txt", b"0123456789");

    let mut stream = FileStream::open(&path, "r").unwrap();
    assert_eq!(stream.seek(-3, Whence::End).unwrap(), 7);
    let mut tail = [0u8; 3];
    assert_eq!(stream.read(&mut tail).unwrap(), 3);
    assert_eq!(&tail, b"789");

    // The flush before the seek rewinds over buffered read-ahead, so a
    // relative seek starts from the logical position.
    assert_eq!(stream.seek(0, Whence::Set).unwrap(), 0);
    let mut two = [0u8; 2];
    stream.read(&mut two).unwrap();
    assert_eq!(stream.seek(2, Whence::Current).unwrap(), 4);
    let mut mid = [0u8; 2];
    assert_eq!(stream.read(&mut mid).unwrap(), 2);
    assert_eq!(&mid, b"45");
}

// ---------------------------------------------------------------------
// Flush
// ---------------------------------------------------------------------

#[test]
fn flush_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flush.txt");

    let mut out = FileStream::open(&path, "w").unwrap();
    out.write_str("once").unwrap();
    out.flush().unwrap();
    out.flush().unwrap();
    assert_eq!(read_back(&path), b"once");

    // And on a stream with no I/O at all.
    let mut idle = FileStream::open(&path, "r").unwrap();
    idle.flush().unwrap();
    idle.flush().unwrap();
}

#[test]
fn read_write_interleave_on_update_stream() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "update.txt", b"abcdef");

    let mut stream = FileStream::open(&path, "r+").unwrap();
    let mut head = [0u8; 3];
    assert_eq!(stream.read(&mut head).unwrap(), 3);
    assert_eq!(&head, b"abc");

    // Direction switch: the flush rewinds the descriptor over the three
    // unread buffered bytes, so the write lands at offset 3.
    assert_eq!(stream.write(b"XY").unwrap(), 2);
    stream.flush().unwrap();
    assert_eq!(read_back(&path), b"abcXYf");

    // Switch back and pick up right after the write.
    let mut tail = [0u8; 1];
    assert_eq!(stream.read(&mut tail).unwrap(), 1);
    assert_eq!(&tail, b"f");
}

#[test]
fn position_accounts_for_buffered_bytes() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "pos.txt", b"hello");

    let mut out = FileStream::open(&path, "w+").unwrap();
    out.write_str("hello").unwrap();
    // Still staged, but logically five bytes in.
    assert_eq!(out.position().unwrap(), 5);
    out.flush().unwrap();
    assert_eq!(out.position().unwrap(), 5);

    out.seek(0, Whence::Set).unwrap();
    assert_eq!(out.read_byte().unwrap(), Some(b'h'));
    // The buffer over-read the rest of the file; logical position is 1.
    assert_eq!(out.position().unwrap(), 1);
}

// ---------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------

#[test]
fn line_reads_split_on_newline_inclusive() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "lines.txt", b"abc\ndef\n");

    let mut stream = FileStream::open(&path, "r").unwrap();
    assert_eq!(stream.read_line(8).unwrap().unwrap(), b"abc\n");
    assert_eq!(stream.read_line(8).unwrap().unwrap(), b"def\n");
    assert_eq!(stream.read_line(8).unwrap(), None);
    assert!(stream.is_at_end());
    assert!(!stream.has_error());
}

#[test]
fn line_read_respects_max_bound() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "long.txt", b"abcdef\n");

    let mut stream = FileStream::open(&path, "r").unwrap();
    // max counts the would-be terminator, so 4 yields three bytes.
    assert_eq!(stream.read_line(4).unwrap().unwrap(), b"abc");
    assert_eq!(stream.read_line(64).unwrap().unwrap(), b"def\n");
}

#[test]
fn line_read_without_trailing_newline_returns_remainder() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "tail.txt", b"no newline");

    let mut stream = FileStream::open(&path, "r").unwrap();
    assert_eq!(stream.read_line(64).unwrap().unwrap(), b"no newline");
    assert_eq!(stream.read_line(64).unwrap(), None);
}

// ---------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------

#[test]
fn record_transfer_counts_whole_elements() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.bin");

    let mut out = FileStream::open(&path, "w").unwrap();
    // Eight bytes, three-byte records: only two complete records move.
    assert_eq!(out.write_records(b"abcdefgh", 3).unwrap(), 2);
    assert_eq!(out.write_records(b"abc", 0).unwrap(), 0);
    out.close().unwrap();
    assert_eq!(read_back(&path), b"abcdef");

    let mut input = FileStream::open(&path, "r").unwrap();
    let mut dest = [0u8; 8];
    assert_eq!(input.read_records(&mut dest, 3).unwrap(), 2);
    assert_eq!(&dest[..6], b"abcdef");
}

// ---------------------------------------------------------------------
// Formatted writes
// ---------------------------------------------------------------------

#[test]
fn formatted_write_renders_directives() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fmt.txt");

    let mut out = FileStream::open(&path, "w").unwrap();
    let n = out
        .write_formatted("%s=%d%%", &[FmtArg::Str("x"), FmtArg::Int(42)])
        .unwrap();
    assert_eq!(n, 5);
    out.close().unwrap();
    assert_eq!(read_back(&path), b"x=42%");
}

#[test]
fn formatted_write_with_bad_arguments_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fmt_bad.txt");

    let mut out = FileStream::open(&path, "w").unwrap();
    let err = out.write_formatted("%s %d", &[FmtArg::Str("only")]).unwrap_err();
    assert!(matches!(err, StreamError::Format(_)));
    out.close().unwrap();
    assert_eq!(read_back(&path), b"");
}

// ---------------------------------------------------------------------
// Buffer configuration
// ---------------------------------------------------------------------

#[test]
fn set_buffer_rejected_after_io() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "late.txt", b"data");

    let mut stream = FileStream::open(&path, "r").unwrap();
    assert!(stream.set_buffer(None, BufMode::Full, 64).is_ok());
    assert_eq!(stream.buffer_capacity(), 64);

    let mut got = [0u8; 2];
    stream.read(&mut got).unwrap();
    assert!(matches!(
        stream.set_buffer(None, BufMode::Full, 128),
        Err(StreamError::BufferInUse)
    ));
    assert_eq!(stream.buffer_capacity(), 64);
}

#[test]
fn caller_supplied_buffer_is_adopted() {
    let dir = TempDir::new().unwrap();
    let path = fixture(&dir, "adopt.txt", b"payload");

    let mut stream = FileStream::open(&path, "r").unwrap();
    stream
        .set_buffer(Some(vec![0u8; 256]), BufMode::Full, 32)
        .unwrap();
    assert_eq!(stream.buffer_capacity(), 32);

    let mut got = [0u8; 7];
    assert_eq!(stream.read(&mut got).unwrap(), 7);
    assert_eq!(&got, b"payload");
}

#[test]
fn unbuffered_mode_passes_every_byte_through() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("raw.txt");

    let mut out = FileStream::open(&path, "w").unwrap();
    out.set_buffer(None, BufMode::None, 0).unwrap();
    assert_eq!(out.buffer_capacity(), 0);

    out.write_byte(b'h').unwrap();
    out.write_byte(b'i').unwrap();
    // No flush needed: unbuffered writes land immediately.
    assert_eq!(read_back(&path), b"hi");

    let mut input = FileStream::open(&path, "r").unwrap();
    input.set_buffer(None, BufMode::None, 0).unwrap();
    assert_eq!(input.read_byte().unwrap(), Some(b'h'));
    assert_eq!(input.read_byte().unwrap(), Some(b'i'));
    assert_eq!(input.read_byte().unwrap(), None);
    assert!(input.is_at_end());
}
