//! Executable conformance scenarios.
//!
//! Each scenario sets up its own files under the work directory, drives
//! a `FileStream` through part of the contract, and reports what it
//! observed. Infrastructure failures (work directory unusable) abort the
//! run; contract mismatches and unexpected stream errors become failed
//! scenario reports.

use std::fs;
use std::path::Path;

use rustdio::{BufMode, FileStream, FmtArg, StreamError, Whence};
use thiserror::Error;

use crate::report::ScenarioReport;

/// Scenario identifiers, in execution order.
pub const SCENARIOS: &[&str] = &[
    "round_trip",
    "chunked_equivalence",
    "line_splitting",
    "mode_rejection",
    "seek_clears_eof",
    "formatted_write",
    "unbuffered_passthrough",
];

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("stream failure: {0}")]
    Stream(#[from] StreamError),
    #[error("work directory I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Run every scenario, converting unexpected failures into failed
/// reports so one broken scenario never hides the rest.
pub fn run_all(workdir: &Path) -> Result<Vec<ScenarioReport>, HarnessError> {
    fs::create_dir_all(workdir)?;
    type Runner = fn(&Path) -> Result<ScenarioReport, HarnessError>;
    let runners: &[(&str, Runner)] = &[
        ("round_trip", round_trip),
        ("chunked_equivalence", chunked_equivalence),
        ("line_splitting", line_splitting),
        ("mode_rejection", mode_rejection),
        ("seek_clears_eof", seek_clears_eof),
        ("formatted_write", formatted_write),
        ("unbuffered_passthrough", unbuffered_passthrough),
    ];
    let mut reports = Vec::with_capacity(runners.len());
    for (name, run) in runners {
        let report = match run(workdir) {
            Ok(r) => r,
            Err(err) => ScenarioReport::fail(*name, err.to_string()),
        };
        reports.push(report);
    }
    Ok(reports)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

fn round_trip(workdir: &Path) -> Result<ScenarioReport, HarnessError> {
    let path = workdir.join("round_trip.bin");
    // Larger than BUFSIZ so both pass-through paths get exercised.
    let payload = pattern(64 * 1024 + 17);

    let mut out = FileStream::open(&path, "w")?;
    out.write(&payload)?;
    out.close()?;

    let mut input = FileStream::open(&path, "r")?;
    let mut got = vec![0u8; payload.len()];
    let n = input.read(&mut got)?;

    let written = sha256_hex(&payload);
    let reread = sha256_hex(&got[..n]);
    let independent = sha256_hex(&fs::read(&path)?);
    if n == payload.len() && reread == written && independent == written {
        Ok(ScenarioReport::pass(
            "round_trip",
            format!("sha256 {written} over {n} bytes"),
        ))
    } else {
        Ok(ScenarioReport::fail(
            "round_trip",
            format!("wrote {written}, stream reread {reread} ({n} bytes), fs saw {independent}"),
        ))
    }
}

fn chunked_equivalence(workdir: &Path) -> Result<ScenarioReport, HarnessError> {
    let path = workdir.join("chunked.bin");
    let payload = pattern(10_000);
    fs::write(&path, &payload)?;
    let reference = sha256_hex(&payload);

    let chunk_sizes = [1usize, 2, 3, 5, 7, 64, 100, 5000];
    for capacity in [1usize, 3, 7, 64, 4096, 8192] {
        let mut stream = FileStream::open(&path, "r")?;
        stream.set_buffer(None, BufMode::Full, capacity)?;

        let mut collected = Vec::with_capacity(payload.len());
        let mut turn = 0usize;
        loop {
            let want = chunk_sizes[turn % chunk_sizes.len()];
            turn += 1;
            let mut chunk = vec![0u8; want];
            let n = stream.read(&mut chunk)?;
            collected.extend_from_slice(&chunk[..n]);
            if n < want {
                break;
            }
        }
        let got = sha256_hex(&collected);
        if got != reference {
            return Ok(ScenarioReport::fail(
                "chunked_equivalence",
                format!("capacity {capacity}: digest {got} != one-shot {reference}"),
            ));
        }
    }
    Ok(ScenarioReport::pass(
        "chunked_equivalence",
        format!("6 capacities converge on {reference}"),
    ))
}

fn line_splitting(workdir: &Path) -> Result<ScenarioReport, HarnessError> {
    let path = workdir.join("lines.txt");
    fs::write(&path, b"alpha\nbeta\ngamma")?;

    let mut stream = FileStream::open(&path, "r")?;
    let mut lines = Vec::new();
    while let Some(line) = stream.read_line(32)? {
        lines.push(line);
    }
    let expect: Vec<&[u8]> = vec![b"alpha\n", b"beta\n", b"gamma"];
    if lines == expect && stream.is_at_end() && !stream.has_error() {
        Ok(ScenarioReport::pass(
            "line_splitting",
            format!("{} lines, trailing fragment kept", lines.len()),
        ))
    } else {
        Ok(ScenarioReport::fail(
            "line_splitting",
            format!("got {} lines: {:?}", lines.len(), lines),
        ))
    }
}

fn mode_rejection(workdir: &Path) -> Result<ScenarioReport, HarnessError> {
    let path = workdir.join("modes.txt");
    fs::write(&path, b"guarded")?;

    let mut read_only = FileStream::open(&path, "r")?;
    let write_refused = matches!(
        read_only.write(b"x"),
        Err(StreamError::Access { .. })
    ) && !read_only.has_error();

    let mut write_only = FileStream::open(&path, "w")?;
    let mut scratch = [0u8; 4];
    let read_refused = matches!(
        write_only.read(&mut scratch),
        Err(StreamError::Access { .. })
    ) && !write_only.has_error();

    let append_refused = matches!(
        FileStream::open(&path, "a"),
        Err(StreamError::UnsupportedMode { .. })
    );

    if write_refused && read_refused && append_refused {
        Ok(ScenarioReport::pass(
            "mode_rejection",
            "write-on-r, read-on-w and mode \"a\" all refused".to_string(),
        ))
    } else {
        Ok(ScenarioReport::fail(
            "mode_rejection",
            format!(
                "write_refused={write_refused} read_refused={read_refused} append_refused={append_refused}"
            ),
        ))
    }
}

fn seek_clears_eof(workdir: &Path) -> Result<ScenarioReport, HarnessError> {
    let path = workdir.join("seek.bin");
    fs::write(&path, b"0123456789")?;

    let mut stream = FileStream::open(&path, "r")?;
    let mut sink = [0u8; 32];
    let first = stream.read(&mut sink)?;
    let eof_after_read = stream.is_at_end();

    stream.seek(0, Whence::Set)?;
    let eof_after_seek = stream.is_at_end();
    let second = stream.read(&mut sink)?;

    if first == 10 && eof_after_read && !eof_after_seek && second == 10 {
        Ok(ScenarioReport::pass(
            "seek_clears_eof",
            "EOF latched by short read, cleared by seek, reread ok".to_string(),
        ))
    } else {
        Ok(ScenarioReport::fail(
            "seek_clears_eof",
            format!(
                "first={first} eof_after_read={eof_after_read} eof_after_seek={eof_after_seek} second={second}"
            ),
        ))
    }
}

fn formatted_write(workdir: &Path) -> Result<ScenarioReport, HarnessError> {
    let path = workdir.join("fmt.txt");

    let mut out = FileStream::open(&path, "w")?;
    let n = out.write_formatted("%s=%d%%", &[FmtArg::Str("x"), FmtArg::Int(42)])?;
    out.close()?;

    let on_disk = fs::read(&path)?;
    if n == 5 && on_disk == b"x=42%" {
        Ok(ScenarioReport::pass("formatted_write", "\"x=42%\" in 5 chars".to_string()))
    } else {
        Ok(ScenarioReport::fail(
            "formatted_write",
            format!("returned {n}, disk holds {:?}", String::from_utf8_lossy(&on_disk)),
        ))
    }
}

fn unbuffered_passthrough(workdir: &Path) -> Result<ScenarioReport, HarnessError> {
    let path = workdir.join("raw.bin");

    let mut out = FileStream::open(&path, "w")?;
    out.set_buffer(None, BufMode::None, 0)?;
    out.write(b"abc")?;
    // Unbuffered: visible before any flush or close.
    let visible = fs::read(&path)?;
    out.close()?;

    if visible == b"abc" {
        Ok(ScenarioReport::pass(
            "unbuffered_passthrough",
            "bytes visible on disk before flush".to_string(),
        ))
    } else {
        Ok(ScenarioReport::fail(
            "unbuffered_passthrough",
            format!("disk held {:?} before flush", String::from_utf8_lossy(&visible)),
        ))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
}

fn hex_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(&mut out, "{b:02x}").expect("writing to String should not fail");
    }
    out
}

fn sha256_hex(data: &[u8]) -> String {
    use sha2::Digest;
    hex_lower(&sha2::Sha256::digest(data))
}
