//! Restricted fprintf-style formatting.
//!
//! Supports literal text, `%d` (signed decimal, minimal width), `%s`,
//! and `%%`. Any other directive is passed through verbatim as the
//! percent sign plus the code character. Arguments are a tagged slice
//! rather than a variadic list, so mismatches are checked results
//! instead of undefined behavior.

use std::error::Error;
use std::fmt;

/// A tagged formatting argument.
#[derive(Debug, Clone, Copy)]
pub enum FmtArg<'a> {
    Int(i64),
    Str(&'a str),
}

/// Argument-list failure while rendering a format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FmtError {
    /// A `%d` or `%s` had no argument left to consume.
    MissingArgument { directive: char, index: usize },
    /// The argument at `index` does not match the directive.
    WrongType { directive: char, index: usize },
}

impl fmt::Display for FmtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FmtError::MissingArgument { directive, index } => {
                write!(f, "no argument for %{directive} (argument {index})")
            }
            FmtError::WrongType { directive, index } => {
                write!(f, "argument {index} does not match %{directive}")
            }
        }
    }
}

impl Error for FmtError {}

/// Render `format` with `args` into `out`.
///
/// The caller decides how the rendered bytes reach the descriptor; this
/// function never performs I/O. Rendering stops at the first failing
/// directive; callers are expected to discard `out` on error.
pub fn render(format: &str, args: &[FmtArg<'_>], out: &mut Vec<u8>) -> Result<(), FmtError> {
    let bytes = format.as_bytes();
    let mut next_arg = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'%' {
            out.push(b);
            i += 1;
            continue;
        }
        i += 1;
        match bytes.get(i) {
            // Lone trailing '%': emit it literally.
            None => {
                out.push(b'%');
            }
            Some(b'%') => {
                out.push(b'%');
                i += 1;
            }
            Some(b'd') => {
                match take_arg('d', args, &mut next_arg)? {
                    FmtArg::Int(value) => format_signed(value, out),
                    FmtArg::Str(_) => {
                        return Err(FmtError::WrongType {
                            directive: 'd',
                            index: next_arg - 1,
                        });
                    }
                }
                i += 1;
            }
            Some(b's') => {
                match take_arg('s', args, &mut next_arg)? {
                    FmtArg::Str(text) => out.extend_from_slice(text.as_bytes()),
                    FmtArg::Int(_) => {
                        return Err(FmtError::WrongType {
                            directive: 's',
                            index: next_arg - 1,
                        });
                    }
                }
                i += 1;
            }
            // Unknown directive: pass through as-is.
            Some(&other) => {
                out.push(b'%');
                out.push(other);
                i += 1;
            }
        }
    }
    Ok(())
}

fn take_arg<'a, 'b>(
    directive: char,
    args: &'b [FmtArg<'a>],
    next: &mut usize,
) -> Result<FmtArg<'a>, FmtError> {
    let arg = args.get(*next).copied().ok_or(FmtError::MissingArgument {
        directive,
        index: *next,
    })?;
    *next += 1;
    Ok(arg)
}

/// Minimal-width sign-aware decimal conversion.
///
/// Works on the unsigned magnitude so `i64::MIN` does not overflow.
pub fn format_signed(value: i64, out: &mut Vec<u8>) {
    if value == 0 {
        out.push(b'0');
        return;
    }
    let negative = value < 0;
    let mut magnitude = value.unsigned_abs();
    // 20 digits covers u64::MAX.
    let mut digits = [0u8; 20];
    let mut n = 0;
    while magnitude > 0 {
        digits[n] = b'0' + (magnitude % 10) as u8;
        magnitude /= 10;
        n += 1;
    }
    if negative {
        out.push(b'-');
    }
    for d in digits[..n].iter().rev() {
        out.push(*d);
    }
}
