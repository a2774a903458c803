use std::ffi::{OsStr, OsString};

use bstr::{BStr, ByteSlice};

/// A simple extension trait that adds some methods to OS strings.
pub trait OsStrExt {
    fn as_os_str_slice(&self) -> &OsStr;

    /// Converts this OS string to a string slice, or returns an error if it
    /// isn't valid UTF-8.
    fn to_str(&self) -> anyhow::Result<&str> {
        let osstr = self.as_os_str_slice();
        osstr.to_str().ok_or_else(|| {
            anyhow::anyhow!("argument {osstr:?} is not valid UTF-8")
        })
    }
}

impl OsStrExt for OsStr {
    fn as_os_str_slice(&self) -> &OsStr {
        self
    }
}

impl OsStrExt for OsString {
    fn as_os_str_slice(&self) -> &OsStr {
        self.as_os_str()
    }
}

/// A borrowed line read from a stream, along with its line number.
#[derive(Clone, Copy, Debug)]
pub struct Line<'a> {
    /// The line number, 1-indexed.
    number: usize,
    /// The full line including its line terminator if present.
    full: &'a BStr,
}

impl<'a> Line<'a> {
    pub fn new(number: usize, full: &'a [u8]) -> Line<'a> {
        Line { number, full: full.as_bstr() }
    }

    /// Return the one-indexed line number of this line.
    pub fn number(&self) -> usize {
        self.number
    }

    /// Return the line without its `\n` or `\r\n` terminator.
    pub fn content(&self) -> &'a BStr {
        let mut content: &[u8] = self.full;
        if let Some(rest) = content.strip_suffix(b"\n") {
            content = rest.strip_suffix(b"\r").unwrap_or(rest);
        }
        content.as_bstr()
    }

    /// Returns true when this line contains only ASCII whitespace.
    pub fn is_blank(&self) -> bool {
        self.content().iter().all(u8::is_ascii_whitespace)
    }
}

/// An extension trait for `std::io::BufRead` for visiting lines as bytes.
///
/// This is like the line iterators in `bstr::io`, but with an
/// `anyhow::Result` so that the closure can fail with any error.
pub trait BufReadExt: std::io::BufRead {
    /// Calls `for_each_line` on every line in this reader, until there are
    /// no more lines, the closure returns `false` or the closure returns an
    /// error.
    fn for_byte_line<F>(&mut self, mut for_each_line: F) -> anyhow::Result<()>
    where
        Self: Sized,
        F: FnMut(Line<'_>) -> anyhow::Result<bool>,
    {
        let mut buf = vec![];
        let mut number = 0;
        loop {
            buf.clear();
            if self.read_until(b'\n', &mut buf)? == 0 {
                return Ok(());
            }
            number += 1;
            if !for_each_line(Line::new(number, &buf))? {
                return Ok(());
            }
        }
    }
}

impl<B: std::io::BufRead> BufReadExt for B {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines() {
        let input = b"one\r\ntwo\n\n  \nlast";
        let mut seen = vec![];
        (&input[..])
            .for_byte_line(|line| {
                seen.push((line.number(), line.content().to_string()));
                Ok(true)
            })
            .unwrap();
        assert_eq!(
            seen,
            vec![
                (1, "one".to_string()),
                (2, "two".to_string()),
                (3, "".to_string()),
                (4, "  ".to_string()),
                (5, "last".to_string()),
            ],
        );
    }

    #[test]
    fn stop_early() {
        let mut count = 0;
        (&b"a\nb\nc\n"[..])
            .for_byte_line(|line| {
                count += 1;
                Ok(line.number() < 2)
            })
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn blank() {
        assert!(Line::new(1, b" \t\r\n").is_blank());
        assert!(!Line::new(1, b" x\n").is_blank());
        assert!(Line::new(1, b"\n").is_blank());
        assert!(Line::new(1, b"").is_blank());
        assert!(!Line::new(1, b"\xFF\n").is_blank());
    }
}
