use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::alphabet::Alphabet;

/// A biological sequence, held as the UTF8 bytes of its one-letter codes.
///
/// Bytes outside of whatever alphabet a consumer works with are kept as-is;
/// every counter and scorer in this crate skips them.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sequence {
    /// The name of the sequence
    pub name: String,
    /// The string data of the sequence
    pub utf8_bytes: Vec<u8>,
}

impl Sequence {
    pub fn from_utf8(bytes: &[u8]) -> Self {
        Sequence {
            name: "".to_string(),
            utf8_bytes: bytes.to_vec(),
        }
    }

    pub fn named(name: impl Into<String>, bytes: &[u8]) -> Self {
        Sequence {
            name: name.into(),
            utf8_bytes: bytes.to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.utf8_bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utf8_bytes.is_empty()
    }

    /// Every contiguous window of `length` bytes, at offsets `0..=len - length`.
    ///
    /// Yields nothing if the sequence is shorter than `length` or `length` is zero.
    pub fn windows(&self, length: usize) -> impl Iterator<Item = &[u8]> + '_ {
        let num_windows = match length {
            0 => 0,
            _ => (self.len() + 1).saturating_sub(length),
        };
        (0..num_windows).map(move |start| &self.utf8_bytes[start..start + length])
    }

    /// The alphabet index of each byte, `None` where the byte isn't in the alphabet.
    pub fn digital(&self, alphabet: &Alphabet) -> Vec<Option<usize>> {
        self.utf8_bytes
            .iter()
            .map(|&b| alphabet.index_of(b))
            .collect()
    }
}

impl From<&str> for Sequence {
    fn from(value: &str) -> Self {
        Sequence::from_utf8(value.as_bytes())
    }
}

impl Display for Sequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, ">{}", self.name)?;

        let mut iter = self.utf8_bytes.chunks(80).peekable();

        while let Some(byte_chunk) = iter.next() {
            match std::str::from_utf8(byte_chunk) {
                Ok(seq_line) => {
                    write!(f, "{}", seq_line)?;
                    if iter.peek().is_some() {
                        // if we're not on the last
                        // line, add a linebreak
                        writeln!(f)?;
                    }
                }
                Err(_) => return Err(std::fmt::Error),
            }
        }
        Ok(())
    }
}

impl Debug for Sequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.utf8_bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::check;

    #[test]
    fn test_windows_cover_every_offset() {
        let seq = Sequence::from("ACDEF");
        let windows: Vec<&[u8]> = seq.windows(3).collect();
        check!(windows == vec![&b"ACD"[..], &b"CDE"[..], &b"DEF"[..]]);
    }

    #[test]
    fn test_windows_of_short_sequence() {
        let seq = Sequence::from("AC");
        check!(seq.windows(3).count() == 0);
        check!(seq.windows(2).count() == 1);
        check!(seq.windows(0).count() == 0);
    }

    #[test]
    fn test_digital_marks_unknown_bytes() {
        let seq = Sequence::from("AXc");
        check!(seq.digital(&Alphabet::amino()) == vec![Some(0), None, Some(1)]);
    }

    #[test]
    fn test_display_wraps_lines() {
        let seq = Sequence::named("seq1", &[b'A'; 100]);
        let text = seq.to_string();
        let lines: Vec<&str> = text.lines().collect();
        check!(lines.len() == 3);
        check!(lines[0] == ">seq1");
        check!(lines[1].len() == 80);
        check!(lines[2].len() == 20);
    }
}
