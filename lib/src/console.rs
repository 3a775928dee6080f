//! Text output sink and a fixed-capacity line formatter.

use core::fmt;

/// Anything that can absorb diagnostic text. The VGA console, a serial
/// port, or a test capture buffer all fit behind this.
pub trait TextOutput: Sync {
    fn write_str(&self, text: &str);
}

/// Fixed-capacity byte buffer implementing [`fmt::Write`]. Output past the
/// capacity is dropped silently, which is the right call in interrupt
/// context where allocation and blocking are both off the table.
pub struct LineBuf<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> LineBuf<N> {
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    pub fn as_str(&self) -> &str {
        // len only ever advances by whole str slices, so the prefix is
        // valid UTF-8.
        unsafe { core::str::from_utf8_unchecked(&self.bytes[..self.len]) }
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for LineBuf<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Write for LineBuf<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let remaining = N - self.len;
        if s.len() > remaining {
            // Truncate on a char boundary so as_str stays valid UTF-8.
            let mut cut = remaining;
            while cut > 0 && !s.is_char_boundary(cut) {
                cut -= 1;
            }
            self.bytes[self.len..self.len + cut].copy_from_slice(&s.as_bytes()[..cut]);
            self.len += cut;
        } else {
            self.bytes[self.len..self.len + s.len()].copy_from_slice(s.as_bytes());
            self.len += s.len();
        }
        Ok(())
    }
}

// ==== tests ================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn formats_into_buffer() {
        let mut buf = LineBuf::<32>::new();
        write!(buf, "vector 0x{:02X}", 0x21u8).unwrap();
        assert_eq!(buf.as_str(), "vector 0x21");
    }

    #[test]
    fn truncates_at_capacity() {
        let mut buf = LineBuf::<4>::new();
        write!(buf, "abcdef").unwrap();
        assert_eq!(buf.as_str(), "abcd");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let mut buf = LineBuf::<5>::new();
        write!(buf, "ab\u{00E9}\u{00E9}").unwrap();
        // "ab" + two-byte e-acute fits; the second e-acute would split.
        assert_eq!(buf.as_str(), "ab\u{00E9}");
    }

    #[test]
    fn clear_resets() {
        let mut buf = LineBuf::<8>::new();
        write!(buf, "hi").unwrap();
        buf.clear();
        assert_eq!(buf.as_str(), "");
    }
}
