//! Descriptor-table register image.

/// Argument to the privileged "load descriptor table" operations: a 16-bit
/// size (table byte length minus one) immediately followed by the 32-bit
/// linear base address, little-endian, no padding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DescriptorTablePointer {
    pub size: u16,
    pub base: u32,
}

impl DescriptorTablePointer {
    #[inline]
    pub const fn new(size: u16, base: u32) -> Self {
        Self { size, base }
    }

    /// The exact 6-byte image consumed by the CPU, size then base.
    pub fn to_bytes(self) -> [u8; 6] {
        [
            self.size as u8,
            (self.size >> 8) as u8,
            self.base as u8,
            (self.base >> 8) as u8,
            (self.base >> 16) as u8,
            (self.base >> 24) as u8,
        ]
    }
}
