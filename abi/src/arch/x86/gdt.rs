//! Global Descriptor Table (GDT) entry encoding.
//!
//! A segment descriptor is an 8-byte CPU-defined structure (little-endian,
//! packed):
//!
//! - bytes 0-1: limit bits 0-15
//! - bytes 2-4: base bits 0-23
//! - byte 5: access byte
//! - byte 6: low nibble limit bits 16-19, high nibble flags (G, D/B, L, AVL)
//! - byte 7: base bits 24-31
//!
//! The limit field is only 20 bits wide. Limits up to 65536 are stored with
//! byte granularity; larger limits switch to 4 KiB page granularity, rounding
//! down to whole pages when the requested limit does not end on a page
//! boundary. Decoding a page-granular limit recovers the rounded value, not
//! the original request.

use bitflags::bitflags;

bitflags! {
    /// Access byte of a code or data segment descriptor.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct SegmentAccess: u8 {
        /// Set by the CPU when the segment is touched.
        const ACCESSED = 1 << 0;
        /// Readable for code segments, writable for data segments.
        const READ_WRITE = 1 << 1;
        /// Direction bit for data, conforming bit for code.
        const DIRECTION = 1 << 2;
        /// Code segment when set, data segment when clear.
        const EXECUTABLE = 1 << 3;
        /// Code/data descriptor when set, system descriptor when clear.
        const SEGMENT = 1 << 4;
        /// Descriptor privilege level, both bits set = ring 3.
        const DPL_USER = 3 << 5;
        /// Marks the descriptor as a valid entry.
        const PRESENT = 1 << 7;
    }
}

impl SegmentAccess {
    /// Ring-0 flat code segment access byte (0x9A).
    pub const KERNEL_CODE: Self = Self::PRESENT
        .union(Self::SEGMENT)
        .union(Self::EXECUTABLE)
        .union(Self::READ_WRITE);

    /// Ring-0 flat data segment access byte (0x92).
    pub const KERNEL_DATA: Self = Self::PRESENT.union(Self::SEGMENT).union(Self::READ_WRITE);
}

/// Unit in which a descriptor's limit field is counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Granularity {
    /// Limit counts bytes.
    Byte,
    /// Limit counts 4 KiB pages.
    Page,
}

/// GDT byte offset identifying a segment descriptor.
///
/// Selector values are the byte offset of the descriptor within the table,
/// which is what segment registers hold while the kernel runs in ring 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct SegmentSelector(pub u16);

impl SegmentSelector {
    /// Null selector, offset 0.
    pub const NULL: Self = Self(0);

    #[inline]
    pub const fn new(offset: u16) -> Self {
        Self(offset)
    }

    /// Raw selector value for loading into a segment register or gate.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }
}

// Flag nibble values for descriptor byte 6. D/B is always set: every segment
// this kernel describes is a 32-bit protected-mode segment.
const FLAGS_BYTE_GRANULAR: u8 = 0x4;
const FLAGS_PAGE_GRANULAR: u8 = 0xC;
const FLAG_GRANULARITY: u8 = 0x8;

/// One 8-byte GDT entry, stored as its exact wire image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct SegmentDescriptor {
    bytes: [u8; 8],
}

impl SegmentDescriptor {
    /// The all-zero null descriptor.
    pub const NULL: Self = Self { bytes: [0; 8] };

    /// Encode a descriptor from a base address, a limit in bytes, and an
    /// access byte.
    ///
    /// Values wider than their target bit field are truncated by masking;
    /// a limit above 2^16 is rounded down to whole 4 KiB pages, one page
    /// less when it is not already page-aligned.
    pub fn new(base: u32, limit: u32, access: SegmentAccess) -> Self {
        let (stored_limit, flags) = if limit <= 65536 {
            (limit, FLAGS_BYTE_GRANULAR)
        } else if limit & 0xFFF != 0xFFF {
            ((limit >> 12) - 1, FLAGS_PAGE_GRANULAR)
        } else {
            (limit >> 12, FLAGS_PAGE_GRANULAR)
        };

        let mut bytes = [0u8; 8];
        bytes[0] = stored_limit as u8;
        bytes[1] = (stored_limit >> 8) as u8;
        bytes[2] = base as u8;
        bytes[3] = (base >> 8) as u8;
        bytes[4] = (base >> 16) as u8;
        bytes[5] = access.bits();
        bytes[6] = (flags << 4) | ((stored_limit >> 16) & 0xF) as u8;
        bytes[7] = (base >> 24) as u8;
        Self { bytes }
    }

    /// Decode the 32-bit base address.
    pub fn base(&self) -> u32 {
        (self.bytes[2] as u32)
            | (self.bytes[3] as u32) << 8
            | (self.bytes[4] as u32) << 16
            | (self.bytes[7] as u32) << 24
    }

    /// Decode the limit back to a byte count.
    ///
    /// For page-granular descriptors this expands the stored 20-bit value by
    /// `(stored << 12) | 0xFFF`, recovering the page-rounded limit.
    pub fn limit(&self) -> u32 {
        let stored = (self.bytes[0] as u32)
            | (self.bytes[1] as u32) << 8
            | ((self.bytes[6] & 0xF) as u32) << 16;
        if self.bytes[6] >> 4 == FLAGS_PAGE_GRANULAR {
            (stored << 12) | 0xFFF
        } else {
            stored
        }
    }

    /// The granularity the limit was encoded with.
    pub fn granularity(&self) -> Granularity {
        if self.bytes[6] >> 4 & FLAG_GRANULARITY != 0 {
            Granularity::Page
        } else {
            Granularity::Byte
        }
    }

    /// The access byte.
    pub fn access(&self) -> SegmentAccess {
        SegmentAccess::from_bits_retain(self.bytes[5])
    }

    /// The exact wire image.
    pub fn bytes(&self) -> [u8; 8] {
        self.bytes
    }
}
