//! Interrupt gate encoding and vector assignments.
//!
//! A gate descriptor is an 8-byte CPU-defined structure (little-endian,
//! packed):
//!
//! - bytes 0-1: handler address bits 0-15
//! - bytes 2-3: code segment selector
//! - byte 4: reserved, zero
//! - byte 5: access (present, privilege, zero bit, 4-bit gate type)
//! - bytes 6-7: handler address bits 16-31

use super::gdt::SegmentSelector;

/// Number of interrupt vectors the CPU dispatches through the IDT.
pub const IDT_ENTRIES: usize = 256;

/// First vector the remapped master controller delivers on.
pub const IRQ_BASE_VECTOR: u8 = 0x20;

/// One past the last hardware IRQ vector.
pub const IRQ_LIMIT_VECTOR: u8 = 0x30;

/// First vector the remapped slave controller delivers on; vectors at or
/// above this are cascade-routed.
pub const SLAVE_BASE_VECTOR: u8 = 0x28;

/// Periodic timer line (master IRQ 0).
pub const TIMER_VECTOR: u8 = 0x20;

/// PS/2 keyboard line (master IRQ 1).
pub const KEYBOARD_VECTOR: u8 = 0x21;

/// PS/2 mouse line, routed through the slave controller (IRQ 12).
pub const MOUSE_VECTOR: u8 = 0x2C;

const GATE_PRESENT: u8 = 0x80;

/// Gate type nibble of the access byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum GateType {
    /// 32-bit interrupt gate: the CPU clears the interrupt-enable flag on
    /// entry.
    Interrupt = 0xE,
    /// 32-bit trap gate: the interrupt-enable flag is left alone.
    Trap = 0xF,
}

/// One 8-byte IDT entry, stored as its exact wire image.
///
/// "On this vector, switch to this code segment and jump to this address at
/// this privilege."
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(transparent)]
pub struct GateDescriptor {
    bytes: [u8; 8],
}

impl GateDescriptor {
    /// An all-zero entry with the present bit clear.
    pub const MISSING: Self = Self { bytes: [0; 8] };

    /// Encode a present gate. The privilege level is masked to its 2-bit
    /// field.
    pub fn new(handler: u32, selector: SegmentSelector, privilege: u8, gate_type: GateType) -> Self {
        let mut bytes = [0u8; 8];
        bytes[0] = handler as u8;
        bytes[1] = (handler >> 8) as u8;
        bytes[2] = selector.bits() as u8;
        bytes[3] = (selector.bits() >> 8) as u8;
        bytes[4] = 0;
        bytes[5] = GATE_PRESENT | (privilege & 0x3) << 5 | gate_type as u8;
        bytes[6] = (handler >> 16) as u8;
        bytes[7] = (handler >> 24) as u8;
        Self { bytes }
    }

    /// Decode the 32-bit handler address.
    pub fn handler(&self) -> u32 {
        (self.bytes[0] as u32)
            | (self.bytes[1] as u32) << 8
            | (self.bytes[6] as u32) << 16
            | (self.bytes[7] as u32) << 24
    }

    /// Decode the code segment selector.
    pub fn selector(&self) -> SegmentSelector {
        SegmentSelector::new((self.bytes[2] as u16) | (self.bytes[3] as u16) << 8)
    }

    /// Decode the 2-bit privilege level.
    pub fn privilege(&self) -> u8 {
        self.bytes[5] >> 5 & 0x3
    }

    pub fn is_present(&self) -> bool {
        self.bytes[5] & GATE_PRESENT != 0
    }

    /// The gate type nibble.
    pub fn type_bits(&self) -> u8 {
        self.bytes[5] & 0xF
    }

    /// The exact wire image.
    pub fn bytes(&self) -> [u8; 8] {
        self.bytes
    }
}
