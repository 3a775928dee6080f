//! x86 I/O port addresses and legacy 8259 controller commands.
//!
//! Ports are accessed via IN/OUT instructions. The newtype groups all known
//! port addresses and prevents accidentally using other u16 values as port
//! numbers.

/// x86 I/O port address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Port(pub u16);

impl Port {
    // =========================================================================
    // Legacy PIC (8259)
    // =========================================================================

    /// Master PIC command port.
    pub const PIC1_COMMAND: Self = Self(0x20);

    /// Master PIC data port.
    pub const PIC1_DATA: Self = Self(0x21);

    /// Slave PIC command port.
    pub const PIC2_COMMAND: Self = Self(0xA0);

    /// Slave PIC data port.
    pub const PIC2_DATA: Self = Self(0xA1);

    // =========================================================================
    // Debug
    // =========================================================================

    /// POST diagnostic port, written for I/O delay.
    pub const POST_DELAY: Self = Self(0x80);

    // =========================================================================
    // Methods
    // =========================================================================

    /// Get the raw port number for IN/OUT instructions.
    #[inline]
    pub const fn number(self) -> u16 {
        self.0
    }

    /// Create a new port from a raw address.
    #[inline]
    pub const fn new(addr: u16) -> Self {
        Self(addr)
    }
}

// =============================================================================
// 8259 command bytes
// =============================================================================

/// ICW1: begin initialization, ICW4 needed.
pub const PIC_ICW1_INIT: u8 = 0x11;

/// ICW2 for the master: first vector it delivers on.
pub const PIC_MASTER_VECTOR_OFFSET: u8 = 0x20;

/// ICW2 for the slave: first vector it delivers on.
pub const PIC_SLAVE_VECTOR_OFFSET: u8 = 0x28;

/// ICW3 for the master: bit mask of the line the slave is wired to (IRQ 2).
pub const PIC_ICW3_MASTER_WIRING: u8 = 0x04;

/// ICW3 for the slave: its cascade identity on the master.
pub const PIC_ICW3_SLAVE_IDENTITY: u8 = 0x02;

/// ICW4: 8086/88 operating mode.
pub const PIC_ICW4_8086_MODE: u8 = 0x01;

/// Interrupt mask with every line enabled.
pub const PIC_MASK_NONE: u8 = 0x00;

/// End of Interrupt command.
pub const PIC_EOI: u8 = 0x20;
