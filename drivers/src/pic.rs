//! Legacy 8259 programmable interrupt controller pair.

use lumaos_abi::Port;
use lumaos_abi::arch::x86::idt::{IRQ_BASE_VECTOR, IRQ_LIMIT_VECTOR, SLAVE_BASE_VECTOR};
use lumaos_abi::arch::x86::ports::{
    PIC_EOI, PIC_ICW1_INIT, PIC_ICW3_MASTER_WIRING, PIC_ICW3_SLAVE_IDENTITY, PIC_ICW4_8086_MODE,
    PIC_MASK_NONE, PIC_MASTER_VECTOR_OFFSET, PIC_SLAVE_VECTOR_OFFSET,
};
use lumaos_lib::{HwAccess, klog_debug};

/// Driver for the cascaded master/slave 8259 pair.
pub struct Pic8259<'h> {
    hw: &'h dyn HwAccess,
}

impl<'h> Pic8259<'h> {
    pub fn new(hw: &'h dyn HwAccess) -> Self {
        Self { hw }
    }

    /// Re-initialize both controllers and move their vectors out of the
    /// CPU exception range: master to 0x20..0x28, slave to 0x28..0x30.
    ///
    /// The initialization words must land in exactly this order; the
    /// controllers interpret data-port writes positionally after an ICW1.
    pub fn remap(&self) {
        klog_debug!(
            "pic: remapping to vectors 0x{:02X}/0x{:02X}",
            PIC_MASTER_VECTOR_OFFSET,
            PIC_SLAVE_VECTOR_OFFSET
        );

        self.hw.port_write(Port::PIC1_COMMAND, PIC_ICW1_INIT);
        self.hw.port_write(Port::PIC2_COMMAND, PIC_ICW1_INIT);

        self.hw.port_write(Port::PIC1_DATA, PIC_MASTER_VECTOR_OFFSET);
        self.hw.port_write(Port::PIC2_DATA, PIC_SLAVE_VECTOR_OFFSET);

        self.hw.port_write(Port::PIC1_DATA, PIC_ICW3_MASTER_WIRING);
        self.hw.port_write(Port::PIC2_DATA, PIC_ICW3_SLAVE_IDENTITY);

        self.hw.port_write(Port::PIC1_DATA, PIC_ICW4_8086_MODE);
        self.hw.port_write(Port::PIC2_DATA, PIC_ICW4_8086_MODE);

        self.hw.port_write(Port::PIC1_DATA, PIC_MASK_NONE);
        self.hw.port_write(Port::PIC2_DATA, PIC_MASK_NONE);
    }

    /// Acknowledge a hardware interrupt so the controller can raise the
    /// next one. No-op for vectors outside the remapped IRQ window. The
    /// slave is acknowledged first on its vectors; the master always is.
    pub fn end_of_interrupt(&self, vector: u8) {
        if !(IRQ_BASE_VECTOR..IRQ_LIMIT_VECTOR).contains(&vector) {
            return;
        }
        if vector >= SLAVE_BASE_VECTOR {
            self.hw.port_write(Port::PIC2_COMMAND, PIC_EOI);
        }
        self.hw.port_write(Port::PIC1_COMMAND, PIC_EOI);
    }
}

// ==== tests ================================================================
