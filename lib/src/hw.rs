//! Hardware access boundary.
//!
//! Everything that ultimately executes a privileged instruction goes through
//! [`HwAccess`]. The kernel proper only ever sees the trait, which keeps the
//! descriptor-table and controller logic testable on a host build.

use lumaos_abi::{DescriptorTablePointer, Port};

pub trait HwAccess: Sync {
    /// Read one byte from an I/O port.
    fn port_read(&self, port: Port) -> u8;

    /// Write one byte to an I/O port.
    fn port_write(&self, port: Port, value: u8);

    /// Write to a port purely for its settling delay.
    fn port_delay(&self) {
        self.port_write(Port::POST_DELAY, 0);
    }

    /// Install a global descriptor table.
    ///
    /// # Safety
    /// The memory the pointer describes must stay valid and correctly
    /// encoded for as long as the CPU may reference it.
    unsafe fn load_gdt(&self, pointer: DescriptorTablePointer);

    /// Install an interrupt descriptor table.
    ///
    /// # Safety
    /// Same contract as [`HwAccess::load_gdt`].
    unsafe fn load_idt(&self, pointer: DescriptorTablePointer);

    /// Set the interrupt flag.
    fn enable_interrupts(&self);

    /// Clear the interrupt flag.
    fn disable_interrupts(&self);
}

/// The real thing. Only meaningful on an x86 target in ring 0.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub struct X86Hw;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl HwAccess for X86Hw {
    fn port_read(&self, port: Port) -> u8 {
        unsafe { crate::io::inb(port) }
    }

    fn port_write(&self, port: Port, value: u8) {
        unsafe { crate::io::outb(port, value) }
    }

    fn port_delay(&self) {
        unsafe { crate::io::io_wait() }
    }

    unsafe fn load_gdt(&self, pointer: DescriptorTablePointer) {
        unsafe { crate::cpu::lgdt(pointer) }
    }

    unsafe fn load_idt(&self, pointer: DescriptorTablePointer) {
        unsafe { crate::cpu::lidt(pointer) }
    }

    fn enable_interrupts(&self) {
        crate::cpu::enable_interrupts();
    }

    fn disable_interrupts(&self) {
        crate::cpu::disable_interrupts();
    }
}
