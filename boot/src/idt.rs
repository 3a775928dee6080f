//! Interrupt descriptor table storage and the raw entry stubs.

use core::cell::UnsafeCell;

use lumaos_abi::arch::x86::idt::{IDT_ENTRIES, KEYBOARD_VECTOR, MOUSE_VECTOR, TIMER_VECTOR};
use lumaos_abi::{DescriptorTablePointer, GateDescriptor};
use lumaos_lib::HwAccess;

#[cfg(target_arch = "x86")]
core::arch::global_asm!(include_str!("../interrupt_stubs.s"));

#[cfg(target_arch = "x86")]
unsafe extern "C" {
    fn interrupt_ignore();
    fn irq_stub_timer();
    fn irq_stub_keyboard();
    fn irq_stub_mouse();
}

/// Entry addresses of the assembly stubs, by role. Kept as plain addresses
/// so gate programming stays data-only and table setup can run against
/// synthetic addresses off-target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StubTable {
    pub ignore: u32,
    pub timer: u32,
    pub keyboard: u32,
    pub mouse: u32,
}

impl StubTable {
    /// The stubs linked into this image.
    #[cfg(target_arch = "x86")]
    pub fn installed() -> Self {
        Self {
            ignore: interrupt_ignore as usize as u32,
            timer: irq_stub_timer as usize as u32,
            keyboard: irq_stub_keyboard as usize as u32,
            mouse: irq_stub_mouse as usize as u32,
        }
    }

    /// Stub address a given vector's gate should point at. Vectors without
    /// a dedicated stub get the ignore stub, which returns immediately.
    pub fn stub_for(&self, vector: u8) -> u32 {
        match vector {
            TIMER_VECTOR => self.timer,
            KEYBOARD_VECTOR => self.keyboard,
            MOUSE_VECTOR => self.mouse,
            _ => self.ignore,
        }
    }
}

/// The 256-entry interrupt descriptor table.
///
/// Gates are written through a shared reference because the table is
/// programmed from the interrupt manager while the CPU may already be
/// pointed at it. Writes are single 8-byte descriptor stores performed
/// with interrupts disabled during setup.
#[repr(C, align(8))]
pub struct Idt {
    entries: UnsafeCell<[GateDescriptor; IDT_ENTRIES]>,
}

unsafe impl Sync for Idt {}

impl Idt {
    pub const fn new() -> Self {
        Self {
            entries: UnsafeCell::new([GateDescriptor::MISSING; IDT_ENTRIES]),
        }
    }

    pub fn set_entry(&self, vector: u8, gate: GateDescriptor) {
        unsafe {
            (*self.entries.get())[vector as usize] = gate;
        }
    }

    pub fn entry(&self, vector: u8) -> GateDescriptor {
        unsafe { (*self.entries.get())[vector as usize] }
    }

    /// Register image describing this table.
    pub fn pointer(&self) -> DescriptorTablePointer {
        DescriptorTablePointer::new(
            (IDT_ENTRIES * 8 - 1) as u16,
            self.entries.get() as usize as u32,
        )
    }

    /// Hand the table to the CPU.
    ///
    /// # Safety
    /// `self` must outlive every instruction executed while this table is
    /// installed, and every present gate must point at real code.
    pub unsafe fn load(&self, hw: &dyn HwAccess) {
        unsafe { hw.load_idt(self.pointer()) };
    }
}

impl Default for Idt {
    fn default() -> Self {
        Self::new()
    }
}

// ==== tests ================================================================
