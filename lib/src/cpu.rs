//! Privileged CPU instruction wrappers.

use core::arch::asm;

use lumaos_abi::DescriptorTablePointer;

#[inline(always)]
pub fn hlt() {
    unsafe {
        asm!("hlt", options(nomem, nostack, preserves_flags));
    }
}

#[inline(always)]
pub fn pause() {
    unsafe {
        asm!("pause", options(nomem, nostack, preserves_flags));
    }
}

#[inline(always)]
pub fn enable_interrupts() {
    unsafe {
        asm!("sti", options(nomem, nostack));
    }
}

#[inline(always)]
pub fn disable_interrupts() {
    unsafe {
        asm!("cli", options(nomem, nostack));
    }
}

#[inline(always)]
pub fn halt_loop() -> ! {
    loop {
        hlt();
    }
}

// In-memory image of the descriptor-table register: 16-bit size immediately
// followed by the linear base address. Only ever read by the CPU through
// lgdt/lidt.
#[allow(dead_code)]
#[repr(C, packed)]
struct TableRegister {
    size: u16,
    base: u32,
}

impl TableRegister {
    fn from_pointer(pointer: DescriptorTablePointer) -> Self {
        Self {
            size: pointer.size,
            base: pointer.base,
        }
    }
}

/// Point the CPU at a new global descriptor table.
///
/// # Safety
/// The table memory must stay valid and correctly encoded for as long as the
/// CPU may reference it; a malformed or mis-addressed table corrupts CPU
/// state with no way to diagnose it.
#[inline]
pub unsafe fn lgdt(pointer: DescriptorTablePointer) {
    let register = TableRegister::from_pointer(pointer);
    unsafe {
        asm!("lgdt [{}]", in(reg) &raw const register, options(readonly, nostack, preserves_flags));
    }
}

/// Point the CPU at a new interrupt descriptor table.
///
/// # Safety
/// Same contract as [`lgdt`].
#[inline]
pub unsafe fn lidt(pointer: DescriptorTablePointer) {
    let register = TableRegister::from_pointer(pointer);
    unsafe {
        asm!("lidt [{}]", in(reg) &raw const register, options(readonly, nostack, preserves_flags));
    }
}
