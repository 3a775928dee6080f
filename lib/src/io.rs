//! Raw port I/O.

use core::arch::asm;

use lumaos_abi::Port;

/// Write one byte to an I/O port.
///
/// # Safety
/// Port writes talk to hardware directly; the caller must know the device
/// behind the port and what the value does to it.
#[inline(always)]
pub unsafe fn outb(port: Port, value: u8) {
    unsafe {
        asm!("out dx, al", in("dx") port.number(), in("al") value, options(nomem, nostack, preserves_flags));
    }
}

/// Read one byte from an I/O port.
///
/// # Safety
/// Reads can have side effects on the device (acknowledging data, clearing
/// status); the caller must know the device behind the port.
#[inline(always)]
pub unsafe fn inb(port: Port) -> u8 {
    let value: u8;
    unsafe {
        asm!("in al, dx", in("dx") port.number(), out("al") value, options(nomem, nostack, preserves_flags));
    }
    value
}

/// Burn roughly one microsecond by writing to the POST diagnostic port.
/// Old devices such as the 8259 need settling time between command bytes.
#[inline(always)]
pub unsafe fn io_wait() {
    unsafe {
        outb(Port::POST_DELAY, 0);
    }
}
