//! Ambient kernel support for LumaOS: privileged instruction wrappers, the
//! hardware-access boundary, the text-output collaborator interface, and
//! leveled kernel logging.

#![cfg_attr(not(test), no_std)]

pub mod console;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod cpu;
pub mod hw;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod io;
pub mod klog;

pub use console::{LineBuf, TextOutput};
pub use hw::HwAccess;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use hw::X86Hw;
pub use klog::{KlogLevel, klog_get_level, klog_set_level, klog_set_sink};
