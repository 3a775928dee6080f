//! Interrupt controller and dispatch.
//!
//! `Pic8259` drives the legacy cascaded 8259 pair, `InterruptManager` owns
//! the per-vector handler registry and programs the IDT gates, and
//! `ActiveSlot` is the single cell the assembly entry path dispatches
//! through.

#![cfg_attr(not(test), no_std)]

pub mod interrupts;
pub mod pic;

#[cfg(test)]
mod test_support;

pub use interrupts::{
    ACTIVE_MANAGER, ActiveSlot, HandlerRegistration, InterruptHandler, InterruptManager,
    interrupt_entry,
};
pub use pic::Pic8259;
