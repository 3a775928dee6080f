//! Early CPU setup: descriptor tables and the raw interrupt entry stubs.
//!
//! This crate owns the in-memory GDT and IDT images and the assembly stubs
//! the IDT gates point at. It does not decide interrupt policy — the
//! controller and dispatch logic live in `lumaos-drivers` and program the
//! tables through the types here.

#![cfg_attr(not(test), no_std)]

pub mod gdt;
pub mod idt;

pub use gdt::GlobalDescriptorTable;
pub use idt::{Idt, StubTable};
