//! LumaOS hardware ABI types.
//!
//! This crate provides the canonical binary encodings for the CPU-defined
//! descriptor structures (segment descriptors, interrupt gates, the
//! descriptor-table register image) and the known I/O port addresses.
//!
//! Every layout here is part of a hardware contract, so all fields are
//! computed with explicit shifts and masks over fixed-size byte buffers.
//! Nothing relies on compiler struct layout, and nothing in this crate
//! touches hardware — it is pure data, testable on any host.

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

pub mod arch;

pub use arch::x86::gdt::{Granularity, SegmentAccess, SegmentDescriptor, SegmentSelector};
pub use arch::x86::idt::{GateDescriptor, GateType};
pub use arch::x86::ports::Port;
pub use arch::x86::tables::DescriptorTablePointer;
