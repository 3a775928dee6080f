//! 32-bit x86 protected-mode definitions.
//!
//! Raw integer constants are wrapped in newtypes to prevent misuse:
//! - `SegmentSelector(u16)` for descriptor-table byte offsets
//! - `Port(u16)` for I/O port addresses
//! - `SegmentAccess` bitflags for descriptor access bytes
//!
//! The descriptor types (`SegmentDescriptor`, `GateDescriptor`) hold their
//! exact 8-byte wire images and expose encode/decode accessors.

pub mod gdt;
pub mod idt;
pub mod ports;
pub mod tables;

pub use gdt::{Granularity, SegmentAccess, SegmentDescriptor, SegmentSelector};
pub use idt::{GateDescriptor, GateType};
pub use ports::Port;
pub use tables::DescriptorTablePointer;
