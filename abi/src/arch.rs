//! Architecture-specific hardware definitions.

pub mod x86;
