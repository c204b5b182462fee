//! Register backend implementations
//!
//! Two backends available:
//! - **Mmap**: memory-mapped register window (UIO node, PCIe resource file)
//! - **Simulated**: in-memory register file with the real access classes

pub mod mmap;
pub mod simulated;

pub use mmap::MmapRegisters;
pub use simulated::SimulatedCore;
