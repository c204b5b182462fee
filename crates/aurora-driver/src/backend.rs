//! Register-access abstraction
//!
//! The controller never touches hardware directly. It is handed a
//! [`RegisterIface`] and issues 32-bit peeks and pokes through it. Access is
//! `&mut self`: one controller instance owns its register window and
//! accesses are never overlapped. Callers sharing a window between
//! controllers must serialize externally.

use crate::error::Result;
use std::fmt::Debug;
use std::path::PathBuf;

/// 32-bit register access capability for one Aurora core.
pub trait RegisterIface: Debug + Send {
    /// Read the register at absolute address `addr`.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails or `addr` is not mapped.
    fn peek32(&mut self, addr: u32) -> Result<u32>;

    /// Write `value` to the register at absolute address `addr`.
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails, `addr` is not mapped, or the
    /// register cannot be written.
    fn poke32(&mut self, addr: u32, value: u32) -> Result<()>;

    /// Backend type for debugging
    fn backend_type(&self) -> BackendType;
}

impl<R: RegisterIface + ?Sized> RegisterIface for Box<R> {
    fn peek32(&mut self, addr: u32) -> Result<u32> {
        (**self).peek32(addr)
    }

    fn poke32(&mut self, addr: u32, value: u32) -> Result<()> {
        (**self).poke32(addr, value)
    }

    fn backend_type(&self) -> BackendType {
        (**self).backend_type()
    }
}

/// Backend type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Memory-mapped register window (UIO node or PCIe resource file)
    Mmap,

    /// In-memory register file, no hardware required
    Simulated,
}

impl std::fmt::Display for BackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mmap => write!(f, "mmap"),
            Self::Simulated => write!(f, "simulated"),
        }
    }
}

/// Backend selection strategy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendSelection {
    /// Map a register window from a device node or resource file
    Mmap {
        /// `/dev/uioN`, `/sys/bus/pci/devices/.../resourceN`, or any file
        path: PathBuf,
        /// Window size in bytes; required when the file reports no length
        size: Option<usize>,
    },

    /// Use a simulated core with the default configuration
    Simulated,
}

/// Open the register backend described by `selection`
///
/// # Errors
///
/// Returns error if the backend cannot be initialized.
pub fn select_backend(selection: &BackendSelection) -> Result<Box<dyn RegisterIface>> {
    use crate::backends::{MmapRegisters, SimulatedCore};

    match selection {
        BackendSelection::Mmap { path, size } => {
            let regs = MmapRegisters::open(path, *size)?;
            tracing::info!("Using mmap backend for {}", path.display());
            Ok(Box::new(regs))
        }
        BackendSelection::Simulated => {
            tracing::info!("Using simulated backend");
            Ok(Box::new(SimulatedCore::new()))
        }
    }
}
