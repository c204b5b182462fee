//! Memory-mapped register window
//!
//! Maps a UIO device node, a PCIe sysfs `resourceN` file, or any regular
//! file and performs volatile 32-bit accesses on it. All unsafe code in the
//! driver lives here.

use crate::backend::{BackendType, RegisterIface};
use crate::error::{AuroraError, Result};
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Memory-mapped Aurora register window
///
/// Every access is bounds- and alignment-checked before it reaches the
/// mapping.
#[derive(Debug)]
pub struct MmapRegisters {
    ptr: NonNull<u8>,
    size: usize,
    _file: File,
    path: PathBuf,
}

impl MmapRegisters {
    /// Map the register window at `path`
    ///
    /// `size` overrides the window length. Device nodes such as `/dev/uio0`
    /// report a length of zero and need it; resource files and regular files
    /// can leave it `None`.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The file cannot be opened
    /// - The window size is zero
    /// - mmap fails
    pub fn open(path: impl AsRef<Path>, size: Option<usize>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Mapping register window: {}", path.display());

        let file = OpenOptions::new().read(true).write(true).open(path)?;

        // Truncation acceptable: register windows fit in usize on 64-bit
        #[allow(clippy::cast_possible_truncation)]
        let size = match size {
            Some(size) => size,
            None => file.metadata()?.len() as usize,
        };

        if size == 0 {
            return Err(AuroraError::invalid_config(format!(
                "register window {} has size 0 (pass an explicit size for device nodes)",
                path.display()
            )));
        }

        // SAFETY: mmap preconditions:
        // - File descriptor is valid (just opened, kept alive in `_file`)
        // - Size is non-zero (checked above)
        // - PROT_READ|PROT_WRITE with MAP_SHARED so writes reach the device
        // - Offset 0: the window starts at the core's base address
        // - The mapping is unmapped exactly once, in Drop
        let ptr = unsafe {
            let addr = mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                0,
            )
            .map_err(|e| AuroraError::transfer(format!("mmap failed: {e}")))?;

            NonNull::new(addr.cast::<u8>())
                .ok_or_else(|| AuroraError::transfer("mmap returned a null pointer"))?
        };

        tracing::info!(
            "Mapped {} ({size:#x} bytes at {:p})",
            path.display(),
            ptr.as_ptr()
        );

        Ok(Self {
            ptr,
            size,
            _file: file,
            path: path.to_path_buf(),
        })
    }

    /// Get window size in bytes
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Get mapped path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check(&self, addr: u32) -> Result<usize> {
        let offset = addr as usize;
        if offset % 4 != 0 || offset + 4 > self.size {
            return Err(AuroraError::OutOfBounds {
                offset,
                limit: self.size,
            });
        }
        Ok(offset)
    }
}

impl RegisterIface for MmapRegisters {
    fn peek32(&mut self, addr: u32) -> Result<u32> {
        let offset = self.check(addr)?;

        // SAFETY: volatile read from the mapped window.
        // - offset + 4 <= size and offset is 4-byte aligned (checked above)
        // - ptr is valid for `size` bytes (successful mmap, not yet unmapped)
        // - read_volatile keeps the compiler from merging or eliding reads
        #[allow(clippy::cast_ptr_alignment)]
        let value = unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().read_volatile() };

        tracing::trace!("peek [{addr:04x}] = {value:08x}");
        Ok(value)
    }

    fn poke32(&mut self, addr: u32, value: u32) -> Result<()> {
        let offset = self.check(addr)?;
        tracing::trace!("poke [{addr:04x}] = {value:08x}");

        // SAFETY: volatile write to the mapped window.
        // - offset + 4 <= size and offset is 4-byte aligned (checked above)
        // - ptr is valid for `size` bytes and mapped writable
        // - write_volatile keeps strobe writes from being merged or reordered
        #[allow(clippy::cast_ptr_alignment)]
        unsafe {
            self.ptr.as_ptr().add(offset).cast::<u32>().write_volatile(value);
        }
        Ok(())
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Mmap
    }
}

impl Drop for MmapRegisters {
    fn drop(&mut self) {
        tracing::debug!("Unmapping {} ({:#x} bytes)", self.path.display(), self.size);

        // SAFETY: ptr and size are exactly what mmap returned/was given in
        // open(), and Drop runs once.
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), self.size) {
                tracing::error!("munmap failed during drop: {e}");
            }
        }
    }
}

// SAFETY: MmapRegisters owns its mapping exclusively; moving it to another
// thread does not invalidate the mapping. Access requires &mut self.
unsafe impl Send for MmapRegisters {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn window(bytes: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; bytes]).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn peek_returns_poked_value() {
        let file = window(4096);
        let mut regs = MmapRegisters::open(file.path(), None).unwrap();
        assert_eq!(regs.size(), 4096);
        regs.poke32(0x44, 0xDEAD_BEEF).unwrap();
        assert_eq!(regs.peek32(0x44).unwrap(), 0xDEAD_BEEF);
        assert_eq!(regs.peek32(0x40).unwrap(), 0);
    }

    #[test]
    fn writes_reach_the_file() {
        let file = window(256);
        {
            let mut regs = MmapRegisters::open(file.path(), None).unwrap();
            regs.poke32(0x10, 0x0000_0064).unwrap();
        }
        let bytes = std::fs::read(file.path()).unwrap();
        assert_eq!(&bytes[0x10..0x14], &100u32.to_ne_bytes());
    }

    #[test]
    fn out_of_bounds_and_unaligned_rejected() {
        let file = window(64);
        let mut regs = MmapRegisters::open(file.path(), None).unwrap();
        assert!(matches!(regs.peek32(64), Err(AuroraError::OutOfBounds { .. })));
        assert!(matches!(regs.poke32(0x3E, 1), Err(AuroraError::OutOfBounds { .. })));
        assert!(matches!(regs.peek32(0x2), Err(AuroraError::OutOfBounds { .. })));
    }

    #[test]
    fn empty_window_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = MmapRegisters::open(file.path(), None).unwrap_err();
        assert!(matches!(err, AuroraError::InvalidConfig { .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = MmapRegisters::open("/nonexistent/uio42", Some(4096)).unwrap_err();
        assert!(matches!(err, AuroraError::Io { .. }));
    }
}
