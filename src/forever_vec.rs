//! A growable array of narrow floats that lives in a memory-mapped file.
//!
//! The file holds nothing but payload bytes, one per value, so it can be
//! handed directly to anything that reads the raw layout.

use memmap2::MmapMut;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use crate::cvt::RoundingMode;
use crate::format::NarrowFloat;
use crate::slice;

pub struct ForeverVec<T: NarrowFloat> {
    file: File,
    // Zero-length files cannot be mapped.
    mmap: Option<MmapMut>,
    len: usize,
    phantom: std::marker::PhantomData<T>,
}

impl<T: NarrowFloat> ForeverVec<T> {
    /// Opens `path`, creating it if needed. Existing bytes are taken as payloads.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let len = file.metadata()?.len() as usize;
        let mmap = Self::map(&file, len)?;
        log::debug!("opened {} with {} values", path.display(), len);
        Ok(ForeverVec {
            file,
            mmap,
            len,
            phantom: std::marker::PhantomData,
        })
    }

    fn map(file: &File, len: usize) -> io::Result<Option<MmapMut>> {
        if len == 0 {
            return Ok(None);
        }
        // SAFETY: the file is owned by this handle and only resized through it.
        let mmap = unsafe { MmapMut::map_mut(file)? };
        Ok(Some(mmap))
    }

    // The old map stays live until the new one exists. On failure the file is
    // cut back, so `len` always matches the mapped slice.
    fn grow(&mut self, additional: usize) -> io::Result<()> {
        let new_len = self.len.checked_add(additional).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "length overflows usize")
        })?;
        self.flush()?;
        log::trace!("growing from {} to {} values", self.len, new_len);
        self.file.set_len(new_len as u64)?;
        match Self::map(&self.file, new_len) {
            Ok(mmap) => {
                self.mmap = mmap;
                self.len = new_len;
                Ok(())
            }
            Err(err) => {
                log::debug!("remap to {} values failed: {}", new_len, err);
                self.file.set_len(self.len as u64)?;
                Err(err)
            }
        }
    }

    pub fn push(&mut self, value: T) -> io::Result<()> {
        self.grow(1)?;
        let last = self.len - 1;
        self.as_mut_slice()[last] = value;
        Ok(())
    }

    /// Rounds `value` to nearest-even and appends it.
    pub fn push_f32(&mut self, value: f32) -> io::Result<()> {
        self.push(T::from_f32_with(value, RoundingMode::NearestEven, 0))
    }

    pub fn extend_from_f32(&mut self, values: &[f32]) -> io::Result<()> {
        if values.is_empty() {
            return Ok(());
        }
        let start = self.len;
        self.grow(values.len())?;
        slice::encode_slice(values, &mut self.as_mut_slice()[start..])
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.as_slice().get(index).copied()
    }

    /// Overwrites the value at `index`, or returns `None` if it is out of bounds.
    pub fn set(&mut self, index: usize, value: T) -> Option<()> {
        let slot = self.as_mut_slice().get_mut(index)?;
        *slot = value;
        Some(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[T] {
        match &self.mmap {
            Some(mmap) => slice::from_bytes(&mmap[..self.len]),
            None => &[],
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        match &mut self.mmap {
            Some(mmap) => slice::from_bytes_mut(&mut mmap[..self.len]),
            None => &mut [],
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        match &self.mmap {
            Some(mmap) => mmap.flush(),
            None => Ok(()),
        }
    }
}
