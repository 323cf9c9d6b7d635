// Huge-page-backed storage for FAST's flat key array, falling back to a
// plain heap allocation off Linux or when the mapping fails.

use std::ops::{Deref, DerefMut, Index, IndexMut};

enum Storage<T> {
    Mapped { ptr: *mut T, len: usize, mapped_bytes: usize },
    Heap(Vec<T>),
}

/// A `Vec<T>`-like buffer that prefers an anonymous, huge-page-advised
/// `mmap` region and falls back to ordinary heap memory.
pub(crate) struct HugePageBuffer<T> {
    storage: Storage<T>,
}

impl<T: Copy + Default> HugePageBuffer<T> {
    pub fn new(len: usize, fill: T) -> Self {
        #[cfg(target_os = "linux")]
        {
            if let Some(buf) = Self::try_mmap(len, fill) {
                return buf;
            }
            log::debug!("FAST: huge-page mmap unavailable, falling back to heap allocation");
        }
        Self { storage: Storage::Heap(vec![fill; len]) }
    }

    #[cfg(target_os = "linux")]
    fn try_mmap(len: usize, fill: T) -> Option<Self> {
        let bytes = len * std::mem::size_of::<T>();
        if bytes == 0 {
            return Some(Self { storage: Storage::Heap(Vec::new()) });
        }
        // Round up to a huge-page multiple so `madvise(MADV_HUGEPAGE)` has
        // a chance to back the region with actual huge pages.
        let mapped_bytes = crate::fast::layout::HUGE_PAGE_BYTES
            * ((bytes + crate::fast::layout::HUGE_PAGE_BYTES - 1) / crate::fast::layout::HUGE_PAGE_BYTES);

        // Safety: fixed-size anonymous private mapping, no file descriptor
        // involved; the returned pointer is checked against MAP_FAILED.
        let ptr = unsafe {
            libc::mmap(
                std::ptr::null_mut(),
                mapped_bytes,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if ptr == libc::MAP_FAILED {
            return None;
        }
        #[cfg(target_os = "linux")]
        unsafe {
            libc::madvise(ptr, mapped_bytes, libc::MADV_HUGEPAGE);
        }
        let typed_ptr = ptr as *mut T;
        // Safety: `mapped_bytes >= len * size_of::<T>()` and the region is
        // freshly mapped and writable.
        unsafe {
            for i in 0..len {
                typed_ptr.add(i).write(fill);
            }
        }
        Some(Self { storage: Storage::Mapped { ptr: typed_ptr, len, mapped_bytes } })
    }
}

impl<T> Deref for HugePageBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match &self.storage {
            Storage::Mapped { ptr, len, .. } => unsafe { std::slice::from_raw_parts(*ptr, *len) },
            Storage::Heap(v) => v.as_slice(),
        }
    }
}

impl<T> DerefMut for HugePageBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        match &mut self.storage {
            Storage::Mapped { ptr, len, .. } => unsafe { std::slice::from_raw_parts_mut(*ptr, *len) },
            Storage::Heap(v) => v.as_mut_slice(),
        }
    }
}

impl<T, I> Index<I> for HugePageBuffer<T>
where
    [T]: Index<I>,
{
    type Output = <[T] as Index<I>>::Output;

    fn index(&self, index: I) -> &Self::Output {
        Index::index(&**self, index)
    }
}

impl<T, I> IndexMut<I> for HugePageBuffer<T>
where
    [T]: IndexMut<I>,
{
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(&mut **self, index)
    }
}

impl<T> Drop for HugePageBuffer<T> {
    fn drop(&mut self) {
        if let Storage::Mapped { ptr, mapped_bytes, .. } = &self.storage {
            // Safety: `ptr`/`mapped_bytes` come from the matching `mmap`
            // call above and are not used again after this point.
            unsafe {
                libc::munmap(*ptr as *mut libc::c_void, *mapped_bytes);
            }
        }
    }
}

// Safety: the mapped region is exclusively owned by this buffer and never
// shared across threads without the caller's own synchronization; readers
// only ever borrow through `&[T]` once the index is fully built.
unsafe impl<T: Send> Send for HugePageBuffer<T> {}
unsafe impl<T: Sync> Sync for HugePageBuffer<T> {}
