//! Generational arena of userdata buffers.
//!
//! The heap hands out raw, uninitialized buffers described by a [`Layout`],
//! exactly like a scripting runtime allocating userdata of `size_of::<T>()`
//! bytes. A native value is later constructed directly into the buffer. The
//! heap records the constructed type so typed access is checked, and owns the
//! buffer's lifetime: freeing a slot drops the value in place and releases
//! the memory.

use std::alloc::{self, Layout};
use std::any::{self, TypeId};
use std::fmt;
use std::ptr::{self, NonNull};

use crate::error::HeapError;

use super::TagId;

/// Handle to a userdata buffer.
///
/// This is a copyable reference to a buffer in the `ObjectHeap`.
/// The generational index prevents use-after-free bugs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectHandle {
    /// Index into ObjectHeap.slots
    pub index: u32,
    /// Generation for use-after-free detection
    pub generation: u32,
}

impl ObjectHandle {
    /// Create a new object handle.
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

/// Heap storage for userdata buffers with generational indices.
///
/// Buffers are stored in a Vec with generation tracking. When a buffer
/// is freed, its slot is reused but the generation is incremented. This
/// allows detecting stale handles at runtime.
pub struct ObjectHeap {
    slots: Vec<HeapSlot>,
    free_list: Vec<u32>,
}

struct HeapSlot {
    generation: u32,
    buffer: Option<UserData>,
    ref_count: u32,
}

/// A raw buffer plus what has been constructed in it.
struct UserData {
    ptr: NonNull<u8>,
    layout: Layout,
    contents: Option<Contents>,
    tag: Option<TagId>,
}

/// Type identity and drop glue of an initialized buffer.
struct Contents {
    type_id: TypeId,
    type_name: &'static str,
    drop_glue: unsafe fn(NonNull<u8>),
}

impl Contents {
    fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: any::type_name::<T>(),
            drop_glue: drop_glue::<T>,
        }
    }
}

/// Drops the `T` stored at `ptr`.
///
/// # Safety
///
/// `ptr` must point to a live, properly aligned `T` that is not used again.
unsafe fn drop_glue<T>(ptr: NonNull<u8>) {
    unsafe { ptr::drop_in_place(ptr.cast::<T>().as_ptr()) }
}

impl UserData {
    fn allocate(layout: Layout) -> Self {
        let ptr = if layout.size() == 0 {
            // zero-sized buffers only need a well-aligned address
            NonNull::new(ptr::without_provenance_mut::<u8>(layout.align()))
                .unwrap_or(NonNull::dangling())
        } else {
            // SAFETY: the layout has a non-zero size.
            let raw = unsafe { alloc::alloc(layout) };
            NonNull::new(raw).unwrap_or_else(|| alloc::handle_alloc_error(layout))
        };

        Self {
            ptr,
            layout,
            contents: None,
            tag: None,
        }
    }

    fn holds<T: 'static>(&self) -> bool {
        self.contents
            .as_ref()
            .is_some_and(|contents| contents.type_id == TypeId::of::<T>())
    }
}

impl Drop for UserData {
    fn drop(&mut self) {
        if let Some(contents) = self.contents.take() {
            // SAFETY: `contents` is only set after a `T` was written at `ptr`,
            // and it is taken here so the value is dropped exactly once.
            unsafe { (contents.drop_glue)(self.ptr) }
        }
        if self.layout.size() != 0 {
            // SAFETY: `ptr` was returned by `alloc::alloc` with this layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
        }
    }
}

impl ObjectHeap {
    /// Create a new empty object heap.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Allocate an uninitialized buffer.
    ///
    /// The buffer holds no value until [`construct_with`](Self::construct_with)
    /// succeeds. Typed access to it fails until then.
    pub fn allocate_uninit(&mut self, layout: Layout) -> ObjectHandle {
        let buffer = UserData::allocate(layout);

        if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.buffer = Some(buffer);
            slot.ref_count = 1;
            ObjectHandle::new(index, slot.generation)
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(HeapSlot {
                generation: 0,
                buffer: Some(buffer),
                ref_count: 1,
            });
            ObjectHandle::new(index, 0)
        }
    }

    /// Allocate a buffer for `T` and move `value` into it.
    pub fn allocate<T: 'static>(&mut self, value: T) -> ObjectHandle {
        let handle = self.allocate_uninit(Layout::new::<T>());
        let slot = &mut self.slots[handle.index as usize];
        if let Some(buffer) = slot.buffer.as_mut() {
            // SAFETY: the buffer was just allocated with `Layout::new::<T>()`.
            unsafe { buffer.ptr.cast::<T>().as_ptr().write(value) };
            buffer.contents = Some(Contents::of::<T>());
        }
        handle
    }

    /// Construct a `T` directly into an uninitialized buffer.
    ///
    /// `init` is only called once the buffer has been checked: it must be
    /// live, empty, and have exactly the layout of `T`. Its result is written
    /// straight into the buffer.
    pub fn construct_with<T, F>(&mut self, handle: ObjectHandle, init: F) -> Result<(), HeapError>
    where
        T: 'static,
        F: FnOnce() -> T,
    {
        let buffer = self.buffer_mut(handle)?;

        if buffer.contents.is_some() {
            return Err(HeapError::AlreadyInitialized {
                index: handle.index,
            });
        }

        let layout = Layout::new::<T>();
        if buffer.layout != layout {
            return Err(HeapError::LayoutMismatch {
                index: handle.index,
                type_name: any::type_name::<T>(),
                buffer_size: buffer.layout.size(),
                buffer_align: buffer.layout.align(),
                type_size: layout.size(),
                type_align: layout.align(),
            });
        }

        // SAFETY: the buffer is live, uninitialized and laid out for `T`.
        unsafe { buffer.ptr.cast::<T>().as_ptr().write(init()) };
        buffer.contents = Some(Contents::of::<T>());
        Ok(())
    }

    /// Construct `value` into an uninitialized buffer.
    pub fn construct<T: 'static>(&mut self, handle: ObjectHandle, value: T) -> Result<(), HeapError> {
        self.construct_with(handle, move || value)
    }

    /// Get immutable reference to an object.
    ///
    /// Returns None if the handle is stale, the buffer is uninitialized,
    /// or the type doesn't match.
    pub fn get<T: 'static>(&self, handle: ObjectHandle) -> Option<&T> {
        let buffer = self.buffer(handle).ok()?;
        if !buffer.holds::<T>() {
            return None;
        }
        // SAFETY: the buffer holds a live `T`; the borrow is tied to `self`.
        Some(unsafe { buffer.ptr.cast::<T>().as_ref() })
    }

    /// Get mutable reference to an object.
    ///
    /// Returns None if the handle is stale, the buffer is uninitialized,
    /// or the type doesn't match.
    pub fn get_mut<T: 'static>(&mut self, handle: ObjectHandle) -> Option<&mut T> {
        let buffer = self.buffer_mut(handle).ok()?;
        if !buffer.holds::<T>() {
            return None;
        }
        // SAFETY: the buffer holds a live `T`; the borrow is tied to `&mut self`.
        Some(unsafe { buffer.ptr.cast::<T>().as_mut() })
    }

    /// Whether a value has been constructed into the buffer.
    pub fn is_initialized(&self, handle: ObjectHandle) -> bool {
        self.buffer(handle)
            .is_ok_and(|buffer| buffer.contents.is_some())
    }

    /// Rust type name of the value in the buffer.
    pub fn type_name_of(&self, handle: ObjectHandle) -> Option<&'static str> {
        let buffer = self.buffer(handle).ok()?;
        buffer.contents.as_ref().map(|contents| contents.type_name)
    }

    /// Layout the buffer was allocated with.
    pub fn layout_of(&self, handle: ObjectHandle) -> Option<Layout> {
        self.buffer(handle).ok().map(|buffer| buffer.layout)
    }

    /// Tag the buffer with a type tag.
    pub fn set_tag(&mut self, handle: ObjectHandle, tag: TagId) -> Result<(), HeapError> {
        self.buffer_mut(handle)?.tag = Some(tag);
        Ok(())
    }

    /// The buffer's type tag, if it has been tagged.
    pub fn tag(&self, handle: ObjectHandle) -> Option<TagId> {
        self.buffer(handle).ok()?.tag
    }

    /// Increment reference count.
    pub fn add_ref(&mut self, handle: ObjectHandle) -> bool {
        if let Some(slot) = self.live_slot_mut(handle) {
            slot.ref_count = slot.ref_count.saturating_add(1);
            return true;
        }
        false
    }

    /// Decrement reference count, free if zero.
    ///
    /// Returns true if the buffer was freed.
    pub fn release(&mut self, handle: ObjectHandle) -> bool {
        let Some(slot) = self.live_slot_mut(handle) else {
            return false;
        };
        slot.ref_count = slot.ref_count.saturating_sub(1);
        if slot.ref_count > 0 {
            return false;
        }
        self.free(handle);
        true
    }

    /// Free a buffer immediately, dropping its value in place.
    pub fn free(&mut self, handle: ObjectHandle) {
        let Some(slot) = self.live_slot_mut(handle) else {
            return;
        };
        slot.buffer = None;
        slot.ref_count = 0;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(handle.index);
    }

    /// Get the reference count for a buffer.
    pub fn ref_count(&self, handle: ObjectHandle) -> Option<u32> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation == handle.generation && slot.buffer.is_some() {
            Some(slot.ref_count)
        } else {
            None
        }
    }

    /// Number of live buffers.
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.buffer.is_some()).count()
    }

    fn live_slot_mut(&mut self, handle: ObjectHandle) -> Option<&mut HeapSlot> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.buffer.is_some())
    }

    fn buffer(&self, handle: ObjectHandle) -> Result<&UserData, HeapError> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.buffer.as_ref())
            .ok_or(HeapError::StaleHandle {
                index: handle.index,
            })
    }

    fn buffer_mut(&mut self, handle: ObjectHandle) -> Result<&mut UserData, HeapError> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.buffer.as_mut())
            .ok_or(HeapError::StaleHandle {
                index: handle.index,
            })
    }
}

impl Default for ObjectHeap {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ObjectHeap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectHeap")
            .field("slot_count", &self.slots.len())
            .field("free_count", &self.free_list.len())
            .finish()
    }
}
