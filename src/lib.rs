//! # fixalloc - Allocators over a Fixed Memory Region
//!
//! This crate provides three allocators that carve allocations out of a
//! single byte buffer supplied by the caller. None of them ever asks the
//! global allocator or the operating system for memory.
//!
//! ## Overview
//!
//! ```text
//!   Caller-supplied region:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          &mut [u8]                                   │
//!   │                                                                      │
//!   │   ┌─────┬─────┬─────┬─────┬───────────────────────────────────────┐  │
//!   │   │ A1  │ A2  │ A3  │ A4  │            Free Space                 │  │
//!   │   └─────┴─────┴─────┴─────┴───────────────────────────────────────┘  │
//!   │   ▲                       ▲                                     ▲    │
//!   │   │                       │                                     │    │
//!   │ offset 0               Cursor                             region.len │
//!   │                      (next alloc)                                    │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! | Strategy                | Headers | Release                | Reuse      |
//! |-------------------------|---------|------------------------|------------|
//! | [`BumpAllocator`]       | no      | ignored                | never      |
//! | [`TaggedAllocator`]     | yes     | marks the header free  | never      |
//! | [`RecyclingAllocator`]  | yes     | marks the header free  | first fit  |
//!
//! The tagged and recycling strategies put a [`BlockHeader`] in front of
//! every payload:
//!
//! ```text
//!   Single Allocation:
//!   ┌──────────┬───────────────────────┬────────────────────────────────┐
//!   │ padding  │    Block Header       │         User Data              │
//!   │          │  ┌─────────────────┐  │                                │
//!   │          │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │          │  │ is_free: false  │  │  │     N bytes usable       │  │
//!   │          │  └─────────────────┘  │  └──────────────────────────┘  │
//!   │          │   HEADER_SIZE bytes   │                                │
//!   └──────────┴───────────────────────┴────────────────────────────────┘
//!                                      ▲
//!                                      └── Allocation::offset()
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   fixalloc
//!   ├── align      - Alignment macros and helpers (align!, align_to!, align_up)
//!   ├── arena      - Region, cursor and allocation handles
//!   ├── block      - Block header layout
//!   ├── bump       - BumpAllocator
//!   ├── tagged     - TaggedAllocator
//!   ├── recycling  - RecyclingAllocator and its first-fit scan
//!   └── error      - Error and Result
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::alloc::Layout;
//!
//! use fixalloc::{RecyclingAllocator, RegionAllocator};
//!
//! let mut buffer = [0u8; 256];
//! let mut allocator = RecyclingAllocator::new(&mut buffer);
//!
//! let first = allocator.allocate(Layout::new::<u64>())?;
//! allocator.bytes_mut(&first).unwrap().copy_from_slice(&42u64.to_ne_bytes());
//!
//! allocator.release(first);
//!
//! // The released block is handed out again.
//! let second = allocator.allocate(Layout::new::<u32>())?;
//! assert_eq!(first.offset(), second.offset());
//! # Ok::<(), fixalloc::Error>(())
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: every operation takes `&mut self`
//! - **No splitting or coalescing**: a freed block is reused whole or not at all
//! - **No resizing**: allocate, copy and release instead
//! - **Linear reuse scan**: recycling walks every block, O(n) per allocation

pub mod align;
mod arena;
mod block;
mod bump;
pub mod error;
mod recycling;
mod tagged;

use std::alloc::Layout;

pub use arena::{Allocation, Arena};
pub use block::{BlockHeader, HEADER_ALIGN, HEADER_SIZE};
pub use bump::BumpAllocator;
pub use error::{Error, Result};
pub use recycling::{Blocks, RecyclingAllocator};
pub use tagged::TaggedAllocator;

/// Operations shared by every allocator over a borrowed region.
pub trait RegionAllocator<'a> {
  fn arena(&self) -> &Arena<'a>;

  fn arena_mut(&mut self) -> &mut Arena<'a>;

  /// Carves `layout.size()` bytes aligned to `layout.align()` out of the
  /// region.
  fn allocate(
    &mut self,
    layout: Layout,
  ) -> Result<Allocation>;

  /// Hands an allocation back.
  ///
  /// `allocation` must have been returned by this allocator since its last
  /// reset. Passing anything else is a logic error: it never touches memory
  /// outside the region, but may mark an unrelated block as free.
  fn release(
    &mut self,
    allocation: Allocation,
  );

  /// Like [`allocate`](Self::allocate), but the payload is zero-filled.
  fn allocate_zeroed(
    &mut self,
    layout: Layout,
  ) -> Result<Allocation> {
    let allocation = self.allocate(layout)?;

    let Some(bytes) = self.arena_mut().bytes_mut(&allocation) else {
      return Err(self.arena().out_of_space(layout));
    };
    bytes.fill(0);

    Ok(allocation)
  }

  /// Allocates room for `data` and copies it in.
  fn allocate_bytes(
    &mut self,
    data: &[u8],
  ) -> Result<Allocation> {
    let layout = Layout::for_value(data);
    let allocation = self.allocate(layout)?;

    let Some(bytes) = self.arena_mut().bytes_mut(&allocation) else {
      return Err(self.arena().out_of_space(layout));
    };
    bytes.copy_from_slice(data);

    Ok(allocation)
  }

  fn bytes<'s>(
    &'s self,
    allocation: &Allocation,
  ) -> Option<&'s [u8]>
  where
    'a: 's,
  {
    self.arena().bytes(allocation)
  }

  fn bytes_mut<'s>(
    &'s mut self,
    allocation: &Allocation,
  ) -> Option<&'s mut [u8]>
  where
    'a: 's,
  {
    self.arena_mut().bytes_mut(allocation)
  }

  /// Absolute address of an allocation's payload.
  fn address(
    &self,
    allocation: &Allocation,
  ) -> usize {
    self.arena().address(allocation)
  }

  fn capacity(&self) -> usize {
    self.arena().capacity()
  }

  fn used(&self) -> usize {
    self.arena().used()
  }

  fn remaining(&self) -> usize {
    self.arena().remaining()
  }

  /// Forgets every allocation, headers included.
  fn reset(&mut self) {
    self.arena_mut().reset();
  }
}
