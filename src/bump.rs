use std::alloc::Layout;

use log::trace;

use crate::{
  RegionAllocator,
  arena::{Allocation, Arena},
  error::Result,
};

/// Hands out memory by moving a cursor forward. Nothing is ever reclaimed
/// short of a [`reset`](RegionAllocator::reset).
///
/// ```text
///   ┌────┬───┬────────┬──┬──────┬─────────────────────────┐
///   │ A1 │pad│   A2   │p │  A3  │        Free Space       │
///   └────┴───┴────────┴──┴──────┴─────────────────────────┘
///                               ▲
///                             cursor
/// ```
#[derive(Debug)]
pub struct BumpAllocator<'a> {
  arena: Arena<'a>,
}

impl<'a> BumpAllocator<'a> {
  pub fn new(region: &'a mut [u8]) -> Self {
    Self {
      arena: Arena::new(region),
    }
  }

  /// Start and end offsets of `layout` placed at the cursor.
  fn placement(
    &self,
    layout: Layout,
  ) -> Option<(usize, usize)> {
    let start = self.arena.align_offset(self.arena.used(), layout.align())?;
    let end = self.arena.fits(start, layout.size())?;

    Some((start, end))
  }
}

impl<'a> RegionAllocator<'a> for BumpAllocator<'a> {
  fn arena(&self) -> &Arena<'a> {
    &self.arena
  }

  fn arena_mut(&mut self) -> &mut Arena<'a> {
    &mut self.arena
  }

  fn allocate(
    &mut self,
    layout: Layout,
  ) -> Result<Allocation> {
    let Some((start, end)) = self.placement(layout) else {
      return Err(self.arena.out_of_space(layout));
    };

    self.arena.advance(end);

    trace!(
      "bump: {} bytes aligned to {} at offset {}, cursor = {}",
      layout.size(),
      layout.align(),
      start,
      end
    );

    Ok(Allocation::new(start, layout.size(), layout.align(), None))
  }

  /// Bump allocations are never reclaimed, so this does nothing.
  fn release(
    &mut self,
    _allocation: Allocation,
  ) {
  }
}

#[cfg(test)]
mod tests {
  use test_log::test;

  use super::*;
  use crate::error::Error;

  #[repr(C, align(16))]
  struct Aligned<const N: usize>([u8; N]);

  #[test]
  fn test_alloc() {
    let mut buffer = Aligned([0u8; 64]);
    let mut allocator = BumpAllocator::new(&mut buffer.0);

    let first = allocator.allocate(Layout::new::<u64>()).unwrap();
    allocator
      .bytes_mut(&first)
      .unwrap()
      .copy_from_slice(&3u64.to_ne_bytes());

    let size: usize = 6;
    let second = allocator.allocate(Layout::array::<u16>(size).unwrap()).unwrap();

    for (i, chunk) in allocator.bytes_mut(&second).unwrap().chunks_exact_mut(2).enumerate() {
      chunk.copy_from_slice(&((i + 1) as u16).to_ne_bytes());
    }

    assert_eq!(allocator.bytes(&first).unwrap(), 3u64.to_ne_bytes());

    for (i, chunk) in allocator.bytes(&second).unwrap().chunks_exact(2).enumerate() {
      assert_eq!(chunk, ((i + 1) as u16).to_ne_bytes());
    }

    allocator.release(first);

    let third = allocator.allocate(Layout::new::<u32>()).unwrap();

    assert!(third.offset() > second.offset());
    assert_eq!(allocator.bytes(&first).unwrap(), 3u64.to_ne_bytes());
  }

  #[test]
  fn test_four_single_bytes_then_out_of_space() {
    let mut buffer = [0u8; 4];
    let mut allocator = BumpAllocator::new(&mut buffer);
    let layout = Layout::from_size_align(1, 1).unwrap();

    let offsets: Vec<usize> = (0..4)
      .map(|_| allocator.allocate(layout).unwrap().offset())
      .collect();

    assert_eq!(offsets, [0, 1, 2, 3]);
    assert_eq!(
      allocator.allocate(layout),
      Err(Error::OutOfSpace {
        requested: 1,
        align: 1,
        remaining: 0,
      })
    );
  }

  #[test]
  fn test_alignment_padding() {
    let mut buffer = Aligned([0u8; 32]);
    let mut allocator = BumpAllocator::new(&mut buffer.0);

    let byte = allocator.allocate(Layout::new::<u8>()).unwrap();
    let word = allocator.allocate(Layout::new::<u64>()).unwrap();

    assert_eq!(byte.offset(), 0);
    assert_eq!(word.offset(), 8);
    assert_eq!(allocator.used(), 16);
    assert_eq!(allocator.address(&word) % 8, 0);
  }

  #[test]
  fn test_failure_leaves_cursor() {
    let mut buffer = Aligned([0u8; 16]);
    let mut allocator = BumpAllocator::new(&mut buffer.0);

    allocator.allocate(Layout::from_size_align(3, 1).unwrap()).unwrap();

    let result = allocator.allocate(Layout::from_size_align(12, 8).unwrap());

    assert!(matches!(result, Err(Error::OutOfSpace { remaining: 13, .. })));
    assert_eq!(allocator.used(), 3);
  }

  #[test]
  fn test_zero_sized() {
    let mut buffer = Aligned([0u8; 8]);
    let mut allocator = BumpAllocator::new(&mut buffer.0);

    allocator.allocate(Layout::new::<u8>()).unwrap();
    let empty = allocator.allocate(Layout::new::<()>()).unwrap();

    assert!(empty.is_empty());
    assert_eq!(allocator.used(), 1);
    assert_eq!(allocator.bytes(&empty), Some(&[][..]));
  }

  #[test]
  fn test_reset() {
    let mut buffer = Aligned([0u8; 8]);
    let mut allocator = BumpAllocator::new(&mut buffer.0);
    let layout = Layout::new::<u64>();

    let first = allocator.allocate(layout).unwrap();
    assert!(allocator.allocate(layout).is_err());

    allocator.reset();

    let second = allocator.allocate(layout).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn test_allocate_bytes_and_zeroed() {
    let mut buffer = Aligned([0xFFu8; 16]);
    let mut allocator = BumpAllocator::new(&mut buffer.0);

    let copied = allocator.allocate_bytes(b"hello").unwrap();
    let zeroed = allocator.allocate_zeroed(Layout::new::<[u8; 4]>()).unwrap();

    assert_eq!(allocator.bytes(&copied).unwrap(), b"hello");
    assert_eq!(allocator.bytes(&zeroed).unwrap(), [0; 4]);
  }
}
