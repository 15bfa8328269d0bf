use std::alloc::Layout;

use log::{debug, trace};

use crate::{
  RegionAllocator,
  arena::{Allocation, Arena},
  block::{BlockHeader, HEADER_ALIGN, HEADER_SIZE},
  error::Result,
};

/// A headered allocator that reuses released blocks.
///
/// Every allocation first walks the blocks below the cursor and takes the
/// first one that is free, large enough and whose payload satisfies the
/// requested alignment. Only when none qualifies is a new block appended at
/// the tail.
///
/// ```text
///   ┌────────┬──────┬────────┬─────────────┬────────┬──────┬──────────────┐
///   │ header │ A    │ header │ B (free)    │ header │ C    │  Free Space  │
///   └────────┴──────┴────────┴─────────────┴────────┴──────┴──────────────┘
///                             ▲ first fit for any request <= len(B)
/// ```
///
/// Blocks are never split or merged, so a reused block keeps its original
/// length and any excess is wasted for the new allocation. Finding a block
/// is linear in the number of blocks written so far.
#[derive(Debug)]
pub struct RecyclingAllocator<'a> {
  arena: Arena<'a>,
}

/// Where a new tail block goes.
struct TailPlacement {
  header: usize,
  data: usize,
  /// Payload length recorded in the header, alignment padding included.
  length: usize,
  end: usize,
}

impl<'a> RecyclingAllocator<'a> {
  pub fn new(region: &'a mut [u8]) -> Self {
    Self {
      arena: Arena::new(region),
    }
  }

  /// Walks every block below the cursor in address order.
  pub fn blocks(&self) -> Blocks<'_, 'a> {
    Blocks {
      arena: &self.arena,
      position: 0,
    }
  }

  /// Reads the header governing `allocation`.
  pub fn header(
    &self,
    allocation: &Allocation,
  ) -> Option<BlockHeader> {
    self.arena.read_header(allocation.header()?)
  }

  /// Claims the first released block that can hold `layout`.
  fn recycle(
    &mut self,
    layout: Layout,
  ) -> Option<Allocation> {
    let (offset, header) = self.blocks().find(|(offset, header)| {
      header.is_free
        && header.size >= layout.size()
        && self.arena.is_offset_aligned(offset + HEADER_SIZE, layout.align())
    })?;

    if !self.arena.set_free(offset, false) {
      return None;
    }

    let data = offset + HEADER_SIZE;

    debug!(
      "recycling: reusing {}-byte block at offset {} for {} bytes aligned to {}",
      header.size,
      data,
      layout.size(),
      layout.align()
    );

    Some(Allocation::new(data, layout.size(), layout.align(), Some(offset)))
  }

  fn tail_placement(
    &self,
    layout: Layout,
  ) -> Option<TailPlacement> {
    let header = self.arena.align_offset(self.arena.used(), HEADER_ALIGN)?;
    let unpadded = header.checked_add(HEADER_SIZE)?;
    let data = self.arena.align_offset(unpadded, layout.align())?;
    let end = self.arena.fits(data, layout.size())?;

    Some(TailPlacement {
      header,
      data,
      length: end - unpadded,
      end,
    })
  }
}

impl<'a> RegionAllocator<'a> for RecyclingAllocator<'a> {
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
    if layout.size() == 0 {
      return self.arena.allocate_empty(layout);
    }

    if let Some(allocation) = self.recycle(layout) {
      return Ok(allocation);
    }

    let Some(tail) = self.tail_placement(layout) else {
      return Err(self.arena.out_of_space(layout));
    };

    self
      .arena
      .write_header(tail.header, BlockHeader::new(tail.length, false))
      .ok_or_else(|| self.arena.out_of_space(layout))?;
    self.arena.advance(tail.end);

    trace!(
      "recycling: {} bytes aligned to {} at offset {} (header at {}, length {}), cursor = {}",
      layout.size(),
      layout.align(),
      tail.data,
      tail.header,
      tail.length,
      tail.end
    );

    Ok(Allocation::new(
      tail.data,
      layout.size(),
      layout.align(),
      Some(tail.header),
    ))
  }

  fn release(
    &mut self,
    allocation: Allocation,
  ) {
    if allocation.is_empty() {
      return;
    }

    if let Some(header) = allocation.header()
      && self.arena.set_free(header, true)
    {
      trace!(
        "recycling: released {} bytes at offset {}{}",
        allocation.len(),
        allocation.offset(),
        if self.arena.is_last(&allocation) { " (tail block)" } else { "" }
      );
    }
  }
}

/// Iterator over `(header offset, header)` pairs of a [`RecyclingAllocator`].
///
/// Block boundaries are rebuilt from the recorded lengths alone: each header
/// sits at the next header-aligned offset after the previous payload.
pub struct Blocks<'r, 'a> {
  arena: &'r Arena<'a>,
  position: usize,
}

impl Iterator for Blocks<'_, '_> {
  type Item = (usize, BlockHeader);

  fn next(&mut self) -> Option<Self::Item> {
    let offset = self.arena.align_offset(self.position, HEADER_ALIGN)?;
    if offset >= self.arena.used() {
      return None;
    }

    let header = self.arena.read_header(offset)?;
    self.position = offset.checked_add(HEADER_SIZE)?.checked_add(header.size)?;

    Some((offset, header))
  }
}
