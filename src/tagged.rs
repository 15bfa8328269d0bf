use std::alloc::Layout;

use log::trace;

use crate::{
  RegionAllocator,
  arena::{Allocation, Arena},
  block::{BlockHeader, HEADER_ALIGN, HEADER_SIZE},
  error::Result,
};

/// A bump allocator that writes a [`BlockHeader`] in front of every payload.
///
/// Releasing an allocation only flags its header as free; the bytes stay
/// consumed until the allocator is reset. Padding needed to align the payload
/// goes in front of the header so that header and payload are always
/// adjacent.
#[derive(Debug)]
pub struct TaggedAllocator<'a> {
  arena: Arena<'a>,
}

impl<'a> TaggedAllocator<'a> {
  pub fn new(region: &'a mut [u8]) -> Self {
    Self {
      arena: Arena::new(region),
    }
  }

  /// Reads the header governing `allocation`.
  pub fn header(
    &self,
    allocation: &Allocation,
  ) -> Option<BlockHeader> {
    self.arena.read_header(allocation.header()?)
  }

  /// Header, payload and end offsets of `layout` placed at the cursor.
  fn placement(
    &self,
    layout: Layout,
  ) -> Option<(usize, usize, usize)> {
    let align = layout.align().max(HEADER_ALIGN);
    let data = self
      .arena
      .align_offset(self.arena.used().checked_add(HEADER_SIZE)?, align)?;
    let end = self.arena.fits(data, layout.size())?;

    Some((data - HEADER_SIZE, data, end))
  }
}

impl<'a> RegionAllocator<'a> for TaggedAllocator<'a> {
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

    let Some((header, data, end)) = self.placement(layout) else {
      return Err(self.arena.out_of_space(layout));
    };

    self
      .arena
      .write_header(header, BlockHeader::new(layout.size(), false))
      .ok_or_else(|| self.arena.out_of_space(layout))?;
    self.arena.advance(end);

    trace!(
      "tagged: {} bytes aligned to {} at offset {} (header at {}), cursor = {}",
      layout.size(),
      layout.align(),
      data,
      header,
      end
    );

    Ok(Allocation::new(data, layout.size(), layout.align(), Some(header)))
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
        "tagged: released {} bytes at offset {}{}",
        allocation.len(),
        allocation.offset(),
        if self.arena.is_last(&allocation) { " (tail block)" } else { "" }
      );
    }
  }
}
