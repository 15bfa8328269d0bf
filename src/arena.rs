use std::alloc::Layout;

use log::{debug, warn};

use crate::{
  align::{align_up, is_aligned},
  block::{BlockHeader, HEADER_SIZE},
  error::Error,
};

/// A handle to memory handed out by one of the region allocators.
///
/// Handles are plain offsets into the region, so they stay valid only for
/// the allocator that produced them and only until that allocator is reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Allocation {
  offset: usize,
  len: usize,
  align: usize,
  header: Option<usize>,
}

impl Allocation {
  pub(crate) fn new(
    offset: usize,
    len: usize,
    align: usize,
    header: Option<usize>,
  ) -> Self {
    Self {
      offset,
      len,
      align,
      header,
    }
  }

  /// Offset of the first payload byte from the start of the region.
  pub fn offset(&self) -> usize {
    self.offset
  }

  /// Payload bytes requested for this allocation.
  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// Alignment requested for this allocation.
  pub fn align(&self) -> usize {
    self.align
  }

  /// Offset of the block header governing this payload, if it has one.
  pub fn header(&self) -> Option<usize> {
    self.header
  }

  /// Offset one past the last payload byte.
  pub fn end(&self) -> usize {
    self.offset + self.len
  }
}

/// The caller's buffer plus the high-water mark of what has been handed out.
///
/// ```text
///   region.base                  cursor               region.len()
///   ┌─────────┬──────┬──────────┬─────────────────────────────┐
///   │ block A │ pad  │ block B  │          unused             │
///   └─────────┴──────┴──────────┴─────────────────────────────┘
/// ```
///
/// The arena never moves the cursor backwards except through [`Arena::reset`].
#[derive(Debug)]
pub struct Arena<'a> {
  region: &'a mut [u8],
  cursor: usize,
}

impl<'a> Arena<'a> {
  pub fn new(region: &'a mut [u8]) -> Self {
    Self { region, cursor: 0 }
  }

  /// Total bytes in the region.
  pub fn capacity(&self) -> usize {
    self.region.len()
  }

  /// Bytes below the cursor, including headers and padding.
  pub fn used(&self) -> usize {
    self.cursor
  }

  pub fn remaining(&self) -> usize {
    self.region.len() - self.cursor
  }

  /// Address of the first byte of the region.
  pub fn base(&self) -> usize {
    self.region.as_ptr() as usize
  }

  /// Absolute address of an allocation's payload.
  pub fn address(
    &self,
    allocation: &Allocation,
  ) -> usize {
    self.base() + allocation.offset
  }

  /// Forgets every allocation and rewinds the cursor to the start.
  ///
  /// Handles obtained before the reset must not be used afterwards.
  pub fn reset(&mut self) {
    debug!("resetting arena of {} bytes ({} used)", self.capacity(), self.cursor);
    self.cursor = 0;
  }

  /// Rounds `offset` up so that `base + offset` is a multiple of `align`.
  pub fn align_offset(
    &self,
    offset: usize,
    align: usize,
  ) -> Option<usize> {
    let base = self.base();
    let address = base.checked_add(offset)?;

    Some(align_up(address, align)? - base)
  }

  /// Whether `base + offset` is a multiple of `align`.
  pub fn is_offset_aligned(
    &self,
    offset: usize,
    align: usize,
  ) -> bool {
    is_aligned(self.base().wrapping_add(offset), align)
  }

  /// Returns the end of `[offset, offset + size)` if that span fits in the
  /// region.
  pub fn fits(
    &self,
    offset: usize,
    size: usize,
  ) -> Option<usize> {
    let end = offset.checked_add(size)?;
    (end <= self.region.len()).then_some(end)
  }

  /// Whether the allocation's payload lies below the cursor.
  pub fn owns(
    &self,
    allocation: &Allocation,
  ) -> bool {
    allocation.end() <= self.cursor
  }

  /// Whether the allocation is the most recent one at the tail.
  pub fn is_last(
    &self,
    allocation: &Allocation,
  ) -> bool {
    !allocation.is_empty() && allocation.end() == self.cursor
  }

  pub fn bytes(
    &self,
    allocation: &Allocation,
  ) -> Option<&[u8]> {
    self.region.get(allocation.offset..allocation.end())
  }

  pub fn bytes_mut(
    &mut self,
    allocation: &Allocation,
  ) -> Option<&mut [u8]> {
    self.region.get_mut(allocation.offset..allocation.end())
  }

  /// Moves the cursor to `end`.
  pub(crate) fn advance(
    &mut self,
    end: usize,
  ) {
    debug_assert!(end >= self.cursor, "cursor must never move backwards");
    debug_assert!(end <= self.region.len(), "cursor must stay inside the region");

    self.cursor = end;
  }

  /// Places a zero-sized allocation at the aligned cursor without consuming
  /// any space or writing a header.
  pub(crate) fn allocate_empty(
    &self,
    layout: Layout,
  ) -> Result<Allocation, Error> {
    self
      .align_offset(self.cursor, layout.align())
      .filter(|&offset| offset <= self.region.len())
      .map(|offset| Allocation::new(offset, 0, layout.align(), None))
      .ok_or_else(|| self.out_of_space(layout))
  }

  pub(crate) fn out_of_space(
    &self,
    layout: Layout,
  ) -> Error {
    debug!(
      "out of space: {} bytes aligned to {} requested, {} of {} bytes used",
      layout.size(),
      layout.align(),
      self.cursor,
      self.region.len()
    );

    Error::OutOfSpace {
      requested: layout.size(),
      align: layout.align(),
      remaining: self.remaining(),
    }
  }

  /// Reads the header at `offset`, which must lie below the cursor.
  pub(crate) fn read_header(
    &self,
    offset: usize,
  ) -> Option<BlockHeader> {
    let end = offset.checked_add(HEADER_SIZE)?;
    BlockHeader::decode(self.region.get(offset..end.min(self.cursor))?)
  }

  pub(crate) fn write_header(
    &mut self,
    offset: usize,
    header: BlockHeader,
  ) -> Option<()> {
    header.encode(self.region.get_mut(offset..)?)
  }

  /// Sets the free flag of the header at `offset`.
  ///
  /// Returns `false` without touching the region when no header can live
  /// there.
  pub(crate) fn set_free(
    &mut self,
    offset: usize,
    is_free: bool,
  ) -> bool {
    let in_use = offset
      .checked_add(HEADER_SIZE)
      .is_some_and(|end| end <= self.cursor);

    if !in_use {
      warn!("ignoring header at offset {} outside the used region (cursor {})", offset, self.cursor);
      return false;
    }

    BlockHeader::set_free(&mut self.region[offset..], is_free).is_some()
  }
}
