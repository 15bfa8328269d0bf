/// Rounds `value` up to the machine word alignment.
///
/// # Examples
///
/// ```rust
/// use fixalloc::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, ::core::mem::size_of::<usize>())
  };
}

/// Rounds `value` up to a multiple of `align`, which must be a power of two.
///
/// Unlike [`align_up`](crate::align::align_up) this does not check for
/// overflow, so it is meant for compile-time layout constants.
///
/// ```rust
/// use fixalloc::align_to;
///
/// assert_eq!(align_to!(17, 8), 24);
/// assert_eq!(align_to!(32, 16), 32);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    ($value + $align - 1) & !($align - 1)
  };
}

/// Rounds `value` up to the next multiple of `align`.
///
/// Returns `None` when the result does not fit in a `usize`.
#[inline]
pub const fn align_up(
  value: usize,
  align: usize,
) -> Option<usize> {
  debug_assert!(align.is_power_of_two(), "alignment must be a power of two");

  let mask = align - 1;
  match value.checked_add(mask) {
    Some(bumped) => Some(bumped & !mask),
    None => None,
  }
}

/// Whether `value` is a multiple of `align`.
#[inline]
pub const fn is_aligned(
  value: usize,
  align: usize,
) -> bool {
  value & (align - 1) == 0
}
