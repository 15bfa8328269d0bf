//! Error types for region allocators.

use thiserror::Error;

/// Errors returned by every allocation strategy.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
  /// The request does not fit in what is left of the region once alignment
  /// padding and header overhead are accounted for.
  #[error(
    "out of space: requested {requested} bytes aligned to {align}, {remaining} bytes remaining"
  )]
  OutOfSpace {
    /// Payload bytes requested by the caller.
    requested: usize,
    /// Alignment requested by the caller.
    align: usize,
    /// Bytes between the cursor and the end of the region at the time of the
    /// request.
    remaining: usize,
  },
}

/// Result alias used across the crate.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_out_of_space_message() {
    let error = Error::OutOfSpace {
      requested: 12,
      align: 8,
      remaining: 4,
    };

    assert_eq!(
      error.to_string(),
      "out of space: requested 12 bytes aligned to 8, 4 bytes remaining"
    );
  }
}
