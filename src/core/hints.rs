/*!
 * Branch Hints
 * Branch prediction hints for the access hot path
 */

/// Hint that a branch is the common case
///
/// The same-epoch and ownership fast paths are wrapped in this: most
/// accesses end there.
///
/// # Implementation
/// With the `nightly` feature, forwards to `core::intrinsics::likely`.
/// On stable it is the identity function.
#[inline(always)]
#[must_use]
pub fn likely(b: bool) -> bool {
    #[cfg(feature = "nightly")]
    {
        ::core::intrinsics::likely(b)
    }
    #[cfg(not(feature = "nightly"))]
    {
        b
    }
}

/// Hint that a branch is rare (race found, overflow, promotion)
#[inline(always)]
#[must_use]
pub fn unlikely(b: bool) -> bool {
    #[cfg(feature = "nightly")]
    {
        ::core::intrinsics::unlikely(b)
    }
    #[cfg(not(feature = "nightly"))]
    {
        b
    }
}
