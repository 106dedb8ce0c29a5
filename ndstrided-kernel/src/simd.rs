//! Instruction-set dispatch for dense inner runs.
//!
//! Under the `simd` feature a run goes through [`pulp::Arch::dispatch`], which
//! monomorphizes the closure per target feature set (AVX2, AVX-512, NEON) and
//! picks one at runtime. Plain slice loops then auto-vectorize.

/// Runs shorter than this skip the dispatch.
const MIN_VECTOR_RUN: usize = 64;

/// Run `body` for a dense run of `len` elements.
#[inline(always)]
pub(crate) fn vectorized<R>(len: usize, body: impl FnOnce() -> R) -> R {
    #[cfg(feature = "simd")]
    {
        if len >= MIN_VECTOR_RUN {
            return pulp::Arch::new().dispatch(body);
        }
    }
    #[cfg(not(feature = "simd"))]
    let _ = (len, MIN_VECTOR_RUN);
    body()
}
