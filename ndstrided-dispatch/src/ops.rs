//! Prebuilt dispatched element-wise operations.
//!
//! Every [`Op`] owns a process-wide [`Dispatcher`] built on first use. The
//! tables hold accelerated kernels for the common fixed-width dtypes and fall
//! back to the generic [`Scalar`] path for everything else, so any
//! combination of input and output dtypes is accepted.
//!
//! ```
//! use ndstrided_dispatch::ops;
//! use ndstrided_view::{NdArray, Order};
//!
//! let a = NdArray::<f64>::from_vec(vec![1.0, 2.0], &[2], Order::RowMajor).unwrap();
//! let b = NdArray::<i32>::from_vec(vec![10, 20], &[2], Order::RowMajor).unwrap();
//! let mut out = NdArray::<f64>::zeros(&[2], Order::RowMajor);
//! ops::add(a.view().into(), b.view().into(), &mut out.view_mut().into()).unwrap();
//! assert_eq!(out.data(), &[11.0, 22.0]);
//! ```

use std::sync::OnceLock;

use ndstrided_traits::DType;
use ndstrided_view::{DynElement, DynView, DynViewMut, Result, Scalar};
use num_complex::Complex64;

use crate::fallback::generic_kernel;
use crate::native::{binary_native, unary_native};
use crate::signature::Signature;
use crate::table::{dispatch, Dispatcher, Kernel, KernelId};

/// Element-wise operations with a prebuilt dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// `a + b`; integers wrap on overflow.
    Add,
    /// `a * b`; integers wrap on overflow.
    Mul,
    /// `|a|`; the modulus for complex inputs.
    Abs,
    /// Copy with dtype conversion.
    Identity,
}

static ADD: OnceLock<Dispatcher> = OnceLock::new();
static MUL: OnceLock<Dispatcher> = OnceLock::new();
static ABS: OnceLock<Dispatcher> = OnceLock::new();
static IDENTITY: OnceLock<Dispatcher> = OnceLock::new();

impl Op {
    pub const ALL: [Op; 4] = [Op::Add, Op::Mul, Op::Abs, Op::Identity];

    pub fn name(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Mul => "mul",
            Op::Abs => "abs",
            Op::Identity => "identity",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Op::Add | Op::Mul => 2,
            Op::Abs | Op::Identity => 1,
        }
    }

    /// The shared dispatcher of this op, built on first use.
    pub fn dispatcher(self) -> Result<&'static Dispatcher> {
        let cell = match self {
            Op::Add => &ADD,
            Op::Mul => &MUL,
            Op::Abs => &ABS,
            Op::Identity => &IDENTITY,
        };
        if let Some(d) = cell.get() {
            return Ok(d);
        }
        let built = self.build()?;
        Ok(cell.get_or_init(|| built))
    }

    /// Resolve and run on the given views.
    pub fn call(self, inputs: &[DynView<'_>], output: &mut DynViewMut<'_>) -> Result<KernelId> {
        self.dispatcher()?.call(inputs, output)
    }

    fn build(self) -> Result<Dispatcher> {
        let (entries, fallback) = match self {
            Op::Add => (
                vec![
                    binary_entry::<f64>(|x, y| x + y),
                    binary_entry::<f32>(|x, y| x + y),
                    binary_entry::<Complex64>(|x, y| x + y),
                    binary_entry::<i64>(i64::wrapping_add),
                    binary_entry::<i32>(i32::wrapping_add),
                ],
                generic_kernel("add_generic", |xs| xs[0] + xs[1]),
            ),
            Op::Mul => (
                vec![
                    binary_entry::<f64>(|x, y| x * y),
                    binary_entry::<f32>(|x, y| x * y),
                    binary_entry::<Complex64>(|x, y| x * y),
                    binary_entry::<i64>(i64::wrapping_mul),
                    binary_entry::<i32>(i32::wrapping_mul),
                ],
                generic_kernel("mul_generic", |xs| xs[0] * xs[1]),
            ),
            Op::Abs => (
                vec![
                    unary_entry::<f64, f64>(f64::abs),
                    unary_entry::<f32, f32>(f32::abs),
                    unary_entry::<Complex64, f64>(|z| z.norm()),
                    unary_entry::<i64, i64>(i64::wrapping_abs),
                    unary_entry::<i32, i32>(i32::wrapping_abs),
                ],
                generic_kernel("abs_generic", |xs| xs[0].abs()),
            ),
            Op::Identity => (
                vec![
                    unary_entry::<f64, f64>(|x| x),
                    unary_entry::<f32, f32>(|x| x),
                    unary_entry::<Complex64, Complex64>(|x| x),
                    unary_entry::<f32, f64>(f64::from),
                    unary_entry::<i32, f64>(f64::from),
                ],
                generic_kernel("identity_generic", |xs: &[Scalar]| xs[0]),
            ),
        };
        dispatch(self.name(), self.arity(), entries, fallback)
    }
}

fn binary_entry<T: DynElement>(f: fn(T, T) -> T) -> (Signature, Kernel) {
    let sig = Signature::new(&[T::DTYPE, T::DTYPE], T::DTYPE);
    let name = format!("binary_{}", sig.to_chars());
    (sig, binary_native::<T, T, T>(&name, f))
}

fn unary_entry<A, D>(f: fn(A) -> D) -> (Signature, Kernel)
where
    A: DynElement,
    D: DynElement,
{
    let sig = Signature::new(&[A::DTYPE], D::DTYPE);
    let name = format!("unary_{}", sig.to_chars());
    (sig, unary_native::<A, D>(&name, f))
}

/// `out = a + b`, broadcasting `a` and `b` against `out`.
pub fn add(a: DynView<'_>, b: DynView<'_>, out: &mut DynViewMut<'_>) -> Result<KernelId> {
    Op::Add.call(&[a, b], out)
}

/// `out = a * b`, broadcasting `a` and `b` against `out`.
pub fn mul(a: DynView<'_>, b: DynView<'_>, out: &mut DynViewMut<'_>) -> Result<KernelId> {
    Op::Mul.call(&[a, b], out)
}

/// `out = |a|`.
pub fn abs(a: DynView<'_>, out: &mut DynViewMut<'_>) -> Result<KernelId> {
    Op::Abs.call(&[a], out)
}

/// Copy `a` into `out`, converting between dtypes.
pub fn identity(a: DynView<'_>, out: &mut DynViewMut<'_>) -> Result<KernelId> {
    Op::Identity.call(&[a], out)
}

/// Whether `dtype` has an accelerated kernel for `op` with all operands of that dtype.
pub fn has_native(op: Op, dtype: DType) -> bool {
    let inputs = vec![dtype; op.arity()];
    op.dispatcher()
        .ok()
        .and_then(|d| d.table().lookup(&inputs, dtype))
        .is_some_and(|id| id != KernelId::Fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndstrided_view::{for_each_multi_index, NdArray, Order};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Owned operand of a dtype that has native kernels.
    enum Operand {
        F64(NdArray<f64>),
        F32(NdArray<f32>),
        C128(NdArray<Complex64>),
        I64(NdArray<i64>),
        I32(NdArray<i32>),
    }

    impl Operand {
        fn random(dtype: DType, shape: &[usize], rng: &mut StdRng) -> Self {
            let o = Order::RowMajor;
            match dtype {
                DType::Float64 => Operand::F64(NdArray::from_fn(shape, o, |_| {
                    rng.gen_range(-1e3..1e3)
                })),
                DType::Float32 => Operand::F32(NdArray::from_fn(shape, o, |_| {
                    rng.gen_range(-1e3f32..1e3)
                })),
                DType::Complex128 => Operand::C128(NdArray::from_fn(shape, o, |_| {
                    Complex64::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0))
                })),
                DType::Int64 => Operand::I64(NdArray::from_fn(shape, o, |_| rng.gen())),
                DType::Int32 => Operand::I32(NdArray::from_fn(shape, o, |_| rng.gen())),
                other => panic!("no native kernel reads {other:?}"),
            }
        }

        fn zeros(dtype: DType, shape: &[usize]) -> Self {
            let o = Order::ColumnMajor;
            match dtype {
                DType::Float64 => Operand::F64(NdArray::zeros(shape, o)),
                DType::Float32 => Operand::F32(NdArray::zeros(shape, o)),
                DType::Complex128 => Operand::C128(NdArray::zeros(shape, o)),
                DType::Int64 => Operand::I64(NdArray::zeros(shape, o)),
                DType::Int32 => Operand::I32(NdArray::zeros(shape, o)),
                other => panic!("no native kernel writes {other:?}"),
            }
        }

        fn view(&self) -> DynView<'_> {
            match self {
                Operand::F64(a) => a.view().into(),
                Operand::F32(a) => a.view().into(),
                Operand::C128(a) => a.view().into(),
                Operand::I64(a) => a.view().into(),
                Operand::I32(a) => a.view().into(),
            }
        }

        fn view_mut(&mut self) -> DynViewMut<'_> {
            match self {
                Operand::F64(a) => a.view_mut().into(),
                Operand::F32(a) => a.view_mut().into(),
                Operand::C128(a) => a.view_mut().into(),
                Operand::I64(a) => a.view_mut().into(),
                Operand::I32(a) => a.view_mut().into(),
            }
        }
    }

    /// Bit pattern of a scalar, tagged by kind.
    fn bits(s: Scalar) -> [u64; 3] {
        match s {
            Scalar::Bool(b) => [0, b as u64, 0],
            Scalar::Int(v) => [1, v as u64, 0],
            Scalar::Uint(v) => [2, v, 0],
            Scalar::Float(v) => [3, v.to_bits(), 0],
            Scalar::Complex(c) => [4, c.re.to_bits(), c.im.to_bits()],
        }
    }

    /// Run `op` through its resolved kernel and through the fallback.
    fn both_paths<T>(op: Op, inputs: &[DynView<'_>], shape: &[usize]) -> (Vec<T>, Vec<T>)
    where
        T: DynElement + Default,
    {
        let d = op.dispatcher().unwrap();
        let mut native = NdArray::<T>::zeros(shape, Order::RowMajor);
        let id = d
            .call(inputs, &mut T::into_dyn_mut(native.view_mut()))
            .unwrap();
        assert!(matches!(id, KernelId::Entry(_)));

        let mut generic = NdArray::<T>::zeros(shape, Order::RowMajor);
        d.table()
            .fallback()
            .unwrap()
            .run(inputs, &mut T::into_dyn_mut(generic.view_mut()))
            .unwrap();
        (native.into_vec(), generic.into_vec())
    }

    #[test]
    fn test_native_matches_fallback_f64() {
        let mut rng = StdRng::seed_from_u64(1234);
        let a = NdArray::<f64>::from_fn(&[17, 9], Order::RowMajor, |_| rng.gen_range(-1e3..1e3));
        let b = NdArray::<f64>::from_fn(&[9, 17], Order::ColumnMajor, |_| rng.gen::<f64>() - 0.5);
        let b_t = b.view().permute(&[1, 0]).unwrap();
        for op in [Op::Add, Op::Mul] {
            let (native, generic) =
                both_paths::<f64>(op, &[a.view().into(), b_t.clone().into()], &[17, 9]);
            for (x, y) in native.iter().zip(&generic) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
        let (native, generic) = both_paths::<f64>(Op::Abs, &[a.view().into()], &[17, 9]);
        assert!(native.iter().zip(&generic).all(|(x, y)| x.to_bits() == y.to_bits()));
    }

    #[test]
    fn test_native_matches_fallback_f32() {
        let mut rng = StdRng::seed_from_u64(99);
        let a = NdArray::from_fn(&[64], Order::RowMajor, |_| rng.gen_range(-10.0f32..10.0));
        let b = NdArray::from_fn(&[64], Order::RowMajor, |_| rng.gen_range(-1e-3f32..1e-3));
        for op in [Op::Add, Op::Mul] {
            let (native, generic) =
                both_paths::<f32>(op, &[a.view().into(), b.view().into()], &[64]);
            for (x, y) in native.iter().zip(&generic) {
                assert_eq!(x.to_bits(), y.to_bits());
            }
        }
    }

    #[test]
    fn test_native_matches_fallback_ints() {
        let a = NdArray::<i32>::from_vec(vec![i32::MAX, i32::MIN, -7, 3], &[4], Order::RowMajor)
            .unwrap();
        let b = NdArray::<i32>::from_vec(vec![1, -1, 5, 3], &[4], Order::RowMajor).unwrap();
        for op in [Op::Add, Op::Mul] {
            let (native, generic) =
                both_paths::<i32>(op, &[a.view().into(), b.view().into()], &[4]);
            assert_eq!(native, generic);
        }
        let (native, generic) = both_paths::<i32>(Op::Abs, &[a.view().into()], &[4]);
        assert_eq!(native, generic);
        assert_eq!(native, vec![i32::MAX, i32::MIN, 7, 3]);
    }

    #[test]
    fn test_native_matches_fallback_complex() {
        let a = NdArray::from_fn(&[3, 3], Order::RowMajor, |i| {
            Complex64::new(i[0] as f64 * 0.3, -(i[1] as f64) / 7.0)
        });
        for op in [Op::Add, Op::Mul] {
            let (native, generic) =
                both_paths::<Complex64>(op, &[a.view().into(), a.view().into()], &[3, 3]);
            assert_eq!(native, generic);
        }
    }

    #[test]
    fn test_every_native_entry_matches_fallback() {
        let mut rng = StdRng::seed_from_u64(2024);
        let shape = [13, 7];
        for op in Op::ALL {
            let d = op.dispatcher().unwrap();
            let fallback = d.table().fallback().unwrap();
            let sigs: Vec<Signature> = d.table().signatures().cloned().collect();
            assert_eq!(sigs.len(), 5);
            for sig in sigs {
                let label = format!("{} {}", op.name(), sig.to_chars());
                let operands: Vec<Operand> = sig
                    .inputs()
                    .iter()
                    .map(|&t| Operand::random(t, &shape, &mut rng))
                    .collect();
                let inputs: Vec<DynView<'_>> = operands.iter().map(Operand::view).collect();

                let mut native = Operand::zeros(sig.output(), &shape);
                let id = d.call(&inputs, &mut native.view_mut()).unwrap();
                assert!(matches!(id, KernelId::Entry(_)), "{label}");
                let mut generic = Operand::zeros(sig.output(), &shape);
                fallback.run(&inputs, &mut generic.view_mut()).unwrap();

                let (nv, gv) = (native.view(), generic.view());
                for_each_multi_index(&shape, Order::RowMajor, |idx| {
                    let x = bits(nv.get_scalar(idx).unwrap());
                    let y = bits(gv.get_scalar(idx).unwrap());
                    assert_eq!(x, y, "{label} at {idx:?}");
                });
            }
        }
    }

    #[test]
    fn test_native_wrapping_matches_fallback_i64() {
        let a = NdArray::<i64>::from_vec(vec![i64::MAX, i64::MIN, -9, 4], &[4], Order::RowMajor)
            .unwrap();
        let b = NdArray::<i64>::from_vec(vec![1, -1, 3, i64::MAX], &[4], Order::RowMajor).unwrap();
        for op in [Op::Add, Op::Mul] {
            let (native, generic) =
                both_paths::<i64>(op, &[a.view().into(), b.view().into()], &[4]);
            assert_eq!(native, generic);
        }
        let (native, generic) = both_paths::<i64>(Op::Abs, &[a.view().into()], &[4]);
        assert_eq!(native, generic);
        assert_eq!(native, vec![i64::MAX, i64::MIN, 9, 4]);
    }

    #[test]
    fn test_mixed_dtypes_use_fallback() {
        let a = NdArray::<f64>::from_vec(vec![1.5, -2.0], &[2], Order::RowMajor).unwrap();
        let b = NdArray::<u8>::from_vec(vec![2, 3], &[2], Order::RowMajor).unwrap();
        let mut out = NdArray::<f32>::zeros(&[2], Order::RowMajor);
        let id = mul(a.view().into(), b.view().into(), &mut out.view_mut().into()).unwrap();
        assert_eq!(id, KernelId::Fallback);
        assert_eq!(out.data(), &[3.0, -6.0]);
    }

    #[test]
    fn test_abs_complex_to_float() {
        let a = NdArray::<Complex64>::from_vec(
            vec![Complex64::new(3.0, 4.0), Complex64::new(0.0, -1.0)],
            &[2],
            Order::RowMajor,
        )
        .unwrap();
        let mut out = NdArray::<f64>::zeros(&[2], Order::RowMajor);
        let id = abs(a.view().into(), &mut out.view_mut().into()).unwrap();
        assert!(matches!(id, KernelId::Entry(_)));
        assert_eq!(out.data(), &[5.0, 1.0]);
    }

    #[test]
    fn test_identity_widens() {
        let a = NdArray::<i32>::from_vec(vec![1, -2, 3], &[3], Order::RowMajor).unwrap();
        let mut out = NdArray::<f64>::zeros(&[3], Order::ColumnMajor);
        let id = identity(a.view().into(), &mut out.view_mut().into()).unwrap();
        assert!(matches!(id, KernelId::Entry(_)));
        assert_eq!(out.data(), &[1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_has_native() {
        assert!(has_native(Op::Add, DType::Float64));
        assert!(has_native(Op::Mul, DType::Int64));
        assert!(!has_native(Op::Add, DType::Uint16));
        assert!(!has_native(Op::Abs, DType::Complex128));
    }

    #[test]
    fn test_dispatcher_is_shared() {
        for op in Op::ALL {
            let first = op.dispatcher().unwrap();
            let second = op.dispatcher().unwrap();
            assert!(std::ptr::eq(first, second));
            assert_eq!(first.name(), op.name());
            assert_eq!(first.table().arity(), op.arity());
        }
    }
}
