//! Runtime-typed views.
//!
//! [`DynView`] / [`DynViewMut`] wrap a typed view in an enum tagged by
//! [`DType`], so callers that only know element types at runtime can hand
//! heterogeneous arrays to the dispatch layer. `uint8c` shares the `u8`
//! storage type with `uint8` but keeps its own tag; writes through
//! [`DynViewMut::set_scalar`] clamp instead of wrapping.

use num_complex::Complex;

use ndstrided_traits::{DType, Element, Scalar};

use crate::order::Order;
use crate::view::{ArrayView, ArrayViewMut};
use crate::{Result, StridedError};

/// A typed view of any supported element type.
#[derive(Clone, Debug)]
pub enum DynView<'a> {
    Float64(ArrayView<'a, f64>),
    Float32(ArrayView<'a, f32>),
    Int8(ArrayView<'a, i8>),
    Int16(ArrayView<'a, i16>),
    Int32(ArrayView<'a, i32>),
    Int64(ArrayView<'a, i64>),
    Uint8(ArrayView<'a, u8>),
    Uint8c(ArrayView<'a, u8>),
    Uint16(ArrayView<'a, u16>),
    Uint32(ArrayView<'a, u32>),
    Uint64(ArrayView<'a, u64>),
    Complex64(ArrayView<'a, Complex<f32>>),
    Complex128(ArrayView<'a, Complex<f64>>),
    Bool(ArrayView<'a, bool>),
    Generic(ArrayView<'a, Scalar>),
}

/// A typed mutable view of any supported element type.
#[derive(Debug)]
pub enum DynViewMut<'a> {
    Float64(ArrayViewMut<'a, f64>),
    Float32(ArrayViewMut<'a, f32>),
    Int8(ArrayViewMut<'a, i8>),
    Int16(ArrayViewMut<'a, i16>),
    Int32(ArrayViewMut<'a, i32>),
    Int64(ArrayViewMut<'a, i64>),
    Uint8(ArrayViewMut<'a, u8>),
    Uint8c(ArrayViewMut<'a, u8>),
    Uint16(ArrayViewMut<'a, u16>),
    Uint32(ArrayViewMut<'a, u32>),
    Uint64(ArrayViewMut<'a, u64>),
    Complex64(ArrayViewMut<'a, Complex<f32>>),
    Complex128(ArrayViewMut<'a, Complex<f64>>),
    Bool(ArrayViewMut<'a, bool>),
    Generic(ArrayViewMut<'a, Scalar>),
}

macro_rules! each_variant {
    ($enum:ident, $value:expr, $v:ident => $body:expr) => {
        match $value {
            $enum::Float64($v) => $body,
            $enum::Float32($v) => $body,
            $enum::Int8($v) => $body,
            $enum::Int16($v) => $body,
            $enum::Int32($v) => $body,
            $enum::Int64($v) => $body,
            $enum::Uint8($v) => $body,
            $enum::Uint8c($v) => $body,
            $enum::Uint16($v) => $body,
            $enum::Uint32($v) => $body,
            $enum::Uint64($v) => $body,
            $enum::Complex64($v) => $body,
            $enum::Complex128($v) => $body,
            $enum::Bool($v) => $body,
            $enum::Generic($v) => $body,
        }
    };
}

macro_rules! layout_accessors {
    ($enum:ident) => {
        pub fn shape(&self) -> &[usize] {
            each_variant!($enum, self, v => v.shape())
        }

        pub fn strides(&self) -> &[isize] {
            each_variant!($enum, self, v => v.strides())
        }

        pub fn offset(&self) -> usize {
            each_variant!($enum, self, v => v.offset())
        }

        pub fn order(&self) -> Order {
            each_variant!($enum, self, v => v.order())
        }

        pub fn ndim(&self) -> usize {
            self.shape().len()
        }

        pub fn len(&self) -> usize {
            each_variant!($enum, self, v => v.len())
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        /// Runtime data type tag.
        pub fn dtype(&self) -> DType {
            match self {
                $enum::Float64(_) => DType::Float64,
                $enum::Float32(_) => DType::Float32,
                $enum::Int8(_) => DType::Int8,
                $enum::Int16(_) => DType::Int16,
                $enum::Int32(_) => DType::Int32,
                $enum::Int64(_) => DType::Int64,
                $enum::Uint8(_) => DType::Uint8,
                $enum::Uint8c(_) => DType::Uint8c,
                $enum::Uint16(_) => DType::Uint16,
                $enum::Uint32(_) => DType::Uint32,
                $enum::Uint64(_) => DType::Uint64,
                $enum::Complex64(_) => DType::Complex64,
                $enum::Complex128(_) => DType::Complex128,
                $enum::Bool(_) => DType::Bool,
                $enum::Generic(_) => DType::Generic,
            }
        }

        /// Read the element at `indices` as a [`Scalar`].
        pub fn get_scalar(&self, indices: &[usize]) -> Result<Scalar> {
            each_variant!($enum, self, v => v.get(indices).map(Element::to_scalar))
        }
    };
}

impl<'a> DynView<'a> {
    layout_accessors!(DynView);

    /// Tag a `u8` view as `uint8c`.
    pub fn uint8c(view: ArrayView<'a, u8>) -> Self {
        DynView::Uint8c(view)
    }

    /// The typed view, if this holds elements of type `T`.
    pub fn downcast<T: DynElement>(&self) -> Result<&ArrayView<'a, T>> {
        T::from_dyn(self).ok_or(StridedError::DTypeMismatch {
            expected: T::DTYPE,
            actual: self.dtype(),
        })
    }

    /// Broadcast to `target_shape`, keeping the dtype tag.
    pub fn broadcast_to(&self, target_shape: &[usize]) -> Result<DynView<'a>> {
        macro_rules! rewrap {
            ($($variant:ident),+) => {
                match self {
                    $(DynView::$variant(v) => DynView::$variant(v.broadcast_to(target_shape)?),)+
                }
            };
        }
        Ok(rewrap!(
            Float64, Float32, Int8, Int16, Int32, Int64, Uint8, Uint8c, Uint16, Uint32, Uint64,
            Complex64, Complex128, Bool, Generic
        ))
    }
}

impl<'a> DynViewMut<'a> {
    layout_accessors!(DynViewMut);

    /// Tag a mutable `u8` view as `uint8c`.
    pub fn uint8c(view: ArrayViewMut<'a, u8>) -> Self {
        DynViewMut::Uint8c(view)
    }

    /// The typed mutable view, if this holds elements of type `T`.
    pub fn downcast_mut<T: DynElement>(&mut self) -> Result<&mut ArrayViewMut<'a, T>> {
        let actual = self.dtype();
        T::from_dyn_mut(self).ok_or(StridedError::DTypeMismatch {
            expected: T::DTYPE,
            actual,
        })
    }

    /// Write `value` at `indices`, converting it to the element type.
    pub fn set_scalar(&mut self, indices: &[usize], value: Scalar) -> Result<()> {
        match self {
            DynViewMut::Uint8c(v) => v.set(indices, clamp_u8(value)),
            DynViewMut::Float64(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Float32(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Int8(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Int16(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Int32(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Int64(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Uint8(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Uint16(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Uint32(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Uint64(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Complex64(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Complex128(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Bool(v) => v.set(indices, Element::from_scalar(value)),
            DynViewMut::Generic(v) => v.set(indices, value),
        }
    }

    /// Reborrow as an immutable runtime-typed view.
    pub fn as_view(&self) -> DynView<'_> {
        match self {
            DynViewMut::Float64(v) => DynView::Float64(v.as_view()),
            DynViewMut::Float32(v) => DynView::Float32(v.as_view()),
            DynViewMut::Int8(v) => DynView::Int8(v.as_view()),
            DynViewMut::Int16(v) => DynView::Int16(v.as_view()),
            DynViewMut::Int32(v) => DynView::Int32(v.as_view()),
            DynViewMut::Int64(v) => DynView::Int64(v.as_view()),
            DynViewMut::Uint8(v) => DynView::Uint8(v.as_view()),
            DynViewMut::Uint8c(v) => DynView::Uint8c(v.as_view()),
            DynViewMut::Uint16(v) => DynView::Uint16(v.as_view()),
            DynViewMut::Uint32(v) => DynView::Uint32(v.as_view()),
            DynViewMut::Uint64(v) => DynView::Uint64(v.as_view()),
            DynViewMut::Complex64(v) => DynView::Complex64(v.as_view()),
            DynViewMut::Complex128(v) => DynView::Complex128(v.as_view()),
            DynViewMut::Bool(v) => DynView::Bool(v.as_view()),
            DynViewMut::Generic(v) => DynView::Generic(v.as_view()),
        }
    }
}

/// Round half to even, then clamp into `[0, 255]`; NaN maps to 0.
fn clamp_u8(value: Scalar) -> u8 {
    match value {
        Scalar::Float(v) => {
            if v.is_nan() {
                return 0;
            }
            let f = v.floor();
            let d = v - f;
            let r = if d > 0.5 || (d == 0.5 && f % 2.0 != 0.0) {
                f + 1.0
            } else {
                f
            };
            r.clamp(0.0, 255.0) as u8
        }
        Scalar::Complex(c) => clamp_u8(Scalar::Float(c.re)),
        Scalar::Int(v) => v.clamp(0, 255) as u8,
        Scalar::Uint(v) => v.min(255) as u8,
        Scalar::Bool(b) => b as u8,
    }
}

/// Element types that have a [`DynView`] variant.
pub trait DynElement: Element {
    fn from_dyn<'v, 'a>(view: &'v DynView<'a>) -> Option<&'v ArrayView<'a, Self>>;

    fn from_dyn_mut<'v, 'a>(view: &'v mut DynViewMut<'a>) -> Option<&'v mut ArrayViewMut<'a, Self>>;

    fn into_dyn(view: ArrayView<'_, Self>) -> DynView<'_>;

    fn into_dyn_mut(view: ArrayViewMut<'_, Self>) -> DynViewMut<'_>;
}

macro_rules! impl_dyn_element {
    ($($t:ty => $variant:ident $(| $alias:ident)?),* $(,)?) => {
        $(
            impl DynElement for $t {
                #[inline]
                fn from_dyn<'v, 'a>(view: &'v DynView<'a>) -> Option<&'v ArrayView<'a, Self>> {
                    match view {
                        DynView::$variant(v) $(| DynView::$alias(v))? => Some(v),
                        _ => None,
                    }
                }

                #[inline]
                fn from_dyn_mut<'v, 'a>(
                    view: &'v mut DynViewMut<'a>,
                ) -> Option<&'v mut ArrayViewMut<'a, Self>> {
                    match view {
                        DynViewMut::$variant(v) $(| DynViewMut::$alias(v))? => Some(v),
                        _ => None,
                    }
                }

                #[inline]
                fn into_dyn(view: ArrayView<'_, Self>) -> DynView<'_> {
                    DynView::$variant(view)
                }

                #[inline]
                fn into_dyn_mut(view: ArrayViewMut<'_, Self>) -> DynViewMut<'_> {
                    DynViewMut::$variant(view)
                }
            }

            impl<'a> From<ArrayView<'a, $t>> for DynView<'a> {
                fn from(view: ArrayView<'a, $t>) -> Self {
                    <$t as DynElement>::into_dyn(view)
                }
            }

            impl<'a> From<ArrayViewMut<'a, $t>> for DynViewMut<'a> {
                fn from(view: ArrayViewMut<'a, $t>) -> Self {
                    <$t as DynElement>::into_dyn_mut(view)
                }
            }
        )*
    };
}

impl_dyn_element! {
    f64 => Float64,
    f32 => Float32,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    u8 => Uint8 | Uint8c,
    u16 => Uint16,
    u32 => Uint32,
    u64 => Uint64,
    Complex<f32> => Complex64,
    Complex<f64> => Complex128,
    bool => Bool,
    Scalar => Generic,
}
