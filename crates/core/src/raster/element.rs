//! Cell types a band can hold

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Numeric cell type of a [`Raster`](crate::Raster).
///
/// Surface reflectance bands arrive as `u16` digital numbers, derived
/// indices are `f64`.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Sentinel used when a source declares no nodata value.
    ///
    /// Zero for every type: clipped Landsat products pad outside the lake
    /// boundary with zeros.
    fn default_nodata() -> Self {
        Self::zero()
    }

    /// Exact match against the sentinel; a NaN sentinel matches NaN cells
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// `None` when the value does not fit the type
    fn from_f64(value: f64) -> Option<Self> {
        NumCast::from(value)
    }
}

macro_rules! integer_cells {
    ($($t:ty),*) => {$(
        impl RasterElement for $t {
            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                nodata == Some(*self)
            }
        }
    )*};
}

macro_rules! float_cells {
    ($($t:ty),*) => {$(
        impl RasterElement for $t {
            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                match nodata {
                    Some(nd) if nd.is_nan() => self.is_nan(),
                    Some(nd) => *self == nd,
                    None => false,
                }
            }
        }
    )*};
}

integer_cells!(u8, u16, i16, u32, i32);
float_cells!(f32, f64);
