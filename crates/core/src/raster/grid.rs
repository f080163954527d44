//! Georeferenced band grid

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::Array2;

/// One band of a clipped scene, or an index derived from bands.
///
/// Cells are stored row-major. The transform and the nodata sentinel travel
/// with the cells so derived rasters can be written back with the same
/// georeferencing.
///
/// ```ignore
/// use lakewatch_core::Raster;
///
/// let mut green: Raster<f64> = Raster::new(4, 4);
/// green.set(1, 2, 812.0)?;
/// assert_eq!(green.get(1, 2)?, 812.0);
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    cells: Array2<T>,
    transform: GeoTransform,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    fn wrap(cells: Array2<T>, transform: GeoTransform) -> Self {
        Self {
            cells,
            transform,
            nodata: None,
        }
    }

    /// Zero-filled raster with the default transform
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::wrap(Array2::zeros((rows, cols)), GeoTransform::default())
    }

    /// Raster with every cell set to `value`
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::wrap(Array2::from_elem((rows, cols), value), GeoTransform::default())
    }

    /// Build from row-major cells; `cells.len()` must equal `rows * cols`
    pub fn from_vec(cells: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        let grid = Array2::from_shape_vec((rows, cols), cells).map_err(|_| {
            Error::InvalidDimensions {
                width: cols,
                height: rows,
            }
        })?;
        Ok(Self::wrap(grid, GeoTransform::default()))
    }

    /// Zero-filled raster of another element type on this raster's grid
    pub fn with_same_meta<U: RasterElement>(&self, rows: usize, cols: usize) -> Raster<U> {
        Raster::wrap(Array2::zeros((rows, cols)), self.transform)
    }

    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Bands of one scene must cover the same grid
    pub fn ensure_same_shape<U: RasterElement>(&self, other: &Raster<U>) -> Result<()> {
        let ((er, ec), (ar, ac)) = (self.shape(), other.shape());
        if (er, ec) == (ar, ac) {
            Ok(())
        } else {
            Err(Error::SizeMismatch { er, ec, ar, ac })
        }
    }

    fn out_of_bounds(&self, row: usize, col: usize) -> Error {
        Error::IndexOutOfBounds {
            row,
            col,
            rows: self.rows(),
            cols: self.cols(),
        }
    }

    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        match self.cells.get((row, col)) {
            Some(&v) => Ok(v),
            None => Err(self.out_of_bounds(row, col)),
        }
    }

    /// # Safety
    /// `row < self.rows()` and `col < self.cols()`
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.cells.uget((row, col)) }
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        match self.cells.get_mut((row, col)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(self.out_of_bounds(row, col)),
        }
    }

    pub fn data(&self) -> &Array2<T> {
        &self.cells
    }

    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.cells
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Sentinel declared by the source file, if any
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Pixel edge length in map units
    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    /// `true` wherever the cell equals `sentinel` exactly
    pub fn mask_equal(&self, sentinel: T) -> Array2<bool> {
        self.cells.mapv(|v| v.is_nodata(Some(sentinel)))
    }

    /// Range and mean of the cells that are neither the declared sentinel
    /// nor NaN
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut stats = RasterStatistics {
            min: None,
            max: None,
            mean: None,
            valid_count: 0,
            nodata_count: 0,
        };
        let mut sum = 0.0;

        for &value in self.cells.iter() {
            let numeric = value.to_f64().filter(|v| !v.is_nan());
            let Some(v) = numeric.filter(|_| !value.is_nodata(self.nodata)) else {
                stats.nodata_count += 1;
                continue;
            };
            if stats.min.map_or(true, |m| value < m) {
                stats.min = Some(value);
            }
            if stats.max.map_or(true, |m| value > m) {
                stats.max = Some(value);
            }
            sum += v;
            stats.valid_count += 1;
        }

        if stats.valid_count > 0 {
            stats.mean = Some(sum / stats.valid_count as f64);
        }
        stats
    }
}

/// Summary of a single band, as shown by `lakewatch info`
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    /// Sentinel and NaN cells
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let band: Raster<u16> = Raster::new(3, 5);
        assert_eq!(band.shape(), (3, 5));
        assert_eq!(band.len(), 15);
        assert!(band.data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_get_set_bounds_checked() {
        let mut band: Raster<f64> = Raster::new(2, 2);
        band.set(1, 0, 812.0).unwrap();
        assert_eq!(band.get(1, 0).unwrap(), 812.0);
        assert!(matches!(band.get(2, 0), Err(Error::IndexOutOfBounds { row: 2, .. })));
        assert!(band.set(0, 2, 1.0).is_err());
    }

    #[test]
    fn test_from_vec_wrong_length() {
        let result = Raster::<f64>::from_vec(vec![1.0; 5], 2, 3);
        assert!(matches!(result, Err(Error::InvalidDimensions { width: 3, height: 2 })));
    }

    #[test]
    fn test_statistics_skip_sentinel() {
        let mut band: Raster<u16> = Raster::from_vec(vec![0, 10, 20, 0, 30, 40], 2, 3).unwrap();
        band.set_nodata(Some(0));

        let stats = band.statistics();
        assert_eq!((stats.min, stats.max), (Some(10), Some(40)));
        assert_eq!((stats.valid_count, stats.nodata_count), (4, 2));
        assert!((stats.mean.unwrap() - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_statistics_skip_nan() {
        let band: Raster<f64> = Raster::from_vec(vec![f64::NAN, 0.5, -0.5, f64::NAN], 2, 2).unwrap();
        let stats = band.statistics();
        assert_eq!(stats.valid_count, 2);
        assert_eq!(stats.nodata_count, 2);
        assert_eq!(stats.mean, Some(0.0));
    }

    #[test]
    fn test_mask_equal() {
        let band: Raster<f64> = Raster::from_vec(vec![0.0, 1.0, 0.0, 2.0], 2, 2).unwrap();
        let mask = band.mask_equal(0.0);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 2);
        assert!(mask[(0, 0)] && !mask[(1, 1)]);
    }

    #[test]
    fn test_shape_check() {
        let a: Raster<f64> = Raster::new(4, 4);
        let b: Raster<u16> = Raster::new(4, 5);
        assert!(a.ensure_same_shape(&a.clone()).is_ok());
        assert!(matches!(
            a.ensure_same_shape(&b),
            Err(Error::SizeMismatch { er: 4, ec: 4, ar: 4, ac: 5 })
        ));
    }

    #[test]
    fn test_derived_keeps_transform() {
        let mut band: Raster<u16> = Raster::new(2, 2);
        band.set_transform(GeoTransform::new(500_000.0, 4_200_000.0, 30.0, -30.0));
        let derived = band.with_same_meta::<f64>(2, 2);
        assert_eq!(derived.transform(), band.transform());
        assert_eq!(derived.nodata(), None);
    }
}
