//! North-up georeferencing of a band

use serde::{Deserialize, Serialize};

/// Placement of a pixel grid in map coordinates.
///
/// Clipped Landsat bands are north-up UTM grids: pixel (col, row) has its
/// top-left corner at `(origin_x + col * pixel_width, origin_y + row *
/// pixel_height)`, with `pixel_height` negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub origin_x: f64,
    pub origin_y: f64,
    pub pixel_width: f64,
    /// Negative for north-up grids
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Pixel edge length in map units
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Ground area of one pixel, in squared map units
    pub fn pixel_area(&self) -> f64 {
        (self.pixel_width * self.pixel_height).abs()
    }

    /// (min_x, min_y, max_x, max_y) of a `width` x `height` grid
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let far_x = self.origin_x + width as f64 * self.pixel_width;
        let far_y = self.origin_y + height as f64 * self.pixel_height;
        (
            self.origin_x.min(far_x),
            self.origin_y.min(far_y),
            self.origin_x.max(far_x),
            self.origin_y.max(far_y),
        )
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bounds_north_up() {
        let gt = GeoTransform::new(500_000.0, 4_200_000.0, 30.0, -30.0);
        let (min_x, min_y, max_x, max_y) = gt.bounds(10, 20);

        assert_relative_eq!(min_x, 500_000.0, epsilon = 1e-6);
        assert_relative_eq!(max_x, 500_300.0, epsilon = 1e-6);
        assert_relative_eq!(min_y, 4_199_400.0, epsilon = 1e-6);
        assert_relative_eq!(max_y, 4_200_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_landsat_pixel_area() {
        let gt = GeoTransform::new(0.0, 0.0, 30.0, -30.0);
        assert_relative_eq!(gt.pixel_area(), 900.0, epsilon = 1e-10);
        assert_relative_eq!(gt.cell_size(), 30.0, epsilon = 1e-10);
    }

    #[test]
    fn test_default_unit_grid() {
        assert_eq!(GeoTransform::default().bounds(2, 3), (0.0, -3.0, 2.0, 0.0));
    }
}
