//! Snapshot regions that seed particles.

/// An axis-aligned rectangle of the snapshot, in snapshot pixels.
///
/// Regions are quantized in place by the planner: width and height are cut
/// down to a multiple of the cell diameter. The remainder is gone for good,
/// a later quantization never grows a region back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Region {
    /// Left edge (anchored during quantization).
    pub left: i32,
    /// Top edge (anchored during quantization).
    pub top: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Region {
    /// Creates a region from its left/top corner and size.
    #[inline]
    #[must_use]
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self { left, top, width, height }
    }

    /// Area in pixels. Degenerate regions count as zero.
    #[inline]
    #[must_use]
    pub fn area(&self) -> u64 {
        let width = u64::try_from(self.width).unwrap_or(0);
        let height = u64::try_from(self.height).unwrap_or(0);
        width * height
    }

    /// True if the region covers no pixels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    /// Truncates width and height down to a multiple of `diameter`.
    pub fn quantize(&mut self, diameter: u32) {
        let Ok(d) = i32::try_from(diameter.max(1)) else {
            self.width = 0;
            self.height = 0;
            return;
        };
        self.width = self.width.max(0) / d * d;
        self.height = self.height.max(0) / d * d;
    }

    /// Packs the region as `[left, top, width, height]` for GPU upload.
    #[inline]
    #[must_use]
    pub const fn to_array(&self) -> [i32; 4] {
        [self.left, self.top, self.width, self.height]
    }
}

/// Sum of raw areas over a region set.
#[must_use]
pub fn total_area(regions: &[Region]) -> u64 {
    regions.iter().map(Region::area).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area() {
        let region = Region::new(10, 20, 100, 50);
        assert_eq!(region.area(), 5_000);
        assert_eq!(region.to_array(), [10, 20, 100, 50]);
    }

    #[test]
    fn test_negative_size_is_empty() {
        let region = Region::new(0, 0, -5, 10);
        assert_eq!(region.area(), 0);
        assert!(region.is_empty());
    }

    #[test]
    fn test_quantize_keeps_left_top() {
        let mut region = Region::new(3, 7, 101, 55);
        region.quantize(4);
        assert_eq!(region, Region::new(3, 7, 100, 52));
    }

    #[test]
    fn test_quantize_discards_remainder_permanently() {
        let mut region = Region::new(0, 0, 10, 10);
        region.quantize(3);
        assert_eq!((region.width, region.height), (9, 9));
        region.quantize(2);
        // 9 -> 8, the lost column from the first pass stays lost
        assert_eq!((region.width, region.height), (8, 8));
    }

    #[test]
    fn test_total_area() {
        let regions = [Region::new(0, 0, 10, 10), Region::new(50, 50, 4, 5)];
        assert_eq!(total_area(&regions), 120);
    }
}
