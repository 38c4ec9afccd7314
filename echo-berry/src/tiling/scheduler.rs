use itertools::iproduct;

use super::TileConfig;
use crate::Idx2d;

/// 计算覆盖填充后栅格的分块原点网格.
///
/// 原点坐标位于 **填充后** 的坐标系中. 由于填充宽度恰好等于重叠宽度,
/// 同一组数值也是分块内部区域在 **原始** 栅格中的左上角.
#[derive(Copy, Clone, Debug)]
pub struct TileScheduler {
    shape: Idx2d,
    config: TileConfig,
}

impl TileScheduler {
    /// 为 `(h, w)` 的原始栅格创建调度器.
    #[inline]
    pub fn new(shape: Idx2d, config: TileConfig) -> Self {
        Self { shape, config }
    }

    /// 单个方向上的原点序列: `0, stride, 2 * stride, ...`, 直到 `padded - overlap` (含).
    ///
    /// 终止条件允许最后一个分块越过填充后栅格的边缘, 越界部分由
    /// [`super::extract_patch`] 补零.
    pub fn axis_origins(padded: usize, patch: usize, overlap: usize) -> Vec<usize> {
        debug_assert!(patch > 2 * overlap);
        let stride = patch - 2 * overlap;
        (0..=padded - overlap).step_by(stride).collect()
    }

    /// 填充后栅格的形状.
    #[inline]
    pub fn padded_shape(&self) -> Idx2d {
        self.config.padded_shape(self.shape)
    }

    /// 行方向原点.
    pub fn row_origins(&self) -> Vec<usize> {
        Self::axis_origins(
            self.padded_shape().0,
            self.config.patch().0,
            self.config.overlap().0,
        )
    }

    /// 列方向原点.
    pub fn col_origins(&self) -> Vec<usize> {
        Self::axis_origins(
            self.padded_shape().1,
            self.config.patch().1,
            self.config.overlap().1,
        )
    }

    /// 以行优先顺序获取所有分块原点.
    pub fn origins(&self) -> impl Iterator<Item = Idx2d> {
        let cols = self.col_origins();
        iproduct!(self.row_origins(), cols)
    }

    /// 分块总数.
    #[inline]
    pub fn len(&self) -> usize {
        self.row_origins().len() * self.col_origins().len()
    }

    /// 总是 `false`: 原点 `0` 一定存在.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::TileScheduler;
    use crate::tiling::TileConfig;

    #[test]
    fn test_axis_origins_40_16_4() {
        // padded = 48, 条件 origin <= 44.
        let v = TileScheduler::axis_origins(48, 16, 4);
        assert_eq!(v, vec![0, 8, 16, 24, 32, 40]);
    }

    #[test]
    fn test_axis_origins_inclusive_bound() {
        // padded = 52, 条件 origin <= 48, 48 恰好落在步长上.
        let v = TileScheduler::axis_origins(52, 16, 4);
        assert_eq!(v, vec![0, 8, 16, 24, 32, 40, 48]);
    }

    #[test]
    fn test_zero_overlap() {
        assert_eq!(TileScheduler::axis_origins(10, 4, 0), vec![0, 4, 8]);
        assert_eq!(TileScheduler::axis_origins(8, 4, 0), vec![0, 4, 8]);
    }

    #[test]
    fn test_origins_row_major() {
        let s = TileScheduler::new((10, 20), TileConfig::new((12, 16), (1, 2)).unwrap());
        assert_eq!(s.padded_shape(), (12, 24));
        let rows = s.row_origins();
        let cols = s.col_origins();
        assert_eq!(rows, vec![0, 10]);
        assert_eq!(cols, vec![0, 12]);
        let all: Vec<_> = s.origins().collect();
        assert_eq!(all, vec![(0, 0), (0, 12), (10, 0), (10, 12)]);
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_raster_smaller_than_patch() {
        let s = TileScheduler::new((3, 3), TileConfig::default());
        assert_eq!(s.origins().collect::<Vec<_>>(), vec![(0, 0)]);
    }
}
