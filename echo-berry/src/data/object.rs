//! 回波图上的标注目标.

use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 轴对齐包围盒, 以栅格坐标表示, 上界开区间.
///
/// 即 `[row_min, row_max) x [col_min, col_max)`. 坐标使用有符号整数,
/// 以便外扩后暂时越过栅格左上边界, 再由 [`BoundingBox::clip`] 裁剪回来.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    /// 最小行 (含).
    pub row_min: i64,
    /// 最大行 (不含).
    pub row_max: i64,
    /// 最小列 (含).
    pub col_min: i64,
    /// 最大列 (不含).
    pub col_max: i64,
}

impl BoundingBox {
    /// 直接初始化. 不检查坐标的合法性.
    #[inline]
    pub const fn new(row_min: i64, row_max: i64, col_min: i64, col_max: i64) -> Self {
        Self {
            row_min,
            row_max,
            col_min,
            col_max,
        }
    }

    /// 四个方向各外扩 `margin` 像素.
    #[inline]
    pub fn extend(&self, margin: usize) -> Self {
        let m = margin as i64;
        Self::new(
            self.row_min - m,
            self.row_max + m,
            self.col_min - m,
            self.col_max + m,
        )
    }

    /// 裁剪到 `[0, h) x [0, w)` 内, 返回行范围和列范围.
    ///
    /// 裁剪后为空时返回 `None`.
    pub fn clip(&self, (h, w): Idx2d) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>)> {
        #[inline]
        fn clamp(v: i64, hi: usize) -> usize {
            v.clamp(0, hi as i64) as usize
        }
        let rows = clamp(self.row_min, h)..clamp(self.row_max, h);
        let cols = clamp(self.col_min, w)..clamp(self.col_max, w);
        (!rows.is_empty() && !cols.is_empty()).then_some((rows, cols))
    }
}

/// 单个标注目标: 鱼种索引和包围盒.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectRecord {
    /// 鱼种索引 (fish type index).
    pub fish_type: i32,

    /// 包围盒.
    pub bbox: BoundingBox,
}

impl ObjectRecord {
    /// 直接初始化.
    #[inline]
    pub const fn new(fish_type: i32, bbox: BoundingBox) -> Self {
        Self { fish_type, bbox }
    }
}

#[cfg(test)]
mod tests {
    use super::BoundingBox;

    #[test]
    fn test_extend_and_clip() {
        let b = BoundingBox::new(10, 20, 10, 20).extend(5);
        assert_eq!(b, BoundingBox::new(5, 25, 5, 25));
        assert_eq!(b.clip((50, 50)), Some((5..25, 5..25)));

        // 左上角越界
        let b = BoundingBox::new(2, 8, 0, 3).extend(5);
        assert_eq!(b.clip((50, 50)), Some((0..13, 0..8)));

        // 右下角越界
        let b = BoundingBox::new(45, 50, 40, 49).extend(5);
        assert_eq!(b.clip((50, 50)), Some((40..50, 35..50)));
    }

    #[test]
    fn test_clip_empty() {
        assert_eq!(BoundingBox::new(60, 70, 0, 10).clip((50, 50)), None);
        assert_eq!(BoundingBox::new(0, 10, -20, -1).clip((50, 50)), None);
        assert_eq!(BoundingBox::new(5, 5, 0, 10).clip((50, 50)), None);
    }
}
