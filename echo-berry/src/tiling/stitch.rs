use ndarray::{s, Array3, ArrayView3};

use super::TileConfig;
use crate::error::{SegError, SegResult};
use crate::Idx2d;

/// 裁掉预测块中的补零部分和重叠边框, 返回该分块独占的内部区域.
///
/// 1. 保留前 `patch - pad` 行/列 (去掉远端补零);
/// 2. 在剩余部分的四周各去掉 `overlap` 宽的边框.
///
/// 剩余部分不足两倍重叠宽度时, 内部区域为空. 预测块的空间形状必须等于分块大小,
/// 否则返回 `Err(SegError::PatchShape)`.
pub fn crop_interior<'a>(
    config: &TileConfig,
    (pad_r, pad_c): Idx2d,
    block: ArrayView3<'a, f32>,
) -> SegResult<ArrayView3<'a, f32>> {
    let (ph, pw) = config.patch();
    let (bh, bw, _) = block.dim();
    if (bh, bw) != (ph, pw) {
        return Err(SegError::PatchShape {
            expected: (ph, pw),
            found: (bh, bw),
        });
    }
    let (ov_r, ov_c) = config.overlap();
    let (valid_r, valid_c) = (ph - pad_r, pw - pad_c);
    let end_r = valid_r.saturating_sub(ov_r).max(ov_r);
    let end_c = valid_c.saturating_sub(ov_c).max(ov_c);
    Ok(block.slice_move(s![ov_r..end_r, ov_c..end_c, ..]))
}

/// 将逐块预测结果拼回原始大小的输出栅格.
///
/// 输出栅格在第一次写入时按 `(H, W, C_out)` 分配 (或在构造时按声明的通道数分配),
/// 之后所有写入的通道数都必须与之相同.
#[derive(Debug, Clone)]
pub struct TileStitcher {
    shape: Idx2d,
    config: TileConfig,
    out: Option<Array3<f32>>,
}

impl TileStitcher {
    /// 为 `(h, w)` 的原始栅格创建拼接器, 输出通道数待定.
    #[inline]
    pub fn new(shape: Idx2d, config: TileConfig) -> Self {
        Self {
            shape,
            config,
            out: None,
        }
    }

    /// 为 `(h, w)` 的原始栅格创建拼接器, 并立即分配 `channels` 通道的输出.
    #[inline]
    pub fn with_channels(shape: Idx2d, config: TileConfig, channels: usize) -> Self {
        let (h, w) = shape;
        Self {
            shape,
            config,
            out: Some(Array3::zeros((h, w, channels))),
        }
    }

    /// 已确定的输出通道数.
    #[inline]
    pub fn channels(&self) -> Option<usize> {
        self.out.as_ref().map(|o| o.dim().2)
    }

    /// 消费一个分块的预测结果: 裁剪后写入输出栅格.
    ///
    /// `origin` 为分块在填充后坐标系中的原点, `pad` 为提取分块时的远端补零量.
    pub fn insert(&mut self, origin: Idx2d, pad: Idx2d, block: ArrayView3<f32>) -> SegResult<()> {
        let interior = crop_interior(&self.config, pad, block)?;
        self.write_interior(origin, interior)
    }

    /// 将已裁剪的内部区域写入输出栅格 `[x0.., x1.., ..]` 处.
    pub fn write_interior(&mut self, (x0, x1): Idx2d, interior: ArrayView3<f32>) -> SegResult<()> {
        let (ih, iw, c) = interior.dim();
        let (h, w) = self.shape;
        let out = self.out.get_or_insert_with(|| Array3::zeros((h, w, c)));
        let expected = out.dim().2;
        if expected != c {
            return Err(SegError::ChannelCount { expected, found: c });
        }
        if ih == 0 || iw == 0 {
            return Ok(());
        }
        debug_assert!(x0 + ih <= h && x1 + iw <= w);
        out.slice_mut(s![x0..x0 + ih, x1..x1 + iw, ..])
            .assign(&interior);
        Ok(())
    }

    /// 获得拼接结果. 若从未写入过任何分块且未声明通道数, 结果有 0 个通道.
    pub fn finish(self) -> Array3<f32> {
        let (h, w) = self.shape;
        self.out.unwrap_or_else(|| Array3::zeros((h, w, 0)))
    }
}

#[cfg(test)]
mod tests {
    use super::{crop_interior, TileStitcher};
    use crate::error::SegError;
    use crate::tiling::TileConfig;
    use ndarray::Array3;

    #[test]
    fn test_crop_interior() {
        let cfg = TileConfig::new(16, 4).unwrap();
        let block = Array3::<f32>::ones((16, 16, 3));

        let i = crop_interior(&cfg, (0, 0), block.view()).unwrap();
        assert_eq!(i.dim(), (8, 8, 3));

        // 远端补零 3 行 5 列: 剩余 13 x 11, 去掉边框后 5 x 3.
        let i = crop_interior(&cfg, (3, 5), block.view()).unwrap();
        assert_eq!(i.dim(), (5, 3, 3));

        // 剩余部分不足两倍重叠宽度.
        let i = crop_interior(&cfg, (8, 10), block.view()).unwrap();
        assert_eq!(i.dim(), (0, 0, 3));
        let i = crop_interior(&cfg, (16, 0), block.view()).unwrap();
        assert_eq!(i.dim(), (0, 8, 3));
    }

    #[test]
    fn test_zero_overlap_keeps_all() {
        let cfg = TileConfig::new((4, 6), 0).unwrap();
        let block = Array3::<f32>::ones((4, 6, 1));
        let i = crop_interior(&cfg, (1, 2), block.view()).unwrap();
        assert_eq!(i.dim(), (3, 4, 1));
    }

    #[test]
    fn test_patch_shape_error() {
        let cfg = TileConfig::new(16, 4).unwrap();
        let block = Array3::<f32>::ones((16, 15, 1));
        assert!(matches!(
            crop_interior(&cfg, (0, 0), block.view()),
            Err(SegError::PatchShape {
                expected: (16, 16),
                found: (16, 15)
            })
        ));
    }

    #[test]
    fn test_lazy_channels_and_mismatch() {
        let cfg = TileConfig::new(16, 4).unwrap();
        let mut s = TileStitcher::new((20, 20), cfg);
        assert_eq!(s.channels(), None);

        let block = Array3::<f32>::from_elem((16, 16, 2), 7.0);
        s.insert((0, 0), (0, 0), block.view()).unwrap();
        assert_eq!(s.channels(), Some(2));

        let bad = Array3::<f32>::zeros((16, 16, 3));
        assert!(matches!(
            s.insert((8, 0), (0, 0), bad.view()),
            Err(SegError::ChannelCount {
                expected: 2,
                found: 3
            })
        ));

        let out = s.finish();
        assert_eq!(out.dim(), (20, 20, 2));
        assert_eq!(out[(0, 0, 1)], 7.0);
        assert_eq!(out[(7, 7, 0)], 7.0);
        assert_eq!(out[(8, 0, 0)], 0.0);
        assert_eq!(out[(0, 8, 0)], 0.0);
    }

    #[test]
    fn test_declared_channels() {
        let cfg = TileConfig::new(16, 4).unwrap();
        let mut s = TileStitcher::with_channels((20, 20), cfg, 1);
        assert_eq!(s.channels(), Some(1));
        let block = Array3::<f32>::zeros((16, 16, 4));
        assert!(matches!(
            s.insert((0, 0), (0, 0), block.view()),
            Err(SegError::ChannelCount {
                expected: 1,
                found: 4
            })
        ));
    }

    #[test]
    fn test_finish_without_patches() {
        let s = TileStitcher::new((5, 6), TileConfig::default());
        assert_eq!(s.finish().dim(), (5, 6, 0));
    }
}
