//! 多通道栅格的规范化.
//!
//! 栅格统一按 `(行, 列, 通道)` 组织. 行方向对应回波图的深度 (range),
//! 列方向对应时间 (ping).

use ndarray::{s, Array3, ArrayBase, ArrayView3, Data, DataMut, Dimension};
use num::Float;

use crate::Idx2d;

/// 将所有非有限值 (NaN, ±inf) 就地置零. 返回被修改的元素个数.
///
/// 这是数据质量容忍策略, 而不是错误.
pub fn sanitize_non_finite<A, S, D>(data: &mut ArrayBase<S, D>) -> usize
where
    A: Float,
    S: DataMut<Elem = A>,
    D: Dimension,
{
    let mut cnt = 0usize;
    data.iter_mut().filter(|v| !v.is_finite()).for_each(|v| {
        cnt += 1;
        *v = A::zero();
    });
    cnt
}

/// 在行方向两端各填充 `pad.0` 行, 列方向两端各填充 `pad.1` 列零值.
/// 通道方向不填充.
pub fn zero_pad(data: ArrayView3<f32>, (pad_h, pad_w): Idx2d) -> Array3<f32> {
    let (h, w, c) = data.dim();
    let mut ans = Array3::<f32>::zeros((h + 2 * pad_h, w + 2 * pad_w, c));
    ans.slice_mut(s![pad_h..pad_h + h, pad_w..pad_w + w, ..])
        .assign(&data);
    ans
}

/// 获取至少二维的数组的 (高, 宽).
#[inline]
pub fn spatial_shape<S: Data, D: Dimension>(data: &ArrayBase<S, D>) -> Idx2d {
    let sh = data.shape();
    (sh[0], sh[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_sanitize_non_finite() {
        let mut a = array![[1.0f32, f32::NAN], [f32::INFINITY, f32::NEG_INFINITY]];
        assert_eq!(sanitize_non_finite(&mut a), 3);
        assert_eq!(a, array![[1.0f32, 0.0], [0.0, 0.0]]);

        // 再次运行不应修改任何值.
        assert_eq!(sanitize_non_finite(&mut a), 0);
    }

    #[test]
    fn test_zero_pad() {
        let a = Array3::<f32>::ones((3, 4, 2));
        let p = zero_pad(a.view(), (1, 2));
        assert_eq!(p.dim(), (5, 8, 2));
        assert_eq!(p.sum(), a.sum());
        assert_eq!(p[(0, 0, 0)], 0.0);
        assert_eq!(p[(1, 2, 1)], 1.0);
        assert_eq!(p[(3, 5, 0)], 1.0);
        assert_eq!(p[(4, 7, 1)], 0.0);
        assert_eq!(spatial_shape(&p), (5, 8));
    }
}
