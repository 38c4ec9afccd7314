//! 海底以下区域的预测屏蔽.

use ndarray::{ArrayBase, ArrayView1, Axis, DataMut, RemoveAxis, Slice};
use num::Zero;

use crate::error::{SegError, SegResult};

/// 将第 `c` 列中行号 `>= seabed[c] + offset` 的所有预测 (所有通道) 置零.
///
/// `pred` 至少为二维, 前两个轴依次为行、列, 其余轴 (如通道) 一并处理.
/// 该操作是幂等的.
///
/// # 返回值
///
/// - `seabed.len()` 不等于列数时返回 `Err(SegError::SeabedLength)`, 且不修改 `pred`;
/// - 否则返回 `Ok(())`.
pub fn mask_below_seabed<A, S, D>(
    pred: &mut ArrayBase<S, D>,
    seabed: ArrayView1<usize>,
    offset: usize,
) -> SegResult<()>
where
    A: Clone + Zero,
    S: DataMut<Elem = A>,
    D: RemoveAxis,
{
    debug_assert!(pred.ndim() >= 2);
    let (h, w) = (pred.len_of(Axis(0)), pred.len_of(Axis(1)));
    if seabed.len() != w {
        return Err(SegError::SeabedLength {
            seabed: seabed.len(),
            width: w,
        });
    }
    for (mut column, &bottom) in pred.axis_iter_mut(Axis(1)).zip(seabed.iter()) {
        let start = bottom.saturating_add(offset).min(h);
        column
            .slice_axis_mut(Axis(0), Slice::from(start..))
            .fill(A::zero());
    }
    Ok(())
}
