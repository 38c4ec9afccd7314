//! 评估区域: 目标包围盒外扩后的并集.

use ndarray::{s, Array2};

use crate::data::ObjectRecord;
use crate::Idx2d;

/// 由标注目标生成评估掩膜.
///
/// 对于鱼种属于 `fish_types` 的每个目标, 将其包围盒四周各外扩 `extend`
/// 像素, 裁剪到 `[0, h) x [0, w)` 后置为 `true`. 其它目标被完全忽略.
/// 结果为所有外扩包围盒的并集, 其余像素为 `false`.
pub fn extended_label_mask(
    objects: &[ObjectRecord],
    fish_types: &[i32],
    extend: usize,
    shape: Idx2d,
) -> Array2<bool> {
    let mut mask = Array2::from_elem(shape, false);
    for obj in objects.iter().filter(|o| fish_types.contains(&o.fish_type)) {
        if let Some((rows, cols)) = obj.bbox.extend(extend).clip(shape) {
            mask.slice_mut(s![rows, cols]).fill(true);
        }
    }
    mask
}
