use ndarray::{s, Array3, ArrayView3};

use crate::Idx2d;

/// 一个待预测的分块.
#[derive(Clone, Debug)]
pub struct Patch {
    /// 分块在填充后栅格中的原点.
    pub origin: Idx2d,

    /// 形状恰为 `(patch_h, patch_w, C_in)` 的数据.
    pub data: Array3<f32>,

    /// 在行/列方向远端补上的零值行数/列数.
    pub pad: Idx2d,
}

/// 从填充后的栅格 `padded` 中以 `origin` 为左上角切出 `patch` 大小的分块.
///
/// 若栅格在某方向上提前结束, 在该方向远端补零直到恰好达到 `patch` 大小,
/// 补零量记录在 [`Patch::pad`] 中.
pub fn extract_patch(padded: ArrayView3<f32>, (x0, x1): Idx2d, (ph, pw): Idx2d) -> Patch {
    let (h, w, c) = padded.dim();
    let (r0, c0) = (x0.min(h), x1.min(w));
    let (r1, c1) = ((x0 + ph).min(h), (x1 + pw).min(w));
    let view = padded.slice(s![r0..r1, c0..c1, ..]);
    let pad = (ph - (r1 - r0), pw - (c1 - c0));

    let data = if pad == (0, 0) {
        view.to_owned()
    } else {
        let mut buf = Array3::<f32>::zeros((ph, pw, c));
        buf.slice_mut(s![..r1 - r0, ..c1 - c0, ..]).assign(&view);
        buf
    };
    Patch {
        origin: (x0, x1),
        data,
        pad,
    }
}
