//! 预测与标签的可视化存储.
//!
//! 只负责生成显示用的图像并写到磁盘, 不提供任何交互界面.

use std::path::Path;

use ndarray::{s, Array3, ArrayView2};

use crate::consts::gray::*;
use crate::consts::label::{self, Label};
use crate::error::SegResult;

/// 将单通道概率扩展为 `(H, W, 3)` 的显示用合成图: `(R, G, B) = (p, 0, 0)`.
pub fn prediction_composite(seg: ArrayView2<f32>) -> Array3<f32> {
    let (h, w) = seg.dim();
    let mut ans = Array3::<f32>::zeros((h, w, 3));
    ans.slice_mut(s![.., .., 0]).assign(&seg);
    ans
}

/// 将 `[0, 1]` 内的概率乘以 `contrast` 后映射为 8-bit 值. 结果截断到 `[0, 255]`,
/// 非有限值视为 0.
#[inline]
fn to_u8(p: f32, contrast: f32) -> u8 {
    let v = p * contrast;
    if !v.is_finite() {
        return 0;
    }
    (v.clamp(0.0, 1.0) * 255.0) as u8
}

/// 使标签更有利于单通道可视化.
#[inline]
pub(crate) fn pretty(l: Label) -> u8 {
    match l {
        // 背景为黑色
        label::BACKGROUND => BLACK,

        // 沙鳗为白色
        label::SANDEEL => WHITE,

        // 其它鱼类接近沙鳗但可区分
        label::OTHER => LIGHT_GRAY,

        // 忽略区域接近背景
        label::IGNORE | label::REFINE_IGNORE => DARK_GRAY,

        _ => GRAY,
    }
}

/// 将沙鳗概率以红色通道合成图保存到 `path`. `contrast` 为对比度增益.
pub fn save_prediction<P: AsRef<Path>>(
    seg: ArrayView2<f32>,
    contrast: f32,
    path: P,
) -> SegResult<()> {
    let comp = prediction_composite(seg);
    let (height, width, _) = comp.dim();
    let mut buf = image::RgbImage::new(width as u32, height as u32);
    for ((h, w), &p) in seg.indexed_iter() {
        let g = to_u8(comp[(h, w, 1)], contrast);
        let b = to_u8(comp[(h, w, 2)], contrast);
        buf.put_pixel(w as u32, h as u32, image::Rgb([to_u8(p, contrast), g, b]));
    }
    buf.save(path)?;
    Ok(())
}

/// 将忽略/背景/沙鳗/其它鱼类分别映射为暗灰色/黑色/白色/亮灰色后保存到 `path`.
pub fn save_labels<P: AsRef<Path>>(labels: ArrayView2<Label>, path: P) -> SegResult<()> {
    let (height, width) = labels.dim();
    let mut buf = image::GrayImage::new(width as u32, height as u32);
    for ((h, w), &l) in labels.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, image::Luma([pretty(l)]));
    }
    buf.save(path)?;
    Ok(())
}
