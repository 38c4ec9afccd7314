//! 预测器边界.

use ndarray::{Array3, ArrayView3};

use crate::error::BoxedError;

/// 不透明的逐像素预测器.
///
/// 输入 `(patch_h, patch_w, C_in)`, 输出 `(patch_h, patch_w, C_out)`.
/// 同一栅格内每次调用的 `C_out` 必须相同. 模型结构、权重和运行设备都与本 crate 无关.
pub trait Predictor {
    /// 对单个分块进行预测.
    fn predict(&self, patch: ArrayView3<f32>) -> Result<Array3<f32>, BoxedError>;

    /// 预先声明输出通道数.
    ///
    /// 返回 `Some` 时输出栅格会在第一个分块之前分配好, 之后每个分块都会与之核对;
    /// 返回 `None` 时输出通道数由第一个分块的结果决定.
    #[inline]
    fn out_channels(&self) -> Option<usize> {
        None
    }
}

impl<F> Predictor for F
where
    F: Fn(ArrayView3<f32>) -> Result<Array3<f32>, BoxedError>,
{
    #[inline]
    fn predict(&self, patch: ArrayView3<f32>) -> Result<Array3<f32>, BoxedError> {
        self(patch)
    }
}

/// 原样返回输入的预测器. 用于验证拼接的正确性.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityPredictor;

impl Predictor for IdentityPredictor {
    #[inline]
    fn predict(&self, patch: ArrayView3<f32>) -> Result<Array3<f32>, BoxedError> {
        Ok(patch.to_owned())
    }
}
