//! 沙鳗概率统计.
//!
//! 将逐像素的沙鳗概率按标签分为正样本 (沙鳗) 与负样本两组, 供后续阈值 / ROC 分析.

use std::str::FromStr;

use ndarray::{Array1, ArrayView2, ArrayViewMut2, Zip};

use crate::consts::label::{self, Label};
use crate::error::{SegError, SegResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 负样本的选取方式.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// `"all"`: 背景与其它鱼类均为负样本.
    All,

    /// `"fish"`: 仅其它鱼类为负样本, 即只比较沙鳗与其它鱼类.
    Fish,
}

impl Mode {
    /// 标签 `l` 是否属于该模式下的负样本.
    #[inline]
    pub const fn is_negative(&self, l: Label) -> bool {
        match self {
            Mode::All => label::is_background_or_other(l),
            Mode::Fish => label::is_other(l),
        }
    }
}

impl FromStr for Mode {
    type Err = SegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Mode::All),
            "fish" => Ok(Mode::Fish),
            other => Err(SegError::UnknownMode(other.to_string())),
        }
    }
}

/// 将评估掩膜之外 (`mask` 为 `false`) 的标签改写为 `IGNORE`.
///
/// 返回被改写的像素个数. 形状不一致时返回 `Err(SegError::ShapeMismatch)`.
pub fn apply_eval_mask(
    mut labels: ArrayViewMut2<Label>,
    mask: ArrayView2<bool>,
) -> SegResult<usize> {
    check_shape("evaluation mask", labels.dim(), mask.dim())?;
    let mut cnt = 0usize;
    Zip::from(&mut labels).and(&mask).for_each(|l, &keep| {
        if !keep && *l != label::IGNORE {
            *l = label::IGNORE;
            cnt += 1;
        }
    });
    Ok(cnt)
}

#[inline]
fn check_shape(what: &'static str, expected: crate::Idx2d, found: crate::Idx2d) -> SegResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(SegError::ShapeMismatch {
            what,
            expected,
            found,
        })
    }
}

/// 跨多幅回波图累积的沙鳗概率.
///
/// 只能通过 [`ProbAccumulator::append`] 与 [`ProbAccumulator::merge`] 增长.
/// 多线程场景下每个线程各持一份, 最后合并.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProbAccumulator {
    negatives: Vec<f32>,
    positives: Vec<f32>,

    /// \[背景像素数, 沙鳗像素数, 其它鱼类像素数\].
    pixel_counts: [u64; 3],
}

impl ProbAccumulator {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 累积一幅回波图的结果.
    ///
    /// 1. `mask` 为 `false` 的像素视为 `IGNORE`;
    /// 2. 标签为沙鳗的像素的概率进入正样本;
    /// 3. 按 `mode` 选出的负样本标签的像素的概率进入负样本;
    /// 4. 与 `mode` 无关地统计背景/沙鳗/其它鱼类像素数.
    ///
    /// 概率按行优先顺序追加. 任意形状不一致时返回 `Err(SegError::ShapeMismatch)`,
    /// 且 `self` 不被修改.
    pub fn append(
        &mut self,
        seg: ArrayView2<f32>,
        labels: ArrayView2<Label>,
        mask: Option<ArrayView2<bool>>,
        mode: Mode,
    ) -> SegResult<()> {
        check_shape("labels", seg.dim(), labels.dim())?;
        if let Some(m) = &mask {
            check_shape("evaluation mask", seg.dim(), m.dim())?;
        }

        let mut visit = |p: f32, l: Label| {
            if label::is_sandeel(l) {
                self.positives.push(p);
            } else if mode.is_negative(l) {
                self.negatives.push(p);
            }
            if (label::BACKGROUND..=label::OTHER).contains(&l) {
                self.pixel_counts[l as usize] += 1;
            }
        };

        match mask {
            Some(m) => seg
                .iter()
                .zip(labels.iter())
                .zip(m.iter())
                .for_each(|((&p, &l), &keep)| visit(p, if keep { l } else { label::IGNORE })),
            None => seg
                .iter()
                .zip(labels.iter())
                .for_each(|(&p, &l)| visit(p, l)),
        }
        Ok(())
    }

    /// 合并另一份累积结果: 概率拼接在末尾, 像素数相加.
    pub fn merge(&mut self, other: Self) {
        self.negatives.extend(other.negatives);
        self.positives.extend(other.positives);
        for (a, b) in self.pixel_counts.iter_mut().zip(other.pixel_counts) {
            *a += b;
        }
    }

    /// 负样本概率.
    #[inline]
    pub fn negatives(&self) -> &[f32] {
        &self.negatives
    }

    /// 正样本 (沙鳗) 概率.
    #[inline]
    pub fn positives(&self) -> &[f32] {
        &self.positives
    }

    /// \[背景像素数, 沙鳗像素数, 其它鱼类像素数\].
    #[inline]
    pub fn pixel_counts(&self) -> [u64; 3] {
        self.pixel_counts
    }

    /// 是否还没有任何样本.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.negatives.is_empty() && self.positives.is_empty()
    }

    /// 消费自我, 获得 (负样本, 正样本) 数组.
    pub fn into_arrays(self) -> (Array1<f32>, Array1<f32>) {
        (Array1::from(self.negatives), Array1::from(self.positives))
    }
}
