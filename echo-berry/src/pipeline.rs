//! 沙鳗分割流程.
//!
//! 对一批回波图依次执行: 选择频率 -> 清洗非有限值 -> 分块预测 -> 取沙鳗通道 ->
//! 屏蔽海底以下区域, 然后按需统计概率、写入预测记录或保存可视化结果.
//!
//! 批处理中任意一幅回波图失败都会中止整个批次.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::{debug, info, warn};
use ndarray::{Array2, Axis};

use crate::consts::label::{self, Label};
use crate::consts::{
    EVAL_EXTEND_SIZE, FREQUENCIES, PRED_CONTRAST, SANDEEL_CHANNEL, SANDEEL_FISH_TYPES,
    SEABED_OFFSET,
};
use crate::data::raster::{sanitize_non_finite, spatial_shape};
use crate::data::Echogram;
use crate::error::{SegError, SegResult};
use crate::persist::{NpzSink, PredictionRecord};
use crate::post_proc::{
    apply_eval_mask, extended_label_mask, mask_below_seabed, Mode, ProbAccumulator,
};
use crate::tiling::{segment, Predictor, TileConfig};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 一次运行的全部参数. 默认值见 [`crate::consts`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PipelineConfig {
    /// 分块参数.
    pub tile: TileConfig,
    /// 输入通道对应的频率 (kHz), 按顺序排列.
    pub frequencies: Vec<u32>,
    /// 海底以下多少行开始屏蔽.
    pub seabed_offset: usize,
    /// `region` 忽略模式下评估区域的外扩像素数.
    pub extend_size: usize,
    /// 生成评估区域的鱼种.
    pub fish_types: Vec<i32>,
    /// 预测结果中沙鳗概率所在的通道.
    pub class_channel: usize,
    /// 可视化对比度增益.
    pub pred_contrast: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tile: TileConfig::default(),
            frequencies: FREQUENCIES.to_vec(),
            seabed_offset: SEABED_OFFSET,
            extend_size: EVAL_EXTEND_SIZE,
            fish_types: SANDEEL_FISH_TYPES.to_vec(),
            class_channel: SANDEEL_CHANNEL,
            pred_contrast: PRED_CONTRAST,
        }
    }
}

/// 写出 / 可视化前对标签的处理方式.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum IgnoreMode {
    /// `"normal"`: 使用精化后的标签.
    Normal,

    /// `"region"`: 在 `Normal` 基础上, 将评估区域以外的标签改为忽略.
    Region,
}

impl FromStr for IgnoreMode {
    type Err = SegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(IgnoreMode::Normal),
            "region" => Ok(IgnoreMode::Region),
            other => Err(SegError::UnknownMode(other.to_string())),
        }
    }
}

/// 沙鳗分割器: 预测器 + 运行参数.
#[derive(Clone, Debug)]
pub struct SandeelSegmenter<P> {
    predictor: P,
    config: PipelineConfig,
}

impl<P: Predictor> SandeelSegmenter<P> {
    /// 初始化.
    pub fn new(predictor: P, config: PipelineConfig) -> Self {
        Self { predictor, config }
    }

    /// 运行参数.
    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 对单幅回波图分割, 返回 (沙鳗概率, 标签), 二者形状均为 `(H, W)`.
    ///
    /// 标签中的 `REFINE_IGNORE` 已被改写为 `IGNORE`. 海底以下区域的概率为 0.
    pub fn segment_echogram<E>(&self, ech: &E) -> SegResult<(Array2<f32>, Array2<Label>)>
    where
        E: Echogram + ?Sized,
    {
        let cfg = &self.config;
        let mut data = ech.data(&cfg.frequencies).map_err(SegError::Source)?;
        let bad = sanitize_non_finite(&mut data);
        if bad > 0 {
            debug!("{}: {bad} non-finite values set to 0", ech.name());
        }

        let mut labels = ech.refined_labels().map_err(SegError::Source)?;
        labels.mapv_inplace(|l| {
            if l == label::REFINE_IGNORE {
                label::IGNORE
            } else {
                l
            }
        });
        let shape = spatial_shape(&data);
        if labels.dim() != shape {
            return Err(SegError::ShapeMismatch {
                what: "labels",
                expected: shape,
                found: labels.dim(),
            });
        }

        let pred = segment(&self.predictor, data.view(), cfg.tile)?;
        let available = pred.len_of(Axis(2));
        if cfg.class_channel >= available {
            return Err(SegError::MissingChannel {
                channel: cfg.class_channel,
                available,
            });
        }
        let mut seg = pred.index_axis_move(Axis(2), cfg.class_channel);

        let seabed = ech.seabed().map_err(SegError::Source)?;
        mask_below_seabed(&mut seg, seabed.view(), cfg.seabed_offset)?;
        Ok((seg, labels))
    }

    /// 单幅回波图对 [`ProbAccumulator`] 的贡献.
    fn probs_of<E>(&self, ech: &E, mode: Mode, extend: Option<usize>) -> SegResult<ProbAccumulator>
    where
        E: Echogram + ?Sized,
    {
        let (seg, labels) = self.segment_echogram(ech)?;
        let mask = extend.map(|e| {
            extended_label_mask(ech.objects(), &self.config.fish_types, e, labels.dim())
        });
        let mut acc = ProbAccumulator::new();
        acc.append(
            seg.view(),
            labels.view(),
            mask.as_ref().map(|m| m.view()),
            mode,
        )?;
        if acc.is_empty() {
            warn!("{}: no pixel evaluated", ech.name());
        }
        Ok(acc)
    }

    /// 统计前 `n_echs` 幅回波图的沙鳗概率, 不使用评估区域.
    ///
    /// `mode` 为 `"all"` 或 `"fish"`, 在处理任何回波图之前检查.
    pub fn sandeel_probs<E: Echogram>(
        &self,
        echs: &[E],
        n_echs: usize,
        mode: &str,
    ) -> SegResult<ProbAccumulator> {
        let mode: Mode = mode.parse()?;
        let mut acc = ProbAccumulator::new();
        for (i, ech) in echs.iter().take(n_echs).enumerate() {
            debug!("{i} {}", ech.name());
            acc.merge(self.probs_of(ech, mode, None)?);
        }
        log_summary(&acc);
        Ok(acc)
    }

    /// 统计前 `n_echs` 幅回波图中, 标注目标外扩 `extend` 像素范围内的沙鳗概率.
    ///
    /// 负样本为背景和其它鱼类. 同时累积各类别像素数.
    pub fn sandeel_probs_object_patches<E: Echogram>(
        &self,
        echs: &[E],
        n_echs: usize,
        extend: usize,
    ) -> SegResult<ProbAccumulator> {
        let mut acc = ProbAccumulator::new();
        for (i, ech) in echs.iter().take(n_echs).enumerate() {
            debug!("{i} {}", ech.name());
            acc.merge(self.probs_of(ech, Mode::All, Some(extend))?);
        }
        log_summary(&acc);
        Ok(acc)
    }

    /// 分割并按 `ignore` 处理标签.
    fn segment_for_output<E>(
        &self,
        ech: &E,
        ignore: IgnoreMode,
    ) -> SegResult<(Array2<f32>, Array2<Label>)>
    where
        E: Echogram + ?Sized,
    {
        let (seg, mut labels) = self.segment_echogram(ech)?;
        if ignore == IgnoreMode::Region {
            let mask = extended_label_mask(
                ech.objects(),
                &self.config.fish_types,
                self.config.extend_size,
                labels.dim(),
            );
            apply_eval_mask(labels.view_mut(), mask.view())?;
        }
        Ok((seg, labels))
    }

    /// 对每幅回波图分割, 并将结果与元数据一起写入 `sink`. 返回写出的文件路径.
    ///
    /// `ignore_mode` 为 `"normal"` 或 `"region"`, 在处理任何回波图之前检查.
    pub fn write_predictions<E: Echogram>(
        &self,
        echs: &[E],
        sink: &NpzSink,
        ignore_mode: &str,
    ) -> SegResult<Vec<PathBuf>> {
        let ignore: IgnoreMode = ignore_mode.parse()?;
        let mut paths = Vec::with_capacity(echs.len());
        for (i, ech) in echs.iter().enumerate() {
            info!("{i} {}", ech.name());
            let (seg, labels) = self.segment_for_output(ech, ignore)?;
            let record = PredictionRecord::from_echogram(ech, seg, labels);
            paths.push(sink.save(&record)?);
        }
        Ok(paths)
    }

    /// 对每幅回波图分割, 将预测合成图与标签分别保存为
    /// `{dir}/{name}_pred.png` 与 `{dir}/{name}_labels.png`.
    pub fn visualize<E: Echogram>(
        &self,
        echs: &[E],
        dir: impl AsRef<Path>,
        ignore_mode: &str,
    ) -> SegResult<Vec<PathBuf>> {
        let ignore: IgnoreMode = ignore_mode.parse()?;
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        let mut paths = Vec::with_capacity(echs.len() * 2);
        for (i, ech) in echs.iter().enumerate() {
            info!("{i} {}", ech.name());
            let (seg, labels) = self.segment_for_output(ech, ignore)?;
            let pred_path = dir.join(format!("{}_pred.png", ech.name()));
            crate::vis::save_prediction(seg.view(), self.config.pred_contrast, &pred_path)?;
            let label_path = dir.join(format!("{}_labels.png", ech.name()));
            crate::vis::save_labels(labels.view(), &label_path)?;
            paths.push(pred_path);
            paths.push(label_path);
        }
        Ok(paths)
    }
}

#[cfg(feature = "rayon")]
impl<P: Predictor + Sync> SandeelSegmenter<P> {
    /// 并行版本的 [`SandeelSegmenter::sandeel_probs`].
    ///
    /// 每个工作线程各自累积, 最后按回波图顺序合并, 因此结果与串行版本一致.
    pub fn par_sandeel_probs<E: Echogram + Sync>(
        &self,
        echs: &[E],
        n_echs: usize,
        mode: &str,
    ) -> SegResult<ProbAccumulator> {
        let mode: Mode = mode.parse()?;
        let n = n_echs.min(echs.len());
        let acc = echs[..n]
            .par_iter()
            .map(|ech| self.probs_of(ech, mode, None))
            .try_reduce(ProbAccumulator::new, merged)?;
        log_summary(&acc);
        Ok(acc)
    }

    /// 并行版本的 [`SandeelSegmenter::sandeel_probs_object_patches`].
    pub fn par_sandeel_probs_object_patches<E: Echogram + Sync>(
        &self,
        echs: &[E],
        n_echs: usize,
        extend: usize,
    ) -> SegResult<ProbAccumulator> {
        let n = n_echs.min(echs.len());
        let acc = echs[..n]
            .par_iter()
            .map(|ech| self.probs_of(ech, Mode::All, Some(extend)))
            .try_reduce(ProbAccumulator::new, merged)?;
        log_summary(&acc);
        Ok(acc)
    }
}

#[cfg(feature = "rayon")]
#[inline]
fn merged(mut a: ProbAccumulator, b: ProbAccumulator) -> SegResult<ProbAccumulator> {
    a.merge(b);
    Ok(a)
}

fn log_summary(acc: &ProbAccumulator) {
    let [bg, sandeel, other] = acc.pixel_counts();
    info!(
        "{} positives, {} negatives; pixels: background {bg}, sandeel {sandeel}, other {other}",
        acc.positives().len(),
        acc.negatives().len()
    );
}
