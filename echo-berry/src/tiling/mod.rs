//! 分块推理与拼接.
//!
//! 大幅回波图无法整体送入预测器, 因此先在两端填充重叠宽度的零值,
//! 再按步长 `patch - 2 * overlap` 切成互相重叠的分块. 每个分块的预测结果去掉
//! 重叠边框后恰好覆盖原始栅格的一块互不相交的区域, 拼起来即得到完整预测.
//!
//! 流程为: [`TileScheduler`] -> [`extract_patch`] -> [`Predictor`] -> [`TileStitcher`].

use log::debug;
use ndarray::{Array3, ArrayView2, ArrayView3, Axis};

use crate::data::raster::{sanitize_non_finite, zero_pad};
use crate::error::{SegError, SegResult};

mod config;
mod extract;
mod predictor;
mod scheduler;
mod stitch;

pub use config::{AxisPair, TileConfig};
pub use extract::{extract_patch, Patch};
pub use predictor::{IdentityPredictor, Predictor};
pub use scheduler::TileScheduler;
pub use stitch::{crop_interior, TileStitcher};

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
        use crate::Idx2d;
    }
}

/// 按 `config` 分块预测 `(H, W, C_in)` 栅格 `data`, 返回 `(H, W, C_out)` 的完整预测.
///
/// `data` 中的非有限值在送入预测器前被视为 0 (`data` 本身不被修改).
/// 分块按行优先顺序依次送入 `predictor`. 预测器失败会原样向上传递
/// (`SegError::Predictor`), 不返回部分结果.
pub fn segment<P>(
    predictor: &P,
    data: ArrayView3<f32>,
    config: TileConfig,
) -> SegResult<Array3<f32>>
where
    P: Predictor + ?Sized,
{
    let (h, w, _) = data.dim();
    if h == 0 || w == 0 {
        return Err(SegError::EmptyRaster);
    }
    let scheduler = TileScheduler::new((h, w), config);
    let padded = padded_input(data, config);
    let mut stitcher = new_stitcher(predictor, (h, w), config);
    debug!(
        "segmenting {h}x{w} raster with {} patches of {:?}",
        scheduler.len(),
        config.patch()
    );

    for origin in scheduler.origins() {
        let patch = extract_patch(padded.view(), origin, config.patch());
        let out = predictor
            .predict(patch.data.view())
            .map_err(SegError::Predictor)?;
        stitcher.insert(origin, patch.pad, out.view())?;
    }
    Ok(stitcher.finish())
}

/// 同 [`segment`], 但输入为单通道栅格 `(H, W)`.
#[inline]
pub fn segment_single<P>(
    predictor: &P,
    data: ArrayView2<f32>,
    config: TileConfig,
) -> SegResult<Array3<f32>>
where
    P: Predictor + ?Sized,
{
    segment(predictor, data.insert_axis(Axis(2)), config)
}

/// 两端补零并将非有限值置零后的输入.
fn padded_input(data: ArrayView3<f32>, config: TileConfig) -> Array3<f32> {
    let mut padded = zero_pad(data, config.overlap());
    let bad = sanitize_non_finite(&mut padded);
    if bad > 0 {
        debug!("{bad} non-finite input values treated as 0");
    }
    padded
}

/// 预测器声明了通道数时立即分配输出.
fn new_stitcher<P: Predictor + ?Sized>(
    predictor: &P,
    shape: crate::Idx2d,
    config: TileConfig,
) -> TileStitcher {
    match predictor.out_channels() {
        Some(c) => TileStitcher::with_channels(shape, config, c),
        None => TileStitcher::new(shape, config),
    }
}

/// 借助 `rayon` 并行预测各分块. 结果与 [`segment`] 完全一致.
///
/// 第一个分块总是先单独运行, 以确定输出通道数 (若预测器没有声明);
/// 其余分块并行预测并裁剪, 最后依次写入互不相交的区域.
#[cfg(feature = "rayon")]
pub fn par_segment<P>(
    predictor: &P,
    data: ArrayView3<f32>,
    config: TileConfig,
) -> SegResult<Array3<f32>>
where
    P: Predictor + Sync + ?Sized,
{
    let (h, w, _) = data.dim();
    if h == 0 || w == 0 {
        return Err(SegError::EmptyRaster);
    }
    let scheduler = TileScheduler::new((h, w), config);
    let padded = padded_input(data, config);
    let mut stitcher = new_stitcher(predictor, (h, w), config);
    let origins: Vec<Idx2d> = scheduler.origins().collect();
    debug!(
        "segmenting {h}x{w} raster with {} patches of {:?} in parallel",
        origins.len(),
        config.patch()
    );

    let predict_one = |origin: Idx2d| -> SegResult<(Idx2d, Array3<f32>)> {
        let patch = extract_patch(padded.view(), origin, config.patch());
        let out = predictor
            .predict(patch.data.view())
            .map_err(SegError::Predictor)?;
        let interior = crop_interior(&config, patch.pad, out.view())?.to_owned();
        Ok((origin, interior))
    };

    let Some((probe, rest)) = origins.split_first() else {
        return Ok(stitcher.finish());
    };
    let (origin, interior) = predict_one(*probe)?;
    stitcher.write_interior(origin, interior.view())?;

    let results = rest
        .to_vec()
        .into_par_iter()
        .map(predict_one)
        .collect::<SegResult<Vec<_>>>()?;
    for (origin, interior) in results {
        stitcher.write_interior(origin, interior.view())?;
    }
    Ok(stitcher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxedError;
    use ndarray::{Array2, Array3};

    fn pattern(h: usize, w: usize, c: usize) -> Array3<f32> {
        Array3::from_shape_fn((h, w, c), |(i, j, k)| (i * w + j) as f32 + 0.25 * k as f32)
    }

    #[test]
    fn test_identity_reconstruction() {
        for (h, w) in [(40, 40), (41, 37), (7, 100), (1, 1), (64, 48)] {
            for (patch, overlap) in [(16, 4), (9, 4), (5, 0), (12, 3)] {
                let cfg = TileConfig::new(patch, overlap).unwrap();
                let data = pattern(h, w, 3);
                let out = segment(&IdentityPredictor, data.view(), cfg).unwrap();
                assert_eq!(out, data, "shape {h}x{w}, patch {patch}, overlap {overlap}");
            }
        }
    }

    #[test]
    fn test_rectangular_tiles() {
        let cfg = TileConfig::new((16, 10), (3, 1)).unwrap();
        let data = pattern(33, 29, 2);
        let out = segment(&IdentityPredictor, data.view(), cfg).unwrap();
        assert_eq!(out, data);
    }

    /// 输出通道数由预测器决定, 与输入无关.
    struct Expand;

    impl Predictor for Expand {
        fn predict(&self, patch: ArrayView3<f32>) -> Result<Array3<f32>, BoxedError> {
            let (h, w, _) = patch.dim();
            let sum = patch.sum_axis(Axis(2));
            Ok(Array3::from_shape_fn((h, w, 3), |(i, j, k)| {
                sum[(i, j)] * (k + 1) as f32
            }))
        }
    }

    #[test]
    fn test_output_channels_discovered() {
        let cfg = TileConfig::new(16, 4).unwrap();
        let data = pattern(30, 20, 1);
        let out = segment(&Expand, data.view(), cfg).unwrap();
        assert_eq!(out.dim(), (30, 20, 3));
        assert_eq!(out[(29, 19, 2)], data[(29, 19, 0)] * 3.0);
        assert_eq!(out[(10, 3, 1)], data[(10, 3, 0)] * 2.0);
    }

    #[test]
    fn test_single_channel_input() {
        let cfg = TileConfig::new(16, 4).unwrap();
        let data = Array2::from_shape_fn((21, 22), |(i, j)| (i * 22 + j) as f32);
        let out = segment_single(&IdentityPredictor, data.view(), cfg).unwrap();
        assert_eq!(out.dim(), (21, 22, 1));
        assert_eq!(out.index_axis(Axis(2), 0), data);
    }

    #[derive(Debug)]
    struct Broken;

    impl std::fmt::Display for Broken {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "broken model")
        }
    }

    impl std::error::Error for Broken {}

    struct Failing;

    impl Predictor for Failing {
        fn predict(&self, _: ArrayView3<f32>) -> Result<Array3<f32>, BoxedError> {
            Err(Box::new(Broken))
        }
    }

    #[test]
    fn test_predictor_failure_propagates() {
        let data = pattern(10, 10, 1);
        let err = segment(&Failing, data.view(), TileConfig::new(8, 2).unwrap()).unwrap_err();
        assert!(matches!(err, SegError::Predictor(_)));
        assert_eq!(err.to_string(), "predictor failed: broken model");
    }

    /// 遇到非有限值即失败的预测器.
    fn finite_only(patch: ArrayView3<f32>) -> Result<Array3<f32>, BoxedError> {
        if patch.iter().all(|v| v.is_finite()) {
            Ok(patch.to_owned())
        } else {
            Err("non-finite input".into())
        }
    }

    #[test]
    fn test_non_finite_input_zeroed() {
        let mut data = pattern(20, 30, 2);
        data[(0, 0, 0)] = f32::NAN;
        data[(19, 29, 1)] = f32::INFINITY;
        data[(7, 11, 0)] = f32::NEG_INFINITY;
        let cfg = TileConfig::new(12, 2).unwrap();

        let out = segment(&finite_only, data.view(), cfg).unwrap();
        assert_eq!(out[(0, 0, 0)], 0.0);
        assert_eq!(out[(19, 29, 1)], 0.0);
        assert_eq!(out[(7, 11, 0)], 0.0);
        assert_eq!(out[(7, 11, 1)], data[(7, 11, 1)]);
        // 输入本身不被修改.
        assert!(data[(0, 0, 0)].is_nan());

        #[cfg(feature = "rayon")]
        assert_eq!(par_segment(&finite_only, data.view(), cfg).unwrap(), out);
    }

    #[test]
    fn test_empty_raster() {
        let data = Array3::<f32>::zeros((0, 5, 1));
        assert!(matches!(
            segment(&IdentityPredictor, data.view(), TileConfig::default()),
            Err(SegError::EmptyRaster)
        ));
    }

    /// 声明了错误通道数的预测器.
    struct Liar;

    impl Predictor for Liar {
        fn predict(&self, patch: ArrayView3<f32>) -> Result<Array3<f32>, BoxedError> {
            Ok(patch.to_owned())
        }

        fn out_channels(&self) -> Option<usize> {
            Some(2)
        }
    }

    #[test]
    fn test_declared_channels_checked() {
        let data = pattern(10, 10, 1);
        assert!(matches!(
            segment(&Liar, data.view(), TileConfig::new(8, 2).unwrap()),
            Err(SegError::ChannelCount {
                expected: 2,
                found: 1
            })
        ));
    }

    #[cfg(feature = "rayon")]
    #[test]
    fn test_par_segment_matches_sequential() {
        for (h, w) in [(40, 40), (53, 17), (3, 3)] {
            let cfg = TileConfig::new(12, 2).unwrap();
            let data = pattern(h, w, 2);
            let a = segment(&Expand, data.view(), cfg).unwrap();
            let b = par_segment(&Expand, data.view(), cfg).unwrap();
            assert_eq!(a, b);
            let c = par_segment(&IdentityPredictor, data.view(), cfg).unwrap();
            assert_eq!(c, data);
        }
    }
}
