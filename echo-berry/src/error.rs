//! 运行时错误.

use crate::Idx2d;

/// 外部协作者 (预测器, 回波图数据源) 的错误. 该 crate 不解释其内容, 原样向上传递.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// 分块推理、掩膜与统计过程中可能出现的错误.
///
/// 前置条件违例 (配置/形状不符) 与外部失败 (预测器, 文件系统) 分属不同变体,
/// 调用方可以据此区分. 输入中的非有限值不算错误, 会被静默置零.
#[derive(Debug, thiserror::Error)]
pub enum SegError {
    /// 分块边长为零, 或不大于两倍重叠宽度, 导致分块没有正面积的内部区域.
    #[error("invalid tile on axis {axis}: patch {patch} must be > 2 * overlap {overlap}")]
    InvalidTile {
        /// 0 为行方向, 1 为列方向.
        axis: usize,
        /// 分块边长.
        patch: usize,
        /// 重叠宽度.
        overlap: usize,
    },

    /// 海底曲线长度与栅格宽度不符.
    #[error("seabed curve has {seabed} columns but raster width is {width}")]
    SeabedLength {
        /// 海底曲线长度.
        seabed: usize,
        /// 栅格宽度.
        width: usize,
    },

    /// 未知的统计 / 忽略模式字符串.
    #[error("unknown mode `{0}`")]
    UnknownMode(String),

    /// 两个本应空间对齐的数组形状不一致.
    #[error("{what}: expected shape {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// 出错的数组.
        what: &'static str,
        /// 期望的 (高, 宽).
        expected: Idx2d,
        /// 实际的 (高, 宽).
        found: Idx2d,
    },

    /// 预测器返回块的空间形状与输入分块不符.
    #[error("predictor returned block {found:?} for patch {expected:?}")]
    PatchShape {
        /// 分块 (高, 宽).
        expected: Idx2d,
        /// 预测结果 (高, 宽).
        found: Idx2d,
    },

    /// 同一栅格内预测器输出通道数发生变化, 或与其声明的通道数不符.
    #[error("predictor output has {found} channels, expected {expected}")]
    ChannelCount {
        /// 已确定的通道数.
        expected: usize,
        /// 本次输出的通道数.
        found: usize,
    },

    /// 所请求的类别通道不存在.
    #[error("channel {channel} requested but prediction has {available}")]
    MissingChannel {
        /// 请求的通道.
        channel: usize,
        /// 实际通道数.
        available: usize,
    },

    /// 栅格高或宽为零.
    #[error("empty raster")]
    EmptyRaster,

    /// 预测器失败.
    #[error("predictor failed: {0}")]
    Predictor(#[source] BoxedError),

    /// 回波图数据源失败.
    #[error("echogram source failed: {0}")]
    Source(#[source] BoxedError),

    /// 底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 写 npz 文件错误.
    #[error(transparent)]
    Npz(#[from] ndarray_npy::WriteNpzError),

    /// 写图像错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// 分块推理 / 统计运行时结果.
pub type SegResult<T> = Result<T, SegError>;
