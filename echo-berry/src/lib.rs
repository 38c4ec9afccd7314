#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 对声学回波图 (echogram) 进行分块推理与拼接, 并为沙鳗分割结果提供
//! 海底屏蔽、评估区域构建和概率统计等后处理.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 预测模型本身 (结构、权重、运行设备) 不属于本 crate, 只通过 [`tiling::Predictor`] 调用;
//! 2. 回波图如何加载与索引同样不属于本 crate, 只通过 [`data::Echogram`] 读取;
//! 3. 前置条件违例 (形状不符、分块参数非法、未知模式) 返回 [`error::SegError`],
//!   而不会 panic. 输入中的非有限值会被静默置零.
//!
//! # 开发计划
//!
//! ### 分块推理与拼接 ✅
//!
//! 两端零填充, 按步长 `patch - 2 * overlap` 切块, 预测后去掉重叠边框拼回原尺寸.
//! 输出通道数可由预测器预先声明, 也可由第一个分块决定.
//!
//! 实现位于 `echo-berry/src/tiling`.
//!
//! ### 分块并行预测 ✅
//!
//! 先单独运行一个探测分块以确定通道数, 其余分块并行预测后写回互不相交的区域.
//! 需要 `rayon` feature.
//!
//! ### 海底屏蔽 & 评估区域 ✅
//!
//! 实现位于 `echo-berry/src/post_proc`.
//!
//! ### 沙鳗概率统计 ✅
//!
//! 按标签将概率分为正/负样本, 支持 `all` 与 `fish` 两种负样本模式,
//! 以及按目标包围盒外扩区域的统计. 多线程时每个线程各自累积后合并.
//!
//! ### 预测记录持久化与可视化 ✅
//!
//! 每幅回波图写成一个 npz 文件; 预测与标签可保存为 PNG.
//!
//! 实现位于 `echo-berry/src/persist.rs` 与 `echo-berry/src/vis.rs`.
//!
//! ### 小功能 ✅
//!
//! 1. MATLAB 日期序号与 Windows NT 时间的转换. ✅
//! 2. 分块拼接消融实验与耗时统计 (`ablations/tiling`). ✅

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

pub mod consts;

/// 回波图数据源与栅格基础操作.
pub mod data;

pub mod error;

pub mod persist;
pub mod pipeline;
pub mod post_proc;
pub mod prelude;
pub mod tiling;
pub mod vis;

pub use data::{Echogram, InMemoryEchogram};
pub use error::{SegError, SegResult};
pub use pipeline::{PipelineConfig, SandeelSegmenter};
pub use tiling::{segment, Predictor, TileConfig};

#[cfg(feature = "rayon")]
pub use tiling::par_segment;
