//! 拼接实验运行统计.

use std::time::{Duration, Instant};

/// ablation/benchmark 计时器.
///
/// 该计时器支持 "中途中断" 与 "结束中断, 继续开始计时".
#[derive(Clone, Debug)]
struct AccTimer {
    consumed: Duration,
    since: Instant,
}

impl AccTimer {
    /// 初始化计时器. 初始化时会视为已经开始计时 (`self.start()`).
    #[inline]
    pub fn new() -> Self {
        Self {
            consumed: Duration::from_secs(0),
            since: Instant::now(),
        }
    }

    /// 开始计时.
    #[inline]
    pub fn start(&mut self) {
        self.since = Instant::now();
    }

    /// 结束计时, 并将这一区间的时间累加. 返回本轮计时时长.
    ///
    /// # 注意
    ///
    /// 上一次调用必须是 `self.start()`, 否则计算时间值无意义.
    #[inline]
    pub fn elapsed(&mut self) -> Duration {
        let d = self.since.elapsed();
        self.consumed += d;
        d
    }

    /// 获得总共累计下来的时间 (以微秒为单位).
    #[inline]
    pub fn get_total_us(&self) -> u64 {
        self.consumed.as_micros() as u64
    }
}

impl Default for AccTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// 一组分块参数下的运行统计.
#[derive(Clone, Debug)]
pub struct Profile {
    /// 处理过的回波图个数.
    rasters: u64,

    /// 送入预测器的分块总数.
    patches: u64,

    /// 拼接结果与输入不一致的回波图个数. 正确实现下应为 0.
    mismatched: u64,

    /// 分块预测与拼接花费的总时间.
    segment_time: AccTimer,

    /// 整个任务花费的总时间 (包括生成合成数据).
    real_time: AccTimer,

    /// 最耗时的一次拼接.
    most: Option<Duration>,
}

impl Profile {
    /// 初始化.
    #[inline]
    pub fn new() -> Self {
        Self {
            rasters: 0,
            patches: 0,
            mismatched: 0,
            segment_time: AccTimer::default(),
            real_time: AccTimer::default(),
            most: None,
        }
    }

    /// 开始一次拼接计时.
    #[inline]
    pub fn segment_start(&mut self) {
        self.segment_time.start();
    }

    /// 结束一次拼接计时, 并记录该回波图的分块数.
    #[inline]
    pub fn segment_elapsed(&mut self, patches: usize) {
        let d = self.segment_time.elapsed();
        self.most = Some(self.most.map_or(d, |m| m.max(d)));
        self.rasters += 1;
        self.patches += patches as u64;
    }

    /// 记录一次拼接错误.
    #[inline]
    pub fn count_mismatch(&mut self) {
        self.mismatched += 1;
    }

    /// 结束全部计时.
    #[inline]
    pub fn finish(mut self) -> Self {
        self.real_time.elapsed();
        self
    }

    /// 回波图个数.
    #[inline]
    pub fn get_rasters(&self) -> u64 {
        self.rasters
    }

    /// 分块总数.
    #[inline]
    pub fn get_patches(&self) -> u64 {
        self.patches
    }

    /// 拼接错误个数.
    #[inline]
    pub fn get_mismatched(&self) -> u64 {
        self.mismatched
    }

    /// 以微秒为单位获得拼接总时间.
    #[inline]
    pub fn get_segment_time_us(&self) -> u64 {
        self.segment_time.get_total_us()
    }

    /// 以微秒为单位获得任务总自然时间.
    #[inline]
    pub fn get_real_time_us(&self) -> u64 {
        self.real_time.get_total_us()
    }

    /// 以微秒为单位获得每幅回波图的平均拼接时间.
    #[inline]
    pub fn get_avg_segment_time_us(&self) -> Option<f64> {
        match self.rasters {
            0 => None,
            n => Some(self.get_segment_time_us() as f64 / n as f64),
        }
    }

    /// 以微秒为单位获得每个分块的平均时间.
    #[inline]
    pub fn get_avg_patch_time_us(&self) -> Option<f64> {
        match self.patches {
            0 => None,
            n => Some(self.get_segment_time_us() as f64 / n as f64),
        }
    }

    /// 最耗时的一次拼接. 没有任何任务时返回 `None`.
    #[inline]
    pub fn get_most_time_consuming(&self) -> Option<Duration> {
        self.most
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::new()
    }
}
