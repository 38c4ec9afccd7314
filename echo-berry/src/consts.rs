//! 通用常量.

/// 标签值及其谓词.
pub mod label {
    /// 标签元素类型. 取值范围见本模块其它常量.
    pub type Label = i8;

    /// 忽略像素, 不参与任何统计.
    pub const IGNORE: Label = -1;

    /// 背景.
    pub const BACKGROUND: Label = 0;

    /// 沙鳗 (目标类别).
    pub const SANDEEL: Label = 1;

    /// 其它鱼类.
    pub const OTHER: Label = 2;

    /// 精化后的标签中用来标记 "不确定" 的值. 进入统计之前会被改写为 [`IGNORE`].
    pub const REFINE_IGNORE: Label = -100;

    /// 像素是否是沙鳗?
    #[inline]
    pub const fn is_sandeel(p: Label) -> bool {
        matches!(p, SANDEEL)
    }

    /// 像素是否是其它鱼类?
    #[inline]
    pub const fn is_other(p: Label) -> bool {
        matches!(p, OTHER)
    }

    /// 像素是否是背景或其它鱼类?
    #[inline]
    pub const fn is_background_or_other(p: Label) -> bool {
        matches!(p, BACKGROUND | OTHER)
    }
}

/// 单通道灰度.
pub mod gray {
    /// 单通道黑色.
    pub const BLACK: u8 = 0b_0000_0000;

    /// 单通道暗灰色.
    pub const DARK_GRAY: u8 = 0b_0100_0000;

    /// 单通道灰色.
    pub const GRAY: u8 = 0b_1000_0000;

    /// 单通道亮灰色.
    pub const LIGHT_GRAY: u8 = 0b_1100_0000;

    /// 单通道白色.
    pub const WHITE: u8 = 0b_1111_1111;
}

/// 默认分块边长 (高, 宽相同).
pub const PATCH_SIZE: usize = 256;

/// 默认分块重叠宽度 (高, 宽相同).
pub const PATCH_OVERLAP: usize = 20;

/// 海底以下多少行开始屏蔽预测.
pub const SEABED_OFFSET: usize = 10;

/// 评估区域相对于目标包围盒的默认外扩像素数.
pub const EVAL_EXTEND_SIZE: usize = 20;

/// 默认使用的声学频率 (kHz), 同时决定输入通道顺序.
pub const FREQUENCIES: [u32; 4] = [18, 38, 120, 200];

/// 视为 "沙鳗相关" 的目标鱼种索引. 评估区域仅由这些目标生成.
pub const SANDEEL_FISH_TYPES: [i32; 2] = [1, 27];

/// 分割网络输出中沙鳗概率所在的通道.
pub const SANDEEL_CHANNEL: usize = 1;

/// 可视化时沙鳗概率的默认对比度增益.
pub const PRED_CONTRAST: f32 = 5.0;
