use ndarray::{Array1, Array2, Array3, ArrayView1, Axis};

use crate::consts::label::Label;
use crate::error::BoxedError;
use crate::Idx2d;

pub mod object;
pub mod raster;
pub mod time;

pub use object::{BoundingBox, ObjectRecord};

/// 数据源返回值.
pub type SourceResult<T> = Result<T, BoxedError>;

/// 回波图数据源.
///
/// 本 crate 不关心回波图如何加载、存储和索引, 只通过该 trait 读取数据.
/// 所有返回的二维数组都以 `(行, 列)` 组织, 且空间形状等于 [`Echogram::shape`].
pub trait Echogram {
    /// 回波图名称, 用于持久化时的文件名.
    fn name(&self) -> &str;

    /// 空间形状 (高, 宽).
    fn shape(&self) -> Idx2d;

    /// 按 `frequencies` 的顺序选择通道, 返回 `(H, W, C)` 栅格.
    ///
    /// 返回值可能含有非有限值, 由调用方处理.
    fn data(&self, frequencies: &[u32]) -> SourceResult<Array3<f32>>;

    /// 精化后的标签. 值域为 [`crate::consts::label`] 中的常量,
    /// 其中 `REFINE_IGNORE` 尚未转换为 `IGNORE`.
    fn refined_labels(&self) -> SourceResult<Array2<Label>>;

    /// 所有标注目标.
    fn objects(&self) -> &[ObjectRecord];

    /// 海底曲线, 长度等于栅格宽度. 第 `c` 个值为第 `c` 列海底所在的行.
    fn seabed(&self) -> SourceResult<Array1<usize>>;

    /// 深度坐标 (每行一个值).
    fn range_vector(&self) -> ArrayView1<'_, f64>;

    /// 时间坐标 (每列一个值).
    fn time_vector(&self) -> ArrayView1<'_, f64>;

    /// 升沉 (heave) 补偿量 (每列一个值).
    fn heave(&self) -> ArrayView1<'_, f64>;

    /// 换能器深度 (每列一个值).
    fn trdepth(&self) -> ArrayView1<'_, f64>;
}

/// 借用的回波图. 便于直接迭代 `&[E]`.
impl<E: Echogram + ?Sized> Echogram for &E {
    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline]
    fn shape(&self) -> Idx2d {
        (**self).shape()
    }

    #[inline]
    fn data(&self, frequencies: &[u32]) -> SourceResult<Array3<f32>> {
        (**self).data(frequencies)
    }

    #[inline]
    fn refined_labels(&self) -> SourceResult<Array2<Label>> {
        (**self).refined_labels()
    }

    #[inline]
    fn objects(&self) -> &[ObjectRecord] {
        (**self).objects()
    }

    #[inline]
    fn seabed(&self) -> SourceResult<Array1<usize>> {
        (**self).seabed()
    }

    #[inline]
    fn range_vector(&self) -> ArrayView1<'_, f64> {
        (**self).range_vector()
    }

    #[inline]
    fn time_vector(&self) -> ArrayView1<'_, f64> {
        (**self).time_vector()
    }

    #[inline]
    fn heave(&self) -> ArrayView1<'_, f64> {
        (**self).heave()
    }

    #[inline]
    fn trdepth(&self) -> ArrayView1<'_, f64> {
        (**self).trdepth()
    }
}

/// 完全驻留内存的回波图.
///
/// 主要用于实验和测试. 元数据向量默认按行/列序号填充.
#[derive(Debug, Clone)]
pub struct InMemoryEchogram {
    name: String,
    frequencies: Vec<u32>,
    data: Array3<f32>,
    labels: Array2<Label>,
    objects: Vec<ObjectRecord>,
    seabed: Array1<usize>,
    range: Array1<f64>,
    time: Array1<f64>,
    heave: Array1<f64>,
    trdepth: Array1<f64>,
}

/// 在回波图频率列表中找不到所请求的频率.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("frequency {0} kHz not recorded")]
pub struct UnknownFrequency(pub u32);

impl InMemoryEchogram {
    /// 由 `(H, W, C)` 数据和对应标签创建回波图. `frequencies` 给出每个通道的频率.
    ///
    /// 海底默认位于栅格最底部以下 (即不屏蔽任何像素), 目标列表为空.
    ///
    /// # 注意
    ///
    /// `data` 与 `labels` 的空间形状必须一致, `frequencies` 长度必须等于通道数,
    /// 否则程序 panic.
    pub fn new(
        name: impl Into<String>,
        frequencies: Vec<u32>,
        data: Array3<f32>,
        labels: Array2<Label>,
    ) -> Self {
        let (h, w, c) = data.dim();
        assert_eq!((h, w), labels.dim(), "数据和标签形状不一致");
        assert_eq!(frequencies.len(), c, "频率个数与通道数不一致");
        Self {
            name: name.into(),
            frequencies,
            data,
            labels,
            objects: Vec::new(),
            seabed: Array1::from_elem(w, h),
            range: Array1::from_shape_fn(h, |i| i as f64),
            time: Array1::from_shape_fn(w, |i| i as f64),
            heave: Array1::zeros(w),
            trdepth: Array1::zeros(w),
        }
    }

    /// 设置标注目标.
    pub fn with_objects(mut self, objects: Vec<ObjectRecord>) -> Self {
        self.objects = objects;
        self
    }

    /// 设置海底曲线. 长度不做检查, 由下游掩膜操作报告.
    pub fn with_seabed(mut self, seabed: Array1<usize>) -> Self {
        self.seabed = seabed;
        self
    }

    /// 设置深度、时间、升沉与换能器深度向量.
    pub fn with_vectors(
        mut self,
        range: Array1<f64>,
        time: Array1<f64>,
        heave: Array1<f64>,
        trdepth: Array1<f64>,
    ) -> Self {
        self.range = range;
        self.time = time;
        self.heave = heave;
        self.trdepth = trdepth;
        self
    }
}

impl Echogram for InMemoryEchogram {
    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn shape(&self) -> Idx2d {
        self.labels.dim()
    }

    fn data(&self, frequencies: &[u32]) -> SourceResult<Array3<f32>> {
        let mut indices = Vec::with_capacity(frequencies.len());
        for f in frequencies {
            let i = self
                .frequencies
                .iter()
                .position(|g| g == f)
                .ok_or(UnknownFrequency(*f))?;
            indices.push(i);
        }
        Ok(self.data.select(Axis(2), &indices))
    }

    #[inline]
    fn refined_labels(&self) -> SourceResult<Array2<Label>> {
        Ok(self.labels.clone())
    }

    #[inline]
    fn objects(&self) -> &[ObjectRecord] {
        &self.objects
    }

    #[inline]
    fn seabed(&self) -> SourceResult<Array1<usize>> {
        Ok(self.seabed.clone())
    }

    #[inline]
    fn range_vector(&self) -> ArrayView1<'_, f64> {
        self.range.view()
    }

    #[inline]
    fn time_vector(&self) -> ArrayView1<'_, f64> {
        self.time.view()
    }

    #[inline]
    fn heave(&self) -> ArrayView1<'_, f64> {
        self.heave.view()
    }

    #[inline]
    fn trdepth(&self) -> ArrayView1<'_, f64> {
        self.trdepth.view()
    }
}
