//! 预测结果的持久化存储.
//!
//! 每幅回波图写成一个 npz 文件, 便于直接用 NumPy 读取.

use std::env;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use ndarray_npy::NpzWriter;

use crate::consts::label::Label;
use crate::data::Echogram;
use crate::error::SegResult;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 单幅回波图的预测记录.
///
/// npz 文件中依次包含 `seg`, `labels`, `range`, `time`, `heave`, `trdepth` 六个数组.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PredictionRecord {
    /// 回波图名称.
    pub name: String,
    /// 沙鳗概率 `(H, W)`.
    pub seg: Array2<f32>,
    /// 标签 `(H, W)`.
    pub labels: Array2<Label>,
    /// 深度坐标.
    pub range: Array1<f64>,
    /// 时间坐标.
    pub time: Array1<f64>,
    /// 升沉.
    pub heave: Array1<f64>,
    /// 换能器深度.
    pub trdepth: Array1<f64>,
}

impl PredictionRecord {
    /// 由预测结果和回波图元数据组装记录. 元数据按原样拷贝.
    pub fn from_echogram<E: Echogram + ?Sized>(
        ech: &E,
        seg: Array2<f32>,
        labels: Array2<Label>,
    ) -> Self {
        Self {
            name: ech.name().to_string(),
            seg,
            labels,
            range: ech.range_vector().to_owned(),
            time: ech.time_vector().to_owned(),
            heave: ech.heave().to_owned(),
            trdepth: ech.trdepth().to_owned(),
        }
    }

    /// 以 npz 格式写入 `w`.
    pub fn write_npz<W: Write + Seek>(&self, w: W) -> SegResult<()> {
        let mut npz = NpzWriter::new(w);
        npz.add_array("seg", &self.seg)?;
        npz.add_array("labels", &self.labels)?;
        npz.add_array("range", &self.range)?;
        npz.add_array("time", &self.time)?;
        npz.add_array("heave", &self.heave)?;
        npz.add_array("trdepth", &self.trdepth)?;
        npz.finish()?;
        Ok(())
    }
}

/// 预测记录的存储位置: 目录 + 文件名前缀.
///
/// 记录 `name` 被保存为 `{dir}/{prefix}{name}.npz`.
#[derive(Clone, Debug)]
pub struct NpzSink {
    dir: PathBuf,
    prefix: String,
}

impl NpzSink {
    /// 直接初始化. 目录不存在时会在第一次保存时创建.
    pub fn new(dir: impl AsRef<Path>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_owned(),
            prefix: prefix.into(),
        }
    }

    /// 获取存储目录.
    ///
    /// 1. 若环境变量 `$ECHO_PRED_DIR` 非空, 则使用其值;
    /// 2. 否则使用 `$HOME/dataset/predictions`. 无法确定用户主目录时返回 `None`.
    pub fn from_env_or_home(prefix: impl Into<String>) -> Option<Self> {
        let dir = match env::var("ECHO_PRED_DIR") {
            Ok(d) if !d.is_empty() => PathBuf::from(d),
            _ => {
                let mut d = dirs::home_dir()?;
                d.extend(["dataset", "predictions"]);
                d
            }
        };
        Some(Self::new(dir, prefix))
    }

    /// 存储目录.
    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 名为 `name` 的记录的完整路径.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{name}.npz", self.prefix))
    }

    /// 保存记录, 返回文件路径.
    pub fn save(&self, record: &PredictionRecord) -> SegResult<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&record.name);
        record.write_npz(File::create(&path)?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::{NpzSink, PredictionRecord};
    use crate::data::InMemoryEchogram;
    use ndarray::{Array2, Array3, Ix1, Ix2, OwnedRepr};
    use ndarray_npy::NpzReader;
    use std::fs::File;

    #[test]
    fn test_path_for() {
        let s = NpzSink::new("/tmp/preds", "work.nc");
        assert_eq!(
            s.path_for("2018_A"),
            std::path::PathBuf::from("/tmp/preds/work.nc2018_A.npz")
        );
    }

    #[test]
    fn test_dir_from_env_or_home() {
        // 只有该测试读写 `$ECHO_PRED_DIR`.
        let custom = std::env::temp_dir().join("echo-berry-env-preds");
        std::env::set_var("ECHO_PRED_DIR", &custom);
        let s = NpzSink::from_env_or_home("p_").unwrap();
        assert_eq!(s.dir(), custom.as_path());
        assert_eq!(s.path_for("a"), custom.join("p_a.npz"));

        // 空值视为未设置.
        std::env::set_var("ECHO_PRED_DIR", "");
        let s = NpzSink::from_env_or_home("p_");
        match dirs::home_dir() {
            Some(home) => assert_eq!(
                s.unwrap().dir(),
                home.join("dataset").join("predictions").as_path()
            ),
            None => assert!(s.is_none()),
        }
        std::env::remove_var("ECHO_PRED_DIR");
    }

    #[test]
    fn test_save_and_read_back() {
        let data = Array3::<f32>::zeros((3, 4, 1));
        let labels = Array2::from_shape_fn((3, 4), |(h, w)| ((h + w) % 3) as i8 - 1);
        let ech = InMemoryEchogram::new("rec", vec![200], data, labels.clone());
        let seg = Array2::from_shape_fn((3, 4), |(h, w)| (h * 4 + w) as f32 / 12.0);
        let rec = PredictionRecord::from_echogram(&ech, seg.clone(), labels.clone());

        let dir = std::env::temp_dir().join(format!("echo-berry-persist-{}", std::process::id()));
        let sink = NpzSink::new(&dir, "");
        let path = sink.save(&rec).unwrap();
        assert!(path.ends_with("rec.npz"));

        let mut r = NpzReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(r.len(), 6);
        let seg_back = r.by_index::<OwnedRepr<f32>, Ix2>(0).unwrap();
        assert_eq!(seg_back, seg);
        let labels_back = r.by_index::<OwnedRepr<i8>, Ix2>(1).unwrap();
        assert_eq!(labels_back, labels);
        let range_back = r.by_index::<OwnedRepr<f64>, Ix1>(2).unwrap();
        assert_eq!(range_back.to_vec(), vec![0.0, 1.0, 2.0]);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
