use crate::consts::{PATCH_OVERLAP, PATCH_SIZE};
use crate::error::{SegError, SegResult};
use crate::Idx2d;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// (行方向, 列方向) 上的一对非负整数. 可以从单个标量构造, 此时两个方向取相同的值.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AxisPair(pub usize, pub usize);

impl From<usize> for AxisPair {
    #[inline]
    fn from(v: usize) -> Self {
        Self(v, v)
    }
}

impl From<Idx2d> for AxisPair {
    #[inline]
    fn from((a, b): Idx2d) -> Self {
        Self(a, b)
    }
}

/// 分块参数: 分块大小与重叠宽度.
///
/// 该结构只能通过 [`TileConfig::new`] 构造, 因此总是满足
/// `patch > 2 * overlap` (两个方向分别成立), 即每个分块都有正面积的内部区域.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTileConfig"))]
pub struct TileConfig {
    patch: Idx2d,
    overlap: Idx2d,
}

impl TileConfig {
    /// 构建分块参数.
    ///
    /// # 返回值
    ///
    /// - 若某方向上 `patch <= 2 * overlap` (包括 `patch == 0`), 返回
    ///   `Err(SegError::InvalidTile)`, 其中 `axis` 指明出错方向;
    /// - 否则返回 `Ok(Self)`.
    pub fn new(patch: impl Into<AxisPair>, overlap: impl Into<AxisPair>) -> SegResult<Self> {
        let AxisPair(ph, pw) = patch.into();
        let AxisPair(oh, ow) = overlap.into();
        for (axis, patch, overlap) in [(0, ph, oh), (1, pw, ow)] {
            if patch <= overlap.saturating_mul(2) {
                return Err(SegError::InvalidTile {
                    axis,
                    patch,
                    overlap,
                });
            }
        }
        Ok(Self {
            patch: (ph, pw),
            overlap: (oh, ow),
        })
    }

    /// 分块大小 (高, 宽).
    #[inline]
    pub fn patch(&self) -> Idx2d {
        self.patch
    }

    /// 重叠宽度 (行, 列).
    #[inline]
    pub fn overlap(&self) -> Idx2d {
        self.overlap
    }

    /// 相邻分块原点的步长, 同时也是每个分块内部区域的边长.
    #[inline]
    pub fn stride(&self) -> Idx2d {
        (
            self.patch.0 - 2 * self.overlap.0,
            self.patch.1 - 2 * self.overlap.1,
        )
    }

    /// 将 `(h, w)` 的栅格两端各填充重叠宽度后的形状.
    #[inline]
    pub fn padded_shape(&self, (h, w): Idx2d) -> Idx2d {
        (h + 2 * self.overlap.0, w + 2 * self.overlap.1)
    }
}

/// 反序列化的中间形式. 经 [`TileConfig::new`] 校验后才成为 `TileConfig`.
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct RawTileConfig {
    patch: Idx2d,
    overlap: Idx2d,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTileConfig> for TileConfig {
    type Error = SegError;

    #[inline]
    fn try_from(raw: RawTileConfig) -> SegResult<Self> {
        Self::new(raw.patch, raw.overlap)
    }
}

/// 分块 256, 重叠 20.
impl Default for TileConfig {
    fn default() -> Self {
        Self {
            patch: (PATCH_SIZE, PATCH_SIZE),
            overlap: (PATCH_OVERLAP, PATCH_OVERLAP),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::TileConfig;
    use crate::error::SegError;

    #[test]
    fn test_scalar_and_pair() {
        let a = TileConfig::new(16, 4).unwrap();
        let b = TileConfig::new((16, 16), (4, 4)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.stride(), (8, 8));
        assert_eq!(a.padded_shape((40, 30)), (48, 38));

        let c = TileConfig::new((32, 16), (5, 0)).unwrap();
        assert_eq!(c.stride(), (22, 16));
    }

    #[test]
    fn test_invalid_tile() {
        assert!(matches!(
            TileConfig::new(8, 4),
            Err(SegError::InvalidTile {
                axis: 0,
                patch: 8,
                overlap: 4
            })
        ));
        assert!(matches!(
            TileConfig::new((9, 7), 4),
            Err(SegError::InvalidTile { axis: 1, .. })
        ));
        assert!(matches!(
            TileConfig::new(0, 0),
            Err(SegError::InvalidTile { .. })
        ));
        assert!(TileConfig::new(1, 0).is_ok());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let from_json = |text: &str| serde_json::from_str::<TileConfig>(text);

        let ok = from_json(r#"{"patch":[16,12],"overlap":[4,2]}"#).unwrap();
        assert_eq!(ok, TileConfig::new((16, 12), (4, 2)).unwrap());

        let text = serde_json::to_string(&TileConfig::default()).unwrap();
        assert_eq!(from_json(&text).unwrap(), TileConfig::default());

        let err = from_json(r#"{"patch":[8,8],"overlap":[4,4]}"#).unwrap_err();
        assert!(err.to_string().contains("invalid tile on axis 0"));
        assert!(from_json(r#"{"patch":[8,9],"overlap":[3,5]}"#).is_err());
    }

    #[test]
    fn test_default() {
        let d = TileConfig::default();
        assert_eq!(d, TileConfig::new(256, 20).unwrap());
        assert_eq!(d.stride(), (216, 216));
    }
}
