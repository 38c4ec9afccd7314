//! 时间坐标转换.

/// MATLAB `datenum(1601, 1, 1, 0, 0, 0)`, 即 NT 时间零点对应的 MATLAB 日序数.
const ML_NT_OFFSET_DAYS: f64 = 584_755.0;

/// 一天包含的 100 纳秒间隔数.
const TICKS_PER_DAY: f64 = 864_000_000_000.0;

/// 将 MATLAB 日序数 (serial date number) 转换为 Windows NT 时间,
/// 即自 1601-01-01 起的 100 纳秒间隔数.
#[inline]
pub fn matlab_to_nt_time(matlab_serial: f64) -> f64 {
    (matlab_serial - ML_NT_OFFSET_DAYS) * TICKS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::matlab_to_nt_time;

    #[test]
    fn test_nt_epoch() {
        assert_eq!(matlab_to_nt_time(584_755.0), 0.0);
        assert_eq!(matlab_to_nt_time(584_756.0), 864_000_000_000.0);
        assert_eq!(matlab_to_nt_time(584_755.5), 432_000_000_000.0);
    }
}
