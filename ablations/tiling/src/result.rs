//! 实验结果.

use crate::profile::Profile;
use std::io::{self, Write};

const SEP: &str = "--------------------------------------------------------";

/// 将 `profile` 的结果写进 `w` 中.
fn describe_into<W: Write>(name: &str, p: &Profile, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    #[inline]
    fn f64_to_display(f: Option<f64>) -> String {
        match f {
            Some(f) => format!("{f:.3}"),
            None => "/".to_string(),
        }
    }

    writeln!(w, "Profile `{name}`:")?;
    writeln!(w, "{S4}Echograms: {}", p.get_rasters())?;
    writeln!(w, "{S4}Patches: {}", p.get_patches())?;
    writeln!(w, "{S4}Mismatched reconstructions: {}", p.get_mismatched())?;
    writeln!(w, "{S4}Segmentation total time: {} us", p.get_segment_time_us())?;
    writeln!(
        w,
        "{S4}Average time: {} us per echogram, {} us per patch",
        f64_to_display(p.get_avg_segment_time_us()),
        f64_to_display(p.get_avg_patch_time_us())
    )?;
    writeln!(w, "{S4}Total machine time: {} us", p.get_real_time_us())?;
    let t = p.get_most_time_consuming().map(|d| d.as_micros().to_string());
    write!(
        w,
        "{S4}Most time-consuming echogram costs {} us",
        t.as_deref().unwrap_or("/")
    )?;
    Ok(())
}

/// 拼接实验最终结果.
pub struct AblationResult {
    data: Vec<(String, Profile)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (String, Profile)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 是否所有配置都精确重建了输入.
    pub fn all_exact(&self) -> bool {
        self.data.iter().all(|(_, p)| p.get_mismatched() == 0)
    }

    /// 分析运行结果.
    pub fn analyze(&self) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{SEP}")?;
        for (key, profile) in self.data.iter() {
            describe_into(key, profile, &mut out)?;
            writeln!(out)?;
            writeln!(out, "{SEP}")?;
        }
        Ok(())
    }
}
