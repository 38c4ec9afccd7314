//! 程序运行函数.

use crate::profile::Profile;
use crate::result::AblationResult;
use echo_berry::error::SegResult;
use echo_berry::tiling::{par_segment, segment, IdentityPredictor, TileConfig, TileScheduler};
use log::{info, warn};
use ndarray::{Array3, ArrayView3};
use std::thread;

/// 合成回波图尺寸: 覆盖 "恰好整除", "多一行一列" 与 "小于分块" 等情况.
const SHAPES: [(usize, usize); 5] = [(256, 1024), (257, 513), (300, 2000), (64, 700), (17, 33)];

/// 合成回波图通道数, 与默认频率个数一致.
const CHANNELS: usize = 4;

/// 一组实验设置.
#[derive(Copy, Clone, Debug)]
struct Task {
    name: &'static str,
    patch: (usize, usize),
    overlap: (usize, usize),
    parallel: bool,
}

const TASKS: [Task; 6] = [
    Task {
        name: "256/20",
        patch: (256, 256),
        overlap: (20, 20),
        parallel: false,
    },
    Task {
        name: "256/20 (rayon)",
        patch: (256, 256),
        overlap: (20, 20),
        parallel: true,
    },
    Task {
        name: "128/8",
        patch: (128, 128),
        overlap: (8, 8),
        parallel: false,
    },
    Task {
        name: "64/0",
        patch: (64, 64),
        overlap: (0, 0),
        parallel: false,
    },
    Task {
        name: "96x160/6x12",
        patch: (96, 160),
        overlap: (6, 12),
        parallel: false,
    },
    Task {
        name: "96x160/6x12 (rayon)",
        patch: (96, 160),
        overlap: (6, 12),
        parallel: true,
    },
];

/// 获得可并行核心数.
fn cpus() -> usize {
    thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 按位置生成确定性的合成数据.
fn synthetic((h, w): (usize, usize)) -> Array3<f32> {
    Array3::from_shape_fn((h, w, CHANNELS), |(i, j, c)| (i * w + j) as f32 + 0.25 * c as f32)
}

fn stitch(task: &Task, config: TileConfig, data: ArrayView3<f32>) -> SegResult<Array3<f32>> {
    if task.parallel {
        par_segment(&IdentityPredictor, data, config)
    } else {
        segment(&IdentityPredictor, data, config)
    }
}

/// 对所有合成回波图运行一组实验.
fn run_task(task: Task) -> SegResult<Profile> {
    let config = TileConfig::new(task.patch, task.overlap)?;
    let mut profile = Profile::new();
    for shape in SHAPES {
        let data = synthetic(shape);
        let patches = TileScheduler::new(shape, config).len();

        profile.segment_start();
        let out = stitch(&task, config, data.view())?;
        profile.segment_elapsed(patches);

        if out != data {
            warn!("{}: reconstruction of {shape:?} differs from input", task.name);
            profile.count_mismatch();
        }
    }
    Ok(profile.finish())
}

/// 实际运行.
pub fn run() -> SegResult<AblationResult> {
    let n = cpus();
    info!("Running tiling ablations on {n} threads...");

    let mut results = Vec::with_capacity(TASKS.len());
    for batch in TASKS.chunks(n.max(1)) {
        let profiles = thread::scope(|s| {
            let handles: Vec<_> = batch
                .iter()
                .map(|&t| s.spawn(move || run_task(t)))
                .collect();
            handles
                .into_iter()
                .map(|th| th.join().expect("Thread joining error"))
                .collect::<Vec<_>>()
        });
        for (task, profile) in batch.iter().zip(profiles) {
            results.push((task.name.to_string(), profile?));
        }
    }
    Ok(AblationResult::from_iter(results))
}
