//! 分块拼接消融实验: 用恒等预测器在合成回波图上验证不同分块参数下的精确重建,
//! 并统计耗时.

mod profile;
mod result;
mod runner;

use std::process::ExitCode;

fn main() -> ExitCode {
    simple_logger::init_with_level(log::Level::Info).expect("Logger initialization error");

    let result = match runner::run() {
        Ok(r) => r,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = result.analyze() {
        log::error!("{e}");
        return ExitCode::FAILURE;
    }
    if result.all_exact() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
