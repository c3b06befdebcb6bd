//! # 日志桥接
//!
//! 将 `log` 门面的记录转发到 `utils/output.rs` 的彩色输出。
//! 计算引擎只使用 `debug!`/`trace!`/`warn!` 宏，不直接打印。
//!
//! ## 级别选择
//! - 默认: warn
//! - `-v`: info，`-vv`: debug，`-vvv`: trace
//! - `--quiet`: 只保留 error
//! - 环境变量 `SAXSKIT_LOG`（error/warn/info/debug/trace）优先于命令行
//!
//! ## 依赖关系
//! - 被 `main.rs` 初始化
//! - 使用 `utils/output.rs`

use crate::utils::output;

use log::{Level, LevelFilter, Metadata, Record};
use std::str::FromStr;

/// 日志级别环境变量
pub const LOG_ENV: &str = "SAXSKIT_LOG";

static LOGGER: TerminalLogger = TerminalLogger;

struct TerminalLogger;

/// 由命令行参数推断日志级别
pub fn level_from_flags(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// 安装全局日志器；重复调用时保留第一次的设置
pub fn init(verbose: u8, quiet: bool) {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|s| LevelFilter::from_str(s.trim()).ok())
        .unwrap_or_else(|| level_from_flags(verbose, quiet));

    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

impl log::Log for TerminalLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = record.args().to_string();
        match record.level() {
            Level::Error => output::print_error(&msg),
            Level::Warn => output::print_warning(&msg),
            Level::Info => output::print_info(&msg),
            Level::Debug => output::print_debug(&msg),
            Level::Trace => output::print_debug(&format!("{}: {}", record.target(), msg)),
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_flags() {
        assert_eq!(level_from_flags(0, false), LevelFilter::Warn);
        assert_eq!(level_from_flags(1, false), LevelFilter::Info);
        assert_eq!(level_from_flags(2, false), LevelFilter::Debug);
        assert_eq!(level_from_flags(5, false), LevelFilter::Trace);
        assert_eq!(level_from_flags(3, true), LevelFilter::Error);
    }
}
