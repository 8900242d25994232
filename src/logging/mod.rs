//! 日志子系统.
//!
//! 库 crate 只通过 `log` 门面输出日志, 由使用方决定是否初始化.
//! 本模块提供一套开箱即用的实现: 彩色控制台输出 + 按天切分的文件输出,
//! 后台任务负责午夜切换文件、清理过期日志并压缩历史日志.
//!
//! ```rust,no_run
//! # async fn demo() -> anyhow::Result<()> {
//! let config = avs2::logging::LoggingConfig {
//!     directory: "logs".into(),
//!     ..Default::default()
//! };
//! avs2::logging::init(config)?;
//! # Ok(())
//! # }
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, FormatEvent, FormatFields, format::Writer},
    layer::{Layer, SubscriberExt},
    registry::LookupSpan,
    util::SubscriberInitExt,
};

mod task;

/// 日志配置
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 文件日志级别 (EnvFilter 语法)
    pub level: String,
    /// 控制台日志级别 (EnvFilter 语法)
    pub console_level: String,
    /// 日志目录
    pub directory: String,
    /// 日志文件名前缀, 文件名为 `<prefix>.<YYYY-MM-DD>.log`
    pub file_prefix: String,
    /// 保留天数, 更早的日志 (含压缩包) 会被删除
    pub retention_days: i64,
    /// 是否 gzip 压缩历史日志
    pub compress_history: bool,
    /// 清理间隔 (秒)
    pub cleanup_interval_seconds: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_level: "debug".to_string(),
            directory: "logs".to_string(),
            file_prefix: "avs2".to_string(),
            retention_days: 30,
            compress_history: true,
            cleanup_interval_seconds: 3600,
        }
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// 初始化全局日志
///
/// 需要在 tokio 运行时内调用 (后台维护任务通过 `tokio::spawn` 启动).
/// 同一进程只能初始化一次.
pub fn init(config: LoggingConfig) -> Result<()> {
    std::fs::create_dir_all(&config.directory)
        .with_context(|| format!("创建日志目录失败, path={}", config.directory))?;

    let rotate_requested = Arc::new(AtomicBool::new(false));
    let writer = DailyFileWriter::new(
        Path::new(&config.directory),
        &config.file_prefix,
        Arc::clone(&rotate_requested),
    )?;

    let (non_blocking, guard) = tracing_appender::non_blocking(writer);
    LOG_GUARD.set(guard).ok();

    let console_filter =
        EnvFilter::try_new(&config.console_level).context("控制台日志级别无效")?;
    let file_filter = EnvFilter::try_new(&config.level).context("文件日志级别无效")?;

    let console_layer = fmt::Layer::default()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .event_format(LineFormatter { ansi: true })
        .with_filter(console_filter);

    let file_layer = fmt::Layer::default()
        .with_writer(non_blocking)
        .with_ansi(false)
        .event_format(LineFormatter { ansi: false })
        .with_filter(file_filter);

    Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("全局日志已初始化")?;

    task::spawn_log_maintenance_task(config, rotate_requested);

    Ok(())
}

/// 写入当天日志文件, 收到切换请求后重新打开
struct DailyFileWriter {
    directory: PathBuf,
    prefix: String,
    rotate_requested: Arc<AtomicBool>,
    file: File,
}

impl DailyFileWriter {
    fn new(directory: &Path, prefix: &str, rotate_requested: Arc<AtomicBool>) -> Result<Self> {
        let path = log_file_path(directory, prefix, Local::now().date_naive());
        Ok(Self {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            rotate_requested,
            file: open_append(&path)?,
        })
    }

    fn reopen(&mut self) -> std::io::Result<()> {
        let path = log_file_path(&self.directory, &self.prefix, Local::now().date_naive());
        self.file = open_append(&path).map_err(std::io::Error::other)?;
        Ok(())
    }
}

impl Write for DailyFileWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if self.rotate_requested.swap(false, Ordering::AcqRel) {
            self.reopen()?;
        }
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

pub(crate) fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("打开日志文件失败, path={}", path.display()))
}

/// 指定日期的日志文件路径
pub(crate) fn log_file_path(directory: &Path, prefix: &str, date: NaiveDate) -> PathBuf {
    directory.join(format!("{}.{}.log", prefix, date.format("%Y-%m-%d")))
}

/// 单行日志格式: `[MM-DD HH:MM:SS.mmm] LEVEL target > message`
struct LineFormatter {
    ansi: bool,
}

impl<S, N> FormatEvent<S, N> for LineFormatter
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();
        write!(writer, "[{}] ", Local::now().format("%m-%d %H:%M:%S%.3f"))?;
        let level = meta.level().to_string();
        if self.ansi {
            write!(writer, "{}{:5}\x1b[0m ", level_color(meta.level()), level)?;
        } else {
            write!(writer, "{:5} ", level)?;
        }
        write!(writer, "{} > ", meta.target())?;
        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_color(level: &tracing::Level) -> &'static str {
    match *level {
        tracing::Level::ERROR => "\x1b[31m",
        tracing::Level::WARN => "\x1b[33m",
        tracing::Level::INFO => "\x1b[32m",
        _ => "\x1b[34m",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_path() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 6).unwrap();
        let path = log_file_path(Path::new("logs"), "avs2", date);
        assert_eq!(path, PathBuf::from("logs/avs2.2026-02-06.log"));
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let json = r#"{ "directory": "/var/log/avs2", "retention_days": 7 }"#;
        let config: LoggingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.directory, "/var/log/avs2");
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.level, "info");
        assert_eq!(config.file_prefix, "avs2");
        assert!(config.compress_history);
        assert_eq!(config.cleanup_interval_seconds, 3600);
    }

    #[test]
    fn test_writer_reopens_on_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let flag = Arc::new(AtomicBool::new(false));
        let mut writer = DailyFileWriter::new(dir.path(), "avs2", Arc::clone(&flag)).unwrap();
        writer.write_all(b"first\n").unwrap();

        flag.store(true, Ordering::Release);
        writer.write_all(b"second\n").unwrap();
        writer.flush().unwrap();
        assert!(!flag.load(Ordering::Acquire));

        let path = log_file_path(dir.path(), "avs2", Local::now().date_naive());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("second"));
    }
}
