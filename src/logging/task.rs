//! 日志维护任务: 午夜切换文件, 定期清理与压缩.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDate, TimeZone, Utc};
use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::{debug, error};

use super::{LoggingConfig, log_file_path, open_append};

/// 一次清理的结果
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CleanupReport {
    /// 删除的过期文件数
    pub removed: usize,
    /// 新压缩的历史文件数
    pub compressed: usize,
}

pub(super) fn spawn_log_maintenance_task(config: LoggingConfig, rotate_requested: Arc<AtomicBool>) {
    tokio::spawn(async move {
        let period = Duration::from_secs(config.cleanup_interval_seconds.max(1));
        let mut cleanup_interval = tokio::time::interval(period);
        run_cleanup(&config, "启动时");

        let mut next_rollover_at = next_rollover_instant(Local::now());
        loop {
            tokio::select! {
                _ = cleanup_interval.tick() => run_cleanup(&config, "定期"),
                _ = tokio::time::sleep_until(next_rollover_at) => {
                    match touch_today_log(&config) {
                        Ok(()) => rotate_requested.store(true, Ordering::Release),
                        Err(err) => error!("日志切换失败: {:#}", err),
                    }
                    run_cleanup(&config, "切换后");
                    next_rollover_at = next_rollover_instant(Local::now());
                }
            }
        }
    });
}

fn run_cleanup(config: &LoggingConfig, stage: &str) {
    match cleanup_logs(config, Local::now().date_naive()) {
        Ok(report) if report != CleanupReport::default() => {
            debug!(
                "{}清理日志: 删除 {} 个, 压缩 {} 个",
                stage, report.removed, report.compressed
            );
        }
        Ok(_) => {}
        Err(err) => error!("{}清理日志失败: {:#}", stage, err),
    }
}

/// 确保当天的日志文件存在
fn touch_today_log(config: &LoggingConfig) -> Result<()> {
    let directory = Path::new(&config.directory);
    fs::create_dir_all(directory)?;
    let path = log_file_path(directory, &config.file_prefix, Local::now().date_naive());
    open_append(&path)?;
    Ok(())
}

/// 删除早于保留期的日志, 压缩今天之前未压缩的日志
pub(crate) fn cleanup_logs(config: &LoggingConfig, today: NaiveDate) -> Result<CleanupReport> {
    let directory = Path::new(&config.directory);
    let mut report = CleanupReport::default();
    if !directory.exists() {
        return Ok(report);
    }

    let cutoff = today - ChronoDuration::days(config.retention_days);
    let entries = fs::read_dir(directory)
        .with_context(|| format!("读取日志目录失败, path={}", directory.display()))?;

    for entry in entries {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().to_string();
        let Some((date, compressed)) = parse_log_name(&file_name, &config.file_prefix) else {
            continue;
        };
        let path = entry.path();

        if date < cutoff {
            if fs::remove_file(&path).is_ok() {
                report.removed += 1;
            }
        } else if config.compress_history && !compressed && date < today {
            match compress_to_gz(&path) {
                Ok(true) => report.compressed += 1,
                Ok(false) => {}
                Err(err) => error!("压缩日志失败: {:#}", err),
            }
        }
    }

    Ok(report)
}

/// 压缩为 `<name>.gz` 并删除原文件, 目标已存在时跳过 (返回 false)
fn compress_to_gz(path: &Path) -> Result<bool> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    if gz_path.exists() {
        return Ok(false);
    }

    let mut input =
        File::open(path).with_context(|| format!("打开待压缩日志失败, path={}", path.display()))?;
    let output = File::create(&gz_path)
        .with_context(|| format!("创建压缩日志失败, path={}", gz_path.display()))?;
    let mut encoder = GzEncoder::new(output, Compression::default());
    io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;

    fs::remove_file(path)
        .with_context(|| format!("删除已压缩日志失败, path={}", path.display()))?;
    Ok(true)
}

/// 解析 `<prefix>.<YYYY-MM-DD>.log[.gz]`, 返回 (日期, 是否已压缩)
fn parse_log_name(file_name: &str, prefix: &str) -> Option<(NaiveDate, bool)> {
    let rest = file_name.strip_prefix(prefix)?.strip_prefix('.')?;
    let (date_part, compressed) = match rest.strip_suffix(".log.gz") {
        Some(date_part) => (date_part, true),
        None => (rest.strip_suffix(".log")?, false),
    };
    if date_part.len() != 10 {
        return None;
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    Some((date, compressed))
}

/// 下一个本地午夜对应的 tokio 时刻, 计算失败时 1 秒后重试
fn next_rollover_instant(now: DateTime<Local>) -> tokio::time::Instant {
    match time_until_midnight(now) {
        Ok(wait) => tokio::time::Instant::now() + wait,
        Err(err) => {
            error!("计算日志切换时间失败: {:#}", err);
            tokio::time::Instant::now() + Duration::from_secs(1)
        }
    }
}

fn time_until_midnight(now: DateTime<Local>) -> Result<Duration> {
    let next_midnight = (now.date_naive() + ChronoDuration::days(1))
        .and_hms_opt(0, 0, 0)
        .context("构造午夜时间失败")?;
    let next_local = Local
        .from_local_datetime(&next_midnight)
        .earliest()
        .context("转换本地时间失败")?;
    let target = SystemTime::from(next_local.with_timezone(&Utc));
    Ok(target
        .duration_since(SystemTime::now())
        .unwrap_or(Duration::ZERO))
}
