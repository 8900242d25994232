//! 时间戳类型, 用于表示媒体流中的时间点.
//!
//! 对标 FFmpeg 中基于 `time_base` 的时间戳系统.

use crate::rational::Rational;
use std::fmt;

/// 表示"未定义"的时间戳值
pub const NOPTS_VALUE: i64 = i64::MIN;

/// 时间戳
///
/// 实际时间 (秒) = pts * time_base.num / time_base.den.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    /// 时间戳值, `NOPTS_VALUE` 表示未定义
    pub pts: i64,
    /// 时间基
    pub time_base: Rational,
}

impl Timestamp {
    /// 创建新的时间戳
    pub const fn new(pts: i64, time_base: Rational) -> Self {
        Self { pts, time_base }
    }

    /// 创建未定义的时间戳
    pub const fn none() -> Self {
        Self {
            pts: NOPTS_VALUE,
            time_base: Rational::UNDEFINED,
        }
    }

    /// 判断时间戳是否有效 (非 NOPTS_VALUE)
    pub const fn is_valid(&self) -> bool {
        self.pts != NOPTS_VALUE && self.time_base.is_valid()
    }

    /// 转换为秒, 无效时返回 None
    pub fn to_seconds(&self) -> Option<f64> {
        if !self.is_valid() {
            return None;
        }
        Some(self.pts as f64 * self.time_base.to_f64())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_seconds() {
            Some(sec) => write!(f, "{sec:.6}s"),
            None => write!(f, "NOPTS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_to_seconds() {
        let ts = Timestamp::new(2_400_000, Rational::new(1, 1_200_000));
        assert_eq!(ts.to_seconds(), Some(2.0));
        assert_eq!(format!("{ts}"), "2.000000s");
    }

    #[test]
    fn test_timestamp_none() {
        let ts = Timestamp::none();
        assert!(!ts.is_valid());
        assert_eq!(format!("{ts}"), "NOPTS");
    }
}
