//! 输入格式标识符.
//!
//! 对标 FFmpeg 的输入格式名称.

use std::fmt;

/// 输入格式标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FormatId {
    /// AVS2 裸流 (Elementary Stream)
    Avs2Es,
}

impl FormatId {
    /// 所有格式
    pub const ALL: &'static [FormatId] = &[Self::Avs2Es];

    /// 获取格式名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Avs2Es => "avs2",
        }
    }

    /// 获取格式描述
    pub const fn long_name(&self) -> &'static str {
        match self {
            Self::Avs2Es => "raw AVS2/IEEE 1857.4",
        }
    }

    /// 获取格式常用的文件扩展名
    pub const fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Avs2Es => &["avs", "avs2"],
        }
    }

    /// 从文件扩展名猜测格式 (不区分大小写)
    pub fn from_extension(ext: &str) -> Option<FormatId> {
        let ext_lower = ext.to_lowercase();
        Self::ALL
            .iter()
            .find(|id| id.extensions().contains(&ext_lower.as_str()))
            .copied()
    }

    /// 从文件路径猜测格式
    pub fn from_filename(filename: &str) -> Option<FormatId> {
        let name = filename.rsplit(['/', '\\']).next()?;
        let (_, ext) = name.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
