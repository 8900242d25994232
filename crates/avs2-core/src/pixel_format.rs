//! 像素格式定义.
//!
//! 对标 FFmpeg 的 `AVPixelFormat`, 仅保留 AVS2 引擎支持的 4:2:0 平面格式.

use std::fmt;

/// 像素格式
///
/// 命名规则: 颜色空间 + 位深 + 排列方式 (P=Planar, LE=小端).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// 未指定
    None,
    /// YUV 4:2:0 平面格式, 8 位
    Yuv420p,
    /// YUV 4:2:0 平面格式, 10 位小端 (每分量 2 字节)
    Yuv420p10le,
}

impl PixelFormat {
    /// 单个 Y/U/V 分量的位深
    pub const fn bits_per_component(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Yuv420p => 8,
            Self::Yuv420p10le => 10,
        }
    }

    /// 单个分量占用的字节数
    pub const fn bytes_per_component(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Yuv420p => 1,
            Self::Yuv420p10le => 2,
        }
    }

    /// 根据输出位深选择像素格式
    ///
    /// 10 位输出对应 `Yuv420p10le`, 其余一律按 8 位处理.
    pub const fn from_bit_depth(bit_depth: u32) -> Self {
        if bit_depth == 10 {
            Self::Yuv420p10le
        } else {
            Self::Yuv420p
        }
    }

    /// 获取色度子采样 (log2 水平, log2 垂直)
    pub const fn chroma_subsampling(&self) -> (u32, u32) {
        match self {
            Self::Yuv420p | Self::Yuv420p10le => (1, 1),
            Self::None => (0, 0),
        }
    }

    /// 平面数量
    pub const fn plane_count(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Yuv420p | Self::Yuv420p10le => 3,
        }
    }

    /// 计算指定平面每行的字节数 (linesize / stride)
    ///
    /// # 返回
    /// - `Some(bytes)`: 该平面每行的字节数
    /// - `None`: 格式为 None 或平面索引超出范围
    pub fn plane_linesize(&self, plane: usize, width: u32) -> Option<usize> {
        if *self == Self::None || plane >= self.plane_count() as usize {
            return None;
        }
        let (sub_h, _) = self.chroma_subsampling();
        let w = if plane == 0 {
            width as usize
        } else {
            (width as usize) >> sub_h
        };
        Some(w * self.bytes_per_component())
    }

    /// 计算指定平面的行数
    pub fn plane_height(&self, plane: usize, height: u32) -> Option<usize> {
        if *self == Self::None || plane >= self.plane_count() as usize {
            return None;
        }
        let (_, sub_v) = self.chroma_subsampling();
        Some(if plane == 0 {
            height as usize
        } else {
            (height as usize) >> sub_v
        })
    }

    /// 计算整帧的字节数
    pub fn frame_size(&self, width: u32, height: u32) -> Option<usize> {
        if *self == Self::None {
            return None;
        }
        let mut total = 0usize;
        for plane in 0..self.plane_count() as usize {
            total += self.plane_linesize(plane, width)? * self.plane_height(plane, height)?;
        }
        Some(total)
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Yuv420p => "yuv420p",
            Self::Yuv420p10le => "yuv420p10le",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yuv420p_frame_size() {
        let pf = PixelFormat::Yuv420p;
        assert_eq!(pf.frame_size(1920, 1080), Some(1920 * 1080 * 3 / 2));
        assert_eq!(pf.plane_linesize(0, 1920), Some(1920));
        assert_eq!(pf.plane_linesize(1, 1920), Some(960));
        assert_eq!(pf.plane_height(2, 1080), Some(540));
    }

    #[test]
    fn test_yuv420p10le_frame_size() {
        let pf = PixelFormat::Yuv420p10le;
        // 10bit: 每分量 2 字节
        assert_eq!(pf.plane_linesize(0, 1920), Some(3840));
        assert_eq!(pf.plane_linesize(1, 1920), Some(1920));
        assert_eq!(pf.frame_size(1920, 1080), Some(1920 * 1080 * 3));
    }

    #[test]
    fn test_from_bit_depth() {
        assert_eq!(PixelFormat::from_bit_depth(10), PixelFormat::Yuv420p10le);
        assert_eq!(PixelFormat::from_bit_depth(8), PixelFormat::Yuv420p);
        assert_eq!(PixelFormat::from_bit_depth(12), PixelFormat::Yuv420p);
    }

    #[test]
    fn test_none_return_none() {
        assert_eq!(PixelFormat::None.frame_size(1920, 1080), None);
        assert_eq!(PixelFormat::None.plane_linesize(0, 1920), None);
        assert_eq!(PixelFormat::Yuv420p.plane_height(3, 1080), None);
    }
}
