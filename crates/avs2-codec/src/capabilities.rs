//! 编解码器能力标志.
//!
//! 对标 FFmpeg 的 `AV_CODEC_CAP_*`.

use bitflags::bitflags;

bitflags! {
    /// 编解码器能力
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CodecCapabilities: u32 {
        /// 存在输出延迟, 结束时需送入 flush 才能取出全部输出
        const DELAY = 1 << 0;
        /// 引擎可自行决定线程数
        const AUTO_THREADS = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_combine() {
        let caps = CodecCapabilities::DELAY | CodecCapabilities::AUTO_THREADS;
        assert!(caps.contains(CodecCapabilities::DELAY));
        assert!(!CodecCapabilities::default().contains(CodecCapabilities::DELAY));
    }
}
