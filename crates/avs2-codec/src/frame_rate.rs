//! MPEG-1/2 帧率码表.
//!
//! AVS2 序列头沿用 MPEG-2 的 4 位 `frame_rate_code`, 编码器参数 `FrameRate`
//! 也以该码值配置.

use avs2_core::Rational;

/// 帧率码 1..=8 对应的帧率 (下标 0 保留)
pub const FRAME_RATE_TABLE: [Rational; 9] = [
    Rational::new(0, 0),
    Rational::new(24000, 1001),
    Rational::new(24, 1),
    Rational::new(25, 1),
    Rational::new(30000, 1001),
    Rational::new(30, 1),
    Rational::new(50, 1),
    Rational::new(60000, 1001),
    Rational::new(60, 1),
];

/// 帧率无效时使用的码值 (30000/1001)
pub const DEFAULT_FRAME_RATE_CODE: u8 = 4;

/// 查询帧率码对应的帧率
pub fn frame_rate_from_code(code: u8) -> Option<Rational> {
    match code {
        1..=8 => Some(FRAME_RATE_TABLE[code as usize]),
        _ => None,
    }
}

/// 查找与给定帧率最接近的帧率码
///
/// 精确相等的码值优先; 否则取差值最小者, 差值相同时取较小码值.
/// 帧率无效 (分母为 0 或非正) 时返回 [`DEFAULT_FRAME_RATE_CODE`].
pub fn find_best_frame_rate_code(frame_rate: Rational) -> u8 {
    if frame_rate.den == 0 || frame_rate.num == 0 || frame_rate.to_f64() <= 0.0 {
        return DEFAULT_FRAME_RATE_CODE;
    }

    let target = frame_rate.to_f64();
    let mut best = DEFAULT_FRAME_RATE_CODE;
    let mut best_dist = f64::INFINITY;

    for code in 1..=8u8 {
        let candidate = FRAME_RATE_TABLE[code as usize];
        if candidate.compare(frame_rate) == Some(std::cmp::Ordering::Equal) {
            return code;
        }
        let dist = (candidate.to_f64() - target).abs();
        if dist < best_dist {
            best_dist = dist;
            best = code;
        }
    }
    best
}
