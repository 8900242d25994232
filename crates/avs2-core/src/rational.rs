//! 有理数类型, 用于时间基 (time_base)、帧率等场景.
//!
//! 对标 FFmpeg 的 `AVRational`.

use std::cmp::Ordering;
use std::fmt;

/// 有理数, 由分子和分母组成
///
/// 广泛用于表示时间基 (time_base) 与帧率.
/// 例如: 时间基 1/1200000 是裸流解封装器的默认时钟, 帧率 30000/1001 表示 29.97fps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// 分子
    pub num: i32,
    /// 分母
    pub den: i32,
}

impl Rational {
    /// 创建新的有理数
    ///
    /// # 参数
    /// - `num`: 分子
    /// - `den`: 分母 (不应为 0)
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// 零值
    pub const ZERO: Self = Self { num: 0, den: 1 };

    /// 未定义 (分母为 0)
    pub const UNDEFINED: Self = Self { num: 0, den: 0 };

    /// 判断是否有效 (分母不为 0)
    pub const fn is_valid(&self) -> bool {
        self.den != 0
    }

    /// 转换为 f64 浮点数
    ///
    /// 如果分母为 0, 返回 `f64::NAN`.
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            return f64::NAN;
        }
        f64::from(self.num) / f64::from(self.den)
    }

    /// 用分子分母均不超过 `max` 的有理数逼近浮点数
    ///
    /// 对标 `av_d2q`, 使用连分数求最佳逼近.
    /// 解码器用它把引擎上报的 `frame_rate` (f64) 转为帧率, `max` 取 4096.
    ///
    /// - NaN 返回 [`Rational::UNDEFINED`]
    /// - 无穷大返回 `±1/0`
    pub fn from_f64(value: f64, max: i32) -> Self {
        if value.is_nan() {
            return Self::UNDEFINED;
        }
        if value.is_infinite() {
            return Self::new(if value < 0.0 { -1 } else { 1 }, 0);
        }

        let sign = if value < 0.0 { -1 } else { 1 };
        let max = i64::from(max.max(1));
        let mut x = value.abs();

        // 连分数渐近分数 h/k, 初值 h(-2)/k(-2)=0/1, h(-1)/k(-1)=1/0
        let (mut h0, mut k0) = (0i64, 1i64);
        let (mut h1, mut k1) = (1i64, 0i64);

        loop {
            let a = x.floor();
            if a > max as f64 {
                break;
            }
            let a = a as i64;
            let h2 = a * h1 + h0;
            let k2 = a * k1 + k0;
            if h2 > max || k2 > max {
                // 尝试半渐近分数 (semiconvergent)
                let t_h = if h1 > 0 { (max - h0) / h1 } else { i64::MAX };
                let t_k = if k1 > 0 { (max - k0) / k1 } else { i64::MAX };
                let t = t_h.min(t_k);
                if t > 0 && k1 > 0 {
                    let hs = t * h1 + h0;
                    let ks = t * k1 + k0;
                    let err_semi = (hs as f64 / ks as f64 - value.abs()).abs();
                    let err_conv = (h1 as f64 / k1 as f64 - value.abs()).abs();
                    if err_semi < err_conv {
                        h1 = hs;
                        k1 = ks;
                    }
                }
                break;
            }
            h0 = h1;
            k0 = k1;
            h1 = h2;
            k1 = k2;

            let frac = x - a as f64;
            if frac < 1e-12 {
                break;
            }
            x = 1.0 / frac;
        }

        if k1 == 0 {
            // 整数部分已超出范围
            return Self::new(sign * max as i32, 1);
        }
        Self::new(sign * h1 as i32, k1 as i32)
    }

    /// 对有理数进行约分
    pub fn reduce(self) -> Self {
        if self.den == 0 {
            return self;
        }
        let g = gcd(self.num.unsigned_abs(), self.den.unsigned_abs());
        if g == 0 {
            return self;
        }
        let g = g as i32;
        // 保证分母为正
        let sign = if self.den < 0 { -1 } else { 1 };
        Self {
            num: sign * self.num / g,
            den: sign * self.den / g,
        }
    }

    /// 求倒数
    pub const fn invert(self) -> Self {
        Self {
            num: self.den,
            den: self.num,
        }
    }

    /// 比较两个有理数的大小
    ///
    /// 任一分母为 0 时返回 `None`.
    pub fn compare(self, other: Self) -> Option<Ordering> {
        if self.den == 0 || other.den == 0 {
            return None;
        }
        let lhs = i64::from(self.num) * i64::from(other.den);
        let rhs = i64::from(other.num) * i64::from(self.den);
        let ord = lhs.cmp(&rhs);
        // 分母异号时比较方向相反
        if (self.den < 0) != (other.den < 0) {
            Some(ord.reverse())
        } else {
            Some(ord)
        }
    }
}

impl std::ops::Mul for Rational {
    type Output = Self;

    /// 两个有理数相乘
    fn mul(self, other: Self) -> Self {
        Self {
            num: self.num * other.num,
            den: self.den * other.den,
        }
        .reduce()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self { num, den }
    }
}

impl From<i32> for Rational {
    fn from(num: i32) -> Self {
        Self { num, den: 1 }
    }
}

/// 求最大公约数 (欧几里得算法)
fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}
