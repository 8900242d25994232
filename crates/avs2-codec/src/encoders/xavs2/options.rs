//! libxavs2 私有选项.
//!
//! 整数选项带取值范围, 通过名称设置时做范围检查.
//! 也可以从配置文件反序列化, 缺省字段取默认值.

use avs2_core::{Avs2Error, Avs2Result};
use serde::{Deserialize, Serialize};

/// 整数选项描述
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntOption {
    /// 选项名
    pub name: &'static str,
    /// 说明
    pub help: &'static str,
    /// 默认值
    pub default: i64,
    /// 最小值
    pub min: i64,
    /// 最大值
    pub max: i64,
}

/// 全部整数选项
pub const INT_OPTIONS: &[IntOption] = &[
    IntOption {
        name: "lcu_row_threads",
        help: "number of parallel threads for rows",
        default: 0,
        min: 0,
        max: i32::MAX as i64,
    },
    IntOption {
        name: "initial_qp",
        help: "Quantization initial parameter",
        default: 34,
        min: 1,
        max: 63,
    },
    IntOption {
        name: "qp",
        help: "Quantization parameter",
        default: 34,
        min: 1,
        max: 63,
    },
    IntOption {
        name: "max_qp",
        help: "max qp for rate control",
        default: 55,
        min: 0,
        max: 63,
    },
    IntOption {
        name: "min_qp",
        help: "min qp for rate control",
        default: 20,
        min: 0,
        max: 63,
    },
    IntOption {
        name: "speed_level",
        help: "Speed level, higher is better but slower",
        default: 0,
        min: 0,
        max: 9,
    },
    IntOption {
        name: "log_level",
        help: "log level: -1: none, 0: error, 1: warning, 2: info, 3: debug",
        default: 0,
        min: -1,
        max: 3,
    },
];

/// 引擎参数列表选项名
pub const PARAMS_OPTION: &str = "xavs2-params";

/// libxavs2 私有选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Xavs2Options {
    /// LCU 行级并行线程数
    pub lcu_row_threads: i32,
    /// 码率控制初始 QP
    pub initial_qp: i32,
    /// 固定 QP (不使用码率控制时)
    pub qp: i32,
    /// 码率控制最大 QP
    pub max_qp: i32,
    /// 码率控制最小 QP
    pub min_qp: i32,
    /// 速度档位 (映射到引擎的 Preset)
    pub speed_level: i32,
    /// 引擎日志级别
    pub log_level: i32,
    /// `key=value:key=value` 形式的引擎参数
    #[serde(rename = "xavs2-params", skip_serializing_if = "Option::is_none")]
    pub xavs2_params: Option<String>,
}

impl Default for Xavs2Options {
    fn default() -> Self {
        Self {
            lcu_row_threads: 0,
            initial_qp: 34,
            qp: 34,
            max_qp: 55,
            min_qp: 20,
            speed_level: 0,
            log_level: 0,
            xavs2_params: None,
        }
    }
}

impl Xavs2Options {
    /// 按名称设置选项
    pub fn set(&mut self, name: &str, value: &str) -> Avs2Result<()> {
        if name == PARAMS_OPTION {
            self.xavs2_params = Some(value.to_string());
            return Ok(());
        }

        let opt = find_int_option(name)?;
        let parsed: i64 = value.trim().parse().map_err(|_| {
            Avs2Error::InvalidArgument(format!("选项 {} 的值不是整数: {:?}", name, value))
        })?;
        check_range(opt, parsed)?;
        *self.int_field_mut(name)? = parsed as i32;
        Ok(())
    }

    /// 检查全部整数选项是否在取值范围内
    pub fn validate(&self) -> Avs2Result<()> {
        for opt in INT_OPTIONS {
            check_range(opt, i64::from(self.int_field(opt.name)?))?;
        }
        Ok(())
    }

    fn int_field(&self, name: &str) -> Avs2Result<i32> {
        Ok(match name {
            "lcu_row_threads" => self.lcu_row_threads,
            "initial_qp" => self.initial_qp,
            "qp" => self.qp,
            "max_qp" => self.max_qp,
            "min_qp" => self.min_qp,
            "speed_level" => self.speed_level,
            "log_level" => self.log_level,
            _ => return Err(unknown_option(name)),
        })
    }

    fn int_field_mut(&mut self, name: &str) -> Avs2Result<&mut i32> {
        Ok(match name {
            "lcu_row_threads" => &mut self.lcu_row_threads,
            "initial_qp" => &mut self.initial_qp,
            "qp" => &mut self.qp,
            "max_qp" => &mut self.max_qp,
            "min_qp" => &mut self.min_qp,
            "speed_level" => &mut self.speed_level,
            "log_level" => &mut self.log_level,
            _ => return Err(unknown_option(name)),
        })
    }
}

fn find_int_option(name: &str) -> Avs2Result<&'static IntOption> {
    INT_OPTIONS
        .iter()
        .find(|o| o.name == name)
        .ok_or_else(|| unknown_option(name))
}

fn check_range(opt: &IntOption, value: i64) -> Avs2Result<()> {
    if value < opt.min || value > opt.max {
        return Err(Avs2Error::InvalidArgument(format!(
            "选项 {} 的值 {} 超出范围 [{}, {}]",
            opt.name, value, opt.min, opt.max
        )));
    }
    Ok(())
}

fn unknown_option(name: &str) -> Avs2Error {
    Avs2Error::InvalidArgument(format!("libxavs2 没有选项 {}", name))
}
