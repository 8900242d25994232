//! 键值字典.
//!
//! 对标 FFmpeg 的 `AVDictionary`, 用于承载 `key=value:key=value` 形式的
//! 引擎私有参数 (例如编码器的 `xavs2-params`).

use log::trace;

use crate::error::{Avs2Error, Avs2Result};

/// 有序键值字典
///
/// 保持插入顺序; 对已存在的键再次赋值时原位替换.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: Vec<(String, String)>,
}

impl Dictionary {
    /// 创建空字典
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析键值对字符串
    ///
    /// # 参数
    /// - `text`: 待解析字符串, 如 `"RdoqLevel=1:Preset=5"`
    /// - `key_val_sep`: 键与值之间允许的分隔字符集合
    /// - `pairs_sep`: 键值对之间允许的分隔字符集合
    ///
    /// 每个 token 支持 `\` 转义与 `'...'` 引用, 首尾空白会被去除.
    /// 缺少分隔符、键为空或值为空时返回 `InvalidArgument`.
    pub fn parse(text: &str, key_val_sep: &str, pairs_sep: &str) -> Avs2Result<Self> {
        let mut dict = Self::new();
        let mut rest = text;

        while !rest.is_empty() {
            let (key, after_key) = next_token(rest, key_val_sep);
            let mut value = None;
            let mut after = after_key;
            if let Some(c) = after_key.chars().next() {
                if key_val_sep.contains(c) {
                    let (v, after_value) = next_token(&after_key[c.len_utf8()..], pairs_sep);
                    value = Some(v);
                    after = after_value;
                }
            }

            match value {
                Some(v) if !key.is_empty() && !v.is_empty() => {
                    trace!("解析参数: {}={}", key, v);
                    dict.set(key, v);
                }
                _ => {
                    return Err(Avs2Error::InvalidArgument(format!(
                        "无法解析键值对, 位置: {:?}",
                        rest
                    )));
                }
            }

            // 跳过键值对分隔符
            rest = match after.chars().next() {
                Some(c) => &after[c.len_utf8()..],
                None => after,
            };
        }

        Ok(dict)
    }

    /// 设置键值, 已存在的键原位替换
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// 查询键对应的值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 按插入顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 读取一个 token, 遇到 `terms` 中的任一字符 (未转义、未引用) 时停止
///
/// 返回 (token, 剩余字符串), 剩余字符串以终止字符开头 (若有).
fn next_token<'a>(input: &'a str, terms: &str) -> (String, &'a str) {
    let trimmed = input.trim_start();
    let mut out = String::new();
    // 引用/转义得到的内容不参与尾部空白裁剪
    let mut protected_len = 0usize;
    let mut chars = trimmed.char_indices();
    let mut end = trimmed.len();

    while let Some((idx, c)) = chars.next() {
        if terms.contains(c) {
            end = idx;
            break;
        }
        match c {
            '\\' => {
                if let Some((_, escaped)) = chars.next() {
                    out.push(escaped);
                    protected_len = out.len();
                }
            }
            '\'' => {
                for (_, quoted) in chars.by_ref() {
                    if quoted == '\'' {
                        break;
                    }
                    out.push(quoted);
                }
                protected_len = out.len();
            }
            _ => out.push(c),
        }
    }

    let keep = out.trim_end().len().max(protected_len);
    out.truncate(keep);
    (out, &trimmed[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_pairs_in_order() {
        let dict = Dictionary::parse("RdoqLevel=1:Preset=5:TDFilter=0", "=", ":").unwrap();
        let pairs: Vec<_> = dict.iter().collect();
        assert_eq!(
            pairs,
            vec![("RdoqLevel", "1"), ("Preset", "5"), ("TDFilter", "0")]
        );
    }

    #[test]
    fn test_parse_empty_string() {
        let dict = Dictionary::parse("", "=", ":").unwrap();
        assert!(dict.is_empty());
    }

    #[test]
    fn test_parse_trailing_separator() {
        let dict = Dictionary::parse("a=1:", "=", ":").unwrap();
        assert_eq!(dict.len(), 1);
        assert_eq!(dict.get("a"), Some("1"));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let dict = Dictionary::parse("  a = 1 : b=2 ", "=", ":").unwrap();
        assert_eq!(dict.get("a"), Some("1"));
        assert_eq!(dict.get("b"), Some("2"));
    }

    #[test]
    fn test_parse_escape_and_quote() {
        let dict = Dictionary::parse(r"path='c:\dir':name=a\:b", "=", ":").unwrap();
        assert_eq!(dict.get("path"), Some(r"c:\dir"));
        assert_eq!(dict.get("name"), Some("a:b"));
    }

    #[test]
    fn test_parse_missing_separator_is_error() {
        let err = Dictionary::parse("a=1:b", "=", ":").unwrap_err();
        assert!(matches!(err, Avs2Error::InvalidArgument(_)));
    }

    #[test]
    fn test_parse_empty_value_is_error() {
        assert!(Dictionary::parse("a=", "=", ":").is_err());
        assert!(Dictionary::parse("=1", "=", ":").is_err());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut dict = Dictionary::parse("a=1:b=2:a=3", "=", ":").unwrap();
        assert_eq!(dict.len(), 2);
        assert_eq!(dict.iter().next(), Some(("a", "3")));
        dict.set("c", "4");
        assert_eq!(dict.get("c"), Some("4"));
    }
}
