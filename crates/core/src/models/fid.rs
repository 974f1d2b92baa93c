use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{HaxError, HaxResult};

/// 存储资源标识符
///
/// 由容器号和键组成，文本形式为 `0x7200000000000001:0x9`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fid {
    pub container: u64,
    pub key: u64,
}

impl Fid {
    pub const fn new(container: u64, key: u64) -> Self {
        Self { container, key }
    }

    pub fn parse(text: &str) -> HaxResult<Self> {
        text.parse()
    }
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}:{:#x}", self.container, self.key)
    }
}

fn parse_part(part: &str, text: &str) -> HaxResult<u64> {
    let trimmed = part.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(digits, 16).map_err(|_| HaxError::InvalidFid(text.to_string()))
}

impl FromStr for Fid {
    type Err = HaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (container, key) = s
            .split_once(':')
            .ok_or_else(|| HaxError::InvalidFid(s.to_string()))?;
        Ok(Self {
            container: parse_part(container, s)?,
            key: parse_part(key, s)?,
        })
    }
}

impl Serialize for Fid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
