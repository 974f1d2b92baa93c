use serde::{Deserialize, Serialize};

use super::Fid;

/// 对象健康状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceHealth {
    #[default]
    Unknown,
    Online,
    Failed,
    Transient,
    Repair,
    Repaired,
    Rebalance,
    Offline,
}

impl std::fmt::Display for ServiceHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ServiceHealth::Unknown => "unknown",
            ServiceHealth::Online => "online",
            ServiceHealth::Failed => "failed",
            ServiceHealth::Transient => "transient",
            ServiceHealth::Repair => "repair",
            ServiceHealth::Repaired => "repaired",
            ServiceHealth::Rebalance => "rebalance",
            ServiceHealth::Offline => "offline",
        };
        write!(f, "{text}")
    }
}

/// 单个对象的HA状态更新
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaState {
    pub fid: Fid,
    pub status: ServiceHealth,
}

impl HaState {
    pub fn new(fid: Fid, status: ServiceHealth) -> Self {
        Self { fid, status }
    }
}

/// 广播投递后由后端返回的消息标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId {
    pub halink_ctx: u64,
    pub tag: u64,
}

/// 健康向量中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaNote {
    pub obj: Fid,
    pub state: ServiceHealth,
}

/// 后端请求健康向量状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaNvecGetEvent {
    /// 后端侧的请求句柄，回复时原样带回
    pub hax_msg: u64,
    pub nvec: Vec<HaNote>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_health_serde() {
        let state = HaState::new(Fid::new(0x72, 0x1), ServiceHealth::Failed);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["fid"], "0x72:0x1");
    }

    #[test]
    fn test_service_health_default_and_display() {
        assert_eq!(ServiceHealth::default(), ServiceHealth::Unknown);
        assert_eq!(ServiceHealth::Rebalance.to_string(), "rebalance");
    }
}
