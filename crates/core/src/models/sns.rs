use serde::{Deserialize, Serialize};

use super::Fid;

/// SNS操作类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnsOperation {
    Repair,
    Rebalance,
}

/// SNS控制动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnsAction {
    Start,
    Stop,
    Pause,
    Resume,
}

impl std::fmt::Display for SnsOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnsOperation::Repair => write!(f, "repair"),
            SnsOperation::Rebalance => write!(f, "rebalance"),
        }
    }
}

impl std::fmt::Display for SnsAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnsAction::Start => write!(f, "start"),
            SnsAction::Stop => write!(f, "stop"),
            SnsAction::Pause => write!(f, "pause"),
            SnsAction::Resume => write!(f, "resume"),
        }
    }
}

impl std::str::FromStr for SnsOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "repair" => Ok(SnsOperation::Repair),
            "rebalance" => Ok(SnsOperation::Rebalance),
            _ => Err(format!("Invalid SNS operation: {s}. Valid: repair, rebalance")),
        }
    }
}

impl std::str::FromStr for SnsAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start" => Ok(SnsAction::Start),
            "stop" => Ok(SnsAction::Stop),
            "pause" => Ok(SnsAction::Pause),
            "resume" => Ok(SnsAction::Resume),
            _ => Err(format!(
                "Invalid SNS action: {s}. Valid: start, stop, pause, resume"
            )),
        }
    }
}

/// SNS复制机状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SnsState {
    #[default]
    Idle,
    Started,
    Paused,
    Failed,
}

/// 单个服务的SNS修复/重平衡进度
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnsStatus {
    pub fid: Fid,
    pub state: SnsState,
    /// 已完成百分比
    pub progress: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operation_and_action() {
        assert_eq!("Repair".parse::<SnsOperation>().unwrap(), SnsOperation::Repair);
        assert_eq!("resume".parse::<SnsAction>().unwrap(), SnsAction::Resume);
        assert!("restart".parse::<SnsAction>().is_err());
        assert!("rebuild".parse::<SnsOperation>().is_err());
    }

    #[test]
    fn test_sns_status_serde() {
        let status = SnsStatus {
            fid: Fid::new(0x6f00000000000001, 0x3),
            state: SnsState::Paused,
            progress: 40,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["state"], "paused");
        assert_eq!(json["progress"], 40);
    }
}
