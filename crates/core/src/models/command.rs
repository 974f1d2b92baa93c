use serde::Deserialize;
use tokio::sync::oneshot;

use super::{
    EntrypointRequest, Fid, HaNvecGetEvent, HaState, MessageId, ProcessStatusEvent, SnsAction,
    SnsOperation, SnsStatus, StobIoqError,
};
use crate::errors::{HaxError, HaxResult};

/// 单次回复通道的发送端，由处理该命令的handler写入至多一次
pub type ReplySender<T> = oneshot::Sender<T>;

/// 单次回复通道的接收端，由命令的生产者持有
pub type ReplyReceiver<T> = oneshot::Receiver<T>;

/// 分发线程处理的命令
///
/// 每个变体对应一种发往后端运行时、协调存储或事件队列的工作。
/// 带有 `reply_to` 的变体在处理完成后同步写回结果；若接收端已被丢弃，
/// 写回视为空操作。
#[derive(Debug)]
pub enum Command {
    EntrypointRequest(EntrypointRequest),
    ProcessEvent(ProcessStatusEvent),
    HaNvecGetEvent(HaNvecGetEvent),
    BroadcastHaStates {
        states: Vec<HaState>,
        reply_to: Option<ReplySender<Vec<MessageId>>>,
    },
    StobIoqError(StobIoqError),
    SnsRepairStatus {
        fid: Fid,
        reply_to: ReplySender<Vec<SnsStatus>>,
    },
    SnsRebalanceStatus {
        fid: Fid,
        reply_to: ReplySender<Vec<SnsStatus>>,
    },
    SnsRepairStart(Fid),
    SnsRepairStop(Fid),
    SnsRepairPause(Fid),
    SnsRepairResume(Fid),
    SnsRebalanceStart(Fid),
    SnsRebalanceStop(Fid),
    SnsRebalancePause(Fid),
    SnsRebalanceResume(Fid),
    /// 接入层收到的、本版本无法识别的命令类型，见 [`Command::from_tagged`]
    Unsupported { kind: String },
}

impl Command {
    /// 不需要回复的HA状态广播
    pub fn broadcast_ha_states(states: Vec<HaState>) -> Self {
        Command::BroadcastHaStates {
            states,
            reply_to: None,
        }
    }

    /// 需要回复消息标识的HA状态广播
    pub fn broadcast_ha_states_with_reply(
        states: Vec<HaState>,
    ) -> (Self, ReplyReceiver<Vec<MessageId>>) {
        let (tx, rx) = oneshot::channel();
        (
            Command::BroadcastHaStates {
                states,
                reply_to: Some(tx),
            },
            rx,
        )
    }

    /// SNS状态查询
    pub fn sns_status(operation: SnsOperation, fid: Fid) -> (Self, ReplyReceiver<Vec<SnsStatus>>) {
        let (reply_to, rx) = oneshot::channel();
        let command = match operation {
            SnsOperation::Repair => Command::SnsRepairStatus { fid, reply_to },
            SnsOperation::Rebalance => Command::SnsRebalanceStatus { fid, reply_to },
        };
        (command, rx)
    }

    /// SNS控制命令
    pub fn sns_control(operation: SnsOperation, action: SnsAction, fid: Fid) -> Self {
        match (operation, action) {
            (SnsOperation::Repair, SnsAction::Start) => Command::SnsRepairStart(fid),
            (SnsOperation::Repair, SnsAction::Stop) => Command::SnsRepairStop(fid),
            (SnsOperation::Repair, SnsAction::Pause) => Command::SnsRepairPause(fid),
            (SnsOperation::Repair, SnsAction::Resume) => Command::SnsRepairResume(fid),
            (SnsOperation::Rebalance, SnsAction::Start) => Command::SnsRebalanceStart(fid),
            (SnsOperation::Rebalance, SnsAction::Stop) => Command::SnsRebalanceStop(fid),
            (SnsOperation::Rebalance, SnsAction::Pause) => Command::SnsRebalancePause(fid),
            (SnsOperation::Rebalance, SnsAction::Resume) => Command::SnsRebalanceResume(fid),
        }
    }

    /// 命令类型名，用于日志和指标标签
    pub fn kind(&self) -> &str {
        match self {
            Command::EntrypointRequest(_) => "entrypoint_request",
            Command::ProcessEvent(_) => "process_event",
            Command::HaNvecGetEvent(_) => "ha_nvec_get",
            Command::BroadcastHaStates { .. } => "broadcast_ha_states",
            Command::StobIoqError(_) => "stob_ioq_error",
            Command::SnsRepairStatus { .. } => "sns_repair_status",
            Command::SnsRebalanceStatus { .. } => "sns_rebalance_status",
            Command::SnsRepairStart(_) => "sns_repair_start",
            Command::SnsRepairStop(_) => "sns_repair_stop",
            Command::SnsRepairPause(_) => "sns_repair_pause",
            Command::SnsRepairResume(_) => "sns_repair_resume",
            Command::SnsRebalanceStart(_) => "sns_rebalance_start",
            Command::SnsRebalanceStop(_) => "sns_rebalance_stop",
            Command::SnsRebalancePause(_) => "sns_rebalance_pause",
            Command::SnsRebalanceResume(_) => "sns_rebalance_resume",
            Command::Unsupported { kind } => kind.as_str(),
        }
    }

    /// 按类型名和JSON载荷构造无需回复的命令
    ///
    /// 本版本不认识的类型名得到 [`Command::Unsupported`]，由分发线程记录后跳过。
    /// 状态查询需要回复通道，不能从这里构造。
    pub fn from_tagged(kind: &str, payload: serde_json::Value) -> HaxResult<Self> {
        let command = match kind {
            "entrypoint_request" => Command::EntrypointRequest(serde_json::from_value(payload)?),
            "process_event" => Command::ProcessEvent(serde_json::from_value(payload)?),
            "ha_nvec_get" => Command::HaNvecGetEvent(serde_json::from_value(payload)?),
            "broadcast_ha_states" => Command::broadcast_ha_states(serde_json::from_value(payload)?),
            "stob_ioq_error" => Command::StobIoqError(serde_json::from_value(payload)?),
            "sns_repair_status" | "sns_rebalance_status" => {
                return Err(HaxError::InvalidCommand(format!(
                    "{kind} 需要回复通道，请使用状态查询接口"
                )));
            }
            _ => match parse_sns_control(kind) {
                Some((operation, action)) => {
                    let target: FidPayload = serde_json::from_value(payload)?;
                    Command::sns_control(operation, action, target.fid)
                }
                None => Command::Unsupported {
                    kind: kind.to_string(),
                },
            },
        };
        Ok(command)
    }
}

#[derive(Deserialize)]
struct FidPayload {
    fid: Fid,
}

/// `sns_<operation>_<action>`
fn parse_sns_control(kind: &str) -> Option<(SnsOperation, SnsAction)> {
    let (operation, action) = kind.strip_prefix("sns_")?.split_once('_')?;
    Some((operation.parse().ok()?, action.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ServiceHealth;

    #[test]
    fn test_from_tagged_builds_sns_controls() {
        let fid = Fid::new(0x6f00000000000001, 0x1);
        let payload = serde_json::json!({ "fid": fid.to_string() });

        let command = Command::from_tagged("sns_rebalance_pause", payload.clone()).unwrap();
        assert!(matches!(command, Command::SnsRebalancePause(got) if got == fid));

        let command = Command::from_tagged("sns_repair_start", payload).unwrap();
        assert!(matches!(command, Command::SnsRepairStart(got) if got == fid));
    }

    #[test]
    fn test_from_tagged_unknown_kind_is_unsupported() {
        let command = Command::from_tagged("drive_reset", serde_json::json!({})).unwrap();
        assert!(matches!(&command, Command::Unsupported { kind } if kind == "drive_reset"));

        // 前缀相同但动作未知
        let command = Command::from_tagged("sns_repair_abort", serde_json::json!({})).unwrap();
        assert_eq!(command.kind(), "sns_repair_abort");
    }

    #[test]
    fn test_from_tagged_rejects_status_and_bad_payload() {
        let err = Command::from_tagged("sns_repair_status", serde_json::json!({})).unwrap_err();
        assert!(matches!(err, HaxError::InvalidCommand(_)));

        let err = Command::from_tagged("sns_repair_stop", serde_json::json!({ "fid": 7 })).unwrap_err();
        assert!(matches!(err, HaxError::Serialization(_)));

        let command = Command::from_tagged("broadcast_ha_states", serde_json::json!([])).unwrap();
        assert!(matches!(command, Command::BroadcastHaStates { reply_to: None, .. }));
    }

    #[test]
    fn test_kind_labels() {
        let fid = Fid::new(1, 2);
        assert_eq!(Command::SnsRepairPause(fid).kind(), "sns_repair_pause");
        assert_eq!(
            Command::broadcast_ha_states(vec![]).kind(),
            "broadcast_ha_states"
        );
        let unknown = Command::Unsupported {
            kind: "drive_reset".to_string(),
        };
        assert_eq!(unknown.kind(), "drive_reset");
    }

    #[test]
    fn test_status_query_reply_channel() {
        let fid = Fid::new(0x6f00000000000001, 0x1);
        let (command, mut rx) = Command::sns_status(SnsOperation::Rebalance, fid);

        match command {
            Command::SnsRebalanceStatus { fid: got, reply_to } => {
                assert_eq!(got, fid);
                reply_to.send(vec![]).unwrap();
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert_eq!(rx.try_recv().unwrap(), vec![]);
    }

    #[test]
    fn test_broadcast_with_reply() {
        let states = vec![HaState::new(Fid::new(0x72, 0x1), ServiceHealth::Online)];
        let (command, _rx) = Command::broadcast_ha_states_with_reply(states.clone());
        match command {
            Command::BroadcastHaStates { states: got, reply_to } => {
                assert_eq!(got, states);
                assert!(reply_to.is_some());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
