use serde::{Deserialize, Serialize};

use super::Fid;
use crate::HaxResult;

/// 存储对象I/O队列故障报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StobIoqError {
    pub fid: Fid,
    pub conf_sdev: Fid,
    pub stob_id: Fid,
    pub fd: i64,
    pub opcode: i32,
    pub rc: i32,
    pub offset: u64,
    pub size: u64,
    pub bshift: u32,
}

impl StobIoqError {
    /// 发布到事件队列的JSON载荷
    pub fn to_payload(&self) -> HaxResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
