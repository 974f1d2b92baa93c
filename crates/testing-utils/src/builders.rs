//! Test data builders for command payloads
//!
//! Plain functions return payloads with sensible defaults; the
//! [`StobIoqErrorBuilder`] covers the one payload tests tweak field by field.

use hax_core::{
    EntrypointRequest, Fid, HaNote, HaNvecGetEvent, HaState, ProcessEventKind,
    ProcessStatusEvent, ProcessType, ServiceHealth, SnsState, SnsStatus, StobIoqError,
};
use uuid::Uuid;

pub fn entrypoint_request(process_fid: Fid) -> EntrypointRequest {
    EntrypointRequest {
        reply_context: 0x1000,
        req_id: Uuid::new_v4(),
        remote_rpc_endpoint: "192.168.10.21@tcp:12345:1:1".to_string(),
        process_fid,
        git_rev: "deadbeef".to_string(),
        pid: 4321,
        is_first_request: true,
    }
}

pub fn process_status_event(fid: Fid) -> ProcessStatusEvent {
    ProcessStatusEvent {
        fid,
        event: ProcessEventKind::Started,
        process_type: ProcessType::M0d,
        pid: 4321,
    }
}

pub fn ha_nvec_get_event(hax_msg: u64) -> HaNvecGetEvent {
    HaNvecGetEvent {
        hax_msg,
        nvec: vec![HaNote {
            obj: Fid::new(0x7200000000000001, 0x9),
            state: ServiceHealth::Online,
        }],
    }
}

pub fn ha_states(count: u64) -> Vec<HaState> {
    (0..count)
        .map(|key| HaState::new(Fid::new(0x7200000000000001, key), ServiceHealth::Online))
        .collect()
}

pub fn sns_status(fid: Fid, progress: u32) -> SnsStatus {
    SnsStatus {
        fid,
        state: if progress >= 100 {
            SnsState::Idle
        } else {
            SnsState::Started
        },
        progress,
    }
}

pub fn stob_ioq_error(fid: Fid) -> StobIoqError {
    StobIoqErrorBuilder::new(fid).build()
}

/// Builder for creating test StobIoqError payloads
pub struct StobIoqErrorBuilder {
    report: StobIoqError,
}

impl StobIoqErrorBuilder {
    pub fn new(fid: Fid) -> Self {
        Self {
            report: StobIoqError {
                fid,
                conf_sdev: Fid::new(0x6400000000000001, 0x4),
                stob_id: Fid::new(0x200000000000000, 0x10004),
                fd: 17,
                opcode: 2,
                rc: -5,
                offset: 4096,
                size: 8192,
                bshift: 12,
            },
        }
    }

    pub fn with_rc(mut self, rc: i32) -> Self {
        self.report.rc = rc;
        self
    }

    pub fn with_range(mut self, offset: u64, size: u64) -> Self {
        self.report.offset = offset;
        self.report.size = size;
        self
    }

    pub fn build(self) -> StobIoqError {
        self.report
    }
}
