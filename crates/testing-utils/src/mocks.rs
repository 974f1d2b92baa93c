//! Recording mocks for the collaborator traits
//!
//! Every mock is cheap to clone and shares its state, so a test can keep a
//! handle while the dispatcher owns another one.

use std::sync::{Arc, Mutex};

use hax_core::{
    CoordinationClient, EntrypointRequest, EventPublisher, Fid, HaNvecGetEvent, HaState,
    HaxError, HaxResult, MessageId, ProcessStatusEvent, RuntimeFacade, SnsStatus,
};
use uuid::Uuid;

/// A call observed by [`MockRuntime`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    ReplyToEntrypoint(Uuid),
    ReplyToNvecGet(u64),
    BroadcastHaStates(Vec<HaState>),
    GetRepairStatus(Fid),
    GetRebalanceStatus(Fid),
    StartRepair(Fid),
    StopRepair(Fid),
    PauseRepair(Fid),
    ResumeRepair(Fid),
    StartRebalance(Fid),
    StopRebalance(Fid),
    PauseRebalance(Fid),
    ResumeRebalance(Fid),
}

#[derive(Debug, Default)]
struct RuntimeState {
    calls: Vec<RuntimeCall>,
    call_threads: Vec<String>,
    adopt_count: usize,
    release_count: usize,
    fail_adopt: bool,
    fail_next: u32,
    panic_next: u32,
    broadcast_ids: Vec<MessageId>,
    status: Vec<SnsStatus>,
}

/// Mock implementation of RuntimeFacade for testing
#[derive(Debug, Clone, Default)]
pub struct MockRuntime {
    state: Arc<Mutex<RuntimeState>>,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` backend calls (adoption excluded)
    pub fn fail_next(&self, count: u32) {
        self.state.lock().unwrap().fail_next = count;
    }

    /// Panic on the next `count` backend calls
    pub fn panic_next(&self, count: u32) {
        self.state.lock().unwrap().panic_next = count;
    }

    pub fn fail_adopt(&self) {
        self.state.lock().unwrap().fail_adopt = true;
    }

    pub fn set_broadcast_ids(&self, ids: Vec<MessageId>) {
        self.state.lock().unwrap().broadcast_ids = ids;
    }

    pub fn set_status(&self, status: Vec<SnsStatus>) {
        self.state.lock().unwrap().status = status;
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Distinct names of the threads that made backend calls
    pub fn call_threads(&self) -> Vec<String> {
        self.state.lock().unwrap().call_threads.clone()
    }

    pub fn adopt_count(&self) -> usize {
        self.state.lock().unwrap().adopt_count
    }

    pub fn release_count(&self) -> usize {
        self.state.lock().unwrap().release_count
    }

    fn record(&self, call: RuntimeCall) -> HaxResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.clone());

        let thread_name = std::thread::current()
            .name()
            .unwrap_or("unnamed")
            .to_string();
        if !state.call_threads.contains(&thread_name) {
            state.call_threads.push(thread_name);
        }

        if state.panic_next > 0 {
            state.panic_next -= 1;
            drop(state);
            panic!("mock runtime panic on {call:?}");
        }

        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(HaxError::runtime(format!("mock failure on {call:?}")));
        }

        Ok(())
    }
}

impl RuntimeFacade for MockRuntime {
    fn adopt_thread(&self) -> HaxResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_adopt {
            return Err(HaxError::runtime("mock adopt failure"));
        }
        state.adopt_count += 1;
        Ok(())
    }

    fn release_thread(&self) -> HaxResult<()> {
        self.state.lock().unwrap().release_count += 1;
        Ok(())
    }

    fn reply_to_entrypoint(&self, request: &EntrypointRequest) -> HaxResult<()> {
        self.record(RuntimeCall::ReplyToEntrypoint(request.req_id))
    }

    fn reply_to_nvec_get(&self, event: &HaNvecGetEvent) -> HaxResult<()> {
        self.record(RuntimeCall::ReplyToNvecGet(event.hax_msg))
    }

    fn broadcast_ha_states(&self, states: &[HaState]) -> HaxResult<Vec<MessageId>> {
        self.record(RuntimeCall::BroadcastHaStates(states.to_vec()))?;
        Ok(self.state.lock().unwrap().broadcast_ids.clone())
    }

    fn get_repair_status(&self, fid: &Fid) -> HaxResult<Vec<SnsStatus>> {
        self.record(RuntimeCall::GetRepairStatus(*fid))?;
        Ok(self.state.lock().unwrap().status.clone())
    }

    fn get_rebalance_status(&self, fid: &Fid) -> HaxResult<Vec<SnsStatus>> {
        self.record(RuntimeCall::GetRebalanceStatus(*fid))?;
        Ok(self.state.lock().unwrap().status.clone())
    }

    fn start_repair(&self, fid: &Fid) -> HaxResult<()> {
        self.record(RuntimeCall::StartRepair(*fid))
    }

    fn stop_repair(&self, fid: &Fid) -> HaxResult<()> {
        self.record(RuntimeCall::StopRepair(*fid))
    }

    fn pause_repair(&self, fid: &Fid) -> HaxResult<()> {
        self.record(RuntimeCall::PauseRepair(*fid))
    }

    fn resume_repair(&self, fid: &Fid) -> HaxResult<()> {
        self.record(RuntimeCall::ResumeRepair(*fid))
    }

    fn start_rebalance(&self, fid: &Fid) -> HaxResult<()> {
        self.record(RuntimeCall::StartRebalance(*fid))
    }

    fn stop_rebalance(&self, fid: &Fid) -> HaxResult<()> {
        self.record(RuntimeCall::StopRebalance(*fid))
    }

    fn pause_rebalance(&self, fid: &Fid) -> HaxResult<()> {
        self.record(RuntimeCall::PauseRebalance(*fid))
    }

    fn resume_rebalance(&self, fid: &Fid) -> HaxResult<()> {
        self.record(RuntimeCall::ResumeRebalance(*fid))
    }
}

#[derive(Debug, Default)]
struct CoordinationState {
    attempts: usize,
    updates: Vec<ProcessStatusEvent>,
    fail_next: u32,
}

/// Mock implementation of CoordinationClient for testing
#[derive(Debug, Clone, Default)]
pub struct MockCoordinationClient {
    state: Arc<Mutex<CoordinationState>>,
}

impl MockCoordinationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: u32) {
        self.state.lock().unwrap().fail_next = count;
    }

    /// Number of calls, failed ones included
    pub fn attempts(&self) -> usize {
        self.state.lock().unwrap().attempts
    }

    /// Successfully stored events
    pub fn updates(&self) -> Vec<ProcessStatusEvent> {
        self.state.lock().unwrap().updates.clone()
    }
}

impl CoordinationClient for MockCoordinationClient {
    fn update_process_status(&self, event: &ProcessStatusEvent) -> HaxResult<()> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;

        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(HaxError::coordination("mock consul unavailable"));
        }

        state.updates.push(event.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct PublisherState {
    published: Vec<(String, Vec<u8>)>,
    fail_next: u32,
}

/// Mock implementation of EventPublisher for testing
#[derive(Debug, Clone, Default)]
pub struct MockEventPublisher {
    state: Arc<Mutex<PublisherState>>,
}

impl MockEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, count: u32) {
        self.state.lock().unwrap().fail_next = count;
    }

    /// Published `(topic, payload)` pairs in order
    pub fn published(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().unwrap().published.clone()
    }
}

impl EventPublisher for MockEventPublisher {
    fn publish(&self, topic: &str, payload: &[u8]) -> HaxResult<String> {
        let mut state = self.state.lock().unwrap();

        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(HaxError::publish("mock stream unavailable"));
        }

        state.published.push((topic.to_string(), payload.to_vec()));
        Ok(format!("{}-0", state.published.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runtime_failure_injection() {
        let runtime = MockRuntime::new();
        runtime.fail_next(1);
        let fid = Fid::new(1, 1);

        assert!(runtime.stop_rebalance(&fid).is_err());
        assert!(runtime.stop_rebalance(&fid).is_ok());
        assert_eq!(runtime.calls().len(), 2);
    }

    #[test]
    fn test_mock_publisher_offsets() {
        let publisher = MockEventPublisher::new();
        assert_eq!(publisher.publish("stob-ioq", b"{}").unwrap(), "1-0");
        assert_eq!(publisher.publish("stob-ioq", b"{}").unwrap(), "2-0");
    }
}
