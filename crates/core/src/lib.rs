pub mod errors;
pub mod models;
pub mod traits;

pub use errors::*;
pub use models::{
    Command, EntrypointRequest, Fid, HaNote, HaNvecGetEvent, HaState, MessageId,
    ProcessEventKind, ProcessStatusEvent, ProcessType, ReplyReceiver, ReplySender,
    ServiceHealth, SnsAction, SnsOperation, SnsState, SnsStatus, StobIoqError,
};
pub use traits::{CoordinationClient, EventPublisher, RuntimeFacade, STOB_IOQ_TOPIC};
