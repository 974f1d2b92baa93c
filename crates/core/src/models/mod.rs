//! # 数据模型
//!
//! 定义HA命令分发的核心数据结构。
//!
//! ## 概述
//!
//! 生产者（HTTP接入层、事件监听器等）构造 [`Command`] 并放入命令队列，
//! 唯一的分发线程取出命令后调用后端运行时、协调存储或事件队列。
//! 除回复通道外，所有载荷都实现了序列化和反序列化，便于日志、
//! 接入层解析和事件发布。
//!
//! ## 核心模型
//!
//! ### Fid - 资源标识
//! 由容器号和键组成，文本形式 `0x<container>:0x<key>`，JSON中按字符串存储。
//!
//! ### Command - 分发命令
//! 封闭的命令集合。需要同步结果的命令携带 `oneshot` 回复通道，
//! 构造函数同时返回接收端：
//!
//! ```rust
//! use hax_core::models::{Command, Fid, SnsOperation};
//!
//! let fid = Fid::new(0x6f00000000000001, 0x1);
//! let (command, reply) = Command::sns_status(SnsOperation::Repair, fid);
//! assert_eq!(command.kind(), "sns_repair_status");
//! drop(reply);
//! ```
//!
//! ### StobIoqError - 存储I/O队列故障
//! 以JSON形式发布到 `stob-ioq` 主题。

pub mod command;
pub mod fid;
pub mod ha;
pub mod process;
pub mod sns;
pub mod stob;

pub use command::*;
pub use fid::*;
pub use ha::*;
pub use process::*;
pub use sns::*;
pub use stob::*;
