//! 对外接口模块
//!
//! 包含 IPC 进程间通信接口。

pub mod ipc;

pub use ipc::{
    command_handler, IpcClient, IpcConfig, IpcMessage, IpcServer, IpcTransport, MessageHandler,
};
