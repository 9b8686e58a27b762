//! # Chips Modules - 薯片模块运行时
//!
//! 薯片生态的模块生命周期运行时：把一组独立开发的模块组合进一个
//! 长驻宿主进程，而无需手写启动脚本。提供以下核心功能：
//!
//! - **依赖解析**: 注册时声明的类型化依赖被解析为依赖图，
//!   带循环检测（构造图与初始化图各一次）
//! - **实例注入**: 每个模块种类一个实例，按需惰性构建，
//!   工厂通过解析上下文拉取依赖
//! - **生命周期编排**: 初始化/启动/停止的级联驱动，
//!   按模块隔离失败
//! - **命令协议**: `模块.端点=值` / `模块.端点(参数,...)` 的文本
//!   命令解析与执行
//! - **IPC 传输**: 长度前缀帧的进程间命令链路
//!
//! ## 快速开始
//!
//! ```rust
//! use std::any::Any;
//! use std::sync::Arc;
//! use chips_modules::{Module, ModuleRegistration, ModuleRegistry};
//!
//! struct Greeter;
//!
//! impl Module for Greeter {
//!     fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
//!         self
//!     }
//! }
//!
//! fn main() -> chips_modules::Result<()> {
//!     let registry = ModuleRegistry::new();
//!     registry.register(ModuleRegistration::new("greeter", |_ctx| {
//!         Ok(Arc::new(Greeter))
//!     }))?;
//!     registry.start()?;
//!
//!     assert!(registry.is_started("greeter"));
//!     registry.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## 模块结构
//!
//! - `module` - 模块契约、描述符、实例提供者、依赖图与注册表
//! - `command` - 命令解析与执行
//! - `api` - IPC 进程间通信接口
//! - `core` - 宿主配置
//! - `utils` - 错误类型和日志系统

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod api;
pub mod command;
pub mod core;
pub mod module;
pub mod utils;

// 重导出常用类型，方便使用
pub use module::{
    CommandProcessor, DependencyDirection, DependencySpec, Initializable, InstanceProvider,
    LifecycleSubscriber, Module, ModuleCapabilities, ModuleFactory, ModuleRegistration,
    ModuleRegistry, ModuleSnapshot, ModuleStatus, ResolveContext, Runnable, SpecifierKind,
};

pub use command::{
    convert_argument, parse_command, CommandEngine, CommandKind, EndpointTable, ModuleCommand,
};

pub use api::ipc::{command_handler, IpcClient, IpcConfig, IpcMessage, IpcServer, IpcTransport};

pub use crate::core::config::HostConfig;

pub use utils::{Logger, LoggerConfig, ModuleError, Result, RotationStrategy};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
