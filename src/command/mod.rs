//! 命令协议
//!
//! 文本命令的解析与执行：
//!
//! - [`parser`] - 把 `模块.端点=值` / `模块.端点(参数,...)` 解析为
//!   结构化命令
//! - [`endpoint`] - 模块声明的属性/方法端点表
//! - [`engine`] - 对注册表中的模块执行命令

pub mod endpoint;
pub mod engine;
pub mod parser;

pub use endpoint::{convert_argument, EndpointTable, MethodEndpoint, PropertyEndpoint};
pub use engine::CommandEngine;
pub use parser::{parse_command, CommandKind, ModuleCommand};
