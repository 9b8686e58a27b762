//! 模块契约定义
//!
//! 定义模块必须实现的 [`Module`] 特征，以及模块可以选择实现的
//! 可选能力（生命周期钩子、命令处理）。
//!
//! # 能力探测
//!
//! 运行时不做任何运行期类型查询：模块通过覆盖 [`Module`] 上的
//! `as_*` 探测方法来声明自己具备的能力。探测结果在实例创建时
//! 检查一次并缓存在模块描述符上，之后的状态转换不再重复查询。
//!
//! # 示例
//!
//! ```rust
//! use std::any::Any;
//! use std::sync::Arc;
//! use chips_modules::{Module, Runnable, Result};
//!
//! struct Worker;
//!
//! impl Runnable for Worker {
//!     fn start(&self) -> Result<()> {
//!         Ok(())
//!     }
//!
//!     fn stop(&self) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! impl Module for Worker {
//!     fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
//!         self
//!     }
//!
//!     fn as_runnable(&self) -> Option<&dyn Runnable> {
//!         Some(self)
//!     }
//! }
//! ```

use std::any::Any;
use std::sync::Arc;

use crate::command::EndpointTable;
use crate::utils::Result;

/// 模块基础特征
///
/// 所有被注册表管理的模块都实现此特征。特征本身不要求任何行为，
/// 行为通过可选能力（[`Runnable`]、[`Initializable`]、
/// [`CommandProcessor`]）和命令端点表声明。
pub trait Module: Send + Sync + 'static {
    /// 将实例转换为 `Any`，用于按具体类型取回模块
    ///
    /// 实现固定为 `self`（`Arc<Self>` 自动协变到 `Arc<dyn Any>`）。
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;

    /// 探测可运行能力
    ///
    /// 实现了 [`Runnable`] 的模块覆盖此方法返回 `Some(self)`。
    fn as_runnable(&self) -> Option<&dyn Runnable> {
        None
    }

    /// 探测可初始化能力
    fn as_initializable(&self) -> Option<&dyn Initializable> {
        None
    }

    /// 探测原始命令处理能力
    fn as_command_processor(&self) -> Option<&dyn CommandProcessor> {
        None
    }

    /// 模块的命令端点表
    ///
    /// 声明可以通过命令协议设置的属性端点和可调用的方法端点。
    /// 端点表在实例创建时收集一次并缓存在描述符上。
    fn endpoints(&self) -> EndpointTable {
        EndpointTable::new()
    }
}

/// 带有后台行为的模块
///
/// `start` 在所有前向依赖到达 `Started` 之后被调用，
/// `stop` 在所有反向依赖停止之后被调用。
pub trait Runnable: Send + Sync {
    /// 启动模块
    fn start(&self) -> Result<()>;

    /// 停止模块
    fn stop(&self) -> Result<()>;
}

/// 启动前需要初始化的模块
///
/// 初始化在模块生命周期内只执行一次（start/stop 每次启停都会执行）。
pub trait Initializable: Send + Sync {
    /// 初始化模块，为启动做准备
    fn initialize(&self) -> Result<()>;
}

/// 能够直接处理原始命令的模块
///
/// 作为端点表之外的另一条命令路径：参数以分词后的原始文本传入，
/// 类型转换由模块自行负责。
pub trait CommandProcessor: Send + Sync {
    /// 处理一条命令
    ///
    /// # Arguments
    ///
    /// * `command` - 命令名
    /// * `arguments` - 命令参数（原始文本）
    fn process_command(&self, command: &str, arguments: &[String]) -> Result<()>;
}

/// 模块能力标记
///
/// 在实例创建时探测一次，缓存在描述符上。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModuleCapabilities {
    /// 是否实现了 [`Runnable`]
    pub runnable: bool,
    /// 是否实现了 [`Initializable`]
    pub initializable: bool,
    /// 是否实现了 [`CommandProcessor`]
    pub command_processor: bool,
}

impl ModuleCapabilities {
    /// 探测模块实例具备的能力
    pub fn probe(module: &dyn Module) -> Self {
        Self {
            runnable: module.as_runnable().is_some(),
            initializable: module.as_initializable().is_some(),
            command_processor: module.as_command_processor().is_some(),
        }
    }
}
