//! 命令引擎
//!
//! 解析命令文本并对注册表中的模块执行。目标模块按键解析
//! （[`ModuleError::ModuleNotFound`] 表示键不存在）；端点调用在
//! 注册表锁外进行，引擎只在解析目标时短暂持锁。

use std::sync::Arc;

use tracing::{debug, trace};

use crate::command::parser::{parse_command, CommandKind};
use crate::module::ModuleRegistry;
use crate::utils::{ModuleError, Result};

/// 命令引擎
///
/// # 示例
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use chips_modules::{CommandEngine, ModuleRegistry};
///
/// let registry = Arc::new(ModuleRegistry::new());
/// // ... 注册模块并启动 ...
/// let engine = CommandEngine::new(registry);
/// engine.execute("player.volume=75").unwrap();
/// ```
pub struct CommandEngine {
    registry: Arc<ModuleRegistry>,
}

impl CommandEngine {
    /// 用注册表创建命令引擎
    pub fn new(registry: Arc<ModuleRegistry>) -> Self {
        Self { registry }
    }

    /// 执行一行命令文本
    ///
    /// # Returns
    ///
    /// - `Ok(true)` - 命令被识别并执行成功
    /// - `Ok(false)` - 文本不构成命令
    ///
    /// # Errors
    ///
    /// - [`ModuleError::ModuleNotFound`] - 目标模块键不存在
    /// - [`ModuleError::ModuleCommand`] - 属性端点不存在
    /// - [`ModuleError::InvalidArgument`] - 属性值转换失败（从端点
    ///   设置闭包传播）
    /// - [`ModuleError::NoMatchingOverload`] - 没有任何方法重载调用
    ///   成功（单个重载的失败被吞掉并尝试下一个）
    pub fn execute(&self, line: &str) -> Result<bool> {
        let Some(command) = parse_command(line) else {
            trace!(line, "文本不构成命令");
            return Ok(false);
        };

        let (_instance, endpoints) = self.registry.command_target(&command.module)?;

        match command.kind {
            CommandKind::Property => {
                let endpoint = endpoints.find_property(&command.endpoint).ok_or_else(|| {
                    ModuleError::ModuleCommand(format!(
                        "模块 '{}' 没有可设置的端点 '{}'",
                        command.module, command.endpoint
                    ))
                })?;
                let raw = command
                    .arguments
                    .first()
                    .map(String::as_str)
                    .unwrap_or_default();
                endpoint.set(raw)?;
                debug!(
                    module = %command.module,
                    endpoint = %command.endpoint,
                    "属性已设置"
                );
                Ok(true)
            }
            CommandKind::Method => {
                let overloads =
                    endpoints.find_methods(&command.endpoint, command.arguments.len());
                for overload in &overloads {
                    // 失败的重载被吞掉，继续尝试下一个
                    if overload.invoke(&command.arguments).is_ok() {
                        debug!(
                            module = %command.module,
                            endpoint = %command.endpoint,
                            arguments = command.arguments.len(),
                            "方法已调用"
                        );
                        return Ok(true);
                    }
                }
                Err(ModuleError::NoMatchingOverload(format!(
                    "没有可调用的 '{}.{}' ({} 个参数)",
                    command.module,
                    command.endpoint,
                    command.arguments.len()
                )))
            }
        }
    }

    /// 把分词后的命令直接转发给模块的原始命令处理能力
    ///
    /// # Errors
    ///
    /// - [`ModuleError::ModuleNotFound`] - 目标模块键不存在
    /// - [`ModuleError::ModuleCommand`] - 模块未实现
    ///   [`CommandProcessor`](crate::CommandProcessor)
    pub fn execute_raw(&self, module_key: &str, command: &str, arguments: &[String]) -> Result<()> {
        let (instance, _endpoints) = self.registry.command_target(module_key)?;
        let processor = instance.as_command_processor().ok_or_else(|| {
            ModuleError::ModuleCommand(format!("模块 '{}' 不能处理原始命令", module_key))
        })?;
        processor.process_command(command, arguments)
    }
}
