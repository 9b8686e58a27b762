//! 日志系统模块
//!
//! 基于 tracing 生态的日志初始化：
//!
//! - 多级别日志（TRACE, DEBUG, INFO, WARN, ERROR）
//! - 结构化日志（可选 JSON 格式输出）
//! - 文件日志输出（tracing-appender，异步非阻塞）
//! - 日志轮转（按天/按小时）
//!
//! 运行时核心只通过 `tracing` 宏产生事件；订阅器由宿主在进程
//! 启动时安装一次。
//!
//! # 示例
//!
//! ```rust,no_run
//! use chips_modules::{Logger, LoggerConfig};
//!
//! let _guard = Logger::init(LoggerConfig::default()).unwrap();
//! tracing::info!(module = "player", "模块已启动");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use crate::utils::{ModuleError, Result};

// ============================================================================
// 日志轮转策略
// ============================================================================

/// 日志轮转策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationStrategy {
    /// 不轮转（单个日志文件）
    Never,
    /// 每小时轮转
    Hourly,
    /// 每天轮转（默认）
    #[default]
    Daily,
}

impl RotationStrategy {
    /// 从字符串解析轮转策略，无法识别时回落到每天轮转
    pub fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "never" | "none" => RotationStrategy::Never,
            "hourly" | "hour" => RotationStrategy::Hourly,
            _ => RotationStrategy::Daily,
        }
    }

    /// 转换为 tracing-appender 的 Rotation 类型
    fn to_rotation(self) -> Rotation {
        match self {
            RotationStrategy::Never => Rotation::NEVER,
            RotationStrategy::Hourly => Rotation::HOURLY,
            RotationStrategy::Daily => Rotation::DAILY,
        }
    }
}

// ============================================================================
// 日志配置
// ============================================================================

/// 日志系统配置
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// 默认日志级别（"trace", "debug", "info", "warn", "error"）
    pub level: String,

    /// 是否使用 JSON 格式输出
    pub json_format: bool,

    /// 是否输出到控制台
    pub console_output: bool,

    /// 文件输出目录（None 表示不输出到文件）
    pub file_output: Option<PathBuf>,

    /// 日志文件名前缀
    pub file_prefix: String,

    /// 日志轮转策略
    pub rotation: RotationStrategy,

    /// 自定义过滤指令（EnvFilter 格式），覆盖 `level`
    pub filter_directives: Option<String>,

    /// 是否启用 ANSI 颜色（控制台输出）
    pub ansi_colors: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            console_output: true,
            file_output: None,
            file_prefix: "chips-modules".to_string(),
            rotation: RotationStrategy::Daily,
            filter_directives: None,
            ansi_colors: true,
        }
    }
}

// ============================================================================
// 初始化
// ============================================================================

/// 日志系统入口
pub struct Logger;

impl Logger {
    /// 初始化全局日志订阅器
    ///
    /// # Returns
    ///
    /// 启用文件输出时返回 `Some(WorkerGuard)`，调用方需要持有它
    /// 直到进程退出，否则缓冲中的日志会丢失。
    ///
    /// # Errors
    ///
    /// 全局订阅器已安装时返回 [`ModuleError::Internal`]。
    pub fn init(config: LoggerConfig) -> Result<Option<WorkerGuard>> {
        let filter = match config.filter_directives {
            Some(ref directives) => EnvFilter::new(directives.clone()),
            None => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("chips_modules={}", config.level))),
        };

        let (file_layer, guard) = match config.file_output {
            Some(ref directory) => {
                let appender = RollingFileAppender::new(
                    config.rotation.to_rotation(),
                    directory,
                    &config.file_prefix,
                );
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer().with_writer(writer).with_ansi(false);
                (Some(layer), Some(guard))
            }
            None => (None, None),
        };

        let console_layer = config
            .console_output
            .then(|| fmt::layer().with_ansi(config.ansi_colors));

        let registry = tracing_subscriber::registry().with(filter);
        let result = if config.json_format {
            registry
                .with(console_layer.map(|l| l.json().boxed()))
                .with(file_layer.map(|l| l.json().boxed()))
                .try_init()
        } else {
            registry
                .with(console_layer.map(|l| l.boxed()))
                .with(file_layer.map(|l| l.boxed()))
                .try_init()
        };

        result.map_err(|e| ModuleError::Internal(format!("日志系统初始化失败: {}", e)))?;
        Ok(guard)
    }
}
