//! 宿主配置
//!
//! 定义嵌入本运行时的宿主进程的配置结构和加载逻辑。配置文件
//! 采用 YAML 格式，所有字段都有默认值，缺失的段落按默认处理。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::ipc::{IpcConfig, IpcTransport};
use crate::utils::logger::{LoggerConfig, RotationStrategy};
use crate::utils::{ModuleError, Result};

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出到文件
    #[serde(default)]
    pub file_output: bool,

    /// 日志文件目录
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json_format: bool,

    /// 日志轮转策略
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: false,
            log_dir: None,
            json_format: false,
            rotation: default_rotation(),
        }
    }
}

/// IPC 配置段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcSettings {
    /// 是否启用 IPC 服务端
    #[serde(default)]
    pub enabled: bool,

    /// Unix Socket 路径（为空时使用 TCP）
    #[serde(default)]
    pub socket_path: Option<PathBuf>,

    /// TCP 监听地址
    #[serde(default = "default_ipc_host")]
    pub host: String,

    /// TCP 监听端口
    #[serde(default = "default_ipc_port")]
    pub port: u16,

    /// 单条消息的最大长度（字节）
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

fn default_ipc_host() -> String {
    "127.0.0.1".to_string()
}

fn default_ipc_port() -> u16 {
    9630
}

fn default_max_frame_bytes() -> usize {
    64 * 1024
}

impl Default for IpcSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            socket_path: None,
            host: default_ipc_host(),
            port: default_ipc_port(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

/// 宿主配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostConfig {
    /// 日志配置
    #[serde(default)]
    pub logging: LogSettings,

    /// IPC 配置
    #[serde(default)]
    pub ipc: IpcSettings,

    /// 开发模式（更详细的日志）
    #[serde(default)]
    pub dev_mode: bool,
}

impl HostConfig {
    /// 从 YAML 文件加载配置
    pub async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ModuleError::ConfigLoadFailed(format!("无法读取 {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// 从 YAML 字符串解析配置
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// 生成日志系统配置
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.logging.level.clone(),
            json_format: self.logging.json_format,
            console_output: true,
            file_output: if self.logging.file_output {
                self.logging.log_dir.clone()
            } else {
                None
            },
            rotation: RotationStrategy::parse(&self.logging.rotation),
            ..LoggerConfig::default()
        }
    }

    /// 生成 IPC 配置
    pub fn ipc_config(&self) -> IpcConfig {
        let transport = match self.ipc.socket_path {
            #[cfg(unix)]
            Some(ref path) => IpcTransport::Unix(path.clone()),
            _ => IpcTransport::Tcp(self.ipc.host.clone(), self.ipc.port),
        };
        IpcConfig {
            transport,
            max_frame_bytes: self.ipc.max_frame_bytes,
            ..IpcConfig::default()
        }
    }
}
