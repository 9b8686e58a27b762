//! 宿主配置模块

pub mod config;

pub use config::{HostConfig, IpcSettings, LogSettings};
