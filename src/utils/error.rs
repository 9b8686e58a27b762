//! 模块运行时错误类型定义
//!
//! 本模块定义了运行时中使用的所有错误类型。

use thiserror::Error;

/// 模块运行时核心错误类型
#[derive(Error, Debug)]
pub enum ModuleError {
    // ==================== 模块查找错误 ====================

    /// 模块未找到
    #[error("模块未找到: {0}")]
    ModuleNotFound(String),

    /// 模块或键已注册
    #[error("模块已注册: '{0}'")]
    AlreadyRegistered(String),

    /// 模块尚未完成初始化
    #[error("模块 '{0}' 尚未完成初始化")]
    NotInitialized(String),

    // ==================== 依赖解析错误 ====================

    /// 循环依赖
    #[error("检测到循环依赖: {0}")]
    CircularDependency(String),

    /// 依赖模块不可用
    #[error("模块 '{module}' 的依赖 '{dependency}' 不可用")]
    MissingDependency {
        /// 声明依赖的模块
        module: String,
        /// 缺失的依赖目标
        dependency: String,
    },

    // ==================== 实例创建与生命周期错误 ====================

    /// 模块实例创建失败
    #[error("模块 '{module}' 创建失败: {reason}")]
    ModuleCreate {
        /// 无法创建的模块
        module: String,
        /// 失败原因
        reason: String,
    },

    /// 模块初始化钩子失败
    #[error("模块 '{module}' 初始化失败: {reason}")]
    InitializeFailed {
        /// 初始化失败的模块
        module: String,
        /// 失败原因
        reason: String,
    },

    /// 模块启动钩子失败
    #[error("模块 '{module}' 启动失败: {reason}")]
    StartFailed {
        /// 启动失败的模块
        module: String,
        /// 失败原因
        reason: String,
    },

    /// 模块停止钩子失败
    #[error("模块 '{module}' 停止失败: {reason}")]
    StopFailed {
        /// 停止失败的模块
        module: String,
        /// 失败原因
        reason: String,
    },

    // ==================== 命令协议错误 ====================

    /// 命令执行失败
    #[error("命令执行失败: {0}")]
    ModuleCommand(String),

    /// 没有匹配的方法重载
    #[error("没有匹配的重载: {0}")]
    NoMatchingOverload(String),

    /// 命令参数转换失败
    #[error("参数无效: {0}")]
    InvalidArgument(String),

    // ==================== 配置错误 ====================

    /// 配置加载失败
    #[error("配置加载失败: {0}")]
    ConfigLoadFailed(String),

    // ==================== IO 和序列化错误 ====================

    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// YAML 序列化/反序列化错误
    #[error("YAML 错误: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ==================== 通用错误 ====================

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),

    /// 其他错误
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// 运行时操作结果类型别名
pub type Result<T> = std::result::Result<T, ModuleError>;
