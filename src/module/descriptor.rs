//! 模块描述符定义
//!
//! 定义注册表为每个模块维护的元数据记录：身份标识、可选键、
//! 生命周期状态、依赖声明与解析后的依赖边。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::command::EndpointTable;
use crate::module::contract::{Module, ModuleCapabilities};
use crate::module::provider::{ModuleFactory, ResolveContext};
use crate::utils::Result;

/// 模块生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleStatus {
    /// 尚未初始化
    None,
    /// 已初始化
    Initialized,
    /// 初始化失败（终态）
    ErrorInitializing,
    /// 已启动
    Started,
    /// 启动失败
    ErrorStarting,
    /// 已停止
    Stopped,
}

impl Default for ModuleStatus {
    fn default() -> Self {
        ModuleStatus::None
    }
}

impl ModuleStatus {
    /// 是否处于错误状态
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ModuleStatus::ErrorInitializing | ModuleStatus::ErrorStarting
        )
    }

    /// 是否已完成初始化（含后续状态）
    pub fn is_initialized(&self) -> bool {
        matches!(
            self,
            ModuleStatus::Initialized
                | ModuleStatus::Started
                | ModuleStatus::ErrorStarting
                | ModuleStatus::Stopped
        )
    }

    /// 是否可以启动
    pub fn can_start(&self) -> bool {
        matches!(self, ModuleStatus::Initialized | ModuleStatus::Stopped)
    }

    /// 是否已启动
    pub fn is_started(&self) -> bool {
        matches!(self, ModuleStatus::Started)
    }
}

/// 依赖目标的指定方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecifierKind {
    /// 按模块身份标识指定
    Identity,
    /// 按模块键指定
    Key,
}

/// 依赖方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyDirection {
    /// 本模块在目标模块之后初始化/启动（默认）
    InitializeAfter,
    /// 本模块在目标模块之前初始化/启动
    InitializeBefore,
}

/// 依赖声明
///
/// 注册时附加在模块上的类型化依赖声明，由依赖图构建器消费一次，
/// 之后不再变化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    /// 依赖目标（身份标识或键）
    pub target: String,
    /// 目标的指定方式
    pub specifier: SpecifierKind,
    /// 依赖方向
    pub direction: DependencyDirection,
}

impl DependencySpec {
    /// 按身份标识声明依赖（方向为 `InitializeAfter`）
    pub fn by_identity(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            specifier: SpecifierKind::Identity,
            direction: DependencyDirection::InitializeAfter,
        }
    }

    /// 按键声明依赖（方向为 `InitializeAfter`）
    pub fn by_key(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            specifier: SpecifierKind::Key,
            direction: DependencyDirection::InitializeAfter,
        }
    }

    /// 将方向翻转为 `InitializeBefore`
    pub fn before(mut self) -> Self {
        self.direction = DependencyDirection::InitializeBefore;
        self
    }
}

/// 模块注册请求
///
/// 描述一个待注册的模块种类：身份标识、可选键、该实现额外满足的
/// 身份列表、依赖声明，以及实例工厂。
///
/// # 示例
///
/// ```rust
/// use std::any::Any;
/// use std::sync::Arc;
/// use chips_modules::{DependencySpec, Module, ModuleRegistration};
///
/// struct Clock;
///
/// impl Module for Clock {
///     fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
///         self
///     }
/// }
///
/// let registration = ModuleRegistration::new("clock", |_ctx| Ok(Arc::new(Clock)))
///     .key("clock")
///     .dependency(DependencySpec::by_identity("timebase"));
/// assert_eq!(registration.identity(), "clock");
/// ```
pub struct ModuleRegistration {
    pub(crate) identity: String,
    pub(crate) key: Option<String>,
    pub(crate) provides: Vec<String>,
    pub(crate) specs: Vec<DependencySpec>,
    pub(crate) factory: ModuleFactory,
}

impl ModuleRegistration {
    /// 用实例工厂创建注册请求
    ///
    /// 工厂在首次请求该模块实例时调用，通过 [`ResolveContext`]
    /// 拉取自己的依赖实例。
    pub fn new<M, F>(identity: impl Into<String>, factory: F) -> Self
    where
        M: Module,
        F: Fn(&mut ResolveContext<'_>) -> Result<Arc<M>> + Send + Sync + 'static,
    {
        Self {
            identity: identity.into(),
            key: None,
            provides: Vec::new(),
            specs: Vec::new(),
            factory: Arc::new(move |ctx| factory(ctx).map(|m| m as Arc<dyn Module>)),
        }
    }

    /// 用已构建好的实例创建注册请求
    ///
    /// 绕过工厂注入，实例按原样缓存。
    pub fn with_instance(identity: impl Into<String>, instance: Arc<dyn Module>) -> Self {
        Self {
            identity: identity.into(),
            key: None,
            provides: Vec::new(),
            specs: Vec::new(),
            factory: Arc::new(move |_ctx| Ok(instance.clone())),
        }
    }

    /// 设置模块键（注册表范围内唯一的别名）
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// 声明该实现额外满足的身份
    ///
    /// 一个具体实现可以满足多个能力/基础身份，实例提供者会把
    /// 每个这样的身份解析到同一个实例。
    pub fn provides(mut self, identity: impl Into<String>) -> Self {
        self.provides.push(identity.into());
        self
    }

    /// 附加一条依赖声明
    pub fn dependency(mut self, spec: DependencySpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// 模块身份标识
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

/// 模块描述符
///
/// 注册表为每个模块维护的运行时记录。依赖边在依赖图构建器运行后
/// 冻结；实例、能力标记与端点表在实例创建时填充一次。
pub(crate) struct ModuleDescriptor {
    /// 身份标识（注册表范围内唯一）
    pub(crate) identity: String,
    /// 模块键（如果有）
    pub(crate) key: Option<String>,
    /// 当前生命周期状态
    pub(crate) status: ModuleStatus,
    /// 注册时声明的依赖，由依赖图构建器消费一次
    pub(crate) specs: Vec<DependencySpec>,
    /// 前向依赖边（描述符下标）：初始化/启动先于本模块的模块
    pub(crate) dependencies: Vec<usize>,
    /// 反向依赖边（描述符下标）：依赖本模块的模块，停止时先级联
    pub(crate) back_dependencies: Vec<usize>,
    /// 是否为已注册模块（false 表示未注册目标的占位描述符）
    pub(crate) registered: bool,
    /// 缓存的模块实例
    pub(crate) instance: Option<Arc<dyn Module>>,
    /// 能力标记（实例创建时探测一次）
    pub(crate) capabilities: ModuleCapabilities,
    /// 命令端点表（实例创建时收集一次）
    pub(crate) endpoints: Option<Arc<EndpointTable>>,
    /// 初始化完成时间
    pub(crate) initialized_at: Option<DateTime<Utc>>,
    /// 最近一次启动时间
    pub(crate) started_at: Option<DateTime<Utc>>,
    /// 最后错误信息
    pub(crate) last_error: Option<String>,
}

impl ModuleDescriptor {
    /// 创建已注册模块的描述符
    pub(crate) fn new(identity: String, key: Option<String>, specs: Vec<DependencySpec>) -> Self {
        Self {
            identity,
            key,
            status: ModuleStatus::None,
            specs,
            dependencies: Vec::new(),
            back_dependencies: Vec::new(),
            registered: true,
            instance: None,
            capabilities: ModuleCapabilities::default(),
            endpoints: None,
            initialized_at: None,
            started_at: None,
            last_error: None,
        }
    }

    /// 创建未注册目标的占位描述符
    pub(crate) fn placeholder(identity: String, key: Option<String>) -> Self {
        let mut descriptor = Self::new(identity, key, Vec::new());
        descriptor.registered = false;
        descriptor
    }

    /// 生成对外快照
    pub(crate) fn snapshot(&self, dependency_names: Vec<String>) -> ModuleSnapshot {
        ModuleSnapshot {
            identity: self.identity.clone(),
            key: self.key.clone(),
            status: self.status,
            dependencies: dependency_names,
            initialized_at: self.initialized_at,
            started_at: self.started_at,
            last_error: self.last_error.clone(),
        }
    }
}

/// 模块状态快照
///
/// 注册表对外暴露的描述符只读视图，供宿主展示和诊断使用。
#[derive(Debug, Clone, Serialize)]
pub struct ModuleSnapshot {
    /// 身份标识
    pub identity: String,
    /// 模块键（如果有）
    pub key: Option<String>,
    /// 当前状态
    pub status: ModuleStatus,
    /// 前向依赖的身份标识
    pub dependencies: Vec<String>,
    /// 初始化完成时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialized_at: Option<DateTime<Utc>>,
    /// 最近一次启动时间
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// 最后错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}
