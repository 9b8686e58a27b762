//! 模块注册表（生命周期编排器）
//!
//! 注册表持有全部模块描述符和身份/键索引，驱动
//! 初始化 → 激活 → 停止的生命周期，并提供模块查找。
//!
//! # 生命周期
//!
//! - [`ModuleRegistry::start`] 首次调用时构建依赖图（此后依赖边冻结），
//!   然后沿前向依赖边深度优先初始化所有模块，最后按依赖顺序激活。
//! - 初始化阶段发现的循环依赖会把环上所有模块标记为
//!   `ErrorInitializing` 并永久排除在激活之外；依赖未注册目标的
//!   模块同样以 `ErrorInitializing` 终止。单个模块的失败不会中断
//!   其余模块（按模块隔离失败）。
//! - 启动钩子失败把模块标记为 `ErrorStarting` 并向触发启动链的
//!   调用方抛出：依赖启动失败会阻止依赖方启动。
//! - [`ModuleRegistry::stop`] 按反向依赖级联：依赖方先于被依赖方
//!   停止；批量停止吞掉并记录单个失败，保证其余模块仍有停止机会。
//!
//! # 并发模型
//!
//! 注册表的全部可变状态由一把互斥锁保护，初始化/启动/停止是
//! 同步阻塞调用，并发调用方在锁上串行。生命周期通知在锁内同步
//! 触发，订阅者不得重入注册表，否则会死锁。

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::command::EndpointTable;
use crate::module::contract::{Module, ModuleCapabilities};
use crate::module::dependency::DependencyGraphBuilder;
use crate::module::descriptor::{
    ModuleDescriptor, ModuleRegistration, ModuleSnapshot, ModuleStatus,
};
use crate::module::provider::InstanceProvider;
use crate::utils::{ModuleError, Result};

/// 生命周期通知回调
///
/// 参数为模块身份标识与实例。回调返回的错误会被记录并吞掉，
/// 不会影响已完成的状态转换。回调在注册表锁内同步执行，
/// 不得重入注册表。
pub type LifecycleSubscriber = Box<dyn Fn(&str, &Arc<dyn Module>) -> Result<()> + Send + Sync>;

/// 模块注册表
///
/// 管理所有已注册的模块，包括：
/// - 模块注册与查找（按身份标识或键）
/// - 依赖图构建与循环检测
/// - 初始化/启动/停止的生命周期编排
/// - 生命周期通知
pub struct ModuleRegistry {
    inner: Mutex<RegistryInner>,
}

/// 注册表内部状态，整体由一把锁保护
struct RegistryInner {
    /// 描述符表（含未注册目标的占位描述符）
    descriptors: Vec<ModuleDescriptor>,
    /// 身份标识 -> 描述符下标
    identity_index: HashMap<String, usize>,
    /// 模块键 -> 描述符下标
    key_index: HashMap<String, usize>,
    /// 实例提供者
    provider: InstanceProvider,
    /// 依赖图是否已构建（构建后注册关闭，依赖边冻结）
    graph_built: bool,
    /// ModuleStarted 订阅者
    started_subscribers: Vec<LifecycleSubscriber>,
    /// ModuleStopped 订阅者
    stopped_subscribers: Vec<LifecycleSubscriber>,
}

impl ModuleRegistry {
    /// 创建空的模块注册表
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                descriptors: Vec::new(),
                identity_index: HashMap::new(),
                key_index: HashMap::new(),
                provider: InstanceProvider::new(),
                graph_built: false,
                started_subscribers: Vec::new(),
                stopped_subscribers: Vec::new(),
            }),
        }
    }

    // ==================== 注册 ====================

    /// 注册一个模块种类
    ///
    /// 必须在首次 [`start`](Self::start) 之前完成。
    ///
    /// # Errors
    ///
    /// - 身份标识或键重复时返回 [`ModuleError::AlreadyRegistered`]
    /// - 注册表已启动时返回 [`ModuleError::Internal`]
    pub fn register(&self, registration: ModuleRegistration) -> Result<()> {
        let mut inner = self.inner.lock();

        if inner.graph_built {
            return Err(ModuleError::Internal(
                "注册表已启动, 不再接受模块注册".to_string(),
            ));
        }
        if inner.identity_index.contains_key(&registration.identity) {
            return Err(ModuleError::AlreadyRegistered(registration.identity));
        }
        if let Some(ref key) = registration.key {
            if inner.key_index.contains_key(key) {
                return Err(ModuleError::AlreadyRegistered(key.clone()));
            }
        }

        let ModuleRegistration {
            identity,
            key,
            provides,
            specs,
            factory,
        } = registration;

        inner.provider.register(&identity, &provides, factory);

        let index = inner.descriptors.len();
        inner
            .descriptors
            .push(ModuleDescriptor::new(identity.clone(), key.clone(), specs));
        inner.identity_index.insert(identity.clone(), index);
        if let Some(key) = key {
            inner.key_index.insert(key, index);
        }

        debug!(module = %identity, "模块已注册");
        Ok(())
    }

    // ==================== 生命周期 ====================

    /// 启动所有被管理的模块
    ///
    /// 首次调用构建依赖图，之后执行初始化阶段（深度优先、循环
    /// 检测）和激活阶段（依赖顺序）。单个模块的失败被记录为
    /// 终态状态，不会中断其余模块。
    pub fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_graph();
        inner.initialize_all();
        inner.activate_all();
        Ok(())
    }

    /// 停止所有被管理的模块
    ///
    /// 对每个描述符尝试一次停止，级联反向依赖；单个失败被记录并
    /// 吞掉，保证其余模块仍有停止机会。
    pub fn stop(&self) {
        let mut inner = self.inner.lock();
        info!("停止所有模块");
        for index in 0..inner.descriptors.len() {
            if let Err(e) = inner.stop_module_at(index) {
                warn!(
                    module = %inner.descriptors[index].identity,
                    error = %e,
                    "无法停止模块, 继续处理其余模块"
                );
            }
        }
    }

    /// 手动启动单个模块
    ///
    /// 未启动的前向依赖会被递归启动。作为显式的外部请求，
    /// 允许重试处于 `ErrorStarting` 的模块；`ErrorInitializing`
    /// 保持终态。
    pub fn start_module(&self, identity: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.ensure_graph();
        let index = inner.registered_index(identity)?;

        // 显式请求允许重试启动失败
        if inner.descriptors[index].status == ModuleStatus::ErrorStarting {
            inner.descriptors[index].status = ModuleStatus::Initialized;
        }
        if inner.descriptors[index].status == ModuleStatus::None {
            let mut visiting = Vec::new();
            inner.initialize_module(index, &mut visiting)?;
        }
        inner.start_module_at(index)
    }

    /// 手动停止单个模块
    ///
    /// 依赖本模块的模块（反向依赖）会先被递归停止。
    pub fn stop_module(&self, identity: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        let index = inner.registered_index(identity)?;
        inner.stop_module_at(index)
    }

    // ==================== 查找 ====================

    /// 按键查找模块实例
    ///
    /// 不会隐式构建缺失的模块。
    ///
    /// # Errors
    ///
    /// - 键不存在时返回 [`ModuleError::ModuleNotFound`]
    /// - 实例尚未构建时返回 [`ModuleError::NotInitialized`]
    pub fn get_by_key(&self, key: &str) -> Result<Arc<dyn Module>> {
        let inner = self.inner.lock();
        let index = inner
            .key_index
            .get(key)
            .copied()
            .ok_or_else(|| ModuleError::ModuleNotFound(format!("没有键为 '{}' 的模块", key)))?;
        inner.instance_at(index)
    }

    /// 按身份标识查找模块实例
    ///
    /// 不会隐式构建缺失的模块。
    pub fn get_by_identity(&self, identity: &str) -> Result<Arc<dyn Module>> {
        let inner = self.inner.lock();
        let index = inner.registered_index(identity)?;
        inner.instance_at(index)
    }

    /// 按身份标识查找模块实例并转换为具体类型
    pub fn get_as<T: Module>(&self, identity: &str) -> Result<Arc<T>> {
        let module = self.get_by_identity(identity)?;
        module
            .into_any()
            .downcast::<T>()
            .map_err(|_| ModuleError::Internal(format!("模块 '{}' 类型不匹配", identity)))
    }

    /// 查询模块状态
    pub fn status(&self, identity: &str) -> Option<ModuleStatus> {
        let inner = self.inner.lock();
        inner
            .identity_index
            .get(identity)
            .map(|&index| inner.descriptors[index].status)
    }

    /// 模块是否处于已启动状态
    pub fn is_started(&self, identity: &str) -> bool {
        self.status(identity)
            .map(|s| s.is_started())
            .unwrap_or(false)
    }

    /// 已注册模块数量（不含占位描述符）
    pub fn count(&self) -> usize {
        let inner = self.inner.lock();
        inner.descriptors.iter().filter(|d| d.registered).count()
    }

    /// 所有已注册模块的状态快照
    pub fn list_modules(&self) -> Vec<ModuleSnapshot> {
        let inner = self.inner.lock();
        inner
            .descriptors
            .iter()
            .filter(|d| d.registered)
            .map(|d| {
                let names = d
                    .dependencies
                    .iter()
                    .map(|&dep| inner.descriptors[dep].identity.clone())
                    .collect();
                d.snapshot(names)
            })
            .collect()
    }

    // ==================== 通知 ====================

    /// 订阅模块启动通知
    ///
    /// 回调在成功的启动转换之后、注册表锁内同步触发；回调错误被
    /// 记录并吞掉，不会撤销已完成的启动。回调不得重入注册表。
    pub fn on_module_started<F>(&self, subscriber: F)
    where
        F: Fn(&str, &Arc<dyn Module>) -> Result<()> + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        inner.started_subscribers.push(Box::new(subscriber));
    }

    /// 订阅模块停止通知
    pub fn on_module_stopped<F>(&self, subscriber: F)
    where
        F: Fn(&str, &Arc<dyn Module>) -> Result<()> + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        inner.stopped_subscribers.push(Box::new(subscriber));
    }

    // ==================== 命令协议支持 ====================

    /// 按键解析命令目标，返回实例与端点表
    ///
    /// 供命令引擎使用；克隆出的实例与端点表在锁外调用。
    pub(crate) fn command_target(
        &self,
        key: &str,
    ) -> Result<(Arc<dyn Module>, Arc<EndpointTable>)> {
        let inner = self.inner.lock();
        let index = inner
            .key_index
            .get(key)
            .copied()
            .ok_or_else(|| ModuleError::ModuleNotFound(format!("没有键为 '{}' 的模块", key)))?;
        let descriptor = &inner.descriptors[index];
        let instance = descriptor
            .instance
            .clone()
            .ok_or_else(|| ModuleError::NotInitialized(descriptor.identity.clone()))?;
        let endpoints = descriptor
            .endpoints
            .clone()
            .unwrap_or_else(|| Arc::new(EndpointTable::new()));
        Ok((instance, endpoints))
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryInner {
    /// 构建依赖图（仅一次）
    fn ensure_graph(&mut self) {
        if self.graph_built {
            return;
        }
        DependencyGraphBuilder::build(
            &mut self.descriptors,
            &mut self.identity_index,
            &mut self.key_index,
        );
        self.graph_built = true;
    }

    /// 查找已注册模块的描述符下标
    fn registered_index(&self, identity: &str) -> Result<usize> {
        match self.identity_index.get(identity) {
            Some(&index) if self.descriptors[index].registered => Ok(index),
            _ => Err(ModuleError::ModuleNotFound(format!(
                "没有身份为 '{}' 的模块",
                identity
            ))),
        }
    }

    /// 取出描述符上缓存的实例
    fn instance_at(&self, index: usize) -> Result<Arc<dyn Module>> {
        let descriptor = &self.descriptors[index];
        descriptor
            .instance
            .clone()
            .ok_or_else(|| ModuleError::NotInitialized(descriptor.identity.clone()))
    }

    /// 把模块标记为初始化失败
    ///
    /// 已处于 `ErrorInitializing` 时保留最初的错误信息。
    fn fail_initializing(&mut self, index: usize, reason: &str) {
        let descriptor = &mut self.descriptors[index];
        if descriptor.status != ModuleStatus::ErrorInitializing {
            descriptor.status = ModuleStatus::ErrorInitializing;
            descriptor.last_error = Some(reason.to_string());
        }
    }

    // ==================== 初始化阶段 ====================

    /// 初始化所有未初始化的模块，按模块隔离失败
    fn initialize_all(&mut self) {
        info!("初始化模块");
        for index in 0..self.descriptors.len() {
            let descriptor = &self.descriptors[index];
            if !descriptor.registered || descriptor.status != ModuleStatus::None {
                continue;
            }
            let mut visiting = Vec::new();
            if let Err(e) = self.initialize_module(index, &mut visiting) {
                warn!(
                    module = %self.descriptors[index].identity,
                    error = %e,
                    "模块初始化失败"
                );
            }
        }
    }

    /// 深度优先初始化单个模块
    ///
    /// `visiting` 是本次调用的访问栈，重入其中的模块说明依赖链
    /// 成环：环上所有模块被标记为 `ErrorInitializing`。
    fn initialize_module(&mut self, index: usize, visiting: &mut Vec<usize>) -> Result<()> {
        let identity = self.descriptors[index].identity.clone();

        match self.descriptors[index].status {
            s if s.is_initialized() => return Ok(()),
            ModuleStatus::ErrorInitializing => {
                return Err(ModuleError::NotInitialized(identity));
            }
            _ => {}
        }

        if let Some(position) = visiting.iter().position(|&v| v == index) {
            let mut cycle: Vec<String> = visiting[position..]
                .iter()
                .map(|&v| self.descriptors[v].identity.clone())
                .collect();
            cycle.push(identity);
            let message = cycle.join(" -> ");
            for v in visiting[position..].to_vec() {
                self.fail_initializing(v, &format!("循环依赖: {}", message));
            }
            return Err(ModuleError::CircularDependency(message));
        }

        visiting.push(index);

        let dependencies = self.descriptors[index].dependencies.clone();
        for dep in dependencies {
            let dep_name = self.descriptors[dep].identity.clone();

            if !self.descriptors[dep].registered {
                self.fail_initializing(index, &format!("依赖 '{}' 未注册", dep_name));
                visiting.pop();
                return Err(ModuleError::MissingDependency {
                    module: identity,
                    dependency: dep_name,
                });
            }

            if self.descriptors[dep].status == ModuleStatus::ErrorInitializing {
                self.fail_initializing(index, &format!("依赖 '{}' 初始化失败", dep_name));
                visiting.pop();
                return Err(ModuleError::MissingDependency {
                    module: identity,
                    dependency: dep_name,
                });
            }

            if let Err(e) = self.initialize_module(dep, visiting) {
                self.fail_initializing(index, &format!("依赖 '{}' 不可用: {}", dep_name, e));
                visiting.pop();
                return match e {
                    cycle @ ModuleError::CircularDependency(_) => Err(cycle),
                    _ => Err(ModuleError::MissingDependency {
                        module: identity,
                        dependency: dep_name,
                    }),
                };
            }
        }

        // 创建实例并缓存能力标记与端点表
        if self.descriptors[index].instance.is_none() {
            match self.provider.get(&identity) {
                Ok(instance) => {
                    let capabilities = ModuleCapabilities::probe(instance.as_ref());
                    let endpoints = Arc::new(instance.endpoints());
                    let descriptor = &mut self.descriptors[index];
                    descriptor.capabilities = capabilities;
                    descriptor.endpoints = Some(endpoints);
                    descriptor.instance = Some(instance);
                }
                Err(e) => {
                    self.fail_initializing(index, &e.to_string());
                    visiting.pop();
                    return Err(e);
                }
            }
        }

        // 初始化钩子（模块生命周期内只执行一次）
        if self.descriptors[index].capabilities.initializable {
            if let Some(instance) = self.descriptors[index].instance.clone() {
                if let Some(initializable) = instance.as_initializable() {
                    if let Err(e) = initializable.initialize() {
                        error!(module = %identity, error = %e, "初始化钩子失败");
                        self.fail_initializing(index, &e.to_string());
                        visiting.pop();
                        return Err(ModuleError::InitializeFailed {
                            module: identity,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        let descriptor = &mut self.descriptors[index];
        descriptor.status = ModuleStatus::Initialized;
        descriptor.initialized_at = Some(Utc::now());
        debug!(module = %identity, "模块初始化完成");

        visiting.pop();
        Ok(())
    }

    // ==================== 激活阶段 ====================

    /// 激活所有可激活的模块，按模块隔离失败
    fn activate_all(&mut self) {
        for index in 0..self.descriptors.len() {
            let descriptor = &self.descriptors[index];
            if !descriptor.registered || !descriptor.status.can_start() {
                continue;
            }
            if let Err(e) = self.start_module_at(index) {
                warn!(
                    module = %self.descriptors[index].identity,
                    error = %e,
                    "无法激活模块"
                );
            }
        }
    }

    /// 启动单个模块，未启动的前向依赖先递归启动
    ///
    /// 启动钩子失败把模块标记为 `ErrorStarting` 并把错误抛给
    /// 触发本条启动链的调用方。
    fn start_module_at(&mut self, index: usize) -> Result<()> {
        let identity = self.descriptors[index].identity.clone();

        match self.descriptors[index].status {
            ModuleStatus::Started => return Ok(()),
            ModuleStatus::Initialized | ModuleStatus::Stopped => {}
            ModuleStatus::ErrorStarting => {
                return Err(ModuleError::StartFailed {
                    module: identity,
                    reason: self.descriptors[index]
                        .last_error
                        .clone()
                        .unwrap_or_else(|| "上次启动失败".to_string()),
                });
            }
            ModuleStatus::None | ModuleStatus::ErrorInitializing => {
                return Err(ModuleError::NotInitialized(identity));
            }
        }

        let dependencies = self.descriptors[index].dependencies.clone();
        for dep in dependencies {
            if self.descriptors[dep].status != ModuleStatus::Started {
                self.start_module_at(dep)?;
            }
        }

        info!(module = %identity, "激活模块");
        if self.descriptors[index].capabilities.runnable {
            if let Some(instance) = self.descriptors[index].instance.clone() {
                if let Some(runnable) = instance.as_runnable() {
                    if let Err(e) = runnable.start() {
                        error!(module = %identity, error = %e, "模块启动失败");
                        let descriptor = &mut self.descriptors[index];
                        descriptor.status = ModuleStatus::ErrorStarting;
                        descriptor.last_error = Some(e.to_string());
                        return Err(ModuleError::StartFailed {
                            module: identity,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        let descriptor = &mut self.descriptors[index];
        descriptor.status = ModuleStatus::Started;
        descriptor.started_at = Some(Utc::now());

        self.notify_started(index);
        Ok(())
    }

    // ==================== 停止 ====================

    /// 停止单个模块，依赖本模块的模块先递归停止
    fn stop_module_at(&mut self, index: usize) -> Result<()> {
        if self.descriptors[index].status != ModuleStatus::Started {
            return Ok(());
        }
        let identity = self.descriptors[index].identity.clone();

        let back_dependencies = self.descriptors[index].back_dependencies.clone();
        for back in back_dependencies {
            self.stop_module_at(back)?;
        }

        info!(module = %identity, "停止模块");
        if self.descriptors[index].capabilities.runnable {
            if let Some(instance) = self.descriptors[index].instance.clone() {
                if let Some(runnable) = instance.as_runnable() {
                    if let Err(e) = runnable.stop() {
                        error!(module = %identity, error = %e, "模块停止失败");
                        return Err(ModuleError::StopFailed {
                            module: identity,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        self.descriptors[index].status = ModuleStatus::Stopped;
        self.notify_stopped(index);
        Ok(())
    }

    // ==================== 通知 ====================

    /// 触发 ModuleStarted 通知，订阅者错误被记录并吞掉
    fn notify_started(&self, index: usize) {
        let descriptor = &self.descriptors[index];
        let Some(instance) = descriptor.instance.as_ref() else {
            return;
        };
        for subscriber in &self.started_subscribers {
            if let Err(e) = subscriber(&descriptor.identity, instance) {
                error!(
                    module = %descriptor.identity,
                    error = %e,
                    "ModuleStarted 通知回调失败"
                );
            }
        }
    }

    /// 触发 ModuleStopped 通知，订阅者错误被记录并吞掉
    fn notify_stopped(&self, index: usize) {
        let descriptor = &self.descriptors[index];
        let Some(instance) = descriptor.instance.as_ref() else {
            return;
        };
        for subscriber in &self.stopped_subscribers {
            if let Err(e) = subscriber(&descriptor.identity, instance) {
                error!(
                    module = %descriptor.identity,
                    error = %e,
                    "ModuleStopped 通知回调失败"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::descriptor::DependencySpec;
    use std::any::Any;

    struct PlainModule;

    impl Module for PlainModule {
        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    fn plain(identity: &str) -> ModuleRegistration {
        ModuleRegistration::new(identity, |_ctx| Ok(Arc::new(PlainModule)))
    }

    #[test]
    fn test_register_and_count() {
        let registry = ModuleRegistry::new();
        registry.register(plain("a")).unwrap();
        registry.register(plain("b")).unwrap();
        assert_eq!(registry.count(), 2);
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let registry = ModuleRegistry::new();
        registry.register(plain("a")).unwrap();
        let result = registry.register(plain("a"));
        assert!(matches!(result, Err(ModuleError::AlreadyRegistered(_))));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let registry = ModuleRegistry::new();
        registry.register(plain("a").key("shared")).unwrap();
        let result = registry.register(plain("b").key("shared"));
        assert!(matches!(result, Err(ModuleError::AlreadyRegistered(_))));
    }

    #[test]
    fn test_registration_closed_after_start() {
        let registry = ModuleRegistry::new();
        registry.register(plain("a")).unwrap();
        registry.start().unwrap();
        let result = registry.register(plain("b"));
        assert!(matches!(result, Err(ModuleError::Internal(_))));
    }

    #[test]
    fn test_start_simple_module() {
        let registry = ModuleRegistry::new();
        registry.register(plain("simple")).unwrap();
        registry.start().unwrap();

        assert!(registry.is_started("simple"));
        assert!(registry.get_by_identity("simple").is_ok());
    }

    #[test]
    fn test_lookup_never_constructs() {
        let registry = ModuleRegistry::new();
        registry.register(plain("lazy")).unwrap();

        // 尚未 start，实例不应被隐式构建
        let result = registry.get_by_identity("lazy");
        assert!(matches!(result, Err(ModuleError::NotInitialized(_))));
    }

    #[test]
    fn test_lookup_by_key() {
        let registry = ModuleRegistry::new();
        registry.register(plain("worker").key("w")).unwrap();
        registry.start().unwrap();

        assert!(registry.get_by_key("w").is_ok());
        assert!(matches!(
            registry.get_by_key("missing"),
            Err(ModuleError::ModuleNotFound(_))
        ));
    }

    #[test]
    fn test_typed_lookup() {
        let registry = ModuleRegistry::new();
        registry.register(plain("typed")).unwrap();
        registry.start().unwrap();

        let module: Arc<PlainModule> = registry.get_as("typed").unwrap();
        let again: Arc<PlainModule> = registry.get_as("typed").unwrap();
        assert!(Arc::ptr_eq(&module, &again));
    }

    #[test]
    fn test_missing_dependency_isolated() {
        let registry = ModuleRegistry::new();
        registry
            .register(plain("orphan").dependency(DependencySpec::by_identity("ghost")))
            .unwrap();
        registry.register(plain("healthy")).unwrap();
        registry.start().unwrap();

        assert_eq!(
            registry.status("orphan"),
            Some(ModuleStatus::ErrorInitializing)
        );
        assert!(registry.is_started("healthy"));
    }

    #[test]
    fn test_stopped_module_restarts() {
        let registry = ModuleRegistry::new();
        registry.register(plain("worker")).unwrap();
        registry.start().unwrap();
        registry.stop();
        assert_eq!(registry.status("worker"), Some(ModuleStatus::Stopped));

        registry.start().unwrap();
        assert!(registry.is_started("worker"));
    }

    #[test]
    fn test_snapshot_lists_dependencies() {
        let registry = ModuleRegistry::new();
        registry
            .register(plain("app").dependency(DependencySpec::by_identity("service")))
            .unwrap();
        registry.register(plain("service")).unwrap();
        registry.start().unwrap();

        let snapshots = registry.list_modules();
        let app = snapshots.iter().find(|s| s.identity == "app").unwrap();
        assert_eq!(app.dependencies, vec!["service".to_string()]);
        assert_eq!(app.status, ModuleStatus::Started);
        assert!(app.started_at.is_some());
    }
}
