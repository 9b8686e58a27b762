//! 模块实例提供者
//!
//! 按身份标识惰性构建并缓存模块实例。构造注入不依赖运行期反射：
//! 每个模块种类在注册时登记一个工厂，工厂通过 [`ResolveContext`]
//! 拉取自己的依赖实例。每次解析调用维护一个"正在解析"集合，
//! 用于发现构造循环。
//!
//! # 保证
//!
//! - 每个身份最多构建一个实例，重复请求返回同一个 `Arc`
//! - 构造循环以 [`CircularDependency`](crate::ModuleError::CircularDependency)
//!   失败，并指出闭合循环的实现；失败不会缓存任何半成品实例
//! - 首次请求之前不会构建任何实例

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::module::contract::Module;
use crate::utils::{ModuleError, Result};

/// 模块实例工厂
///
/// 工厂接收一个解析上下文，通过上下文拉取依赖实例后构建模块。
pub type ModuleFactory =
    Arc<dyn Fn(&mut ResolveContext<'_>) -> Result<Arc<dyn Module>> + Send + Sync>;

/// 模块实例提供者
///
/// 维护身份到实现的映射、已登记的工厂，以及实例缓存。
#[derive(Default)]
pub struct InstanceProvider {
    /// 身份 -> 实现该身份的模块种类
    implementations: HashMap<String, String>,
    /// 模块种类 -> 实例工厂
    factories: HashMap<String, ModuleFactory>,
    /// 已构建的实例缓存
    instances: HashMap<String, Arc<dyn Module>>,
}

impl InstanceProvider {
    /// 创建空的实例提供者
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个模块种类的工厂
    ///
    /// `provides` 中的每个身份都会被映射到这个实现；同一身份被多次
    /// 登记时，后登记的实现生效（最具体的实现胜出）。
    pub(crate) fn register(&mut self, identity: &str, provides: &[String], factory: ModuleFactory) {
        for provided in provides {
            self.implementations
                .insert(provided.clone(), identity.to_string());
        }
        self.factories.insert(identity.to_string(), factory);
        trace!(module = %identity, provides = provides.len(), "登记实例工厂");
    }

    /// 获取指定身份的模块实例
    ///
    /// 幂等：同一身份的两次调用返回同一个缓存实例。实例在首次
    /// 请求时惰性构建。
    ///
    /// # Errors
    ///
    /// - [`ModuleError::CircularDependency`] - 构造过程成环
    /// - [`ModuleError::ModuleCreate`] - 工厂缺失或执行失败
    pub fn get(&mut self, identity: &str) -> Result<Arc<dyn Module>> {
        if let Some(instance) = self.instances.get(identity) {
            return Ok(instance.clone());
        }
        let mut resolving = HashSet::new();
        self.get_or_create(identity, &mut resolving)
    }

    /// 指定身份的实例是否已构建
    pub fn contains(&self, identity: &str) -> bool {
        self.instances.contains_key(identity)
    }

    /// 已构建的实例数量
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// 递归构建实例
    fn get_or_create(
        &mut self,
        identity: &str,
        resolving: &mut HashSet<String>,
    ) -> Result<Arc<dyn Module>> {
        // 解析到最具体的已登记实现
        let implementation = self
            .implementations
            .get(identity)
            .cloned()
            .unwrap_or_else(|| identity.to_string());

        if let Some(instance) = self.instances.get(&implementation) {
            let instance = instance.clone();
            if identity != implementation {
                self.instances
                    .insert(identity.to_string(), instance.clone());
            }
            return Ok(instance);
        }

        // 重新进入仍在解析中的实现，说明构造成环
        if !resolving.insert(implementation.clone()) {
            return Err(ModuleError::CircularDependency(format!(
                "创建 '{}' 时构造成环",
                implementation
            )));
        }

        let factory = self.factories.get(&implementation).cloned().ok_or_else(|| {
            ModuleError::ModuleCreate {
                module: implementation.clone(),
                reason: "未登记实例工厂".to_string(),
            }
        })?;

        let created = {
            let mut ctx = ResolveContext {
                provider: &mut *self,
                resolving: &mut *resolving,
            };
            factory(&mut ctx)
        };

        let instance = created.map_err(|e| match e {
            // 循环错误保持原样向外传播，便于调用方识别
            cycle @ ModuleError::CircularDependency(_) => cycle,
            other => ModuleError::ModuleCreate {
                module: implementation.clone(),
                reason: other.to_string(),
            },
        })?;

        resolving.remove(&implementation);
        self.instances
            .insert(implementation.clone(), instance.clone());
        if identity != implementation {
            self.instances
                .insert(identity.to_string(), instance.clone());
        }

        debug!(module = %implementation, "模块实例已创建");
        Ok(instance)
    }
}

/// 实例解析上下文
///
/// 传递给模块工厂，工厂通过它拉取依赖实例。上下文共享本次解析
/// 调用的"正在解析"集合，因此跨工厂的构造循环同样会被发现。
pub struct ResolveContext<'a> {
    provider: &'a mut InstanceProvider,
    resolving: &'a mut HashSet<String>,
}

impl ResolveContext<'_> {
    /// 拉取指定身份的模块实例
    pub fn module(&mut self, identity: &str) -> Result<Arc<dyn Module>> {
        self.provider.get_or_create(identity, self.resolving)
    }

    /// 拉取指定身份的模块实例并转换为具体类型
    ///
    /// # Errors
    ///
    /// 实例类型与 `T` 不符时返回 [`ModuleError::ModuleCreate`]。
    pub fn module_as<T: Module>(&mut self, identity: &str) -> Result<Arc<T>> {
        let module = self.module(identity)?;
        let any: Arc<dyn Any + Send + Sync> = module.into_any();
        any.downcast::<T>().map_err(|_| ModuleError::ModuleCreate {
            module: identity.to_string(),
            reason: "实例类型与请求的类型不匹配".to_string(),
        })
    }
}
