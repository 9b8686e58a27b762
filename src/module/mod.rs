//! 模块管理系统
//!
//! 提供模块契约、描述符、实例提供者、依赖图构建和生命周期编排。

pub mod contract;
pub mod dependency;
pub mod descriptor;
pub mod provider;
pub mod registry;

pub use contract::{CommandProcessor, Initializable, Module, ModuleCapabilities, Runnable};
pub use descriptor::{
    DependencyDirection, DependencySpec, ModuleRegistration, ModuleSnapshot, ModuleStatus,
    SpecifierKind,
};
pub use provider::{InstanceProvider, ModuleFactory, ResolveContext};
pub use registry::{LifecycleSubscriber, ModuleRegistry};
