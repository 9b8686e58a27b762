//! 依赖图构建器
//!
//! 把每个模块注册时声明的依赖（[`DependencySpec`]）解析为描述符
//! 之间的前向/反向依赖边。目标未注册时创建占位描述符（无实例），
//! 使缺失的依赖在初始化阶段可被发现，而不是让图构建本身崩溃。
//!
//! 构建器在注册表生命周期内只运行一次，发生在首次初始化之前；
//! 此后依赖边冻结，不再变化。

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::module::descriptor::{
    DependencyDirection, DependencySpec, ModuleDescriptor, SpecifierKind,
};

/// 依赖图构建器
///
/// 无状态；对注册表内部的描述符表做一次性的就地加边。
pub(crate) struct DependencyGraphBuilder;

impl DependencyGraphBuilder {
    /// 解析所有描述符声明的依赖并填充依赖边
    ///
    /// # Arguments
    ///
    /// * `descriptors` - 描述符表，占位描述符会被追加到末尾
    /// * `identity_index` - 身份标识 -> 描述符下标
    /// * `key_index` - 模块键 -> 描述符下标
    pub(crate) fn build(
        descriptors: &mut Vec<ModuleDescriptor>,
        identity_index: &mut HashMap<String, usize>,
        key_index: &mut HashMap<String, usize>,
    ) {
        debug!(modules = descriptors.len(), "构建依赖图");

        // 只遍历构建开始前已注册的描述符；过程中追加的占位描述符
        // 没有依赖声明
        let registered = descriptors.len();
        for index in 0..registered {
            let specs = std::mem::take(&mut descriptors[index].specs);
            for spec in &specs {
                let target =
                    Self::resolve_target(spec, descriptors, identity_index, key_index);
                match spec.direction {
                    DependencyDirection::InitializeAfter => {
                        Self::add_edge(descriptors, index, target);
                    }
                    // InitializeBefore 翻转角色：目标依赖声明方
                    DependencyDirection::InitializeBefore => {
                        Self::add_edge(descriptors, target, index);
                    }
                }
            }
            descriptors[index].specs = specs;
        }
    }

    /// 解析依赖目标到描述符下标，未注册时创建占位描述符
    fn resolve_target(
        spec: &DependencySpec,
        descriptors: &mut Vec<ModuleDescriptor>,
        identity_index: &mut HashMap<String, usize>,
        key_index: &mut HashMap<String, usize>,
    ) -> usize {
        match spec.specifier {
            SpecifierKind::Identity => {
                if let Some(&index) = identity_index.get(&spec.target) {
                    return index;
                }
                trace!(target = %spec.target, "依赖目标未注册, 创建占位描述符");
                let index = descriptors.len();
                descriptors.push(ModuleDescriptor::placeholder(spec.target.clone(), None));
                identity_index.insert(spec.target.clone(), index);
                index
            }
            SpecifierKind::Key => {
                if let Some(&index) = key_index.get(&spec.target) {
                    return index;
                }
                trace!(target = %spec.target, "依赖键未注册, 创建占位描述符");
                let index = descriptors.len();
                descriptors.push(ModuleDescriptor::placeholder(
                    spec.target.clone(),
                    Some(spec.target.clone()),
                ));
                key_index.insert(spec.target.clone(), index);
                index
            }
        }
    }

    /// 在 `from` 与 `to` 之间记录一条前向边及对称的反向边
    fn add_edge(descriptors: &mut [ModuleDescriptor], from: usize, to: usize) {
        if !descriptors[from].dependencies.contains(&to) {
            descriptors[from].dependencies.push(to);
        }
        if !descriptors[to].back_dependencies.contains(&from) {
            descriptors[to].back_dependencies.push(from);
        }
    }
}
