//! 命令端点表
//!
//! 模块通过端点表声明命令协议可以访问的名字：可设置的属性端点
//! 和可调用的方法端点。端点名匹配不区分大小写；同名同参数个数的
//! 方法端点构成重载组，由命令引擎依次尝试。
//!
//! 文本到原生类型的转换发生在端点闭包内部（通常通过
//! [`convert_argument`]），转换失败的错误从属性设置中向外传播，
//! 在方法重载尝试中则被吞掉并尝试下一个重载。

use std::fmt;
use std::str::FromStr;

use crate::utils::{ModuleError, Result};

/// 属性设置闭包
type PropertySetter = Box<dyn Fn(&str) -> Result<()> + Send + Sync>;

/// 方法调用闭包
type MethodInvoker = Box<dyn Fn(&[String]) -> Result<()> + Send + Sync>;

/// 可设置的属性端点
pub struct PropertyEndpoint {
    name: String,
    setter: PropertySetter,
}

impl PropertyEndpoint {
    /// 端点名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置属性值，`raw` 为命令文本中的原始参数
    pub fn set(&self, raw: &str) -> Result<()> {
        (self.setter)(raw)
    }
}

/// 可调用的方法端点
pub struct MethodEndpoint {
    name: String,
    arity: usize,
    invoker: MethodInvoker,
}

impl MethodEndpoint {
    /// 端点名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 参数个数
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// 调用方法，参数为原始文本
    pub fn invoke(&self, arguments: &[String]) -> Result<()> {
        (self.invoker)(arguments)
    }
}

/// 模块的命令端点表
///
/// # 示例
///
/// ```rust
/// use std::sync::atomic::{AtomicI64, Ordering};
/// use std::sync::Arc;
/// use chips_modules::command::{convert_argument, EndpointTable};
///
/// let count = Arc::new(AtomicI64::new(0));
/// let table = EndpointTable::new().property("count", {
///     let count = count.clone();
///     move |raw| {
///         count.store(convert_argument(raw)?, Ordering::SeqCst);
///         Ok(())
///     }
/// });
///
/// table.find_property("Count").unwrap().set("42").unwrap();
/// assert_eq!(count.load(Ordering::SeqCst), 42);
/// ```
#[derive(Default)]
pub struct EndpointTable {
    properties: Vec<PropertyEndpoint>,
    methods: Vec<MethodEndpoint>,
}

impl EndpointTable {
    /// 创建空的端点表
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个属性端点
    pub fn property<F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&str) -> Result<()> + Send + Sync + 'static,
    {
        self.properties.push(PropertyEndpoint {
            name: name.into(),
            setter: Box::new(setter),
        });
        self
    }

    /// 登记一个方法端点
    ///
    /// 同名同参数个数的端点构成重载组，按登记顺序依次尝试。
    pub fn method<F>(mut self, name: impl Into<String>, arity: usize, invoker: F) -> Self
    where
        F: Fn(&[String]) -> Result<()> + Send + Sync + 'static,
    {
        self.methods.push(MethodEndpoint {
            name: name.into(),
            arity,
            invoker: Box::new(invoker),
        });
        self
    }

    /// 按名字查找属性端点（不区分大小写）
    pub fn find_property(&self, name: &str) -> Option<&PropertyEndpoint> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// 按名字与参数个数查找方法端点（不区分大小写）
    pub fn find_methods(&self, name: &str, arity: usize) -> Vec<&MethodEndpoint> {
        self.methods
            .iter()
            .filter(|m| m.arity == arity && m.name.eq_ignore_ascii_case(name))
            .collect()
    }

    /// 端点表是否为空
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty() && self.methods.is_empty()
    }
}

impl fmt::Debug for EndpointTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointTable")
            .field("properties", &self.properties.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

/// 把命令文本参数转换为原生类型
///
/// # Errors
///
/// 转换失败时返回 [`ModuleError::InvalidArgument`]，错误信息包含
/// 原始文本与目标类型。
pub fn convert_argument<T>(raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        ModuleError::InvalidArgument(format!(
            "无法把 '{}' 转换为 {}: {}",
            raw,
            std::any::type_name::<T>(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_property_lookup_case_insensitive() {
        let table = EndpointTable::new().property("Volume", |_raw| Ok(()));
        assert!(table.find_property("volume").is_some());
        assert!(table.find_property("VOLUME").is_some());
        assert!(table.find_property("bass").is_none());
    }

    #[test]
    fn test_method_lookup_by_name_and_arity() {
        let table = EndpointTable::new()
            .method("play", 0, |_args| Ok(()))
            .method("play", 1, |_args| Ok(()));

        assert_eq!(table.find_methods("play", 0).len(), 1);
        assert_eq!(table.find_methods("PLAY", 1).len(), 1);
        assert!(table.find_methods("play", 2).is_empty());
    }

    #[test]
    fn test_overload_group_preserves_order() {
        let calls = Arc::new(AtomicUsize::new(0));
        let table = EndpointTable::new()
            .method("f", 1, {
                let calls = calls.clone();
                move |_args| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(ModuleError::InvalidArgument("总是失败".to_string()))
                }
            })
            .method("f", 1, {
                let calls = calls.clone();
                move |_args| {
                    calls.fetch_add(10, Ordering::SeqCst);
                    Ok(())
                }
            });

        let overloads = table.find_methods("f", 1);
        assert_eq!(overloads.len(), 2);
        assert!(overloads[0].invoke(&["x".to_string()]).is_err());
        assert!(overloads[1].invoke(&["x".to_string()]).is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn test_convert_argument() {
        assert_eq!(convert_argument::<i64>("42").unwrap(), 42);
        assert_eq!(convert_argument::<f64>(" 728.3 ").unwrap(), 728.3);
        assert_eq!(
            convert_argument::<String>("text").unwrap(),
            "text".to_string()
        );
        assert!(matches!(
            convert_argument::<i64>("not-a-number"),
            Err(ModuleError::InvalidArgument(_))
        ));
    }
}
