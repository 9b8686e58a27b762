//! # 命令协议集成测试
//!
//! 测试命令文本从解析到端点执行的完整链路：属性设置、方法调用、
//! 重载选择和原始命令处理能力。

use std::any::Any;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use chips_modules::{
    convert_argument, CommandEngine, CommandProcessor, EndpointTable, Module, ModuleError,
    ModuleRegistration, ModuleRegistry, Result,
};

// ============================================================================
// 测试辅助结构
// ============================================================================

/// 测试用的播放模式枚举，演示自定义类型的文本转换
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaybackMode {
    Primary,
    Shuffle,
}

impl FromStr for PlaybackMode {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "primary" => Ok(PlaybackMode::Primary),
            "shuffle" => Ok(PlaybackMode::Shuffle),
            other => Err(format!("未知的播放模式 '{}'", other)),
        }
    }
}

/// 命令测试模块，镜像命令协议能访问的各类端点
struct TestCallModule {
    test_string: Arc<Mutex<String>>,
    test_int: Arc<AtomicI64>,
    test_double: Arc<Mutex<f64>>,
    mode: Arc<Mutex<PlaybackMode>>,
    last_method: Arc<Mutex<Option<String>>>,
    zero_arg_calls: Arc<AtomicUsize>,
    raw_commands: Mutex<Vec<String>>,
}

impl TestCallModule {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            test_string: Arc::new(Mutex::new(String::new())),
            test_int: Arc::new(AtomicI64::new(0)),
            test_double: Arc::new(Mutex::new(0.0)),
            mode: Arc::new(Mutex::new(PlaybackMode::Primary)),
            last_method: Arc::new(Mutex::new(None)),
            zero_arg_calls: Arc::new(AtomicUsize::new(0)),
            raw_commands: Mutex::new(Vec::new()),
        })
    }
}

impl CommandProcessor for TestCallModule {
    fn process_command(&self, command: &str, arguments: &[String]) -> Result<()> {
        self.raw_commands
            .lock()
            .push(format!("{}({})", command, arguments.join(",")));
        Ok(())
    }
}

impl Module for TestCallModule {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_command_processor(&self) -> Option<&dyn CommandProcessor> {
        Some(self)
    }

    fn endpoints(&self) -> EndpointTable {
        EndpointTable::new()
            .property("teststring", {
                let value = self.test_string.clone();
                move |raw| {
                    *value.lock() = raw.to_string();
                    Ok(())
                }
            })
            .property("testint", {
                let value = self.test_int.clone();
                move |raw| {
                    value.store(convert_argument(raw)?, Ordering::SeqCst);
                    Ok(())
                }
            })
            .property("testdouble", {
                let value = self.test_double.clone();
                move |raw| {
                    *value.lock() = convert_argument(raw)?;
                    Ok(())
                }
            })
            .property("mode", {
                let value = self.mode.clone();
                move |raw| {
                    *value.lock() = convert_argument(raw)?;
                    Ok(())
                }
            })
            .method("testmethod", 0, {
                let calls = self.zero_arg_calls.clone();
                let last = self.last_method.clone();
                move |_args| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    *last.lock() = Some("testmethod".to_string());
                    Ok(())
                }
            })
            .method("testmethod2", 1, {
                let last = self.last_method.clone();
                move |_args| {
                    *last.lock() = Some("testmethod2".to_string());
                    Ok(())
                }
            })
            .method("testmethod3", 3, {
                let last = self.last_method.clone();
                move |args| {
                    // 类型转换失败时整个重载失败
                    let _first: String = convert_argument(&args[0])?;
                    let _second: i64 = convert_argument(&args[1])?;
                    let _third: f64 = convert_argument(&args[2])?;
                    *last.lock() = Some("testmethod3".to_string());
                    Ok(())
                }
            })
            // 同名同参数个数的重载组：先试整数版本，再试文本版本
            .method("apply", 1, {
                let last = self.last_method.clone();
                move |args| {
                    let _value: i64 = convert_argument(&args[0])?;
                    *last.lock() = Some("apply:int".to_string());
                    Ok(())
                }
            })
            .method("apply", 1, {
                let last = self.last_method.clone();
                move |args| {
                    *last.lock() = Some(format!("apply:text:{}", args[0]));
                    Ok(())
                }
            })
    }
}

fn command_engine() -> (CommandEngine, Arc<TestCallModule>) {
    let module = TestCallModule::new();
    let registry = Arc::new(ModuleRegistry::new());
    registry
        .register(ModuleRegistration::with_instance("testcall", module.clone()).key("testcall"))
        .unwrap();
    registry.start().unwrap();
    (CommandEngine::new(registry), module)
}

// ============================================================================
// 属性设置
// ============================================================================

#[test]
fn set_string_property() {
    let (engine, module) = command_engine();
    assert!(engine.execute("testcall.teststring=rudellopf").unwrap());
    assert_eq!(*module.test_string.lock(), "rudellopf");
}

#[test]
fn set_int_property() {
    let (engine, module) = command_engine();
    assert!(engine.execute("testcall.testint=822").unwrap());
    assert_eq!(module.test_int.load(Ordering::SeqCst), 822);
}

#[test]
fn set_double_property() {
    let (engine, module) = command_engine();
    assert!(engine.execute("testcall.testdouble=728.3").unwrap());
    assert_eq!(*module.test_double.lock(), 728.3);
}

#[test]
fn set_enum_property() {
    let (engine, module) = command_engine();
    assert!(engine.execute("testcall.mode=shuffle").unwrap());
    assert_eq!(*module.mode.lock(), PlaybackMode::Shuffle);
}

#[test]
fn property_name_is_case_insensitive() {
    let (engine, module) = command_engine();
    assert!(engine.execute("testcall.TestString=value").unwrap());
    assert_eq!(*module.test_string.lock(), "value");
}

#[test]
fn property_conversion_failure_propagates() {
    let (engine, module) = command_engine();
    let result = engine.execute("testcall.testint=八百二十二");
    assert!(matches!(result, Err(ModuleError::InvalidArgument(_))));
    assert_eq!(module.test_int.load(Ordering::SeqCst), 0);
}

// ============================================================================
// 方法调用
// ============================================================================

#[test]
fn zero_arg_method_invoked_exactly_once() {
    let (engine, module) = command_engine();
    assert!(engine.execute("testcall.testmethod()").unwrap());
    assert_eq!(module.zero_arg_calls.load(Ordering::SeqCst), 1);
    assert_eq!(module.last_method.lock().as_deref(), Some("testmethod"));
}

#[test]
fn single_arg_method() {
    let (engine, module) = command_engine();
    assert!(engine.execute("testcall.testmethod2(something)").unwrap());
    assert_eq!(module.last_method.lock().as_deref(), Some("testmethod2"));
}

#[test]
fn three_arg_method_with_conversions() {
    let (engine, module) = command_engine();
    assert!(engine
        .execute("testcall.testmethod3(something,144,232.1)")
        .unwrap());
    assert_eq!(module.last_method.lock().as_deref(), Some("testmethod3"));
}

#[test]
fn missing_overload_raises() {
    let (engine, module) = command_engine();
    // 没有 3 参数的 testmethod 重载
    let result = engine.execute("testcall.testmethod(1,2,3)");
    assert!(matches!(result, Err(ModuleError::NoMatchingOverload(_))));
    assert_eq!(module.zero_arg_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn overload_first_match_wins() {
    let (engine, module) = command_engine();
    assert!(engine.execute("testcall.apply(12)").unwrap());
    assert_eq!(module.last_method.lock().as_deref(), Some("apply:int"));
}

#[test]
fn failing_overload_is_swallowed_and_next_tried() {
    let (engine, module) = command_engine();
    // 整数重载转换失败后回落到文本重载
    assert!(engine.execute("testcall.apply(notanumber)").unwrap());
    assert_eq!(
        module.last_method.lock().as_deref(),
        Some("apply:text:notanumber")
    );
}

// ============================================================================
// 解析与查找边界
// ============================================================================

#[test]
fn unrecognized_text_is_not_an_error() {
    let (engine, _module) = command_engine();
    assert!(!engine.execute("just some text").unwrap());
    assert!(!engine.execute("").unwrap());
}

#[test]
fn unknown_module_key() {
    let (engine, _module) = command_engine();
    let result = engine.execute("ghost.value=1");
    assert!(matches!(result, Err(ModuleError::ModuleNotFound(_))));
}

// ============================================================================
// 原始命令处理能力
// ============================================================================

#[test]
fn raw_command_processor_receives_tokens() {
    let (engine, module) = command_engine();
    engine
        .execute_raw(
            "testcall",
            "rescan",
            &["fast".to_string(), "deep".to_string()],
        )
        .unwrap();
    assert_eq!(
        module.raw_commands.lock().as_slice(),
        &["rescan(fast,deep)".to_string()]
    );
}

#[test]
fn raw_command_requires_capability() {
    struct MuteModule;

    impl Module for MuteModule {
        fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
            self
        }
    }

    let registry = Arc::new(ModuleRegistry::new());
    registry
        .register(ModuleRegistration::with_instance("mute", Arc::new(MuteModule)).key("mute"))
        .unwrap();
    registry.start().unwrap();
    let engine = CommandEngine::new(registry);

    let result = engine.execute_raw("mute", "anything", &[]);
    assert!(matches!(result, Err(ModuleError::ModuleCommand(_))));
}
