//! # IPC 端到端测试
//!
//! 测试完整链路：客户端发送命令文本 → 帧解码 → 命令引擎 →
//! 模块端点执行。

use std::any::Any;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chips_modules::{
    command_handler, convert_argument, CommandEngine, EndpointTable, IpcClient, IpcConfig,
    IpcServer, Module, ModuleRegistration, ModuleRegistry,
};

/// 带一个整数端点的计数模块
struct CounterModule {
    count: Arc<AtomicI64>,
}

impl Module for CounterModule {
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn endpoints(&self) -> EndpointTable {
        EndpointTable::new().property("count", {
            let count = self.count.clone();
            move |raw| {
                count.store(convert_argument(raw)?, Ordering::SeqCst);
                Ok(())
            }
        })
    }
}

#[tokio::test]
async fn commands_flow_from_client_to_module() {
    let count = Arc::new(AtomicI64::new(0));

    let registry = Arc::new(ModuleRegistry::new());
    registry
        .register(
            ModuleRegistration::with_instance(
                "counter",
                Arc::new(CounterModule {
                    count: count.clone(),
                }),
            )
            .key("counter"),
        )
        .unwrap();
    registry.start().unwrap();

    let engine = Arc::new(CommandEngine::new(registry));
    let server = IpcServer::bind(IpcConfig::tcp("127.0.0.1", 0), command_handler(engine))
        .await
        .unwrap();
    let address = server.local_addr().unwrap();
    let server_task = tokio::spawn(server.serve());

    let config = IpcConfig::tcp("127.0.0.1", address.port());
    let mut client = IpcClient::connect(&config).await.unwrap();
    client.send("counter.count=42").await.unwrap();
    // 不构成命令的文本与执行失败的命令都不中断链路
    client.send("不是命令").await.unwrap();
    client.send("counter.missing=1").await.unwrap();
    client.send("counter.count=43").await.unwrap();
    drop(client);

    for _ in 0..100 {
        if count.load(Ordering::SeqCst) == 43 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(count.load(Ordering::SeqCst), 43);

    server_task.abort();
}
