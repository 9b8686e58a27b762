//! IPC 进程间通信接口
//!
//! 点对点的进程间消息链路，用于从外部进程向运行中的宿主投递
//! 命令文本。链路是"发后不理"的单向消息流，不是请求/响应 RPC。
//!
//! # 传输
//!
//! - Unix Domain Socket（Unix/Linux/macOS）
//! - TCP 回环（跨平台备选方案）
//!
//! # 帧格式
//!
//! 每条消息帧为 4 字节小端长度前缀 + UTF-8 文本：
//!
//! ```text
//! ┌──────────────┬──────────────────┐
//! │ len (u32 LE) │ UTF-8 文本 (len) │
//! └──────────────┴──────────────────┘
//! ```
//!
//! 可选的数字消息 ID 随消息在进程内传递（[`IpcMessage::id`]），
//! 不进入帧格式。
//!
//! # 示例
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chips_modules::api::ipc::{command_handler, IpcConfig, IpcServer};
//! use chips_modules::{CommandEngine, ModuleRegistry};
//!
//! #[tokio::main]
//! async fn main() -> chips_modules::Result<()> {
//!     let registry = Arc::new(ModuleRegistry::new());
//!     // ... 注册模块并启动 ...
//!     let engine = Arc::new(CommandEngine::new(registry));
//!
//!     let config = IpcConfig::unix_socket("/tmp/chips-modules.sock");
//!     let server = IpcServer::bind(config, command_handler(engine)).await?;
//!     server.serve().await
//! }
//! ```

use std::net::SocketAddr;
#[cfg(unix)]
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
#[cfg(unix)]
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use crate::command::CommandEngine;
use crate::utils::{ModuleError, Result};

// ============================================================================
// 配置
// ============================================================================

/// IPC 传输类型
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcTransport {
    /// Unix Domain Socket（Unix/Linux/macOS）
    #[cfg(unix)]
    Unix(PathBuf),
    /// TCP 回环（跨平台）
    Tcp(String, u16),
}

impl Default for IpcTransport {
    fn default() -> Self {
        #[cfg(unix)]
        {
            IpcTransport::Unix(PathBuf::from("/tmp/chips-modules.sock"))
        }
        #[cfg(not(unix))]
        {
            IpcTransport::Tcp("127.0.0.1".to_string(), 9630)
        }
    }
}

/// IPC 配置
#[derive(Debug, Clone)]
pub struct IpcConfig {
    /// 传输类型
    pub transport: IpcTransport,
    /// 连接超时（毫秒）
    pub connect_timeout_ms: u64,
    /// 单条消息的最大长度（字节）
    pub max_frame_bytes: usize,
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            transport: IpcTransport::default(),
            connect_timeout_ms: 5000,
            max_frame_bytes: 64 * 1024,
        }
    }
}

impl IpcConfig {
    /// 创建 Unix Socket 配置
    #[cfg(unix)]
    pub fn unix_socket(path: impl Into<PathBuf>) -> Self {
        Self {
            transport: IpcTransport::Unix(path.into()),
            ..Default::default()
        }
    }

    /// 创建 TCP 配置
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self {
            transport: IpcTransport::Tcp(host.into(), port),
            ..Default::default()
        }
    }
}

// ============================================================================
// 消息
// ============================================================================

/// IPC 消息
///
/// 链路上只承载文本；消息 ID 是进程内的可选关联信息，服务端为
/// 每条收到的消息按连接顺序编号。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpcMessage {
    /// 可选的消息 ID
    pub id: Option<u16>,
    /// 消息文本
    pub text: String,
}

impl IpcMessage {
    /// 创建不带 ID 的消息
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }

    /// 创建带 ID 的消息
    pub fn with_id(id: u16, text: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            text: text.into(),
        }
    }
}

/// 收到消息时的回调
pub type MessageHandler = Arc<dyn Fn(IpcMessage) + Send + Sync>;

/// 构造把收到的命令文本交给命令引擎执行的回调
///
/// 链路是发后不理的，执行错误只记录日志，不回传给发送方。
pub fn command_handler(engine: Arc<CommandEngine>) -> MessageHandler {
    Arc::new(move |message: IpcMessage| match engine.execute(&message.text) {
        Ok(true) => {}
        Ok(false) => debug!(id = ?message.id, "收到的文本不构成命令"),
        Err(e) => warn!(id = ?message.id, error = %e, "IPC 命令执行失败"),
    })
}

// ============================================================================
// 帧编解码
// ============================================================================

/// 写出一帧：4 字节小端长度前缀 + UTF-8 文本
pub(crate) async fn write_frame<W>(writer: &mut W, text: &str) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let data = text.as_bytes();
    let length = (data.len() as u32).to_le_bytes();
    writer.write_all(&length).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

/// 读入一帧；对端正常关闭时返回 `Ok(None)`
pub(crate) async fn read_frame<R>(reader: &mut R, max_frame_bytes: usize) -> Result<Option<String>>
where
    R: AsyncRead + Unpin,
{
    let mut length_buffer = [0u8; 4];
    match reader.read_exact(&mut length_buffer).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }

    let length = u32::from_le_bytes(length_buffer) as usize;
    if length > max_frame_bytes {
        return Err(ModuleError::Internal(format!(
            "IPC 消息长度 {} 超过上限 {}",
            length, max_frame_bytes
        )));
    }

    let mut payload = vec![0u8; length];
    reader.read_exact(&mut payload).await?;
    let text = String::from_utf8(payload)
        .map_err(|e| ModuleError::Internal(format!("IPC 消息不是有效的 UTF-8: {}", e)))?;
    Ok(Some(text))
}

// ============================================================================
// 服务端
// ============================================================================

/// IPC 服务端
///
/// 监听传输端点，为每个连接读取消息帧并交给回调处理。
pub struct IpcServer {
    listener: Listener,
    handler: MessageHandler,
    max_frame_bytes: usize,
}

enum Listener {
    #[cfg(unix)]
    Unix(UnixListener),
    Tcp(TcpListener),
}

impl IpcServer {
    /// 绑定传输端点
    ///
    /// Unix Socket 模式下会先移除残留的 socket 文件。
    pub async fn bind(config: IpcConfig, handler: MessageHandler) -> Result<Self> {
        let listener = match &config.transport {
            #[cfg(unix)]
            IpcTransport::Unix(path) => {
                if path.exists() {
                    tokio::fs::remove_file(path).await?;
                }
                let listener = UnixListener::bind(path)?;
                info!(path = %path.display(), "IPC 服务端已绑定 Unix Socket");
                Listener::Unix(listener)
            }
            IpcTransport::Tcp(host, port) => {
                let listener = TcpListener::bind((host.as_str(), *port)).await?;
                info!(address = %listener.local_addr()?, "IPC 服务端已绑定 TCP");
                Listener::Tcp(listener)
            }
        };
        Ok(Self {
            listener,
            handler,
            max_frame_bytes: config.max_frame_bytes,
        })
    }

    /// TCP 模式下实际绑定的地址（端口 0 时由系统分配）
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.listener {
            Listener::Tcp(listener) => listener.local_addr().ok(),
            #[cfg(unix)]
            Listener::Unix(_) => None,
        }
    }

    /// 运行接收循环
    ///
    /// 每个连接在独立任务中读取消息帧，直到对端关闭。
    pub async fn serve(self) -> Result<()> {
        let handler = self.handler;
        let max_frame_bytes = self.max_frame_bytes;
        match self.listener {
            #[cfg(unix)]
            Listener::Unix(listener) => loop {
                let (stream, _addr) = listener.accept().await?;
                debug!("接受 IPC 连接 (unix)");
                let handler = handler.clone();
                tokio::spawn(async move {
                    read_connection(stream, handler, max_frame_bytes).await;
                });
            },
            Listener::Tcp(listener) => loop {
                let (stream, addr) = listener.accept().await?;
                debug!(peer = %addr, "接受 IPC 连接 (tcp)");
                let handler = handler.clone();
                tokio::spawn(async move {
                    read_connection(stream, handler, max_frame_bytes).await;
                });
            },
        }
    }
}

/// 读取单个连接上的消息帧，按连接顺序为消息编号
async fn read_connection<S>(mut stream: S, handler: MessageHandler, max_frame_bytes: usize)
where
    S: AsyncRead + Unpin,
{
    let mut next_id: u16 = 0;
    loop {
        match read_frame(&mut stream, max_frame_bytes).await {
            Ok(Some(text)) => {
                let message = IpcMessage::with_id(next_id, text);
                next_id = next_id.wrapping_add(1);
                handler(message);
            }
            Ok(None) => {
                debug!("IPC 连接关闭");
                return;
            }
            Err(e) => {
                warn!(error = %e, "IPC 连接读取失败");
                return;
            }
        }
    }
}

// ============================================================================
// 客户端
// ============================================================================

/// IPC 客户端
///
/// 连接到服务端并发送消息帧；发后不理，没有响应。
pub struct IpcClient {
    stream: ClientStream,
}

enum ClientStream {
    #[cfg(unix)]
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl IpcClient {
    /// 连接到服务端
    pub async fn connect(config: &IpcConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.connect_timeout_ms);
        let stream = match &config.transport {
            #[cfg(unix)]
            IpcTransport::Unix(path) => {
                let stream = tokio::time::timeout(timeout, UnixStream::connect(path))
                    .await
                    .map_err(|_| ModuleError::Internal("IPC 连接超时".to_string()))??;
                ClientStream::Unix(stream)
            }
            IpcTransport::Tcp(host, port) => {
                let stream =
                    tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), *port)))
                        .await
                        .map_err(|_| ModuleError::Internal("IPC 连接超时".to_string()))??;
                ClientStream::Tcp(stream)
            }
        };
        Ok(Self { stream })
    }

    /// 发送一条文本消息
    pub async fn send(&mut self, text: &str) -> Result<()> {
        match &mut self.stream {
            #[cfg(unix)]
            ClientStream::Unix(stream) => write_frame(stream, text).await,
            ClientStream::Tcp(stream) => write_frame(stream, text).await,
        }
    }

    /// 发送一条消息（ID 仅进程内使用，不进入帧格式）
    pub async fn send_message(&mut self, message: &IpcMessage) -> Result<()> {
        self.send(&message.text).await
    }
}
