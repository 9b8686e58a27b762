//! 命令文本解析器
//!
//! 把单行命令文本解析为结构化的 [`ModuleCommand`]。支持两种形式：
//!
//! - `模块.端点=值` - 属性设置
//! - `模块.端点(参数1,参数2,...)` - 方法调用
//!
//! `.`、`(`、`)`、`,`、`=` 是结构字符，不支持转义。解析是线性的
//! 单趟扫描；无法识别的文本返回 `None`（"不是命令"），而不是错误。

/// 命令类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// 设置一个属性值
    Property,
    /// 调用一个方法
    Method,
}

/// 解析后的模块命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCommand {
    /// 目标模块（按键寻址）
    pub module: String,
    /// 端点名
    pub endpoint: String,
    /// 命令类型
    pub kind: CommandKind,
    /// 参数（原始文本）
    pub arguments: Vec<String>,
}

/// 从字符串解析一条命令
///
/// # Returns
///
/// 识别出命令时返回 `Some(ModuleCommand)`；文本不构成命令时返回
/// `None`。
///
/// # 示例
///
/// ```rust
/// use chips_modules::command::{parse_command, CommandKind};
///
/// let command = parse_command("player.volume=75").unwrap();
/// assert_eq!(command.module, "player");
/// assert_eq!(command.endpoint, "volume");
/// assert_eq!(command.kind, CommandKind::Property);
/// assert_eq!(command.arguments, vec!["75".to_string()]);
///
/// assert!(parse_command("这不是命令").is_none());
/// ```
pub fn parse_command(data: &str) -> Option<ModuleCommand> {
    let mut module = String::new();
    let mut endpoint = String::new();
    let mut kind = None;
    let mut arguments = Vec::new();

    let mut start = 0usize;
    for (index, ch) in data.char_indices() {
        match ch {
            '.' => {
                module = data[start..index].to_string();
                start = index + 1;
            }
            '=' => {
                kind = Some(CommandKind::Property);
                endpoint = data[start..index].trim().to_string();
                arguments = parse_arguments(&data[index + 1..]);
                break;
            }
            '(' => {
                kind = Some(CommandKind::Method);
                endpoint = data[start..index].trim().to_string();
                arguments = parse_arguments(&data[index + 1..]);
                break;
            }
            _ => {}
        }
    }

    kind.map(|kind| ModuleCommand {
        module,
        endpoint,
        kind,
        arguments,
    })
}

/// 解析参数串，按 `,` 分段、遇 `)` 终止；空段被跳过
fn parse_arguments(data: &str) -> Vec<String> {
    let mut arguments = Vec::new();
    let mut start = 0usize;
    for (index, ch) in data.char_indices() {
        match ch {
            ')' => {
                if index != start {
                    arguments.push(data[start..index].to_string());
                }
                return arguments;
            }
            ',' => {
                if index != start {
                    arguments.push(data[start..index].to_string());
                }
                start = index + 1;
            }
            _ => {}
        }
    }
    if data.len() != start {
        arguments.push(data[start..].to_string());
    }
    arguments
}
