//! 向导命令解析

use std::path::PathBuf;
use thiserror::Error;

use crate::models::Stage;

/// 终端向导支持的命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Status,
    /// 显示当前参数
    Params,
    /// 校验当前参数
    Check,
    /// 从 TOML 文件读取参数
    Open(PathBuf),
    Start,
    Next,
    Back,
    Regen,
    /// 显示某阶段文本，缺省为当前阶段
    Show(Option<Stage>),
    /// 用文件内容覆盖某阶段文本
    Edit { stage: Stage, file: PathBuf },
    Restart,
    Save { name: String, force: bool },
    Load(String),
    Delete(String),
    List,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("请输入命令（输入 help 查看帮助）")]
    Empty,
    #[error("未知命令: {0}")]
    UnknownCommand(String),
    #[error("命令 {command} 缺少参数 <{argument}>")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("未知阶段: {0}（可选: matrix, specification, exam, answerKey, answerSupplement）")]
    UnknownStage(String),
}

pub const HELP: &str = "\
可用命令:
  help                  显示帮助
  status                显示当前状态
  params                显示当前参数
  check                 校验当前参数
  open <file.toml>      从 TOML 文件读取参数
  start                 用当前参数开始生成（从矩阵开始）
  next                  前进到下一阶段
  back                  返回上一阶段
  regen                 重新生成当前阶段（后续阶段会被清除）
  show [stage]          显示阶段内容
  edit <stage> <file>   用文件内容覆盖阶段内容
  restart               回到参数表单
  save <name>           保存当前参数（save! 覆盖同名配置）
  load <name>           读取保存的参数
  delete <name>         删除保存的参数
  list                  列出保存的参数
  quit                  退出";

impl Command {
    /// 解析一行输入
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word.to_lowercase().as_str() {
            "" => return Err(ParseError::Empty),
            "help" | "h" | "?" => Command::Help,
            "status" => Command::Status,
            "params" => Command::Params,
            "check" => Command::Check,
            "open" => Command::Open(PathBuf::from(required(rest, "open", "file")?)),
            "start" => Command::Start,
            "next" | "n" => Command::Next,
            "back" | "b" => Command::Back,
            "regen" | "regenerate" => Command::Regen,
            "show" => {
                if rest.is_empty() {
                    Command::Show(None)
                } else {
                    Command::Show(Some(parse_stage(rest)?))
                }
            }
            "edit" => {
                let rest = required(rest, "edit", "stage")?;
                let (stage, file) = match rest.split_once(char::is_whitespace) {
                    Some((stage, file)) => (stage, file.trim()),
                    None => (rest, ""),
                };
                Command::Edit {
                    stage: parse_stage(stage)?,
                    file: PathBuf::from(required(file, "edit", "file")?),
                }
            }
            "restart" => Command::Restart,
            "save" => Command::Save {
                name: required(rest, "save", "name")?.to_string(),
                force: false,
            },
            "save!" => Command::Save {
                name: required(rest, "save!", "name")?.to_string(),
                force: true,
            },
            "load" => Command::Load(required(rest, "load", "name")?.to_string()),
            "delete" => Command::Delete(required(rest, "delete", "name")?.to_string()),
            "list" | "ls" => Command::List,
            "quit" | "exit" | "q" => Command::Quit,
            _ => return Err(ParseError::UnknownCommand(word.to_string())),
        };

        Ok(command)
    }
}

fn required<'a>(
    value: &'a str,
    command: &'static str,
    argument: &'static str,
) -> Result<&'a str, ParseError> {
    if value.is_empty() {
        Err(ParseError::MissingArgument { command, argument })
    } else {
        Ok(value)
    }
}

fn parse_stage(s: &str) -> Result<Stage, ParseError> {
    Stage::parse(s).ok_or_else(|| ParseError::UnknownStage(s.to_string()))
}
