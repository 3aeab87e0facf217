//! 交互命令解析

use std::path::PathBuf;

use crate::view::Page;

/// 一条交互命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(Page),
    Set { field: String, value: String },
    Check(String),
    Mode(String),
    Toggle(String),
    Form,
    Submit,
    Refresh,
    Detail(String),
    Stop(String),
    Close,
    Preview(String),
    Download { name: String, dir: Option<PathBuf> },
    Help,
    Quit,
}

pub const HELP: &str = "\
可用命令:
  home                    打开任务表单
  tasks                   打开任务列表（自动刷新）
  data                    打开数据文件列表
  set <字段> <值>         填写表单字段，例如 set keywords 露营 咖啡
  check <字段>            校验单个字段
  mode <search|detail|creator>
                          切换爬取类型
  toggle <字段>           勾选/取消 get_comments 或 get_sub_comments
  form                    显示当前表单
  submit                  提交任务
  refresh                 立即刷新任务列表
  detail <任务ID>         查看任务详情
  stop <任务ID>           停止运行中的任务
  close                   关闭弹窗
  preview <文件名>        预览数据文件
  download <文件名> [目录] 下载数据文件
  help                    显示本帮助
  quit                    退出";

/// 解析一行输入；空行返回 `Ok(None)`
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "home" => Command::Go(Page::Home),
        "tasks" => Command::Go(Page::Tasks),
        "data" => Command::Go(Page::Data),
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value.trim()),
                None => (rest, ""),
            };
            Command::Set {
                field: required(field, "set <字段> <值>")?,
                value: value.to_string(),
            }
        }
        "check" => Command::Check(required(rest, "check <字段>")?),
        "mode" => Command::Mode(required(rest, "mode <search|detail|creator>")?),
        "toggle" => Command::Toggle(required(rest, "toggle <字段>")?),
        "form" => Command::Form,
        "submit" => Command::Submit,
        "refresh" => Command::Refresh,
        "detail" => Command::Detail(required(rest, "detail <任务ID>")?),
        "stop" => Command::Stop(required(rest, "stop <任务ID>")?),
        "close" => Command::Close,
        "preview" => Command::Preview(required(rest, "preview <文件名>")?),
        "download" => {
            let mut parts = rest.split_whitespace();
            let name = required(parts.next().unwrap_or(""), "download <文件名> [目录]")?;
            Command::Download {
                name,
                dir: parts.next().map(PathBuf::from),
            }
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("未知命令: {}（输入 help 查看帮助）", other)),
    };
    Ok(Some(command))
}

fn required(arg: &str, usage: &str) -> Result<String, String> {
    if arg.is_empty() {
        Err(format!("用法: {}", usage))
    } else {
        Ok(arg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_commands() {
        assert_eq!(parse_command("tasks"), Ok(Some(Command::Go(Page::Tasks))));
        assert_eq!(parse_command("  HOME "), Ok(Some(Command::Go(Page::Home))));
        assert_eq!(parse_command(""), Ok(None));
    }

    #[test]
    fn test_set_keeps_spaces_in_value() {
        assert_eq!(
            parse_command("set keywords 露营 咖啡"),
            Ok(Some(Command::Set {
                field: "keywords".to_string(),
                value: "露营 咖啡".to_string(),
            }))
        );
        assert_eq!(
            parse_command("set keywords"),
            Ok(Some(Command::Set {
                field: "keywords".to_string(),
                value: String::new(),
            }))
        );
    }

    #[test]
    fn test_missing_argument_shows_usage() {
        assert_eq!(parse_command("stop"), Err("用法: stop <任务ID>".to_string()));
        assert!(parse_command("set").is_err());
    }

    #[test]
    fn test_download_with_optional_dir() {
        assert_eq!(
            parse_command("download a.csv ./out"),
            Ok(Some(Command::Download {
                name: "a.csv".to_string(),
                dir: Some(PathBuf::from("./out")),
            }))
        );
        assert!(matches!(
            parse_command("download a.csv"),
            Ok(Some(Command::Download { dir: None, .. }))
        ));
    }

    #[test]
    fn test_unknown_command() {
        assert!(parse_command("launch").unwrap_err().contains("launch"));
    }
}
