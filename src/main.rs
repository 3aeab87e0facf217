//! crawl-console —— 爬虫任务控制台
//!
//! ```bash
//! crawl-console --base-url http://localhost:5000
//! RUST_LOG=crawl_console=debug crawl-console --config console.yaml
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc as std_mpsc;

use clap::Parser;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crawl_console::api::HttpDashboardApi;
use crawl_console::config::DashboardConfig;
use crawl_console::confirm::ConsoleConfirmer;
use crawl_console::dashboard::Dashboard;
use crawl_console::error::Result;
use crawl_console::repl::{Command, HELP, parse_command};
use crawl_console::view::Page;
use crawl_console::view::terminal::TerminalRenderer;

#[derive(Parser)]
#[command(name = "crawl-console", version, about = "爬虫任务控制台")]
struct Args {
    /// YAML 配置文件
    #[arg(short, long)]
    config: Option<String>,

    /// 后端根地址，覆盖配置文件和环境变量
    #[arg(long)]
    base_url: Option<String>,

    /// 任务列表轮询间隔（毫秒）
    #[arg(long)]
    poll_interval_ms: Option<u64>,

    /// 未设置 RUST_LOG 时使用的日志过滤
    #[arg(long, default_value = "crawl_console=info")]
    log_level: String,

    /// 关闭彩色输出
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone()))
        .with_target(false)
        .init();

    let config = load_config(&args)?;
    info!(base_url = %config.base_url, poll_ms = config.poll_interval_ms, "Console starting");

    let api = Arc::new(HttpDashboardApi::new(&config)?);
    let renderer = Arc::new(TerminalRenderer::new(!args.no_color));
    let (mut dashboard, mut nav_rx) =
        Dashboard::new(&config, api, renderer, Arc::new(ConsoleConfirmer));

    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    let (ack_tx, ack_rx) = std_mpsc::channel::<()>();
    std::thread::spawn(move || read_lines(line_tx, ack_rx));

    if let Err(e) = dashboard.enter(Page::Home).await {
        dashboard.report(&e);
    }
    println!("输入 help 查看可用命令");

    loop {
        tokio::select! {
            Some(page) = nav_rx.recv() => {
                if let Err(e) = dashboard.enter(page).await {
                    dashboard.report(&e);
                }
            }
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                let quit = handle_line(&mut dashboard, &line).await;
                let _ = ack_tx.send(());
                if quit {
                    break;
                }
            }
        }
    }

    dashboard.shutdown();
    Ok(())
}

/// 配置优先级：命令行 > 环境变量 > 配置文件 > 默认值
fn load_config(args: &Args) -> Result<DashboardConfig> {
    let config = match &args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };
    let mut overrides = Vec::new();
    if let Some(url) = &args.base_url {
        overrides.push(("CRAWL_CONSOLE_BASE_URL".to_string(), url.clone()));
    }
    if let Some(ms) = args.poll_interval_ms {
        overrides.push(("CRAWL_CONSOLE_POLL_INTERVAL_MS".to_string(), ms.to_string()));
    }
    config.apply_env()?.apply_vars(overrides)
}

/// 在独立线程中读取输入。每读到一行都等主循环处理完再读下一行，
/// 处理过程中的确认提示才能独占 stdin。
fn read_lines(tx: mpsc::UnboundedSender<String>, ack: std_mpsc::Receiver<()>) {
    let mut editor = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(e) => {
            warn!(error = %e, "Failed to initialise line editor");
            return;
        }
    };
    loop {
        match editor.readline("crawl> ") {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if tx.send(line).is_err() || ack.recv().is_err() {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                warn!(error = %e, "Readline error");
                break;
            }
        }
    }
}

/// 返回 `true` 表示退出
async fn handle_line(dashboard: &mut Dashboard, line: &str) -> bool {
    let command = match parse_command(line) {
        Ok(Some(command)) => command,
        Ok(None) => return false,
        Err(usage) => {
            dashboard.notifier().warning(usage);
            return false;
        }
    };

    let result = match command {
        Command::Quit => return true,
        Command::Help => {
            println!("{}", HELP);
            Ok(())
        }
        Command::Go(page) => dashboard.enter(page).await,
        Command::Set { field, value } => dashboard.set_field(&field, &value),
        Command::Check(field) => dashboard.check_field(&field).map(|_| ()),
        Command::Mode(mode) => dashboard.set_mode(&mode),
        Command::Toggle(field) => dashboard.toggle(&field).map(|_| ()),
        Command::Form => {
            dashboard.show_form();
            Ok(())
        }
        Command::Submit => {
            dashboard.submit().await;
            Ok(())
        }
        Command::Refresh => dashboard.refresh_tasks().await,
        Command::Detail(id) => dashboard.show_detail(&id).await,
        Command::Stop(id) => dashboard.stop_task(&id).await.map(|_| ()),
        Command::Close => {
            dashboard.close_modal();
            Ok(())
        }
        Command::Preview(name) => dashboard.preview(&name).await,
        Command::Download { name, dir } => {
            let dir = dir.unwrap_or_else(|| PathBuf::from("."));
            dashboard.download(&name, &dir).await.map(|_| ())
        }
    };

    if let Err(e) = result {
        dashboard.report(&e);
    }
    false
}
