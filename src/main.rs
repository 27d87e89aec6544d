use std::io;
use std::process::ExitCode;

use crossterm::{
    cursor::Show,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::CrosstermBackend;
use tracing::{error, warn};

use tuikernel::config::{Config, config_dir, data_dir, load_config};
use tuikernel::ui::TerminalScreen;
use tuikernel::{Dialog, DialogButtons, DialogType, Response};

/// 进入 raw mode 与备用屏幕，析构时恢复终端
struct TerminalGuard {
    active: bool,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err);
        }
        Ok(Self { active: true })
    }

    /// 尽力恢复：每一步都尝试，返回遇到的第一个错误
    fn restore(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let mut first_err = None;
        if let Err(err) = disable_raw_mode() {
            first_err.get_or_insert(err);
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
            first_err.get_or_insert(err);
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(Response::Yes) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(err) => {
            error!(error = %err, "tuikernel failed");
            eprintln!("tuikernel: {err}");
            ExitCode::from(2)
        }
    }
}

fn run() -> tuikernel::Result<Response> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // 配置文件 (~/.config/tuikernel/config.toml)
    let config_path = config_dir()?.join("config.toml");
    let config = load_config(&config_path)?;

    if args.iter().any(|arg| arg == "--print-config") {
        print!("{}", config.to_toml()?);
        return Ok(Response::Yes);
    }

    // 日志 (~/.local/share/tuikernel/logs/)
    let _logging = data_dir()
        .ok()
        .and_then(|dir| tuikernel::logging::init(&dir.join("logs")));

    let builder = dialog_from_args(&config, &args);

    // 设置终端
    let mut guard = TerminalGuard::enter()?;
    let screen = TerminalScreen::new(CrosstermBackend::new(io::stdout()))?;
    let mut dialog = builder.screen(screen).build()?;

    let response = dialog.run();

    // 恢复终端
    guard.restore()?;

    println!("{response}");
    Ok(response)
}

/// 默认是 Yes/No 确认框，`key=value` 参数逐个覆盖
fn dialog_from_args(config: &Config, args: &[String]) -> tuikernel::DialogBuilder {
    let mut builder = Dialog::builder()
        .kind(DialogType::Confirmation)
        .buttons(DialogButtons::YesNo)
        .title("tuikernel")
        .message("Continue?")
        .config(config.dialog.clone())
        .keybindings(config.keybindings());

    for arg in args {
        match arg.split_once('=') {
            Some((name, value)) => builder = builder.property(name, value),
            None => warn!(arg = %arg, "ignoring argument without '='"),
        }
    }
    builder
}
