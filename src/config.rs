//! 配置加载
//!
//! 配置文件位于 `~/.config/tuikernel/config.toml`，不存在时使用默认值

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::ui::KeyBindings;

/// 刷新周期下限（毫秒），周期为 0 的定时器会让事件循环空转
pub const MIN_REFRESH_MS: u64 = 16;

/// 对话框尺寸与刷新配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    pub min_width: u16,
    pub min_height: u16,
    /// 屏幕刷新周期（毫秒）
    pub refresh_ms: u64,
    /// 非 Other 类型对话框为边框和按钮额外预留的宽度
    pub type_padding: u16,
}

impl DialogConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(MIN_REFRESH_MS))
    }

    /// 将过小的刷新周期提高到下限
    fn clamp_refresh(&mut self) {
        if self.refresh_ms < MIN_REFRESH_MS {
            warn!(
                refresh_ms = self.refresh_ms,
                min = MIN_REFRESH_MS,
                "refresh_ms too small, clamping"
            );
            self.refresh_ms = MIN_REFRESH_MS;
        }
    }
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            min_width: 40,
            min_height: 7,
            refresh_ms: 200,
            type_padding: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dialog: DialogConfig,
    /// Action 名 -> 键名列表，覆盖默认键位
    pub keybindings: BTreeMap<String, Vec<String>>,
}

impl Config {
    /// 默认键位叠加配置中的覆盖
    pub fn keybindings(&self) -> KeyBindings {
        let mut bindings = KeyBindings::with_defaults();
        bindings.apply_overrides(&self.keybindings);
        bindings
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn app_dir(base: Option<PathBuf>, what: &str) -> io::Result<PathBuf> {
    let dir = base
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no user {what} directory")))?
        .join("tuikernel");

    fs::create_dir_all(&dir)?;

    Ok(dir)
}

/// 获取配置目录路径 (~/.config/tuikernel/)
pub fn config_dir() -> io::Result<PathBuf> {
    app_dir(dirs::config_dir(), "config")
}

/// 获取数据目录路径 (~/.local/share/tuikernel/)
pub fn data_dir() -> io::Result<PathBuf> {
    app_dir(dirs::data_dir(), "data")
}

/// 从TOML文件加载配置
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        debug!(path = %path.display(), "config file missing, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    let mut config: Config = toml::from_str(&content)?;
    config.dialog.clamp_refresh();

    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::ui::{Action, Key};
    use crossterm::event::KeyCode;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dialog.refresh_interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[dialog]\nmin_width = 20\n\n[keybindings]\ncancel = [\"q\", \"esc\"]\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.dialog.min_width, 20);
        assert_eq!(config.dialog.min_height, DialogConfig::default().min_height);

        let bindings = config.keybindings();
        assert_eq!(
            bindings.find_action(Key::plain(KeyCode::Char('q')), None),
            Some(Action::Cancel)
        );
        assert_eq!(
            bindings.find_action(Key::plain(KeyCode::Enter), None),
            Some(Action::Confirm)
        );
    }

    #[test]
    fn test_zero_refresh_is_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dialog]\nrefresh_ms = 0\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.dialog.refresh_ms, MIN_REFRESH_MS);
        assert_eq!(
            config.dialog.refresh_interval(),
            Duration::from_millis(MIN_REFRESH_MS)
        );

        let built = DialogConfig {
            refresh_ms: 0,
            ..DialogConfig::default()
        };
        assert_eq!(
            built.refresh_interval(),
            Duration::from_millis(MIN_REFRESH_MS)
        );
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[dialog]\nmin_width = \"wide\"\n").unwrap();

        assert!(matches!(load_config(&path), Err(KernelError::Config(_))));
    }

    #[test]
    fn test_to_toml_loads_back() {
        let mut config = Config::default();
        config.dialog.refresh_ms = 50;
        config
            .keybindings
            .insert("confirm".to_string(), vec!["y".to_string()]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, config.to_toml().unwrap()).unwrap();
        assert_eq!(load_config(&path).unwrap(), config);
    }
}
