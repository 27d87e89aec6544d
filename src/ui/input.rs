//! 键位表 (Key -> Action)
//!
//! 一个按键可以绑定多个 Action；查询按表中的优先级顺序进行，
//! 调用方依次尝试，直到某个 Action 被处理或候选耗尽。

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use super::actions::Action;
use crate::error::KernelError;

/// 与按下方式无关的按键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        // 字符和 BackTab 自带大小写/Shift 信息，忽略 Shift 修饰
        let modifiers = match code {
            KeyCode::Char(_) | KeyCode::BackTab => modifiers.difference(KeyModifiers::SHIFT),
            _ => modifiers,
        };
        // 终端把 Ctrl/Alt 组合键报告为小写字符
        let code = match code {
            KeyCode::Char(c) if modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
                KeyCode::Char(c.to_ascii_lowercase())
            }
            code => code,
        };
        Self { code, modifiers }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        Self::new(event.code, event.modifiers)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl-")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt-")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::F(n) => write!(f, "f{n}"),
            code => write!(f, "{}", format!("{code:?}").to_ascii_lowercase()),
        }
    }
}

impl FromStr for Key {
    type Err = KernelError;

    /// 解析 `esc`、`enter`、`ctrl-c`、`alt-x`、`f5`、`q` 等键名
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || KernelError::UnknownKey(s.to_string());
        let mut modifiers = KeyModifiers::NONE;
        let mut rest = s.trim();

        loop {
            let lower = rest.to_ascii_lowercase();
            let prefix = ["ctrl-", "ctrl+", "c-", "alt-", "alt+", "m-"]
                .into_iter()
                .find(|p| lower.starts_with(p) && rest.len() > p.len());
            let Some(prefix) = prefix else {
                break;
            };
            if prefix.starts_with('c') {
                modifiers |= KeyModifiers::CONTROL;
            } else {
                modifiers |= KeyModifiers::ALT;
            }
            rest = &rest[prefix.len()..];
        }

        let mut chars = rest.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self::new(KeyCode::Char(c), modifiers));
        }

        let code = match rest.to_ascii_lowercase().as_str() {
            "esc" | "escape" => KeyCode::Esc,
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backtab" | "shift-tab" => KeyCode::BackTab,
            "space" => KeyCode::Char(' '),
            "backspace" => KeyCode::Backspace,
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pgup" | "pageup" => KeyCode::PageUp,
            "pgdn" | "pagedown" => KeyCode::PageDown,
            other => {
                let n = other
                    .strip_prefix('f')
                    .and_then(|n| n.parse::<u8>().ok())
                    .filter(|n| (1..=12).contains(n))
                    .ok_or_else(unknown)?;
                KeyCode::F(n)
            }
        };
        Ok(Self::new(code, modifiers))
    }
}

/// 按优先级排列的键位表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    bindings: Vec<(Action, Vec<Key>)>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut bindings = Self::empty();
        bindings.set_keys(
            Action::Cancel,
            vec![Key::plain(KeyCode::Esc), Key::ctrl('c')],
        );
        bindings.set_keys(
            Action::Confirm,
            vec![Key::plain(KeyCode::Enter), Key::plain(KeyCode::Char(' '))],
        );
        bindings.set_keys(
            Action::NextField,
            vec![
                Key::plain(KeyCode::Tab),
                Key::plain(KeyCode::Right),
                Key::plain(KeyCode::Down),
            ],
        );
        bindings.set_keys(
            Action::PrevField,
            vec![
                Key::plain(KeyCode::BackTab),
                Key::plain(KeyCode::Left),
                Key::plain(KeyCode::Up),
            ],
        );
        bindings
    }

    /// 追加一个按键；Action 尚未出现时以最低优先级加入表尾
    pub fn bind(&mut self, action: Action, key: Key) {
        match self.bindings.iter_mut().find(|(a, _)| *a == action) {
            Some((_, keys)) if keys.contains(&key) => {}
            Some((_, keys)) => keys.push(key),
            None => self.bindings.push((action, vec![key])),
        }
    }

    /// 替换某个 Action 的全部按键，保持其优先级
    pub fn set_keys(&mut self, action: Action, keys: Vec<Key>) {
        match self.bindings.iter_mut().find(|(a, _)| *a == action) {
            Some((_, existing)) => *existing = keys,
            None => self.bindings.push((action, keys)),
        }
    }

    pub fn keys(&self, action: Action) -> &[Key] {
        self.bindings
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, keys)| keys.as_slice())
            .unwrap_or_default()
    }

    /// 查找 `after` 之后下一个绑定了 `key` 的 Action
    ///
    /// `after` 为 `None` 时从最高优先级开始；`after` 不在表中时返回 `None`。
    pub fn find_action(&self, key: Key, after: Option<Action>) -> Option<Action> {
        let start = match after {
            None => 0,
            Some(prev) => self.bindings.iter().position(|(a, _)| *a == prev)? + 1,
        };
        self.bindings[start..]
            .iter()
            .find(|(_, keys)| keys.contains(&key))
            .map(|(action, _)| *action)
    }

    /// 按优先级列出按键对应的全部 Action
    pub fn actions(&self, key: Key) -> impl Iterator<Item = Action> + '_ {
        self.bindings
            .iter()
            .filter(move |(_, keys)| keys.contains(&key))
            .map(|(action, _)| *action)
    }

    /// 应用配置中的键位覆盖，无法识别的 Action 名和键名记录警告后跳过
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, Vec<String>>) {
        for (name, key_names) in overrides {
            let action = match name.parse::<Action>() {
                Ok(action) => action,
                Err(err) => {
                    warn!(action = %name, error = %err, "ignoring keybinding override");
                    continue;
                }
            };

            let keys = key_names
                .iter()
                .filter_map(|key_name| match key_name.parse::<Key>() {
                    Ok(key) => Some(key),
                    Err(err) => {
                        warn!(action = %action, key = %key_name, error = %err, "ignoring key");
                        None
                    }
                })
                .collect();
            self.set_keys(action, keys);
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::with_defaults()
    }
}
