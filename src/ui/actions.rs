//! Action 枚举定义
//!
//! 按键经由键位表转换为语义化的 Action

use std::fmt;
use std::str::FromStr;

/// 用户操作枚举
///
/// 变体顺序即键位表的默认优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Cancel,    // Esc / Ctrl-C
    Confirm,   // Enter / Space，激活焦点按钮
    NextField, // Tab，焦点移到下一个按钮
    PrevField, // Shift-Tab
}

impl Action {
    pub const ALL: [Action; 4] = [
        Action::Cancel,
        Action::Confirm,
        Action::NextField,
        Action::PrevField,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Cancel => "cancel",
            Action::Confirm => "confirm",
            Action::NextField => "next_field",
            Action::PrevField => "prev_field",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Action::ALL
            .into_iter()
            .find(|action| action.name() == normalized)
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}
