//! UI 模块
//!
//! 采用 MVI (Model-View-Intent) 架构：
//! - Model (state.rs): 对话框状态与结果写入器
//! - View (view/): 纯函数，将状态映射为 UI
//! - Intent (actions.rs, input.rs): 按键经键位表转化为语义化 Action
//! - logic.rs 分三层分发 Action，dialog.rs 负责构建和运行模态对话框

pub mod actions;
pub mod dialog;
pub mod input;
mod logic;
pub mod screen;
pub mod state;
pub mod view;

// Re-export for convenience
pub use actions::Action;
pub use dialog::{BUTTON_NO_LABEL, BUTTON_YES_LABEL, Dialog, DialogBuilder, dialog_geometry};
pub use input::{Key, KeyBindings};
pub use screen::{Screen, TerminalScreen};
pub use state::{DialogPhase, DialogState, Responder};
pub use view::{DialogView, render_dialog};
