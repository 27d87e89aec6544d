//! 对话框状态定义 (Model)
//!
//! 包含对话框状态结构体、生命周期阶段以及结果写入器

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info};

use super::input::KeyBindings;
use super::view::DialogView;
use crate::container::OrderedContainer;
use crate::models::{DialogButtons, DialogType, Response, Widget, WidgetId};
use crate::runtime::LoopHandle;

/// 对话框生命周期阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogPhase {
    #[default]
    Constructed,
    AwaitingResponse,
    Resolved,
}

/// 结果写入器
///
/// 按钮回调、取消键和输入挂断都通过它写入结果；只有第一次写入生效，
/// 同时停止对话框私有的事件循环。
#[derive(Debug, Clone)]
pub struct Responder {
    phase: Rc<Cell<DialogPhase>>,
    response: Rc<Cell<Response>>,
    handle: LoopHandle,
}

impl Responder {
    pub(crate) fn new(handle: LoopHandle) -> Self {
        Self {
            phase: Rc::new(Cell::new(DialogPhase::Constructed)),
            response: Rc::new(Cell::new(Response::Unset)),
            handle,
        }
    }

    pub fn phase(&self) -> DialogPhase {
        self.phase.get()
    }

    pub fn response(&self) -> Response {
        self.response.get()
    }

    /// Constructed -> AwaitingResponse，其他阶段返回 false
    pub(crate) fn begin(&self) -> bool {
        if self.phase.get() != DialogPhase::Constructed {
            return false;
        }
        self.phase.set(DialogPhase::AwaitingResponse);
        true
    }

    /// 写入最终结果并停止循环，已经有结果时忽略
    pub fn resolve(&self, response: Response) -> bool {
        if self.phase.get() == DialogPhase::Resolved {
            debug!(%response, current = %self.response.get(), "dialog already resolved");
            return false;
        }

        self.response.set(response);
        self.phase.set(DialogPhase::Resolved);
        self.handle.stop();
        info!(%response, "dialog resolved");
        true
    }
}

/// 对话框状态
pub struct DialogState {
    pub id: WidgetId,
    pub kind: DialogType,
    pub allowed_buttons: DialogButtons,
    pub title: String,
    pub message: String,
    pub width: u16,
    pub height: u16,
    pub children: OrderedContainer<Widget>,
    pub buttons: OrderedContainer<Widget>,
    pub default_focus: Option<Rc<Widget>>,
    pub focus: Option<Rc<Widget>>,
    pub keybindings: KeyBindings,
    pub responder: Responder,
}

impl DialogState {
    /// 供渲染使用的只读视图
    pub fn view(&self) -> DialogView<'_> {
        DialogView {
            title: &self.title,
            message: &self.message,
            kind: self.kind,
            width: self.width,
            height: self.height,
            buttons: &self.buttons,
            focus: self.focus.as_ref(),
        }
    }
}
