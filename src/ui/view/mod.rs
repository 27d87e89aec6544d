//! 视图层模块
//!
//! 纯函数：将对话框状态映射为 UI

pub mod components;
pub mod layouts;

use std::rc::Rc;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    widgets::{Paragraph, Wrap},
};

use crate::container::OrderedContainer;
use crate::models::{DialogType, Widget};
use components::{button_row, button_span, render_dialog_framework};
use layouts::centered_fixed;

/// 渲染所需的对话框只读视图
#[derive(Debug, Clone, Copy)]
pub struct DialogView<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub kind: DialogType,
    pub width: u16,
    pub height: u16,
    pub buttons: &'a OrderedContainer<Widget>,
    pub focus: Option<&'a Rc<Widget>>,
}

impl DialogView<'_> {
    pub fn is_focused(&self, button: &Rc<Widget>) -> bool {
        self.focus.is_some_and(|focus| Rc::ptr_eq(focus, button))
    }
}

/// 对话框类型对应的边框颜色
pub fn kind_color(kind: DialogType) -> Color {
    match kind {
        DialogType::Other => Color::Reset,
        DialogType::Info => Color::Cyan,
        DialogType::Warning => Color::Yellow,
        DialogType::Confirmation => Color::Blue,
        DialogType::Error => Color::Red,
    }
}

/// 渲染对话框：居中边框、正文、底部按钮行
pub fn render_dialog(frame: &mut Frame, view: &DialogView<'_>) {
    let area = centered_fixed(view.width, view.height, frame.area());
    let inner = render_dialog_framework(frame, area, view.title, kind_color(view.kind));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // 标题下留白
            Constraint::Min(1),    // 正文
            Constraint::Length(2), // 按钮
        ])
        .split(inner);

    let message = Paragraph::new(view.message).wrap(Wrap { trim: false });
    frame.render_widget(message, chunks[1]);

    render_buttons(frame, chunks[2], view);
}

fn render_buttons(frame: &mut Frame, area: Rect, view: &DialogView<'_>) {
    let mut visible = view.buttons.filtered().with_filter(Widget::is_visible);
    if area.height == 0 || visible.count_matching() == 0 {
        return;
    }

    let row = Rect {
        y: area.y + area.height - 1,
        height: 1,
        ..area
    };
    let spans = visible.map(|button| button_span(button, view.is_focused(button)));
    frame.render_widget(button_row(spans), row);
}
