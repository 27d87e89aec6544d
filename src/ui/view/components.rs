//! 通用 UI 组件
//!
//! 对话框边框、按钮等通用组件

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear},
};

use crate::models::Widget;

/// [组件] 弹窗基础框架，返回边框内部区域
pub fn render_dialog_framework(frame: &mut Frame, area: Rect, title: &str, color: Color) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}

/// [组件] 单个按钮，焦点按钮反色加粗
pub fn button_span(button: &Widget, focused: bool) -> Span<'_> {
    let style = if focused {
        Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
    } else {
        Style::default()
    };
    Span::styled(button.text(), style)
}

/// [组件] 居中的一行按钮，按钮之间空两格
pub fn button_row<'a>(spans: impl IntoIterator<Item = Span<'a>>) -> Line<'a> {
    let mut row = Vec::new();
    for span in spans {
        if !row.is_empty() {
            row.push(Span::raw("  "));
        }
        row.push(span);
    }
    Line::from(row).centered()
}
