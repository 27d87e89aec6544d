//! 布局辅助函数

use ratatui::layout::Rect;

/// 在 `area` 中居中放置固定大小的矩形，超出部分截断到 `area` 内
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
