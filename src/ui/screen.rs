//! 屏幕刷新
//!
//! 对话框的刷新定时器通过 [`Screen`] 绘制自身

use std::fmt;

use ratatui::{Terminal, backend::Backend};

use super::view::{DialogView, render_dialog};
use crate::error::{KernelError, Result};

pub trait Screen {
    fn refresh(&mut self, view: &DialogView<'_>) -> Result<()>;
}

/// 基于 ratatui 终端的屏幕
pub struct TerminalScreen<B: Backend> {
    terminal: Terminal<B>,
}

impl<B> TerminalScreen<B>
where
    B: Backend,
    B::Error: fmt::Display,
{
    pub fn new(backend: B) -> Result<Self> {
        let terminal = Terminal::new(backend).map_err(|e| KernelError::Render(e.to_string()))?;
        Ok(Self { terminal })
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }
}

impl<B> Screen for TerminalScreen<B>
where
    B: Backend,
    B::Error: fmt::Display,
{
    fn refresh(&mut self, view: &DialogView<'_>) -> Result<()> {
        self.terminal
            .draw(|frame| render_dialog(frame, view))
            .map(|_| ())
            .map_err(|e| KernelError::Render(e.to_string()))
    }
}
