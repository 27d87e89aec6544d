//! 输入就绪源
//!
//! 事件循环通过 [`InputSource`] 等待输入：终端使用 crossterm，
//! 测试使用预先排好的脚本。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

/// 输入源在一次等待中报告的状态
#[derive(Debug)]
pub enum InputReady {
    /// 可读，附带读到的事件
    Event(Event),
    /// 读取失败
    Error(io::Error),
    /// 输入端已关闭
    Hangup,
}

/// 字节流输入的就绪通知原语
pub trait InputSource {
    /// 最多等待 `timeout`，超时且没有事件时返回 `None`
    fn poll(&mut self, timeout: Duration) -> Option<InputReady>;
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn poll(&mut self, timeout: Duration) -> Option<InputReady> {
        (**self).poll(timeout)
    }
}

/// 标准输入（通过 crossterm 读取终端事件）
#[derive(Debug, Default)]
pub struct CrosstermInput;

impl InputSource for CrosstermInput {
    fn poll(&mut self, timeout: Duration) -> Option<InputReady> {
        match event::poll(timeout) {
            Ok(true) => match event::read() {
                Ok(ev) => Some(InputReady::Event(ev)),
                Err(err) => Some(InputReady::Error(err)),
            },
            Ok(false) => None,
            Err(err) => Some(InputReady::Error(err)),
        }
    }
}

/// 脚本化输入：按顺序吐出事件，脚本耗尽后报告挂断
///
/// 克隆体共享同一个队列，可以在事件循环结束后检查剩余未读的步骤。
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    steps: Rc<RefCell<VecDeque<Option<Event>>>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(self, ev: Event) -> Self {
        self.steps.borrow_mut().push_back(Some(ev));
        self
    }

    pub fn key(self, code: KeyCode) -> Self {
        self.key_with(code, KeyModifiers::NONE)
    }

    pub fn key_with(self, code: KeyCode, modifiers: KeyModifiers) -> Self {
        self.event(Event::Key(KeyEvent::new(code, modifiers)))
    }

    /// 一次没有任何事件的等待
    pub fn idle(self) -> Self {
        self.steps.borrow_mut().push_back(None);
        self
    }

    pub fn pending(&self) -> usize {
        self.steps.borrow().len()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, _timeout: Duration) -> Option<InputReady> {
        match self.steps.borrow_mut().pop_front() {
            Some(Some(ev)) => Some(InputReady::Event(ev)),
            Some(None) => None,
            None => Some(InputReady::Hangup),
        }
    }
}
