//! 按键处理 (Update/Dispatch)
//!
//! 按键依次交给三层处理：焦点按钮（Confirm 激活按钮）、窗口（在按钮间移动
//! 焦点）、对话框本身（只处理 Cancel）。每层都按键位表的优先级尝试候选
//! Action，遇到本层不认识的 Action 就继续看下一个。

use std::rc::Rc;

use crossterm::event::{KeyEvent, KeyEventKind};
use tracing::{debug, trace};

use super::actions::Action;
use super::input::Key;
use super::state::DialogState;
use crate::models::{Response, Widget};

impl DialogState {
    /// 处理一次按键，返回是否被某一层消费
    pub fn handle_key(&mut self, event: KeyEvent) -> bool {
        if event.kind != KeyEventKind::Press {
            return false;
        }

        let key = Key::from(event);
        let handled = self.button_key_pressed(key)
            || self.window_key_pressed(key)
            || self.dialog_key_pressed(key);

        if !handled {
            trace!(%key, "key ignored by dialog");
        }
        handled
    }

    // ============ 焦点按钮 ============

    fn button_key_pressed(&self, key: Key) -> bool {
        let Some(button) = self.focus.as_ref() else {
            return false;
        };

        for action in self.keybindings.actions(key) {
            if action == Action::Confirm {
                debug!(button = %button.id(), label = button.text(), "button activated");
                button.activate();
                return true;
            }
        }
        false
    }

    // ============ 窗口焦点 ============

    fn window_key_pressed(&mut self, key: Key) -> bool {
        let actions: Vec<Action> = self.keybindings.actions(key).collect();
        for action in actions {
            let moved = match action {
                Action::NextField => self.focus_next(),
                Action::PrevField => self.focus_prev(),
                _ => continue,
            };
            if moved {
                return true;
            }
        }
        false
    }

    /// 焦点移到下一个可见按钮（循环），没有可见按钮时返回 false
    pub fn focus_next(&mut self) -> bool {
        self.move_focus(true)
    }

    pub fn focus_prev(&mut self) -> bool {
        self.move_focus(false)
    }

    /// 将焦点设到某个按钮上，按钮不属于本对话框时返回 false
    pub fn set_focus(&mut self, button: &Rc<Widget>) -> bool {
        if !self.buttons.contains(button) {
            return false;
        }
        self.focus = Some(Rc::clone(button));
        true
    }

    fn move_focus(&mut self, forward: bool) -> bool {
        let target = {
            let mut it = self.buttons.filtered().with_filter(Widget::is_visible);
            if let Some(pos) = self.focus.as_ref().and_then(|f| self.buttons.index_of(f)) {
                it.set_position(pos as isize);
            }

            let step = if forward { it.next() } else { it.prev() };
            step.or_else(|| {
                // 到头后绕回另一端
                if forward {
                    it.reset();
                    it.next()
                } else {
                    it.set_position(isize::MAX);
                    it.prev()
                }
            })
            .cloned()
        };

        match target {
            Some(button) => {
                trace!(button = %button.id(), "focus moved");
                self.focus = Some(button);
                true
            }
            None => false,
        }
    }

    // ============ 对话框 ============

    fn dialog_key_pressed(&self, key: Key) -> bool {
        let mut action = None;
        while let Some(found) = self.keybindings.find_action(key, action) {
            match found {
                Action::Cancel => {
                    self.responder.resolve(Response::Cancel);
                    return true;
                }
                _ => action = Some(found),
            }
        }
        false
    }
}
