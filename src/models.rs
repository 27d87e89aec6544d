use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use uuid::Uuid;

/// 控件标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(Uuid);

impl WidgetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Label,
    Button,
}

type ActivateHandler = Rc<dyn Fn()>;

/// 最小控件：标签或按钮
///
/// 控件以 `Rc<Widget>` 的形式放入容器，可见性等状态用内部可变性保存。
pub struct Widget {
    id: WidgetId,
    kind: WidgetKind,
    text: String,
    visible: Cell<bool>,
    vexpand: Cell<bool>,
    on_activate: RefCell<Vec<ActivateHandler>>,
}

impl Widget {
    fn new(kind: WidgetKind, text: impl Into<String>) -> Self {
        Self {
            id: WidgetId::new(),
            kind,
            text: text.into(),
            visible: Cell::new(false),
            vexpand: Cell::new(false),
            on_activate: RefCell::new(Vec::new()),
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Label, text)
    }

    pub fn button(text: impl Into<String>) -> Self {
        Self::new(WidgetKind::Button, text)
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn kind(&self) -> WidgetKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_button(&self) -> bool {
        self.kind == WidgetKind::Button
    }

    pub fn show(&self) {
        self.visible.set(true);
    }

    pub fn hide(&self) {
        self.visible.set(false);
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_vexpand(&self, vexpand: bool) {
        self.vexpand.set(vexpand);
    }

    pub fn vexpand(&self) -> bool {
        self.vexpand.get()
    }

    /// 注册激活回调，按注册顺序调用
    pub fn connect_activate<F>(&self, handler: F)
    where
        F: Fn() + 'static,
    {
        self.on_activate.borrow_mut().push(Rc::new(handler));
    }

    /// 激活按钮，返回被调用的回调数量；标签控件不响应激活
    ///
    /// 调用的是激活开始时的回调快照，回调中新注册的回调从下一次激活起生效。
    pub fn activate(&self) -> usize {
        if !self.is_button() {
            return 0;
        }

        let handlers: Vec<ActivateHandler> = self.on_activate.borrow().clone();
        for handler in &handlers {
            handler();
        }
        handlers.len()
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("text", &self.text)
            .field("visible", &self.visible.get())
            .finish_non_exhaustive()
    }
}

/// 对话框类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogType {
    #[default]
    Other,
    Info,
    Warning,
    Confirmation,
    Error,
}

impl FromStr for DialogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "other" => Ok(Self::Other),
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "confirmation" | "confirm" | "question" => Ok(Self::Confirmation),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown dialog type '{other}'")),
        }
    }
}

/// 对话框提供的按钮组合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogButtons {
    #[default]
    None,
    YesNo,
}

impl FromStr for DialogButtons {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "yesno" | "yes_no" | "yes-no" => Ok(Self::YesNo),
            other => Err(format!("unknown dialog buttons '{other}'")),
        }
    }
}

/// 对话框的最终结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Response {
    #[default]
    Unset,
    Yes,
    No,
    Cancel,
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Response::Unset => "unset",
            Response::Yes => "yes",
            Response::No => "no",
            Response::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_activation_runs_handlers_in_order() {
        let button = Widget::button("[ Ok ]");
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = Rc::clone(&log);
        button.connect_activate(move || first.borrow_mut().push(1));
        let second = Rc::clone(&log);
        button.connect_activate(move || second.borrow_mut().push(2));

        assert_eq!(button.activate(), 2);
        assert_eq!(*log.borrow(), [1, 2]);
    }

    #[test]
    fn test_handler_may_connect_during_activation() {
        let button = Rc::new(Widget::button("[ Ok ]"));
        let hits = Rc::new(Cell::new(0));

        let weak = Rc::downgrade(&button);
        let counter = Rc::clone(&hits);
        button.connect_activate(move || {
            counter.set(counter.get() + 1);
            if let Some(button) = weak.upgrade() {
                let counter = Rc::clone(&counter);
                button.connect_activate(move || counter.set(counter.get() + 10));
            }
        });

        // 新注册的回调本次不执行
        assert_eq!(button.activate(), 1);
        assert_eq!(hits.get(), 1);

        assert_eq!(button.activate(), 2);
        assert_eq!(hits.get(), 12);
    }

    #[test]
    fn test_label_ignores_activation() {
        let label = Widget::label("hello");
        label.connect_activate(|| panic!("labels are not activatable"));
        assert_eq!(label.activate(), 0);
    }

    #[test]
    fn test_visibility() {
        let label = Widget::label("hello");
        assert!(!label.is_visible());
        label.show();
        assert!(label.is_visible());
        label.hide();
        assert!(!label.is_visible());
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!("Confirm".parse::<DialogType>(), Ok(DialogType::Confirmation));
        assert_eq!("yes_no".parse::<DialogButtons>(), Ok(DialogButtons::YesNo));
        assert!("sideways".parse::<DialogType>().is_err());
        assert!("maybe".parse::<DialogButtons>().is_err());
    }

    #[test]
    fn test_widget_ids_are_unique() {
        assert_ne!(Widget::label("a").id(), Widget::label("a").id());
    }
}
