//! 模态对话框
//!
//! [`Dialog::run`] 在对话框私有的事件循环上注册标准输入和刷新定时器，
//! 然后运行这个循环直到得到结果。调用方自己的循环（如果有）在此期间整体挂起，
//! 不创建任何线程。
//!
//! ```no_run
//! use tuikernel::{Dialog, Response};
//!
//! let mut dialog = Dialog::confirm("Quit", "Discard unsaved changes?")?;
//! if dialog.run() == Response::Yes {
//!     // ...
//! }
//! # Ok::<(), tuikernel::KernelError>(())
//! ```

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{Event, KeyEvent};
use ratatui::text::Line;
use tracing::{info, warn};

use super::input::KeyBindings;
use super::screen::Screen;
use super::state::{DialogPhase, DialogState, Responder};
use crate::config::DialogConfig;
use crate::container::OrderedContainer;
use crate::error::Result;
use crate::models::{DialogButtons, DialogType, Response, Widget, WidgetId};
use crate::runtime::{
    CrosstermInput, EventLoop, InputReady, InputSource, LoopHandle, SourceFlow, SourceId,
};

pub const BUTTON_YES_LABEL: &str = "[   Yes    ]";
pub const BUTTON_NO_LABEL: &str = "[    No    ]";

type ResolvedHandler = Box<dyn FnMut(Response)>;

/// 根据正文计算对话框尺寸，返回 `(width, height)`
///
/// 高度 = 正文行数 + 2（按钮）+ 2（边框）+ 2（标题栏）；宽度为最长一行的显示宽度，
/// 非 `Other` 类型额外加上 `type_padding`。两者都不小于配置中的最小值。
pub fn dialog_geometry(kind: DialogType, message: &str, config: &DialogConfig) -> (u16, u16) {
    // 空正文没有行
    let lines: Vec<&str> = if message.is_empty() {
        Vec::new()
    } else {
        message.split('\n').collect()
    };

    let height = lines.len() + 2 + 2 + 2;

    let mut width = lines
        .iter()
        .map(|line| Line::from(*line).width())
        .max()
        .unwrap_or(0);
    if kind != DialogType::Other {
        width += usize::from(config.type_padding);
    }

    (
        saturate(width).max(config.min_width),
        saturate(height).max(config.min_height),
    )
}

fn saturate(value: usize) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}

/// 对话框构建器
pub struct DialogBuilder {
    kind: DialogType,
    buttons: DialogButtons,
    title: String,
    message: String,
    config: DialogConfig,
    keybindings: Option<KeyBindings>,
    input: Option<Box<dyn InputSource>>,
    screen: Option<Box<dyn Screen>>,
    on_resolved: Vec<ResolvedHandler>,
}

impl DialogBuilder {
    pub fn new() -> Self {
        Self {
            kind: DialogType::default(),
            buttons: DialogButtons::default(),
            title: String::new(),
            message: String::new(),
            config: DialogConfig::default(),
            keybindings: None,
            input: None,
            screen: None,
            on_resolved: Vec::new(),
        }
    }

    pub fn kind(mut self, kind: DialogType) -> Self {
        self.kind = kind;
        self
    }

    pub fn buttons(mut self, buttons: DialogButtons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn config(mut self, config: DialogConfig) -> Self {
        self.config = config;
        self
    }

    pub fn keybindings(mut self, keybindings: KeyBindings) -> Self {
        self.keybindings = Some(keybindings);
        self
    }

    /// 替换默认的标准输入源
    pub fn input(mut self, input: impl InputSource + 'static) -> Self {
        self.input = Some(Box::new(input));
        self
    }

    pub fn screen(mut self, screen: impl Screen + 'static) -> Self {
        self.screen = Some(Box::new(screen));
        self
    }

    /// 注册结果回调，`run()` 返回前按注册顺序调用
    pub fn on_resolved<F>(mut self, handler: F) -> Self
    where
        F: FnMut(Response) + 'static,
    {
        self.on_resolved.push(Box::new(handler));
        self
    }

    /// 以文本形式设置属性，无法识别的名称或值记录警告后忽略
    pub fn property(mut self, name: &str, value: &str) -> Self {
        match name {
            "type" => match value.parse() {
                Ok(kind) => self.kind = kind,
                Err(err) => warn!(property = name, value, error = %err, "ignoring dialog property"),
            },
            "buttons" => match value.parse() {
                Ok(buttons) => self.buttons = buttons,
                Err(err) => warn!(property = name, value, error = %err, "ignoring dialog property"),
            },
            "title" => self.title = value.to_string(),
            "message" => self.message = value.replace("\\n", "\n"),
            other => warn!(property = other, value, "ignoring unknown dialog property"),
        }
        self
    }

    pub fn build(self) -> Result<Dialog> {
        let (width, height) = dialog_geometry(self.kind, &self.message, &self.config);

        let event_loop = EventLoop::new();
        let responder = Responder::new(event_loop.handle());

        let mut children = OrderedContainer::new(4, 2)?;
        let mut buttons = OrderedContainer::new(2, 2)?;

        let message = Rc::new(Widget::label(self.message.as_str()));
        message.set_vexpand(true);
        children.append(message)?;

        let mut default_focus = None;
        if self.buttons == DialogButtons::YesNo {
            let yes = response_button(BUTTON_YES_LABEL, &responder, Response::Yes);
            children.append(Rc::clone(&yes))?;
            buttons.append(Rc::clone(&yes))?;

            let no = response_button(BUTTON_NO_LABEL, &responder, Response::No);
            children.append(Rc::clone(&no))?;
            buttons.append(no)?;

            // 第一个按钮作为默认焦点
            default_focus = Some(yes);
        }

        for child in &children {
            child.show();
        }

        let id = WidgetId::new();
        info!(
            dialog = %id,
            kind = ?self.kind,
            buttons = ?self.buttons,
            width,
            height,
            "dialog constructed"
        );

        let state = DialogState {
            id,
            kind: self.kind,
            allowed_buttons: self.buttons,
            title: self.title,
            message: self.message,
            width,
            height,
            children,
            buttons,
            focus: default_focus.clone(),
            default_focus,
            keybindings: self.keybindings.unwrap_or_default(),
            responder: responder.clone(),
        };

        Ok(Dialog {
            state: Rc::new(RefCell::new(state)),
            responder,
            event_loop,
            input: self.input,
            screen: self.screen,
            refresh: self.config.refresh_interval(),
            on_resolved: self.on_resolved,
        })
    }
}

impl Default for DialogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn response_button(label: &str, responder: &Responder, response: Response) -> Rc<Widget> {
    let button = Rc::new(Widget::button(label));
    let responder = responder.clone();
    button.connect_activate(move || {
        responder.resolve(response);
    });
    button
}

/// 模态对话框
pub struct Dialog {
    state: Rc<RefCell<DialogState>>,
    responder: Responder,
    event_loop: EventLoop,
    input: Option<Box<dyn InputSource>>,
    screen: Option<Box<dyn Screen>>,
    refresh: Duration,
    on_resolved: Vec<ResolvedHandler>,
}

impl Dialog {
    pub fn builder() -> DialogBuilder {
        DialogBuilder::new()
    }

    pub fn new(
        kind: DialogType,
        buttons: DialogButtons,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self> {
        Self::builder()
            .kind(kind)
            .buttons(buttons)
            .title(title)
            .message(message)
            .build()
    }

    /// 带 Yes/No 按钮的确认对话框
    pub fn confirm(title: impl Into<String>, message: impl Into<String>) -> Result<Self> {
        Self::new(DialogType::Confirmation, DialogButtons::YesNo, title, message)
    }

    pub fn id(&self) -> WidgetId {
        self.state.borrow().id
    }

    pub fn kind(&self) -> DialogType {
        self.state.borrow().kind
    }

    pub fn allowed_buttons(&self) -> DialogButtons {
        self.state.borrow().allowed_buttons
    }

    pub fn title(&self) -> Ref<'_, str> {
        Ref::map(self.state.borrow(), |s| s.title.as_str())
    }

    pub fn message(&self) -> Ref<'_, str> {
        Ref::map(self.state.borrow(), |s| s.message.as_str())
    }

    pub fn width(&self) -> u16 {
        self.state.borrow().width
    }

    pub fn height(&self) -> u16 {
        self.state.borrow().height
    }

    /// 全部子控件：正文标签在前，按钮在后
    pub fn children(&self) -> Ref<'_, OrderedContainer<Widget>> {
        Ref::map(self.state.borrow(), |s| &s.children)
    }

    pub fn buttons(&self) -> Ref<'_, OrderedContainer<Widget>> {
        Ref::map(self.state.borrow(), |s| &s.buttons)
    }

    pub fn default_focus(&self) -> Option<Rc<Widget>> {
        self.state.borrow().default_focus.clone()
    }

    pub fn focused(&self) -> Option<Rc<Widget>> {
        self.state.borrow().focus.clone()
    }

    pub fn phase(&self) -> DialogPhase {
        self.responder.phase()
    }

    pub fn response(&self) -> Response {
        self.responder.response()
    }

    /// 私有事件循环的句柄
    pub fn loop_handle(&self) -> LoopHandle {
        self.event_loop.handle()
    }

    /// 把焦点移到本对话框的某个按钮上，其他控件返回 false
    pub fn set_focus(&self, button: &Rc<Widget>) -> bool {
        self.state.borrow_mut().set_focus(button)
    }

    /// 直接投递一次按键（不经过事件循环）
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.state.borrow_mut().handle_key(key)
    }

    /// 立即在给定屏幕上绘制一次
    pub fn draw(&self, screen: &mut dyn Screen) -> Result<()> {
        screen.refresh(&self.state.borrow().view())
    }

    /// 阻塞直到得到结果
    ///
    /// 已经有结果的对话框不会再次进入循环，直接返回已有结果。
    pub fn run(&mut self) -> Response {
        let id = self.id();
        if !self.responder.begin() {
            warn!(dialog = %id, phase = ?self.phase(), "dialog not runnable, returning current response");
            return self.response();
        }

        info!(dialog = %id, "awaiting response");
        let (input_id, timer_id) = self.register_sources();

        self.event_loop.run();

        // 两个源都在这里注销，且只注销一次
        self.event_loop.remove_source(input_id);
        self.event_loop.remove_source(timer_id);

        let response = self.response();
        for handler in &mut self.on_resolved {
            handler(response);
        }
        response
    }

    fn register_sources(&mut self) -> (SourceId, SourceId) {
        let input = self
            .input
            .take()
            .unwrap_or_else(|| Box::new(CrosstermInput));

        let state = Rc::clone(&self.state);
        let responder = self.responder.clone();
        let input_id = self.event_loop.add_input(input, move |_, ready| match ready {
            InputReady::Event(Event::Key(key)) => {
                state.borrow_mut().handle_key(key);
                SourceFlow::Continue
            }
            InputReady::Event(_) => SourceFlow::Continue,
            InputReady::Error(err) => {
                warn!(error = %err, "input error, cancelling dialog");
                responder.resolve(Response::Cancel);
                SourceFlow::Remove
            }
            InputReady::Hangup => {
                warn!("input closed, cancelling dialog");
                responder.resolve(Response::Cancel);
                SourceFlow::Remove
            }
        });

        let state = Rc::clone(&self.state);
        let mut screen = self.screen.take();
        let timer_id = self.event_loop.add_timer(self.refresh, move |_| {
            if let Some(screen) = screen.as_mut()
                && let Err(err) = screen.refresh(&state.borrow().view())
            {
                warn!(error = %err, "dialog refresh failed");
            }
            SourceFlow::Continue
        });

        (input_id, timer_id)
    }
}
