//! 终端模态对话框内核
//!
//! - [`container`]：按步长增长的有序容器和带过滤的双向游标
//! - [`runtime`]：单线程协作式事件循环（输入源 + 周期定时器）
//! - [`ui`]：模态确认对话框，`run()` 在私有循环上阻塞直到得到结果

pub mod config;
pub mod container;
pub mod error;
pub mod logging;
pub mod models;
pub mod runtime;
pub mod ui;

pub use container::{FilteredIter, OrderedContainer};
pub use error::{KernelError, Result};
pub use models::{DialogButtons, DialogType, Response, Widget, WidgetId, WidgetKind};
pub use runtime::{EventLoop, LoopHandle, SourceFlow, SourceId};
pub use ui::{Dialog, DialogBuilder};
