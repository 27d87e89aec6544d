//! 单线程协作式事件循环
//!
//! 每轮先按注册顺序分发到期的定时器，再按注册顺序轮询输入源；第一个输入源
//! 最多等待到下一个定时器到期。循环只在 [`LoopHandle::stop`] 之后或所有源都
//! 被移除后返回。一个循环可以在另一个循环的回调里被完整运行（嵌套循环），
//! 外层循环在此期间被挂起。

mod source;

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

pub use source::{CrosstermInput, InputReady, InputSource, ScriptedInput};

/// 没有定时器时输入源单次等待的上限
const IDLE_WAIT: Duration = Duration::from_millis(250);

/// 已注册源的标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u64);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 回调返回值：保留或移除该源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFlow {
    Continue,
    Remove,
}

/// 循环的控制句柄，可在回调中使用
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    running: Rc<Cell<bool>>,
    stops: Rc<Cell<usize>>,
}

impl LoopHandle {
    /// 请求循环在当前回调返回后停止
    pub fn stop(&self) {
        self.stops.set(self.stops.get() + 1);
        self.running.set(false);
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// 累计收到的停止请求次数
    pub fn stop_count(&self) -> usize {
        self.stops.get()
    }
}

type InputCallback = Box<dyn FnMut(&LoopHandle, InputReady) -> SourceFlow>;
type TimerCallback = Box<dyn FnMut(&LoopHandle) -> SourceFlow>;

struct InputWatch {
    id: SourceId,
    source: Box<dyn InputSource>,
    callback: InputCallback,
}

struct Timer {
    id: SourceId,
    period: Duration,
    next_due: Instant,
    callback: TimerCallback,
}

/// 事件循环实例
pub struct EventLoop {
    inputs: Vec<InputWatch>,
    timers: Vec<Timer>,
    handle: LoopHandle,
    next_id: u64,
}

impl EventLoop {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            timers: Vec::new(),
            handle: LoopHandle::default(),
            next_id: 1,
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_running()
    }

    /// 注册输入就绪源
    pub fn add_input<S, F>(&mut self, source: S, callback: F) -> SourceId
    where
        S: InputSource + 'static,
        F: FnMut(&LoopHandle, InputReady) -> SourceFlow + 'static,
    {
        let id = self.allocate_id();
        self.inputs.push(InputWatch {
            id,
            source: Box::new(source),
            callback: Box::new(callback),
        });
        debug!(source = %id, "input source registered");
        id
    }

    /// 注册周期定时器，第一次触发发生在循环的第一轮
    pub fn add_timer<F>(&mut self, period: Duration, callback: F) -> SourceId
    where
        F: FnMut(&LoopHandle) -> SourceFlow + 'static,
    {
        let id = self.allocate_id();
        self.timers.push(Timer {
            id,
            period,
            next_due: Instant::now(),
            callback: Box::new(callback),
        });
        debug!(source = %id, period_ms = period.as_millis() as u64, "timer registered");
        id
    }

    /// 注销输入源或取消定时器；源不存在时返回 false
    pub fn remove_source(&mut self, id: SourceId) -> bool {
        let before = self.source_count();
        self.inputs.retain(|watch| watch.id != id);
        self.timers.retain(|timer| timer.id != id);
        let removed = self.source_count() < before;
        if removed {
            debug!(source = %id, "source removed");
        }
        removed
    }

    pub fn source_count(&self) -> usize {
        self.inputs.len() + self.timers.len()
    }

    /// 运行直到被停止
    pub fn run(&mut self) {
        self.handle.running.set(true);
        debug!(
            inputs = self.inputs.len(),
            timers = self.timers.len(),
            "event loop started"
        );

        while self.handle.is_running() {
            if self.source_count() == 0 {
                warn!("event loop has no sources left, leaving");
                self.handle.running.set(false);
                break;
            }

            self.dispatch_timers();
            if !self.handle.is_running() {
                break;
            }

            let timeout = self.next_timeout();
            self.dispatch_inputs(timeout);
        }

        debug!("event loop stopped");
    }

    fn allocate_id(&mut self) -> SourceId {
        let id = SourceId(self.next_id);
        self.next_id += 1;
        id
    }

    fn next_timeout(&self) -> Duration {
        let now = Instant::now();
        self.timers
            .iter()
            .map(|timer| timer.next_due.saturating_duration_since(now))
            .min()
            .unwrap_or(IDLE_WAIT)
    }

    fn dispatch_timers(&mut self) {
        let now = Instant::now();
        let handle = self.handle.clone();

        self.timers.retain_mut(|timer| {
            if !handle.is_running() || now < timer.next_due {
                return true;
            }
            timer.next_due = now + timer.period;
            trace!(source = %timer.id, "timer fired");

            match (timer.callback)(&handle) {
                SourceFlow::Continue => true,
                SourceFlow::Remove => {
                    debug!(source = %timer.id, "timer removed by callback");
                    false
                }
            }
        });
    }

    fn dispatch_inputs(&mut self, timeout: Duration) {
        if self.inputs.is_empty() {
            std::thread::sleep(timeout);
            return;
        }

        let handle = self.handle.clone();
        let mut wait = timeout;

        self.inputs.retain_mut(|watch| {
            if !handle.is_running() {
                return true;
            }
            let ready = watch.source.poll(wait);
            wait = Duration::ZERO;

            let Some(ready) = ready else {
                return true;
            };
            match (watch.callback)(&handle, ready) {
                SourceFlow::Continue => true,
                SourceFlow::Remove => {
                    debug!(source = %watch.id, "input source removed by callback");
                    false
                }
            }
        });
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventLoop")
            .field("inputs", &self.inputs.len())
            .field("timers", &self.timers.len())
            .field("running", &self.handle.is_running())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{Event, KeyCode};
    use std::cell::RefCell;

    #[test]
    fn test_run_without_sources_returns() {
        let mut event_loop = EventLoop::new();
        event_loop.run();
        assert!(!event_loop.is_running());
        assert_eq!(event_loop.handle().stop_count(), 0);
    }

    #[test]
    fn test_timer_repeats_until_removed() {
        let mut event_loop = EventLoop::new();
        let ticks = Rc::new(Cell::new(0));

        let counter = Rc::clone(&ticks);
        event_loop.add_timer(Duration::ZERO, move |_| {
            counter.set(counter.get() + 1);
            if counter.get() == 3 {
                SourceFlow::Remove
            } else {
                SourceFlow::Continue
            }
        });

        event_loop.run();
        assert_eq!(ticks.get(), 3);
        assert_eq!(event_loop.source_count(), 0);
    }

    #[test]
    fn test_input_callback_stops_loop() {
        let script = ScriptedInput::new()
            .key(KeyCode::Char('a'))
            .idle()
            .key(KeyCode::Char('q'))
            .key(KeyCode::Char('z'));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let mut event_loop = EventLoop::new();
        let log = Rc::clone(&seen);
        event_loop.add_input(script.clone(), move |handle, ready| {
            if let InputReady::Event(Event::Key(key)) = ready {
                log.borrow_mut().push(key.code);
                if key.code == KeyCode::Char('q') {
                    handle.stop();
                }
            }
            SourceFlow::Continue
        });

        event_loop.run();
        assert_eq!(*seen.borrow(), [KeyCode::Char('a'), KeyCode::Char('q')]);
        assert_eq!(script.pending(), 1);
        assert_eq!(event_loop.handle().stop_count(), 1);
        assert_eq!(event_loop.source_count(), 1);
    }

    #[test]
    fn test_timers_dispatch_before_input() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut event_loop = EventLoop::new();

        let log = Rc::clone(&order);
        event_loop.add_input(ScriptedInput::new().key(KeyCode::Esc), move |handle, _| {
            log.borrow_mut().push("input");
            handle.stop();
            SourceFlow::Continue
        });
        let log = Rc::clone(&order);
        event_loop.add_timer(Duration::from_secs(60), move |_| {
            log.borrow_mut().push("timer");
            SourceFlow::Continue
        });

        event_loop.run();
        assert_eq!(*order.borrow(), ["timer", "input"]);
    }

    #[test]
    fn test_hangup_removes_source() {
        let mut event_loop = EventLoop::new();
        let hangups = Rc::new(Cell::new(0));

        let counter = Rc::clone(&hangups);
        event_loop.add_input(ScriptedInput::new(), move |_, ready| {
            if matches!(ready, InputReady::Hangup) {
                counter.set(counter.get() + 1);
                return SourceFlow::Remove;
            }
            SourceFlow::Continue
        });

        event_loop.run();
        assert_eq!(hangups.get(), 1);
        assert_eq!(event_loop.source_count(), 0);
    }

    #[test]
    fn test_remove_source_once() {
        let mut event_loop = EventLoop::new();
        let timer = event_loop.add_timer(Duration::from_millis(200), |_| SourceFlow::Continue);
        let input = event_loop.add_input(ScriptedInput::new(), |_, _| SourceFlow::Continue);
        assert_ne!(timer, input);
        assert_eq!(event_loop.source_count(), 2);

        assert!(event_loop.remove_source(timer));
        assert!(!event_loop.remove_source(timer));
        assert!(event_loop.remove_source(input));
        assert_eq!(event_loop.source_count(), 0);
    }

    #[test]
    fn test_nested_loop_suspends_outer() {
        let mut outer = EventLoop::new();
        let trace = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&trace);
        outer.add_timer(Duration::ZERO, move |outer_handle| {
            log.borrow_mut().push("outer tick");

            let mut inner = EventLoop::new();
            let inner_log = Rc::clone(&log);
            inner.add_input(ScriptedInput::new().key(KeyCode::Enter), move |handle, _| {
                inner_log.borrow_mut().push("inner input");
                handle.stop();
                SourceFlow::Continue
            });
            inner.run();

            assert!(outer_handle.is_running());
            log.borrow_mut().push("outer resumed");
            outer_handle.stop();
            SourceFlow::Continue
        });

        outer.run();
        assert_eq!(
            *trace.borrow(),
            ["outer tick", "inner input", "outer resumed"]
        );
    }
}
