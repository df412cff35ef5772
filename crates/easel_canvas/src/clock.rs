//! Frame clock state
//!
//! The [`FrameClock`] owns the frame counter, the active animation list, and
//! the scheduled events. The tick loop mutates it once per frame; builder
//! threads enqueue into it and block on its two condition variables:
//!
//! - `drained`: signalled after every tick, waited on until no animation is
//!   left ([`FrameClock::wait_until_idle`])
//! - `advanced`: signalled after every tick, waited on until a target frame
//!   has been completed ([`FrameClock::wait_for_frame`])
//!
//! Lock order is the element container first, then clock state. Nothing
//! holds either lock across a wait, and the waits refuse to block on a
//! thread that is running a tick or holds an [`atomic`](Canvas::atomic)
//! batch, since the frame they wait for could never complete.

use crate::canvas::Canvas;
use crate::container::ElementContainer;
use crate::lock;
use easel_animation::{Animation, AnimationState};
use easel_core::{EaselError, Result};
use smallvec::SmallVec;
use std::cell::Cell;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

thread_local! {
    /// What this thread is doing that a blocking wait would deadlock
    static NON_BLOCKING: Cell<Option<&'static str>> = const { Cell::new(None) };
}

/// Marks the current thread as unable to wait on a frame clock until dropped
pub(crate) struct NonBlockingScope {
    previous: Option<&'static str>,
}

impl NonBlockingScope {
    pub(crate) fn enter(context: &'static str) -> Self {
        let previous = NON_BLOCKING.with(|cell| cell.replace(Some(context)));
        Self { previous }
    }
}

impl Drop for NonBlockingScope {
    fn drop(&mut self) {
        NON_BLOCKING.with(|cell| cell.set(self.previous));
    }
}

/// Fail instead of blocking while a [`NonBlockingScope`] is active
pub(crate) fn ensure_may_block() -> Result<()> {
    match NON_BLOCKING.with(Cell::get) {
        Some(context) => Err(EaselError::configuration(format!(
            "blocking call {context} would deadlock the frame clock"
        ))),
        None => Ok(()),
    }
}

/// Callback run by the tick loop
pub type EventCallback = Box<dyn FnMut(&Canvas) + Send>;

/// A callback registered with [`Canvas::schedule`]
pub(crate) struct ScheduledEvent {
    pub(crate) id: u64,
    fire_frame: u64,
    period: u64,
    pub(crate) repeat: bool,
    pub(crate) callback: EventCallback,
}

impl ScheduledEvent {
    fn is_due(&self, frame: u64) -> bool {
        if self.repeat {
            frame % self.period == 0
        } else {
            frame >= self.fire_frame
        }
    }
}

pub(crate) type DueEvents = SmallVec<[ScheduledEvent; 4]>;

struct ClockState {
    animations: Vec<Animation>,
    events: Vec<ScheduledEvent>,
    next_event_id: u64,
    /// Last frame whose animation step has finished
    completed: i64,
    stopped: bool,
}

pub struct FrameClock {
    fps: u32,
    frame: AtomicI64,
    state: Mutex<ClockState>,
    drained: Condvar,
    advanced: Condvar,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self {
            fps,
            frame: AtomicI64::new(-1),
            state: Mutex::new(ClockState {
                animations: Vec::new(),
                events: Vec::new(),
                next_event_id: 0,
                completed: -1,
                stopped: false,
            }),
            drained: Condvar::new(),
            advanced: Condvar::new(),
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Current frame, `-1` before the first tick
    pub fn frame(&self) -> i64 {
        self.frame.load(Ordering::SeqCst)
    }

    /// Current frame clamped to zero
    pub fn now(&self) -> u64 {
        self.frame().max(0) as u64
    }

    pub fn completed_frame(&self) -> i64 {
        self.state().completed
    }

    pub fn is_stopped(&self) -> bool {
        self.state().stopped
    }

    pub fn active_count(&self) -> usize {
        self.state().animations.len()
    }

    /// Snapshot of the animations not yet ended
    pub fn animations(&self) -> Vec<Animation> {
        self.state().animations.clone()
    }

    pub fn enqueue(&self, animation: Animation) {
        tracing::trace!(
            "enqueue {:?} for {:?} over frames {}..={}",
            animation.kind(),
            animation.target(),
            animation.start_frame(),
            animation.end_frame()
        );
        self.state().animations.push(animation);
    }

    /// Move to the next frame.
    ///
    /// Returns `None` while the counter is still negative and once the clock
    /// has been shut down.
    pub(crate) fn advance(&self) -> Option<u64> {
        if self.is_stopped() {
            return None;
        }
        let frame = self.frame.fetch_add(1, Ordering::SeqCst) + 1;
        u64::try_from(frame).ok()
    }

    pub(crate) fn push_event(
        &self,
        fire_frame: u64,
        period: u64,
        repeat: bool,
        callback: EventCallback,
    ) -> u64 {
        let mut state = self.state();
        let id = state.next_event_id;
        state.next_event_id += 1;
        state.events.push(ScheduledEvent {
            id,
            fire_frame,
            period,
            repeat,
            callback,
        });
        id
    }

    /// Remove and return the events due on `frame`
    pub(crate) fn take_due_events(&self, frame: u64) -> DueEvents {
        let mut state = self.state();
        if state.events.is_empty() {
            return DueEvents::new();
        }
        let (due, pending): (DueEvents, DueEvents) = std::mem::take(&mut state.events)
            .into_iter()
            .partition(|event| event.is_due(frame));
        state.events = pending.into_vec();
        due
    }

    /// Put a repeating event back in registration order
    pub(crate) fn restore_event(&self, event: ScheduledEvent) {
        let mut state = self.state();
        let at = state.events.partition_point(|other| other.id < event.id);
        state.events.insert(at, event);
    }

    /// Step every animation to `frame` and drop the ended ones
    pub(crate) fn update_animations(&self, frame: u64, container: &ElementContainer) {
        let mut elements = container.lock();
        let mut state = self.state();
        if state.animations.is_empty() {
            return;
        }
        state.animations.retain_mut(|animation| {
            let target = match animation.target() {
                Some(id) => elements.get_mut(id),
                None => None,
            };
            match animation.update(frame, target) {
                Ok(AnimationState::Ended) => false,
                Ok(_) => true,
                Err(err) => {
                    tracing::error!("dropping animation on frame {}: {}", frame, err);
                    false
                }
            }
        });
    }

    /// Record `frame` as completed and wake blocked builders
    pub(crate) fn complete(&self, frame: u64) {
        self.state().completed = frame as i64;
        self.drained.notify_all();
        self.advanced.notify_all();
    }

    /// Block until no animation is left
    pub fn wait_until_idle(&self) -> Result<()> {
        let state = self.state();
        if state.animations.is_empty() {
            return Ok(());
        }
        ensure_may_block()?;
        let state = self
            .drained
            .wait_while(state, |s| !s.animations.is_empty() && !s.stopped)
            .unwrap_or_else(PoisonError::into_inner);
        if state.animations.is_empty() {
            Ok(())
        } else {
            Err(EaselError::Interrupted(format!(
                "frame clock stopped with {} animations pending",
                state.animations.len()
            )))
        }
    }

    /// Block until `target` has been completed
    pub fn wait_for_frame(&self, target: i64) -> Result<()> {
        let state = self.state();
        if state.completed >= target {
            return Ok(());
        }
        ensure_may_block()?;
        let state = self
            .advanced
            .wait_while(state, |s| s.completed < target && !s.stopped)
            .unwrap_or_else(PoisonError::into_inner);
        if state.completed >= target {
            Ok(())
        } else {
            Err(EaselError::Interrupted(format!(
                "frame clock stopped at frame {} before frame {}",
                state.completed, target
            )))
        }
    }

    /// Stop ticking and release every blocked builder
    pub fn shutdown(&self) {
        self.state().stopped = true;
        self.drained.notify_all();
        self.advanced.notify_all();
    }

    fn state(&self) -> MutexGuard<'_, ClockState> {
        lock(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::{Point, Positionable, Rectangle};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_frame_starts_negative() {
        let clock = FrameClock::new(30);
        assert_eq!(clock.frame(), -1);
        assert_eq!(clock.now(), 0);
        assert_eq!(clock.advance(), Some(0));
        assert_eq!(clock.advance(), Some(1));
    }

    #[test]
    fn test_ended_animations_removed_after_end_frame() {
        let clock = FrameClock::new(30);
        let container = ElementContainer::new();
        let id = container.add(Box::new(Rectangle::new(0.0, 0.0, 1.0, 1.0)));
        clock.enqueue(Animation::move_to(4.0, 0.0).bind(id, 0, 2));

        for frame in 0..=2 {
            clock.update_animations(frame, &container);
            assert_eq!(clock.active_count(), 1, "frame {frame}");
        }
        clock.update_animations(3, &container);
        assert_eq!(clock.active_count(), 0);

        let position = container.with(|e| {
            e.get_mut(id)
                .and_then(|d| d.as_positionable().map(Positionable::position))
        });
        assert_eq!(position, Some(Point::new(4.0, 0.0)));
    }

    #[test]
    fn test_due_events_partition() {
        let clock = FrameClock::new(30);
        clock.push_event(3, 3, false, Box::new(|_: &Canvas| {}));
        clock.push_event(0, 2, true, Box::new(|_: &Canvas| {}));

        assert_eq!(clock.take_due_events(1).len(), 0);
        let due = clock.take_due_events(4);
        assert_eq!(due.len(), 2);
        for event in due {
            if event.repeat {
                clock.restore_event(event);
            }
        }
        assert_eq!(clock.take_due_events(5).len(), 0);
        assert_eq!(clock.take_due_events(6).len(), 1);
    }

    #[test]
    fn test_wait_for_frame_wakes_on_complete() {
        let clock = Arc::new(FrameClock::new(30));
        let waiter = {
            let clock = Arc::clone(&clock);
            thread::spawn(move || clock.wait_for_frame(2))
        };
        for frame in 0..=2 {
            clock.complete(frame);
        }
        assert_eq!(waiter.join().unwrap(), Ok(()));
    }

    #[test]
    fn test_shutdown_interrupts_waiters() {
        let clock = Arc::new(FrameClock::new(30));
        let waiter = {
            let clock = Arc::clone(&clock);
            thread::spawn(move || clock.wait_for_frame(100))
        };
        clock.shutdown();
        assert!(matches!(
            waiter.join().unwrap(),
            Err(EaselError::Interrupted(_))
        ));
        assert_eq!(clock.advance(), None);
    }

    #[test]
    fn test_waits_refuse_to_block_inside_scope() {
        let clock = FrameClock::new(30);
        clock.complete(4);
        {
            let _outer = NonBlockingScope::enter("in a test");
            {
                let _inner = NonBlockingScope::enter("in a nested test");
                assert_eq!(clock.wait_for_frame(4), Ok(()));
            }
            assert!(matches!(
                clock.wait_for_frame(5),
                Err(EaselError::Configuration(message)) if message.contains("in a test")
            ));
            assert_eq!(clock.wait_until_idle(), Ok(()));
        }
        assert_eq!(ensure_may_block(), Ok(()));
    }
}
