//! Timeline builders
//!
//! A [`TimelineBuilder`] turns `add`/`with`/`wait`/`schedule` calls into
//! animations on the frame clock. Each element has one [`TimelineCursor`]
//! shared by every builder obtained from it:
//!
//! ```text
//! add(A, 2s)   A: [0, 60]    anchor 0    cursor 60
//! with(B, 1s)  B: [0, 30]    anchor 0    cursor 60
//! add(C, 1s)   blocks until frame 60 completes, then C: [60, 90]
//! wait(1s)                   anchor 90   cursor 120
//! with(D, 1s)  D: [90, 120]
//! ```
//!
//! `add` blocks the calling thread until everything this element's builders
//! enqueued before it has finished. `with`, `wait` and `schedule` never block.
//! One thread should drive a given element's timeline at a time.

use crate::handle::Element;
use crate::lock;
use easel_animation::{Animation, TimeUnit};
use easel_core::{EaselError, Result};
use std::sync::MutexGuard;

/// Frame bookkeeping for one element's timeline
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimelineCursor {
    /// Where the next `add` starts
    pub cursor: u64,
    /// Where the most recent `add` started; `with` starts here
    pub anchor: u64,
    /// Latest end frame of anything enqueued through `add` or `with`
    pub last_end: Option<u64>,
}

impl TimelineCursor {
    fn extend_end(&mut self, end: u64) {
        self.last_end = Some(self.last_end.map_or(end, |last| last.max(end)));
    }
}

/// Builder returned by [`Element::animate`]
#[derive(Clone)]
pub struct TimelineBuilder {
    element: Element,
}

impl TimelineBuilder {
    pub(crate) fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Snapshot of this element's cursor
    pub fn cursor(&self) -> TimelineCursor {
        *self.lock_cursor()
    }

    /// Run `animation` for `seconds` after everything queued before it
    pub fn add(&self, animation: Animation, seconds: f64) -> Result<&Self> {
        self.add_in(animation, seconds, TimeUnit::Seconds)
    }

    pub fn add_in(&self, animation: Animation, duration: f64, unit: TimeUnit) -> Result<&Self> {
        let frames = self.frames(duration, unit)?;
        self.check_capability(&animation)?;

        let previous_end = self.lock_cursor().last_end;
        if let Some(end) = previous_end {
            self.element.canvas().clock().wait_for_frame(end as i64)?;
        }

        let now = self.element.canvas().clock().now();
        let start = {
            let mut cursor = self.lock_cursor();
            let start = cursor.cursor.max(now);
            cursor.anchor = start;
            cursor.cursor = start + frames;
            cursor.extend_end(start + frames);
            start
        };
        self.enqueue(animation, start, frames);
        Ok(self)
    }

    /// Run `animation` for `seconds` alongside the most recent `add`
    pub fn with(&self, animation: Animation, seconds: f64) -> Result<&Self> {
        self.with_in(animation, seconds, TimeUnit::Seconds)
    }

    pub fn with_in(&self, animation: Animation, duration: f64, unit: TimeUnit) -> Result<&Self> {
        let frames = self.frames(duration, unit)?;
        self.check_capability(&animation)?;

        let now = self.element.canvas().clock().now();
        let start = {
            let mut cursor = self.lock_cursor();
            cursor.anchor = cursor.anchor.max(now);
            let start = cursor.anchor;
            cursor.cursor = cursor.cursor.max(start + frames);
            cursor.extend_end(start + frames);
            start
        };
        self.enqueue(animation, start, frames);
        Ok(self)
    }

    /// Delay the next `add` and `with` by `seconds`
    pub fn wait(&self, seconds: f64) -> Result<&Self> {
        self.wait_in(seconds, TimeUnit::Seconds)
    }

    pub fn wait_in(&self, duration: f64, unit: TimeUnit) -> Result<&Self> {
        let frames = self.frames(duration, unit)?;
        let mut cursor = self.lock_cursor();
        cursor.anchor += frames;
        cursor.cursor += frames;
        Ok(self)
    }

    /// Run `animation` for `duration` seconds starting `time` seconds from
    /// now, independent of the cursor
    pub fn schedule(&self, time: f64, animation: Animation, duration: f64) -> Result<&Self> {
        self.schedule_in(time, animation, duration, TimeUnit::Seconds)
    }

    pub fn schedule_in(
        &self,
        time: f64,
        animation: Animation,
        duration: f64,
        unit: TimeUnit,
    ) -> Result<&Self> {
        let offset = self.frames(time, unit)?;
        let frames = self.frames(duration, unit)?;
        self.check_capability(&animation)?;

        let start = self.element.canvas().clock().now() + offset;
        self.enqueue(animation, start, frames);
        Ok(self)
    }

    /// Block until every animation on the canvas has ended
    pub fn sleep(&self) -> Result<&Self> {
        self.element.canvas().sleep()?;
        Ok(self)
    }

    /// Block for `seconds`
    pub fn sleep_for(&self, seconds: f64) -> Result<&Self> {
        self.element.canvas().sleep_for(seconds)?;
        Ok(self)
    }

    fn frames(&self, duration: f64, unit: TimeUnit) -> Result<u64> {
        unit.as_frames(duration, self.element.canvas().fps())
    }

    fn check_capability(&self, animation: &Animation) -> Result<()> {
        let id = self.element.id();
        self.element.canvas().container().with(|elements| {
            elements
                .get(id)
                .ok_or(EaselError::ElementNotFound(id))?
                .require(animation.required_capability())
        })
    }

    fn enqueue(&self, animation: Animation, start: u64, frames: u64) {
        let animation = animation.bind(self.element.id(), start, frames);
        self.element.canvas().clock().enqueue(animation);
    }

    fn lock_cursor(&self) -> MutexGuard<'_, TimelineCursor> {
        lock(self.element.cursor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Canvas, CanvasOptions};
    use easel_core::{Color, Rectangle, Sprite};

    fn canvas() -> Canvas {
        Canvas::manual(100.0, 100.0, "timeline", CanvasOptions::default()).unwrap()
    }

    fn windows(canvas: &Canvas) -> Vec<(u64, u64)> {
        canvas
            .animations()
            .iter()
            .map(|a| (a.start_frame(), a.end_frame()))
            .collect()
    }

    #[test]
    fn test_with_stacks_on_anchor() {
        let canvas = canvas();
        let element = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        element
            .animate()
            .add(Animation::move_to(10.0, 10.0), 2.0)
            .unwrap()
            .with(Animation::color_to(Color::RED), 2.0)
            .unwrap()
            .with(Animation::rotate_to(45.0), 3.0)
            .unwrap();

        assert_eq!(windows(&canvas), vec![(0, 60), (0, 60), (0, 90)]);
        let cursor = element.animate().cursor();
        assert_eq!(cursor.cursor, 90);
        assert_eq!(cursor.anchor, 0);
        assert_eq!(cursor.last_end, Some(90));
    }

    #[test]
    fn test_wait_shifts_anchor_and_cursor() {
        let canvas = canvas();
        let element = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        let timeline = element.animate();
        timeline
            .add_in(Animation::fade_out(), 10.0, TimeUnit::Frames)
            .unwrap()
            .wait_in(5.0, TimeUnit::Frames)
            .unwrap()
            .with_in(Animation::fade_in(), 10.0, TimeUnit::Frames)
            .unwrap();

        assert_eq!(windows(&canvas), vec![(0, 10), (5, 15)]);
        assert_eq!(timeline.cursor().cursor, 15);
    }

    #[test]
    fn test_schedule_ignores_cursor() {
        let canvas = canvas();
        let element = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        element
            .animate()
            .schedule_in(40.0, Animation::move_by(5.0, 0.0), 10.0, TimeUnit::Frames)
            .unwrap();

        assert_eq!(windows(&canvas), vec![(40, 50)]);
        assert_eq!(element.animate().cursor(), TimelineCursor::default());
    }

    #[test]
    fn test_capability_checked_before_enqueue() {
        let canvas = canvas();
        let sprite = canvas.add(Sprite::new("tree.png", 0.0, 0.0, 8.0, 8.0));
        let err = sprite
            .animate()
            .add(Animation::color_to(Color::RED), 1.0)
            .err();
        assert!(matches!(err, Some(EaselError::CapabilityMismatch { .. })));
        assert_eq!(canvas.active_animation_count(), 0);

        sprite.animate().add(Animation::rotate_by(90.0), 1.0).unwrap();
        assert_eq!(canvas.active_animation_count(), 1);
    }

    #[test]
    fn test_negative_duration_rejected() {
        let canvas = canvas();
        let element = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        let err = element.animate().with(Animation::fade_in(), -1.0).err();
        assert!(matches!(err, Some(EaselError::Configuration(_))));
    }

    #[test]
    fn test_removed_element_rejected() {
        let canvas = canvas();
        let element = canvas.add(Rectangle::new(0.0, 0.0, 5.0, 5.0));
        let id = element.id();
        element.remove().unwrap();
        let err = element.animate().add(Animation::fade_in(), 1.0).err();
        assert_eq!(err, Some(EaselError::ElementNotFound(id)));
    }
}
