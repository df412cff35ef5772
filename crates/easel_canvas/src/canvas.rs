//! The canvas and its tick loop
//!
//! A [`Canvas`] ties the frame clock, the element container, the render
//! lifecycles, and a frame sink together. It is a cheap handle: clones share
//! one canvas.
//!
//! Each tick, in order:
//!
//! 1. advance the frame counter (the first tick moves it from `-1` to `0`)
//! 2. fire due scheduled events
//! 3. step every active animation and drop the ended ones
//! 4. wake builder threads blocked on the clock
//! 5. render visible elements in layer order and present the frame
//!
//! [`Canvas::new`] starts a background thread that ticks at the configured
//! fps. [`Canvas::manual`] leaves ticking to the caller, which is what tests
//! and offline renderers use.

use crate::clock::{self, FrameClock, NonBlockingScope};
use crate::container::ElementContainer;
use crate::handle::Element;
use crate::lifecycle::{AntiAliasLifecycle, CenteringLifecycle, RenderLifecycle};
use crate::lock;
use crate::options::CanvasOptions;
use crate::sink::{FrameSink, NullSink, RenderedFrame};
use easel_animation::{Animation, TimeUnit};
use easel_core::{Color, DrawContext, Drawable, EaselError, RecordingContext, Result, Size};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Below this, [`Canvas::sleep_for`] is a plain thread sleep
const FRAME_SYNC_THRESHOLD_SECS: f64 = 0.1;

struct Surface {
    size: Size,
    title: String,
    background: Color,
}

struct CanvasInner {
    options: CanvasOptions,
    surface: Mutex<Surface>,
    clock: FrameClock,
    container: ElementContainer,
    lifecycles: Mutex<Vec<Box<dyn RenderLifecycle>>>,
    sink: Mutex<Box<dyn FrameSink>>,
    started: AtomicBool,
    stop_flag: Arc<AtomicBool>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for CanvasInner {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        self.clock.shutdown();
    }
}

/// A drawing surface with a fixed-rate frame clock
#[derive(Clone)]
pub struct Canvas {
    inner: Arc<CanvasInner>,
}

impl Canvas {
    /// Create a canvas and start its tick loop
    pub fn new(
        width: f64,
        height: f64,
        title: impl Into<String>,
        options: CanvasOptions,
    ) -> Result<Self> {
        let canvas = Self::manual(width, height, title, options)?;
        canvas.start()?;
        Ok(canvas)
    }

    /// Create a canvas whose frames only advance through [`Canvas::tick`]
    pub fn manual(
        width: f64,
        height: f64,
        title: impl Into<String>,
        options: CanvasOptions,
    ) -> Result<Self> {
        options.validate()?;
        let size = validate_size(width, height)?;
        let title = title.into();

        let mut lifecycles: Vec<Box<dyn RenderLifecycle>> = Vec::new();
        if options.anti_alias {
            lifecycles.push(Box::new(AntiAliasLifecycle));
        }
        if options.auto_center {
            lifecycles.push(Box::new(CenteringLifecycle::new(size)));
        }

        tracing::debug!(
            "creating canvas {:?} ({}x{}, {} fps)",
            title,
            width,
            height,
            options.fps
        );

        Ok(Self {
            inner: Arc::new(CanvasInner {
                clock: FrameClock::new(options.fps),
                surface: Mutex::new(Surface {
                    size,
                    title,
                    background: options.background_color,
                }),
                options,
                container: ElementContainer::new(),
                lifecycles: Mutex::new(lifecycles),
                sink: Mutex::new(Box::new(NullSink)),
                started: AtomicBool::new(false),
                stop_flag: Arc::new(AtomicBool::new(false)),
                thread_handle: Mutex::new(None),
            }),
        })
    }

    /// Start ticking on a background thread
    ///
    /// The thread holds only a weak reference and exits once every handle
    /// to the canvas has been dropped.
    pub fn start(&self) -> Result<()> {
        if self.inner.started.swap(true, Ordering::SeqCst) {
            return Err(EaselError::configuration("frame clock already started"));
        }

        let weak = Arc::downgrade(&self.inner);
        let stop_flag = Arc::clone(&self.inner.stop_flag);
        let frame_duration = self.inner.options.frame_period();

        let handle = thread::Builder::new()
            .name("easel-frame-clock".to_string())
            .spawn(move || {
                tracing::debug!("frame clock started ({:?} per frame)", frame_duration);
                let mut deadline = Instant::now();

                while !stop_flag.load(Ordering::Relaxed) {
                    match weak.upgrade() {
                        Some(inner) => Canvas { inner }.tick(),
                        None => break,
                    }

                    // Fixed rate: sleep until the next deadline, never catch up
                    deadline += frame_duration;
                    let now = Instant::now();
                    if deadline > now {
                        thread::sleep(deadline - now);
                    } else {
                        deadline = now;
                    }
                }
                tracing::debug!("frame clock stopped");
            })
            .map_err(|e| EaselError::configuration(format!("failed to spawn frame clock: {e}")))?;

        *lock(&self.inner.thread_handle) = Some(handle);
        Ok(())
    }

    /// Stop ticking and wake every blocked builder with an interruption
    pub fn stop(&self) {
        self.inner.stop_flag.store(true, Ordering::Relaxed);
        self.inner.clock.shutdown();

        let handle = lock(&self.inner.thread_handle).take();
        if let Some(handle) = handle {
            // Stopping from an event callback runs on the clock thread itself
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                tracing::error!("frame clock thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.started.load(Ordering::SeqCst) && !self.inner.clock.is_stopped()
    }

    /// Run one frame
    ///
    /// Blocking builder calls made from event callbacks fail with a
    /// configuration error instead of waiting on this tick.
    pub fn tick(&self) {
        let Some(frame) = self.inner.clock.advance() else {
            return;
        };
        let _scope = NonBlockingScope::enter("on the frame clock thread");

        self.fire_events(frame);
        self.inner
            .clock
            .update_animations(frame, &self.inner.container);
        self.inner.clock.complete(frame);
        self.render(frame);

        if frame % u64::from(self.inner.options.fps) == 0 {
            tracing::debug!(
                "frame {}: {} animations active, {} elements",
                frame,
                self.inner.clock.active_count(),
                self.inner.container.len()
            );
        }
    }

    fn fire_events(&self, frame: u64) {
        for mut event in self.inner.clock.take_due_events(frame) {
            tracing::trace!("firing event {} on frame {}", event.id, frame);
            let fired = panic::catch_unwind(AssertUnwindSafe(|| (event.callback)(self)));
            if fired.is_err() {
                tracing::error!(
                    "scheduled event {} panicked on frame {}; dropping it",
                    event.id,
                    frame
                );
                continue;
            }
            if event.repeat {
                self.inner.clock.restore_event(event);
            }
        }
    }

    fn render(&self, frame: u64) {
        let (viewport, background) = {
            let surface = lock(&self.inner.surface);
            (surface.size, surface.background)
        };

        let mut ctx = RecordingContext::new(viewport);
        ctx.clear(background);

        // Lock order: container, then lifecycles
        let mut elements = self.inner.container.lock();
        let mut lifecycles = lock(&self.inner.lifecycles);
        for lifecycle in lifecycles.iter_mut() {
            lifecycle.render_start(&mut ctx);
        }

        elements.for_each_in_layer_order(|id, entry| {
            if !entry.is_visible() {
                return;
            }
            let drawable = entry.drawable();
            let depth = ctx.transform_depth();
            match panic::catch_unwind(AssertUnwindSafe(|| drawable.draw(&mut ctx))) {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::warn!(
                        "failed to draw {} {:?} on frame {}: {}",
                        drawable.kind(),
                        id,
                        frame,
                        err
                    );
                }
                Err(_) => {
                    tracing::error!(
                        "{} {:?} panicked while drawing frame {}",
                        drawable.kind(),
                        id,
                        frame
                    );
                }
            }
            ctx.unwind_transforms(depth);
        });

        for lifecycle in lifecycles.iter_mut().rev() {
            lifecycle.render_end(&mut ctx);
        }
        drop(lifecycles);
        drop(elements);

        let rendered = RenderedFrame {
            frame,
            viewport,
            commands: ctx.take_commands(),
        };
        lock(&self.inner.sink).present(rendered);
    }

    // =========================================================================
    // Elements
    // =========================================================================

    /// Add a drawable; it is rendered right away when `auto_add` is set
    pub fn add<D: Drawable>(&self, drawable: D) -> Element {
        self.insert(Box::new(drawable), self.inner.options.auto_add)
    }

    /// Add a drawable that stays hidden until [`Element::attach`]
    pub fn add_detached<D: Drawable>(&self, drawable: D) -> Element {
        self.insert(Box::new(drawable), false)
    }

    pub fn add_boxed(&self, drawable: Box<dyn Drawable>) -> Element {
        self.insert(drawable, self.inner.options.auto_add)
    }

    fn insert(&self, drawable: Box<dyn Drawable>, attached: bool) -> Element {
        let kind = drawable.kind();
        let id = self.inner.container.with(|elements| elements.insert(drawable, attached));
        tracing::trace!("added {} {:?} (attached: {})", kind, id, attached);
        Element::new(id, self.clone())
    }

    /// Run `f` as one batch of edits, so a frame sees all of them or none
    ///
    /// Element handles keep working inside `f`. Calls that would wait on the
    /// frame clock fail instead, since no frame completes while the batch is
    /// open.
    pub fn atomic<R>(&self, f: impl FnOnce() -> R) -> R {
        let _batch = self.inner.container.batch();
        let _scope = NonBlockingScope::enter("inside Canvas::atomic");
        f()
    }

    pub fn element_count(&self) -> usize {
        self.inner.container.len()
    }

    pub fn container(&self) -> &ElementContainer {
        &self.inner.container
    }

    // =========================================================================
    // Clock
    // =========================================================================

    pub fn clock(&self) -> &FrameClock {
        &self.inner.clock
    }

    /// Current frame, `-1` before the first tick
    pub fn frame(&self) -> i64 {
        self.inner.clock.frame()
    }

    pub fn fps(&self) -> u32 {
        self.inner.options.fps
    }

    pub fn active_animation_count(&self) -> usize {
        self.inner.clock.active_count()
    }

    /// Snapshot of the animations not yet ended
    pub fn animations(&self) -> Vec<Animation> {
        self.inner.clock.animations()
    }

    /// Block until every animation on this canvas has ended
    pub fn sleep(&self) -> Result<()> {
        self.inner.clock.wait_until_idle()
    }

    /// Block for `seconds`.
    ///
    /// Short sleeps use the thread timer; longer ones wait for the frame
    /// clock so they stay in step with animations.
    pub fn sleep_for(&self, seconds: f64) -> Result<()> {
        let frames = TimeUnit::Seconds.as_frames(seconds, self.fps())?;
        clock::ensure_may_block()?;
        if seconds < FRAME_SYNC_THRESHOLD_SECS {
            thread::sleep(Duration::from_secs_f64(seconds));
            return Ok(());
        }
        let target = self.inner.clock.now() + frames;
        self.inner.clock.wait_for_frame(target as i64)
    }

    /// Register a callback run by the tick loop.
    ///
    /// A one-shot event fires `time` from now. A repeating event fires on
    /// every frame that is a multiple of `time`.
    pub fn schedule<F>(&self, time: f64, unit: TimeUnit, repeat: bool, callback: F) -> Result<()>
    where
        F: FnMut(&Canvas) + Send + 'static,
    {
        let frames = unit.as_frames(time, self.fps())?;
        if repeat && frames == 0 {
            return Err(EaselError::configuration(
                "repeating events need a period of at least one frame",
            ));
        }
        let fire_frame = self.inner.clock.now() + frames;
        let id = self
            .inner
            .clock
            .push_event(fire_frame, frames, repeat, Box::new(callback));
        tracing::trace!(
            "scheduled event {} at frame {} (repeat: {})",
            id,
            fire_frame,
            repeat
        );
        Ok(())
    }

    // =========================================================================
    // Surface
    // =========================================================================

    pub fn width(&self) -> f64 {
        lock(&self.inner.surface).size.width
    }

    pub fn height(&self) -> f64 {
        lock(&self.inner.surface).size.height
    }

    pub fn size(&self) -> Size {
        lock(&self.inner.surface).size
    }

    pub fn title(&self) -> String {
        lock(&self.inner.surface).title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        lock(&self.inner.surface).title = title.into();
    }

    pub fn background_color(&self) -> Color {
        lock(&self.inner.surface).background
    }

    pub fn set_background_color(&self, color: impl Into<Color>) {
        lock(&self.inner.surface).background = color.into();
    }

    /// The options this canvas runs with, including the current background
    pub fn options(&self) -> CanvasOptions {
        CanvasOptions {
            background_color: self.background_color(),
            ..self.inner.options.clone()
        }
    }

    /// Change the canvas size and notify the render lifecycles
    pub fn resize(&self, width: f64, height: f64) -> Result<()> {
        let size = validate_size(width, height)?;
        {
            let mut surface = lock(&self.inner.surface);
            if surface.size == size {
                return Ok(());
            }
            surface.size = size;
        }
        tracing::debug!("canvas resized to {}x{}", width, height);
        for lifecycle in lock(&self.inner.lifecycles).iter_mut() {
            lifecycle.on_resize(size);
        }
        Ok(())
    }

    pub fn add_lifecycle(&self, lifecycle: impl RenderLifecycle + 'static) {
        lock(&self.inner.lifecycles).push(Box::new(lifecycle));
    }

    /// Replace where rendered frames go
    pub fn set_sink(&self, sink: impl FrameSink + 'static) {
        *lock(&self.inner.sink) = Box::new(sink);
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("title", &self.title())
            .field("size", &self.size())
            .field("frame", &self.frame())
            .finish()
    }
}

fn validate_size(width: f64, height: f64) -> Result<Size> {
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return Err(EaselError::configuration(format!(
            "canvas size must be positive, got {width}x{height}"
        )));
    }
    Ok(Size::new(width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::CapturedFrames;
    use easel_core::{DrawCommand, Rectangle};

    fn manual() -> Canvas {
        Canvas::manual(200.0, 100.0, "test", CanvasOptions::default()).unwrap()
    }

    #[test]
    fn test_first_tick_is_frame_zero() {
        let canvas = manual();
        assert_eq!(canvas.frame(), -1);
        canvas.tick();
        assert_eq!(canvas.frame(), 0);
        assert_eq!(canvas.clock().completed_frame(), 0);
    }

    #[test]
    fn test_invalid_construction() {
        let zero_fps = CanvasOptions::default().with_fps(0);
        assert!(matches!(
            Canvas::manual(10.0, 10.0, "t", zero_fps),
            Err(EaselError::Configuration(_))
        ));
        assert!(Canvas::manual(-1.0, 10.0, "t", CanvasOptions::default()).is_err());
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let canvas = Canvas::new(10.0, 10.0, "t", CanvasOptions::default()).unwrap();
        assert!(canvas.is_running());
        assert!(matches!(canvas.start(), Err(EaselError::Configuration(_))));
        canvas.stop();
        assert!(!canvas.is_running());
    }

    #[test]
    fn test_render_clears_and_anti_aliases() {
        let canvas = manual();
        let frames = CapturedFrames::new();
        canvas.set_sink(frames.clone());
        canvas.set_background_color(Color::BLACK);
        canvas.add(Rectangle::new(10.0, 10.0, 4.0, 4.0));
        canvas.tick();

        let frame = frames.last().unwrap();
        assert_eq!(frame.frame, 0);
        assert_eq!(frame.commands[0], DrawCommand::Clear(Color::BLACK));
        assert_eq!(frame.commands[1], DrawCommand::SetAntiAlias(true));
        assert_eq!(frame.commands.len(), 3);
    }

    #[test]
    fn test_resize_translates_content() {
        let canvas = manual();
        let frames = CapturedFrames::new();
        canvas.set_sink(frames.clone());
        canvas.resize(300.0, 100.0).unwrap();
        canvas.tick();

        let frame = frames.last().unwrap();
        assert_eq!(frame.viewport, Size::new(300.0, 100.0));
        assert!(frame
            .commands
            .contains(&DrawCommand::PushTransform(easel_core::Transform::translate(50.0, 0.0))));
    }

    #[test]
    fn test_options_reflect_background() {
        let canvas = manual();
        canvas.set_background_color(Color::RED);
        canvas.set_title("renamed");
        assert_eq!(canvas.options().background_color, Color::RED);
        assert_eq!(canvas.title(), "renamed");
        assert_eq!((canvas.width(), canvas.height()), (200.0, 100.0));
    }
}
