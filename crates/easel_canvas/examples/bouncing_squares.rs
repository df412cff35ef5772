//! Bouncing Squares Demo
//!
//! Demonstrates timeline composition on a background frame clock:
//! - Sequential `add` calls that block until the previous animation ends
//! - Parallel `with` calls sharing a start frame
//! - A repeating scheduled event
//! - Frames captured through a sink and summarized at the end
//!
//! Run with: RUST_LOG=easel_canvas=debug cargo run -p easel_canvas --example bouncing_squares

use anyhow::Result;
use easel_canvas::prelude::*;
use std::thread;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = match std::env::args().nth(1) {
        Some(path) => CanvasOptions::load(path)?,
        None => CanvasOptions::default().with_background_color(Color::rgb(24, 24, 32)),
    };

    let canvas = Canvas::new(640.0, 360.0, "Bouncing Squares", options)?;
    let frames = CapturedFrames::with_limit(1);
    canvas.set_sink(frames.clone());

    canvas.schedule(1.0, TimeUnit::Seconds, true, |c| {
        tracing::info!(
            "second {} ({} animations active)",
            c.frame() / i64::from(c.fps()),
            c.active_animation_count()
        );
    })?;

    let colors = [Color::RED, Color::GREEN, Color::ORANGE];
    let workers: Vec<_> = colors
        .into_iter()
        .enumerate()
        .map(|(i, color)| {
            let x = 120.0 + 200.0 * i as f64;
            let square = canvas.add(Rectangle::square(x, 60.0, 40.0).with_color(color));
            thread::spawn(move || -> easel_canvas::prelude::Result<()> {
                square
                    .animate()
                    .wait(0.25 * i as f64)?
                    .add(Animation::move_to(x, 300.0).easing(Easing::InQuad), 0.8)?
                    .with(Animation::rotate_by(180.0), 0.8)?
                    .add(Animation::move_to(x, 60.0).easing(Easing::OutBounce), 1.2)?
                    .with(Animation::fade_to(0.4), 1.2)?
                    .add(Animation::fade_in(), 0.5)?;
                Ok(())
            })
        })
        .collect();

    for worker in workers {
        worker
            .join()
            .map_err(|_| anyhow::anyhow!("timeline thread panicked"))??;
    }
    canvas.sleep()?;

    let title = Text::new("done", 320.0, 180.0)
        .with_font_size(48.0)
        .with_color(Color::WHITE.with_alpha(0));
    let label = canvas.add(title);
    label.fade_in(0.5)?;
    canvas.sleep()?;

    if let Some(last) = frames.last() {
        tracing::info!(
            "finished on frame {} with {} draw commands",
            last.frame,
            last.commands.len()
        );
    }
    canvas.stop();
    Ok(())
}
