use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{Instant, MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::compositor::RenderSurface;
use crate::events::{SlideEvent, SliderCommand};
use crate::slider::Slider;
use crate::transition::TransitionRequest;

/// Drive a mounted slider on the tokio clock until cancelled.
///
/// The slider's clock starts when this task starts, so it should be mounted
/// at `Duration::ZERO`. Frames tick every `frame_interval`; commands are
/// applied between frames. On cancellation the slider is unmounted and
/// handed back.
pub async fn run<S: RenderSurface>(
    mut slider: Slider<S>,
    mut commands: Receiver<SliderCommand>,
    events: Sender<SlideEvent>,
    frame_interval: Duration,
    cancel: CancellationToken,
) -> Result<Slider<S>> {
    let origin = Instant::now();
    let mut frames = interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut commands_open = true;

    loop {
        select! {
            _ = cancel.cancelled() => break,

            _ = frames.tick() => {
                for event in slider.tick(origin.elapsed())? {
                    publish(&events, event);
                }
            }

            maybe_cmd = commands.recv(), if commands_open => {
                let Some(cmd) = maybe_cmd else {
                    // Producer gone; autoplay keeps running.
                    commands_open = false;
                    continue;
                };
                let now = origin.elapsed();
                debug!(?cmd, "slider command");
                let request = match cmd {
                    SliderCommand::GoTo(index) => slider.go_to_slide(index, now),
                    SliderCommand::Next => slider.next(now),
                    SliderCommand::Resize { width, height } => {
                        slider.resize(width, height, now);
                        continue;
                    }
                };
                if let TransitionRequest::Started { from, to } = request {
                    publish(&events, SlideEvent::TransitionStarted { from, to });
                }
            }
        }
    }

    slider.unmount();
    info!(elapsed = ?origin.elapsed(), "slider task stopped");
    Ok(slider)
}

fn publish(events: &Sender<SlideEvent>, event: SlideEvent) {
    if let Err(err) = events.try_send(event) {
        warn!(?event, error = %err, "slide event dropped");
    }
}
