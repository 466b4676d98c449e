//! Controller event loop
//!
//! Multiplexes surface events, executor responses and the debounce timer
//! onto one foreground task. Typically spawned with `tokio::spawn` (or run on
//! a `LocalSet` for `!Send` surfaces) right after `ScreeningController::spawn`.

use log::debug;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use super::ScreeningController;
use crate::executor::ExecutorResponse;
use crate::surface::{SurfaceEvent, TextSurface};

/// Drive `controller` until `Detach` arrives or the event channel closes
///
/// Returns the detached controller so the host can take its surface back.
pub async fn run<S: TextSurface>(
    mut controller: ScreeningController<S>,
    mut events: mpsc::UnboundedReceiver<SurfaceEvent>,
    mut responses: mpsc::UnboundedReceiver<ExecutorResponse>,
) -> ScreeningController<S> {
    loop {
        let deadline = controller.debounce_deadline();

        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if !controller.handle_event(event, Instant::now()) {
                        break;
                    }
                }
                None => {
                    debug!("Surface event channel closed, detaching");
                    controller.detach();
                    break;
                }
            },
            Some(response) = responses.recv() => {
                controller.on_response(response);
            }
            _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                controller.poll_debounce(Instant::now());
            }
        }
    }

    controller
}
