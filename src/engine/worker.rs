use std::sync::{Arc, Mutex};

use futures::SinkExt;
use futures::channel::mpsc::Sender;
use log::warn;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::device::types::MotorDevice;
use crate::engine::patterns::PatternGenerator;
use crate::engine::types::{EngineEvent, EngineSettings};

/// The body of the single worker task that drives the motors while the
/// engine is active.
///
/// The loop snapshots the shared settings, plays the matching pattern, and
/// abandons the sequence at the next command boundary whenever the settings
/// no longer match the snapshot. The hold between commands is interruptible,
/// so a stop request takes effect immediately instead of after the remaining
/// hold duration.
pub(crate) async fn run_pattern_loop(
    cancel: CancellationToken,
    settings: Arc<Mutex<EngineSettings>>,
    device: Arc<dyn MotorDevice>,
    mut events: Sender<EngineEvent>,
) {
    'mainloop: loop {
        if cancel.is_cancelled() {
            break 'mainloop;
        }

        let snapshot = *settings.lock().expect("Failed to lock EngineSettings");
        let generator = PatternGenerator::new(snapshot.pattern, snapshot.intensity);

        for command in generator {
            if cancel.is_cancelled() {
                break 'mainloop;
            }

            if *settings.lock().expect("Failed to lock EngineSettings") != snapshot {
                // re-snapshot and build a fresh generator
                continue 'mainloop;
            }

            if let Err(err) = device.set_motors(command.left, command.right) {
                warn!("Motor write failed, stopping the run: {}", err);

                // deliver the fault, unless a stop request raced ahead of it
                tokio::select! {
                    _ = cancel.cancelled() => {},
                    result = events.send(EngineEvent::Error(format!("{}", err))) => {
                        result.expect("Failed to send EngineEvent");
                    },
                }
                break 'mainloop;
            }

            // the send is cancellable too, so that a stop request is never
            // stuck behind a saturated event channel
            tokio::select! {
                _ = cancel.cancelled() => {
                    break 'mainloop;
                },
                result = events.send(EngineEvent::IntensityChanged(command.left.max(command.right))) => {
                    result.expect("Failed to send EngineEvent");
                },
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    break 'mainloop;
                },
                _ = sleep(command.hold) => {},
            }
        }
    }

    // The motors must never be left running, no matter how the loop ended.
    device.stop_motors();
}
