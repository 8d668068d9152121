use std::convert::Infallible;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use futures::channel::mpsc::{channel, Sender};
use iced::subscription::{self, Subscription};
use tokio_util::sync::CancellationToken;

use crate::device::manager::DeviceManager;
use crate::engine::VibrationEngine;
use crate::engine::types::{EngineCommand, EngineEvent};

/// Runs the vibration engine for the lifetime of the application.
///
/// The gui cannot call the async engine operations directly, so the engine
/// lives inside this task and is driven over a command channel. The channel
/// sender is handed to the gui in the first event (`EngineEvent::Ready`).
async fn run_engine(
    cancel: CancellationToken,
    device: DeviceManager,
    mut gui: Sender<EngineEvent>,
) -> Infallible {
    let (command_sender, mut commands) = channel::<EngineCommand>(8);
    gui.send(EngineEvent::Ready(command_sender)).await
        .expect("Failed to send EngineEvent");

    let (event_sender, mut events) = channel::<EngineEvent>(64);
    let mut engine = VibrationEngine::new(Arc::new(device), event_sender);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                engine.stop().await;

                // note: subscription::channel expects the future to never
                // resolve, so park instead of returning
                futures::future::pending::<()>().await;
            },
            Some(command) = commands.next() => match command {
                EngineCommand::Start { intensity, pattern } => {
                    engine.start(intensity, pattern).await;
                },
                EngineCommand::Stop => {
                    engine.stop().await;
                },
                EngineCommand::SetIntensity(value) => {
                    engine.set_intensity(value);
                },
                EngineCommand::SetPattern(kind) => {
                    engine.set_pattern(kind);
                },
            },
            Some(event) = events.next() => {
                // a worker fault ends the run: stop before telling the gui
                if let EngineEvent::Error(_) = &event {
                    engine.stop().await;
                }

                gui.send(event).await.expect("Failed to send EngineEvent");
            },
        }
    }
}

pub fn engine_subscription(cancel: CancellationToken, device: DeviceManager) -> Subscription<EngineEvent> {
    struct Engine;

    subscription::channel(
        std::any::TypeId::of::<Engine>(),
        64,
        move |subscription_sender| {
            let cancel2 = cancel.clone();
            let device2 = device.clone();

            async move {
                run_engine(cancel2, device2, subscription_sender).await
            }
        },
    )
}
