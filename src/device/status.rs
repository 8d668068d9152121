use std::convert::Infallible;

use futures::SinkExt;
use futures::channel::mpsc::Sender;
use iced::subscription::{self, Subscription};
use log::warn;
use tokio::task::spawn_blocking;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

use crate::device::constants::CONNECTION_CHECK_INTERVAL;
use crate::device::manager::DeviceManager;
use crate::device::types::{DeviceEvent, DeviceState, MotorDevice};

/// Polls the controller connection, reconnecting when it is gone and
/// reporting state changes to the gui.
async fn poll_connection(
    cancel: CancellationToken,
    manager: DeviceManager,
    mut sender: Sender<DeviceEvent>,
) -> Infallible {
    let mut previous_state: Option<DeviceState> = None;

    loop {
        if !manager.is_connected() {
            // hid enumeration is blocking, keep it off the async runtime
            let manager2 = manager.clone();
            let connect_result = spawn_blocking(move || manager2.connect()).await;

            if let Err(err) = connect_result {
                warn!("Failed to join connect task: {}", err);
            }
        }

        let state = if manager.is_connected() {
            DeviceState::Connected { connection: manager.connection_type() }
        } else {
            DeviceState::Disconnected
        };

        if previous_state.as_ref() != Some(&state) {
            sender.send(DeviceEvent::StateChange(state.clone())).await
                .expect("Failed to send DeviceEvent");
            previous_state = Some(state);
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                manager.disconnect();

                // note: subscription::channel expects the future to never
                // resolve, so park instead of returning
                futures::future::pending::<()>().await;
            },
            _ = sleep(Duration::from_millis(CONNECTION_CHECK_INTERVAL)) => {},
        }
    }
}

pub fn connection_status_subscription(cancel: CancellationToken, manager: DeviceManager) -> Subscription<DeviceEvent> {
    struct ConnectionStatus;

    subscription::channel(
        std::any::TypeId::of::<ConnectionStatus>(),
        16,
        move |subscription_sender| {
            let cancel2 = cancel.clone();
            let manager2 = manager.clone();

            async move {
                poll_connection(cancel2, manager2, subscription_sender).await
            }
        },
    )
}
