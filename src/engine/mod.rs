use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::channel::mpsc::Sender;
use log::{info, warn};
use tokio::spawn;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::device::types::MotorDevice;
use crate::engine::types::{EngineEvent, EngineSettings, PatternKind};
use crate::engine::worker::run_pattern_loop;

pub mod patterns;
pub mod task;
pub mod types;
mod worker;

/**
 * How long (milliseconds) stop() waits for the worker task to exit before
 * abandoning it. The worker wakes immediately on cancellation, so this
 * deadline should never be reached in practice.
 */
pub const STOP_DEADLINE: u64 = 1000;

struct Worker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owns the lifecycle of the single background worker task that drives the
/// controller motors.
///
/// At most one worker is alive per engine at any time: `start` on a running
/// engine stops the old worker before spawning a new one. On every exit
/// path, including worker errors and the stop deadline, the motors are
/// forced back to (0, 0).
pub struct VibrationEngine {
    device: Arc<dyn MotorDevice>,
    settings: Arc<Mutex<EngineSettings>>,
    events: Sender<EngineEvent>,
    worker: Option<Worker>,
}

impl VibrationEngine {
    pub fn new(device: Arc<dyn MotorDevice>, events: Sender<EngineEvent>) -> VibrationEngine {
        VibrationEngine {
            device,
            settings: Arc::new(Mutex::new(EngineSettings::default())),
            events,
            worker: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.worker.is_some()
    }

    /// Starts the pattern worker. If one is already running it is stopped
    /// first, so calling this twice never leaves two motor writers alive.
    pub async fn start(&mut self, intensity: u8, pattern: PatternKind) {
        if self.worker.is_some() {
            self.stop().await;
        }

        {
            let mut settings = self.settings.lock().expect("Failed to lock EngineSettings");
            settings.intensity = intensity;
            settings.pattern = pattern;
        }

        info!("Starting vibration: {} at intensity {}", pattern, intensity);

        let cancel = CancellationToken::new();
        let handle = spawn(run_pattern_loop(
            cancel.clone(),
            self.settings.clone(),
            self.device.clone(),
            self.events.clone(),
        ));

        self.worker = Some(Worker { cancel, handle });
    }

    /// Stops the worker and forces the motors off. No-op when idle.
    pub async fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        worker.cancel.cancel();

        match timeout(Duration::from_millis(STOP_DEADLINE), worker.handle).await {
            Ok(result) => result.expect("Failed to join vibration worker"),
            Err(_) => warn!("Vibration worker did not stop within {}ms, abandoning it", STOP_DEADLINE),
        }

        // The worker already stops the motors on exit; repeated here in case
        // it was abandoned.
        self.device.stop_motors();
        info!("Vibration stopped");
    }

    /// Visible to the worker at its next command boundary; the current
    /// pattern sequence is abandoned and restarted at the new intensity.
    pub fn set_intensity(&self, value: u8) {
        let mut settings = self.settings.lock().expect("Failed to lock EngineSettings");
        settings.intensity = value;
    }

    /// Same boundary semantics as `set_intensity`.
    pub fn set_pattern(&self, kind: PatternKind) {
        let mut settings = self.settings.lock().expect("Failed to lock EngineSettings");
        settings.pattern = kind;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use futures::StreamExt;
    use futures::channel::mpsc::{channel, Receiver};

    use super::*;
    use crate::error::DeviceError;

    struct FakeDevice {
        writes: Mutex<Vec<(u8, u8)>>,
        // writes past this index fail, usize::MAX means never
        fail_after: AtomicUsize,
    }

    impl FakeDevice {
        fn new() -> Arc<FakeDevice> {
            Arc::new(FakeDevice {
                writes: Mutex::new(Vec::new()),
                fail_after: AtomicUsize::new(usize::MAX),
            })
        }

        fn last_write(&self) -> Option<(u8, u8)> {
            self.writes.lock().unwrap().last().copied()
        }

        fn write_count(&self) -> usize {
            self.writes.lock().unwrap().len()
        }
    }

    impl MotorDevice for FakeDevice {
        fn is_connected(&self) -> bool {
            true
        }

        fn set_motors(&self, left: u8, right: u8) -> Result<(), DeviceError> {
            let mut writes = self.writes.lock().unwrap();
            if writes.len() >= self.fail_after.load(Ordering::SeqCst) {
                return Err(DeviceError::Hid {
                    source: hidapi::HidError::HidApiError { message: "controller unplugged".to_string() },
                });
            }
            writes.push((left, right));
            Ok(())
        }
    }

    fn engine_with_fake() -> (VibrationEngine, Arc<FakeDevice>, Receiver<EngineEvent>) {
        let device = FakeDevice::new();
        let (events_tx, events_rx) = channel::<EngineEvent>(64);
        let engine = VibrationEngine::new(device.clone(), events_tx);
        (engine, device, events_rx)
    }

    async fn next_intensity(events: &mut Receiver<EngineEvent>) -> u8 {
        match events.next().await {
            Some(EngineEvent::IntensityChanged(value)) => value,
            other => panic!("Expected IntensityChanged, got {:?}", other),
        }
    }

    fn drain(events: &mut Receiver<EngineEvent>) {
        while let Ok(Some(_)) = events.try_next() {}
    }

    #[tokio::test(start_paused = true)]
    async fn stop_when_idle_is_a_noop() {
        let (mut engine, device, _events) = engine_with_fake();

        assert!(!engine.is_active());
        engine.stop().await;
        assert!(!engine.is_active());
        assert_eq!(device.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn start_then_stop_leaves_motors_stopped() {
        let (mut engine, device, mut events) = engine_with_fake();

        engine.start(200, PatternKind::Pulse).await;
        assert!(engine.is_active());
        assert_eq!(next_intensity(&mut events).await, 200);

        engine.stop().await;
        assert!(!engine.is_active());
        assert_eq!(device.last_write(), Some((0, 0)));
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_the_worker() {
        let (mut engine, _device, mut events) = engine_with_fake();

        engine.start(100, PatternKind::Constant).await;
        assert_eq!(next_intensity(&mut events).await, 100);

        // no stop() in between; the engine stops the first worker itself
        engine.start(50, PatternKind::Wave).await;
        assert!(engine.is_active());

        // everything emitted from here on comes from the second run
        drain(&mut events);
        for _ in 0..10 {
            assert!(next_intensity(&mut events).await <= 50);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn set_intensity_applies_without_a_restart() {
        let (mut engine, _device, mut events) = engine_with_fake();

        engine.start(200, PatternKind::Constant).await;
        assert_eq!(next_intensity(&mut events).await, 200);

        engine.set_intensity(60);

        // values already in flight are still 200; the new intensity must show
        // up at a command boundary, without stop()/start()
        let mut seen_new_value = false;
        for _ in 0..100 {
            let value = next_intensity(&mut events).await;
            assert!(value == 200 || value == 60);
            if value == 60 {
                seen_new_value = true;
                break;
            }
        }
        assert!(seen_new_value);
        assert!(engine.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn set_pattern_applies_without_a_restart() {
        let (mut engine, _device, mut events) = engine_with_fake();

        engine.start(200, PatternKind::Constant).await;
        assert_eq!(next_intensity(&mut events).await, 200);

        engine.set_pattern(PatternKind::Pulse);

        // Constant never emits 0, so a 0 proves the pulse pattern took over
        let mut seen_off_phase = false;
        for _ in 0..100 {
            if next_intensity(&mut events).await == 0 {
                seen_off_phase = true;
                break;
            }
        }
        assert!(seen_off_phase);
    }

    #[tokio::test(start_paused = true)]
    async fn device_fault_emits_one_error_and_ends_the_run() {
        let (mut engine, device, mut events) = engine_with_fake();
        device.fail_after.store(1, Ordering::SeqCst);

        engine.start(150, PatternKind::Constant).await;

        // first command succeeds, second write faults
        assert_eq!(next_intensity(&mut events).await, 150);
        match events.next().await {
            Some(EngineEvent::Error(message)) => {
                assert!(message.contains("controller unplugged"));
            },
            other => panic!("Expected Error, got {:?}", other),
        }

        // the worker is done; nothing further is emitted
        assert!(events.try_next().is_err());

        engine.stop().await;
        assert!(!engine.is_active());
    }
}
