use std::f64::consts::TAU;

use crate::engine::types::{MotorCommand, PatternKind};

/**
 * Number of steps in one full Wave cycle. At 0.05s per step this gives a
 * sine period of 2 seconds.
 */
pub const WAVE_STEPS: usize = 40;

/// Produces the infinite command sequence for one pattern at one intensity.
///
/// The generator is a plain cycle counter; it is restartable by constructing
/// a new one, which always yields the sequence from its start.
#[derive(Debug, Clone)]
pub struct PatternGenerator {
    kind: PatternKind,
    intensity: u8,
    step: usize,
}

impl PatternGenerator {
    pub fn new(kind: PatternKind, intensity: u8) -> PatternGenerator {
        PatternGenerator { kind, intensity, step: 0 }
    }

    fn cycle_steps(&self) -> usize {
        match self.kind {
            PatternKind::Constant => 1,
            PatternKind::Pulse => 2,
            PatternKind::Wave => WAVE_STEPS,
            PatternKind::Heartbeat => 4,
        }
    }

    fn command(&self) -> MotorCommand {
        let intensity = self.intensity;

        match self.kind {
            PatternKind::Constant => MotorCommand::uniform(intensity, 0.05),

            PatternKind::Pulse => match self.step {
                0 => MotorCommand::uniform(intensity, 0.3),
                _ => MotorCommand::uniform(0, 0.3),
            },

            PatternKind::Wave => {
                // sine scaled to [0, 1]
                let level = (f64::sin(TAU * self.step as f64 / WAVE_STEPS as f64) + 1.0) / 2.0;
                MotorCommand::uniform((intensity as f64 * level).round() as u8, 0.05)
            },

            // double beat, the second one weaker, then a long rest
            PatternKind::Heartbeat => match self.step {
                0 => MotorCommand::uniform(intensity, 0.1),
                1 => MotorCommand::uniform(0, 0.1),
                2 => MotorCommand::uniform((intensity as f64 * 0.7).round() as u8, 0.1),
                _ => MotorCommand::uniform(0, 0.6),
            },
        }
    }
}

impl Iterator for PatternGenerator {
    type Item = MotorCommand;

    /// Never returns `None`; every pattern repeats forever.
    fn next(&mut self) -> Option<MotorCommand> {
        let command = self.command();
        self.step = (self.step + 1) % self.cycle_steps();
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::engine::types::{MotorCommand, PatternKind};

    fn take(kind: PatternKind, intensity: u8, count: usize) -> Vec<MotorCommand> {
        PatternGenerator::new(kind, intensity).take(count).collect()
    }

    #[test]
    fn constant_repeats_the_same_command_forever() {
        for intensity in [0, 1, 128, 255] {
            let commands = take(PatternKind::Constant, intensity, 100);
            assert!(commands.iter().all(|c| *c == MotorCommand::uniform(intensity, 0.05)));
        }
    }

    #[test]
    fn pulse_alternates_on_and_off() {
        let commands = take(PatternKind::Pulse, 200, 4);
        assert_eq!(commands, vec![
            MotorCommand::uniform(200, 0.3),
            MotorCommand::uniform(0, 0.3),
            MotorCommand::uniform(200, 0.3),
            MotorCommand::uniform(0, 0.3),
        ]);
    }

    #[test]
    fn wave_has_a_40_step_period() {
        let commands = take(PatternKind::Wave, 255, 80);
        assert_eq!(commands[..40], commands[40..]);
    }

    #[test]
    fn wave_peaks_at_step_10_and_rests_at_step_30() {
        let commands = take(PatternKind::Wave, 255, 40);
        // sin(0) = 0, so the cycle starts at the midpoint
        assert_eq!(commands[0].left, 128);
        assert_eq!(commands[10].left, 255);
        assert_eq!(commands[30].left, 0);
        assert!(commands.iter().all(|c| c.left == c.right));
        assert!(commands.iter().all(|c| c.hold == Duration::from_millis(50)));
    }

    #[test]
    fn wave_scales_with_intensity() {
        let commands = take(PatternKind::Wave, 100, 40);
        assert_eq!(commands[10].left, 100);
        assert_eq!(commands[30].left, 0);
    }

    #[test]
    fn heartbeat_is_a_double_beat_with_a_long_rest() {
        let commands = take(PatternKind::Heartbeat, 200, 8);
        let cycle = vec![
            MotorCommand::uniform(200, 0.1),
            MotorCommand::uniform(0, 0.1),
            MotorCommand::uniform(140, 0.1), // round(200 * 0.7)
            MotorCommand::uniform(0, 0.6),
        ];
        assert_eq!(commands[..4], cycle[..]);
        assert_eq!(commands[4..], cycle[..]);
    }

    #[test]
    fn a_fresh_generator_restarts_from_the_beginning() {
        let first = take(PatternKind::Heartbeat, 90, 7);
        let second = take(PatternKind::Heartbeat, 90, 7);
        assert_eq!(first, second);
    }
}
