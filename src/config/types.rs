use serde::{Deserialize, Serialize};

use crate::engine::types::PatternKind;

/// Settings restored at startup and saved whenever the user changes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Slider position, 0-100.
    pub intensity_percent: u8,
    pub pattern: PatternKind,
}

impl Config {
    /// Clamps values that a hand-edited config file could push out of range.
    pub fn sanitize(&mut self) {
        self.intensity_percent = self.intensity_percent.min(100);
    }

    /// The slider percentage mapped onto the 0-255 motor range.
    pub fn motor_intensity(&self) -> u8 {
        (self.intensity_percent.min(100) as u16 * 255 / 100) as u8
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            intensity_percent: 50,
            pattern: PatternKind::Constant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_half_intensity_constant() {
        let config = Config::default();
        assert_eq!(config.intensity_percent, 50);
        assert_eq!(config.pattern, PatternKind::Constant);
    }

    #[test]
    fn motor_intensity_spans_the_full_range() {
        let mut config = Config::default();

        config.intensity_percent = 0;
        assert_eq!(config.motor_intensity(), 0);

        config.intensity_percent = 50;
        assert_eq!(config.motor_intensity(), 127);

        config.intensity_percent = 100;
        assert_eq!(config.motor_intensity(), 255);
    }

    #[test]
    fn sanitize_clamps_out_of_range_percentages() {
        let mut config = Config { intensity_percent: 150, pattern: PatternKind::Wave };
        config.sanitize();
        assert_eq!(config.intensity_percent, 100);
        assert_eq!(config.pattern, PatternKind::Wave);
    }
}
