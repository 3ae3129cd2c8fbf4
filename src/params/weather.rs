//! Weather variability driving the real-time wave amplitude.

/// Humidity modulator settings
#[derive(Debug, Clone)]
pub struct HumiditySettings {
    /// How often a new humidity target is drawn (Hz).
    /// 1/30 means one new target every 30 seconds.
    pub update_frequency_hz: f32,

    /// Hold humidity at its maximum (full storm)
    pub force_storm: bool,
}

impl Default for HumiditySettings {
    fn default() -> Self {
        Self {
            update_frequency_hz: 1.0 / 30.0,
            force_storm: false,
        }
    }
}
