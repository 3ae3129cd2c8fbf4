//! Slowly drifting humidity that scales wave amplitude.

use crate::host::UniformRandomSource;

/// Humidity returned while a storm is forced
pub const STORM_HUMIDITY: f32 = 1.0;

/// Smoothly interpolates between random humidity targets drawn on a fixed
/// time quantum. Called once per frame from the host loop.
#[derive(Debug, Clone)]
pub struct HumidityModulator {
    prev_value: f32,
    next_value: f32,
    prev_update_time: f32,
    update_frequency_hz: f32,
}

impl HumidityModulator {
    /// Start with both endpoints drawn from `rng`
    pub fn new<R: UniformRandomSource + ?Sized>(update_frequency_hz: f32, rng: &mut R) -> Self {
        let prev_value = rng.next_uniform();
        let next_value = rng.next_uniform();
        Self {
            prev_value,
            next_value,
            prev_update_time: 0.0,
            update_frequency_hz,
        }
    }

    pub fn set_update_frequency(&mut self, update_frequency_hz: f32) {
        self.update_frequency_hz = update_frequency_hz;
    }

    /// Humidity in `[0, 1]` at absolute time `now` (seconds)
    pub fn tick<R: UniformRandomSource + ?Sized>(&mut self, now: f32, force_storm: bool, rng: &mut R) -> f32 {
        if force_storm {
            self.prev_update_time = now;
            return STORM_HUMIDITY;
        }

        let freq = self.update_frequency_hz;
        if !(freq.is_finite() && freq > 0.0) {
            // No quantum to advance through; hold the current target
            self.prev_update_time = now;
            return self.prev_value.clamp(0.0, 1.0);
        }

        let quantum = (now * freq).floor();
        let prev_quantum = (self.prev_update_time * freq).floor();
        if quantum != prev_quantum {
            self.prev_value = self.next_value;
            self.next_value = rng.next_uniform();
        }
        self.prev_update_time = now;

        let frac = (now * freq - quantum).clamp(0.0, 1.0);
        smoothstep(self.prev_value, self.next_value, frac).clamp(0.0, 1.0)
    }
}

/// Cubic Hermite interpolation from `from` to `to`
pub fn smoothstep(from: f32, to: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let t = t * t * (3.0 - 2.0 * t);
    from + (to - from) * t
}

/// Real-time wave scale for a humidity value
pub fn wave_scale_for(humidity: f32, wave_scale: f32) -> f32 {
    wave_scale * humidity.clamp(0.0, 1.0)
}
