
use std::time::Duration;

use crate::{vklint, vkfloat};

#[derive(Debug, Copy, Clone)]
pub enum VkTimeDuration {
    Immediate,
    Time(Duration),
    Infinite,
}

impl From<VkTimeDuration> for vklint {

    fn from(time: VkTimeDuration) -> vklint {
        match time {
            | VkTimeDuration::Immediate => 0,
            | VkTimeDuration::Time(time) =>
                (time.subsec_nanos() as vklint) + time.as_secs() * 1_000_000_000,
            | VkTimeDuration::Infinite => vklint::MAX,
        }
    }
}

/// A looping animation clock in `[0, 1)`.
#[derive(Debug, Clone)]
pub struct AnimationTimer {

    /// the normalized position in the current animation cycle.
    pub timer: vkfloat,
    /// the number of cycles per second.
    pub speed: vkfloat,
    pub paused: bool,
}

impl Default for AnimationTimer {

    fn default() -> AnimationTimer {
        AnimationTimer {
            timer: 0.0,
            speed: 0.25,
            paused: false,
        }
    }
}

impl AnimationTimer {

    pub fn with_speed(speed: vkfloat) -> AnimationTimer {
        AnimationTimer { speed, ..Default::default() }
    }

    /// Advance the timer by `delta_time` seconds unless paused.
    pub fn tick(&mut self, delta_time: vkfloat) {

        if self.paused {
            return
        }

        self.timer += self.speed * delta_time;
        self.timer = self.timer.rem_euclid(1.0);

        // rem_euclid may round up to exactly 1.0 for tiny negative values.
        if self.timer >= 1.0 {
            self.timer = 0.0;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn duration_converts_to_nanoseconds() {

        assert_eq!(vklint::from(VkTimeDuration::Immediate), 0);
        assert_eq!(vklint::from(VkTimeDuration::Time(Duration::from_millis(1500))), 1_500_000_000);
        assert_eq!(vklint::from(VkTimeDuration::Infinite), vklint::MAX);
    }

    #[test]
    fn timer_wraps_into_unit_interval() {

        let mut timer = AnimationTimer::with_speed(0.125);

        timer.tick(4.0);
        assert!((timer.timer - 0.5).abs() < 1e-6);

        timer.tick(6.0);
        assert!((timer.timer - 0.25).abs() < 1e-6);
        assert!(timer.timer >= 0.0 && timer.timer < 1.0);
    }

    #[test]
    fn paused_timer_does_not_move() {

        let mut timer = AnimationTimer::default();
        timer.tick(1.0);
        timer.toggle_pause();
        timer.tick(1.0);

        assert!((timer.timer - 0.25).abs() < 1e-6);

        timer.toggle_pause();
        timer.tick(1.0);
        assert!((timer.timer - 0.5).abs() < 1e-6);
    }
}
