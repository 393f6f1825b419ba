
use std::time::{Duration, Instant};

const FPS_SAMPLE_COUNT: usize = 5;
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Frame timing of the render loop.
pub struct FpsCounter {

    counter: Instant,
    last_report: Instant,

    samples: [Duration; FPS_SAMPLE_COUNT],
    current_frame: usize,
    delta_frame: Duration,
}

impl FpsCounter {

    pub fn new() -> FpsCounter {

        let now = Instant::now();

        FpsCounter {
            counter: now,
            last_report: now,
            samples: [Duration::from_millis(16); FPS_SAMPLE_COUNT],
            current_frame: 0,
            delta_frame: Duration::from_secs(0),
        }
    }

    /// Call this function in game loop to update its inner status.
    pub fn tick_frame(&mut self) {

        let now = Instant::now();
        self.record(now - self.counter);
        self.counter = now;
    }

    fn record(&mut self, frame_time: Duration) {

        self.delta_frame = frame_time;
        self.samples[self.current_frame] = frame_time;
        self.current_frame = (self.current_frame + 1) % FPS_SAMPLE_COUNT;
    }

    /// The average FPS over the last few frames.
    pub fn fps(&self) -> f32 {

        let sum: Duration = self.samples.iter().sum();
        let average = sum.as_secs_f32() / FPS_SAMPLE_COUNT as f32;

        if average > 0.0 { 1.0 / average } else { 0.0 }
    }

    /// Time of the last frame in seconds.
    pub fn delta_time(&self) -> f32 {
        self.delta_frame.as_secs_f32()
    }

    /// Return the FPS once every second.
    pub fn report(&mut self) -> Option<f32> {

        if self.last_report.elapsed() >= REPORT_INTERVAL {
            self.last_report = Instant::now();
            Some(self.fps())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn fps_averages_samples() {

        let mut counter = FpsCounter::new();
        for _ in 0..FPS_SAMPLE_COUNT {
            counter.record(Duration::from_millis(20));
        }

        assert!((counter.fps() - 50.0).abs() < 1e-3);
        assert!((counter.delta_time() - 0.02).abs() < 1e-6);
    }
}
