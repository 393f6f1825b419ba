
pub struct FrameCounter {

    frame_in_flight: usize,
    current: usize,
    action : FrameAction,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FrameAction {
    Rendering,
    SwapchainRecreate,
    Terminal,
}

impl FrameAction {

    fn severity(&self) -> u8 {
        match self {
            | FrameAction::Rendering         => 0,
            | FrameAction::SwapchainRecreate => 1,
            | FrameAction::Terminal          => 2,
        }
    }
}

impl FrameCounter {

    pub fn new(frame_in_flight: usize) -> FrameCounter {

        FrameCounter {
            frame_in_flight: frame_in_flight.max(1),
            current: 0,
            action: FrameAction::Rendering,
        }
    }

    #[inline]
    pub fn current_frame(&self) -> usize {
        self.current
    }

    #[inline]
    pub fn current_action(&self) -> FrameAction {
        self.action
    }

    /// Keep the most severe action requested since the last frame, `Terminal` above `SwapchainRecreate` above `Rendering`.
    #[inline]
    pub fn set_action(&mut self, action: FrameAction) {
        if action.severity() > self.action.severity() {
            self.action = action;
        }
    }

    #[inline]
    pub fn next_frame(&mut self) {

        self.current = (self.current + 1) % self.frame_in_flight;
        if self.action != FrameAction::Terminal {
            self.action = FrameAction::Rendering;
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn frames_cycle_through_flight_slots() {

        let mut counter = FrameCounter::new(2);
        assert_eq!(counter.current_frame(), 0);

        counter.set_action(FrameAction::SwapchainRecreate);
        counter.next_frame();
        assert_eq!(counter.current_frame(), 1);
        assert_eq!(counter.current_action(), FrameAction::Rendering);

        counter.next_frame();
        assert_eq!(counter.current_frame(), 0);
    }

    #[test]
    fn terminal_is_not_overwritten() {

        let mut counter = FrameCounter::new(3);
        counter.set_action(FrameAction::Terminal);
        counter.set_action(FrameAction::SwapchainRecreate);
        counter.next_frame();

        assert_eq!(counter.current_action(), FrameAction::Terminal);
    }

    #[test]
    fn recreate_survives_a_later_rendering_request() {

        let mut counter = FrameCounter::new(2);
        counter.set_action(FrameAction::SwapchainRecreate);
        counter.set_action(FrameAction::Rendering);

        assert_eq!(counter.current_action(), FrameAction::SwapchainRecreate);
    }
}
