use std::time::Duration;

use gloo_timers::callback::Timeout;
use jewelchat_chat::Scheduler;

/// `setTimeout`-backed scheduler; dropping the [`Timeout`] clears it
#[derive(Clone, Copy, Default)]
pub struct TimeoutScheduler;

impl Scheduler for TimeoutScheduler {
    type Handle = Timeout;

    fn schedule(&self, delay: Duration, task: Box<dyn FnOnce()>) -> Timeout {
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        Timeout::new(millis, task)
    }
}
