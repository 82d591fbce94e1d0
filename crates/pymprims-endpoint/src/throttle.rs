use pymprims_host::{Host, TimerId};

/// Leading and trailing edge throttle over the host clock.
///
/// The first call in a quiet period fires immediately. Calls inside the window
/// schedule one trailing timer for the rest of the window; when it fires, the
/// caller should invoke the throttled action again.
#[derive(Debug, Clone)]
pub struct Throttle {
    wait_ms: u64,
    previous_ms: Option<u64>,
    trailing: Option<TimerId>,
}

impl Throttle {
    /// Create a throttle allowing one call per `wait_ms`.
    pub fn new(wait_ms: u64) -> Self {
        Self {
            wait_ms,
            previous_ms: None,
            trailing: None,
        }
    }

    /// Window length in milliseconds.
    pub fn wait_ms(&self) -> u64 {
        self.wait_ms
    }

    /// Record a call. Returns true if the action should run now.
    pub fn call<H: Host + ?Sized>(&mut self, host: &H) -> bool {
        let now = host.now_ms();
        let remaining = match self.previous_ms {
            // A clock that moved backwards counts as a fresh window.
            Some(previous) if now >= previous => self.wait_ms.checked_sub(now - previous),
            _ => None,
        };

        match remaining {
            Some(remaining) if remaining > 0 => {
                if self.trailing.is_none() {
                    self.trailing = Some(host.set_timeout(remaining));
                }
                false
            }
            _ => {
                if let Some(timer) = self.trailing.take() {
                    host.clear_timer(timer);
                }
                self.previous_ms = Some(now);
                true
            }
        }
    }

    /// Handle a fired timer. Returns true if it was this throttle's trailing
    /// call and the action should run now.
    pub fn on_timer<H: Host + ?Sized>(&mut self, timer: TimerId, host: &H) -> bool {
        if self.trailing != Some(timer) {
            return false;
        }
        self.trailing = None;
        self.previous_ms = Some(host.now_ms());
        true
    }

    /// Returns true if a trailing call is scheduled.
    pub fn is_pending(&self) -> bool {
        self.trailing.is_some()
    }

    /// Cancel any scheduled trailing call.
    pub fn cancel<H: Host + ?Sized>(&mut self, host: &H) {
        if let Some(timer) = self.trailing.take() {
            host.clear_timer(timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use pymprims_host::{HostEvent, MemoryPage};

    use super::*;

    fn fire_due(throttle: &mut Throttle, page: &MemoryPage, ms: u64) -> usize {
        page.advance(ms)
            .into_iter()
            .filter(|event| match event {
                HostEvent::Timer(timer) => throttle.on_timer(*timer, page),
                _ => false,
            })
            .count()
    }

    #[test]
    fn burst_fires_leading_and_trailing() {
        let page = MemoryPage::default();
        let mut throttle = Throttle::new(100);
        let mut fired = 0;

        for _ in 0..5 {
            if throttle.call(&page) {
                fired += 1;
            }
            fired += fire_due(&mut throttle, &page, 10);
        }
        fired += fire_due(&mut throttle, &page, 200);

        assert_eq!(fired, 2);
        assert!(!throttle.is_pending());
    }

    #[test]
    fn single_call_has_no_trailing_edge() {
        let page = MemoryPage::default();
        let mut throttle = Throttle::new(100);
        assert!(throttle.call(&page));
        assert!(!throttle.is_pending());
        assert_eq!(fire_due(&mut throttle, &page, 500), 0);
    }

    #[test]
    fn calls_after_the_window_fire_immediately() {
        let page = MemoryPage::default();
        let mut throttle = Throttle::new(100);
        assert!(throttle.call(&page));
        page.advance(100);
        assert!(throttle.call(&page));
    }

    #[test]
    fn zero_wait_never_defers() {
        let page = MemoryPage::default();
        let mut throttle = Throttle::new(0);
        assert!(throttle.call(&page));
        assert!(throttle.call(&page));
        assert_eq!(page.pending_timers(), 0);
    }

    #[test]
    fn cancel_clears_the_trailing_timer() {
        let page = MemoryPage::default();
        let mut throttle = Throttle::new(100);
        throttle.call(&page);
        page.advance(10);
        throttle.call(&page);
        assert_eq!(page.pending_timers(), 1);

        throttle.cancel(&page);
        assert_eq!(page.pending_timers(), 0);
        assert_eq!(fire_due(&mut throttle, &page, 500), 0);
    }

    #[test]
    fn foreign_timers_are_ignored() {
        let page = MemoryPage::default();
        let mut throttle = Throttle::new(100);
        let other = page.set_timeout(5);
        assert!(!throttle.on_timer(other, &page));
    }
}
