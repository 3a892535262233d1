//! PrimeCalculator: streams primes from a background worker into a text block

use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::app::lifecycle::{AppBase, AppContext, AppError, AppEvent, Application};
use crate::domain::primes::PrimeWorker;
use crate::platform::scheduler::TimerId;
use crate::ui::surface::Element;

#[derive(Debug)]
pub struct PrimeCalculator {
    base: AppBase,
    count: usize,
    worker: Option<PrimeWorker>,
    poll_timer: Option<TimerId>,
    received: usize,
}

impl PrimeCalculator {
    pub const DEFAULT_COUNT: usize = 2000;
    pub const POLL_PERIOD: Duration = Duration::from_millis(16);

    pub fn new(base: AppBase) -> Self {
        Self::with_count(base, Self::DEFAULT_COUNT)
    }

    pub fn with_count(base: AppBase, count: usize) -> Self {
        Self {
            base,
            count,
            worker: None,
            poll_timer: None,
            received: 0,
        }
    }

    /// Number of primes appended so far
    pub fn received(&self) -> usize {
        self.received
    }

    pub fn is_complete(&self) -> bool {
        self.received >= self.count
    }

    fn drain(&mut self) {
        let Some(worker) = &self.worker else {
            return;
        };
        let primes = worker.drain();
        if primes.is_empty() {
            return;
        }

        let mut target = self.base.target().borrow_mut();
        let Some(text) = target.last_text_mut() else {
            warn!("prime output element is gone");
            return;
        };
        for prime in &primes {
            if !text.is_empty() {
                text.push_str(", ");
            }
            text.push_str(&prime.to_string());
        }

        self.received += primes.len();
        trace!(received = self.received, "primes appended");
    }
}

impl Application for PrimeCalculator {
    fn name(&self) -> &'static str {
        "PrimeCalculator"
    }

    fn base(&self) -> &AppBase {
        &self.base
    }

    fn initialize(&mut self, _ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        self.base.initialize();
        self.base
            .target()
            .borrow_mut()
            .append(Element::Text(String::new()));
        Ok(())
    }

    fn run(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        self.base.run();

        let worker = PrimeWorker::spawn()?;
        if !worker.post(self.count) {
            warn!("prime worker stopped before accepting the request");
        }
        debug!(count = self.count, "prime request posted");
        self.worker = Some(worker);
        self.poll_timer = Some(ctx.scheduler.set_interval(ctx.now, Self::POLL_PERIOD));
        Ok(())
    }

    fn destroy(&mut self, ctx: &mut AppContext<'_>) {
        self.base.destroy();
        if let Some(id) = self.poll_timer.take() {
            ctx.scheduler.cancel(id);
        }
        self.worker = None;
    }

    fn handle_event(&mut self, _ctx: &mut AppContext<'_>, event: AppEvent) -> Result<(), AppError> {
        match event {
            AppEvent::Timer(id) if self.poll_timer == Some(id) => self.drain(),
            other => trace!(?other, "event not owned by PrimeCalculator"),
        }
        Ok(())
    }
}
