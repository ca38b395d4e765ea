//! Shared test doubles for the rotation player.
//!
//! - `VirtualClock` advances simulated time on every wait and parks once its
//!   wait budget is spent, so schedules can be checked without sleeping.
//! - `RecordingOpener` hands out surfaces that log every URL they are pointed at.

#![allow(dead_code)]

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use slide_rotation::player::Clock;
use slide_rotation::sequence::TimedSlide;
use slide_rotation::surface::{Surface, SurfaceError, SurfaceOpener};

pub struct VirtualClock {
    now: Mutex<Duration>,
    waits: Mutex<Vec<Duration>>,
    budget: usize,
    parked_tx: Sender<()>,
    parked_rx: Receiver<()>,
}

impl VirtualClock {
    /// A clock that lets `budget` waits elapse, then blocks until stopped
    pub fn with_budget(budget: usize) -> Arc<Self> {
        let (parked_tx, parked_rx) = unbounded();
        Arc::new(Self {
            now: Mutex::new(Duration::ZERO),
            waits: Mutex::new(Vec::new()),
            budget,
            parked_tx,
            parked_rx,
        })
    }

    pub fn now(&self) -> Duration {
        *self.now.lock().unwrap()
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }

    /// Block until the scheduler has used up the budget
    pub fn wait_until_parked(&self) {
        self.parked_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("scheduler never reached the end of its wait budget");
    }
}

impl Clock for VirtualClock {
    fn wait(&self, delay: Duration, stop: &Receiver<()>) -> bool {
        {
            let mut waits = self.waits.lock().unwrap();
            if waits.len() < self.budget {
                waits.push(delay);
                *self.now.lock().unwrap() += delay;
                return true;
            }
        }
        let _ = self.parked_tx.send(());
        let _ = stop.recv();
        false
    }
}

/// One navigation as seen by a recording surface
#[derive(Debug, Clone, PartialEq)]
pub struct Shown {
    pub at: Duration,
    pub url: String,
}

#[derive(Default)]
pub struct RecordingOpener {
    pub log: Arc<Mutex<Vec<Shown>>>,
    pub opened: Arc<Mutex<usize>>,
    clock: Option<Arc<VirtualClock>>,
    blocked: bool,
    failing_urls: HashSet<String>,
    close_after: Option<usize>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timed(clock: Arc<VirtualClock>) -> Self {
        Self {
            clock: Some(clock),
            ..Self::default()
        }
    }

    /// Every open attempt fails as if the host blocked it
    pub fn blocked() -> Self {
        Self {
            blocked: true,
            ..Self::default()
        }
    }

    /// Navigations to `url` fail without closing the surface
    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    /// The surface reports itself closed after this many successful navigations
    pub fn closing_after(mut self, navigations: usize) -> Self {
        self.close_after = Some(navigations);
        self
    }

    pub fn urls(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|s| s.url.clone()).collect()
    }

    pub fn shown(&self) -> Vec<Shown> {
        self.log.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        *self.opened.lock().unwrap()
    }
}

impl SurfaceOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<Box<dyn Surface>, SurfaceError> {
        if self.blocked {
            return Err(SurfaceError::Unavailable("pop-up blocked".to_string()));
        }
        *self.opened.lock().unwrap() += 1;
        let mut surface = RecordingSurface {
            log: Arc::clone(&self.log),
            clock: self.clock.clone(),
            failing_urls: self.failing_urls.clone(),
            remaining: self.close_after,
        };
        surface.record(url);
        Ok(Box::new(surface))
    }
}

struct RecordingSurface {
    log: Arc<Mutex<Vec<Shown>>>,
    clock: Option<Arc<VirtualClock>>,
    failing_urls: HashSet<String>,
    remaining: Option<usize>,
}

impl RecordingSurface {
    fn record(&mut self, url: &str) {
        let at = self.clock.as_ref().map(|c| c.now()).unwrap_or_default();
        self.log.lock().unwrap().push(Shown {
            at,
            url: url.to_string(),
        });
    }
}

impl Surface for RecordingSurface {
    fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Err(SurfaceError::Closed);
            }
            *remaining -= 1;
        }
        if self.failing_urls.contains(url) {
            return Err(SurfaceError::Navigation(format!("cannot load {}", url)));
        }
        self.record(url);
        Ok(())
    }
}

pub fn timed(id: i64, url: &str, secs: u64) -> TimedSlide {
    TimedSlide::new(id, url, Duration::from_secs(secs))
}

pub fn timed_ms(id: i64, url: &str, millis: u64) -> TimedSlide {
    TimedSlide::new(id, url, Duration::from_millis(millis))
}
