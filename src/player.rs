use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use log::{debug, info, warn};
use std::error::Error as StdError;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::constants::generate_session_id;
use crate::model::BoardId;
use crate::sequence::{Rotation, TimedSlide};
use crate::surface::{Surface, SurfaceError, SurfaceOpener};

/// Errors returned when starting a rotation
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// No slides to rotate through
    EmptySequence,
    /// The presentation surface could not be opened
    SurfaceUnavailable(String),
    /// A rotation for this board is already running
    SessionActive(BoardId),
    /// The scheduler thread could not be started
    Scheduler(String),
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerError::EmptySequence => write!(f, "No enabled slides to show"),
            PlayerError::SurfaceUnavailable(msg) => {
                write!(f, "Unable to open presentation surface: {}", msg)
            }
            PlayerError::SessionActive(board) => {
                write!(f, "A rotation is already running for board {}", board)
            }
            PlayerError::Scheduler(msg) => write!(f, "Failed to start scheduler: {}", msg),
        }
    }
}

impl StdError for PlayerError {}

impl From<SurfaceError> for PlayerError {
    fn from(err: SurfaceError) -> Self {
        match err {
            SurfaceError::Unavailable(msg) | SurfaceError::Navigation(msg) => {
                PlayerError::SurfaceUnavailable(msg)
            }
            SurfaceError::Closed => PlayerError::SurfaceUnavailable("closed on open".to_string()),
        }
    }
}

/// Time source for the rotation scheduler
pub trait Clock: Send + Sync {
    /// Wait for `delay` unless `stop` fires first
    /// Returns false when the wait was cut short by a stop request
    fn wait(&self, delay: Duration, stop: &Receiver<()>) -> bool;
}

/// Wall-clock waits on the session's stop channel
pub struct SystemClock;

impl Clock for SystemClock {
    fn wait(&self, delay: Duration, stop: &Receiver<()>) -> bool {
        match stop.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => true,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

/// Starts rotations and one-shot slide displays
pub struct Player {
    clock: Arc<dyn Clock>,
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

impl Player {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Open a surface on the first slide and rotate through `slides` until stopped
    ///
    /// Nothing is opened for an empty sequence. If the surface cannot be
    /// opened no timer is scheduled.
    pub fn start(
        &self,
        slides: Vec<TimedSlide>,
        opener: &dyn SurfaceOpener,
    ) -> Result<RotationSession, PlayerError> {
        let rotation = Rotation::new(slides).ok_or(PlayerError::EmptySequence)?;
        let surface = opener.open(&rotation.current().url)?;

        let id = generate_session_id();
        let cursor = Arc::new(AtomicUsize::new(0));
        let stopped = Arc::new(Mutex::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let (stop_tx, stop_rx) = bounded::<()>(1);

        info!(
            "[{}] Starting rotation over {} slide(s), first: {}",
            id,
            rotation.len(),
            rotation.current().url
        );

        let runner = Runner {
            id: id.clone(),
            rotation,
            surface,
            clock: Arc::clone(&self.clock),
            cursor: Arc::clone(&cursor),
            stopped: Arc::clone(&stopped),
            finished: Arc::clone(&finished),
            stop_rx,
        };
        let handle = std::thread::Builder::new()
            .name(format!("rotation-{}", id))
            .spawn(move || runner.run())
            .map_err(|e| PlayerError::Scheduler(e.to_string()))?;

        Ok(RotationSession {
            inner: Arc::new(SessionInner {
                id,
                started_at: Utc::now(),
                cursor,
                stopped,
                finished,
                stop_tx: Mutex::new(Some(stop_tx)),
                handle: Mutex::new(Some(handle)),
            }),
        })
    }

    /// Open a surface on a single slide without scheduling anything after it
    pub fn show_one(
        &self,
        slide: &TimedSlide,
        opener: &dyn SurfaceOpener,
    ) -> Result<Box<dyn Surface>, PlayerError> {
        let surface = opener.open(&slide.url)?;
        info!("Showing slide {} at {}", slide.slide_id, slide.url);
        Ok(surface)
    }
}

/// The scheduler loop owned by a session's thread
struct Runner {
    id: String,
    rotation: Rotation,
    surface: Box<dyn Surface>,
    clock: Arc<dyn Clock>,
    cursor: Arc<AtomicUsize>,
    /// Held across each navigation; set once the session is stopped
    stopped: Arc<Mutex<bool>>,
    finished: Arc<AtomicBool>,
    stop_rx: Receiver<()>,
}

impl Runner {
    fn run(mut self) {
        loop {
            let delay = self.rotation.current().delay;
            debug!(
                "[{}] Slide {} visible for {:?}",
                self.id,
                self.rotation.cursor(),
                delay
            );
            if !self.clock.wait(delay, &self.stop_rx) {
                info!("[{}] Rotation stopped", self.id);
                break;
            }

            let stopped = lock(&self.stopped);
            if *stopped {
                info!("[{}] Rotation stopped", self.id);
                break;
            }
            let next = self.rotation.advance().clone();
            self.cursor.store(self.rotation.cursor(), Ordering::SeqCst);
            match self.surface.navigate(&next.url) {
                Ok(()) => debug!("[{}] Navigated to {}", self.id, next.url),
                Err(SurfaceError::Closed) => {
                    info!("[{}] Surface closed, ending rotation", self.id);
                    break;
                }
                Err(e) => warn!(
                    "[{}] Skipping slide {} ({}): {}",
                    self.id, next.slide_id, next.url, e
                ),
            }
        }
        self.finished.store(true, Ordering::SeqCst);
        // surface handle is released when the runner is dropped
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct SessionInner {
    id: String,
    started_at: DateTime<Utc>,
    cursor: Arc<AtomicUsize>,
    stopped: Arc<Mutex<bool>>,
    finished: Arc<AtomicBool>,
    stop_tx: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SessionInner {
    fn stop(&self) {
        // waits for a navigation in progress, then bars any later one
        *lock(&self.stopped) = true;
        if let Some(sender) = lock(&self.stop_tx).take() {
            let _ = sender.try_send(());
        }
        self.join();
    }

    fn join(&self) {
        let handle = lock(&self.handle).take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                warn!("[{}] Rotation thread panicked", self.id);
            }
        }
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A running rotation: cursor, surface and pending timer
///
/// Clones share the same rotation. The rotation stops when `stop` is called
/// or when the last clone is dropped.
#[derive(Clone)]
pub struct RotationSession {
    inner: Arc<SessionInner>,
}

impl RotationSession {
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }

    /// Index of the slide currently on the surface
    pub fn current_index(&self) -> usize {
        self.inner.cursor.load(Ordering::SeqCst)
    }

    /// True while the scheduler thread is running
    pub fn is_active(&self) -> bool {
        !self.inner.finished.load(Ordering::SeqCst)
    }

    /// Cancel the pending timer and release the surface
    ///
    /// Blocks until a navigation already in progress has finished; no
    /// navigation happens after this returns.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Block until the rotation ends on its own (surface closed) or is stopped elsewhere
    pub fn wait(&self) {
        self.inner.join();
    }
}

impl fmt::Debug for RotationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotationSession")
            .field("id", &self.inner.id)
            .field("started_at", &self.inner.started_at)
            .field("current_index", &self.current_index())
            .finish()
    }
}
