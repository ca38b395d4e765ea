use chrono::Local;
use log::{debug, warn};
use std::error::Error as StdError;
use std::fmt;
use std::process::{Child, Command, Stdio};

use crate::config::{SurfaceConfig, SurfaceKind};
use crate::constants::URL_PLACEHOLDER;

/// Presentation surface errors
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceError {
    /// The host refused to open a new surface
    Unavailable(String),
    /// The surface was closed from outside and can no longer be navigated
    Closed,
    /// A single navigation failed; the surface is still usable
    Navigation(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceError::Unavailable(msg) => write!(f, "Surface unavailable: {}", msg),
            SurfaceError::Closed => write!(f, "Surface was closed"),
            SurfaceError::Navigation(msg) => write!(f, "Navigation failed: {}", msg),
        }
    }
}

impl StdError for SurfaceError {}

/// A live viewport that can be redirected to another URL
pub trait Surface: Send {
    fn navigate(&mut self, url: &str) -> Result<(), SurfaceError>;
}

/// Creates presentation surfaces
pub trait SurfaceOpener {
    /// Open a new surface already showing `url`
    fn open(&self, url: &str) -> Result<Box<dyn Surface>, SurfaceError>;
}

/// Build the opener described by the [surface] config section
pub fn opener_from_config(config: &SurfaceConfig) -> Box<dyn SurfaceOpener> {
    match config.kind {
        SurfaceKind::Command => Box::new(
            CommandOpener::new(config.command.clone()).persistent(config.persistent),
        ),
        SurfaceKind::Console => Box::new(ConsoleOpener),
    }
}

/// Opens surfaces by launching an external viewer program
pub struct CommandOpener {
    command: Vec<String>,
    persistent: bool,
}

impl CommandOpener {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            persistent: false,
        }
    }

    /// Treat an exited viewer as a closed surface
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }
}

impl SurfaceOpener for CommandOpener {
    fn open(&self, url: &str) -> Result<Box<dyn Surface>, SurfaceError> {
        let child = spawn_viewer(&self.command, url).map_err(SurfaceError::Unavailable)?;
        Ok(Box::new(CommandSurface {
            command: self.command.clone(),
            persistent: self.persistent,
            child: Some(child),
        }))
    }
}

/// A viewer process showing one URL at a time
///
/// Navigating replaces the running viewer with a new one pointed at the next
/// URL, so the session keeps a single surface alive.
///
/// A launcher command such as `xdg-open` exits right after handing the URL
/// off, so its exit says nothing about the window. Such a surface never
/// reports `Closed` and the rotation runs until stopped. In persistent mode the
/// command is the window itself: if it has exited before the next navigation
/// the surface is closed.
pub struct CommandSurface {
    command: Vec<String>,
    persistent: bool,
    child: Option<Child>,
}

impl Surface for CommandSurface {
    fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        if let Some(mut previous) = self.child.take() {
            if self.persistent {
                if let Ok(Some(status)) = previous.try_wait() {
                    debug!("Viewer exited with {}", status);
                    return Err(SurfaceError::Closed);
                }
            }
            if let Ok(None) = previous.try_wait() {
                if let Err(e) = previous.kill() {
                    warn!("Failed to stop previous viewer: {}", e);
                }
            }
            let _ = previous.wait();
        }
        let child = spawn_viewer(&self.command, url).map_err(SurfaceError::Navigation)?;
        self.child = Some(child);
        Ok(())
    }
}

impl Drop for CommandSurface {
    fn drop(&mut self) {
        // Leave the viewer on screen, only reap it if it already exited
        if let Some(child) = self.child.as_mut() {
            let _ = child.try_wait();
        }
    }
}

fn spawn_viewer(command: &[String], url: &str) -> Result<Child, String> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| "surface command is empty".to_string())?;
    let args: Vec<String> = args
        .iter()
        .map(|a| a.replace(URL_PLACEHOLDER, url))
        .collect();
    debug!("Launching viewer: {} {:?}", program, args);
    Command::new(program)
        .args(&args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("Failed to launch '{}': {}", program, e))
}

/// Dry-run surface that prints every URL it is pointed at
pub struct ConsoleOpener;

impl SurfaceOpener for ConsoleOpener {
    fn open(&self, url: &str) -> Result<Box<dyn Surface>, SurfaceError> {
        let mut surface = ConsoleSurface;
        surface.navigate(url)?;
        Ok(Box::new(surface))
    }
}

pub struct ConsoleSurface;

impl Surface for ConsoleSurface {
    fn navigate(&mut self, url: &str) -> Result<(), SurfaceError> {
        println!("[{}] showing {}", Local::now().format("%H:%M:%S"), url);
        Ok(())
    }
}
