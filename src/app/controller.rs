//! Application loader
//!
//! The controller owns everything the host provides (surfaces, scheduler,
//! key listeners, templates, renderer) and at most one live application.
//! Selecting a module destroys the current application before the next one
//! is launched into the same target surface.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::app::lifecycle::{AppContext, AppError, AppEvent, Application, LaunchOptions, launch};
use crate::apps::{Arkanoid, PrimeCalculator};
use crate::input::KeyListeners;
use crate::platform::scheduler::Scheduler;
use crate::ui::renderer::FrameRenderer;
use crate::ui::surface::SurfaceRegistry;
use crate::ui::template::TemplateSource;

/// Surface every application renders into
pub const TARGET_ID: &str = "app-target";
/// Surface receiving the launch status line
pub const STATUS_ID: &str = "status";

/// Applications the loader can launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleKind {
    Arkanoid,
    PrimeCalculator,
}

impl ModuleKind {
    pub const ALL: [ModuleKind; 2] = [ModuleKind::Arkanoid, ModuleKind::PrimeCalculator];

    pub fn name(&self) -> &'static str {
        match self {
            ModuleKind::Arkanoid => "Arkanoid",
            ModuleKind::PrimeCalculator => "PrimeCalculator",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown module name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown module: {0}")]
pub struct UnknownModule(pub String);

impl FromStr for ModuleKind {
    type Err = UnknownModule;

    /// Accepts the module name in any case, with or without separators
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        ModuleKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| UnknownModule(value.to_owned()))
    }
}

/// Per-application tunables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppSettings {
    /// Arkanoid model update interval
    pub update_period: Duration,
    /// Primes requested by PrimeCalculator
    pub prime_count: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            update_period: Arkanoid::UPDATE_PERIOD,
            prime_count: PrimeCalculator::DEFAULT_COUNT,
        }
    }
}

/// Main application controller
///
/// Exactly one application is live at a time. Dispatch errors are fatal to
/// the live application: it is dropped and the error handed to the host.
pub struct AppController {
    surfaces: SurfaceRegistry,
    scheduler: Scheduler,
    keys: KeyListeners,
    templates: Box<dyn TemplateSource>,
    renderer: FrameRenderer,
    settings: AppSettings,
    active: Option<Box<dyn Application>>,
}

impl AppController {
    pub fn new(
        surfaces: SurfaceRegistry,
        templates: Box<dyn TemplateSource>,
        renderer: FrameRenderer,
        settings: AppSettings,
    ) -> Self {
        Self {
            surfaces,
            scheduler: Scheduler::new(),
            keys: KeyListeners::new(),
            templates,
            renderer,
            settings,
            active: None,
        }
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn keys(&self) -> &KeyListeners {
        &self.keys
    }

    /// Name of the live application
    pub fn active_name(&self) -> Option<&'static str> {
        self.active.as_ref().map(|app| app.name())
    }

    /// Destroys the live application and launches `module` in its place
    ///
    /// # Arguments
    /// * `module` - Application to launch
    /// * `template` - Template name, resolved to `app/<template>.html`
    /// * `now` - Current host time
    ///
    /// # Returns
    /// AppError if the launch fails; no application is live afterwards
    pub fn select(
        &mut self,
        module: ModuleKind,
        template: Option<&str>,
        now: Duration,
    ) -> Result<(), AppError> {
        self.shutdown(now);

        let mut options = LaunchOptions::new(TARGET_ID, STATUS_ID);
        if let Some(template) = template {
            options = options.with_template(format!("app/{template}.html"));
        }

        let settings = self.settings;
        let mut ctx = self.context(now);
        let launched: Result<Box<dyn Application>, AppError> = match module {
            ModuleKind::Arkanoid => launch(&options, &mut ctx, |base| {
                Arkanoid::with_update_period(base, settings.update_period)
            })
            .map(|app| Box::new(app) as Box<dyn Application>),
            ModuleKind::PrimeCalculator => launch(&options, &mut ctx, |base| {
                PrimeCalculator::with_count(base, settings.prime_count)
            })
            .map(|app| Box::new(app) as Box<dyn Application>),
        };

        match launched {
            Ok(app) => {
                info!(module = %module, "module selected");
                self.active = Some(app);
                Ok(())
            }
            Err(err) => {
                error!(module = %module, error = %err, "module failed to launch");
                Err(err)
            }
        }
    }

    /// Destroys the live application, if any
    pub fn shutdown(&mut self, now: Duration) {
        if let Some(mut app) = self.active.take() {
            info!(app = app.name(), "destroying application");
            app.destroy(&mut self.context(now));
        }
    }

    /// Dispatches every timer due at `now`
    pub fn tick(&mut self, now: Duration) -> Result<(), AppError> {
        let events = self
            .scheduler
            .poll(now)
            .into_iter()
            .map(AppEvent::Timer)
            .collect();
        self.dispatch(now, events)
    }

    /// Dispatches pending frame requests
    pub fn frame(&mut self, now: Duration) -> Result<(), AppError> {
        let events = self
            .scheduler
            .take_frames()
            .into_iter()
            .map(AppEvent::Frame)
            .collect();
        self.dispatch(now, events)
    }

    /// Delivers a key press to every registered listener
    pub fn key(&mut self, now: Duration, key: char) -> Result<(), AppError> {
        let events = self
            .keys
            .listeners()
            .into_iter()
            .map(|listener| AppEvent::Key { listener, key })
            .collect();
        self.dispatch(now, events)
    }

    fn dispatch(&mut self, now: Duration, events: Vec<AppEvent>) -> Result<(), AppError> {
        let Some(mut app) = self.active.take() else {
            if !events.is_empty() {
                warn!(count = events.len(), "no live application, dropping events");
            }
            return Ok(());
        };

        let mut ctx = self.context(now);
        let result = events
            .into_iter()
            .try_for_each(|event| app.handle_event(&mut ctx, event));

        match result {
            Ok(()) => {
                self.active = Some(app);
                Ok(())
            }
            Err(err) => {
                error!(app = app.name(), error = %err, "application failed, dropping it");
                Err(err)
            }
        }
    }

    fn context(&mut self, now: Duration) -> AppContext<'_> {
        AppContext {
            surfaces: &self.surfaces,
            scheduler: &mut self.scheduler,
            keys: &mut self.keys,
            templates: self.templates.as_ref(),
            renderer: &mut self.renderer,
            now,
        }
    }
}

impl Drop for AppController {
    fn drop(&mut self) {
        self.shutdown(Duration::ZERO);
    }
}
