//! Headless host
//!
//! Runs an application without a window. Time is simulated: every
//! [`HeadlessHost::advance`] walks the clock forward in frame-period steps,
//! dispatching due timers and then pending frames at each step. The canvas
//! can be written out as a PNG at any point.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use tiny_skia::Pixmap;
use tracing::{debug, info};

use crate::app::controller::{AppController, ModuleKind, STATUS_ID, TARGET_ID};
use crate::config::HostConfig;
use crate::input::KeyEvent;
use crate::platform::HostError;
use crate::ui::renderer::FrameRenderer;
use crate::ui::surface::{Element, Surface, SurfaceRegistry};
use crate::ui::template::{FileTemplates, TemplateSource};

/// Height of the status surface in pixels
const STATUS_HEIGHT: u32 = 20;

pub struct HeadlessHost {
    controller: AppController,
    now: Duration,
    frame_period: Duration,
    scripted_keys: VecDeque<char>,
}

impl HeadlessHost {
    /// Creates a host reading templates from the configured root
    pub fn new(config: &HostConfig) -> Result<Self, HostError> {
        let templates = FileTemplates::new(&config.template_root);
        Self::with_templates(config, Box::new(templates))
    }

    pub fn with_templates(
        config: &HostConfig,
        templates: Box<dyn TemplateSource>,
    ) -> Result<Self, HostError> {
        config.validate()?;
        let font = config.load_font()?;

        let mut surfaces = SurfaceRegistry::new();
        surfaces.insert(Surface::new(TARGET_ID, config.width, config.height));
        surfaces.insert(Surface::new(STATUS_ID, config.width, STATUS_HEIGHT));

        let controller = AppController::new(
            surfaces,
            templates,
            FrameRenderer::new(font),
            config.settings(),
        );

        Ok(Self {
            controller,
            now: Duration::ZERO,
            frame_period: config.frame_period,
            scripted_keys: config.keys.chars().collect(),
        })
    }

    /// Creates the host and launches the configured module
    pub fn launch(config: &HostConfig) -> Result<Self, HostError> {
        let mut host = Self::new(config)?;
        host.select(config.module, config.template.as_deref())?;
        Ok(host)
    }

    pub fn controller(&self) -> &AppController {
        &self.controller
    }

    /// Simulated time since the host started
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn select(&mut self, module: ModuleKind, template: Option<&str>) -> Result<(), HostError> {
        self.controller.select(module, template, self.now)?;
        Ok(())
    }

    /// Moves simulated time forward by `duration`
    pub fn advance(&mut self, duration: Duration) -> Result<(), HostError> {
        let until = self.now + duration;
        while self.now < until {
            self.now = (self.now + self.frame_period).min(until);

            if let Some(key) = self.scripted_keys.pop_front() {
                debug!(?key, "typing scripted key");
                self.press(key)?;
            }
            self.controller.tick(self.now)?;
            self.controller.frame(self.now)?;
        }
        Ok(())
    }

    /// Delivers a key press; control characters are dropped
    pub fn press(&mut self, key: char) -> Result<(), HostError> {
        if let Some(key) = KeyEvent::from_char_code(key as u32).char() {
            self.controller.key(self.now, key)?;
        }
        Ok(())
    }

    /// Changes the displayed size of the target surface
    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(target) = self.controller.surfaces().get(TARGET_ID) {
            target.borrow_mut().set_client_size(width, height);
        }
    }

    pub fn status_text(&self) -> String {
        self.controller
            .surfaces()
            .get(STATUS_ID)
            .map(|status| status.borrow().text().to_owned())
            .unwrap_or_default()
    }

    /// Text blocks of the target surface, in order
    pub fn target_text(&self) -> Vec<String> {
        let Some(target) = self.controller.surfaces().get(TARGET_ID) else {
            return Vec::new();
        };
        let target = target.borrow();
        target
            .children()
            .iter()
            .filter_map(|child| match child {
                Element::Text(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Copy of the target's canvas
    pub fn canvas_pixmap(&self) -> Option<Pixmap> {
        let target = self.controller.surfaces().get(TARGET_ID)?;
        let target = target.borrow();
        target.canvas().map(|canvas| canvas.pixmap().clone())
    }

    /// Writes the target's canvas to `path` as PNG
    pub fn snapshot_png(&self, path: &Path) -> Result<(), HostError> {
        let pixmap = self.canvas_pixmap().ok_or(HostError::NoCanvas)?;
        pixmap
            .save_png(path)
            .map_err(|err| HostError::Snapshot {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        info!(path = %path.display(), "snapshot written");
        Ok(())
    }

    /// Destroys the live application
    pub fn shutdown(&mut self) {
        self.controller.shutdown(self.now);
    }
}
