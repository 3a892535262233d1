use std::path::{Path, PathBuf};
use std::time::Duration;

use ab_glyph::FontArc;
use thiserror::Error;
use tracing::debug;

use crate::app::controller::{AppSettings, ModuleKind};
use crate::ui::renderer::{FrameRenderer, RendererError};

/// Everything a host needs to put an application on screen
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    pub module: ModuleKind,
    /// Template name, looked up as `app/<template>.html` below `template_root`
    pub template: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Pace of the host's frame loop
    pub frame_period: Duration,
    /// Arkanoid model update interval
    pub update_period: Duration,
    pub prime_count: usize,
    pub template_root: PathBuf,
    /// TrueType/OpenType font for canvas text; text is skipped without one
    pub font_path: Option<PathBuf>,
    /// Simulated run time of the headless host
    pub duration: Duration,
    /// Keys the headless host types, one per frame from the start
    pub keys: String,
    /// Where the headless host writes the final canvas
    pub snapshot: Option<PathBuf>,
}

impl HostConfig {
    pub const MIN_SIZE: u32 = 50;
    pub const MAX_SIZE: u32 = 8192;
    pub const MAX_PRIME_COUNT: usize = 100_000;
    pub const DEFAULT_WIDTH: u32 = 800;
    pub const DEFAULT_HEIGHT: u32 = 600;
    pub const DEFAULT_FRAME_PERIOD: Duration = Duration::from_millis(16);

    /// Checks ranges and paths before a host is built
    pub fn validate(&self) -> Result<(), HostConfigError> {
        let valid_size = Self::MIN_SIZE..=Self::MAX_SIZE;
        if !valid_size.contains(&self.width) || !valid_size.contains(&self.height) {
            return Err(HostConfigError::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }

        if self.frame_period < Duration::from_millis(1) {
            return Err(HostConfigError::PeriodTooShort { name: "frame" });
        }
        if self.update_period < Duration::from_millis(1) {
            return Err(HostConfigError::PeriodTooShort { name: "update" });
        }

        if !(1..=Self::MAX_PRIME_COUNT).contains(&self.prime_count) {
            return Err(HostConfigError::InvalidPrimeCount {
                count: self.prime_count,
            });
        }

        if self.template.is_some() && !self.template_root.is_dir() {
            return Err(HostConfigError::MissingTemplateRoot(
                self.template_root.clone(),
            ));
        }

        Ok(())
    }

    pub fn settings(&self) -> AppSettings {
        AppSettings {
            update_period: self.update_period,
            prime_count: self.prime_count,
        }
    }

    /// Loads the configured font, if any
    pub fn load_font(&self) -> Result<Option<FontArc>, HostConfigError> {
        let Some(path) = &self.font_path else {
            return Ok(None);
        };
        let font = read_font(path)?;
        debug!(path = %path.display(), "font loaded");
        Ok(Some(font))
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            module: ModuleKind::Arkanoid,
            template: None,
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            frame_period: Self::DEFAULT_FRAME_PERIOD,
            update_period: AppSettings::default().update_period,
            prime_count: AppSettings::default().prime_count,
            template_root: PathBuf::from("."),
            font_path: None,
            duration: Duration::from_secs(2),
            keys: String::new(),
            snapshot: None,
        }
    }
}

fn read_font(path: &Path) -> Result<FontArc, HostConfigError> {
    let data = std::fs::read(path).map_err(|source| HostConfigError::FontUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FrameRenderer::load_font(data)?)
}

#[derive(Debug, Error)]
pub enum HostConfigError {
    #[error("Viewport {width}x{height} is outside the supported range of 50..=8192 pixels")]
    InvalidViewport { width: u32, height: u32 },
    #[error("The {name} period must be at least 1 ms")]
    PeriodTooShort { name: &'static str },
    #[error("Prime count {count} is outside 1..=100000")]
    InvalidPrimeCount { count: usize },
    #[error("Template root {} is not a directory", .0.display())]
    MissingTemplateRoot(PathBuf),
    #[error("Failed to read font {}: {source}", .path.display())]
    FontUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Font(#[from] RendererError),
}
