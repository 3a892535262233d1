//! Application lifecycle
//!
//! Every application goes through the same four phases: validate the launch
//! options, `initialize`, `run` and eventually `destroy`. [`launch`] owns the
//! first three; the loader calls `destroy` before swapping in the next
//! application. Hooks never touch global state: everything they may register
//! (timers, frame requests, key listeners) goes through the [`AppContext`]
//! they are handed, and `destroy` must release exactly what the app
//! registered.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::input::{KeyListeners, ListenerId};
use crate::platform::scheduler::{Scheduler, TimerId};
use crate::ui::renderer::{FrameRenderer, RendererError};
use crate::ui::surface::{Element, SurfaceHandle, SurfaceRegistry};
use crate::ui::template::{TemplateSource, parse_fragment};

/// Application errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A launch option does not name an existing surface
    #[error("Parameter {field} must be a valid ID")]
    Configuration { field: &'static str },

    /// The HTML template could not be fetched
    #[error("Could not load HTML template {url}: {reason}")]
    Load { url: String, reason: String },

    #[error("Rendering failed: {0}")]
    Render(#[from] RendererError),

    #[error("Worker unavailable: {0}")]
    Worker(#[from] std::io::Error),
}

/// Options an application is launched with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Id of the surface the application renders into
    pub target: Option<String>,
    /// Id of the surface receiving status text
    pub status_bar: Option<String>,
    /// URL of an HTML template adopted into the target
    pub html_template: Option<String>,
}

impl LaunchOptions {
    pub fn new(target: impl Into<String>, status_bar: impl Into<String>) -> Self {
        Self {
            target: Some(target.into()),
            status_bar: Some(status_bar.into()),
            html_template: None,
        }
    }

    pub fn with_template(mut self, url: impl Into<String>) -> Self {
        self.html_template = Some(url.into());
        self
    }
}

/// Everything a hook may use
///
/// Borrowed from the host for the duration of one hook call.
pub struct AppContext<'a> {
    pub surfaces: &'a SurfaceRegistry,
    pub scheduler: &'a mut Scheduler,
    pub keys: &'a mut KeyListeners,
    pub templates: &'a dyn TemplateSource,
    /// Rasteriser holding the loaded font, if any
    pub renderer: &'a mut FrameRenderer,
    /// Host time of the current dispatch
    pub now: Duration,
}

/// Something the host delivers to the active application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// An interval or timeout fired
    Timer(TimerId),
    /// A requested frame is due
    Frame(TimerId),
    /// A key reached a registered listener
    Key { listener: ListenerId, key: char },
}

/// State shared by every application: resolved surfaces and template
#[derive(Debug)]
pub struct AppBase {
    target: SurfaceHandle,
    status_bar: SurfaceHandle,
    template: Option<String>,
}

impl AppBase {
    pub fn target(&self) -> &SurfaceHandle {
        &self.target
    }

    pub fn status_bar(&self) -> &SurfaceHandle {
        &self.status_bar
    }

    pub fn template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Adopts the template's top-level elements into the target, in order
    pub fn initialize(&self) {
        info!("initializing application");
        let Some(template) = &self.template else {
            return;
        };

        let mut target = self.target.borrow_mut();
        for node in parse_fragment(template) {
            target.append(Element::Markup(node));
        }
    }

    pub fn run(&self) {
        info!("running application");
    }

    /// Removes every child of the target
    pub fn destroy(&self) {
        debug!(target_id = self.target.borrow().id(), "clearing target surface");
        self.target.borrow_mut().clear();
    }
}

/// Capability every launchable application implements
///
/// Implementations call the matching [`AppBase`] hook first and then add
/// their own behavior.
pub trait Application {
    /// Name shown in the status bar
    fn name(&self) -> &'static str;

    fn base(&self) -> &AppBase;

    fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError>;

    fn run(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError>;

    /// Releases everything `initialize` and `run` registered
    fn destroy(&mut self, ctx: &mut AppContext<'_>);

    /// Reacts to a timer, frame or key; events the app does not own are ignored
    fn handle_event(&mut self, ctx: &mut AppContext<'_>, event: AppEvent) -> Result<(), AppError>;
}

/// Validates `options`, then builds, initializes and runs an application
///
/// Nothing is built and no hook runs unless both surfaces resolve and the
/// template (if any) loads. Hook failures are returned as they are.
///
/// # Returns
/// The running application; its status bar reads
/// `"<Name> is running (in <ms> ms)"`
pub fn launch<A, F>(
    options: &LaunchOptions,
    ctx: &mut AppContext<'_>,
    build: F,
) -> Result<A, AppError>
where
    A: Application,
    F: FnOnce(AppBase) -> A,
{
    let started = Instant::now();
    let base = validate(options, ctx)?;

    let mut app = build(base);
    app.initialize(ctx)?;
    app.run(ctx)?;

    let elapsed_ms = started.elapsed().as_millis();
    let status = format!("{} is running (in {} ms)", app.name(), elapsed_ms);
    info!(app = app.name(), elapsed_ms = elapsed_ms as u64, "application launched");
    app.base().status_bar().borrow_mut().set_text(status);

    Ok(app)
}

fn validate(options: &LaunchOptions, ctx: &AppContext<'_>) -> Result<AppBase, AppError> {
    let target = ctx
        .surfaces
        .resolve(options.target.as_deref())
        .ok_or(AppError::Configuration { field: "target" })?;
    let status_bar = ctx
        .surfaces
        .resolve(options.status_bar.as_deref())
        .ok_or(AppError::Configuration { field: "statusBar" })?;

    let template = match &options.html_template {
        Some(url) => Some(load_template(ctx.templates, url)?),
        None => None,
    };

    Ok(AppBase {
        target,
        status_bar,
        template,
    })
}

fn load_template(templates: &dyn TemplateSource, url: &str) -> Result<String, AppError> {
    let response = templates.fetch(url).map_err(|err| AppError::Load {
        url: url.to_owned(),
        reason: err.to_string(),
    })?;

    if !response.is_success() {
        return Err(AppError::Load {
            url: url.to_owned(),
            reason: format!("status {}", response.status),
        });
    }

    debug!(url, bytes = response.body.len(), "template loaded");
    Ok(response.body)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::ui::surface::Surface;
    use crate::ui::template::MemoryTemplates;

    /// Host-side state a hook context borrows from
    pub(crate) struct Fixture {
        pub surfaces: SurfaceRegistry,
        pub scheduler: Scheduler,
        pub keys: KeyListeners,
        pub templates: MemoryTemplates,
        pub renderer: FrameRenderer,
        pub now: Duration,
    }

    impl Fixture {
        pub fn new() -> Self {
            let mut surfaces = SurfaceRegistry::new();
            surfaces.insert(Surface::new("app-target", 800, 600));
            surfaces.insert(Surface::new("status", 800, 20));

            Self {
                surfaces,
                scheduler: Scheduler::new(),
                keys: KeyListeners::new(),
                templates: MemoryTemplates::new()
                    .with("app/board.html", "<div id=\"board\"></div><p>hint</p>"),
                renderer: FrameRenderer::default(),
                now: Duration::ZERO,
            }
        }

        pub fn context(&mut self) -> AppContext<'_> {
            AppContext {
                surfaces: &self.surfaces,
                scheduler: &mut self.scheduler,
                keys: &mut self.keys,
                templates: &self.templates,
                renderer: &mut self.renderer,
                now: self.now,
            }
        }

        pub fn target(&self) -> SurfaceHandle {
            self.surfaces.get("app-target").unwrap()
        }

        pub fn status(&self) -> String {
            self.surfaces.get("status").unwrap().borrow().text().to_owned()
        }
    }

    /// Records which hooks ran
    struct Probe {
        base: AppBase,
        calls: Vec<&'static str>,
        listener: Option<ListenerId>,
    }

    impl Probe {
        fn new(base: AppBase) -> Self {
            Self {
                base,
                calls: Vec::new(),
                listener: None,
            }
        }
    }

    impl Application for Probe {
        fn name(&self) -> &'static str {
            "Probe"
        }

        fn base(&self) -> &AppBase {
            &self.base
        }

        fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
            self.base.initialize();
            self.listener = Some(ctx.keys.register());
            self.calls.push("initialize");
            Ok(())
        }

        fn run(&mut self, _ctx: &mut AppContext<'_>) -> Result<(), AppError> {
            self.base.run();
            self.calls.push("run");
            Ok(())
        }

        fn destroy(&mut self, ctx: &mut AppContext<'_>) {
            self.base.destroy();
            if let Some(listener) = self.listener.take() {
                ctx.keys.unregister(listener);
            }
            self.calls.push("destroy");
        }

        fn handle_event(
            &mut self,
            _ctx: &mut AppContext<'_>,
            _event: AppEvent,
        ) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[test]
    fn launch_runs_hooks_in_order_and_reports_status() {
        let mut fixture = Fixture::new();
        let options = LaunchOptions::new("app-target", "status");

        let app = launch(&options, &mut fixture.context(), Probe::new).unwrap();

        assert_eq!(app.calls, vec!["initialize", "run"]);
        let status = fixture.status();
        assert!(status.starts_with("Probe is running (in "), "{status}");
        assert!(status.ends_with(" ms)"), "{status}");
    }

    #[test]
    fn missing_target_fails_before_any_hook() {
        let mut fixture = Fixture::new();
        let options = LaunchOptions {
            target: None,
            status_bar: Some("status".to_owned()),
            html_template: None,
        };
        let mut built = false;

        let result = launch(&options, &mut fixture.context(), |base| {
            built = true;
            Probe::new(base)
        });

        assert!(matches!(result, Err(AppError::Configuration { field: "target" })));
        assert!(!built);
        assert!(fixture.keys.is_empty());
        assert!(fixture.status().is_empty());
    }

    #[test]
    fn unknown_status_bar_fails() {
        let mut fixture = Fixture::new();
        let options = LaunchOptions::new("app-target", "nope");

        let result = launch(&options, &mut fixture.context(), Probe::new);

        assert!(matches!(
            result,
            Err(AppError::Configuration { field: "statusBar" })
        ));
        assert!(fixture.keys.is_empty());
    }

    #[test]
    fn missing_template_is_a_load_error() {
        let mut fixture = Fixture::new();
        let options = LaunchOptions::new("app-target", "status").with_template("app/missing.html");

        let result = launch(&options, &mut fixture.context(), Probe::new);

        match result {
            Err(AppError::Load { url, reason }) => {
                assert_eq!(url, "app/missing.html");
                assert_eq!(reason, "status 404");
            }
            other => panic!("expected load error, got {:?}", other.map(|app| app.calls)),
        }
        assert!(fixture.target().borrow().children().is_empty());
        assert!(fixture.keys.is_empty());
    }

    #[test]
    fn template_elements_are_adopted_and_destroy_clears_them() {
        let mut fixture = Fixture::new();
        let options = LaunchOptions::new("app-target", "status").with_template("app/board.html");

        let mut app = launch(&options, &mut fixture.context(), Probe::new).unwrap();
        assert_eq!(app.base().template(), Some("<div id=\"board\"></div><p>hint</p>"));

        {
            let target = fixture.target();
            let target = target.borrow();
            let tags: Vec<&str> = target
                .children()
                .iter()
                .filter_map(|child| match child {
                    Element::Markup(node) => Some(node.tag.as_str()),
                    _ => None,
                })
                .collect();
            assert_eq!(tags, vec!["div", "p"]);
        }

        app.destroy(&mut fixture.context());

        assert!(fixture.target().borrow().children().is_empty());
        assert!(fixture.keys.is_empty());
        assert_eq!(app.calls, vec!["initialize", "run", "destroy"]);
    }

    #[test]
    fn error_messages() {
        let config = AppError::Configuration { field: "target" };
        assert_eq!(config.to_string(), "Parameter target must be a valid ID");

        let load = AppError::Load {
            url: "app/x.html".to_owned(),
            reason: "status 500".to_owned(),
        };
        assert_eq!(
            load.to_string(),
            "Could not load HTML template app/x.html: status 500"
        );
    }
}
