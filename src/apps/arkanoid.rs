//! Arkanoid: breakout on a canvas
//!
//! The model advances on a fixed 16 ms interval, independently of the
//! render loop, which re-requests a frame after every frame it draws. Ball
//! loss and cleared walls go through the [`StateMachine`]; the commands it
//! returns are the only place a reset timeout gets registered.

use std::time::Duration;

use tracing::{debug, info, trace};

use crate::app::lifecycle::{AppBase, AppContext, AppError, AppEvent, Application};
use crate::app::state::{GameCommand, GameState, RESET_DELAY, StateEvent, StateMachine};
use crate::domain::game::{Game, Viewport};
use crate::input::ListenerId;
use crate::platform::scheduler::TimerId;
use crate::ui::renderer::FrameLayout;
use crate::ui::surface::{Canvas, Element};

/// Arkanoid application
#[derive(Debug)]
pub struct Arkanoid {
    base: AppBase,
    game: Game,
    state: GameState,
    update_period: Duration,
    update_timer: Option<TimerId>,
    frame_request: Option<TimerId>,
    reset_timer: Option<TimerId>,
    key_listener: Option<ListenerId>,
    rendering: bool,
    /// Host time of the last transition into WON or LOST
    finished_at: Duration,
}

impl Arkanoid {
    pub const UPDATE_PERIOD: Duration = Duration::from_millis(16);

    pub fn new(base: AppBase) -> Self {
        Self::with_update_period(base, Self::UPDATE_PERIOD)
    }

    pub fn with_update_period(base: AppBase, update_period: Duration) -> Self {
        let (width, height) = base.target().borrow().client_size();
        Self {
            base,
            game: Game::new(Viewport::new(width as f32, height as f32)),
            state: GameState::Running,
            update_period,
            update_timer: None,
            frame_request: None,
            reset_timer: None,
            key_listener: None,
            rendering: false,
            finished_at: Duration::ZERO,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Whether the render loop keeps re-requesting frames
    pub fn is_rendering(&self) -> bool {
        self.rendering
    }

    /// Whole seconds left until the round restarts, as shown on screen
    pub fn seconds_until_restart(&self, now: Duration) -> u64 {
        let elapsed_ms = now.saturating_sub(self.finished_at).as_millis() as f64;
        let remaining = (RESET_DELAY.as_millis() as f64 - elapsed_ms) / 1000.0;
        remaining.ceil().max(0.0) as u64
    }

    fn update(&mut self, ctx: &mut AppContext<'_>) {
        if self.state != GameState::Running {
            return;
        }

        for outcome in self.game.step() {
            self.apply(ctx, outcome.into());
        }
    }

    fn apply(&mut self, ctx: &mut AppContext<'_>, event: StateEvent) {
        let previous = self.state;
        let transition = StateMachine::process_event(previous, event);
        if transition.changed_from(previous) {
            info!(from = ?previous, to = ?transition.state, ?event, "game state changed");
        }
        self.state = transition.state;

        for command in transition.commands {
            match command {
                GameCommand::ScheduleReset { delay } => {
                    self.finished_at = ctx.now;
                    self.reset_timer = Some(ctx.scheduler.set_timeout(ctx.now, delay));
                }
                GameCommand::RebuildWall => self.game.reset(),
            }
        }
    }

    fn render(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        let target = self.base.target().clone();
        let mut target = target.borrow_mut();
        let (width, height) = target.client_size();

        if let Some(canvas) = target.canvas_mut() {
            if canvas.sync_size(width, height)? {
                debug!(width, height, "canvas resized");
                self.game
                    .resize(Viewport::new(width as f32, height as f32));
            }

            let layout = match self.state {
                GameState::Running => FrameLayout::running(&self.game),
                finished => {
                    let viewport = self.game.viewport();
                    FrameLayout::game_over(
                        finished,
                        viewport.width,
                        viewport.height,
                        self.seconds_until_restart(ctx.now),
                    )
                }
            };
            ctx.renderer.render_layout(&layout, canvas.pixmap_mut())?;
        }

        if self.rendering {
            self.frame_request = Some(ctx.scheduler.request_frame());
        }
        Ok(())
    }
}

impl Application for Arkanoid {
    fn name(&self) -> &'static str {
        "Arkanoid"
    }

    fn base(&self) -> &AppBase {
        &self.base
    }

    fn initialize(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        self.base.initialize();

        {
            let mut target = self.base.target().borrow_mut();
            let (width, height) = target.client_size();
            target.append(Element::Canvas(Canvas::new(width, height)?));
            self.game = Game::new(Viewport::new(width as f32, height as f32));
        }

        self.state = GameState::Running;
        self.update_timer = Some(ctx.scheduler.set_interval(ctx.now, self.update_period));
        self.key_listener = Some(ctx.keys.register());
        Ok(())
    }

    fn run(&mut self, ctx: &mut AppContext<'_>) -> Result<(), AppError> {
        self.base.run();
        self.rendering = true;
        self.frame_request = Some(ctx.scheduler.request_frame());
        Ok(())
    }

    fn destroy(&mut self, ctx: &mut AppContext<'_>) {
        self.base.destroy();

        if let Some(id) = self.update_timer.take() {
            ctx.scheduler.cancel(id);
        }
        if let Some(id) = self.frame_request.take() {
            ctx.scheduler.cancel(id);
        }
        self.rendering = false;
        if let Some(listener) = self.key_listener.take() {
            ctx.keys.unregister(listener);
        }
        // A pending reset timeout stays registered; it no longer matches anything
    }

    fn handle_event(&mut self, ctx: &mut AppContext<'_>, event: AppEvent) -> Result<(), AppError> {
        match event {
            AppEvent::Timer(id) if self.update_timer == Some(id) => self.update(ctx),
            AppEvent::Timer(id) if self.reset_timer == Some(id) => {
                self.reset_timer = None;
                self.apply(ctx, StateEvent::ResetElapsed);
            }
            AppEvent::Frame(id) if self.frame_request == Some(id) => {
                self.frame_request = None;
                self.render(ctx)?;
            }
            AppEvent::Key { listener, key } if self.key_listener == Some(listener) => {
                self.game.handle_key(key);
            }
            other => trace!(?other, "event not owned by Arkanoid"),
        }
        Ok(())
    }
}
