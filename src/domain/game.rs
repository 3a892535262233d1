//! Arkanoid rules engine (no host, no timers, no drawing)
//!
//! One call to [`Game::step`] is one fixed-timestep update. Collisions are
//! plain bounding-box checks against the ball center; the paddle check uses
//! exact vertical equality, so a ball whose y never lands on the paddle's y
//! passes straight through it.

use crate::domain::keyboard::{CheatCode, PaddleCommand};
use crate::domain::objects::{Ball, Block, Paddle, Positioned};

/// Drawable area in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Notable things that happened during one update step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A block was hit and no unhit blocks remain
    WallCleared,
    /// The ball is below the bottom of the viewport
    BallLost,
}

/// Arkanoid game model
#[derive(Debug, Clone)]
pub struct Game {
    viewport: Viewport,
    ball: Ball,
    paddle: Paddle,
    blocks: Vec<Block>,
    cheat: CheatCode,
}

impl Game {
    /// Distance from the bottom of the viewport to the paddle's y
    const PADDLE_OFFSET: f32 = 10.0;
    /// Distance from the paddle to a freshly spawned ball
    const BALL_OFFSET: f32 = 20.0;
    /// Vertical center of the top wall row
    const WALL_TOP: f32 = 100.0;

    pub fn new(viewport: Viewport) -> Self {
        let paddle = Self::spawn_paddle(viewport);
        let ball = Self::spawn_ball(&paddle);
        Self {
            viewport,
            ball,
            paddle,
            blocks: build_wall(viewport.width),
            cheat: CheatCode::default(),
        }
    }

    // ─────────────────────────────────────────────────────
    // Read-only accessors
    // ─────────────────────────────────────────────────────
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn paddle(&self) -> &Paddle {
        &self.paddle
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn remaining_blocks(&self) -> usize {
        self.blocks.iter().filter(|block| !block.hit).count()
    }

    // ─────────────────────────────────────────────────────
    // Reset / resize
    // ─────────────────────────────────────────────────────

    /// Replaces the wall and spawns a new paddle and ball
    pub fn reset(&mut self) {
        self.blocks = build_wall(self.viewport.width);
        self.paddle = Self::spawn_paddle(self.viewport);
        self.ball = Self::spawn_ball(&self.paddle);
    }

    /// Adopts a new viewport; objects keep their positions until the next reset
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    // ─────────────────────────────────────────────────────
    // Core update (one step)
    // ─────────────────────────────────────────────────────
    pub fn step(&mut self) -> Vec<StepOutcome> {
        let mut outcomes = Vec::new();

        self.ball.advance();

        // Boundary walls
        if self.ball.x() <= 0.0 || self.ball.x() >= self.viewport.width {
            self.ball.reflect_x();
        }
        if self.ball.y() <= 0.0 {
            self.ball.reflect_y();
        }

        // Paddle
        if self.ball.y() == self.paddle.y()
            && self.ball.x() >= self.paddle.left_edge()
            && self.ball.x() <= self.paddle.right_edge()
        {
            self.ball.reflect_y();
        }

        // Blocks, first hit only
        let (bx, by) = (self.ball.x(), self.ball.y());
        if let Some(block) = self
            .blocks
            .iter_mut()
            .filter(|block| !block.hit)
            .find(|block| block.bounds().contains_point(bx, by))
        {
            block.hit = true;
            let bounds = block.bounds();
            if bounds.on_vertical_edge(bx) {
                self.ball.reflect_x();
            }
            if bounds.on_horizontal_edge(by) {
                self.ball.reflect_y();
            }

            if self.remaining_blocks() == 0 {
                outcomes.push(StepOutcome::WallCleared);
            }
        }

        if self.ball.y() > self.viewport.height {
            outcomes.push(StepOutcome::BallLost);
        }

        outcomes
    }

    // ─────────────────────────────────────────────────────
    // Input
    // ─────────────────────────────────────────────────────

    /// Applies one typed character
    pub fn handle_key(&mut self, key: char) {
        if let Some(command) = PaddleCommand::from_key(key) {
            self.move_paddle(command);
        }

        if self.cheat.push(key) {
            self.paddle.width = self.viewport.width;
        }
    }

    fn move_paddle(&mut self, command: PaddleCommand) {
        let half = self.paddle.width / 2.0;
        let x = self.paddle.x();
        let target = match command {
            PaddleCommand::Left => (x - PaddleCommand::STEP).max(half),
            PaddleCommand::Right => (x + PaddleCommand::STEP).min(self.viewport.width - half),
        };

        // A paddle wider than the viewport stays where it is
        let moves_outward = match command {
            PaddleCommand::Left => target > x,
            PaddleCommand::Right => target < x,
        };
        if !moves_outward {
            self.paddle.move_to_x(target);
        }
    }

    // ─────────────────────────────────────────────────────
    // Private helpers
    // ─────────────────────────────────────────────────────
    fn spawn_paddle(viewport: Viewport) -> Paddle {
        Paddle::new(viewport.width / 2.0, viewport.height - Self::PADDLE_OFFSET)
    }

    fn spawn_ball(paddle: &Paddle) -> Ball {
        Ball::new(paddle.x(), paddle.y() - Self::BALL_OFFSET)
    }
}

#[cfg(test)]
impl Game {
    /// Puts the ball at `(x, y)` heading along `direction`
    pub(crate) fn place_ball(&mut self, x: f32, y: f32, direction: [f32; 2]) {
        self.ball.move_to(x, y);
        self.ball.direction = direction;
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }
}

/// Builds the fixed six-block wall (rows of 1, 2 and 3 blocks)
pub fn build_wall(viewport_width: f32) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(6);

    // Row 1
    let block1 = Block::new(viewport_width / 2.0, Game::WALL_TOP);

    // Row 2
    let row2_y = block1.y() + block1.height;
    let row2_x = block1.x() - block1.width / 2.0;
    let block2 = Block::new(row2_x, row2_y);
    let block3 = Block::new(row2_x + block2.width, row2_y);

    // Row 3
    let row3_y = block2.y() + block2.height;
    let row3_x = block2.x() - block2.width / 2.0;
    let block4 = Block::new(row3_x, row3_y);
    let block5 = Block::new(row3_x + block4.width, row3_y);
    let block6 = Block::new(row3_x + block4.width * 2.0, row3_y);

    blocks.extend([block1, block2, block3, block4, block5, block6]);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game::new(Viewport::new(800.0, 600.0))
    }

    #[test]
    fn new_game_layout() {
        let game = game();
        assert_eq!(game.paddle().position(), crate::domain::core::Point::new(400.0, 590.0));
        assert_eq!(game.paddle().width, 200.0);
        assert_eq!(game.ball().position(), crate::domain::core::Point::new(400.0, 570.0));
        assert_eq!(game.ball().direction, [1.0, -1.0]);
        assert_eq!(game.blocks().len(), 6);
        assert_eq!(game.remaining_blocks(), 6);
    }

    #[test]
    fn wall_rows() {
        let centers: Vec<(f32, f32)> = build_wall(800.0)
            .iter()
            .map(|block| (block.x(), block.y()))
            .collect();
        assert_eq!(
            centers,
            vec![
                (400.0, 100.0),
                (350.0, 150.0),
                (450.0, 150.0),
                (300.0, 200.0),
                (400.0, 200.0),
                (500.0, 200.0),
            ]
        );
    }

    #[test]
    fn ball_reaching_right_edge_reflects_horizontally() {
        let mut game = game();
        game.place_ball(795.0, 300.0, [1.0, -1.0]);

        let outcomes = game.step();

        assert!(outcomes.is_empty());
        assert_eq!(game.ball().x(), 800.0);
        assert_eq!(game.ball().direction, [-1.0, -1.0]);
    }

    #[test]
    fn ball_reaching_left_edge_reflects_horizontally() {
        let mut game = game();
        game.place_ball(5.0, 300.0, [-1.0, -1.0]);

        game.step();

        assert_eq!(game.ball().x(), 0.0);
        assert_eq!(game.ball().direction, [1.0, -1.0]);
    }

    #[test]
    fn ball_leaving_left_edge_is_not_reflected() {
        let mut game = game();
        // Moves first, then checks: from x = 0 heading right it is already at x = 5
        game.place_ball(0.0, 300.0, [1.0, -1.0]);

        game.step();

        assert_eq!(game.ball().x(), 5.0);
        assert_eq!(game.ball().direction, [1.0, -1.0]);
    }

    #[test]
    fn ball_reaching_top_reflects_vertically() {
        let mut game = game();
        game.place_ball(700.0, 5.0, [1.0, -1.0]);

        game.step();

        assert_eq!(game.ball().y(), 0.0);
        assert_eq!(game.ball().direction, [1.0, 1.0]);
    }

    #[test]
    fn paddle_reflects_on_exact_height() {
        let mut game = game();
        game.place_ball(400.0, 585.0, [1.0, 1.0]);

        game.step();

        assert_eq!(game.ball().y(), 590.0);
        assert_eq!(game.ball().direction, [1.0, -1.0]);
    }

    #[test]
    fn ball_tunnels_through_paddle_off_grid() {
        let mut game = game();
        game.place_ball(400.0, 587.0, [1.0, 1.0]);

        game.step();

        // 592 != 590, no reflection
        assert_eq!(game.ball().direction, [1.0, 1.0]);
    }

    #[test]
    fn ball_outside_paddle_span_keeps_falling() {
        let mut game = game();
        game.place_ball(100.0, 585.0, [1.0, 1.0]);

        game.step();

        assert_eq!(game.ball().direction, [1.0, 1.0]);
    }

    #[test]
    fn block_hit_on_bottom_edge_reflects_vertically() {
        let mut game = game();
        // Bottom edge of block 5 (center 400,200) is y = 225
        game.place_ball(400.0, 230.0, [1.0, -1.0]);

        let outcomes = game.step();

        assert!(outcomes.is_empty());
        assert!(game.blocks()[4].hit);
        assert_eq!(game.remaining_blocks(), 5);
        assert_eq!(game.ball().direction, [1.0, 1.0]);
    }

    #[test]
    fn only_first_block_is_hit_per_step() {
        let mut game = game();
        // (350, 175) lies on the shared border of blocks 2, 4 and 5
        game.place_ball(345.0, 180.0, [1.0, -1.0]);

        game.step();

        let hits: Vec<usize> = game
            .blocks()
            .iter()
            .enumerate()
            .filter(|(_, block)| block.hit)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn hitting_last_block_clears_wall() {
        let mut game = game();
        for block in game.blocks.iter_mut().skip(1) {
            block.hit = true;
        }
        // Block 1 spans x 350..450, y 75..125
        game.place_ball(395.0, 130.0, [1.0, -1.0]);

        let outcomes = game.step();

        assert_eq!(outcomes, vec![StepOutcome::WallCleared]);
        assert_eq!(game.remaining_blocks(), 0);
    }

    #[test]
    fn hit_blocks_are_skipped() {
        let mut game = game();
        game.blocks[0].hit = true;
        // (400, 105) lies inside block 1 only
        game.place_ball(395.0, 110.0, [1.0, -1.0]);

        let outcomes = game.step();

        assert!(outcomes.is_empty());
        assert_eq!(game.ball().direction, [1.0, -1.0]);
    }

    #[test]
    fn ball_below_viewport_is_lost() {
        let mut game = game();
        game.place_ball(100.0, 598.0, [1.0, 1.0]);

        let outcomes = game.step();

        assert_eq!(outcomes, vec![StepOutcome::BallLost]);
    }

    #[test]
    fn reset_rebuilds_everything() {
        let mut game = game();
        game.blocks[2].hit = true;
        game.handle_key('d');
        game.place_ball(10.0, 700.0, [-1.0, 1.0]);

        game.reset();

        assert_eq!(game.remaining_blocks(), 6);
        assert_eq!(game.paddle().x(), 400.0);
        assert_eq!(game.ball().position(), crate::domain::core::Point::new(400.0, 570.0));
        assert_eq!(game.ball().direction, [1.0, -1.0]);
    }

    #[test]
    fn paddle_moves_in_steps() {
        let mut game = game();
        game.handle_key('a');
        assert_eq!(game.paddle().x(), 380.0);
        game.handle_key('d');
        game.handle_key('d');
        assert_eq!(game.paddle().x(), 420.0);
    }

    #[test]
    fn paddle_is_clamped_to_viewport() {
        let mut game = game();
        for _ in 0..50 {
            game.handle_key('a');
        }
        assert_eq!(game.paddle().left_edge(), 0.0);

        for _ in 0..50 {
            game.handle_key('d');
        }
        assert_eq!(game.paddle().right_edge(), 800.0);
    }

    #[test]
    fn cheat_code_widens_paddle() {
        let mut game = game();
        for key in ['I', 'D', 'D', 'Q', 'D'] {
            game.handle_key(key);
        }
        assert_eq!(game.paddle().width, 800.0);
    }

    #[test]
    fn broken_cheat_code_changes_nothing() {
        let mut game = game();
        game.handle_key('I');
        game.handle_key('X');
        assert_eq!(game.paddle().width, 200.0);
    }

    #[test]
    fn full_width_paddle_does_not_move() {
        let mut game = game();
        for key in "IDDQD".chars() {
            game.handle_key(key);
        }
        let x = game.paddle().x();
        game.handle_key('a');
        game.handle_key('d');
        assert_eq!(game.paddle().x(), x);
        assert_eq!(game.paddle().left_edge(), 0.0);
    }

    #[test]
    fn resize_uses_new_viewport_for_collisions() {
        let mut game = game();
        game.resize(Viewport::new(1000.0, 600.0));
        game.place_ball(795.0, 300.0, [1.0, -1.0]);

        game.step();

        assert_eq!(game.ball().direction, [1.0, -1.0]);
    }
}
