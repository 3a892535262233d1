//! Game objects for Arkanoid
//!
//! Every object exposes its position through [`Positioned`]. Coordinates
//! are read-only from the outside and change only through `move_to`.

use crate::domain::core::{Point, Rect};

/// Capability shared by all positional entities
pub trait Positioned {
    fn x(&self) -> f32;
    fn y(&self) -> f32;
    fn move_to(&mut self, x: f32, y: f32);

    fn position(&self) -> Point {
        Point::new(self.x(), self.y())
    }
}

/// The ball
#[derive(Debug, Clone, PartialEq)]
pub struct Ball {
    position: Point,
    /// Pixels travelled per update along each axis
    pub velocity: f32,
    pub radius: f32,
    /// Direction sign per axis, each component is 1 or -1
    pub direction: [f32; 2],
}

impl Ball {
    pub const VELOCITY: f32 = 5.0;
    pub const RADIUS: f32 = 5.0;

    /// Spawns a ball heading up and to the right
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
            velocity: Self::VELOCITY,
            radius: Self::RADIUS,
            direction: [1.0, -1.0],
        }
    }

    /// Moves the ball by one update step
    pub fn advance(&mut self) {
        let x = self.position.x + self.velocity * self.direction[0];
        let y = self.position.y + self.velocity * self.direction[1];
        self.move_to(x, y);
    }

    pub fn reflect_x(&mut self) {
        self.direction[0] *= -1.0;
    }

    pub fn reflect_y(&mut self) {
        self.direction[1] *= -1.0;
    }
}

impl Positioned for Ball {
    fn x(&self) -> f32 {
        self.position.x
    }

    fn y(&self) -> f32 {
        self.position.y
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.position = Point::new(x, y);
    }
}

/// The player's paddle; `x` is its horizontal center
#[derive(Debug, Clone, PartialEq)]
pub struct Paddle {
    position: Point,
    pub width: f32,
}

impl Paddle {
    pub const WIDTH: f32 = 200.0;
    /// Drawn height, the paddle extends upwards from `y`
    pub const HEIGHT: f32 = 10.0;

    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
            width: Self::WIDTH,
        }
    }

    /// Horizontal-only move
    pub fn move_to_x(&mut self, x: f32) {
        let y = self.position.y;
        self.move_to(x, y);
    }

    pub fn left_edge(&self) -> f32 {
        self.position.x - self.width / 2.0
    }

    pub fn right_edge(&self) -> f32 {
        self.position.x + self.width / 2.0
    }

    /// Rectangle used for drawing
    pub fn bounds(&self) -> Rect {
        Rect::new(self.left_edge(), self.position.y - Self::HEIGHT, self.width, Self::HEIGHT)
    }
}

impl Positioned for Paddle {
    fn x(&self) -> f32 {
        self.position.x
    }

    fn y(&self) -> f32 {
        self.position.y
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.position = Point::new(x, y);
    }
}

/// A breakable block; `x`/`y` is its center
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    position: Point,
    pub width: f32,
    pub height: f32,
    pub hit: bool,
}

impl Block {
    pub const WIDTH: f32 = 100.0;
    pub const HEIGHT: f32 = 50.0;

    pub fn new(x: f32, y: f32) -> Self {
        Self {
            position: Point::new(x, y),
            width: Self::WIDTH,
            height: Self::HEIGHT,
            hit: false,
        }
    }

    /// Inclusive bounding box
    pub fn bounds(&self) -> Rect {
        Rect::centered(self.position, self.width, self.height)
    }
}

impl Positioned for Block {
    fn x(&self) -> f32 {
        self.position.x
    }

    fn y(&self) -> f32 {
        self.position.y
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.position = Point::new(x, y);
    }
}
