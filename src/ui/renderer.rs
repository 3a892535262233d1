//! Frame rendering for canvas applications
//!
//! Layout and rasterisation are split: [`FrameLayout`] turns game state into
//! a flat list of [`Shape`]s, and [`FrameRenderer`] draws them into a
//! tiny-skia pixmap. Text goes through ab_glyph when a font is loaded.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use tiny_skia::{
    Color, FillRule, Mask, Paint, PathBuilder, Pixmap, Rect as SkiaRect, Stroke, Transform,
};
use tracing::warn;

use crate::app::state::GameState;
use crate::domain::core::{Point, Rect};
use crate::domain::game::Game;
use crate::domain::objects::{Paddle, Positioned};

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RendererError {
    #[error("Failed to create pixmap for rendering")]
    PixmapCreationFailed,

    #[error("Failed to load font: {0}")]
    InvalidFont(String),

    #[error("Invalid shape geometry: {0:?}")]
    InvalidGeometry(Rect),
}

/// A single drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    FillCircle {
        center: Point,
        radius: f32,
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        width: f32,
        color: Color,
    },
    /// Text horizontally centered on `anchor.x` with its baseline at `anchor.y`
    Text {
        text: String,
        anchor: Point,
        size: f32,
        color: Color,
    },
}

/// Pre-calculated frame contents
#[derive(Debug, Clone)]
pub struct FrameLayout {
    pub shapes: Vec<Shape>,
    pub canvas_width: f32,
    pub canvas_height: f32,
}

impl FrameLayout {
    pub const INK: Color = Color::BLACK;
    pub const HEADLINE_SIZE: f32 = 30.0;
    pub const COUNTDOWN_SIZE: f32 = 25.0;
    /// Vertical distance between headline and countdown baselines
    pub const COUNTDOWN_OFFSET: f32 = 40.0;

    /// Ball, paddle and every unhit block
    pub fn running(game: &Game) -> Self {
        let viewport = game.viewport();
        let ball = game.ball();
        let paddle = game.paddle();

        let mut shapes = vec![
            Shape::FillCircle {
                center: ball.position(),
                radius: ball.radius,
                color: Self::INK,
            },
            Shape::FillRect {
                rect: Rect::new(
                    paddle.x() - paddle.width / 2.0,
                    paddle.y() - Paddle::HEIGHT,
                    paddle.width,
                    Paddle::HEIGHT,
                ),
                color: Self::INK,
            },
        ];

        shapes.extend(
            game.blocks()
                .iter()
                .filter(|block| !block.hit)
                .map(|block| Shape::StrokeRect {
                    rect: block.bounds(),
                    width: 1.0,
                    color: Self::INK,
                }),
        );

        Self {
            shapes,
            canvas_width: viewport.width,
            canvas_height: viewport.height,
        }
    }

    /// End-of-round message with the restart countdown
    pub fn game_over(state: GameState, width: f32, height: f32, seconds_left: u64) -> Self {
        let headline = match state {
            GameState::Won => "Congratulations!",
            _ => "Try again!",
        };
        let center = Point::new(width / 2.0, height / 2.0);

        Self {
            shapes: vec![
                Shape::Text {
                    text: headline.to_owned(),
                    anchor: center,
                    size: Self::HEADLINE_SIZE,
                    color: Self::INK,
                },
                Shape::Text {
                    text: format!("Restarting in {seconds_left} seconds"),
                    anchor: Point::new(center.x, center.y + Self::COUNTDOWN_OFFSET),
                    size: Self::COUNTDOWN_SIZE,
                    color: Self::INK,
                },
            ],
            canvas_width: width,
            canvas_height: height,
        }
    }
}

/// Rasterises [`FrameLayout`]s with tiny-skia
#[derive(Debug)]
pub struct FrameRenderer {
    font: Option<FontArc>,
    warned_missing_font: bool,
}

impl FrameRenderer {
    /// Background the canvas is cleared to before each frame
    pub const BACKGROUND: Color = Color::WHITE;

    pub fn new(font: Option<FontArc>) -> Self {
        Self {
            font,
            warned_missing_font: false,
        }
    }

    /// Parses font bytes (TrueType or OpenType)
    pub fn load_font(data: Vec<u8>) -> Result<FontArc, RendererError> {
        FontArc::try_from_vec(data).map_err(|err| RendererError::InvalidFont(err.to_string()))
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Clears `pixmap` and draws every shape of `layout` into it
    pub fn render_layout(
        &mut self,
        layout: &FrameLayout,
        pixmap: &mut Pixmap,
    ) -> Result<(), RendererError> {
        pixmap.fill(Self::BACKGROUND);

        for shape in &layout.shapes {
            match shape {
                Shape::FillCircle {
                    center,
                    radius,
                    color,
                } => Self::fill_circle(pixmap, *center, *radius, *color),
                Shape::FillRect { rect, color } => {
                    let rect = to_skia(*rect)?;
                    pixmap.fill_rect(rect, &paint(*color), Transform::identity(), None);
                }
                Shape::StrokeRect { rect, width, color } => {
                    Self::stroke_rect(pixmap, to_skia(*rect)?, *width, *color)
                }
                Shape::Text {
                    text,
                    anchor,
                    size,
                    color,
                } => self.render_text(pixmap, text, *anchor, *size, *color),
            }
        }

        Ok(())
    }

    fn fill_circle(pixmap: &mut Pixmap, center: Point, radius: f32, color: Color) {
        if let Some(path) = PathBuilder::from_circle(center.x, center.y, radius) {
            pixmap.fill_path(
                &path,
                &paint(color),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke_rect(pixmap: &mut Pixmap, rect: SkiaRect, width: f32, color: Color) {
        let path = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }

    fn render_text(
        &mut self,
        pixmap: &mut Pixmap,
        text: &str,
        anchor: Point,
        size: f32,
        color: Color,
    ) {
        let Some(font) = &self.font else {
            if !self.warned_missing_font {
                warn!("no font loaded, skipping text rendering");
                self.warned_missing_font = true;
            }
            return;
        };

        let Some(mut mask) = Mask::new(pixmap.width(), pixmap.height()) else {
            return;
        };

        let scale = PxScale::from(size);
        let scaled = font.as_scaled(scale);
        let mut caret = anchor.x - text_width(font, text, size) / 2.0;
        let mut previous = None;
        let mask_width = mask.width();
        let mask_height = mask.height();
        let coverage = mask.data_mut();

        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(previous) = previous {
                caret += scaled.kern(previous, id);
            }
            previous = Some(id);

            let glyph = id.with_scale_and_position(scale, point(caret, anchor.y));
            caret += scaled.h_advance(id);

            let Some(outlined) = font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, amount| {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                if x < 0 || y < 0 || x >= mask_width as i64 || y >= mask_height as i64 {
                    return;
                }
                let index = y as usize * mask_width as usize + x as usize;
                let value = (amount.clamp(0.0, 1.0) * 255.0) as u8;
                coverage[index] = coverage[index].max(value);
            });
        }

        if let Some(full) = SkiaRect::from_xywh(0.0, 0.0, mask_width as f32, mask_height as f32) {
            pixmap.fill_rect(full, &paint(color), Transform::identity(), Some(&mask));
        }
    }
}

impl Default for FrameRenderer {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Advance width of `text` at `size` pixels, kerning included
pub fn text_width(font: &FontArc, text: &str, size: f32) -> f32 {
    let scaled = font.as_scaled(PxScale::from(size));
    let mut width = 0.0;
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(previous) = previous {
            width += scaled.kern(previous, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Converts tiny-skia's premultiplied RGBA into the BGRA rows GDI expects
pub fn pixmap_to_bgra(pixmap: &Pixmap) -> Vec<u8> {
    let mut data = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        data.extend_from_slice(&[color.blue(), color.green(), color.red(), color.alpha()]);
    }
    data
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    paint
}

fn to_skia(rect: Rect) -> Result<SkiaRect, RendererError> {
    SkiaRect::from_xywh(rect.x, rect.y, rect.w, rect.h).ok_or(RendererError::InvalidGeometry(rect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::game::Viewport;

    fn pixel_is_ink(pixmap: &Pixmap, x: u32, y: u32) -> bool {
        let pixel = pixmap.pixel(x, y).unwrap();
        pixel.red() < 64 && pixel.green() < 64 && pixel.blue() < 64 && pixel.alpha() == 255
    }

    #[test]
    fn running_layout_contents() {
        let game = Game::new(Viewport::new(800.0, 600.0));
        let layout = FrameLayout::running(&game);

        // Ball, paddle and six blocks
        assert_eq!(layout.shapes.len(), 8);
        assert_eq!(layout.canvas_width, 800.0);
        assert_eq!(layout.canvas_height, 600.0);

        match &layout.shapes[1] {
            Shape::FillRect { rect, .. } => {
                assert_eq!(*rect, Rect::new(300.0, 580.0, 200.0, 10.0));
            }
            other => panic!("expected paddle rect, got {other:?}"),
        }
        assert!(
            layout.shapes[2..]
                .iter()
                .all(|shape| matches!(shape, Shape::StrokeRect { .. }))
        );
    }

    #[test]
    fn game_over_messages() {
        let won = FrameLayout::game_over(GameState::Won, 800.0, 600.0, 5);
        let lost = FrameLayout::game_over(GameState::Lost, 800.0, 600.0, 3);

        match (&won.shapes[0], &won.shapes[1]) {
            (
                Shape::Text {
                    text: headline,
                    anchor,
                    size,
                    ..
                },
                Shape::Text {
                    text: countdown,
                    anchor: countdown_anchor,
                    size: countdown_size,
                    ..
                },
            ) => {
                assert_eq!(headline, "Congratulations!");
                assert_eq!(*anchor, Point::new(400.0, 300.0));
                assert_eq!(*size, 30.0);
                assert_eq!(countdown, "Restarting in 5 seconds");
                assert_eq!(*countdown_anchor, Point::new(400.0, 340.0));
                assert_eq!(*countdown_size, 25.0);
            }
            other => panic!("unexpected shapes {other:?}"),
        }

        assert!(matches!(&lost.shapes[0], Shape::Text { text, .. } if text == "Try again!"));
        assert!(
            matches!(&lost.shapes[1], Shape::Text { text, .. } if text == "Restarting in 3 seconds")
        );
    }

    #[test]
    fn render_running_frame() {
        let game = Game::new(Viewport::new(800.0, 600.0));
        let layout = FrameLayout::running(&game);
        let mut pixmap = Pixmap::new(800, 600).unwrap();
        let mut renderer = FrameRenderer::default();

        renderer.render_layout(&layout, &mut pixmap).unwrap();

        // Paddle center and ball center are inked, a far corner is background
        assert!(pixel_is_ink(&pixmap, 400, 585));
        assert!(pixel_is_ink(&pixmap, 400, 570));
        let corner = pixmap.pixel(5, 5).unwrap();
        assert_eq!((corner.red(), corner.green(), corner.blue()), (255, 255, 255));
    }

    #[test]
    fn text_without_font_is_skipped() {
        let layout = FrameLayout::game_over(GameState::Lost, 200.0, 100.0, 5);
        let mut pixmap = Pixmap::new(200, 100).unwrap();
        let mut renderer = FrameRenderer::default();

        assert!(!renderer.has_font());
        renderer.render_layout(&layout, &mut pixmap).unwrap();
        renderer.render_layout(&layout, &mut pixmap).unwrap();

        assert!(renderer.warned_missing_font);
        assert!(pixmap.pixels().iter().all(|pixel| pixel.red() == 255));
    }

    #[test]
    fn invalid_font_is_rejected() {
        let result = FrameRenderer::load_font(vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(RendererError::InvalidFont(_))));
    }

    #[test]
    fn degenerate_rect_is_an_error() {
        let layout = FrameLayout {
            shapes: vec![Shape::FillRect {
                rect: Rect::new(0.0, 0.0, -5.0, 10.0),
                color: Color::BLACK,
            }],
            canvas_width: 10.0,
            canvas_height: 10.0,
        };
        let mut pixmap = Pixmap::new(10, 10).unwrap();

        let result = FrameRenderer::default().render_layout(&layout, &mut pixmap);
        assert!(matches!(result, Err(RendererError::InvalidGeometry(_))));
    }

    #[test]
    fn bgra_conversion() {
        let mut pixmap = Pixmap::new(2, 1).unwrap();
        pixmap.fill(Color::from_rgba8(10, 20, 30, 255));

        let data = pixmap_to_bgra(&pixmap);

        assert_eq!(data, vec![30, 20, 10, 255, 30, 20, 10, 255]);
    }
}
