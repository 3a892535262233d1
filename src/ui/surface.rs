//! Addressable UI surfaces
//!
//! A surface is a named region an application renders into or reports
//! status to. Surfaces live in a [`SurfaceRegistry`] owned by the host and
//! are shared with applications through [`SurfaceHandle`]s. Everything runs
//! on the single UI thread, hence `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tiny_skia::Pixmap;

use crate::ui::renderer::RendererError;
use crate::ui::template::TemplateNode;

/// Shared handle to a surface
pub type SurfaceHandle = Rc<RefCell<Surface>>;

/// Drawing surface with a backing pixmap
#[derive(Debug, Clone)]
pub struct Canvas {
    pixmap: Pixmap,
}

impl Canvas {
    /// Creates a canvas whose backing store matches `width` x `height`
    pub fn new(width: u32, height: u32) -> Result<Self, RendererError> {
        Ok(Self {
            pixmap: new_pixmap(width, height)?,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Resizes the backing store if the displayed size changed
    ///
    /// # Returns
    /// true if the backing store was replaced
    pub fn sync_size(&mut self, width: u32, height: u32) -> Result<bool, RendererError> {
        if self.width() == width.max(1) && self.height() == height.max(1) {
            return Ok(false);
        }
        self.pixmap = new_pixmap(width, height)?;
        Ok(true)
    }
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, RendererError> {
    // Zero-sized pixmaps are invalid, a collapsed surface still gets one pixel
    Pixmap::new(width.max(1), height.max(1)).ok_or(RendererError::PixmapCreationFailed)
}

/// Content adopted into a surface
#[derive(Debug, Clone)]
pub enum Element {
    /// A top-level element taken from an HTML template
    Markup(TemplateNode),
    /// A canvas for immediate-mode drawing
    Canvas(Canvas),
    /// A plain text block
    Text(String),
}

/// A named UI region
#[derive(Debug)]
pub struct Surface {
    id: String,
    client_width: u32,
    client_height: u32,
    children: Vec<Element>,
    text: String,
}

impl Surface {
    pub fn new(id: impl Into<String>, client_width: u32, client_height: u32) -> Self {
        Self {
            id: id.into(),
            client_width,
            client_height,
            children: Vec::new(),
            text: String::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Displayed size in pixels
    pub fn client_size(&self) -> (u32, u32) {
        (self.client_width, self.client_height)
    }

    /// Called by the host when the displayed region changes size
    pub fn set_client_size(&mut self, width: u32, height: u32) {
        self.client_width = width;
        self.client_height = height;
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn append(&mut self, element: Element) {
        self.children.push(element);
    }

    /// Removes every child element
    pub fn clear(&mut self) {
        self.children.clear();
    }

    /// Text content (used by status surfaces)
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// First canvas among the children
    pub fn canvas(&self) -> Option<&Canvas> {
        self.children.iter().find_map(|child| match child {
            Element::Canvas(canvas) => Some(canvas),
            _ => None,
        })
    }

    pub fn canvas_mut(&mut self) -> Option<&mut Canvas> {
        self.children.iter_mut().find_map(|child| match child {
            Element::Canvas(canvas) => Some(canvas),
            _ => None,
        })
    }

    /// Last child if it is a text block
    pub fn last_text_mut(&mut self) -> Option<&mut String> {
        match self.children.last_mut() {
            Some(Element::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// Surfaces addressable by id
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<String, SurfaceHandle>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a surface, replacing any surface with the same id
    pub fn insert(&mut self, surface: Surface) -> SurfaceHandle {
        let handle = Rc::new(RefCell::new(surface));
        let id = handle.borrow().id().to_owned();
        self.surfaces.insert(id, Rc::clone(&handle));
        handle
    }

    /// Looks a surface up by id; a missing id resolves to nothing
    pub fn resolve(&self, id: Option<&str>) -> Option<SurfaceHandle> {
        id.and_then(|id| self.surfaces.get(id)).map(Rc::clone)
    }

    pub fn get(&self, id: &str) -> Option<SurfaceHandle> {
        self.resolve(Some(id))
    }

    pub fn len(&self) -> usize {
        self.surfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.surfaces.is_empty()
    }
}
