//! In-memory vector render surface.
//!
//! Elements live in an arena and are addressed by [`ElementId`]. Freed slots
//! are reused under a new generation, so a handle to a removed element stays
//! dead instead of aliasing a newer one. The tree mirrors a small subset of
//! SVG and serializes to it.

mod color;
mod path;
mod svg;
mod transform;

use std::collections::{BTreeMap, HashMap};

pub use color::Rgb;
pub use path::{PathCommand, PathData, curve_through};
pub use svg::{format_number, to_svg};
pub use transform::{Affine, Point, TransformOp, compose};

use crate::error::{LandscapeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_drawable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Svg,
    Group,
    Line,
    Rect,
    Circle,
    Path,
    Filter,
    FeTurbulence,
    FeDisplacementMap,
    FeGaussianBlur,
    LinearGradient,
    RadialGradient,
    Stop,
}

impl ElementKind {
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            ElementKind::Svg => "svg",
            ElementKind::Group => "g",
            ElementKind::Line => "line",
            ElementKind::Rect => "rect",
            ElementKind::Circle => "circle",
            ElementKind::Path => "path",
            ElementKind::Filter => "filter",
            ElementKind::FeTurbulence => "feTurbulence",
            ElementKind::FeDisplacementMap => "feDisplacementMap",
            ElementKind::FeGaussianBlur => "feGaussianBlur",
            ElementKind::LinearGradient => "linearGradient",
            ElementKind::RadialGradient => "radialGradient",
            ElementKind::Stop => "stop",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Number(f64),
    Text(String),
    Path(PathData),
    Transform(Vec<TransformOp>),
}

impl AttrValue {
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Number(n) => Some(*n),
            AttrValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Number(value)
    }
}

impl From<u32> for AttrValue {
    fn from(value: u32) -> Self {
        AttrValue::Number(f64::from(value))
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

impl From<PathData> for AttrValue {
    fn from(value: PathData) -> Self {
        AttrValue::Path(value)
    }
}

impl From<Vec<TransformOp>> for AttrValue {
    fn from(value: Vec<TransformOp>) -> Self {
        AttrValue::Transform(value)
    }
}

#[derive(Debug, Clone)]
pub struct Element {
    pub kind: ElementKind,
    pub attrs: BTreeMap<String, AttrValue>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    fn new(kind: ElementKind, parent: Option<ElementId>) -> Self {
        Self {
            kind,
            attrs: BTreeMap::new(),
            parent,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.attrs.get(name).and_then(AttrValue::as_number)
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_text)
    }

    #[must_use]
    pub fn transform(&self) -> Affine {
        match self.attrs.get("transform") {
            Some(AttrValue::Transform(ops)) => compose(ops),
            _ => Affine::IDENTITY,
        }
    }

    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }
}

/// Attribute writer returned by [`Surface::set`]; writes to dead handles are dropped.
pub struct Attrs<'a> {
    id: ElementId,
    element: Option<&'a mut Element>,
    dom_ids: &'a mut HashMap<String, ElementId>,
}

impl Attrs<'_> {
    pub fn attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        if let Some(element) = self.element.as_deref_mut() {
            let value = value.into();
            if name == "id" {
                if let Some(old) = element.text("id")
                    && self.dom_ids.get(old) == Some(&self.id)
                {
                    self.dom_ids.remove(old);
                }
                if let Some(dom_id) = value.as_text() {
                    self.dom_ids.insert(dom_id.to_string(), self.id);
                }
            }
            element.attrs.insert(name.to_string(), value);
        }
        self
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

#[derive(Debug, Clone)]
pub struct Surface {
    slots: Vec<Slot>,
    free: Vec<usize>,
    dom_ids: HashMap<String, ElementId>,
    root: ElementId,
    viewport: Viewport,
    screen_ctm: Affine,
}

impl Surface {
    pub fn new(viewport: Viewport) -> Result<Self> {
        if !viewport.is_drawable() {
            return Err(LandscapeError::MissingSurface {
                width: viewport.width,
                height: viewport.height,
            });
        }
        let root = ElementId {
            index: 0,
            generation: 0,
        };
        let mut surface = Self {
            slots: vec![Slot {
                generation: 0,
                element: Some(Element::new(ElementKind::Svg, None)),
            }],
            free: Vec::new(),
            dom_ids: HashMap::new(),
            root,
            viewport,
            screen_ctm: Affine::IDENTITY,
        };
        surface
            .set(root)
            .attr("x", 0.0)
            .attr("y", 0.0)
            .attr("width", viewport.width)
            .attr("height", viewport.height)
            .attr(
                "viewBox",
                format!(
                    "0 0 {} {}",
                    format_number(viewport.width),
                    format_number(viewport.height)
                ),
            )
            .attr("id", "svgBox");
        Ok(surface)
    }

    #[must_use]
    pub fn root(&self) -> ElementId {
        self.root
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Appends a new child of `kind` under `parent`. A dead parent yields a detached element.
    pub fn create(&mut self, parent: ElementId, kind: ElementKind) -> ElementId {
        let id = match self.free.pop() {
            Some(index) => ElementId {
                index,
                generation: self.slots[index].generation,
            },
            None => {
                self.slots.push(Slot::default());
                ElementId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        let attached = match self.slot_mut(parent) {
            Some(parent_el) => {
                parent_el.children.push(id);
                Some(parent)
            }
            None => None,
        };
        self.slots[id.index].element = Some(Element::new(kind, attached));
        id
    }

    pub fn set(&mut self, id: ElementId) -> Attrs<'_> {
        let element = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut());
        Attrs {
            id,
            element,
            dom_ids: &mut self.dom_ids,
        }
    }

    #[must_use]
    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn attr(&self, id: ElementId, name: &str) -> Option<&AttrValue> {
        self.get(id).and_then(|el| el.attrs.get(name))
    }

    /// Removes `id` and its whole subtree. Removing a dead handle or the root is a no-op.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.root || !self.contains(id) {
            return;
        }
        if let Some(parent) = self.get(id).and_then(|el| el.parent)
            && let Some(parent_el) = self.slot_mut(parent)
        {
            parent_el.children.retain(|child| *child != id);
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(slot) = self
                .slots
                .get_mut(next.index)
                .filter(|slot| slot.generation == next.generation)
            else {
                continue;
            };
            let Some(element) = slot.element.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(next.index);
            if let Some(dom_id) = element.text("id")
                && self.dom_ids.get(dom_id) == Some(&next)
            {
                self.dom_ids.remove(dom_id);
            }
            pending.extend(element.children);
        }
    }

    /// Replaces the element's transform with a rotation about `(cx, cy)`.
    pub fn rotate(&mut self, id: ElementId, degrees: f64, cx: f64, cy: f64) {
        self.set(id)
            .attr("transform", vec![TransformOp::Rotate { degrees, cx, cy }]);
    }

    /// Replaces the element's transform with a translation.
    pub fn translate(&mut self, id: ElementId, x: f64, y: f64) {
        self.set(id)
            .attr("transform", vec![TransformOp::Translate { x, y }]);
    }

    /// Declares a reusable `<filter>` addressable as `url(#dom_id)`.
    pub fn create_filter(&mut self, dom_id: &str) -> ElementId {
        let filter = self.create(self.root, ElementKind::Filter);
        self.set(filter).attr("id", dom_id);
        filter
    }

    /// Element whose `id` attribute was most recently set to `dom_id`.
    #[must_use]
    pub fn find_by_dom_id(&self, dom_id: &str) -> Option<ElementId> {
        self.dom_ids
            .get(dom_id)
            .copied()
            .filter(|id| self.contains(*id))
    }

    /// Resolves a paint/filter reference of the form `url(#id)`.
    #[must_use]
    pub fn resolve_url(&self, reference: &str) -> Option<ElementId> {
        let dom_id = reference
            .trim()
            .strip_prefix("url(#")?
            .strip_suffix(')')?;
        self.find_by_dom_id(dom_id)
    }

    /// Sets the surface-local → screen transform (the screen CTM).
    pub fn set_screen_transform(&mut self, ctm: Affine) {
        self.screen_ctm = ctm;
    }

    #[must_use]
    pub fn screen_transform(&self) -> Affine {
        self.screen_ctm
    }

    /// Inverse of the screen CTM; identity when the CTM is singular.
    #[must_use]
    pub fn screen_to_local(&self, screen: Point) -> Point {
        self.screen_ctm
            .inverse()
            .map_or(screen, |inverse| inverse.apply(screen))
    }

    #[must_use]
    pub fn live_count(&self) -> usize {
        self.elements().count()
    }

    /// Allocated arena slots, live or free.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn count_kind(&self, kind: ElementKind) -> usize {
        self.elements().filter(|el| el.kind == kind).count()
    }

    fn elements(&self) -> impl Iterator<Item = &Element> {
        self.slots.iter().filter_map(|slot| slot.element.as_ref())
    }

    fn slot_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }
}
