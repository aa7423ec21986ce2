//! Helpers shared by the integration tests.

use grisaille_interpret::ResourceScope;
use grisaille_interpret::color::ColorSpace;
use grisaille_interpret::pattern::Pattern;
use grisaille_interpret::resources::Resources;
use grisaille_interpret::shading::Shading;
use grisaille_interpret::x_object::XObject;
use grisaille_syntax::object::Name;
use std::cell::Cell;

/// How often each kind of resource was looked up or replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    /// Color space lookups.
    pub color_spaces: usize,
    /// Pattern lookups.
    pub patterns: usize,
    /// Shading lookups.
    pub shadings: usize,
    /// XObject lookups.
    pub x_objects: usize,
    /// Replaced resources of any kind.
    pub replaced: usize,
}

/// Resources that count how they are used.
#[derive(Debug, Default)]
pub struct CountingResources {
    /// The wrapped resources.
    pub inner: Resources,
    counts: Cell<Counts>,
}

impl CountingResources {
    /// Wrap `inner`.
    pub fn new(inner: Resources) -> Self {
        Self {
            inner,
            counts: Cell::default(),
        }
    }

    /// The counts so far.
    pub fn counts(&self) -> Counts {
        self.counts.get()
    }

    fn bump(&self, f: impl FnOnce(&mut Counts)) {
        let mut counts = self.counts.get();
        f(&mut counts);
        self.counts.set(counts);
    }
}

impl ResourceScope for CountingResources {
    fn color_space(&self, name: &Name) -> Option<ColorSpace> {
        self.bump(|c| c.color_spaces += 1);
        self.inner.color_space(name)
    }

    fn set_color_space(&mut self, name: &Name, color_space: ColorSpace) {
        self.bump(|c| c.replaced += 1);
        self.inner.set_color_space(name, color_space);
    }

    fn pattern(&self, name: &Name) -> Option<Pattern> {
        self.bump(|c| c.patterns += 1);
        self.inner.pattern(name)
    }

    fn set_pattern(&mut self, name: &Name, pattern: Pattern) {
        self.bump(|c| c.replaced += 1);
        self.inner.set_pattern(name, pattern);
    }

    fn shading(&self, name: &Name) -> Option<Shading> {
        self.bump(|c| c.shadings += 1);
        self.inner.shading(name)
    }

    fn set_shading(&mut self, name: &Name, shading: Shading) {
        self.bump(|c| c.replaced += 1);
        self.inner.set_shading(name, shading);
    }

    fn x_object(&self, name: &Name) -> Option<XObject> {
        self.bump(|c| c.x_objects += 1);
        self.inner.x_object(name)
    }

    fn set_x_object(&mut self, name: &Name, x_object: XObject) {
        self.bump(|c| c.replaced += 1);
        self.inner.set_x_object(name, x_object);
    }
}
