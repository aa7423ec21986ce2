//! Named resources: color spaces, patterns, shadings and XObjects.

use crate::color::ColorSpace;
use crate::pattern::Pattern;
use crate::shading::Shading;
use crate::x_object::XObject;
use grisaille_syntax::object::Name;
use rustc_hash::FxHashMap;

/// Lookup and replacement of the named resources used by a content stream.
///
/// Getters return owned values. Setters replace a resource in the scope that defines it,
/// so that later lookups in the same scope see the replacement.
pub trait ResourceScope {
    /// Get a color space resource.
    fn color_space(&self, name: &Name) -> Option<ColorSpace>;
    /// Replace a color space resource.
    fn set_color_space(&mut self, name: &Name, color_space: ColorSpace);
    /// Get a pattern resource.
    fn pattern(&self, name: &Name) -> Option<Pattern>;
    /// Replace a pattern resource.
    fn set_pattern(&mut self, name: &Name, pattern: Pattern);
    /// Get a shading resource.
    fn shading(&self, name: &Name) -> Option<Shading>;
    /// Replace a shading resource.
    fn set_shading(&mut self, name: &Name, shading: Shading);
    /// Get an XObject resource.
    fn x_object(&self, name: &Name) -> Option<XObject>;
    /// Replace an XObject resource.
    fn set_x_object(&mut self, name: &Name, x_object: XObject);
}

/// An in-memory resource dictionary, with an optional parent that is consulted for
/// names the dictionary doesn't define.
#[derive(Debug, Clone, Default)]
pub struct Resources {
    color_spaces: FxHashMap<Name, ColorSpace>,
    patterns: FxHashMap<Name, Pattern>,
    shadings: FxHashMap<Name, Shading>,
    x_objects: FxHashMap<Name, XObject>,
    parent: Option<Box<Self>>,
}

impl Resources {
    /// Create new, empty resources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `parent` for names these resources don't define.
    pub fn with_parent(mut self, parent: Self) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Add a color space.
    pub fn with_color_space(mut self, name: impl Into<Name>, color_space: ColorSpace) -> Self {
        self.color_spaces.insert(name.into(), color_space);
        self
    }

    /// Add a pattern.
    pub fn with_pattern(mut self, name: impl Into<Name>, pattern: Pattern) -> Self {
        self.patterns.insert(name.into(), pattern);
        self
    }

    /// Add a shading.
    pub fn with_shading(mut self, name: impl Into<Name>, shading: Shading) -> Self {
        self.shadings.insert(name.into(), shading);
        self
    }

    /// Add an XObject.
    pub fn with_x_object(mut self, name: impl Into<Name>, x_object: XObject) -> Self {
        self.x_objects.insert(name.into(), x_object);
        self
    }

    /// The parent resources, if any.
    pub fn parent(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    fn find<T: Clone>(&self, name: &Name, select: fn(&Self) -> &FxHashMap<Name, T>) -> Option<T> {
        select(self)
            .get(name)
            .cloned()
            .or_else(|| self.parent.as_ref().and_then(|p| p.find(name, select)))
    }

    fn defines<T>(&mut self, name: &Name, select: fn(&mut Self) -> &mut FxHashMap<Name, T>) -> bool {
        select(self).contains_key(name)
            || self
                .parent
                .as_deref_mut()
                .is_some_and(|p| p.defines(name, select))
    }

    fn store<T>(&mut self, name: &Name, value: T, select: fn(&mut Self) -> &mut FxHashMap<Name, T>) {
        if !select(self).contains_key(name)
            && let Some(parent) = self.parent.as_deref_mut()
            && parent.defines(name, select)
        {
            parent.store(name, value, select);
            return;
        }

        select(self).insert(name.clone(), value);
    }
}

impl ResourceScope for Resources {
    fn color_space(&self, name: &Name) -> Option<ColorSpace> {
        self.find(name, |r| &r.color_spaces)
    }

    fn set_color_space(&mut self, name: &Name, color_space: ColorSpace) {
        self.store(name, color_space, |r| &mut r.color_spaces);
    }

    fn pattern(&self, name: &Name) -> Option<Pattern> {
        self.find(name, |r| &r.patterns)
    }

    fn set_pattern(&mut self, name: &Name, pattern: Pattern) {
        self.store(name, pattern, |r| &mut r.patterns);
    }

    fn shading(&self, name: &Name) -> Option<Shading> {
        self.find(name, |r| &r.shadings)
    }

    fn set_shading(&mut self, name: &Name, shading: Shading) {
        self.store(name, shading, |r| &mut r.shadings);
    }

    fn x_object(&self, name: &Name) -> Option<XObject> {
        self.find(name, |r| &r.x_objects)
    }

    fn set_x_object(&mut self, name: &Name, x_object: XObject) {
        self.store(name, x_object, |r| &mut r.x_objects);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_fallback() {
        let parent = Resources::new().with_color_space("CS0", ColorSpace::device_rgb());
        let resources = Resources::new()
            .with_color_space("CS1", ColorSpace::device_cmyk())
            .with_parent(parent);

        let cs0 = resources.color_space(&Name::new("CS0")).unwrap();
        assert_eq!(cs0.family_name(), "DeviceRGB");
        assert_eq!(
            resources.color_space(&Name::new("CS1")).unwrap().family_name(),
            "DeviceCMYK"
        );
        assert!(resources.color_space(&Name::new("CS2")).is_none());
    }

    #[test]
    fn set_replaces_in_defining_scope() {
        let parent = Resources::new().with_color_space("CS0", ColorSpace::device_rgb());
        let mut resources = Resources::new().with_parent(parent);

        resources.set_color_space(&Name::new("CS0"), ColorSpace::device_gray());
        let parent = resources.parent().unwrap();
        assert_eq!(
            parent.color_space(&Name::new("CS0")).unwrap().family_name(),
            "DeviceGray"
        );

        resources.set_color_space(&Name::new("CS9"), ColorSpace::device_gray());
        assert!(resources.parent().unwrap().color_space(&Name::new("CS9")).is_none());
        assert!(resources.color_space(&Name::new("CS9")).is_some());
    }
}
