//! Detecting whether a content stream paints anything in color.

use crate::color::{Color, is_rgb_colored};
use crate::error::{Error, Result};
use crate::image::rgb_pixels;
use crate::interpret::{
    HandlerSet, InterpreterSettings, InterpreterWarning, ScanContext, process,
    state::is_stroking,
};
use crate::pattern::Pattern;
use crate::resources::ResourceScope;
use crate::shading::Shading;
use crate::state::GraphicsState;
use crate::x_object::{ImageXObject, XObject};
use grisaille_syntax::filter::Filter;
use grisaille_syntax::object::{Name, Object};
use grisaille_syntax::Operator;
use log::{debug, warn};
use rustc_hash::FxHashMap;

/// Decides whether content streams use colors other than grays.
///
/// Colors set by color operators, shadings, images and the contents of forms and
/// patterns are all taken into account. Pixels and colors whose channels differ by no
/// more than [`COLOR_TOLERANCE`](crate::color::COLOR_TOLERANCE) count as gray.
#[derive(Clone, Default)]
pub struct ColorDetector {
    settings: InterpreterSettings,
}

impl ColorDetector {
    /// Create a new detector.
    pub fn new(settings: InterpreterSettings) -> Self {
        Self { settings }
    }

    /// Whether the content stream `ops` paints in color.
    ///
    /// Names used by the operators are resolved against `resources`.
    pub fn is_colored(&self, ops: &[Operator], resources: &dyn ResourceScope) -> Result<bool> {
        self.scan(ops, resources, GraphicsState::default(), 0)
    }

    /// Whether a pattern paints in color.
    ///
    /// Uncolored tiling patterns are never colored, they take their color from the
    /// operator that selects them. Colored tiling patterns are colored if their content
    /// stream is, and shading patterns if their shading is.
    pub fn is_pattern_colored(&self, pattern: &Pattern) -> Result<bool> {
        self.pattern_colored(pattern, 0)
    }

    /// Whether a shading paints in color. See [`Shading::is_colored`].
    pub fn is_shading_colored(&self, shading: &Shading) -> Result<bool> {
        shading.is_colored()
    }

    /// Whether any pixel of an image is colored.
    ///
    /// Gray images and image masks are never colored. JPX images are not decoded and
    /// always count as colored, CCITT and JBIG2 images are bilevel and never colored.
    /// Images that fail to decode are reported as a warning and count as not colored.
    pub fn is_image_colored(&self, image: &ImageXObject) -> bool {
        if image.image_mask || image.color_space.as_ref().is_some_and(|cs| cs.is_gray()) {
            return false;
        }

        match image.opaque_filter() {
            Some(Filter::JpxDecode) => {
                warn!("JPX images are not decoded, assuming the image is colored");
                (self.settings.warning_sink)(InterpreterWarning::JpxImage);

                return true;
            }
            Some(filter) => {
                debug!("skipping bilevel {filter} image");

                return false;
            }
            None => {}
        }

        let pixels = self
            .settings
            .image_codec
            .decode(image)
            .and_then(|raw| rgb_pixels(image, &raw));

        match pixels {
            Ok(pixels) => pixels.into_iter().any(is_rgb_colored),
            Err(e) => {
                warn!("skipping image that failed to decode: {e}");
                (self.settings.warning_sink)(InterpreterWarning::ImageDecodeFailure);

                false
            }
        }
    }

    /// Scan a stream that starts out with the graphics state `initial`.
    fn scan(
        &self,
        ops: &[Operator],
        resources: &dyn ResourceScope,
        initial: GraphicsState,
        depth: usize,
    ) -> Result<bool> {
        if depth > self.settings.max_depth {
            warn!("content streams are nested too deeply, ignoring the innermost one");
            (self.settings.warning_sink)(InterpreterWarning::RecursionLimit);

            return Ok(false);
        }

        let handlers = HandlerSet::new()
            .on_many(&["SC", "SCN", "sc", "scn", "RG", "rg", "K", "k"], on_color)
            .on("sh", on_shading)
            .on("BI", on_inline_image)
            .on("Do", on_x_object);

        let mut scan = DetectScan {
            detector: self,
            resources,
            depth,
            colored: false,
            patterns: FxHashMap::default(),
            shadings: FxHashMap::default(),
            x_objects: FxHashMap::default(),
        };

        process(ops, &handlers, &mut scan, initial)?;

        Ok(scan.colored)
    }

    fn pattern_colored(&self, pattern: &Pattern, depth: usize) -> Result<bool> {
        match pattern {
            Pattern::Tiling(t) if t.colored => {
                self.scan(&t.content, &t.resources, GraphicsState::default(), depth + 1)
            }
            Pattern::Tiling(_) => Ok(false),
            Pattern::Shading(s) => s.shading.is_colored(),
        }
    }
}

struct DetectScan<'a> {
    detector: &'a ColorDetector,
    resources: &'a dyn ResourceScope,
    depth: usize,
    colored: bool,
    patterns: FxHashMap<Name, bool>,
    shadings: FxHashMap<Name, bool>,
    x_objects: FxHashMap<Name, bool>,
}

impl ScanContext for DetectScan<'_> {
    fn resources(&self) -> &dyn ResourceScope {
        self.resources
    }

    fn settings(&self) -> &InterpreterSettings {
        &self.detector.settings
    }

    fn finished(&self) -> bool {
        self.colored
    }
}

fn name_operand(op: &Operator) -> Result<&Name> {
    op.operands
        .first()
        .and_then(Object::as_name)
        .ok_or_else(|| Error::InvalidOperand(op.name.clone()))
}

fn on_color(scan: &mut DetectScan<'_>, op: &Operator, state: &GraphicsState) -> Result<()> {
    let color = if is_stroking(op) {
        &state.stroke_color
    } else {
        &state.non_stroke_color
    };

    let colored = match color {
        Color::Pattern { underlying, .. } if underlying.as_ref().is_some_and(|c| c.is_colored()) => {
            true
        }
        Color::Pattern { name, .. } => {
            if let Some(colored) = scan.patterns.get(name) {
                debug!("pattern {name} was already examined");

                *colored
            } else {
                let pattern = scan
                    .resources
                    .pattern(name)
                    .ok_or_else(|| Error::UndefinedPattern(name.clone()))?;
                let colored = scan.detector.pattern_colored(&pattern, scan.depth)?;
                scan.patterns.insert(name.clone(), colored);

                colored
            }
        }
        color => color.is_colored(),
    };

    if colored {
        debug!("`{}` selects a colored color", op.name);
    }

    scan.colored |= colored;

    Ok(())
}

fn on_shading(scan: &mut DetectScan<'_>, op: &Operator, _: &GraphicsState) -> Result<()> {
    let name = name_operand(op)?;

    let colored = if let Some(colored) = scan.shadings.get(name) {
        *colored
    } else {
        let shading = scan
            .resources
            .shading(name)
            .ok_or_else(|| Error::UndefinedShading(name.clone()))?;
        let colored = shading.is_colored()?;
        scan.shadings.insert(name.clone(), colored);

        colored
    };

    scan.colored |= colored;

    Ok(())
}

fn on_inline_image(scan: &mut DetectScan<'_>, op: &Operator, _: &GraphicsState) -> Result<()> {
    let image = op
        .inline_image()
        .ok_or_else(|| Error::InvalidOperand(op.name.clone()))?;
    let image = ImageXObject::from_inline(image, scan.resources)?;

    scan.colored |= scan.detector.is_image_colored(&image);

    Ok(())
}

fn on_x_object(scan: &mut DetectScan<'_>, op: &Operator, state: &GraphicsState) -> Result<()> {
    let name = name_operand(op)?;

    if scan.x_objects.contains_key(name) {
        debug!("XObject {name} was already examined");

        return Ok(());
    }

    let x_object = scan
        .resources
        .x_object(name)
        .ok_or_else(|| Error::UndefinedXObject(name.clone()))?;

    // A form invoking itself adds nothing to what it paints.
    scan.x_objects.insert(name.clone(), false);

    let colored = match &x_object {
        XObject::Image(image) => scan.detector.is_image_colored(image),
        XObject::Form(form) => {
            let resources = form
                .resources
                .as_ref()
                .map(|r| r as &dyn ResourceScope)
                .unwrap_or(scan.resources);

            // Forms inherit the graphics state they are invoked with.
            scan.detector
                .scan(&form.content, resources, state.clone(), scan.depth + 1)?
        }
    };

    scan.x_objects.insert(name.clone(), colored);
    scan.colored |= colored;

    Ok(())
}
