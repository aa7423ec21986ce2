//! Detecting whether a content stream leaves any visible mark on the page.

use crate::color::Color;
use crate::error::{Error, Result};
use crate::interpret::{HandlerSet, InterpreterSettings, InterpreterWarning, ScanContext, process};
use crate::pattern::Pattern;
use crate::resources::ResourceScope;
use crate::state::GraphicsState;
use crate::x_object::XObject;
use bitflags::bitflags;
use grisaille_syntax::Operator;
use grisaille_syntax::object::{Name, Object};
use log::{debug, trace, warn};
use phf::phf_map;
use rustc_hash::FxHashMap;

bitflags! {
    /// How an operator paints.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct MarkFlags: u8 {
        /// The operator paints something.
        const MARKS = 1 << 0;
        /// The operator paints with the stroking color.
        const STROKE = 1 << 1;
        /// The operator paints with the non-stroking color.
        const FILL = 1 << 2;
    }
}

const STROKE: MarkFlags = MarkFlags::MARKS.union(MarkFlags::STROKE);
const FILL: MarkFlags = MarkFlags::MARKS.union(MarkFlags::FILL);
const BOTH: MarkFlags = MarkFlags::all();

/// The operators that paint, all others never mark the page.
static MARKING_OPERATORS: phf::Map<&'static str, MarkFlags> = phf_map! {
    "b" => BOTH,
    "B" => BOTH,
    "b*" => BOTH,
    "B*" => BOTH,
    "BI" => MarkFlags::MARKS,
    "f" => FILL,
    "F" => FILL,
    "f*" => FILL,
    "s" => STROKE,
    "S" => STROKE,
    "sh" => BOTH,
    "Tj" => BOTH,
    "TJ" => BOTH,
    "'" => BOTH,
    "\"" => BOTH,
};

/// Decides whether content streams paint anything visible.
///
/// Unlike [`ColorDetector`](crate::detect::ColorDetector), this doesn't care about hue.
/// A painting operator marks the page when the color it paints with deposits ink, see
/// [`Color::is_visible`]. Images always mark the page and are never decoded.
#[derive(Clone, Default)]
pub struct MarkingDetector {
    settings: InterpreterSettings,
}

impl MarkingDetector {
    /// Create a new detector.
    pub fn new(settings: InterpreterSettings) -> Self {
        Self { settings }
    }

    /// Whether the content stream `ops` marks the page.
    pub fn is_marked(&self, ops: &[Operator], resources: &dyn ResourceScope) -> Result<bool> {
        self.scan(ops, resources, Inherited::page(), 0)
    }

    /// Whether painting with a pattern marks the page.
    ///
    /// Tiling patterns are marked if their content stream is, regardless of whether
    /// they are colored. Shading patterns always mark.
    pub fn is_pattern_marked(&self, pattern: &Pattern) -> Result<bool> {
        self.pattern_marked(pattern, 0)
    }

    fn scan(
        &self,
        ops: &[Operator],
        resources: &dyn ResourceScope,
        inherited: Inherited,
        depth: usize,
    ) -> Result<bool> {
        if depth > self.settings.max_depth {
            warn!("content streams are nested too deeply, ignoring the innermost one");
            (self.settings.warning_sink)(InterpreterWarning::RecursionLimit);

            return Ok(false);
        }

        let handlers = HandlerSet::new()
            .on_all(on_paint)
            .on_many(&["G", "RG", "K"], on_stroke_device_color)
            .on_many(&["g", "rg", "k"], on_fill_device_color)
            .on_many(&["SC", "SCN"], on_stroke_color)
            .on_many(&["sc", "scn"], on_fill_color)
            .on("Do", on_x_object);

        let mut scan = MarkScan {
            detector: self,
            resources,
            depth,
            visible_stroke: inherited.visible_stroke,
            visible_fill: inherited.visible_fill,
            marked: false,
            patterns: FxHashMap::default(),
            x_objects: FxHashMap::default(),
        };

        process(ops, &handlers, &mut scan, inherited.state)?;

        Ok(scan.marked)
    }

    fn pattern_marked(&self, pattern: &Pattern, depth: usize) -> Result<bool> {
        match pattern {
            Pattern::Tiling(t) => self.scan(&t.content, &t.resources, Inherited::page(), depth + 1),
            Pattern::Shading(_) => Ok(true),
        }
    }
}

/// The part of the state of the invoking stream that a form starts out with.
struct Inherited {
    state: GraphicsState,
    visible_stroke: bool,
    visible_fill: bool,
}

impl Inherited {
    /// The state at the start of a page or a pattern cell.
    fn page() -> Self {
        Self {
            state: GraphicsState::default(),
            visible_stroke: true,
            visible_fill: true,
        }
    }
}

struct MarkScan<'a> {
    detector: &'a MarkingDetector,
    resources: &'a dyn ResourceScope,
    depth: usize,
    visible_stroke: bool,
    visible_fill: bool,
    marked: bool,
    patterns: FxHashMap<Name, bool>,
    x_objects: FxHashMap<Name, bool>,
}

impl MarkScan<'_> {
    /// Whether a color selected by `SC`/`SCN`/`sc`/`scn` is visible.
    fn is_visible(&mut self, color: &Color) -> Result<bool> {
        match color {
            Color::Pattern {
                underlying: Some(color),
                ..
            } => Ok(color.is_visible()),
            Color::Pattern { name, .. } => {
                if let Some(marked) = self.patterns.get(name) {
                    debug!("pattern {name} was already examined");

                    return Ok(*marked);
                }

                let pattern = self
                    .resources
                    .pattern(name)
                    .ok_or_else(|| Error::UndefinedPattern(name.clone()))?;
                let marked = self.detector.pattern_marked(&pattern, self.depth)?;
                self.patterns.insert(name.clone(), marked);

                Ok(marked)
            }
            color => Ok(color.is_visible()),
        }
    }
}

impl ScanContext for MarkScan<'_> {
    fn resources(&self) -> &dyn ResourceScope {
        self.resources
    }

    fn settings(&self) -> &InterpreterSettings {
        &self.detector.settings
    }

    fn finished(&self) -> bool {
        self.marked
    }
}

/// Whether shown text is empty once control characters and spaces are removed.
fn is_blank(text: &[u8]) -> bool {
    text.iter().all(|b| *b <= 32 || *b == 127)
}

fn is_blank_string(op: &Operator, operand: &Object) -> Result<bool> {
    operand
        .as_string()
        .map(is_blank)
        .ok_or_else(|| Error::InvalidOperand(op.name.clone()))
}

fn is_blank_array(op: &Operator, operand: &Object) -> Result<bool> {
    let items = operand
        .as_array()
        .ok_or_else(|| Error::InvalidOperand(op.name.clone()))?;

    for item in items {
        match item {
            Object::String(text) if !is_blank(text) => return Ok(false),
            // Glyph position adjustments.
            Object::String(_) | Object::Number(_) => {}
            _ => return Err(Error::InvalidOperand(op.name.clone())),
        }
    }

    Ok(true)
}

fn on_paint(scan: &mut MarkScan<'_>, op: &Operator, _: &GraphicsState) -> Result<()> {
    let Some(flags) = MARKING_OPERATORS.get(op.name.as_str()).copied() else {
        return Ok(());
    };

    let has_area = match (op.name.as_str(), op.last_operand()) {
        ("BI", _) => {
            debug!("inline image marks the page");
            scan.marked = true;

            return Ok(());
        }
        ("Tj" | "'" | "\"" | "TJ", None) => false,
        ("Tj" | "'" | "\"", Some(text)) => !is_blank_string(op, text)?,
        ("TJ", Some(items)) => !is_blank_array(op, items)?,
        _ => true,
    };

    let marks = has_area
        && ((scan.visible_stroke && flags.contains(MarkFlags::STROKE))
            || (scan.visible_fill && flags.contains(MarkFlags::FILL)));

    trace!("`{}`: has_area={has_area} marks={marks}", op.name);

    scan.marked |= marks;

    Ok(())
}

fn on_stroke_device_color(scan: &mut MarkScan<'_>, _: &Operator, state: &GraphicsState) -> Result<()> {
    scan.visible_stroke = state.stroke_color.is_visible();

    Ok(())
}

fn on_fill_device_color(scan: &mut MarkScan<'_>, _: &Operator, state: &GraphicsState) -> Result<()> {
    scan.visible_fill = state.non_stroke_color.is_visible();

    Ok(())
}

fn on_stroke_color(scan: &mut MarkScan<'_>, _: &Operator, state: &GraphicsState) -> Result<()> {
    scan.visible_stroke = scan.is_visible(&state.stroke_color)?;

    Ok(())
}

fn on_fill_color(scan: &mut MarkScan<'_>, _: &Operator, state: &GraphicsState) -> Result<()> {
    scan.visible_fill = scan.is_visible(&state.non_stroke_color)?;

    Ok(())
}

fn on_x_object(scan: &mut MarkScan<'_>, op: &Operator, state: &GraphicsState) -> Result<()> {
    let name = op
        .operands
        .first()
        .and_then(Object::as_name)
        .ok_or_else(|| Error::InvalidOperand(op.name.clone()))?;

    if let Some(marked) = scan.x_objects.get(name) {
        debug!("XObject {name} was already examined");
        scan.marked |= *marked;

        return Ok(());
    }

    let x_object = scan
        .resources
        .x_object(name)
        .ok_or_else(|| Error::UndefinedXObject(name.clone()))?;

    // Forms that paint themselves are unmarked until proven otherwise.
    scan.x_objects.insert(name.clone(), false);

    let marked = match &x_object {
        XObject::Image(_) => true,
        XObject::Form(form) => {
            let resources = form
                .resources
                .as_ref()
                .map(|r| r as &dyn ResourceScope)
                .unwrap_or(scan.resources);

            let inherited = Inherited {
                state: state.clone(),
                visible_stroke: scan.visible_stroke,
                visible_fill: scan.visible_fill,
            };

            scan.detector
                .scan(&form.content, resources, inherited, scan.depth + 1)?
        }
    };

    scan.x_objects.insert(name.clone(), marked);
    scan.marked |= marked;

    Ok(())
}
