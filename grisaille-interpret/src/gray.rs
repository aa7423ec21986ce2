//! Rewriting content streams and their resources to grayscale.

use crate::color::{Color, ColorSpace};
use crate::error::{Error, Result};
use crate::image::{gray_image, rgb_pixels};
use crate::interpret::{
    HandlerSet, InterpreterSettings, InterpreterWarning, ScanContext, process,
    state::is_stroking,
};
use crate::pattern::{Pattern, ShadingPattern};
use crate::resources::ResourceScope;
use crate::state::GraphicsState;
use crate::x_object::{FormXObject, ImageXObject, XObject};
use grisaille_syntax::filter::Filter;
use grisaille_syntax::object::{Name, Object};
use grisaille_syntax::{ContentStream, Operator};
use log::{debug, warn};
use rustc_hash::FxHashSet;

/// Color space replacements that are applied once a content stream was rewritten.
type PendingColorSpaces = Vec<(Name, ColorSpace)>;

/// Converts content streams to grayscale.
///
/// Color operators are rewritten to set gray colors, and shadings, patterns, images and
/// forms used by the stream are replaced by grayscale versions in the resources. The
/// gray value of a color is `0.3 R + 0.59 G + 0.11 B` of its RGB representation.
#[derive(Clone, Default)]
pub struct GrayscaleTransformer {
    settings: InterpreterSettings,
}

impl GrayscaleTransformer {
    /// Create a new transformer.
    pub fn new(settings: InterpreterSettings) -> Self {
        Self { settings }
    }

    /// Convert the content stream `ops` to grayscale.
    ///
    /// Returns the rewritten stream. The resources used by the stream are replaced in
    /// `resources`, which need to be stored together with the new stream. If an error
    /// occurs, some resources may already have been replaced.
    pub fn to_grayscale(
        &self,
        ops: &[Operator],
        resources: &mut dyn ResourceScope,
    ) -> Result<ContentStream> {
        self.transform_scope(ops, resources, GraphicsState::default(), 0)
    }

    /// Convert an image to an 8-bit DeviceGray image.
    ///
    /// Returns `None` for images that are left as they are: images with a single color
    /// component, image masks and images whose data can't be inspected (JPX, CCITT and
    /// JBIG2). Images that fail to decode are reported as a warning and left unchanged
    /// as well.
    ///
    /// The image is re-encoded with its filter. If that isn't possible, `FlateDecode` is
    /// used instead.
    pub fn convert_image(&self, image: &ImageXObject) -> Result<Option<ImageXObject>> {
        if image.image_mask || image.num_components() == 1 {
            return Ok(None);
        }

        match image.opaque_filter() {
            Some(Filter::JpxDecode) => {
                warn!("JPX images are not decoded, leaving the image unchanged");
                (self.settings.warning_sink)(InterpreterWarning::JpxImage);

                return Ok(None);
            }
            Some(filter) => {
                debug!("leaving bilevel {filter} image unchanged");

                return Ok(None);
            }
            None => {}
        }

        let codec = &self.settings.image_codec;
        let pixels = match codec.decode(image).and_then(|raw| rgb_pixels(image, &raw)) {
            Ok(pixels) => pixels,
            Err(e) => {
                warn!("leaving image that failed to decode unchanged: {e}");
                (self.settings.warning_sink)(InterpreterWarning::ImageDecodeFailure);

                return Ok(None);
            }
        };

        let gray = gray_image(&pixels, image.width, image.height);

        let encoded = match image.filters.as_slice() {
            [] => codec.encode(&gray, None).map(|data| (data, None)),
            [(filter, _)] => codec
                .encode(&gray, Some(*filter))
                .map(|data| (data, Some(*filter))),
            _ => Err(Error::UnsupportedEncodingParameters),
        };

        let (data, filter) = match encoded {
            Ok(encoded) => encoded,
            Err(Error::UnsupportedEncodingParameters) => {
                warn!("can't re-encode image with its original filters, using FlateDecode");
                (self.settings.warning_sink)(InterpreterWarning::EncoderFallback);

                let filter = Filter::FlateDecode;
                (codec.encode(&gray, Some(filter))?, Some(filter))
            }
            Err(e) => return Err(e),
        };

        Ok(Some(ImageXObject {
            width: image.width,
            height: image.height,
            color_space: Some(ColorSpace::device_gray()),
            bits_per_component: gray.bits_per_component,
            filters: filter.map(|f| vec![(f, None)]).unwrap_or_default(),
            data,
            decode: None,
            image_mask: false,
            has_soft_mask: image.has_soft_mask,
        }))
    }

    /// Rewrite a stream that owns its resource scope. Color space replacements are
    /// applied to the scope afterwards.
    fn transform_scope(
        &self,
        ops: &[Operator],
        resources: &mut dyn ResourceScope,
        initial: GraphicsState,
        depth: usize,
    ) -> Result<ContentStream> {
        let mut pending = PendingColorSpaces::new();
        let content = self.transform(ops, resources, &mut pending, initial, depth)?;

        for (name, color_space) in pending {
            resources.set_color_space(&name, color_space);
        }

        Ok(content)
    }

    fn transform(
        &self,
        ops: &[Operator],
        resources: &mut dyn ResourceScope,
        pending: &mut PendingColorSpaces,
        initial: GraphicsState,
        depth: usize,
    ) -> Result<ContentStream> {
        if depth > self.settings.max_depth {
            warn!("content streams are nested too deeply, leaving the innermost one unchanged");
            (self.settings.warning_sink)(InterpreterWarning::RecursionLimit);

            return Ok(ops.iter().cloned().collect());
        }

        let handlers = HandlerSet::new()
            .on_many(&["CS", "cs"], on_color_space)
            .on_many(&["SC", "SCN", "sc", "scn"], on_color)
            .on_many(&["RG", "rg", "K", "k"], on_device_color)
            .on("sh", on_shading)
            .on("BI", on_inline_image)
            .on("Do", on_x_object)
            .on_other(copy);

        let mut scan = GrayScan {
            transformer: self,
            resources,
            pending,
            depth,
            output: ContentStream::new(),
            patterns: FxHashSet::default(),
            shadings: FxHashSet::default(),
            x_objects: FxHashSet::default(),
        };

        process(ops, &handlers, &mut scan, initial)?;

        Ok(scan.output)
    }

    fn convert_pattern(&self, pattern: Pattern, depth: usize) -> Result<Option<Pattern>> {
        match pattern {
            Pattern::Tiling(mut tiling) if tiling.colored => {
                let content = self.transform_scope(
                    &tiling.content,
                    &mut tiling.resources,
                    GraphicsState::default(),
                    depth + 1,
                )?;
                tiling.content = content;

                Ok(Some(tiling.into()))
            }
            // Painted with the color of the operator selecting it.
            Pattern::Tiling(_) => Ok(None),
            Pattern::Shading(s) => Ok(Some(ShadingPattern::new(s.shading.to_grayscale()?).into())),
        }
    }
}

struct GrayScan<'a> {
    transformer: &'a GrayscaleTransformer,
    resources: &'a mut dyn ResourceScope,
    /// Replacing a pattern color space right away would change how later operators of
    /// the same stream resolve their operands.
    pending: &'a mut PendingColorSpaces,
    depth: usize,
    output: ContentStream,
    patterns: FxHashSet<Name>,
    shadings: FxHashSet<Name>,
    x_objects: FxHashSet<Name>,
}

impl ScanContext for GrayScan<'_> {
    fn resources(&self) -> &dyn ResourceScope {
        &*self.resources
    }

    fn settings(&self) -> &InterpreterSettings {
        &self.transformer.settings
    }
}

fn name_operand(op: &Operator) -> Result<&Name> {
    op.operands
        .first()
        .and_then(Object::as_name)
        .ok_or_else(|| Error::InvalidOperand(op.name.clone()))
}

fn gray_operand(op: &Operator, cs: &ColorSpace, color: &Color) -> Result<Object> {
    cs.to_gray(&color.components())
        .map(Object::from)
        .ok_or_else(|| Error::InvalidOperand(op.name.clone()))
}

fn current(op: &Operator, state: &GraphicsState) -> (ColorSpace, Color) {
    if is_stroking(op) {
        (state.stroke_cs.clone(), state.stroke_color.clone())
    } else {
        (state.non_stroke_cs.clone(), state.non_stroke_color.clone())
    }
}

fn copy(scan: &mut GrayScan<'_>, op: &Operator, _: &GraphicsState) -> Result<()> {
    scan.output.push(op.clone());

    Ok(())
}

fn on_color_space(scan: &mut GrayScan<'_>, op: &Operator, state: &GraphicsState) -> Result<()> {
    let (cs, _) = current(op, state);

    if !cs.is_pattern() {
        scan.output.push(Operator::new(
            op.name.as_str(),
            [Name::new("DeviceGray").into()],
        ));

        return Ok(());
    }

    let name = name_operand(op)?;

    if *name != "Pattern" && cs.underlying().is_some() {
        scan.pending
            .push((name.clone(), ColorSpace::pattern(Some(ColorSpace::device_gray()))));
    }

    scan.output.push(op.clone());

    Ok(())
}

fn on_color(scan: &mut GrayScan<'_>, op: &Operator, state: &GraphicsState) -> Result<()> {
    let (cs, color) = current(op, state);

    let Color::Pattern { name, underlying } = &color else {
        scan.output
            .push(Operator::new(op.name.as_str(), [gray_operand(op, &cs, &color)?]));

        return Ok(());
    };

    let mut operands = vec![];

    if let Some(underlying) = underlying {
        let base = cs
            .underlying()
            .ok_or_else(|| Error::InvalidOperand(op.name.clone()))?;
        operands.push(gray_operand(op, base, underlying)?);
    }

    operands.push(name.clone().into());

    if scan.patterns.insert(name.clone()) {
        let pattern = scan
            .resources
            .pattern(name)
            .ok_or_else(|| Error::UndefinedPattern(name.clone()))?;

        if let Some(converted) = scan.transformer.convert_pattern(pattern, scan.depth)? {
            scan.resources.set_pattern(name, converted);
        }
    } else {
        debug!("pattern {name} was already converted");
    }

    scan.output.push(Operator::new(op.name.as_str(), operands));

    Ok(())
}

fn on_device_color(scan: &mut GrayScan<'_>, op: &Operator, state: &GraphicsState) -> Result<()> {
    let (cs, color) = current(op, state);
    let name = if is_stroking(op) { "G" } else { "g" };

    scan.output
        .push(Operator::new(name, [gray_operand(op, &cs, &color)?]));

    Ok(())
}

fn on_shading(scan: &mut GrayScan<'_>, op: &Operator, _: &GraphicsState) -> Result<()> {
    let name = name_operand(op)?;

    if scan.shadings.insert(name.clone()) {
        let shading = scan
            .resources
            .shading(name)
            .ok_or_else(|| Error::UndefinedShading(name.clone()))?;
        scan.resources.set_shading(name, shading.to_grayscale()?);
    }

    scan.output.push(op.clone());

    Ok(())
}

fn on_inline_image(scan: &mut GrayScan<'_>, op: &Operator, _: &GraphicsState) -> Result<()> {
    let inline = op
        .inline_image()
        .ok_or_else(|| Error::InvalidOperand(op.name.clone()))?;
    let image = ImageXObject::from_inline(inline, &*scan.resources)?;

    match scan.transformer.convert_image(&image)? {
        Some(converted) => scan.output.push(Operator::new(
            "BI",
            [Object::InlineImage(Box::new(converted.to_inline(&inline.dict)))],
        )),
        None => scan.output.push(op.clone()),
    }

    Ok(())
}

fn on_x_object(scan: &mut GrayScan<'_>, op: &Operator, state: &GraphicsState) -> Result<()> {
    let name = name_operand(op)?;
    scan.output.push(op.clone());

    if !scan.x_objects.insert(name.clone()) {
        debug!("XObject {name} was already converted");

        return Ok(());
    }

    let x_object = scan
        .resources
        .x_object(name)
        .ok_or_else(|| Error::UndefinedXObject(name.clone()))?;

    match x_object {
        XObject::Image(image) => {
            if image.has_filter(Filter::RunLengthDecode) && image.has_soft_mask {
                // Such images are usually fully masked, changing them shows the mask.
                debug!("leaving soft-masked run length image {name} unchanged");

                return Ok(());
            }

            if let Some(converted) = scan.transformer.convert_image(&image)? {
                scan.resources.set_x_object(name, converted.into());
            }
        }
        XObject::Form(FormXObject {
            content,
            resources: Some(mut resources),
        }) => {
            let content = scan.transformer.transform_scope(
                &content,
                &mut resources,
                state.clone(),
                scan.depth + 1,
            )?;
            scan.resources
                .set_x_object(name, FormXObject::new(content, Some(resources)).into());
        }
        XObject::Form(FormXObject {
            content,
            resources: None,
        }) => {
            let content = scan.transformer.transform(
                &content,
                &mut *scan.resources,
                &mut *scan.pending,
                state.clone(),
                scan.depth + 1,
            )?;
            scan.resources
                .set_x_object(name, FormXObject::new(content, None).into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::TilingPattern;
    use crate::resources::Resources;
    use crate::shading::Shading;
    use grisaille_syntax::parse;
    use std::sync::{Arc, Mutex};

    fn transform(content: &[u8], resources: &mut Resources) -> Result<ContentStream> {
        GrayscaleTransformer::default().to_grayscale(&parse(content).unwrap(), resources)
    }

    fn operand(op: &Operator, i: usize) -> f32 {
        op.operands[i].as_f32().unwrap()
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn device_colors() {
        let out = transform(b"1 0 0 RG 0 0 1 rg 0 0 0 1 K 0.5 g S", &mut Resources::new()).unwrap();
        let names = out.iter().map(|op| op.name.as_str()).collect::<Vec<_>>();

        assert_eq!(names, ["G", "g", "G", "g", "S"]);
        assert!(approx(operand(&out[0], 0), 0.3));
        assert!(approx(operand(&out[1], 0), 0.11));
        assert!(approx(operand(&out[2], 0), 0.0));
        assert!(approx(operand(&out[3], 0), 0.5));
    }

    #[test]
    fn color_spaces() {
        let mut resources = Resources::new().with_color_space("CS0", ColorSpace::device_rgb());
        let out = transform(b"/CS0 cs 0 1 0 sc /DeviceCMYK CS 0 0 0 0 SC", &mut resources).unwrap();

        assert_eq!(out[0], Operator::new("cs", [Name::new("DeviceGray").into()]));
        assert_eq!(out[1].name, "sc");
        assert!(approx(operand(&out[1], 0), 0.59));
        assert_eq!(out[2], Operator::new("CS", [Name::new("DeviceGray").into()]));
        assert_eq!(out[3].operands.len(), 1);
        assert!(approx(operand(&out[3], 0), 1.0));

        // The resource itself is left alone, the operators no longer use it.
        assert_eq!(resources.color_space(&Name::new("CS0")).unwrap().family_name(), "DeviceRGB");
    }

    #[test]
    fn shadings() {
        let mut resources = Resources::new()
            .with_shading("Sh0", Shading::new(2, ColorSpace::device_rgb()))
            .with_shading("Sh1", Shading::new(2, ColorSpace::device_gray()));
        let out = transform(b"/Sh0 sh /Sh1 sh /Sh0 sh", &mut resources).unwrap();

        assert_eq!(out.to_bytes(), parse(b"/Sh0 sh /Sh1 sh /Sh0 sh").unwrap().to_bytes());

        let sh0 = resources.shading(&Name::new("Sh0")).unwrap();
        assert_eq!(sh0.color_space.family_name(), "DeviceN");
        assert!(approx(sh0.color_space.to_gray(&[1.0, 0.0, 0.0]).unwrap(), 0.3));
        assert_eq!(
            resources.shading(&Name::new("Sh1")).unwrap().color_space.family_name(),
            "DeviceGray"
        );

        let mut resources = Resources::new()
            .with_shading("Sh0", Shading::new(2, ColorSpace::icc_based(4, None).unwrap()));
        assert!(transform(b"/Sh0 sh", &mut resources).is_ok());
        assert_eq!(
            transform(b"/Sh9 sh", &mut resources),
            Err(Error::UndefinedShading(Name::new("Sh9")))
        );
    }

    #[test]
    fn pattern_color_spaces_are_replaced_after_the_stream() {
        let mut resources = Resources::new()
            .with_color_space("P0", ColorSpace::pattern(Some(ColorSpace::device_rgb())))
            .with_pattern(
                "Pat",
                TilingPattern::new(parse(b"0 0 1 1 re f").unwrap(), Resources::new(), false).into(),
            );

        let out = transform(b"/P0 cs 0 0 1 /Pat scn f /P0 CS 1 0 0 /Pat SCN S", &mut resources)
            .unwrap();

        assert_eq!(out[0], Operator::new("cs", [Name::new("P0").into()]));
        assert_eq!(out[1].operands.len(), 2);
        assert!(approx(operand(&out[1], 0), 0.11));
        assert_eq!(out[1].operands[1], Object::Name(Name::new("Pat")));
        assert!(approx(operand(&out[4], 0), 0.3));

        let cs = resources.color_space(&Name::new("P0")).unwrap();
        assert!(cs.is_pattern());
        assert_eq!(cs.underlying().unwrap().family_name(), "DeviceGray");
    }

    #[test]
    fn patterns() {
        let colored = TilingPattern::new(parse(b"0 1 0 rg 0 0 1 1 re f").unwrap(), Resources::new(), true);
        let uncolored = TilingPattern::new(parse(b"0 1 0 rg 0 0 1 1 re f").unwrap(), Resources::new(), false);
        let shading = ShadingPattern::new(Shading::new(2, ColorSpace::device_cmyk()));
        let mut resources = Resources::new()
            .with_pattern("P0", colored.into())
            .with_pattern("P1", uncolored.into())
            .with_pattern("P2", shading.into());

        let out = transform(
            b"/Pattern cs /P0 scn f /P1 scn f /Pattern CS /P2 SCN S /P0 scn",
            &mut resources,
        )
        .unwrap();
        assert_eq!(out[1], Operator::new("scn", [Name::new("P0").into()]));

        let Some(Pattern::Tiling(p0)) = resources.pattern(&Name::new("P0")) else {
            panic!("expected a tiling pattern");
        };
        assert_eq!(p0.content[0].name, "g");
        assert!(approx(operand(&p0.content[0], 0), 0.59));

        let Some(Pattern::Tiling(p1)) = resources.pattern(&Name::new("P1")) else {
            panic!("expected a tiling pattern");
        };
        assert_eq!(p1.content[0].name, "rg");

        let Some(Pattern::Shading(p2)) = resources.pattern(&Name::new("P2")) else {
            panic!("expected a shading pattern");
        };
        assert_eq!(p2.shading.color_space.family_name(), "DeviceN");
        assert_eq!(p2.shading.color_space.colorant_names().len(), 4);
    }

    #[test]
    fn forms() {
        let own = FormXObject::new(
            parse(b"/CS0 cs 1 0 0 sc f").unwrap(),
            Some(Resources::new().with_color_space("CS0", ColorSpace::device_rgb())),
        );
        let shared = FormXObject::new(parse(b"0 1 0 RG S /Sh0 sh").unwrap(), None);
        let mut resources = Resources::new()
            .with_x_object("Fm0", own.into())
            .with_x_object("Fm1", shared.into())
            .with_shading("Sh0", Shading::new(2, ColorSpace::device_rgb()));

        let out = transform(b"/Fm0 Do /Fm1 Do", &mut resources).unwrap();
        assert_eq!(out.to_bytes(), parse(b"/Fm0 Do /Fm1 Do").unwrap().to_bytes());

        let Some(XObject::Form(fm0)) = resources.x_object(&Name::new("Fm0")) else {
            panic!("expected a form");
        };
        assert_eq!(fm0.content[0], Operator::new("cs", [Name::new("DeviceGray").into()]));
        assert!(fm0.resources.is_some());

        let Some(XObject::Form(fm1)) = resources.x_object(&Name::new("Fm1")) else {
            panic!("expected a form");
        };
        assert_eq!(fm1.content[0].name, "G");
        assert_eq!(
            resources.shading(&Name::new("Sh0")).unwrap().color_space.family_name(),
            "DeviceN"
        );
    }

    #[test]
    fn forms_inherit_the_graphics_state() {
        let form = FormXObject::new(parse(b"1 0 0 sc 0 0 5 5 re f").unwrap(), None);
        let mut resources = Resources::new().with_x_object("Fm0", form.into());

        let out = transform(b"/DeviceRGB cs /Fm0 Do", &mut resources).unwrap();
        assert_eq!(out.to_bytes(), parse(b"/DeviceGray cs /Fm0 Do").unwrap().to_bytes());

        let Some(XObject::Form(fm0)) = resources.x_object(&Name::new("Fm0")) else {
            panic!("expected a form");
        };
        assert_eq!(fm0.content[0].name, "sc");
        assert_eq!(fm0.content[0].operands.len(), 1);
        assert!(approx(operand(&fm0.content[0], 0), 0.3));
    }

    #[test]
    fn images() {
        let rgb = ImageXObject::new(2, 1, ColorSpace::device_rgb(), 8, vec![255, 0, 0, 0, 0, 255]);
        let flate_data = Filter::FlateDecode
            .encode(&[0, 255, 0], &grisaille_syntax::filter::ImageLayout {
                width: 1,
                height: 1,
                components: 3,
                bits_per_component: 8,
            })
            .unwrap();
        let flate = ImageXObject::new(1, 1, ColorSpace::device_rgb(), 8, flate_data)
            .with_filter(Filter::FlateDecode, None);
        let masked = ImageXObject::new(1, 1, ColorSpace::device_rgb(), 8, vec![0x80, 255, 0, 0])
            .with_filter(Filter::RunLengthDecode, None)
            .with_soft_mask();
        let gray = ImageXObject::new(1, 1, ColorSpace::device_gray(), 8, vec![7]);
        let mut resources = Resources::new()
            .with_x_object("Im0", rgb.into())
            .with_x_object("Im1", flate.into())
            .with_x_object("Im2", masked.into())
            .with_x_object("Im3", gray.into());

        transform(b"/Im0 Do /Im1 Do /Im2 Do /Im3 Do", &mut resources).unwrap();

        let image = |name: &str| match resources.x_object(&Name::new(name)) {
            Some(XObject::Image(image)) => image,
            _ => panic!("expected an image"),
        };

        let im0 = image("Im0");
        assert_eq!(im0.color_space.unwrap().family_name(), "DeviceGray");
        assert_eq!(im0.data, [77, 28]);
        assert!(im0.filters.is_empty());

        let im1 = image("Im1");
        assert_eq!(im1.filters.len(), 1);
        assert_eq!(Filter::FlateDecode.decode(&im1.data, None).unwrap(), [150]);

        assert_eq!(image("Im2").num_components(), 3);
        assert_eq!(image("Im3").data, [7]);
    }

    #[test]
    fn encoder_fallback() {
        let warnings = Arc::new(Mutex::new(vec![]));
        let sink = warnings.clone();
        let transformer = GrayscaleTransformer::new(InterpreterSettings {
            warning_sink: Arc::new(move |w| sink.lock().unwrap().push(w)),
            ..Default::default()
        });

        let image = ImageXObject::new(1, 1, ColorSpace::device_rgb(), 8, b"<~rr<$~>".to_vec())
            .with_filter(Filter::Ascii85Decode, None);
        let converted = transformer.convert_image(&image).unwrap().unwrap();

        assert_eq!(converted.filters.len(), 1);
        assert_eq!(converted.filters[0].0, Filter::FlateDecode);
        assert_eq!(*warnings.lock().unwrap(), [InterpreterWarning::EncoderFallback]);
    }

    #[test]
    fn inline_images() {
        let out = transform(
            b"BI /W 1 /H 1 /CS /RGB /BPC 8 ID \xff\x00\x00 EI BI /W 1 /H 1 /CS /G /BPC 8 ID \x10 EI",
            &mut Resources::new(),
        )
        .unwrap();

        let image = out[0].inline_image().unwrap();
        assert_eq!(image.data, [77]);
        assert_eq!(image.dict.get("CS").and_then(Object::as_name).unwrap(), "DeviceGray");
        assert_eq!(out[1], parse(b"BI /W 1 /H 1 /CS /G /BPC 8 ID \x10 EI").unwrap()[0]);
    }

    #[test]
    fn undefined_resources() {
        let mut resources = Resources::new();

        assert_eq!(
            transform(b"/Pattern cs /P0 scn", &mut resources),
            Err(Error::UndefinedPattern(Name::new("P0")))
        );
        assert_eq!(
            transform(b"/Im0 Do", &mut resources),
            Err(Error::UndefinedXObject(Name::new("Im0")))
        );
        assert_eq!(
            transform(b"/CS0 cs", &mut resources),
            Err(Error::UndefinedColorspace(Name::new("CS0")))
        );
    }

    #[test]
    fn self_referencing_form() {
        let form = FormXObject::new(parse(b"1 0 0 rg /Fm0 Do").unwrap(), None);
        let mut resources = Resources::new().with_x_object("Fm0", form.into());

        let transformer = GrayscaleTransformer::new(InterpreterSettings {
            max_depth: 3,
            ..Default::default()
        });
        let out = transformer
            .to_grayscale(&parse(b"/Fm0 Do").unwrap(), &mut resources)
            .unwrap();

        assert_eq!(out.len(), 1);
    }
}
