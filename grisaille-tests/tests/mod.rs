use grisaille_interpret::color::ColorSpace;
use grisaille_interpret::pattern::{ShadingPattern, TilingPattern};
use grisaille_interpret::resources::Resources;
use grisaille_interpret::shading::Shading;
use grisaille_syntax::{ContentStream, parse};
use once_cell::sync::Lazy;
use std::path::PathBuf;

mod detect;
mod gray;

pub(crate) static WORKSPACE_PATH: Lazy<PathBuf> =
    Lazy::new(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(""));
pub(crate) static CONTENT_PATH: Lazy<PathBuf> = Lazy::new(|| WORKSPACE_PATH.join("content"));

/// Load a content stream from the `content` directory.
pub(crate) fn load(name: &str) -> ContentStream {
    let path = CONTENT_PATH.join(format!("{name}.txt"));
    let data = std::fs::read(&path).unwrap_or_else(|e| panic!("failed to read {path:?}: {e}"));

    parse(&data).unwrap()
}

/// The resources used by `content/patterns.txt`: an uncolored tiling pattern selected
/// through an RGB pattern color space, and a CMYK shading pattern.
pub(crate) fn pattern_resources() -> Resources {
    let tile = TilingPattern::new(parse(b"0 0 5 5 re f").unwrap(), Resources::new(), false);
    let shade = ShadingPattern::new(Shading::new(2, ColorSpace::device_cmyk()));

    Resources::new()
        .with_color_space("P0", ColorSpace::pattern(Some(ColorSpace::device_rgb())))
        .with_pattern("Tile", tile.into())
        .with_pattern("Shade", shade.into())
}

pub(crate) fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-4
}
