use crate::{load, pattern_resources};
use grisaille_interpret::color::{COLOR_TOLERANCE, Color, ColorSpace, is_rgb_colored};
use grisaille_interpret::function::Function;
use grisaille_interpret::pattern::{Pattern, TilingPattern};
use grisaille_interpret::resources::Resources;
use grisaille_interpret::shading::Shading;
use grisaille_interpret::{ColorDetector, Error};
use grisaille_syntax::object::{Dict, Name};
use grisaille_syntax::parse;
use grisaille_tests::CountingResources;

fn colored(content: &[u8], resources: &Resources) -> Result<bool, Error> {
    ColorDetector::default().is_colored(&parse(content).unwrap(), resources)
}

#[test]
fn grays_are_never_colored() {
    for v in [0.0, 0.2, 0.5, 0.99, 1.0] {
        assert!(!Color::Gray(v).is_colored());
        assert!(!Color::CalGray(v).is_colored());
        assert!(!Color::Rgb([v, v, v]).is_colored());
    }
}

#[test]
fn tolerance_boundary() {
    // Exactly at the tolerance is still gray.
    assert!(!is_rgb_colored([0.0, COLOR_TOLERANCE, 0.0]));
    assert!(!is_rgb_colored([0.0, 0.0, COLOR_TOLERANCE * 0.99]));
    assert!(is_rgb_colored([0.0, COLOR_TOLERANCE * 1.01, 0.0]));
    assert!(is_rgb_colored([COLOR_TOLERANCE * 1.01, 0.0, 0.0]));
    assert!(!Color::Rgb([0.0, COLOR_TOLERANCE, 0.0]).is_colored());
    assert!(Color::Rgb([0.0, 0.0, COLOR_TOLERANCE * 1.01]).is_colored());
}

#[test]
fn cmyk_black_is_not_colored() {
    assert!(!Color::Cmyk([0.0, 0.0, 0.0, 1.0]).is_colored());
    assert!(!Color::Cmyk([0.3, 0.3, 0.3, 0.5]).is_colored());
    assert!(Color::Cmyk([0.0, 1.0, 0.0, 0.0]).is_colored());
}

#[test]
fn lab_uses_a_and_b() {
    let lab = ColorSpace::lab(&Dict::new());

    assert!(!lab.color(&[50.0, 0.0, 0.0]).unwrap().is_colored());
    assert!(!lab.color(&[100.0, 0.0, 0.0]).unwrap().is_colored());
    assert!(lab.color(&[50.0, 20.0, 0.0]).unwrap().is_colored());
    assert!(lab.color(&[50.0, 0.0, -20.0]).unwrap().is_colored());
}

#[test]
#[should_panic]
fn pattern_colors_have_no_coloredness() {
    let color = Color::Pattern {
        name: Name::new("P0"),
        underlying: None,
    };

    color.is_colored();
}

#[test]
fn shading_component_counts() {
    let detector = ColorDetector::default();

    assert_eq!(
        detector.is_shading_colored(&Shading::new(2, ColorSpace::device_gray())),
        Ok(false)
    );
    assert_eq!(
        detector.is_shading_colored(&Shading::new(3, ColorSpace::device_rgb())),
        Ok(true)
    );
    assert_eq!(
        detector.is_shading_colored(&Shading::new(4, ColorSpace::device_cmyk())),
        Ok(true)
    );

    // Three colorants are colored, whatever the alternate space.
    let names = ["Cyan", "Magenta", "Spot"].map(Name::new).into_iter().collect();
    let tint = Function::exponential((0.0, 1.0), &[1.0], &[0.0], 1.0);
    let spot = ColorSpace::device_n(names, ColorSpace::device_gray(), tint);
    assert_eq!(detector.is_shading_colored(&Shading::new(2, spot)), Ok(true));

    for n in [2, 5] {
        let names = (0..n).map(|i| Name::new(format!("Spot{i}"))).collect();
        let tint = Function::exponential((0.0, 1.0), &[0.0], &[1.0], 1.0);
        let cs = ColorSpace::device_n(names, ColorSpace::device_gray(), tint);

        assert_eq!(
            detector.is_shading_colored(&Shading::new(2, cs)),
            Err(Error::UnsupportedColorspace(n))
        );
    }
}

#[test]
fn red_stroke() {
    assert!(colored(b"1 0 0 RG 0 0 10 10 re f", &Resources::new()).unwrap());
}

#[test]
fn blue_rectangle() {
    let detector = ColorDetector::default();

    assert!(detector.is_colored(&load("blue_rectangle"), &Resources::new()).unwrap());
}

#[test]
fn black_text_is_not_colored() {
    let detector = ColorDetector::default();

    assert!(!detector.is_colored(&load("black_text"), &Resources::new()).unwrap());
}

#[test]
fn colored_and_uncolored_tiling() {
    let content = parse(b"0 1 0 rg 0 0 5 5 re f").unwrap();
    let colored = Pattern::from(TilingPattern::new(content.clone(), Resources::new(), true));
    let uncolored = Pattern::from(TilingPattern::new(content, Resources::new(), false));
    let detector = ColorDetector::default();

    assert!(detector.is_pattern_colored(&colored).unwrap());
    assert!(!detector.is_pattern_colored(&uncolored).unwrap());
}

#[test]
fn patterns_are_resolved_once() {
    let resources = CountingResources::new(
        Resources::new().with_pattern(
            "Tile",
            TilingPattern::new(parse(b"0 0 5 5 re f").unwrap(), Resources::new(), false).into(),
        ),
    );
    let content = parse(b"/Pattern cs /Tile scn 0 0 5 5 re f /Tile scn 5 5 5 5 re f").unwrap();

    assert!(!ColorDetector::default().is_colored(&content, &resources).unwrap());
    assert_eq!(resources.counts().patterns, 1);
}

#[test]
fn underlying_colors_of_uncolored_patterns() {
    let detector = ColorDetector::default();

    // The first use of the pattern is red.
    assert!(detector.is_colored(&load("patterns"), &pattern_resources()).unwrap());

    let gray_only = parse(b"/P0 cs 0.5 0.5 0.5 /Tile scn 0 0 5 5 re f").unwrap();
    assert!(!detector.is_colored(&gray_only, &pattern_resources()).unwrap());
}

#[test]
fn undefined_shading() {
    assert_eq!(
        colored(b"/Sh0 sh", &Resources::new()),
        Err(Error::UndefinedShading(Name::new("Sh0")))
    );
}
