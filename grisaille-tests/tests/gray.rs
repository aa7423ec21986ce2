use crate::{approx, load, pattern_resources};
use grisaille_interpret::color::{ColorSpace, rgb_to_gray};
use grisaille_interpret::pattern::Pattern;
use grisaille_interpret::resources::Resources;
use grisaille_interpret::x_object::FormXObject;
use grisaille_interpret::{ColorDetector, GrayscaleTransformer, ResourceScope};
use grisaille_syntax::object::{Name, Object};
use grisaille_syntax::{ContentStream, Operator, parse};
use grisaille_tests::CountingResources;

fn transform(content: &[u8], resources: &mut dyn ResourceScope) -> ContentStream {
    GrayscaleTransformer::default()
        .to_grayscale(&parse(content).unwrap(), resources)
        .unwrap()
}

fn value(op: &Operator) -> f32 {
    op.operands[0].as_f32().unwrap()
}

#[test]
fn gray_round_trip() {
    for x in [0.0, 0.25, 0.5, 0.75, 1.0] {
        assert!(approx(rgb_to_gray([x, x, x]), x));

        let out = transform(format!("{x} {x} {x} rg").as_bytes(), &mut Resources::new());
        assert_eq!(out[0].name, "g");
        assert!(approx(value(&out[0]), x));
    }
}

#[test]
fn red_stroke() {
    let out = transform(b"1 0 0 RG 0 0 10 10 re f", &mut Resources::new());

    assert_eq!(out[0].name, "G");
    assert!(approx(value(&out[0]), 0.3));
    assert_eq!(out[1..], parse(b"0 0 10 10 re f").unwrap()[..]);
}

#[test]
fn blue_rectangle() {
    let out = GrayscaleTransformer::default()
        .to_grayscale(&load("blue_rectangle"), &mut Resources::new())
        .unwrap();
    let names = out.iter().map(|op| op.name.as_str()).collect::<Vec<_>>();

    assert_eq!(names, ["q", "G", "re", "S", "Q"]);
    assert!(approx(value(&out[1]), 0.11));
}

#[test]
fn output_is_no_longer_colored() {
    let mut resources = Resources::new();
    let out = GrayscaleTransformer::default()
        .to_grayscale(&parse(b"1 0 0 RG 0 1 0 rg 0 0 1 0 k 0 0 5 5 re B").unwrap(), &mut resources)
        .unwrap();

    // Written out and read back, as a caller storing the result would.
    let out = parse(&out.to_bytes()).unwrap();
    assert!(!ColorDetector::default().is_colored(&out, &resources).unwrap());
}

#[test]
fn pattern_color_spaces_and_shadings_get_gray_bases() {
    let mut resources = pattern_resources();
    GrayscaleTransformer::default()
        .to_grayscale(&load("patterns"), &mut resources)
        .unwrap();

    let cs = resources.color_space(&Name::new("P0")).unwrap();
    assert_eq!(cs.underlying().map(ColorSpace::family_name), Some("DeviceGray"));

    let Some(Pattern::Shading(shade)) = resources.pattern(&Name::new("Shade")) else {
        panic!("expected a shading pattern");
    };
    let color_space = &shade.shading.color_space;
    assert_eq!(color_space.family_name(), "DeviceN");
    assert_eq!(color_space.alternate().map(ColorSpace::family_name), Some("DeviceGray"));
}

#[test]
fn patterns_are_converted_once() {
    let mut resources = CountingResources::new(pattern_resources());
    let out = GrayscaleTransformer::default()
        .to_grayscale(&load("patterns"), &mut resources)
        .unwrap();

    assert_eq!(resources.counts().patterns, 2);

    // The uncolored tile is painted with gray versions of red and of 50% gray.
    assert_eq!(out[1].operands.len(), 2);
    assert!(approx(value(&out[1]), 0.3));
    assert_eq!(out[1].operands[1], Object::Name(Name::new("Tile")));
    assert!(approx(value(&out[4]), 0.5));
}

#[test]
fn shared_forms() {
    let form = FormXObject::new(parse(b"0 0 1 rg 0 0 5 5 re f").unwrap(), None);
    let mut resources = CountingResources::new(Resources::new().with_x_object("Fm0", form.into()));

    let out = transform(b"/Fm0 Do /Fm0 Do", &mut resources);

    assert_eq!(out.len(), 2);
    assert_eq!(resources.counts().x_objects, 1);
    assert!(
        !ColorDetector::default()
            .is_colored(&out, &resources)
            .unwrap()
    );
}
