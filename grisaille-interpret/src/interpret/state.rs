use crate::color::{Color, ColorComponents, ColorSpace};
use crate::error::{Error, Result};
use crate::resources::ResourceScope;
use crate::state::GraphicsState;
use grisaille_syntax::Operator;
use grisaille_syntax::object::Object;

/// Whether a color operator sets the stroking (uppercase) or the non-stroking color.
pub(crate) fn is_stroking(op: &Operator) -> bool {
    op.name.starts_with(|c: char| c.is_ascii_uppercase())
}

fn invalid(op: &Operator) -> Error {
    Error::InvalidOperand(op.name.clone())
}

fn numbers(operands: &[Object], op: &Operator) -> Result<ColorComponents> {
    operands
        .iter()
        .map(|o| o.as_f32().ok_or_else(|| invalid(op)))
        .collect()
}

/// Resolve the color space operand of `CS`/`cs`.
pub(crate) fn resolve_color_space(op: &Operator, resources: &dyn ResourceScope) -> Result<ColorSpace> {
    let name = op
        .operands
        .first()
        .and_then(Object::as_name)
        .ok_or_else(|| invalid(op))?;

    let builtin = match name.as_bytes() {
        b"DeviceGray" => Some(ColorSpace::device_gray()),
        b"DeviceRGB" => Some(ColorSpace::device_rgb()),
        b"DeviceCMYK" => Some(ColorSpace::device_cmyk()),
        b"Pattern" => Some(ColorSpace::pattern(None)),
        _ => None,
    };

    builtin
        .or_else(|| resources.color_space(name))
        .ok_or_else(|| Error::UndefinedColorspace(name.clone()))
}

/// Handle `CS` and `cs`.
pub(crate) fn set_color_space(
    op: &Operator,
    resources: &dyn ResourceScope,
    state: &mut GraphicsState,
) -> Result<()> {
    let cs = resolve_color_space(op, resources)?;
    let color = cs.initial_color();

    if is_stroking(op) {
        state.set_stroke(cs, color);
    } else {
        state.set_non_stroke(cs, color);
    }

    Ok(())
}

/// Handle `SC`, `SCN`, `sc` and `scn`, which set a color in the current color space.
pub(crate) fn set_color(op: &Operator, state: &mut GraphicsState) -> Result<()> {
    let stroking = is_stroking(op);
    let cs = if stroking {
        state.stroke_cs.clone()
    } else {
        state.non_stroke_cs.clone()
    };

    let color = if cs.is_pattern() {
        let (name, rest) = op.operands.split_last().ok_or_else(|| invalid(op))?;
        let name = name.as_name().ok_or_else(|| invalid(op))?.clone();

        let underlying = if rest.is_empty() {
            None
        } else {
            let components = numbers(rest, op)?;
            let color = cs
                .underlying()
                .and_then(|cs| cs.color(&components))
                .ok_or_else(|| invalid(op))?;

            Some(Box::new(color))
        };

        Color::Pattern { name, underlying }
    } else {
        let components = numbers(&op.operands, op)?;
        cs.color(&components).ok_or_else(|| invalid(op))?
    };

    if stroking {
        state.stroke_color = color;
    } else {
        state.non_stroke_color = color;
    }

    Ok(())
}

/// Handle `G`/`g`, `RG`/`rg` and `K`/`k`, which select a device color space together
/// with a color.
pub(crate) fn set_device_color(
    op: &Operator,
    cs: ColorSpace,
    state: &mut GraphicsState,
) -> Result<()> {
    let components = numbers(&op.operands, op)?;
    let color = cs.color(&components).ok_or_else(|| invalid(op))?;

    if is_stroking(op) {
        state.set_stroke(cs, color);
    } else {
        state.set_non_stroke(cs, color);
    }

    Ok(())
}
