use crate::error::{Error, Result};

use super::{Axis, Bounds, RenderEntity};

/// Returns the literal coordinate with the largest magnitude on `axis`.
///
/// `-5` beats `4`; the sign is kept. On ties the first entity wins.
pub fn absolute_max(entities: &[RenderEntity], axis: Axis) -> Result<f32> {
    let mut values = entities.iter().map(|entity| entity.coordinate(axis));
    let first = values.next().ok_or(Error::EmptyInput)?;
    Ok(values.fold(first, |best, value| {
        if value.abs() > best.abs() { value } else { best }
    }))
}

/// Returns the true `(min, max)` of the coordinates on `axis`.
pub fn signed_extent(entities: &[RenderEntity], axis: Axis) -> Result<(f32, f32)> {
    let mut values = entities.iter().map(|entity| entity.coordinate(axis));
    let first = values.next().ok_or(Error::EmptyInput)?;
    Ok(values.fold((first, first), |(min, max), value| {
        (min.min(value), max.max(value))
    }))
}

pub fn signed_bounds(entities: &[RenderEntity]) -> Result<Bounds> {
    let (min_x, max_x) = signed_extent(entities, Axis::X)?;
    let (min_y, max_y) = signed_extent(entities, Axis::Y)?;
    Ok(Bounds {
        min_x,
        min_y,
        max_x,
        max_y,
    })
}

/// Bounds symmetric about the origin, sized by the absolute-max coordinates.
pub fn absolute_bounds(entities: &[RenderEntity]) -> Result<Bounds> {
    let x = absolute_max(entities, Axis::X)?;
    let y = absolute_max(entities, Axis::Y)?;
    Ok(Bounds {
        min_x: -x.abs(),
        min_y: -y.abs(),
        max_x: x.abs(),
        max_y: y.abs(),
    })
}
