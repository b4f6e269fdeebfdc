//! Proptest strategies for map types.

use mapgen_core::access::{AccessBits, AccessCode, BaseType};
use mapgen_core::math::Vec2i;
use proptest::prelude::*;

/// Grid sizes from 1x1 up to 40x40.
pub fn grid_size() -> impl Strategy<Value = Vec2i> {
    (1..=40i32, 1..=40i32).prop_map(|(x, y)| Vec2i::new(x, y))
}

/// Tile positions anywhere in and well around a 40x40 grid.
pub fn any_tile_pos() -> impl Strategy<Value = Vec2i> {
    (-50..90i32, -50..90i32).prop_map(|(x, y)| Vec2i::new(x, y))
}

/// A grid size together with an in-bounds position.
pub fn size_and_pos() -> impl Strategy<Value = (Vec2i, Vec2i)> {
    grid_size().prop_flat_map(|size| {
        (0..size.x, 0..size.y).prop_map(move |(x, y)| (size, Vec2i::new(x, y)))
    })
}

/// Any base type.
pub fn base_type() -> impl Strategy<Value = BaseType> {
    proptest::sample::select(BaseType::ALL.to_vec())
}

/// Any combination of the four keycard bits.
pub fn access_bits() -> impl Strategy<Value = AccessBits> {
    (0..16u16).prop_map(|bits| AccessBits::from_bits_truncate(bits << 8))
}

/// Any valid access code.
pub fn access_code() -> impl Strategy<Value = AccessCode> {
    (base_type(), access_bits(), any::<bool>()).prop_map(|(base, access, leave_free)| {
        let code = AccessCode::new(base).with_access(access);
        if leave_free {
            code.with_leave_free()
        } else {
            code
        }
    })
}
