//! Hand-drawn ASCII layouts used as a map style generator.
//!
//! One character per tile, using the same symbols as the access layer
//! dump: `.` floor, `#` wall, `+` door, `-` room, space nothing and `_`
//! square. Lower-case `y`, `g`, `b` and `r` mark room tiles locked with
//! the yellow, green, blue or red keycard. Short rows are padded with
//! nothing.

use std::collections::BTreeSet;

use mapgen_core::access::{AccessCode, BaseType, Keycard};
use mapgen_core::error::MapError;
use mapgen_core::lifecycle::MapGenerator;
use mapgen_core::map::Map;
use mapgen_core::math::Vec2i;
use mapgen_core::mission::MissionSpec;

use crate::error::{Result, ToolError};

fn keycard_marker(ch: char) -> Option<Keycard> {
    match ch {
        'y' => Some(Keycard::Yellow),
        'g' => Some(Keycard::Green),
        'b' => Some(Keycard::Blue),
        'r' => Some(Keycard::Red),
        _ => None,
    }
}

fn parse_cell(ch: char) -> Option<AccessCode> {
    if let Some(card) = keycard_marker(ch) {
        return Some(AccessCode::new(BaseType::Room).with_access(card.access_bit()));
    }
    BaseType::from_ascii(ch).map(AccessCode::new)
}

/// A parsed layout: access codes in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsciiLayout {
    size: Vec2i,
    cells: Vec<AccessCode>,
}

impl AsciiLayout {
    /// Parse layout text. Trailing empty lines are ignored.
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.trim_end_matches(['\n', '\r']).lines().collect();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        if lines.is_empty() || width == 0 {
            return Err(ToolError::EmptyLayout);
        }

        let mut cells = Vec::with_capacity(width * lines.len());
        for (row, line) in lines.iter().enumerate() {
            let mut count = 0;
            for (column, ch) in line.chars().enumerate() {
                let code = parse_cell(ch).ok_or(ToolError::Layout {
                    line: row + 1,
                    column: column + 1,
                    ch,
                })?;
                cells.push(code);
                count += 1;
            }
            cells.extend(std::iter::repeat(AccessCode::NOTHING).take(width - count));
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let size = Vec2i::new(width as i32, lines.len() as i32);
        Ok(Self { size, cells })
    }

    /// Layout size in tiles.
    #[must_use]
    pub const fn size(&self) -> Vec2i {
        self.size
    }

    /// Access partitions in use: one per distinct keycard plus "no card".
    #[must_use]
    pub fn key_access_count(&self) -> usize {
        let cards: BTreeSet<Keycard> = self
            .cells
            .iter()
            .filter_map(|&code| mapgen_core::access::decode_keycard_flag(code))
            .collect();
        cards.len() + 1
    }
}

impl MapGenerator for AsciiLayout {
    fn generate(&mut self, map: &mut Map, mission: &MissionSpec) -> mapgen_core::error::Result<()> {
        if mission.size != self.size {
            return Err(MapError::GeneratorFailed(format!(
                "layout is {}x{} but mission is {}x{}",
                self.size.x, self.size.y, mission.size.x, mission.size.y
            )));
        }
        let positions: Vec<Vec2i> = map.grid().positions().collect();
        for (pos, &code) in positions.into_iter().zip(&self.cells) {
            map.grid_mut().set_access_code(pos, code);
        }
        map.set_key_access_count(self.key_access_count());
        tracing::debug!(
            width = self.size.x,
            height = self.size.y,
            key_access_count = map.key_access_count(),
            "Layout painted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapgen_core::access::AccessBits;
    use mapgen_core::config::MapConfig;
    use mapgen_core::mission::MapType;

    const LAYOUT: &str = "\
#####
#.-y#
#+#
#bb.#
#####
";

    #[test]
    fn test_parse_pads_short_rows() {
        let layout = AsciiLayout::parse(LAYOUT).unwrap();
        assert_eq!(layout.size(), Vec2i::new(5, 5));
        assert_eq!(layout.cells[2 * 5 + 3], AccessCode::NOTHING);
        assert_eq!(layout.cells[5 + 2], AccessCode::new(BaseType::Room));
        assert_eq!(
            layout.cells[5 + 3],
            AccessCode::new(BaseType::Room).with_access(AccessBits::YELLOW)
        );
    }

    #[test]
    fn test_key_access_count_counts_cards() {
        let layout = AsciiLayout::parse(LAYOUT).unwrap();
        assert_eq!(layout.key_access_count(), 3);
        let plain = AsciiLayout::parse("...\n.-.\n").unwrap();
        assert_eq!(plain.key_access_count(), 1);
    }

    #[test]
    fn test_unknown_character() {
        let err = AsciiLayout::parse("..\n.x\n").unwrap_err();
        assert!(matches!(err, ToolError::Layout { line: 2, column: 2, ch: 'x' }));
    }

    #[test]
    fn test_empty_layout() {
        assert!(matches!(AsciiLayout::parse("\n\n"), Err(ToolError::EmptyLayout)));
    }

    #[test]
    fn test_generate_paints_grid() {
        let mut layout = AsciiLayout::parse(LAYOUT).unwrap();
        let mission = MissionSpec::new(layout.size(), MapType::Static);
        let mut map = Map::with_size(MapConfig::default(), layout.size()).unwrap();
        layout.generate(&mut map, &mission).unwrap();

        assert_eq!(map.ascii_rows()[2], "#+#  ");
        assert_eq!(map.grid().base_type(Vec2i::new(1, 3)), BaseType::Room);
        assert!(map.grid().is_tile_in_locked_room(Vec2i::new(2, 3)));
        assert_eq!(map.key_access_count(), 3);
    }

    #[test]
    fn test_generate_rejects_size_mismatch() {
        let mut layout = AsciiLayout::parse(LAYOUT).unwrap();
        let mission = MissionSpec::new(Vec2i::new(6, 5), MapType::Static);
        let mut map = Map::with_size(MapConfig::default(), Vec2i::new(6, 5)).unwrap();
        assert!(matches!(
            layout.generate(&mut map, &mission),
            Err(MapError::GeneratorFailed(_))
        ));
    }
}
