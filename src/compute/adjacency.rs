//! Neighboring geohash cells.
//!
//! The last character of a geohash addresses a sub-cell of its parent. For
//! odd-length hashes that sub-grid is 8 columns by 4 rows; for even-length
//! hashes it is 4 columns by 8 rows. Each layout gets its own border and
//! neighbor tables. When the last character sits on the border in the
//! requested direction, the parent prefix is moved first.

use super::codec::{BASE32, char_value};
use crate::error::{GeoproxError, Result};
use crate::types::Direction;

/// Neighbor strings for odd-length hashes, in [`slot`] order: if `last` sits
/// at index `i` of the string, its neighbor is `BASE32[i]`.
const ODD_NEIGHBORS: [&str; 4] = [
    "bc01fg45238967deuvhjyznpkmstqrwx",
    "238967debc01fg45kmstqrwxuvhjyznp",
    "p0r21436x8zb9dcf5h7kjnmqesgutwvy",
    "14365h7k9dcfesgujnmqp0r2twvyx8zb",
];

const ODD_BORDERS: [&str; 4] = ["bcfguvyz", "0145hjnp", "prxz", "028b"];

/// Even-length hashes use the transposed grid: vertical moves there use the
/// odd horizontal tables and vice versa.
const fn transposed(direction: Direction) -> Direction {
    match direction {
        Direction::Top => Direction::Right,
        Direction::Right => Direction::Top,
        Direction::Bottom => Direction::Left,
        Direction::Left => Direction::Bottom,
    }
}

#[derive(Debug, Clone, Copy)]
enum Parity {
    Odd,
    Even,
}

impl Parity {
    fn of_len(len: usize) -> Self {
        if len % 2 == 1 { Parity::Odd } else { Parity::Even }
    }
}

/// Direct lookup form of one neighbor/border table pair. Both arrays are
/// indexed by the 5-bit character value; `neighbor` holds values too.
struct DirectionTable {
    neighbor: [u8; 32],
    border: [bool; 32],
}

struct AdjacencyTables {
    odd: [DirectionTable; 4],
    even: [DirectionTable; 4],
}

const fn slot(direction: Direction) -> usize {
    match direction {
        Direction::Top => 0,
        Direction::Bottom => 1,
        Direction::Right => 2,
        Direction::Left => 3,
    }
}

/// 5-bit value of an alphabet byte. A byte outside the alphabet stops
/// compilation when the tables are evaluated.
const fn base32_value(ch: u8) -> usize {
    let mut i = 0;
    while i < BASE32.len() {
        if BASE32[i] == ch {
            return i;
        }
        i += 1;
    }
    panic!("adjacency table holds a byte outside the geohash alphabet");
}

const fn odd_table(direction: Direction) -> DirectionTable {
    let neighbors = ODD_NEIGHBORS[slot(direction)].as_bytes();
    let borders = ODD_BORDERS[slot(direction)].as_bytes();
    assert!(neighbors.len() == 32, "neighbor table must cover the alphabet");

    let mut table = DirectionTable {
        neighbor: [0; 32],
        border: [false; 32],
    };
    let mut pos = 0;
    while pos < neighbors.len() {
        table.neighbor[base32_value(neighbors[pos])] = pos as u8;
        pos += 1;
    }
    let mut i = 0;
    while i < borders.len() {
        table.border[base32_value(borders[i])] = true;
        i += 1;
    }
    table
}

static TABLES: AdjacencyTables = AdjacencyTables {
    odd: [
        odd_table(Direction::Top),
        odd_table(Direction::Bottom),
        odd_table(Direction::Right),
        odd_table(Direction::Left),
    ],
    even: [
        odd_table(transposed(Direction::Top)),
        odd_table(transposed(Direction::Bottom)),
        odd_table(transposed(Direction::Right)),
        odd_table(transposed(Direction::Left)),
    ],
};

fn table(parity: Parity, direction: Direction) -> &'static DirectionTable {
    let set = match parity {
        Parity::Odd => &TABLES.odd,
        Parity::Even => &TABLES.even,
    };
    &set[slot(direction)]
}

/// Geohash of the cell adjacent to `hash` in `direction`, at the same precision.
///
/// Input is lower-cased first. Moving left or right across the antimeridian
/// wraps around; moving past a pole fails with `InvalidArgument`.
///
/// # Examples
///
/// ```
/// use geoprox::compute::adjacency::adjacent;
/// use geoprox::Direction;
///
/// assert_eq!(adjacent("xn7", Direction::Top)?, "xne");
/// assert_eq!(adjacent("xn7", Direction::Right)?, "xnk");
/// assert_eq!(adjacent("xn7", Direction::Bottom)?, "xn5");
/// assert_eq!(adjacent("xn7", Direction::Left)?, "xn6");
/// # Ok::<(), geoprox::GeoproxError>(())
/// ```
pub fn adjacent(hash: &str, direction: Direction) -> Result<String> {
    if hash.is_empty() {
        return Err(GeoproxError::InvalidArgument(
            "Cannot compute the neighbor of an empty geohash".to_string(),
        ));
    }
    let hash = hash.to_ascii_lowercase();
    let mut values = Vec::with_capacity(hash.len());
    for (position, ch) in hash.chars().enumerate() {
        values.push(char_value(ch, position)?);
    }

    step(&mut values, direction)?;
    Ok(values.iter().map(|&v| BASE32[v as usize] as char).collect())
}

/// Moves the cell addressed by `values` one step, borrowing from the prefix
/// when the last character is on the border.
fn step(values: &mut [u8], direction: Direction) -> Result<()> {
    let parity = Parity::of_len(values.len());
    let Some((last, prefix)) = values.split_last_mut() else {
        return match direction {
            Direction::Left | Direction::Right => Ok(()),
            Direction::Top | Direction::Bottom => Err(GeoproxError::InvalidArgument(format!(
                "No neighbor {} of a cell on the {} pole",
                direction,
                if direction == Direction::Top {
                    "north"
                } else {
                    "south"
                }
            ))),
        };
    };

    let table = table(parity, direction);
    let value = *last as usize;

    if table.border[value] {
        step(prefix, direction)?;
    }
    *last = table.neighbor[value];
    Ok(())
}

/// The eight cells surrounding `hash`, clockwise from north:
/// `[n, ne, e, se, s, sw, w, nw]`.
///
/// Fails with `InvalidArgument` for cells touching a pole.
pub fn neighbors(hash: &str) -> Result<[String; 8]> {
    let n = adjacent(hash, Direction::Top)?;
    let s = adjacent(hash, Direction::Bottom)?;
    let e = adjacent(hash, Direction::Right)?;
    let w = adjacent(hash, Direction::Left)?;
    let ne = adjacent(&n, Direction::Right)?;
    let se = adjacent(&s, Direction::Right)?;
    let sw = adjacent(&s, Direction::Left)?;
    let nw = adjacent(&n, Direction::Left)?;
    Ok([n, ne, e, se, s, sw, w, nw])
}
