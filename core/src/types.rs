/// Single coordinate axis used for board side lengths and positions.
pub type Coord = u8;

/// Count type used for mine totals and cell tallies.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn square(side: Coord) -> CellCount {
    let side = side as CellCount;
    side.saturating_mul(side)
}

/// Chebyshev (king-move) distance between two coordinates.
pub fn chebyshev(a: Coord2, b: Coord2) -> Coord {
    a.0.abs_diff(b.0).max(a.1.abs_diff(b.1))
}

/// Applies `delta` to `coords`, returning a value only when it stays inside
/// `bounds`.
fn offset(coords: Coord2, delta: (i16, i16), bounds: Coord2) -> Option<Coord2> {
    let x = i16::from(coords.0) + delta.0;
    let y = i16::from(coords.1) + delta.1;
    if x < 0 || y < 0 || x >= i16::from(bounds.0) || y >= i16::from(bounds.1) {
        return None;
    }
    Some((x as Coord, y as Coord))
}

/// Lazy, restartable walk over the square neighborhood of chebyshev radius
/// `radius` around `center`, clipped to a `bounds`-sized board.
#[derive(Clone, Debug)]
pub struct AreaIter {
    center: Coord2,
    bounds: Coord2,
    radius: Coord,
    with_center: bool,
    index: u16,
}

impl AreaIter {
    /// Cells at distance 1..=radius; the center itself is skipped.
    pub fn around(center: Coord2, bounds: Coord2, radius: Coord) -> Self {
        Self {
            center,
            bounds,
            radius,
            with_center: false,
            index: 0,
        }
    }

    /// Cells at distance 0..=radius, center included.
    pub fn covering(center: Coord2, bounds: Coord2, radius: Coord) -> Self {
        Self {
            center,
            bounds,
            radius,
            with_center: true,
            index: 0,
        }
    }

    fn span(&self) -> u16 {
        2 * u16::from(self.radius) + 1
    }
}

impl Iterator for AreaIter {
    type Item = Coord2;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.span();
        while self.index < span * span {
            let dx = (self.index / span) as i16 - i16::from(self.radius);
            let dy = (self.index % span) as i16 - i16::from(self.radius);
            self.index += 1;

            if dx == 0 && dy == 0 && !self.with_center {
                continue;
            }
            if let Some(next_item) = offset(self.center, (dx, dy), self.bounds) {
                return Some(next_item);
            }
        }
        None
    }
}
