use super::position::{Position, DIMS};

/// Unit steps along each axis: `[[1,0], [0,1]]`.
///
/// Every site has one forward and one backward neighbor per step, giving the
/// four von Neumann neighbors in 2-D.
pub const UNIT_STEPS: [Position; DIMS] = [Position::new(1, 0), Position::new(0, 1)];

/// Forward and backward unit offsets, ordered `+x, -x, +y, -y`.
pub fn von_neumann() -> [Position; 2 * DIMS] {
    let mut out = [Position::default(); 2 * DIMS];
    for (d, &step) in UNIT_STEPS.iter().enumerate() {
        out[2 * d] = step;
        out[2 * d + 1] = -step;
    }
    out
}
