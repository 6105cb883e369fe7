use crate::model::PlacedNode;

/// Distance below which two centres are treated as coincident.
const COINCIDENT_EPSILON: f32 = 0.001;

/// Push apart node centres closer than `min_distance`.
///
/// Each pass visits every pair `(i, j)` with `i < j` in slice order once and
/// moves both members half the shortfall along the line joining them, `i`
/// away from `j` and `j` away from `i`. A pass can leave a pair short again
/// when a later pair moves one of its members, so `passes > 1` repeats until a
/// pass moves nothing or the cap is reached. `passes == 0` is treated as one.
///
/// Returns the number of pair adjustments made.
pub fn resolve_overlaps(nodes: &mut [PlacedNode], min_distance: f32, passes: usize) -> usize {
    if min_distance <= 0.0 || nodes.len() < 2 {
        return 0;
    }

    let mut adjustments = 0;
    for pass in 0..passes.max(1) {
        let moved = relax_pass(nodes, min_distance);
        adjustments += moved;
        if moved == 0 {
            break;
        }
        log::trace!(pass, moved; "Overlap pass");
    }
    adjustments
}

fn relax_pass(nodes: &mut [PlacedNode], min_distance: f32) -> usize {
    let mut moved = 0;
    for i in 0..nodes.len() {
        for j in (i + 1)..nodes.len() {
            let a = nodes[i].center;
            let b = nodes[j].center;
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance >= min_distance {
                continue;
            }
            // Coincident centres have no direction of their own; split them horizontally.
            let (ux, uy) = if distance < COINCIDENT_EPSILON {
                (1.0, 0.0)
            } else {
                (dx / distance, dy / distance)
            };
            let push = (min_distance - distance) / 2.0;
            nodes[i].shift(-ux * push, -uy * push);
            nodes[j].shift(ux * push, uy * push);
            moved += 1;
        }
    }
    moved
}
