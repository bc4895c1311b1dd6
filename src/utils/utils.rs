//! Helper functions

use crate::kinematic_traits::{Expmap, Position};

/// Checks if all coordinates are finite
pub fn is_valid(positions: &[Position]) -> bool {
    positions.iter().all(|p| p.iter().all(|x| x.is_finite()))
}

/// Build a position from an array of three coordinates
pub fn position(xyz: [f64; 3]) -> Position {
    Position::new(xyz[0], xyz[1], xyz[2])
}

/// Print positions (joints followed by the tip), one per line.
pub fn dump_positions(positions: &[Position]) {
    if positions.is_empty() {
        println!("No positions");
    }
    for (idx, p) in positions.iter().enumerate() {
        let label = if idx + 1 == positions.len() { "tip".to_string() } else { format!("j{}", idx) };
        println!("{:>4}: [{}]", label, format_position(p));
    }
}

/// Print increments as axis and angle in degrees.
pub fn dump_expmaps(expmaps: &[Expmap]) {
    if expmaps.is_empty() {
        println!("No increments");
    }
    for (idx, e) in expmaps.iter().enumerate() {
        let angle = e.norm();
        if angle == 0.0 {
            println!("j{}: no rotation", idx);
        } else {
            println!("j{}: {:7.3} deg about [{}]", idx, angle.to_degrees(), format_position(&(e / angle)));
        }
    }
}

pub fn format_position(p: &Position) -> String {
    format!("{:8.4} {:8.4} {:8.4}", p.x, p.y, p.z)
}

/// formatting for YAML output
#[allow(dead_code)]
pub(crate) fn yaml_point(p: &Position) -> String {
    format!("[{}, {}, {}]", p.x, p.y, p.z)
}

pub fn assert_position_eq(a: &Position, b: &Position, distance_tolerance: f64) -> bool {
    let distance = (a - b).norm();
    if !(distance <= distance_tolerance) {
        println!("[{}]", format_position(a));
        println!("[{}]", format_position(b));
        panic!("Positions are too far apart: {}", distance);
    }
    true
}
