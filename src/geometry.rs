use eframe::egui::{Pos2, Vec2};

/// Angular offset (radians) of the two tail vertices from the tip direction.
pub const TRUNK_OFFSET: f32 = 2.896_614;

const TRUNK_RATIO: f32 = 0.386_55;

pub const ARROW_VERTICES: usize = 7;

/// Builds the arrow outline inscribed in a `size` x `size` square whose
/// top-left is `corner`, pointing along `heading_degrees`.
///
/// Winding order is tip, shoulder, waist, tail, tail, waist, shoulder. Callers
/// must keep that order when filling the outline.
pub fn build_arrow_polygon(
    heading_degrees: f32,
    size: f32,
    corner: Pos2,
) -> [Pos2; ARROW_VERTICES] {
    let half = 0.5 * size;
    let quarter = 0.25 * size;
    let eighth = 0.125 * size;
    let trunk = TRUNK_RATIO * size;

    let center = corner + Vec2::splat(half);
    let r = heading_degrees.to_radians();
    let (s, c) = r.sin_cos();
    let (tail_left_s, tail_left_c) = (r + TRUNK_OFFSET).sin_cos();
    let (tail_right_s, tail_right_c) = (r - TRUNK_OFFSET).sin_cos();

    [
        center + Vec2::new(half * s, -half * c),
        center + Vec2::new(quarter * c, quarter * s),
        center + Vec2::new(eighth * c, eighth * s),
        center + Vec2::new(trunk * tail_left_s, -trunk * tail_left_c),
        center + Vec2::new(trunk * tail_right_s, -trunk * tail_right_c),
        center + Vec2::new(-eighth * c, -eighth * s),
        center + Vec2::new(-quarter * c, -quarter * s),
    ]
}

/// Heading of the target relative to where the player faces, both in the
/// game's counter-clockwise degrees.
pub fn relative_heading(player_heading: f32, heading_to_target: f32) -> f32 {
    player_heading - heading_to_target
}
