//! Obstacle overlap tests and push-out resolution.

use glam::DVec3;

use dronewar_core::components::Obstacle;
use dronewar_core::constants::COLLISION_SEPARATION;
use dronewar_core::types::horizontal_distance;

/// Footprint test: true if the horizontal distance to the obstacle center is
/// inside the obstacle's bounding radius plus `entity_radius`.
///
/// Altitude is ignored; callers that care about height check it separately.
pub fn box_collision(point: DVec3, obstacle: &Obstacle, entity_radius: f64) -> bool {
    horizontal_distance(point, obstacle.center) < obstacle.footprint_radius() + entity_radius
}

/// Footprint test against every obstacle.
pub fn collides_with_any(point: DVec3, obstacles: &[Obstacle], entity_radius: f64) -> bool {
    obstacles
        .iter()
        .any(|obstacle| box_collision(point, obstacle, entity_radius))
}

/// Clamp a point into the obstacle's box.
/// Points already inside the box are returned unchanged.
pub fn nearest_surface_point(point: DVec3, obstacle: &Obstacle) -> DVec3 {
    point.clamp(obstacle.min(), obstacle.max())
}

/// True if a sphere of `radius` at `point` intersects the obstacle's box.
pub fn overlaps_box(point: DVec3, obstacle: &Obstacle, radius: f64) -> bool {
    let nearest = nearest_surface_point(point, obstacle);
    nearest == point || point.distance(nearest) < radius
}

/// Result of pushing a body out of an obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Corrected position, clear of the obstacle by `radius` plus a small gap.
    pub position: DVec3,
    /// Outward unit surface normal at the contact.
    pub normal: DVec3,
}

/// Resolve overlap between a sphere and an obstacle box.
///
/// Returns `None` when there is no overlap. A center outside the box is moved
/// along the nearest-surface offset; a center inside the box exits through
/// the face with the least penetration.
pub fn push_out(point: DVec3, obstacle: &Obstacle, radius: f64) -> Option<Contact> {
    if !overlaps_box(point, obstacle, radius) {
        return None;
    }

    let nearest = nearest_surface_point(point, obstacle);
    let offset = point - nearest;
    let clearance = radius + COLLISION_SEPARATION;

    if let Some(normal) = offset.try_normalize() {
        return Some(Contact {
            position: nearest + normal * clearance,
            normal,
        });
    }

    let min = obstacle.min();
    let max = obstacle.max();
    let faces = [
        (point.x - min.x, DVec3::NEG_X),
        (max.x - point.x, DVec3::X),
        (point.y - min.y, DVec3::NEG_Y),
        (max.y - point.y, DVec3::Y),
        (point.z - min.z, DVec3::NEG_Z),
        (max.z - point.z, DVec3::Z),
    ];

    // Never exit through the ground face: everything rests on y = 0.
    let (depth, normal) = faces
        .iter()
        .copied()
        .filter(|(_, n)| *n != DVec3::NEG_Y || min.y > 0.0)
        .fold((f64::INFINITY, DVec3::Y), |best, face| {
            if face.0 < best.0 {
                face
            } else {
                best
            }
        });

    Some(Contact {
        position: point + normal * (depth + clearance),
        normal,
    })
}

/// True if a ground-level disc of `radius` at `point` overlaps the obstacle's
/// footprint rectangle. Height is ignored.
pub fn overlaps_footprint(point: DVec3, obstacle: &Obstacle, radius: f64) -> bool {
    let min = obstacle.min();
    let max = obstacle.max();
    let dx = point.x - point.x.clamp(min.x, max.x);
    let dz = point.z - point.z.clamp(min.z, max.z);
    (dx == 0.0 && dz == 0.0) || (dx * dx + dz * dz).sqrt() < radius
}

/// Ground-plane variant of [`push_out`] for bodies that never leave the
/// ground: the box is treated as an infinite column and the body only moves
/// in x/z. The returned position keeps the input's y.
pub fn push_out_horizontal(point: DVec3, obstacle: &Obstacle, radius: f64) -> Option<Contact> {
    if !overlaps_footprint(point, obstacle, radius) {
        return None;
    }

    let min = obstacle.min();
    let max = obstacle.max();
    let nearest = DVec3::new(
        point.x.clamp(min.x, max.x),
        point.y,
        point.z.clamp(min.z, max.z),
    );
    let clearance = radius + COLLISION_SEPARATION;

    if let Some(normal) = (point - nearest).try_normalize() {
        return Some(Contact {
            position: nearest + normal * clearance,
            normal,
        });
    }

    let faces = [
        (point.x - min.x, DVec3::NEG_X),
        (max.x - point.x, DVec3::X),
        (point.z - min.z, DVec3::NEG_Z),
        (max.z - point.z, DVec3::Z),
    ];
    let (depth, normal) = faces
        .iter()
        .copied()
        .fold((f64::INFINITY, DVec3::X), |best, face| {
            if face.0 < best.0 {
                face
            } else {
                best
            }
        });

    Some(Contact {
        position: point + normal * (depth + clearance),
        normal,
    })
}
