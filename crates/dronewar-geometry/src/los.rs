//! Line-of-sight against obstacle boxes.
//!
//! Uses a slab test of the segment against each axis-aligned box. The ray
//! origin is inset slightly so a shooter resting on a surface does not
//! occlude itself.

use glam::DVec3;

use dronewar_core::components::Obstacle;
use dronewar_core::constants::LOS_INSET;

/// Parametric entry point `t` in `[0, 1]` of the segment `start..end` into
/// the obstacle's box, or `None` if the segment misses it.
fn segment_box_entry(start: DVec3, end: DVec3, obstacle: &Obstacle) -> Option<f64> {
    let dir = end - start;
    let min = obstacle.min();
    let max = obstacle.max();

    let mut t_enter = 0.0_f64;
    let mut t_exit = 1.0_f64;

    for axis in 0..3 {
        let s = start[axis];
        let d = dir[axis];
        if d.abs() < 1e-12 {
            // Parallel to this slab: must already lie inside it.
            if s < min[axis] || s > max[axis] {
                return None;
            }
            continue;
        }
        let mut t1 = (min[axis] - s) / d;
        let mut t2 = (max[axis] - s) / d;
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_enter = t_enter.max(t1);
        t_exit = t_exit.min(t2);
        if t_enter > t_exit {
            return None;
        }
    }

    Some(t_enter)
}

/// First point where the segment from `start` to `end` enters an obstacle.
///
/// Only intersections strictly before `end` count, so a target standing on
/// an obstacle face is still visible.
pub fn first_obstacle_hit(start: DVec3, end: DVec3, obstacles: &[Obstacle]) -> Option<DVec3> {
    let delta = end - start;
    let length = delta.length();
    if length <= LOS_INSET {
        return None; // Too close for anything to fit between
    }

    let origin = start + delta / length * LOS_INSET;

    let nearest_t = obstacles
        .iter()
        .filter_map(|obstacle| segment_box_entry(origin, end, obstacle))
        .filter(|t| *t < 1.0)
        .fold(None, |best: Option<f64>, t| match best {
            Some(b) if b <= t => Some(b),
            _ => Some(t),
        })?;

    Some(origin + (end - origin) * nearest_t)
}

/// True iff no obstacle intersects the segment from `start` to `end`.
pub fn line_of_sight(start: DVec3, end: DVec3, obstacles: &[Obstacle]) -> bool {
    first_obstacle_hit(start, end, obstacles).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> Vec<Obstacle> {
        // 2 wide, 10 tall, 20 deep, centered on the origin footprint.
        vec![Obstacle::grounded(0.0, 0.0, 2.0, 10.0, 20.0)]
    }

    #[test]
    fn test_los_clear_with_no_obstacles() {
        assert!(line_of_sight(
            DVec3::new(-10.0, 1.0, 0.0),
            DVec3::new(10.0, 1.0, 0.0),
            &[]
        ));
    }

    #[test]
    fn test_los_blocked_by_wall() {
        let obstacles = wall();
        let start = DVec3::new(-10.0, 1.0, 0.0);
        let end = DVec3::new(10.0, 1.0, 0.0);
        assert!(!line_of_sight(start, end, &obstacles));

        let hit = first_obstacle_hit(start, end, &obstacles).expect("wall blocks");
        assert!((hit.x - -1.0).abs() < 1e-9, "hit at near face, got {hit}");
        assert!((hit.y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_los_over_wall() {
        let obstacles = wall();
        assert!(line_of_sight(
            DVec3::new(-10.0, 15.0, 0.0),
            DVec3::new(10.0, 15.0, 0.0),
            &obstacles
        ));
    }

    #[test]
    fn test_los_around_wall() {
        let obstacles = wall();
        assert!(line_of_sight(
            DVec3::new(-10.0, 1.0, 12.0),
            DVec3::new(10.0, 1.0, 12.0),
            &obstacles
        ));
    }

    #[test]
    fn test_los_target_on_face_is_visible() {
        let obstacles = wall();
        assert!(line_of_sight(
            DVec3::new(-10.0, 1.0, 0.0),
            DVec3::new(-1.0, 1.0, 0.0),
            &obstacles
        ));
    }

    #[test]
    fn test_los_origin_on_face_not_self_occluded() {
        let obstacles = wall();
        // Shooter resting on the -x face, looking away from the wall.
        assert!(line_of_sight(
            DVec3::new(-1.0, 1.0, 0.0),
            DVec3::new(-10.0, 1.0, 0.0),
            &obstacles
        ));
    }

    #[test]
    fn test_nearest_of_several_hits_wins() {
        let obstacles = vec![
            Obstacle::grounded(6.0, 0.0, 2.0, 10.0, 2.0),
            Obstacle::grounded(2.0, 0.0, 2.0, 10.0, 2.0),
        ];
        let hit = first_obstacle_hit(
            DVec3::new(0.0, 1.0, 0.0),
            DVec3::new(10.0, 1.0, 0.0),
            &obstacles,
        )
        .unwrap();
        assert!((hit.x - 1.0).abs() < 1e-9, "expected nearer box, got {hit}");
    }
}
