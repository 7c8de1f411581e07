//! Axis-aligned hitboxes for the runner and obstacles
//!
//! Both boxes are inset by [`HITBOX_PADDING`] on every side so near misses
//! feel like misses. Y grows downward; boxes hang from the ground baseline
//! minus the entity's vertical offset.

use crate::consts::*;

use super::state::Obstacle;

/// An axis-aligned box in canvas coordinates (top < bottom)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Aabb {
    /// Strict overlap test; shared edges do not count as a hit
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

/// Inset hitbox for the runner at the given vertical offset
pub fn runner_box(runner_y: f32) -> Aabb {
    Aabb {
        left: RUNNER_X + HITBOX_PADDING,
        right: RUNNER_X + RUNNER_WIDTH - HITBOX_PADDING,
        top: GROUND_Y + runner_y - RUNNER_HEIGHT + HITBOX_PADDING,
        bottom: GROUND_Y + runner_y - HITBOX_PADDING,
    }
}

/// Inset hitbox for an obstacle
pub fn obstacle_box(obs: &Obstacle) -> Aabb {
    Aabb {
        left: obs.x + HITBOX_PADDING,
        right: obs.x + obs.width - HITBOX_PADDING,
        top: GROUND_Y + obs.y - obs.height + HITBOX_PADDING,
        bottom: GROUND_Y + obs.y - HITBOX_PADDING,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObstacleKind;

    fn cactus_at(x: f32) -> Obstacle {
        Obstacle {
            id: 1,
            kind: ObstacleKind::Cactus,
            x,
            y: 0.0,
            width: 40.0,
            height: 60.0,
            collected: false,
        }
    }

    #[test]
    fn test_runner_box_is_inset() {
        let b = runner_box(0.0);
        assert_eq!(b.left, RUNNER_X + HITBOX_PADDING);
        assert_eq!(b.right, RUNNER_X + RUNNER_WIDTH - HITBOX_PADDING);
        assert_eq!(b.bottom, GROUND_Y - HITBOX_PADDING);
        assert!(b.right - b.left < RUNNER_WIDTH);
        assert!(b.bottom - b.top < RUNNER_HEIGHT);
    }

    #[test]
    fn test_grounded_runner_hits_cactus_at_same_x() {
        let obs = cactus_at(RUNNER_X);
        assert!(runner_box(0.0).overlaps(&obstacle_box(&obs)));
    }

    #[test]
    fn test_runner_clears_cactus_when_high_enough() {
        let obs = cactus_at(RUNNER_X);
        // Feet above the cactus top, with padding on both boxes
        let clearance = -(obs.height + HITBOX_PADDING * 2.0 + 1.0);
        assert!(!runner_box(clearance).overlaps(&obstacle_box(&obs)));
    }

    #[test]
    fn test_distant_obstacle_does_not_overlap() {
        let obs = cactus_at(CANVAS_WIDTH);
        assert!(!runner_box(0.0).overlaps(&obstacle_box(&obs)));
    }

    #[test]
    fn test_touching_edges_are_not_a_hit() {
        let a = Aabb {
            left: 0.0,
            right: 10.0,
            top: 0.0,
            bottom: 10.0,
        };
        let b = Aabb {
            left: 10.0,
            right: 20.0,
            top: 0.0,
            bottom: 10.0,
        };
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn test_padding_forgives_grazing_contact() {
        // Raw rectangles overlap by one padding width; the insets keep them apart
        let obs = cactus_at(RUNNER_X + RUNNER_WIDTH - HITBOX_PADDING);
        assert!(!runner_box(0.0).overlaps(&obstacle_box(&obs)));
    }
}
