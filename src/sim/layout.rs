//! Scene geometry for rendering
//!
//! Pure functions from simulation state to screen-space rectangles. The
//! renderer draws what this returns; nothing here feeds back into the sim.

use glam::Vec2;
use serde::Serialize;

use super::assembly::Segment;
use super::catalog::Shape;
use super::state::AnimationState;
use crate::consts::*;

/// Axis-aligned rectangle, `min` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }
}

/// One segment as it should be drawn this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentSprite {
    pub index: usize,
    pub segment: Segment,
    pub rect: Rect,
}

/// Width of each segment when `count` of them share the gap
pub fn segment_width(count: usize) -> f32 {
    (GAP_END - GAP_START) / count.max(1) as f32
}

/// Visual depth of a deck shape
pub fn deck_height(shape: Shape, width: f32) -> f32 {
    match shape {
        Shape::Straight => 20.0,
        Shape::Triangle => 25.0,
        Shape::Arch => width / 2.0,
        Shape::IBeam => 28.0,
    }
}

/// Segments still on screen, with their fall offsets applied
pub fn segment_sprites(segments: &[Segment], anim: &AnimationState) -> Vec<SegmentSprite> {
    let width = segment_width(segments.len());
    segments
        .iter()
        .enumerate()
        .filter_map(|(index, segment)| {
            let fall = anim.segment_fall_offsets.get(index).copied().unwrap_or(0.0);
            if fall > SEGMENT_LANDED {
                return None;
            }
            let height = deck_height(segment.shape, width);
            let bottom = GROUND_Y + fall;
            Some(SegmentSprite {
                index,
                segment: *segment,
                rect: Rect {
                    min: Vec2::new(GAP_START + index as f32 * width, bottom - height),
                    size: Vec2::new(width, height),
                },
            })
        })
        .collect()
}

/// Bottom-left anchor of the traveling object, if one is drawn
pub fn object_anchor(anim: &AnimationState) -> Option<Vec2> {
    anim.object_visible()
        .then(|| Vec2::new(anim.object_position, GROUND_Y + anim.object_vertical_offset))
}

/// Progress across the scene, 0 at the start line and 1 at the far side
pub fn crossing_progress(anim: &AnimationState) -> f32 {
    ((anim.object_position - START_POSITION) / (FAR_SIDE - START_POSITION)).clamp(0.0, 1.0)
}
