use glam::Vec3;
use tracing::debug;

use crate::camera::Camera;
use crate::error::Result;
use crate::input::PickInput;
use crate::picking::{pick_nearest_sphere, ray_intersect_plane};
use crate::spline::KeyframeTrack;

/// Mouse editing of keyframe positions.
///
/// Shift+click selects the keyframe sphere nearest along the cursor ray, or
/// clears the selection when nothing is hit. Holding shift and the button
/// drags the selected keyframe in the plane facing the camera through its
/// current position. Keyframe times never change.
#[derive(Clone, Debug)]
pub struct KeyframeEditor {
    selected: Option<usize>,
    /// Radius of the pickable sphere around each keyframe.
    pub radius: f32,
}

impl KeyframeEditor {
    pub fn new(radius: f32) -> Self {
        Self {
            selected: None,
            radius,
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    /// Applies one frame of input to `track`.
    ///
    /// Returns the new position when a keyframe was moved.
    pub fn update(
        &mut self,
        input: &PickInput,
        camera: &Camera,
        track: &mut KeyframeTrack,
    ) -> Result<Option<Vec3>> {
        if !input.shift {
            return Ok(None);
        }

        let ray = camera.picking_ray(input.cursor_ndc);

        if input.mouse_pressed {
            let centers = track.keyframes().iter().map(|keyframe| keyframe.position);
            self.selected = pick_nearest_sphere(&ray, centers, self.radius).map(|(index, _)| index);
            debug!(selected = ?self.selected, "keyframe selection");
            return Ok(None);
        }

        let Some(index) = self.selected else {
            return Ok(None);
        };
        if !input.mouse_down {
            return Ok(None);
        }

        let Some(keyframe) = track.keyframes().get(index) else {
            self.selected = None;
            return Ok(None);
        };
        let Some(hit) = ray_intersect_plane(&ray, camera.forward, keyframe.position) else {
            return Ok(None);
        };

        track.set_position(index, hit.point)?;
        Ok(Some(hit.point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spline::Keyframe;
    use glam::Vec2;

    fn camera() -> Camera {
        Camera::new()
            .at(Vec3::new(0.0, -5.0, 0.0))
            .looking_at(Vec3::ZERO)
            .with_aspect(1.0)
    }

    fn track() -> KeyframeTrack {
        KeyframeTrack::new(vec![
            Keyframe::new(Vec3::new(-1.0, 0.0, 0.0), 0.0),
            Keyframe::new(Vec3::new(0.0, 2.0, 0.0), 1.0),
            Keyframe::new(Vec3::new(0.0, 0.0, 0.0), 2.0),
            Keyframe::new(Vec3::new(1.0, 0.0, 0.0), 3.0),
        ])
        .unwrap()
    }

    fn click(cursor_ndc: Vec2) -> PickInput {
        PickInput {
            cursor_ndc,
            mouse_pressed: true,
            mouse_down: true,
            shift: true,
        }
    }

    fn drag(cursor_ndc: Vec2) -> PickInput {
        PickInput {
            mouse_pressed: false,
            ..click(cursor_ndc)
        }
    }

    #[test]
    fn click_selects_the_nearest_keyframe() {
        let mut editor = KeyframeEditor::new(0.1);
        let mut track = track();

        // Keyframes 1 and 2 are both on the centre ray; 2 is closer.
        editor.update(&click(Vec2::ZERO), &camera(), &mut track).unwrap();
        assert_eq!(editor.selected(), Some(2));
    }

    #[test]
    fn click_on_empty_space_clears_selection() {
        let mut editor = KeyframeEditor::new(0.1);
        let mut track = track();
        editor.update(&click(Vec2::ZERO), &camera(), &mut track).unwrap();
        editor
            .update(&click(Vec2::new(0.9, 0.9)), &camera(), &mut track)
            .unwrap();
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn drag_moves_keyframe_in_camera_plane() {
        let mut editor = KeyframeEditor::new(0.1);
        let mut track = track();
        let camera = camera();
        editor.update(&click(Vec2::ZERO), &camera, &mut track).unwrap();

        let moved = editor
            .update(&drag(Vec2::new(0.2, 0.1)), &camera, &mut track)
            .unwrap()
            .unwrap();
        let keyframe = track.keyframes()[2];
        assert_eq!(keyframe.position, moved);
        assert_eq!(keyframe.time, 2.0);
        assert!(keyframe.position.y.abs() < 1e-4);
        assert!(keyframe.position.x > 0.0);
        assert!(keyframe.position.z > 0.0);
    }

    #[test]
    fn nothing_happens_without_shift() {
        let mut editor = KeyframeEditor::new(0.1);
        let mut track = track();
        let before = track.clone();
        let input = PickInput {
            shift: false,
            ..click(Vec2::ZERO)
        };
        editor.update(&input, &camera(), &mut track).unwrap();
        assert_eq!(editor.selected(), None);
        assert_eq!(track, before);
    }
}
