
use crate::input::EventController;
use crate::{Vec3F, Mat4F};

/// Degrees of rotation per pixel of cursor drag, before the rotation speed is applied.
const DRAG_ROTATE_FACTOR: f32 = 1.25;
/// Zoom per pixel of vertical right drag, before the zoom speed is applied.
const DRAG_ZOOM_FACTOR: f32 = 0.005;
/// Pan per pixel of middle drag.
const DRAG_PAN_FACTOR: f32 = 0.01;


/// A camera looking at the origin from a distance of `zoom`, rotated around it.
///
/// The projection maps depth to `[0, 1]` and keeps +Y of clip space pointing down as Vulkan does,
/// so scenes are expected with their Y axis mirrored (see `model::MeshData`).
#[derive(Debug, Clone)]
pub struct OrbitCamera {

    /// Distance along Z, negative values move the scene away.
    pub zoom: f32,
    /// Rotation around X, Y and Z in degrees.
    pub rotation: Vec3F,
    /// Translation of the scene in front of the camera.
    pub position: Vec3F,

    pub rotation_speed: f32,
    pub zoom_speed: f32,

    fov : f32,
    near: f32,
    far : f32,
    screen_aspect: f32,
}

impl OrbitCamera {

    pub fn new() -> OrbitCameraBuilder {
        OrbitCameraBuilder::default()
    }

    /// Perspective projection with a `[0, 1]` depth range.
    pub fn projection(&self) -> Mat4F {
        perspective_rh_zo(self.fov.to_radians(), self.screen_aspect, self.near, self.far)
    }

    pub fn view(&self) -> Mat4F {

        let translation = Mat4F::new_translation(&Vec3F::new(0.0, 2.0, self.zoom))
            * Mat4F::new_translation(&self.position);

        translation
            * Mat4F::from_axis_angle(&Vec3F::x_axis(), self.rotation.x.to_radians())
            * Mat4F::from_axis_angle(&Vec3F::y_axis(), self.rotation.y.to_radians())
            * Mat4F::from_axis_angle(&Vec3F::z_axis(), self.rotation.z.to_radians())
    }

    /// Only the aspect ratio follows the window, the view stays untouched.
    pub fn resize(&mut self, width: u32, height: u32) {

        if width > 0 && height > 0 {
            self.screen_aspect = (width as f32) / (height as f32);
        }
    }

    /// Apply the cursor input of the last frame, return whether the view changed.
    pub fn receive_input(&mut self, inputer: &EventController) -> bool {

        if inputer.is_cursor_active() == false {
            return false
        }

        let cursor = &inputer.cursor;
        // the drag is measured from the new cursor position to the old one.
        let (motion_x, motion_y) = cursor.get_cursor_motion();
        let (drag_x, drag_y) = (-motion_x, -motion_y);

        let mut is_changed = false;

        if cursor.scroll != 0.0 {
            self.zoom += cursor.scroll * self.zoom_speed;
            is_changed = true;
        }

        if drag_x == 0.0 && drag_y == 0.0 {
            return is_changed
        }

        if cursor.right {
            self.zoom += drag_y * DRAG_ZOOM_FACTOR * self.zoom_speed;
            is_changed = true;
        }

        if cursor.left {
            self.rotate(Vec3F::new(drag_y, -drag_x, 0.0) * DRAG_ROTATE_FACTOR * self.rotation_speed);
            is_changed = true;
        }

        if cursor.middle {
            self.position -= Vec3F::new(drag_x, drag_y, 0.0) * DRAG_PAN_FACTOR;
            is_changed = true;
        }

        is_changed
    }

    pub fn rotate(&mut self, delta: Vec3F) {
        self.rotation += delta;
    }
}

/// Right handed perspective projection mapping depth from `near..far` to `0..1`.
pub fn perspective_rh_zo(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4F {

    let focal = 1.0 / (fov_y * 0.5).tan();

    Mat4F::new(
        focal / aspect, 0.0,   0.0,                 0.0,
        0.0,            focal, 0.0,                 0.0,
        0.0,            0.0,   far / (near - far),  (near * far) / (near - far),
        0.0,            0.0,   -1.0,                0.0,
    )
}


pub struct OrbitCameraBuilder {

    zoom: f32,
    rotation: Vec3F,
    rotation_speed: f32,
    zoom_speed: f32,

    fov : f32,
    near: f32,
    far : f32,
    screen_aspect: f32,
}

impl Default for OrbitCameraBuilder {

    fn default() -> OrbitCameraBuilder {
        OrbitCameraBuilder {
            zoom: 0.0,
            rotation: Vec3F::zeros(),
            rotation_speed: 1.0,
            zoom_speed: 1.0,
            fov : 60.0,
            near: 0.1,
            far : 256.0,
            screen_aspect: 1.0,
        }
    }
}

impl OrbitCameraBuilder {

    pub fn build(self) -> OrbitCamera {

        OrbitCamera {
            zoom: self.zoom,
            rotation: self.rotation,
            position: Vec3F::zeros(),
            rotation_speed: self.rotation_speed,
            zoom_speed: self.zoom_speed,
            fov : self.fov,
            near: self.near,
            far : self.far,
            screen_aspect: self.screen_aspect,
        }
    }

    pub fn zoom(mut self, zoom: f32) -> OrbitCameraBuilder {
        self.zoom = zoom; self
    }

    /// Initial rotation in degrees.
    pub fn rotation(mut self, x: f32, y: f32, z: f32) -> OrbitCameraBuilder {
        self.rotation = Vec3F::new(x, y, z); self
    }

    pub fn rotation_speed(mut self, speed: f32) -> OrbitCameraBuilder {
        self.rotation_speed = speed; self
    }

    pub fn zoom_speed(mut self, speed: f32) -> OrbitCameraBuilder {
        self.zoom_speed = speed; self
    }

    /// Vertical field of view in degrees.
    pub fn perspective(mut self, fov: f32, near: f32, far: f32) -> OrbitCameraBuilder {
        self.fov  = num::clamp(fov, 1.0, 179.0);
        self.near = near;
        self.far  = far; self
    }

    pub fn screen_aspect_ratio(mut self, ratio: f32) -> OrbitCameraBuilder {
        self.screen_aspect = ratio; self
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::Vec4F;

    fn example_camera() -> OrbitCamera {
        OrbitCamera::new()
            .zoom(-30.0)
            .rotation(-32.5, 45.0, 0.0)
            .perspective(60.0, 0.001, 256.0)
            .screen_aspect_ratio(1280.0 / 720.0)
            .build()
    }

    #[test]
    fn depth_maps_to_unit_range() {

        let camera = example_camera();
        let projection = camera.projection();

        let project = |z: f32| {
            let clip = projection * Vec4F::new(0.0, 0.0, z, 1.0);
            clip.z / clip.w
        };

        assert!(project(-0.001).abs() < 1e-4);
        assert!((project(-256.0) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn resize_only_touches_projection() {

        let mut camera = example_camera();
        let view = camera.view();
        let projection = camera.projection();

        camera.resize(800, 800);

        assert_eq!(camera.view(), view);
        assert_ne!(camera.projection(), projection);
        assert!((camera.projection()[(0, 0)] - camera.projection()[(1, 1)]).abs() < 1e-6);

        // a minimized window keeps the last aspect.
        let square = camera.projection();
        camera.resize(0, 0);
        assert_eq!(camera.projection(), square);
    }

    #[test]
    fn view_places_origin_at_zoom_distance() {

        let camera = example_camera();
        let origin = camera.view() * Vec4F::new(0.0, 0.0, 0.0, 1.0);

        assert!((origin.x - 0.0).abs() < 1e-6);
        assert!((origin.y - 2.0).abs() < 1e-6);
        assert!((origin.z + 30.0).abs() < 1e-6);
    }
}
