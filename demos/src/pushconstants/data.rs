
use ash::vk;

use vkbase::{OrbitCamera, Mat4F, Vec4F, vkuint};

use std::mem;

pub const LIGHT_COUNT: usize = 6;

const LIGHT_ORBIT_RADIUS: f32 = 7.5;
const LIGHT_HEIGHT: f32 = -4.0;

/// The light positions pushed to the vertex shader, `w` holds the light radius.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightPushConstants {
    pub lights: [[f32; 4]; LIGHT_COUNT],
}

impl LightPushConstants {

    pub const SIZE: usize = mem::size_of::<LightPushConstants>();

    /// The positions of the lights at `timer`, the position in the animation cycle in `[0, 1)`.
    pub fn orbit(timer: f32) -> LightPushConstants {

        let (sin_t, cos_t) = (timer * 360.0).to_radians().sin_cos();
        let r = LIGHT_ORBIT_RADIUS;
        let y = LIGHT_HEIGHT;

        LightPushConstants {
            lights: [
                [ r * 1.1 * sin_t, y,  r * 1.1 * cos_t, 1.0],
                [-r * sin_t,       y, -r * cos_t,       1.0],
                [ r * 0.85 * sin_t, y, -2.5 * sin_t,    1.5],
                [ 0.0,             y,  r * 1.25 * cos_t, 1.5],
                [ r * 2.25 * cos_t, y, 0.0,             1.25],
                [ r * 2.5 * cos_t,  y, r * 2.5 * sin_t, 1.25],
            ],
        }
    }

    /// Vector `i` starts at byte `i * 16`, its components follow in xyzw order.
    pub fn to_bytes(&self) -> [u8; LightPushConstants::SIZE] {

        let mut bytes = [0_u8; LightPushConstants::SIZE];

        for (i, light) in self.lights.iter().enumerate() {
            for (c, component) in light.iter().enumerate() {
                let start = i * 16 + c * 4;
                bytes[start..start + 4].copy_from_slice(&component.to_ne_bytes());
            }
        }

        bytes
    }

    /// The push constant range of the light block: vertex stage, starting at offset 0.
    pub fn range() -> vk::PushConstantRange {

        vk::PushConstantRange {
            stage_flags: vk::ShaderStageFlags::VERTEX,
            offset: 0,
            size  : LightPushConstants::SIZE as vkuint,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct UboVS {
    pub projection: Mat4F,
    pub model     : Mat4F,
    pub light_pos : Vec4F,
}

impl UboVS {

    pub fn new(camera: &OrbitCamera) -> UboVS {
        UboVS {
            projection: camera.projection(),
            model     : camera.view(),
            light_pos : Vec4F::new(0.0, 0.0, -2.0, 1.0),
        }
    }

    pub fn update(&mut self, camera: &OrbitCamera) {
        self.projection = camera.projection();
        self.model = camera.view();
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use vkbase::ci::pipeline::check_push_constant_limit;
    use vkbase::vkbytes;
    use vkbase::upload::UploadChannel;

    fn test_camera() -> OrbitCamera {
        OrbitCamera::new()
            .zoom(-30.0)
            .rotation(-32.5, 45.0, 0.0)
            .perspective(60.0, 0.001, 256.0)
            .screen_aspect_ratio(1280.0 / 720.0)
            .build()
    }

    #[test]
    fn light_block_is_six_packed_vec4() {

        assert_eq!(LightPushConstants::SIZE, 96);
        assert_eq!(LightPushConstants::range().size, 96);
        assert_eq!(LightPushConstants::range().offset, 0);
        assert_eq!(memoffset::offset_of!(LightPushConstants, lights), 0);
    }

    #[test]
    fn uniform_block_layout() {

        assert_eq!(memoffset::offset_of!(UboVS, projection), 0);
        assert_eq!(memoffset::offset_of!(UboVS, model), 64);
        assert_eq!(memoffset::offset_of!(UboVS, light_pos), 128);
        assert_eq!(mem::size_of::<UboVS>(), 144);
        assert_eq!(UboVS::new(&test_camera()).light_pos, Vec4F::new(0.0, 0.0, -2.0, 1.0));
    }

    #[test]
    fn lights_stay_on_their_orbits() {

        let r = LIGHT_ORBIT_RADIUS;

        for step in 0..16 {
            let timer = step as f32 / 16.0;
            let block = LightPushConstants::orbit(timer);

            let radius_of = |i: usize| (block.lights[i][0].powi(2) + block.lights[i][2].powi(2)).sqrt();
            assert!((radius_of(0) - r * 1.1).abs() < 1e-4);
            assert!((radius_of(1) - r).abs() < 1e-4);
            assert!((radius_of(5) - r * 2.5).abs() < 1e-4);

            for light in block.lights.iter() {
                assert_eq!(light[1], LIGHT_HEIGHT);
            }
        }
    }

    #[test]
    fn orbit_starts_on_the_z_axis() {

        let block = LightPushConstants::orbit(0.0);

        assert_eq!(block.lights[0], [0.0, -4.0, 8.25, 1.0]);
        assert_eq!(block.lights[3], [0.0, -4.0, 9.375, 1.5]);
        assert_eq!(block.lights[4], [16.875, -4.0, 0.0, 1.25]);

        // a quarter turn moves the first light onto the x axis.
        let quarter = LightPushConstants::orbit(0.25);
        assert!((quarter.lights[0][0] - 8.25).abs() < 1e-4);
        assert!(quarter.lights[0][2].abs() < 1e-4);
    }

    #[test]
    fn payload_is_deterministic() {

        let first = LightPushConstants::orbit(0.3).to_bytes();
        let second = LightPushConstants::orbit(0.3).to_bytes();

        assert_eq!(first[..], second[..]);
        assert_ne!(first[..], LightPushConstants::orbit(0.31).to_bytes()[..]);
    }

    #[test]
    fn payload_byte_layout() {

        let block = LightPushConstants::orbit(0.6);
        let bytes = block.to_bytes();

        for i in 0..LIGHT_COUNT {
            for c in 0..4 {
                let start = i * 16 + c * 4;
                let mut raw = [0_u8; 4];
                raw.copy_from_slice(&bytes[start..start + 4]);
                assert_eq!(f32::from_ne_bytes(raw), block.lights[i][c]);
            }
        }

        // identical to the in-memory representation of the repr(C) block.
        assert_eq!(&bytes[..], vkbase::utils::cast::bytes_of(&block));
    }

    #[test]
    fn resize_does_not_touch_the_payload() {

        let mut camera = test_camera();
        let mut ubo = UboVS::new(&camera);
        let before = LightPushConstants::orbit(0.42).to_bytes();

        camera.resize(640, 960);
        let old_projection = ubo.projection;
        ubo.update(&camera);

        assert_ne!(ubo.projection, old_projection);
        assert_eq!(before[..], LightPushConstants::orbit(0.42).to_bytes()[..]);
    }

    #[test]
    fn block_fits_the_guaranteed_limit_only() {

        let mut limits = vk::PhysicalDeviceLimits::default();

        // 128 bytes is the minimum every implementation provides.
        limits.max_push_constants_size = 128;
        assert_eq!(UploadChannel::select(LightPushConstants::SIZE as vkuint, &limits), UploadChannel::PushConstant);
        assert!(check_push_constant_limit(LightPushConstants::SIZE as vkbytes, 128).is_ok());

        limits.max_push_constants_size = 64;
        assert_eq!(UploadChannel::select(LightPushConstants::SIZE as vkuint, &limits), UploadChannel::UniformBuffer);
        assert!(check_push_constant_limit(LightPushConstants::SIZE as vkbytes, 64).is_err());
    }
}
