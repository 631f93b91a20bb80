//! Vertex attribute formats for compiled section meshes.
//!
//! Meshes keep positions, colours and texture coordinates in separate buffers. Colours
//! are stored as one packed RGBA8 word per vertex, the layout a `Unorm8x4` vertex
//! attribute expects.

use crate::engine_state::voxels::column::MAX_LIGHT;

/// Position of a vertex in world space.
pub type Position = [f32; 3];

/// Texture atlas coordinates of a vertex.
pub type TexCoord = [f32; 2];

/// Brightness in `[0, 1]` for a light level in `[0, 15]`.
///
/// Levels above 15 are clamped.
pub fn light_brightness(level: u8) -> f32 {
    f32::from(level.min(MAX_LIGHT)) / f32::from(MAX_LIGHT)
}

/// Packs a light level into an opaque grey RGBA8 colour.
///
/// # Returns
/// The colour as a little-endian `u32`: red in the lowest byte, alpha in the highest.
pub fn pack_light_color(level: u8) -> u32 {
    let channel = (light_brightness(level) * 255.0).round() as u8;
    u32::from_le_bytes([channel, channel, channel, u8::MAX])
}

/// Splits a packed colour back into its RGBA bytes.
pub fn unpack_color(color: u32) -> [u8; 4] {
    color.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_light_is_white() {
        assert_eq!(unpack_color(pack_light_color(15)), [255, 255, 255, 255]);
    }

    #[test]
    fn darkness_is_opaque_black() {
        assert_eq!(unpack_color(pack_light_color(0)), [0, 0, 0, 255]);
    }

    #[test]
    fn brightness_is_linear_in_level() {
        assert_eq!(light_brightness(5), 5.0 / 15.0);
        assert_eq!(light_brightness(40), 1.0);
    }
}
