//! `levelN.llf`: lights and baked per-vertex colours. Compressed as a whole.

use crate::error::Result;
use crate::format::writer::BinaryWriter;
use crate::types::level::{Color, Light, LlfRecord};

pub const LLF_VERSION: f32 = 1.44;
pub const IDENTIFIER: &str = "DANAE_FILE";
pub const HEADER_SIZE: usize = 7464;
pub const LIGHT_SIZE: usize = 296;
pub const LIGHTING_HEADER_SIZE: usize = 16;
pub const COLOR_SIZE: usize = 4;

const IDENT_LEN: usize = 16;
const LAST_USER_LEN: usize = 256;

pub fn encode(record: &LlfRecord) -> Result<Vec<u8>> {
    let mut w = BinaryWriter::with_capacity(
        HEADER_SIZE
            + record.lights.len() * LIGHT_SIZE
            + LIGHTING_HEADER_SIZE
            + record.colors.len() * COLOR_SIZE,
    );

    w.write_f32(LLF_VERSION);
    w.write_fixed_str(IDENTIFIER, IDENT_LEN)?;
    w.write_fixed_str(&record.header.last_user, LAST_USER_LEN)?;
    w.write_i32(record.header.time);
    w.write_count("light", record.lights.len())?;
    w.write_i32(0); // shadow polygons
    w.write_i32(0); // ignored polygons
    w.write_count(
        "background polygon",
        record.header.number_of_background_polygons as usize,
    )?;
    w.write_zeros(256 * 4 + 256 * 4 + 4096 + 256 * 4);

    for light in &record.lights {
        write_light(&mut w, light);
    }

    w.write_count("vertex colour", record.colors.len())?;
    w.write_i32(0); // view mode
    w.write_i32(0); // light mode
    w.write_i32(0);
    for color in &record.colors {
        write_color(&mut w, color);
    }

    Ok(w.into_bytes())
}

fn write_light(w: &mut BinaryWriter, light: &Light) {
    w.write_vec3(light.position);
    w.write_vec3(light.color);
    w.write_f32(light.fall_start);
    w.write_f32(light.fall_end);
    w.write_f32(light.intensity);
    w.write_f32(0.0);
    // flicker colour, radius, frequency, size, speed, flare size
    w.write_zeros(3 * 4 + 5 * 4);
    w.write_zeros(24 * 4);
    w.write_i32(light.flags);
    w.write_zeros(31 * 4);
}

/// Colours are stored as little-endian ARGB words, i.e. B, G, R, A bytes.
fn write_color(w: &mut BinaryWriter, color: &Color) {
    w.write_u8(color.b);
    w.write_u8(color.g);
    w.write_u8(color.r);
    w.write_u8(color.a);
}
