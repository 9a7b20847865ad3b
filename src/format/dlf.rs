//! `levelN.dlf`: editor metadata, interactive objects, fogs, paths and zones.

use bitflags::bitflags;

use crate::error::Result;
use crate::format::writer::BinaryWriter;
use crate::types::level::{DlfHeader, DlfRecord, Fog, InteractiveObject, Path, PathPoint, Zone};

pub const DLF_VERSION: f32 = 1.44;
pub const IDENTIFIER: &str = "DANAE_FILE";
pub const HEADER_SIZE: usize = 8520;
pub const SCENE_SIZE: usize = 640;
pub const INTERACTIVE_OBJECT_SIZE: usize = 664;
pub const FOG_SIZE: usize = 592;
pub const PATH_SIZE: usize = 612;
pub const PATHWAY_SIZE: usize = 68;

const IDENT_LEN: usize = 16;
const LAST_USER_LEN: usize = 256;
const SCENE_NAME_LEN: usize = 512;
const OBJECT_NAME_LEN: usize = 512;
const PATH_NAME_LEN: usize = 64;
const AMBIENCE_LEN: usize = 128;
const NODE_LINKS: i32 = 12;

bitflags! {
    /// Overrides a zone applies while the player stands in it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ZoneFlags: i16 {
        const AMBIENCE = 1 << 1;
        const RGB = 1 << 2;
        const FAR_CLIP = 1 << 3;
        const AMBIENCE_MAX_VOLUME = 1 << 5;
    }
}

impl ZoneFlags {
    pub fn for_zone(zone: &Zone) -> Self {
        let mut flags = ZoneFlags::empty();
        flags.set(ZoneFlags::AMBIENCE, zone.ambience.is_some());
        flags.set(ZoneFlags::RGB, zone.background_color.is_some());
        flags.set(ZoneFlags::FAR_CLIP, zone.draw_distance.is_some());
        flags.set(
            ZoneFlags::AMBIENCE_MAX_VOLUME,
            zone.ambience_max_volume.is_some(),
        );
        flags
    }
}

/// Scene directory stored as the level's only scene entry.
pub fn scene_name(level_idx: u32) -> String {
    format!("Graph\\Levels\\Level{level_idx}\\")
}

pub fn encode(record: &DlfRecord) -> Result<Vec<u8>> {
    let mut w = BinaryWriter::with_capacity(
        HEADER_SIZE
            + SCENE_SIZE
            + record.interactive_objects.len() * INTERACTIVE_OBJECT_SIZE
            + record.fogs.len() * FOG_SIZE
            + (record.paths.len() + record.zones.len()) * PATH_SIZE,
    );

    write_header(&mut w, record)?;

    w.write_fixed_str(&scene_name(record.level_idx), SCENE_NAME_LEN)?;
    w.write_zeros(16 * 4 + 16 * 4);

    for object in &record.interactive_objects {
        write_interactive_object(&mut w, object)?;
    }
    for fog in &record.fogs {
        write_fog(&mut w, fog);
    }
    for path in &record.paths {
        write_path(&mut w, path)?;
    }
    for zone in &record.zones {
        write_zone(&mut w, zone)?;
    }

    Ok(w.into_bytes())
}

fn write_header(w: &mut BinaryWriter, record: &DlfRecord) -> Result<()> {
    let DlfHeader {
        last_user,
        time,
        pos_edit,
        angle_edit,
        number_of_background_polygons,
    } = &record.header;

    w.write_f32(DLF_VERSION);
    w.write_fixed_str(IDENTIFIER, IDENT_LEN)?;
    w.write_fixed_str(last_user, LAST_USER_LEN)?;
    w.write_i32(*time);
    w.write_vec3(*pos_edit);
    w.write_angle(*angle_edit);

    w.write_i32(1); // scenes
    w.write_count("interactive object", record.interactive_objects.len())?;
    w.write_i32(0); // nodes
    w.write_i32(NODE_LINKS);
    w.write_i32(0); // zones are stored with the paths
    w.write_i32(0); // lighting
    w.write_zeros(256 * 4);

    w.write_i32(0); // lights
    w.write_count("fog", record.fogs.len())?;
    w.write_count("background polygon", *number_of_background_polygons as usize)?;
    w.write_i32(0); // ignored polygons
    w.write_i32(0); // child polygons
    w.write_count("path", record.paths.len() + record.zones.len())?;
    w.write_zeros(250 * 4);

    w.write_vec3(glam::Vec3::ZERO);
    w.write_zeros(253 * 4 + 4096 + 256 * 4);
    Ok(())
}

fn write_interactive_object(w: &mut BinaryWriter, object: &InteractiveObject) -> Result<()> {
    w.write_fixed_str(&object.name, OBJECT_NAME_LEN)?;
    w.write_vec3(object.position);
    w.write_angle(object.orientation);
    w.write_i32(object.identifier);
    w.write_i32(object.flags);
    w.write_zeros(14 * 4 + 16 * 4);
    Ok(())
}

fn write_fog(w: &mut BinaryWriter, fog: &Fog) {
    w.write_vec3(fog.position);
    w.write_vec3(fog.color);
    w.write_f32(fog.size);
    w.write_i32(fog.special);
    w.write_f32(fog.scale);
    w.write_vec3(fog.direction);
    w.write_angle(fog.orientation);
    w.write_f32(fog.speed);
    w.write_f32(fog.rotate_speed);
    w.write_i32(fog.to_live);
    w.write_i32(fog.blend);
    w.write_f32(fog.frequency);
    w.write_zeros(32 * 4 + 32 * 4 + 256);
}

/// Fields shared by path and zone records.
struct PathHeader<'a> {
    name: &'a str,
    flags: ZoneFlags,
    position: glam::Vec3,
    points: &'a [PathPoint],
    color: glam::Vec3,
    far_clip: f32,
    ambience_max_volume: f32,
    height: i32,
    ambience: &'a str,
}

fn write_path(w: &mut BinaryWriter, path: &Path) -> Result<()> {
    write_path_record(
        w,
        &PathHeader {
            name: &path.name,
            flags: ZoneFlags::empty(),
            position: path.position,
            points: &path.points,
            color: glam::Vec3::ZERO,
            far_clip: 0.0,
            ambience_max_volume: 0.0,
            height: 0,
            ambience: "",
        },
    )
}

fn write_zone(w: &mut BinaryWriter, zone: &Zone) -> Result<()> {
    write_path_record(
        w,
        &PathHeader {
            name: &zone.name,
            flags: ZoneFlags::for_zone(zone),
            position: zone.position,
            points: &zone.points,
            color: zone.background_color.unwrap_or_default(),
            far_clip: zone.draw_distance.unwrap_or_default(),
            ambience_max_volume: zone.ambience_max_volume.unwrap_or_default(),
            height: zone.height,
            ambience: zone.ambience.as_deref().unwrap_or_default(),
        },
    )
}

fn write_path_record(w: &mut BinaryWriter, path: &PathHeader<'_>) -> Result<()> {
    w.write_fixed_str(path.name, PATH_NAME_LEN)?;
    w.write_i16(0); // idx
    w.write_i16(path.flags.bits());
    w.write_vec3(path.position);
    w.write_vec3(path.position);
    w.write_count("pathway", path.points.len())?;
    w.write_vec3(path.color);
    w.write_f32(path.far_clip);
    w.write_f32(0.0); // reverb
    w.write_f32(path.ambience_max_volume);
    w.write_zeros(26 * 4);
    w.write_i32(path.height);
    w.write_zeros(32 * 4);
    w.write_fixed_str(path.ambience, AMBIENCE_LEN)?;
    w.write_zeros(128);

    for point in path.points {
        w.write_vec3(point.position);
        w.write_i32(point.flag);
        w.write_u32(point.time);
        w.write_zeros(2 * 4 + 2 * 4 + 32);
    }
    Ok(())
}
