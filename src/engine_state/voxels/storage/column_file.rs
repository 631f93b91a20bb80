//! # Column File Format
//!
//! A column file is a named tag tree, optionally gzip-compressed. The fields are
//! looked up by name inside the `Level` compound, or in the root compound when the
//! file has no `Level` wrapper:
//!
//! | Field        | Tag          | Length |
//! |--------------|--------------|--------|
//! | `xPos`       | int          |        |
//! | `zPos`       | int          |        |
//! | `Blocks`     | byte array   | 32768  |
//! | `SkyLight`   | byte array   | 16384  |
//! | `BlockLight` | byte array   | 16384  |
//!
//! Anything else in the file is ignored.

use std::{
    collections::HashMap,
    fs,
    io::{Read, Write},
    path::Path,
};

use fastnbt::{ByteArray, Value};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use crate::engine_state::error::ColumnLoadError;
use crate::engine_state::voxels::column::{ChunkCoord, ColumnData, LightChannel, NibbleArray, COLUMN_VOLUME};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Reads and decodes the column file at `path`.
///
/// # Errors
/// Any [`ColumnLoadError`]; the file is never partially applied.
pub fn read_column(path: &Path, requested: ChunkCoord) -> Result<ColumnData, ColumnLoadError> {
    let bytes = fs::read(path).map_err(|source| ColumnLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_column(path, &bytes, requested)
}

/// Decodes the bytes of a column file.
///
/// # Arguments
/// * `path` - Only used in error messages
/// * `bytes` - File contents, gzip-compressed or raw
/// * `requested` - The coordinate the file was loaded for; `xPos`/`zPos` must match
pub fn decode_column(path: &Path, bytes: &[u8], requested: ChunkCoord) -> Result<ColumnData, ColumnLoadError> {
    let inflated;
    let raw = if bytes.starts_with(&GZIP_MAGIC) {
        let mut buffer = Vec::with_capacity(bytes.len() * 4);
        GzDecoder::new(bytes)
            .read_to_end(&mut buffer)
            .map_err(|source| ColumnLoadError::Decompress {
                path: path.to_path_buf(),
                source,
            })?;
        inflated = buffer;
        inflated.as_slice()
    } else {
        bytes
    };

    let root: Value = fastnbt::from_bytes(raw).map_err(|source| ColumnLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let Value::Compound(root) = root else {
        return Err(ColumnLoadError::WrongType {
            field: "root",
            expected: "compound",
        });
    };

    let level = match root.get("Level") {
        Some(Value::Compound(level)) => level,
        Some(_) => {
            return Err(ColumnLoadError::WrongType {
                field: "Level",
                expected: "compound",
            })
        }
        None => &root,
    };

    let found = ChunkCoord::new(int_field(level, "xPos")?, int_field(level, "zPos")?);
    if found != requested {
        return Err(ColumnLoadError::CoordinateMismatch { requested, found });
    }

    let blocks = byte_array_field(level, "Blocks", COLUMN_VOLUME)?;
    let sky_light = byte_array_field(level, "SkyLight", COLUMN_VOLUME / 2)?;
    let block_light = byte_array_field(level, "BlockLight", COLUMN_VOLUME / 2)?;

    ColumnData::from_parts(
        found,
        blocks,
        NibbleArray::from_packed(sky_light),
        NibbleArray::from_packed(block_light),
    )
}

/// Encodes a column in the file format, gzip-compressed.
///
/// Used to write fixture worlds; the runtime itself never writes columns back.
///
/// # Errors
/// Propagates tag encoder and compressor failures as [`std::io::Error`].
pub fn encode_column(column: &ColumnData) -> std::io::Result<Vec<u8>> {
    let coord = column.coord();
    let level = HashMap::from([
        ("xPos".to_owned(), Value::Int(coord.x)),
        ("zPos".to_owned(), Value::Int(coord.z)),
        ("Blocks".to_owned(), byte_array(column.blocks())),
        ("SkyLight".to_owned(), byte_array(column.light(LightChannel::Sky).as_bytes())),
        ("BlockLight".to_owned(), byte_array(column.light(LightChannel::Block).as_bytes())),
    ]);
    let root = Value::Compound(HashMap::from([("Level".to_owned(), Value::Compound(level))]));

    let raw = fastnbt::to_bytes(&root).map_err(std::io::Error::other)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    encoder.finish()
}

fn byte_array(bytes: &[u8]) -> Value {
    Value::ByteArray(ByteArray::new(bytemuck::cast_slice::<u8, i8>(bytes).to_vec()))
}

fn int_field(level: &HashMap<String, Value>, field: &'static str) -> Result<i32, ColumnLoadError> {
    match level.get(field) {
        Some(Value::Int(value)) => Ok(*value),
        Some(_) => Err(ColumnLoadError::WrongType { field, expected: "int" }),
        None => Err(ColumnLoadError::MissingField { field }),
    }
}

fn byte_array_field(
    level: &HashMap<String, Value>,
    field: &'static str,
    expected: usize,
) -> Result<Vec<u8>, ColumnLoadError> {
    match level.get(field) {
        Some(Value::ByteArray(array)) if array.len() == expected => {
            Ok(bytemuck::cast_slice::<i8, u8>(array).to_vec())
        }
        Some(Value::ByteArray(array)) => Err(ColumnLoadError::WrongLength {
            field,
            expected,
            actual: array.len(),
        }),
        Some(_) => Err(ColumnLoadError::WrongType {
            field,
            expected: "byte array",
        }),
        None => Err(ColumnLoadError::MissingField { field }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_state::voxels::block::AIR;

    fn sample(coord: ChunkCoord) -> ColumnData {
        let mut column = ColumnData::empty(coord);
        column.set_local_block_type(1, 2, 3, 4);
        column.set_local_light(LightChannel::Sky, 1, 3, 3, 15);
        column.set_local_light(LightChannel::Block, 1, 2, 4, 7);
        column
    }

    fn raw_root(entries: Vec<(&str, Value)>) -> Vec<u8> {
        let compound = entries.into_iter().map(|(k, v)| (k.to_owned(), v)).collect();
        fastnbt::to_bytes(&Value::Compound(compound)).unwrap()
    }

    #[test]
    fn compressed_file_decodes_to_the_same_cells() {
        let coord = ChunkCoord::new(-3, 9);
        let bytes = encode_column(&sample(coord)).unwrap();
        assert_eq!(bytes[..2], GZIP_MAGIC);

        let column = decode_column(Path::new("mem"), &bytes, coord).unwrap();
        assert_eq!(column.local_block_type(1, 2, 3), 4);
        assert_eq!(column.local_block_type(0, 0, 0), AIR);
        assert_eq!(column.local_light(LightChannel::Sky, 1, 3, 3), 15);
        assert_eq!(column.local_light(LightChannel::Block, 1, 2, 4), 7);
    }

    #[test]
    fn uncompressed_root_without_level_is_accepted() {
        let coord = ChunkCoord::new(0, 1);
        let bytes = raw_root(vec![
            ("xPos", Value::Int(0)),
            ("zPos", Value::Int(1)),
            ("Blocks", byte_array(&vec![1; COLUMN_VOLUME])),
            ("SkyLight", byte_array(&vec![0xFF; COLUMN_VOLUME / 2])),
            ("BlockLight", byte_array(&vec![0; COLUMN_VOLUME / 2])),
        ]);

        let column = decode_column(Path::new("mem"), &bytes, coord).unwrap();
        assert_eq!(column.local_block_type(15, 127, 15), 1);
        assert_eq!(column.local_light(LightChannel::Sky, 4, 4, 4), 15);
    }

    #[test]
    fn missing_blocks_field_is_reported() {
        let bytes = raw_root(vec![("xPos", Value::Int(0)), ("zPos", Value::Int(0))]);
        let err = decode_column(Path::new("mem"), &bytes, ChunkCoord::new(0, 0)).unwrap_err();
        assert!(matches!(err, ColumnLoadError::MissingField { field: "Blocks" }));
    }

    #[test]
    fn short_light_array_is_reported() {
        let bytes = raw_root(vec![
            ("xPos", Value::Int(0)),
            ("zPos", Value::Int(0)),
            ("Blocks", byte_array(&vec![0; COLUMN_VOLUME])),
            ("SkyLight", byte_array(&[0; 10])),
            ("BlockLight", byte_array(&vec![0; COLUMN_VOLUME / 2])),
        ]);
        let err = decode_column(Path::new("mem"), &bytes, ChunkCoord::new(0, 0)).unwrap_err();
        assert!(matches!(
            err,
            ColumnLoadError::WrongLength { field: "SkyLight", actual: 10, .. }
        ));
    }

    #[test]
    fn wrong_tag_type_is_reported() {
        let bytes = raw_root(vec![("xPos", Value::String("zero".into()))]);
        let err = decode_column(Path::new("mem"), &bytes, ChunkCoord::new(0, 0)).unwrap_err();
        assert!(matches!(err, ColumnLoadError::WrongType { field: "xPos", .. }));
    }

    #[test]
    fn coordinate_mismatch_is_reported() {
        let bytes = encode_column(&sample(ChunkCoord::new(1, 1))).unwrap();
        let err = decode_column(Path::new("mem"), &bytes, ChunkCoord::new(2, 1)).unwrap_err();
        assert!(matches!(err, ColumnLoadError::CoordinateMismatch { .. }));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode_column(Path::new("mem"), b"not a tag tree", ChunkCoord::new(0, 0)).unwrap_err();
        assert!(matches!(err, ColumnLoadError::Decode { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_column(Path::new("no/such/c.0.0.dat"), ChunkCoord::new(0, 0)).unwrap_err();
        assert!(matches!(err, ColumnLoadError::Io { .. }));
    }
}
