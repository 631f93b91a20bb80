//! # Column Storage
//!
//! Where column files live and how they are decoded.
//!
//! ## Path Scheme
//!
//! Each column is a separate file, bucketed into two directory levels by its
//! coordinates modulo 64:
//!
//! ```text
//! <root>/<base36(x mod 64)>/<base36(z mod 64)>/c.<base36(x)>.<base36(z)>.dat
//! ```
//!
//! The modulo is Euclidean, so bucket directories are never negative. File names use
//! signed lowercase base 36, e.g. column `(-13, 44)` lives in `1f/18/c.-d.18.dat`.

use std::path::{Path, PathBuf};

use super::column::ChunkCoord;

pub mod column_file;

pub use column_file::{decode_column, encode_column, read_column};

/// Number of bucket directories per axis.
pub const BUCKETS_PER_AXIS: i32 = 64;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Formats `value` in signed lowercase base 36.
pub fn to_base36(value: i32) -> String {
    let mut magnitude = value.unsigned_abs();
    if magnitude == 0 {
        return "0".to_owned();
    }

    let mut digits = Vec::with_capacity(8);
    while magnitude > 0 {
        digits.push(DIGITS[(magnitude % 36) as usize]);
        magnitude /= 36;
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.iter().rev().map(|&d| d as char).collect()
}

/// Path of the file holding column `coord` under `root`.
pub fn column_path(root: &Path, coord: ChunkCoord) -> PathBuf {
    root.join(to_base36(coord.x.rem_euclid(BUCKETS_PER_AXIS)))
        .join(to_base36(coord.z.rem_euclid(BUCKETS_PER_AXIS)))
        .join(format!("c.{}.{}.dat", to_base36(coord.x), to_base36(coord.z)))
}
