// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Numeric box batch import from `.npz` archives.
//!
//! An `.npz` file is a zip archive of `.npy` arrays. The batch lives in a
//! single entry holding an `N x 4` matrix; each row becomes one rectangle.

use crate::error::ImportError;
use crate::models::annotation::{round_half_up, Rect};
use npyz::npz::NpzArchive;
use npyz::{DType, NpyFile, Order};
use std::io::{self, Cursor, Read};
use std::path::Path;

/// Read an archive from disk and decode its box batch.
pub fn import_file(path: &Path, entry_name: &str) -> Result<Vec<Rect>, ImportError> {
    let bytes = std::fs::read(path)?;
    decode_npz(&bytes, entry_name)
}

/// Decode the `entry_name` array of an in-memory `.npz` archive into rectangles.
pub fn decode_npz(bytes: &[u8], entry_name: &str) -> Result<Vec<Rect>, ImportError> {
    // Reading from memory, so every io error here is a format error
    let mut archive = NpzArchive::new(Cursor::new(bytes)).map_err(malformed)?;
    let array_name = entry_name.strip_suffix(".npy").unwrap_or(entry_name);
    let npy = archive
        .by_name(array_name)
        .map_err(malformed)?
        .ok_or_else(|| ImportError::MissingEntry(entry_name.to_string()))?;

    let shape: Vec<usize> = npy.shape().iter().map(|&d| d as usize).collect();
    let fortran_order = matches!(npy.order(), Order::Fortran);
    let values = read_values(npy)?;
    rows_of_four(&shape, fortran_order, &values)
}

fn malformed(err: io::Error) -> ImportError {
    ImportError::Npy(err.to_string())
}

fn convert<T>(values: io::Result<Vec<T>>, to_f64: fn(T) -> f64) -> Result<Vec<f64>, ImportError> {
    Ok(values.map_err(malformed)?.into_iter().map(to_f64).collect())
}

/// Read the array data as `f64`, whatever integer or float type it holds.
fn read_values<R: Read>(npy: NpyFile<R>) -> Result<Vec<f64>, ImportError> {
    let descr = match npy.dtype() {
        DType::Plain(type_str) => type_str.to_string(),
        other => return Err(ImportError::Npy(format!("unsupported dtype {:?}", other))),
    };
    match descr.trim_start_matches(['<', '>', '|', '=']) {
        "i1" => convert(npy.into_vec::<i8>(), f64::from),
        "i2" => convert(npy.into_vec::<i16>(), f64::from),
        "i4" => convert(npy.into_vec::<i32>(), f64::from),
        "i8" => convert(npy.into_vec::<i64>(), |v| v as f64),
        "u1" => convert(npy.into_vec::<u8>(), f64::from),
        "u2" => convert(npy.into_vec::<u16>(), f64::from),
        "u4" => convert(npy.into_vec::<u32>(), f64::from),
        "u8" => convert(npy.into_vec::<u64>(), |v| v as f64),
        "f4" => convert(npy.into_vec::<f32>(), f64::from),
        "f8" => convert(npy.into_vec::<f64>(), |v| v),
        _ => Err(ImportError::Npy(format!("unsupported dtype '{}'", descr))),
    }
}

/// Turn an `N x 4` matrix into rectangles, rounding half-up.
fn rows_of_four(shape: &[usize], fortran_order: bool, values: &[f64]) -> Result<Vec<Rect>, ImportError> {
    let rows = match shape {
        [rows, 4] => *rows,
        _ => return Err(ImportError::Shape(shape.to_vec())),
    };
    if values.len() < rows * 4 {
        return Err(ImportError::Npy(format!(
            "expected {} values, found {}",
            rows * 4,
            values.len()
        )));
    }
    let at = |i: usize, j: usize| {
        let idx = if fortran_order { j * rows + i } else { i * 4 + j };
        round_half_up(values[idx])
    };
    Ok((0..rows)
        .map(|i| Rect::from_corners(at(i, 0), at(i, 1), at(i, 2), at(i, 3)))
        .collect())
}
