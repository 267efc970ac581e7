// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for media, box batches and settings files.

pub mod media;
pub mod npz;
pub mod remote;
pub mod serialization;
