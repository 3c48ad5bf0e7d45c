// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Test frames for the simulated camera
//!
//! Reads every PNG in a directory (sorted by file name), resizes it to the
//! sensor window and returns the raw RGB888 bytes.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::imageops::FilterType;
use tracing::{debug, info};

/// PNG files in `dir`, sorted by name
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read frame directory: {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect();
    paths.sort();
    Ok(paths)
}

/// Decode one image as `width`x`height` RGB888
pub fn load_frame(path: &Path, width: u32, height: u32) -> Result<Vec<u8>> {
    let img = image::open(path)
        .with_context(|| format!("Failed to decode frame: {}", path.display()))?;
    let img = if (img.width(), img.height()) == (width, height) {
        img
    } else {
        debug!(
            target: "nimbus-node",
            "resizing {} from {}x{} to {}x{}",
            path.display(),
            img.width(),
            img.height(),
            width,
            height
        );
        img.resize_exact(width, height, FilterType::Triangle)
    };
    Ok(img.to_rgb8().into_raw())
}

/// Every PNG in `dir` as `width`x`height` RGB888 frames
pub fn load_frames(dir: &Path, width: u32, height: u32) -> Result<Vec<Vec<u8>>> {
    let paths = list_frames(dir)?;
    anyhow::ensure!(!paths.is_empty(), "No PNG frames in {}", dir.display());

    let frames = paths
        .iter()
        .map(|path| load_frame(path, width, height))
        .collect::<Result<Vec<_>>>()?;
    info!(
        target: "nimbus-node",
        "loaded {} frames from {} at {}x{}",
        frames.len(),
        dir.display(),
        width,
        height
    );
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_load_frames_resizes_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        RgbImage::from_pixel(8, 8, Rgb([255, 0, 0]))
            .save(dir.path().join("b.png"))
            .unwrap();
        RgbImage::from_pixel(4, 4, Rgb([0, 0, 255]))
            .save(dir.path().join("a.png"))
            .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let frames = load_frames(dir.path(), 4, 4).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].len(), 4 * 4 * 3);
        assert_eq!(&frames[0][..3], &[0, 0, 255]);
        assert_eq!(&frames[1][..3], &[255, 0, 0]);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_frames(dir.path(), 4, 4).is_err());
    }
}
