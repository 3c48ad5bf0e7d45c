// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Feature Dump Decoder

Rebuilds the grayscale feature images a node prints on its serial console
when `diagnostics.dump_features` is on. Each dump block looks like

```text
Start
nimbostratus
7F, 80, 81, ...
Create New File
```

and becomes `<sequence>_<label>.png` in the output directory.

Usage:
  cargo run --bin frame_decoder -- <serial.log> [--output <dir>]

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use image::GrayImage;
use nimbus::node::diagnostics::{DUMP_END, DUMP_START};

/// Decode feature dumps from a captured serial log into PNG files
#[derive(Parser, Debug)]
#[command(name = "frame_decoder", version, long_about = None)]
struct Args {
    /// Captured serial console log
    input: PathBuf,

    /// Directory for the decoded images
    #[arg(short, long, default_value = "decoded_frames")]
    output: PathBuf,
}

/// One `Start` ... `Create New File` block
#[derive(Debug, Clone, PartialEq, Eq)]
struct DumpBlock {
    label: String,
    pixels: Vec<u8>,
}

impl DumpBlock {
    /// Side of the square image, if the pixel count is a perfect square
    fn side(&self) -> Option<u32> {
        let side = (self.pixels.len() as f64).sqrt().round() as usize;
        (side > 0 && side * side == self.pixels.len()).then_some(side as u32)
    }

    fn to_image(&self) -> Result<GrayImage> {
        let Some(side) = self.side() else {
            bail!(
                "dump '{}' has {} values, not a square image",
                self.label,
                self.pixels.len()
            );
        };
        GrayImage::from_raw(side, side, self.pixels.clone())
            .context("pixel buffer does not match image size")
    }
}

/// Every complete dump block in `log`. An unterminated final block is
/// dropped; a `Start` inside a block restarts it.
fn parse_dumps(log: &str) -> Result<Vec<DumpBlock>> {
    let mut blocks = Vec::new();
    let mut current: Option<DumpBlock> = None;

    for (number, line) in log.lines().enumerate() {
        let line = line.trim();
        if line == DUMP_START {
            current = Some(DumpBlock {
                label: String::new(),
                pixels: Vec::new(),
            });
            continue;
        }
        let Some(block) = current.as_mut() else {
            continue;
        };
        if line == DUMP_END {
            blocks.extend(current.take());
        } else if block.label.is_empty() {
            block.label = line.to_string();
        } else {
            for value in line.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                let byte = u8::from_str_radix(value, 16)
                    .with_context(|| format!("line {}: bad hex value '{}'", number + 1, value))?;
                block.pixels.push(byte);
            }
        }
    }
    Ok(blocks)
}

/// Label reduced to characters safe in a file name
fn file_label(label: &str) -> String {
    let cleaned: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "unlabeled".to_string()
    } else {
        cleaned
    }
}

fn write_images(blocks: &[DumpBlock], output: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create {}", output.display()))?;
    blocks
        .iter()
        .enumerate()
        .map(|(seq, block)| {
            let path = output.join(format!("{:04}_{}.png", seq, file_label(&block.label)));
            block
                .to_image()?
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            Ok(path)
        })
        .collect()
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!("🖼  Nimbus Feature Dump Decoder");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:  {}", args.input.display());
    println!("📂 Output: {}", args.output.display());
    println!();

    let log = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let blocks = parse_dumps(&log)?;
    if blocks.is_empty() {
        println!("⚠️  No feature dumps found (is diagnostics.dump_features on?)");
        return Ok(());
    }

    println!("📖 Found {} dumps", blocks.len());
    let written = write_images(&blocks, &args.output)?;
    for path in &written {
        println!("   ✅ {}", path.display());
    }
    println!();
    println!("✨ Wrote {} images", written.len());
    Ok(())
}
