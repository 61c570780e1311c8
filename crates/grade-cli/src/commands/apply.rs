//! Apply command
//!
//! Grades a raw interleaved RGBA buffer.

use super::{RawFormat, read_raw, write_raw};
use crate::ApplyArgs;
use anyhow::{Context, Result};
use grade_core::AlphaMode;
use grade_ops::CompositePipeline;
use std::time::Instant;
use tracing::{info, trace};

pub fn run(args: ApplyArgs, verbose: u8) -> Result<()> {
    trace!(input = %args.input.display(), w = args.width, h = args.height, "apply::run");

    let format = if args.half { RawFormat::F16 } else { RawFormat::F32 };
    let params = super::load_params(args.params.as_deref())?;
    let pipeline = CompositePipeline::new(params).context("Invalid parameters")?;

    let mode = if args.premultiplied { AlphaMode::Premultiplied } else { AlphaMode::Straight };
    let image = read_raw(&args.input, args.width, args.height, format)?.with_alpha_mode(mode);

    let start = Instant::now();
    let out = pipeline.process(&image, args.factor)?;
    let elapsed = start.elapsed();
    info!(w = args.width, h = args.height, ms = elapsed.as_millis() as u64, "graded");

    write_raw(&args.output, &out.image, format)?;
    if let Some(path) = &args.glare {
        write_raw(path, &out.glare, format)?;
    }

    if verbose > 0 {
        println!(
            "Graded {}x{} in {:.1} ms -> {}",
            args.width,
            args.height,
            elapsed.as_secs_f64() * 1000.0,
            args.output.display()
        );
    }
    Ok(())
}
