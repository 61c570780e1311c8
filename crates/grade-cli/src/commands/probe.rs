//! Probe command
//!
//! Grades one pixel and prints the hue band masks of the input and output.

use crate::ProbeArgs;
use anyhow::{Context, Result};
use grade_color::{BandAdjuster, BandId, rgb_to_hsv};
use grade_ops::CompositePipeline;
use tracing::trace;

pub fn run(args: ProbeArgs, verbose: u8) -> Result<()> {
    trace!(r = args.r, g = args.g, b = args.b, a = args.a, "probe::run");

    let params = super::load_params(args.params.as_deref())?;
    let bands = params.post.hue_correct.params;
    let pipeline = CompositePipeline::new(params).context("Invalid parameters")?;

    let input = [args.r, args.g, args.b, args.a];
    let output = pipeline.process_pixel(input, args.factor)?;

    println!("input:  {}", format_px(input));
    println!("output: {}", format_px(output));
    if verbose > 0 {
        let hsv = rgb_to_hsv([output[0], output[1], output[2]]);
        println!("hsv:    h={:.4} s={:.4} v={:.4}", hsv.h, hsv.s, hsv.v);
    }

    println!();
    println!("{:<8} {:>8} {:>8}", "band", "input", "output");
    print_masks(&bands, [input[0], input[1], input[2]], [output[0], output[1], output[2]]);
    Ok(())
}

fn format_px(px: [f32; 4]) -> String {
    format!("{:.6} {:.6} {:.6} {:.6}", px[0], px[1], px[2], px[3])
}

fn print_masks(bands: &BandAdjuster, input: [f32; 3], output: [f32; 3]) {
    let before = bands.masks(input);
    let after = bands.masks(output);
    for (i, id) in BandId::ALL.into_iter().enumerate() {
        println!("{:<8} {:>8.4} {:>8.4}", id.name(), before[i].weight, after[i].weight);
    }
}
