//! Validate command
//!
//! Loads each parameter file and checks every documented range.

use crate::ValidateArgs;
use anyhow::{Result, bail};
use grade_ops::GradeParams;
use tracing::{debug, info};

pub fn run(args: ValidateArgs, verbose: u8) -> Result<()> {
    let mut failed = 0usize;
    for path in &args.params {
        debug!(path = %path.display(), "validate::run");
        let result = GradeParams::from_yaml_file(path).and_then(|p| {
            p.validate()?;
            Ok(p)
        });
        match result {
            Ok(params) => {
                let pre = params.pre.active_stages();
                let post = params.post.active_stages();
                info!(path = %path.display(), pre = pre.len(), post = post.len(), "valid");
                println!("{}: ok", path.display());
                if verbose > 0 {
                    println!("  pre:  {}", pre.join(", "));
                    println!("  post: {}", post.join(", "));
                }
            }
            Err(e) => {
                failed += 1;
                println!("{}: {}", path.display(), e);
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} parameter files invalid", failed, args.params.len());
    }
    Ok(())
}
