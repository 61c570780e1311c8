//! Defaults command
//!
//! Prints the default parameter bundle as YAML.

use crate::DefaultsArgs;
use anyhow::Result;
use grade_ops::GradeParams;

pub fn run(args: DefaultsArgs) -> Result<()> {
    let mut params = GradeParams::default();
    if args.all {
        params.set_all_enabled(true);
    }
    print!("{}", params.to_yaml_string()?);
    Ok(())
}
