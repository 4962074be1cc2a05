//! Config command implementation

use super::CommandContext;
use crate::output_types::ConfigLine;
use anyhow::Result;

pub fn execute(ctx: &CommandContext) -> Result<()> {
    let mut lines: Vec<ConfigLine> = ctx
        .config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigLine::new(key, value, source))
        .collect();
    lines.sort_by(|a, b| a.key.cmp(&b.key));

    if ctx.output.is_json() {
        ctx.output.result(&lines)?;
    } else {
        ctx.output.section("Effective configuration");
        ctx.output.table(lines);
    }
    Ok(())
}
