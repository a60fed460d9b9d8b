//! Final layout pass over a synthesized block list

use crate::document::Block;
use crate::extract::heuristics::LayoutRules;

/// How far ahead to look for content before forcing a page break
const LOOKAHEAD: usize = 5;

/// Caps spacer runs and breaks long stretches of content into pages
///
/// After every `page_break_run`-th content block a page break is inserted,
/// provided more than [`LOOKAHEAD`] blocks remain and content follows within
/// that window. Runs of spacers longer than `max_consecutive_spacers` are cut.
pub fn optimize_layout(blocks: Vec<Block>, rules: &LayoutRules) -> Vec<Block> {
    let mut out = Vec::with_capacity(blocks.len() + blocks.len() / rules.page_break_run.max(1));
    let mut spacers = 0;
    let mut content = 0;

    for (i, block) in blocks.iter().enumerate() {
        if block.is_content() {
            spacers = 0;
            content += 1;
            out.push(block.clone());

            let remaining = blocks.len() - i - 1;
            if content % rules.page_break_run == 0
                && remaining > LOOKAHEAD
                && blocks[i + 1..=i + LOOKAHEAD].iter().any(Block::is_content)
            {
                out.push(Block::PageBreak);
            }
            continue;
        }

        match block {
            Block::PageBreak => {
                if out.last() != Some(&Block::PageBreak) {
                    out.push(Block::PageBreak);
                }
            }
            // Spacers and any block that ended up without content
            _ => {
                spacers += 1;
                if spacers <= rules.max_consecutive_spacers {
                    out.push(Block::Spacer);
                }
            }
        }
    }

    out
}
