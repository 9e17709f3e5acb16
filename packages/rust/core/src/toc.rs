//! TOC (Table of Contents) builder.
//!
//! Turns the flat, document-ordered list of page headings into a nested
//! [`NavTree`]. The builder is a single left-to-right pass over the headings
//! with a cursor pointing at the child list currently being appended to.
//!
//! Rank gaps collapse: a heading that is deeper than the previous one nests
//! exactly one level below it, however many ranks it skips (`h2` followed by
//! `h5` is one level of nesting). Going back up moves the cursor one list per
//! rank and stops at the root, so a page whose headings rise above `min_level`
//! still yields a valid tree.

use tracing::{debug, instrument};

use sitekit_shared::{HeadingNode, NavEntry, NavTree};

use crate::anchor::AnchorIdAssigner;

/// Build a navigation tree from headings in document order.
///
/// Headings without an `anchor_id` get one from `assigner`, and the minted id
/// is written back onto the heading so the caller can mirror it into the page.
/// Empty input yields an empty tree.
#[instrument(skip_all, fields(headings = headings.len(), min_level = min_level))]
pub fn build_nav_tree<A>(headings: &mut [HeadingNode], min_level: u8, assigner: &mut A) -> NavTree
where
    A: AnchorIdAssigner + ?Sized,
{
    let mut cursor = Cursor::default();
    let mut current_level = i16::from(min_level);

    for heading in headings.iter_mut() {
        let level = i16::from(heading.level);
        let diff = level - current_level;

        if diff > 0 {
            if !cursor.descend() {
                debug!(
                    level = heading.level,
                    text = %heading.text,
                    "heading deeper than min_level has no parent, keeping it at the current level"
                );
            }
            current_level = level;
        } else if diff < 0 {
            let wanted = usize::from(diff.unsigned_abs());
            let climbed = cursor.ascend(wanted);
            if climbed < wanted {
                debug!(
                    level = heading.level,
                    text = %heading.text,
                    wanted,
                    climbed,
                    "heading rises above the root, clamping"
                );
            }
            current_level = level;
        }

        let anchor_id = match heading.anchor_id.clone() {
            Some(id) => id,
            None => {
                let id = assigner.assign(heading);
                heading.anchor_id = Some(id.clone());
                id
            }
        };

        cursor.push(NavEntry::new(heading.text.clone(), &anchor_id));
    }

    let tree = cursor.finish();
    debug!(
        entries = tree.count(),
        depth = tree.depth(),
        "TOC built from headings"
    );
    tree
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Insertion point while the tree is being built.
///
/// `open` holds the child lists that are still being filled, innermost last.
/// Each one belongs to the last entry of the list beneath it (or of `root`)
/// and is attached there when the cursor climbs out of it.
#[derive(Debug, Default)]
struct Cursor {
    root: Vec<NavEntry>,
    open: Vec<Vec<NavEntry>>,
}

impl Cursor {
    fn current(&mut self) -> &mut Vec<NavEntry> {
        self.open.last_mut().unwrap_or(&mut self.root)
    }

    fn push(&mut self, entry: NavEntry) {
        self.current().push(entry);
    }

    /// Open a child list under the most recently appended entry.
    /// Returns `false` when the current list is empty and there is nothing to
    /// nest under.
    fn descend(&mut self) -> bool {
        if self.current().is_empty() {
            return false;
        }
        self.open.push(Vec::new());
        true
    }

    /// Climb up to `steps` lists toward the root. Returns how many were climbed.
    fn ascend(&mut self, steps: usize) -> usize {
        let climbable = steps.min(self.open.len());
        for _ in 0..climbable {
            self.close_innermost();
        }
        climbable
    }

    fn close_innermost(&mut self) {
        let Some(children) = self.open.pop() else {
            return;
        };
        // `descend` only opens a list under an existing entry, and nothing is
        // appended to the parent list while the child list is open.
        if let Some(owner) = self.current().last_mut() {
            owner.children.extend(children);
        }
    }

    fn finish(mut self) -> NavTree {
        while !self.open.is_empty() {
            self.close_innermost();
        }
        NavTree { entries: self.root }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
