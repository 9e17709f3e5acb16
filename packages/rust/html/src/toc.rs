//! Page-level TOC generation: read headings, build the tree, write it back.

use tracing::{info, instrument};

use sitekit_core::{AnchorIdAssigner, assigner_for, build_nav_tree};
use sitekit_shared::{HeadingNode, NavTree, Result, TocConfig};

use crate::page::HtmlPage;
use crate::render::{NavClasses, render_nav_list};

/// What a TOC run produced for one page.
#[derive(Debug, Clone)]
pub struct TocOutcome {
    /// The navigation tree.
    pub tree: NavTree,
    /// Page headings with every anchor id filled in.
    pub headings: Vec<HeadingNode>,
    /// Heading tags that received a new `id` attribute.
    pub ids_written: usize,
}

/// A fresh assigner for one page, per the configured strategy.
///
/// The slug strategy is told about ids already on the page so minted slugs
/// never collide with them.
pub fn page_assigner(config: &TocConfig, headings: &[HeadingNode]) -> Box<dyn AnchorIdAssigner> {
    assigner_for(
        config.anchor_strategy,
        &config.anchor_prefix,
        headings.iter().filter_map(|h| h.anchor_id.as_deref()),
    )
}

/// Extract headings, build the tree, and write minted ids into the page.
///
/// The page is left without a nav list; use [`generate_toc`] to attach one.
#[instrument(skip_all)]
pub fn build_page_toc<A>(
    page: &mut HtmlPage,
    config: &TocConfig,
    assigner: &mut A,
) -> Result<TocOutcome>
where
    A: AnchorIdAssigner + ?Sized,
{
    let mut headings = page.headings(config.min_level, config.max_level)?;
    let tree = build_nav_tree(&mut headings, config.min_level, assigner);
    let ids_written = page.apply_anchor_ids(&headings, config.min_level, config.max_level)?;

    Ok(TocOutcome {
        tree,
        headings,
        ids_written,
    })
}

/// Full TOC pass over a page using the configured anchor strategy: ids are
/// written into headings and the nav list is appended to the container
/// element (`config.container_id`).
///
/// A page without headings is returned unchanged and needs no container.
#[instrument(skip_all, fields(container = %config.container_id))]
pub fn generate_toc(page: &mut HtmlPage, config: &TocConfig) -> Result<TocOutcome> {
    let existing = page.headings(config.min_level, config.max_level)?;
    let mut assigner = page_assigner(config, &existing);
    let outcome = build_page_toc(page, config, assigner.as_mut())?;

    if outcome.tree.is_empty() {
        info!("page has no headings, nothing to attach");
        return Ok(outcome);
    }

    let markup = render_nav_list(&outcome.tree, &NavClasses::from(config));
    page.append_to_element(&config.container_id, &markup)?;

    info!(
        entries = outcome.tree.count(),
        ids_written = outcome.ids_written,
        "TOC attached"
    );
    Ok(outcome)
}
