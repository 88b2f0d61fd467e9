//! The per-run boxing pipeline
//!
//! A [Boxer] is built once from a [BoxConfig]: templates are rendered and compiled up front,
//! then reused for every attribute in the run.

use super::engine::{strip, wrap};
use super::error::{BoxError, TemplateError};
use super::range::{ToggleRange, TokenRange};
use super::tags::{scan_tag_ranges, KeyMatcher};
use super::template::BoxTemplate;
use super::toggles::{scan_legacy_toggle_ranges, scan_toggle_ranges};
use crate::config::BoxConfig;
use crate::hcl::{Block, Token};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Which blocks and which attribute get boxed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSelector {
    pub kinds: BTreeSet<String>,
    pub ignored: BTreeSet<String>,
    pub attribute: String,
}

impl BlockSelector {
    /// A block is selected when its kind is wrappable and neither its kind nor its first label
    /// (the resource type) is ignored.
    pub fn selects(&self, block: &Block) -> bool {
        self.kinds.contains(&block.kind)
            && !self.ignored.contains(&block.kind)
            && !block
                .label(0)
                .is_some_and(|label| self.ignored.contains(label))
    }
}

impl Default for BlockSelector {
    fn default() -> Self {
        Self {
            kinds: ["resource", "module"].map(String::from).into(),
            ignored: BTreeSet::new(),
            attribute: "tags".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Boxer {
    template: BoxTemplate,
    old_template: Option<BoxTemplate>,
    matcher: KeyMatcher,
    legacy_toggle: Option<String>,
    selector: BlockSelector,
}

impl Boxer {
    /// Render and compile the configured templates.
    pub fn new(config: &BoxConfig, dir: &Path) -> Result<Self, TemplateError> {
        let template = BoxTemplate::compile(&config.render_box_template(dir)?)?;
        let old_template = match config.render_old_box_template(dir)? {
            Some(rendered) => Some(BoxTemplate::compile(&rendered)?),
            None => None,
        };
        let legacy_toggle = config
            .legacy_toggle_detection
            .then(|| config.toggle_name.clone());

        Ok(Self::new_with_template(template, config.key_matcher())
            .with_old_template(old_template)
            .with_legacy_toggle(legacy_toggle)
            .with_selector(config.block_selector()))
    }

    pub fn new_with_template(template: BoxTemplate, matcher: KeyMatcher) -> Self {
        Self {
            template,
            old_template: None,
            matcher,
            legacy_toggle: None,
            selector: BlockSelector::default(),
        }
    }

    /// Migrate wrappers of this shape. A template with the same shape as the current one
    /// means there is nothing to migrate.
    pub fn with_old_template(mut self, old: Option<BoxTemplate>) -> Self {
        self.old_template = old.filter(|old| !old.same_shape(&self.template));
        self
    }

    /// Also treat `var.<name> ?` in front of a group as an existing box.
    pub fn with_legacy_toggle(mut self, name: Option<String>) -> Self {
        self.legacy_toggle = name;
        self
    }

    pub fn with_selector(mut self, selector: BlockSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn template(&self) -> &BoxTemplate {
        &self.template
    }

    pub fn old_template(&self) -> Option<&BoxTemplate> {
        self.old_template.as_ref()
    }

    pub fn selector(&self) -> &BlockSelector {
        &self.selector
    }

    /// Box every marked group in an attribute value.
    ///
    /// Groups already boxed with the current template are left alone, so boxing is
    /// idempotent. When an old template is configured, its wrappers are removed first.
    pub fn box_tokens(&self, tokens: &[Token]) -> Result<Vec<Token>, BoxError> {
        let mut current = tokens.to_vec();

        if let Some(old) = &self.old_template {
            let stale = self.hugging(&current, old)?;
            if !stale.is_empty() {
                debug!(halves = stale.len(), "removing wrappers of the old template");
                current = strip(&current, &stale);
            }
        }

        let groups = scan_tag_ranges(&current, &self.matcher)?;
        let toggles = scan_toggle_ranges(&current, &self.template);
        let legacy = self
            .legacy_toggle
            .as_deref()
            .map(|name| scan_legacy_toggle_ranges(&current, name));

        let pending: Vec<TokenRange> = groups
            .iter()
            .filter(|group| {
                !toggles.is_boxed(group) && !legacy.as_ref().is_some_and(|l| l.is_boxed(group))
            })
            .copied()
            .collect();
        debug!(
            groups = groups.len(),
            boxed = groups.len() - pending.len(),
            "scanned tag groups"
        );

        if pending.is_empty() {
            return Ok(current);
        }
        Ok(wrap(&current, &pending, &self.template))
    }

    /// Remove the current template's wrappers from every marked group.
    pub fn unbox_tokens(&self, tokens: &[Token]) -> Result<Vec<Token>, BoxError> {
        let stale = self.hugging(tokens, &self.template)?;
        debug!(halves = stale.len(), "removing wrappers");
        if stale.is_empty() {
            return Ok(tokens.to_vec());
        }
        Ok(strip(tokens, &stale))
    }

    /// Wrapper halves of `template` that directly surround a marked group.
    fn hugging(
        &self,
        tokens: &[Token],
        template: &BoxTemplate,
    ) -> Result<Vec<ToggleRange>, BoxError> {
        let groups = scan_tag_ranges(tokens, &self.matcher)?;
        let toggles = scan_toggle_ranges(tokens, template);
        Ok(groups
            .iter()
            .filter_map(|group| toggles.boxing(group))
            .flat_map(|(left, right)| std::iter::once(left).chain(right))
            .collect())
    }
}
