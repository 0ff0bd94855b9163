//! L4 Atomic Layer: content replication
//!
//! The container's first child is the template. Everything after it is a
//! disposable clone, recomputed from the current widths on every run.

use tracing::{debug, warn};

use crate::host::Surface;

/// Keeps just enough copies of the template to cover the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentReplicator {
    /// Items added beyond what covers the container
    pub padding: usize,
    /// Hard ceiling on the item count
    pub max_items: usize,
}

impl Default for ContentReplicator {
    fn default() -> Self {
        Self {
            padding: 3,
            max_items: 512,
        }
    }
}

impl ContentReplicator {
    pub fn new(padding: usize, max_items: usize) -> Self {
        Self { padding, max_items }
    }

    /// Total items (template included) needed for a seamless loop, or
    /// `None` when the template cannot be measured
    pub fn required_items(&self, container_width: f64, template_width: f64) -> Option<usize> {
        if !(template_width.is_finite() && template_width > 0.0) {
            return None;
        }
        let covering = (container_width.max(0.0) / template_width).ceil();
        let required = if covering.is_finite() {
            (covering as usize).saturating_add(self.padding)
        } else {
            self.max_items
        };
        Some(required.clamp(1, self.max_items))
    }

    /// Remove every child but the template
    pub fn remove_clones<S: Surface + ?Sized>(&self, surface: &mut S) {
        let children = surface.children();
        for clone in children.into_iter().skip(1).rev() {
            surface.remove_child(clone);
        }
    }

    /// Drop stale clones and append fresh ones. Returns the resulting item
    /// count; a container without children is left alone.
    pub fn normalize<S: Surface + ?Sized>(&self, surface: &mut S) -> usize {
        self.remove_clones(surface);

        let Some(template) = surface.children().first().copied() else {
            debug!("No template child, skipping replication");
            return 0;
        };

        let container_width = surface.client_width();
        let template_width = surface.node_width(template);
        let Some(required) = self.required_items(container_width, template_width) else {
            warn!(template_width, "Template has no measurable width, keeping it alone");
            return 1;
        };

        for _ in 1..required {
            surface.append_clone(template);
        }

        debug!(
            items = required,
            container_width, template_width, "Replicated marquee content"
        );
        required
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimDocument;

    #[test]
    fn test_required_items() {
        let replicator = ContentReplicator::default();
        assert_eq!(replicator.required_items(1000.0, 300.0), Some(7));
        assert_eq!(replicator.required_items(900.0, 300.0), Some(6));
        assert_eq!(replicator.required_items(0.0, 300.0), Some(3));
        assert_eq!(replicator.required_items(1000.0, 0.0), None);
        assert_eq!(replicator.required_items(1000.0, f64::NAN), None);
    }

    #[test]
    fn test_required_items_capped() {
        let replicator = ContentReplicator::new(3, 10);
        assert_eq!(replicator.required_items(100_000.0, 1.0), Some(10));
        assert_eq!(replicator.required_items(f64::INFINITY, 1.0), Some(10));
    }

    #[test]
    fn test_normalize_fills_and_is_idempotent() {
        let mut doc = SimDocument::new(1000.0);
        doc.push_child(300.0);

        let replicator = ContentReplicator::default();
        assert_eq!(replicator.normalize(&mut doc), 7);
        assert_eq!(doc.children().len(), 7);

        let first = doc.children();
        assert_eq!(replicator.normalize(&mut doc), 7);
        assert_eq!(doc.children().len(), 7);
        assert_eq!(doc.children()[0], first[0]);
    }

    #[test]
    fn test_normalize_tracks_new_widths() {
        let mut doc = SimDocument::new(1000.0);
        doc.push_child(300.0);

        let replicator = ContentReplicator::default();
        replicator.normalize(&mut doc);

        doc.set_client_width(400.0);
        assert_eq!(replicator.normalize(&mut doc), 5);
        assert_eq!(doc.children().len(), 5);
    }

    #[test]
    fn test_normalize_without_children() {
        let mut doc = SimDocument::new(1000.0);
        let replicator = ContentReplicator::default();
        assert_eq!(replicator.normalize(&mut doc), 0);
        assert!(doc.children().is_empty());
    }

    #[test]
    fn test_remove_clones_keeps_template() {
        let mut doc = SimDocument::new(1000.0);
        let template = doc.push_child(250.0);
        ContentReplicator::default().normalize(&mut doc);

        ContentReplicator::default().remove_clones(&mut doc);
        assert_eq!(doc.children(), vec![template]);
    }
}
