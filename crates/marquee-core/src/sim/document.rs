use std::collections::BTreeMap;

use crate::host::{NodeId, StyleProperty, Surface};

#[derive(Debug, Clone, PartialEq)]
pub struct SimNode {
    pub id: NodeId,
    pub width: f64,
    /// Node this one was cloned from (itself for originals)
    pub source: NodeId,
}

/// The container element with its children and inline styles
#[derive(Debug, Clone, Default)]
pub struct SimDocument {
    client_width: f64,
    nodes: Vec<SimNode>,
    styles: BTreeMap<StyleProperty, String>,
    next_id: u64,
}

impl SimDocument {
    pub fn new(client_width: f64) -> Self {
        Self {
            client_width,
            ..Default::default()
        }
    }

    /// Append an original child of the given width
    pub fn push_child(&mut self, width: f64) -> NodeId {
        let id = self.allocate();
        self.nodes.push(SimNode {
            id,
            width,
            source: id,
        });
        id
    }

    pub fn set_client_width(&mut self, width: f64) {
        self.client_width = width;
    }

    /// Re-measure a child and every clone made from it
    pub fn set_node_width(&mut self, node: NodeId, width: f64) {
        for n in self
            .nodes
            .iter_mut()
            .filter(|n| n.id == node || n.source == node)
        {
            n.width = width;
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn node(&self, node: NodeId) -> Option<&SimNode> {
        self.nodes.iter().find(|n| n.id == node)
    }

    pub fn styles(&self) -> &BTreeMap<StyleProperty, String> {
        &self.styles
    }

    fn allocate(&mut self) -> NodeId {
        self.next_id += 1;
        NodeId(self.next_id)
    }
}

impl Surface for SimDocument {
    fn children(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    fn remove_child(&mut self, node: NodeId) {
        self.nodes.retain(|n| n.id != node);
    }

    fn append_clone(&mut self, node: NodeId) -> NodeId {
        let Some(original) = self.node(node).cloned() else {
            return node;
        };
        let id = self.allocate();
        self.nodes.push(SimNode {
            id,
            width: original.width,
            source: original.source,
        });
        id
    }

    fn client_width(&self) -> f64 {
        self.client_width
    }

    fn node_width(&self, node: NodeId) -> f64 {
        self.node(node).map(|n| n.width).unwrap_or(0.0)
    }

    fn style(&self, property: StyleProperty) -> Option<String> {
        self.styles.get(&property).cloned()
    }

    fn set_style(&mut self, property: StyleProperty, value: String) {
        self.styles.insert(property, value);
    }

    fn remove_style(&mut self, property: StyleProperty) {
        self.styles.remove(&property);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_keeps_source_and_width() {
        let mut doc = SimDocument::new(800.0);
        let template = doc.push_child(120.0);
        let clone = doc.append_clone(template);

        assert_ne!(clone, template);
        assert_eq!(doc.node(clone).unwrap().source, template);
        assert_eq!(doc.node_width(clone), 120.0);

        doc.set_node_width(template, 200.0);
        assert_eq!(doc.node_width(clone), 200.0);
    }

    #[test]
    fn test_remove_unknown_child_is_noop() {
        let mut doc = SimDocument::new(800.0);
        doc.push_child(100.0);
        doc.remove_child(NodeId(99));
        assert_eq!(doc.children().len(), 1);
    }
}
