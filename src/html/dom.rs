//! Arena-allocated HTML tree.
//!
//! Every node lives in one vector and refers to its relatives by index, which
//! keeps the tree cheap to build from the parser and cheap to walk while
//! rendering. Beyond construction, this module holds the queries the
//! renderers need: tag names, attributes, the text under a subtree, ancestor
//! lookup and sibling counting.

use html5ever::{LocalName, QualName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_some(&self) -> bool {
        self.0 != u32::MAX
    }

    pub fn is_none(&self) -> bool {
        self.0 == u32::MAX
    }
}

#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element { name: QualName, attrs: Vec<Attribute> },
    Text(String),
    Comment(String),
    Doctype { name: String },
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
pub struct Node {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
}

impl Node {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
        }
    }
}

#[derive(Debug)]
pub struct Dom {
    nodes: Vec<Node>,
    document: NodeId,
}

impl Dom {
    pub fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: NodeId::NONE,
        };
        dom.document = dom.alloc(Node::new(NodeData::Document));
        dom
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        self.alloc(Node::new(NodeData::Element { name, attrs }))
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(Node::new(NodeData::Comment(text)))
    }

    pub fn create_doctype(&mut self, name: String) -> NodeId {
        self.alloc(Node::new(NodeData::Doctype { name }))
    }

    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = NodeId::NONE;
        }

        if last_child.is_some() {
            if let Some(last_node) = self.get_mut(last_child) {
                last_node.next_sibling = child;
            }
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text under `parent`, merging with a trailing text node.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self
            .get(parent)
            .map(|n| n.last_child)
            .unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child) {
            if let NodeData::Text(ref mut existing) = last.data {
                existing.push_str(text);
                return;
            }
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink `target` from its parent and siblings.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    pub fn children(&self, parent: NodeId) -> Children<'_> {
        let first = self
            .get(parent)
            .map(|n| n.first_child)
            .unwrap_or(NodeId::NONE);
        Children {
            dom: self,
            current: first,
        }
    }

    /// Children that are elements, skipping text and comments.
    pub fn child_elements(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(parent).filter(|&id| self.is_element(id))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(NodeId::is_some)
    }

    /// First element with the given tag, depth first in document order.
    pub fn find_by_tag(&self, tag: &str) -> Option<NodeId> {
        let mut stack = vec![self.document];
        while let Some(id) = stack.pop() {
            if self.tag(id) == Some(tag) {
                return Some(id);
            }
            let mut children: Vec<NodeId> = self.children(id).collect();
            children.reverse();
            stack.extend(children);
        }
        None
    }

    pub fn body(&self) -> Option<NodeId> {
        self.find_by_tag("body")
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Children<'a> {
    dom: &'a Dom,
    current: NodeId,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self
            .dom
            .get(id)
            .map(|n| n.next_sibling)
            .unwrap_or(NodeId::NONE);
        Some(id)
    }
}

// queries used by the renderers
impl Dom {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    /// Lowercase tag name of an element.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element_name(id).map(|name| name.as_ref())
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    pub fn attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        })
    }

    /// All text under `id`, concatenated in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.get(id).map(|n| &n.data) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element { .. }) | Some(NodeData::Document) => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            _ => {}
        }
    }

    /// Nearest strict ancestor with the given tag.
    pub fn find_ancestor(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        let mut current = self.parent(id);
        while let Some(ancestor) = current {
            if self.tag(ancestor) == Some(tag) {
                return Some(ancestor);
            }
            current = self.parent(ancestor);
        }
        None
    }

    /// How many element siblings come before `id`.
    pub fn preceding_element_siblings(&self, id: NodeId) -> usize {
        let mut count = 0;
        let mut current = self.get(id).map(|n| n.prev_sibling).unwrap_or(NodeId::NONE);
        while let Some(node) = self.get(current) {
            if matches!(node.data, NodeData::Element { .. }) {
                count += 1;
            }
            current = node.prev_sibling;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html5ever::{local_name, ns};

    fn qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    #[test]
    fn can_append_children_in_order() {
        let mut dom = Dom::new();
        let ul = dom.create_element(qname("ul"), vec![]);
        let a = dom.create_element(qname("li"), vec![]);
        let b = dom.create_element(qname("li"), vec![]);
        dom.append(dom.document(), ul);
        dom.append(ul, a);
        dom.append_text(ul, "\n");
        dom.append(ul, b);

        assert_eq!(dom.children(ul).count(), 3);
        assert_eq!(dom.child_elements(ul).collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(dom.preceding_element_siblings(a), 0);
        assert_eq!(dom.preceding_element_siblings(b), 1);
        assert_eq!(dom.find_ancestor(b, "ul"), Some(ul));
        assert_eq!(dom.find_ancestor(b, "ol"), None);
    }

    #[test]
    fn can_merge_adjacent_text() {
        let mut dom = Dom::new();
        let p = dom.create_element(qname("p"), vec![]);
        dom.append(dom.document(), p);
        dom.append_text(p, "Hello, ");
        dom.append_text(p, "world");
        assert_eq!(dom.children(p).count(), 1);
        assert_eq!(dom.text_content(p), "Hello, world");
    }

    #[test]
    fn can_read_attributes() {
        let mut dom = Dom::new();
        let attrs = vec![Attribute {
            name: QualName::new(None, ns!(), local_name!("href")),
            value: "https://example.com".to_string(),
        }];
        let a = dom.create_element(qname("a"), attrs);
        assert_eq!(dom.attr(a, "href"), Some("https://example.com"));
        assert_eq!(dom.attr(a, "title"), None);
        assert_eq!(dom.tag(a), Some("a"));
    }

    #[test]
    fn can_detach_nodes() {
        let mut dom = Dom::new();
        let div = dom.create_element(qname("div"), vec![]);
        let a = dom.create_text("a".to_string());
        let b = dom.create_text("b".to_string());
        dom.append(div, a);
        dom.append(div, b);
        dom.detach(a);
        assert_eq!(dom.children(div).collect::<Vec<_>>(), vec![b]);
        assert_eq!(dom.parent(a), None);
    }
}
