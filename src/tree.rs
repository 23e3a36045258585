//! Parse tree produced by [`Parser::parse`](crate::Parser::parse).
//!
//! Nodes carry the [`RuleId`] of the capture that produced them. Use
//! [`Parser::by_id`](crate::Parser::by_id) to turn a tag back into its rule name.

use serde::Serialize;

use crate::engine::Parser;
use crate::grammar::RuleId;

/// Byte range in the parsed text.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "Invalid span: {start}..{end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl From<Span> for miette::SourceSpan {
    fn from(span: Span) -> Self {
        (span.start..span.end).into()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Capture without nested captures; holds the matched text.
    Leaf(String),
    /// Nested captures in grammar order.
    Branch(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub tag: RuleId,
    pub span: Span,
    pub kind: NodeKind,
}

impl Node {
    /// Wraps a successful match of rule `tag` over `span`.
    pub(crate) fn from_match(tag: RuleId, span: Span, children: Vec<Node>, input: &str) -> Self {
        let kind = if children.is_empty() {
            NodeKind::Leaf(input[span.start..span.end].to_string())
        } else {
            NodeKind::Branch(children)
        };
        Self { tag, span, kind }
    }

    /// Captured text of a leaf.
    pub fn value(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Leaf(value) => Some(value),
            NodeKind::Branch(_) => None,
        }
    }

    /// Child nodes; empty for a leaf.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Leaf(_) => &[],
            NodeKind::Branch(children) => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// The full text this node matched, including uncaptured parts.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        &input[self.span.start..self.span.end]
    }

    /// Direct children carrying `tag`.
    pub fn children_tagged(&self, tag: RuleId) -> impl Iterator<Item = &Node> {
        self.children().iter().filter(move |child| child.tag == tag)
    }

    /// All leaves below this node in document order.
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves { stack: vec![self] }
    }
}

/// Depth-first leaf iterator, see [`Node::leaves`].
pub struct Leaves<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Leaves<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            match &node.kind {
                NodeKind::Leaf(_) => return Some(node),
                NodeKind::Branch(children) => self.stack.extend(children.iter().rev()),
            }
        }
        None
    }
}

// ============================================================================
// RENDERING
// ============================================================================

/// Indented text dump, one node per line.
pub fn render(node: &Node, parser: &Parser) -> String {
    let mut out = String::new();
    render_into(&mut out, node, parser, 0);
    out
}

fn render_into(out: &mut String, node: &Node, parser: &Parser, depth: usize) {
    out.push_str(&"  ".repeat(depth));
    out.push_str(parser.by_id(node.tag));
    match &node.kind {
        NodeKind::Leaf(value) => {
            out.push(' ');
            out.push_str(&format!("{value:?}"));
            out.push('\n');
        }
        NodeKind::Branch(children) => {
            out.push('\n');
            for child in children {
                render_into(out, child, parser, depth + 1);
            }
        }
    }
}

/// Serializable view of a node with rule names resolved.
#[derive(Debug, Serialize)]
pub struct NamedNode<'a> {
    pub rule: &'a str,
    pub span: Span,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NamedNode<'a>>,
}

impl<'a> NamedNode<'a> {
    pub fn new(node: &'a Node, parser: &'a Parser) -> Self {
        Self {
            rule: parser.by_id(node.tag),
            span: node.span,
            value: node.value(),
            children: node
                .children()
                .iter()
                .map(|child| NamedNode::new(child, parser))
                .collect(),
        }
    }
}

pub fn to_json(node: &Node, parser: &Parser) -> serde_json::Result<serde_json::Value> {
    serde_json::to_value(NamedNode::new(node, parser))
}
