use serde::Serialize;

use super::HeadingNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocTreeNode {
    #[serde(flatten)]
    pub heading: HeadingNode,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocTreeNode>,
}

/// Annotate every heading with the document's shallowest level.
pub fn normalize(mut headings: Vec<HeadingNode>) -> Vec<HeadingNode> {
    let Some(base) = headings.iter().map(|h| h.level).min() else {
        return headings;
    };
    for h in &mut headings {
        h.base = Some(base);
    }
    headings
}

/// Nest headings under the nearest preceding shallower heading.
pub fn build_tree(headings: &[HeadingNode]) -> Vec<TocTreeNode> {
    fn attach(node: TocTreeNode, stack: &mut [TocTreeNode], roots: &mut Vec<TocTreeNode>) {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => roots.push(node),
        }
    }

    let mut roots = Vec::new();
    let mut stack: Vec<TocTreeNode> = Vec::new();

    for h in headings {
        while stack.last().is_some_and(|top| top.heading.level >= h.level) {
            if let Some(done) = stack.pop() {
                attach(done, &mut stack, &mut roots);
            }
        }
        stack.push(TocTreeNode {
            heading: h.clone(),
            children: Vec::new(),
        });
    }
    while let Some(done) = stack.pop() {
        attach(done, &mut stack, &mut roots);
    }

    roots
}
