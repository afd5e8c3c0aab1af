//! Reply threading.
//!
//! Turns a flat, parent-referencing list (the comments of one post, the
//! messages of one conversation) into a forest of reply trees. Linking goes
//! through an id -> index map built up front, so a reply may appear before
//! its parent in the input.
//!
//! Trees have no depth limit. Building, searching, dropping and rendering
//! all walk the tree with explicit stacks, so a reply chain of any length
//! costs heap, not call stack.

use std::collections::HashMap;
use std::io::{self, Write};

use serde::Serialize;

use crate::domain::{Comment, MAX_COMMENT_DEPTH, Message};

/// An item that may reply to another item of the same kind.
pub trait Threaded {
    fn thread_id(&self) -> i64;
    fn reply_to(&self) -> Option<i64>;
}

impl Threaded for Comment {
    fn thread_id(&self) -> i64 {
        self.id
    }

    fn reply_to(&self) -> Option<i64> {
        self.parent_id
    }
}

impl Threaded for Message {
    fn thread_id(&self) -> i64 {
        self.id
    }

    fn reply_to(&self) -> Option<i64> {
        self.parent_id
    }
}

/// An item with its nested replies.
#[derive(Debug)]
pub struct ThreadNode<T> {
    pub item: T,
    /// Nesting level in the tree, clamped to the display cap.
    pub display_depth: u8,
    /// Total number of descendants.
    pub reply_count: usize,
    /// Whether the reply action is offered at this level.
    pub can_reply: bool,
    pub children: Vec<ThreadNode<T>>,
}

pub type CommentNode = ThreadNode<Comment>;

impl<T: Threaded> ThreadNode<T> {
    pub fn id(&self) -> i64 {
        self.item.thread_id()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Search this node and everything below it for `id`.
    pub fn find(&self, id: i64) -> Option<&ThreadNode<T>> {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if node.id() == id {
                return Some(node);
            }
            pending.extend(node.children.iter());
        }
        None
    }
}

impl<T> Drop for ThreadNode<T> {
    // Unlink descendants onto a heap stack so a long chain is freed one
    // node at a time instead of by nested drop glue.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Build the reply forest for a flat list of comments.
///
/// Comments whose parent is missing from the input become roots. Roots and
/// sibling lists keep input order. Comments trapped in a parent cycle are
/// promoted to roots so nothing is dropped.
pub fn build_thread(comments: Vec<Comment>) -> Vec<CommentNode> {
    build_forest(comments, MAX_COMMENT_DEPTH)
}

/// Build the reply forest for any threaded items, clamping display depth at
/// `max_depth`.
pub fn build_forest<T: Threaded>(items: Vec<T>, max_depth: u8) -> Vec<ThreadNode<T>> {
    let len = items.len();
    let index: HashMap<i64, usize> = items
        .iter()
        .enumerate()
        .map(|(slot, item)| (item.thread_id(), slot))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); len];
    let mut roots = Vec::new();
    for (slot, item) in items.iter().enumerate() {
        match item.reply_to().and_then(|parent| index.get(&parent)) {
            Some(&parent) if parent != slot => children[parent].push(slot),
            _ => roots.push(slot),
        }
    }

    // Pre-order walk from every root. Slots still unvisited afterwards sit
    // on a parent cycle and start trees of their own.
    let mut walk = Walk::new(len);
    for &root in &roots {
        walk.visit_from(root, &children);
    }
    for slot in 0..len {
        if !walk.visited[slot] {
            tracing::warn!(
                item_id = items[slot].thread_id(),
                "Reply is part of a parent cycle, promoting to root"
            );
            roots.push(slot);
            walk.visit_from(slot, &children);
        }
    }

    // Reverse pre-order sees every subtree before its root, so each node's
    // children are already assembled when the node itself is built.
    let mut arena: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut built: Vec<Option<ThreadNode<T>>> =
        std::iter::repeat_with(|| None).take(len).collect();
    for &(slot, level) in walk.order.iter().rev() {
        let Some(item) = arena[slot].take() else {
            continue;
        };
        let nested: Vec<ThreadNode<T>> = walk.tree_children[slot]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        let reply_count = nested.iter().map(|child| 1 + child.reply_count).sum();
        let display_depth = level.min(usize::from(max_depth)) as u8;

        built[slot] = Some(ThreadNode {
            item,
            display_depth,
            reply_count,
            can_reply: display_depth < max_depth,
            children: nested,
        });
    }

    roots
        .into_iter()
        .filter_map(|slot| built[slot].take())
        .collect()
}

/// Traversal state shared by every tree of one forest.
struct Walk {
    visited: Vec<bool>,
    /// `(slot, level)` in pre-order.
    order: Vec<(usize, usize)>,
    /// Children each slot adopted during the walk, in input order.
    tree_children: Vec<Vec<usize>>,
}

impl Walk {
    fn new(len: usize) -> Self {
        Self {
            visited: vec![false; len],
            order: Vec::with_capacity(len),
            tree_children: vec![Vec::new(); len],
        }
    }

    fn visit_from(&mut self, start: usize, children: &[Vec<usize>]) {
        self.visited[start] = true;
        let mut stack = vec![(start, 0usize)];

        while let Some((slot, level)) = stack.pop() {
            self.order.push((slot, level));

            let fresh: Vec<usize> = children[slot]
                .iter()
                .copied()
                .filter(|&child| !self.visited[child])
                .collect();
            for &child in &fresh {
                self.visited[child] = true;
            }
            stack.extend(fresh.iter().rev().map(|&child| (child, level + 1)));
            self.tree_children[slot] = fresh;
        }
    }
}

/// Total number of items in a forest.
pub fn count_nodes<T>(forest: &[ThreadNode<T>]) -> usize {
    forest.iter().map(|node| 1 + node.reply_count).sum()
}

/// Total number of comments in a forest.
pub fn count_comments(forest: &[CommentNode]) -> usize {
    count_nodes(forest)
}

/// Fields of one node apart from its children.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NodeFields<'a, T> {
    #[serde(flatten)]
    item: &'a T,
    display_depth: u8,
    reply_count: usize,
    can_reply: bool,
}

/// Write a forest as a JSON array of nested nodes.
///
/// Each node is the item's own fields followed by `displayDepth`,
/// `replyCount`, `canReply` and a `children` array of nodes.
pub fn write_json<T, W>(mut out: W, forest: &[ThreadNode<T>]) -> io::Result<()>
where
    T: Serialize,
    W: Write,
{
    out.write_all(b"[")?;

    let mut levels = vec![forest.iter()];
    let mut first = true;
    while let Some(level) = levels.last_mut() {
        match level.next() {
            Some(node) => {
                if !first {
                    out.write_all(b",")?;
                }
                let fields = serde_json::to_vec(&NodeFields {
                    item: &node.item,
                    display_depth: node.display_depth,
                    reply_count: node.reply_count,
                    can_reply: node.can_reply,
                })?;
                // Reopen the object to append the children array.
                let open = fields.strip_suffix(b"}").unwrap_or(&fields);
                out.write_all(open)?;
                out.write_all(b",\"children\":[")?;
                levels.push(node.children.iter());
                first = true;
            }
            None => {
                levels.pop();
                let close: &[u8] = if levels.is_empty() { b"]" } else { b"]}" };
                out.write_all(close)?;
                first = false;
            }
        }
    }
    Ok(())
}

/// Render a forest with [`write_json`] into a string.
pub fn to_json_string<T: Serialize>(forest: &[ThreadNode<T>]) -> io::Result<String> {
    let mut buf = Vec::new();
    write_json(&mut buf, forest)?;
    // serde_json only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::domain::{LikeState, VoteTally};

    fn comment(id: i64, parent_id: Option<i64>) -> Comment {
        Comment {
            id,
            post_id: 1,
            parent_id,
            author: "someone".into(),
            body: format!("comment {id}"),
            votes: VoteTally::default(),
            likes: LikeState::default(),
            depth: 0,
            created_at: Utc::now(),
        }
    }

    fn chain(len: i64) -> Vec<Comment> {
        (1..=len)
            .map(|id| comment(id, (id > 1).then(|| id - 1)))
            .collect()
    }

    /// (parent, sorted children) pairs for every node, for shape comparison.
    fn edges(forest: &[CommentNode]) -> Vec<(i64, Vec<i64>)> {
        let mut out = Vec::new();
        let mut pending: Vec<&CommentNode> = forest.iter().collect();
        while let Some(node) = pending.pop() {
            let mut kids: Vec<i64> = node.children.iter().map(CommentNode::id).collect();
            kids.sort_unstable();
            out.push((node.id(), kids));
            pending.extend(node.children.iter());
        }
        out.sort();
        out
    }

    fn assert_reply_counts(forest: &[CommentNode]) {
        let mut pending: Vec<&CommentNode> = forest.iter().collect();
        while let Some(node) = pending.pop() {
            let expected: usize = node.children.iter().map(|c| 1 + c.reply_count).sum();
            assert_eq!(node.reply_count, expected, "comment {}", node.id());
            if node.is_leaf() {
                assert_eq!(node.reply_count, 0);
            }
            pending.extend(node.children.iter());
        }
    }

    #[test]
    fn chain_is_nested_and_depth_clamped() {
        let forest = build_thread(chain(3));

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.reply_count, 2);
        assert_eq!(root.children[0].id(), 2);
        assert_eq!(root.children[0].children[0].id(), 3);

        let third = root.find(3).unwrap();
        assert_eq!(third.display_depth, 2);
        assert!(!third.can_reply);
        assert!(root.can_reply);
    }

    #[test]
    fn structure_is_unbounded_below_the_cap() {
        let forest = build_thread(chain(6));

        let deepest = forest[0].find(6).unwrap();
        assert_eq!(deepest.display_depth, MAX_COMMENT_DEPTH);
        assert_eq!(forest[0].reply_count, 5);
    }

    #[test]
    fn very_long_chain_builds_and_drops() {
        const LEN: i64 = 100_000;
        let mut input = chain(LEN);
        input.reverse();
        let forest = build_thread(input);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id(), 1);
        assert_eq!(forest[0].reply_count, (LEN - 1) as usize);
        assert_eq!(count_comments(&forest), LEN as usize);

        let deepest = forest[0].find(LEN).unwrap();
        assert!(deepest.is_leaf());
        assert_eq!(deepest.display_depth, MAX_COMMENT_DEPTH);

        let json = to_json_string(&forest).unwrap();
        assert_eq!(json.matches("\"children\":[").count(), LEN as usize);
        assert!(json.ends_with(&format!("{}]", "]}".repeat(LEN as usize))));
    }

    #[test]
    fn large_scrambled_forest_matches_input_order_build() {
        const LEN: i64 = 3_000;
        // Every seventh comment starts a new tree; the rest reply to an
        // earlier comment picked by a multiplicative hash.
        let input: Vec<Comment> = (1..=LEN)
            .map(|id| {
                let parent = (id % 7 != 1).then(|| (id * 2_654_435_761) % (id - 1) + 1);
                comment(id, parent)
            })
            .collect();
        let expected = build_thread(input.clone());
        assert_reply_counts(&expected);
        assert_eq!(count_comments(&expected), LEN as usize);

        // 7919 is prime and coprime with LEN, so this visits every slot once.
        let len = input.len();
        let scrambled: Vec<Comment> = (0..len).map(|i| input[(i * 7919) % len].clone()).collect();
        let forest = build_thread(scrambled);

        assert_eq!(edges(&forest), edges(&expected));
        assert_reply_counts(&forest);
    }

    #[test]
    fn child_may_precede_parent() {
        let forest = build_thread(vec![comment(3, Some(2)), comment(2, Some(1)), comment(1, None)]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id(), 1);
        assert_eq!(forest[0].find(3).map(|n| n.display_depth), Some(2));
    }

    #[test]
    fn shuffled_input_builds_isomorphic_tree() {
        let input = vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(1)),
            comment(4, Some(2)),
            comment(5, None),
            comment(6, Some(5)),
            comment(7, Some(4)),
            comment(8, Some(42)),
        ];
        let expected = edges(&build_thread(input.clone()));

        // Deterministic permutations: reversed and rotated.
        let mut reversed = input.clone();
        reversed.reverse();
        assert_eq!(edges(&build_thread(reversed)), expected);

        for shift in 1..input.len() {
            let mut rotated = input.clone();
            rotated.rotate_left(shift);
            assert_eq!(edges(&build_thread(rotated)), expected);
        }
    }

    #[test]
    fn reply_count_is_total_descendants() {
        let forest = build_thread(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(1)),
            comment(4, Some(2)),
            comment(5, Some(4)),
            comment(6, None),
        ]);

        assert_eq!(forest[0].reply_count, 4);
        assert_eq!(forest[1].reply_count, 0);
        assert_reply_counts(&forest);
        assert_eq!(count_comments(&forest), 6);
    }

    #[test]
    fn siblings_keep_input_order() {
        let forest = build_thread(vec![
            comment(1, None),
            comment(9, Some(1)),
            comment(4, Some(1)),
            comment(6, Some(1)),
        ]);

        let kids: Vec<i64> = forest[0].children.iter().map(CommentNode::id).collect();
        assert_eq!(kids, vec![9, 4, 6]);
    }

    #[test]
    fn orphans_and_self_parents_become_roots() {
        let forest = build_thread(vec![comment(1, Some(99)), comment(2, Some(2))]);

        let root_ids: Vec<i64> = forest.iter().map(CommentNode::id).collect();
        assert_eq!(root_ids, vec![1, 2]);
    }

    #[test]
    fn cycles_do_not_lose_comments() {
        let forest = build_thread(vec![comment(1, Some(2)), comment(2, Some(1)), comment(3, None)]);

        assert_eq!(count_comments(&forest), 3);
        assert_eq!(forest[0].id(), 3);
        assert_eq!(forest[1].id(), 1);
        assert_eq!(forest[1].children[0].id(), 2);
    }

    #[test]
    fn json_nests_children_under_flattened_fields() {
        let forest = build_thread(chain(2));
        let rendered = to_json_string(&forest).unwrap();
        let json: serde_json::Value = serde_json::from_str(&rendered).unwrap();

        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["replyCount"], 1);
        assert_eq!(json[0]["canReply"], true);
        assert_eq!(json[0]["children"][0]["body"], "comment 2");
        assert_eq!(json[0]["children"][0]["displayDepth"], 1);
        assert_eq!(json[0]["children"][0]["children"], serde_json::json!([]));
    }

    #[test]
    fn empty_input_gives_empty_forest() {
        assert!(build_thread(Vec::new()).is_empty());
        assert_eq!(to_json_string::<Comment>(&[]).unwrap(), "[]");
    }
}
