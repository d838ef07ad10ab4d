//! Predicate searches over a part tree.
//!
//! All searches run through [`find`]: breadth-first visits the tree level by
//! level, depth-first visits a node before its children (pre-order). Both go
//! left to right, matching the order parts appear in the raw message.

use crate::part::Part;
use std::collections::VecDeque;

/// Traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    /// Level order.
    BreadthFirst,
    /// Pre-order.
    DepthFirst,
}

/// How many matches to collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Take {
    /// Stop at the first match.
    First,
    /// Collect every match.
    All,
}

/// Visits `root` and its descendants in `order`, returning the parts the
/// predicate accepts. The root itself is a candidate.
pub fn find<'a, P>(root: &'a Part, order: Order, take: Take, mut predicate: P) -> Vec<&'a Part>
where
    P: FnMut(&Part) -> bool,
{
    let mut found = Vec::new();
    let mut pending = VecDeque::from([root]);

    loop {
        let next = match order {
            Order::BreadthFirst => pending.pop_front(),
            Order::DepthFirst => pending.pop_back(),
        };
        let Some(part) = next else { break };

        if predicate(part) {
            found.push(part);
            if take == Take::First {
                break;
            }
        }

        match order {
            Order::BreadthFirst => pending.extend(part.children()),
            // Reversed so the leftmost child is popped first.
            Order::DepthFirst => pending.extend(part.children().iter().rev()),
        }
    }

    found
}

/// First match in level order.
pub fn breadth_match_first<P>(root: &Part, predicate: P) -> Option<&Part>
where
    P: FnMut(&Part) -> bool,
{
    find(root, Order::BreadthFirst, Take::First, predicate).pop()
}

/// All matches in level order.
pub fn breadth_match_all<P>(root: &Part, predicate: P) -> Vec<&Part>
where
    P: FnMut(&Part) -> bool,
{
    find(root, Order::BreadthFirst, Take::All, predicate)
}

/// First match in pre-order.
pub fn depth_match_first<P>(root: &Part, predicate: P) -> Option<&Part>
where
    P: FnMut(&Part) -> bool,
{
    find(root, Order::DepthFirst, Take::First, predicate).pop()
}

/// All matches in pre-order.
pub fn depth_match_all<P>(root: &Part, predicate: P) -> Vec<&Part>
where
    P: FnMut(&Part) -> bool,
{
    find(root, Order::DepthFirst, Take::All, predicate)
}
