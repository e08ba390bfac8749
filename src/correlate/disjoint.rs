//! Disjoint sets over cluster identifiers.

use std::collections::HashMap;

use super::index::ClusterId;

/// Union-find with path compression.
///
/// Unions always link the younger root under the older one (by the order
/// sets were made), so the surviving identifier of a merge is the one minted
/// first and does not depend on argument order.
#[derive(Debug, Default)]
pub(crate) struct DisjointSet {
    parent: HashMap<ClusterId, ClusterId>,
    age: HashMap<ClusterId, u64>,
    next_age: u64,
}

impl DisjointSet {
    pub(crate) fn make_set(&mut self, id: ClusterId) {
        if self.parent.contains_key(&id) {
            return;
        }
        self.parent.insert(id, id);
        self.age.insert(id, self.next_age);
        self.next_age += 1;
    }

    /// Root of `id`'s set. Unknown ids are their own root.
    pub(crate) fn find(&mut self, id: ClusterId) -> ClusterId {
        let mut root = id;
        while let Some(&p) = self.parent.get(&root) {
            if p == root {
                break;
            }
            root = p;
        }

        let mut current = id;
        while current != root {
            let Some(next) = self.parent.insert(current, root) else {
                break;
            };
            current = next;
        }
        root
    }

    /// Merges the sets of `a` and `b`.
    ///
    /// Returns `(survivor, absorbed)` roots, or `None` if they were already
    /// in the same set.
    pub(crate) fn union(&mut self, a: ClusterId, b: ClusterId) -> Option<(ClusterId, ClusterId)> {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return None;
        }
        let age_a = self.age.get(&ra).copied().unwrap_or(u64::MAX);
        let age_b = self.age.get(&rb).copied().unwrap_or(u64::MAX);
        let (survivor, absorbed) = if age_a <= age_b { (ra, rb) } else { (rb, ra) };
        self.parent.insert(absorbed, survivor);
        Some((survivor, absorbed))
    }
}
