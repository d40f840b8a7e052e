//! In-memory index over a flat category list.
//!
//! Categories are stored flat with denormalized `path`/`level`; this index
//! answers subtree questions (descendants, re-parenting, nested view)
//! without recursive queries.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::models::{Category, CategoryNode, child_path};

pub struct CategoryTree {
    nodes: HashMap<Uuid, Category>,
    children: HashMap<Uuid, Vec<Uuid>>,
    roots: Vec<Uuid>,
}

impl CategoryTree {
    /// Index `categories` by parent. Siblings are ordered by
    /// `sort_order`, then `name`. A category whose parent is not in the
    /// list is treated as a root.
    pub fn new(categories: Vec<Category>) -> Self {
        let nodes: HashMap<Uuid, Category> =
            categories.into_iter().map(|c| (c.id, c)).collect();

        let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        let mut roots = Vec::new();

        for category in nodes.values() {
            match category.parent_id {
                Some(parent) if nodes.contains_key(&parent) => {
                    children.entry(parent).or_default().push(category.id)
                }
                _ => roots.push(category.id),
            }
        }

        let order = |ids: &mut Vec<Uuid>| {
            ids.sort_by(|a, b| {
                let (a, b) = (&nodes[a], &nodes[b]);
                a.sort_order
                    .cmp(&b.sort_order)
                    .then_with(|| a.name.cmp(&b.name))
            })
        };
        order(&mut roots);
        children.values_mut().for_each(order);

        Self {
            nodes,
            children,
            roots,
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<&Category> {
        self.nodes.get(id)
    }

    pub fn children_of(&self, id: &Uuid) -> &[Uuid] {
        self.children.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// All ids below `id`, depth first. Excludes `id` itself.
    pub fn descendants(&self, id: &Uuid) -> Vec<Uuid> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([*id]);
        let mut stack: Vec<Uuid> = self.children_of(id).iter().rev().copied().collect();

        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children_of(&next).iter().rev().copied());
        }

        out
    }

    /// `id` followed by all of its descendants.
    pub fn subtree_ids(&self, id: &Uuid) -> Vec<Uuid> {
        let mut ids = vec![*id];
        ids.extend(self.descendants(id));
        ids
    }

    /// Paths for every descendant of `id` after `id` moves to `new_path`.
    ///
    /// Each descendant's path becomes its parent's new path plus its own id,
    /// so the old prefix is replaced and `level == path.len()` holds.
    /// `id` itself is not included.
    pub fn rebase(&self, id: &Uuid, new_path: &[Uuid]) -> Vec<(Uuid, Vec<Uuid>)> {
        let mut updates = Vec::new();
        let mut seen = HashSet::from([*id]);
        let mut stack: Vec<(Uuid, Vec<Uuid>)> = self
            .children_of(id)
            .iter()
            .map(|child| (*child, new_path.to_vec()))
            .collect();

        while let Some((node, parent_path)) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            let path = child_path(Some(parent_path.as_slice()), node);
            for child in self.children_of(&node) {
                stack.push((*child, path.clone()));
            }
            updates.push((node, path));
        }

        updates
    }

    /// Nested view rooted at the main categories.
    ///
    /// With `active_only`, archived categories are dropped with their
    /// subtrees.
    pub fn nested(&self, active_only: bool) -> Vec<CategoryNode> {
        self.roots
            .iter()
            .filter_map(|id| self.build_node(id, active_only, &mut HashSet::new()))
            .collect()
    }

    fn build_node(
        &self,
        id: &Uuid,
        active_only: bool,
        visiting: &mut HashSet<Uuid>,
    ) -> Option<CategoryNode> {
        let category = self.nodes.get(id)?;
        if (active_only && category.is_archived()) || !visiting.insert(*id) {
            return None;
        }

        let children = self
            .children_of(id)
            .iter()
            .filter_map(|child| self.build_node(child, active_only, visiting))
            .collect();

        visiting.remove(id);

        Some(CategoryNode {
            category: category.clone(),
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::categories::models::CreateCategory;
    use crate::common::EntityStatus;

    fn node(name: &str, sort_order: i32, parent: Option<&Category>) -> Category {
        Category::new(
            CreateCategory {
                name: name.to_string(),
                slug: None,
                parent_id: parent.map(|p| p.id),
                sort_order,
                shipping_type: None,
                shipping_rate: None,
            },
            name.to_lowercase(),
            parent,
        )
    }

    /// electronics ─┬─ phones ── smartphones
    ///              └─ audio
    /// home
    fn fixture() -> (Vec<Category>, [Category; 5]) {
        let electronics = node("Electronics", 0, None);
        let home = node("Home", 1, None);
        let phones = node("Phones", 0, Some(&electronics));
        let audio = node("Audio", 1, Some(&electronics));
        let smartphones = node("Smartphones", 0, Some(&phones));
        let all = vec![
            smartphones.clone(),
            home.clone(),
            audio.clone(),
            electronics.clone(),
            phones.clone(),
        ];
        (all, [electronics, home, phones, audio, smartphones])
    }

    #[test]
    fn test_descendants_depth_first() {
        let (all, [electronics, home, phones, audio, smartphones]) = fixture();
        let tree = CategoryTree::new(all);

        assert_eq!(
            tree.descendants(&electronics.id),
            vec![phones.id, smartphones.id, audio.id]
        );
        assert!(tree.descendants(&home.id).is_empty());
        assert_eq!(
            tree.subtree_ids(&phones.id),
            vec![phones.id, smartphones.id]
        );
    }

    #[test]
    fn test_rebase_replaces_prefix_for_whole_subtree() {
        let (all, [electronics, home, phones, _, smartphones]) = fixture();
        let tree = CategoryTree::new(all);

        // phones moves under home
        let new_phones_path = vec![home.id, phones.id];
        let updates: HashMap<Uuid, Vec<Uuid>> =
            tree.rebase(&phones.id, &new_phones_path).into_iter().collect();

        assert_eq!(updates.len(), 1);
        assert_eq!(
            updates[&smartphones.id],
            vec![home.id, phones.id, smartphones.id]
        );
        assert!(!updates[&smartphones.id].contains(&electronics.id));
    }

    #[test]
    fn test_rebase_to_root_shortens_levels() {
        let (all, [_, _, phones, _, smartphones]) = fixture();
        let tree = CategoryTree::new(all);

        let updates = tree.rebase(&phones.id, &[phones.id]);
        assert_eq!(updates, vec![(smartphones.id, vec![phones.id, smartphones.id])]);
    }

    #[test]
    fn test_nested_orders_siblings() {
        let (all, [electronics, home, phones, audio, smartphones]) = fixture();
        let tree = CategoryTree::new(all);
        let nested = tree.nested(false);

        let roots: Vec<Uuid> = nested.iter().map(|n| n.category.id).collect();
        assert_eq!(roots, vec![electronics.id, home.id]);

        let subs: Vec<Uuid> = nested[0].children.iter().map(|n| n.category.id).collect();
        assert_eq!(subs, vec![phones.id, audio.id]);
        assert_eq!(nested[0].children[0].children[0].category.id, smartphones.id);
    }

    #[test]
    fn test_nested_active_only_prunes_archived_subtree() {
        let (mut all, [electronics, _, phones, _, _]) = fixture();
        for c in all.iter_mut().filter(|c| c.id == phones.id) {
            c.status = EntityStatus::Archived;
        }
        let tree = CategoryTree::new(all);

        let nested = tree.nested(true);
        let electronics_node = nested
            .iter()
            .find(|n| n.category.id == electronics.id)
            .unwrap();
        assert_eq!(electronics_node.children.len(), 1);
        assert_eq!(electronics_node.children[0].category.name, "Audio");
    }

    #[test]
    fn test_orphan_is_treated_as_root() {
        let (_, [electronics, _, phones, _, _]) = fixture();
        let tree = CategoryTree::new(vec![phones.clone()]);
        assert_eq!(tree.nested(false)[0].category.id, phones.id);
        assert!(tree.get(&electronics.id).is_none());
    }
}
