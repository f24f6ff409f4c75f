//! Directory entities

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::value_objects::{DEPARTMENT_HEAD_ROLE, ReferenceId, ReferenceType, UserId};

/// A person who can create, comment on, or approve contracts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Role code (e.g. `legal`, `finance`, `department_head`)
    pub role: String,
    pub department: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
        department: Option<String>,
    ) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            email: email.into(),
            role: role.into(),
            department,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.eq_ignore_ascii_case(role)
    }

    /// Whether this user heads the given department
    pub fn is_head_of(&self, department: &str) -> bool {
        self.active
            && self.has_role(DEPARTMENT_HEAD_ROLE)
            && self
                .department
                .as_deref()
                .is_some_and(|d| d.eq_ignore_ascii_case(department))
    }
}

/// Generic typed lookup row with optional parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: ReferenceId,
    pub ref_type: ReferenceType,
    pub code: String,
    pub name: String,
    pub parent_id: Option<ReferenceId>,
    pub sort_order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Reference {
    pub fn new(ref_type: ReferenceType, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ReferenceId::generate(),
            ref_type,
            code: code.into(),
            name: name.into(),
            parent_id: None,
            sort_order: 0,
            active: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_parent(mut self, parent_id: ReferenceId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }
}

/// A reference together with its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceNode {
    pub reference: Reference,
    pub children: Vec<ReferenceNode>,
}

/// Build the parent/child hierarchy for a flat list of references.
///
/// Rows whose parent is not in the list become roots. Siblings are ordered by
/// `sort_order`, then by name. Cycles are broken by promoting the first row
/// encountered on the cycle to a root.
pub fn build_reference_tree(references: Vec<Reference>) -> Vec<ReferenceNode> {
    let ids: HashSet<ReferenceId> = references.iter().map(|r| r.id).collect();
    let mut children_of: HashMap<Option<ReferenceId>, Vec<Reference>> = HashMap::new();

    for reference in references {
        let parent = reference
            .parent_id
            .filter(|p| ids.contains(p) && *p != reference.id);
        children_of.entry(parent).or_default().push(reference);
    }

    for siblings in children_of.values_mut() {
        siblings.sort_by(|a, b| {
            a.sort_order
                .cmp(&b.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
    }

    let mut visited = HashSet::new();
    let mut roots = attach(None, &mut children_of, &mut visited);

    // Anything left over sits on a parent cycle; surface it as roots
    let mut leftovers: Vec<Reference> = children_of.into_values().flatten().collect();
    leftovers.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.cmp(&b.name))
    });
    let mut remaining: HashMap<Option<ReferenceId>, Vec<Reference>> = HashMap::new();
    for reference in &leftovers {
        remaining
            .entry(reference.parent_id)
            .or_default()
            .push(reference.clone());
    }
    for reference in leftovers {
        if visited.insert(reference.id) {
            let children = attach(Some(reference.id), &mut remaining, &mut visited);
            roots.push(ReferenceNode {
                reference,
                children,
            });
        }
    }

    roots
}

fn attach(
    parent: Option<ReferenceId>,
    children_of: &mut HashMap<Option<ReferenceId>, Vec<Reference>>,
    visited: &mut HashSet<ReferenceId>,
) -> Vec<ReferenceNode> {
    let Some(children) = children_of.remove(&parent) else {
        return Vec::new();
    };

    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
        if !visited.insert(child.id) {
            continue;
        }
        let grandchildren = attach(Some(child.id), children_of, visited);
        nodes.push(ReferenceNode {
            reference: child,
            children: grandchildren,
        });
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(nodes: &[ReferenceNode]) -> usize {
        nodes.iter().map(|n| 1 + count(&n.children)).sum()
    }

    #[test]
    fn test_department_head_detection() {
        let head = User::new(
            "Ada",
            "ada@example.com",
            "department_head",
            Some("Legal".to_string()),
        );
        assert!(head.is_head_of("legal"));
        assert!(!head.is_head_of("Finance"));

        let mut inactive = head.clone();
        inactive.active = false;
        assert!(!inactive.is_head_of("Legal"));
    }

    #[test]
    fn test_tree_nests_children_and_orders_siblings() {
        let root = Reference::new(ReferenceType::ContractType, "services", "Services");
        let b = Reference::new(ReferenceType::ContractType, "consulting", "Consulting")
            .with_parent(root.id)
            .with_sort_order(2);
        let a = Reference::new(ReferenceType::ContractType, "maintenance", "Maintenance")
            .with_parent(root.id)
            .with_sort_order(1);

        let tree = build_reference_tree(vec![b.clone(), root.clone(), a.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].reference.id, root.id);
        assert_eq!(tree[0].children[0].reference.id, a.id);
        assert_eq!(tree[0].children[1].reference.id, b.id);
    }

    #[test]
    fn test_tree_orphans_become_roots() {
        let orphan = Reference::new(ReferenceType::Department, "ops", "Operations")
            .with_parent(ReferenceId::generate());
        let tree = build_reference_tree(vec![orphan.clone()]);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].reference.id, orphan.id);
    }

    #[test]
    fn test_tree_keeps_every_row_even_with_cycles() {
        let mut a = Reference::new(ReferenceType::Other("x".into()), "a", "A");
        let mut b = Reference::new(ReferenceType::Other("x".into()), "b", "B");
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let c = Reference::new(ReferenceType::Other("x".into()), "c", "C");

        let tree = build_reference_tree(vec![a, b, c]);
        assert_eq!(count(&tree), 3);
    }
}
