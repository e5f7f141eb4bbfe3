//! Quadtree spatial partitioning structure
//!
//! Divides 2D space into hierarchical regions for fast bounding-box queries.
//! Each node subdivides into 4 quadrants when element density exceeds a
//! threshold. Elements live in the deepest node that fully contains their
//! bounds; elements outside the world bounds stay in the root.
//!
//! Exempt elements (omnipresent or screen-space) bypass partitioning entirely
//! and are returned by every query.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Bounds, Vec2};

/// Configuration for quadtree behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadtreeConfig {
    /// Region partitioned by the tree
    pub world_bounds: Bounds,

    /// Maximum elements per node before subdivision
    pub max_elements_per_node: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Minimum node size (prevents excessive subdivision)
    pub min_node_size: f32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            world_bounds: Bounds::new(Vec2::new(-8192.0, -8192.0), Vec2::new(8192.0, 8192.0)),
            max_elements_per_node: 8,
            max_depth: 8,
            min_node_size: 1.0,
        }
    }
}

/// Element stored in the quadtree with its bounds
#[derive(Debug, Clone)]
struct QuadtreeElement<T> {
    id: T,
    bounds: Bounds,
}

/// Single node in the quadtree hierarchy
#[derive(Debug, Clone)]
pub struct QuadtreeNode<T> {
    /// Region covered by this node
    pub bounds: Bounds,

    /// Elements held directly by this node
    elements: Vec<QuadtreeElement<T>>,

    /// Child nodes (4 quadrants), None if this is a leaf
    children: Option<Box<[QuadtreeNode<T>; 4]>>,

    /// Depth in the tree (0 = root)
    pub depth: u32,
}

impl<T: Clone + Eq> QuadtreeNode<T> {
    /// Create a new leaf node
    fn new(bounds: Bounds, depth: u32) -> Self {
        Self {
            bounds,
            elements: Vec::new(),
            children: None,
            depth,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Bounds of one quadrant of this node
    ///
    /// Quadrant layout:
    /// 0: -X, -Y (bottom-left)
    /// 1: +X, -Y (bottom-right)
    /// 2: -X, +Y (top-left)
    /// 3: +X, +Y (top-right)
    fn quadrant_bounds(&self, quadrant: usize) -> Bounds {
        let center = self.bounds.center();
        let quarter_extents = self.bounds.extents() * 0.5;
        let x_sign = if quadrant & 1 != 0 { 1.0 } else { -1.0 };
        let y_sign = if quadrant & 2 != 0 { 1.0 } else { -1.0 };
        let child_center = Vec2::new(
            center.x + quarter_extents.x * x_sign,
            center.y + quarter_extents.y * y_sign,
        );
        Bounds::from_center_extents(child_center, quarter_extents)
    }

    /// Quadrant that fully contains `bounds`, if any
    fn quadrant_for(&self, bounds: &Bounds) -> Option<usize> {
        (0..4).find(|&quadrant| self.quadrant_bounds(quadrant).contains_bounds(bounds))
    }

    /// Subdivide this node into 4 children and push down what fits
    fn subdivide(&mut self, config: &QuadtreeConfig) {
        if self.children.is_some() {
            return;
        }

        let depth = self.depth + 1;
        self.children = Some(Box::new([
            Self::new(self.quadrant_bounds(0), depth),
            Self::new(self.quadrant_bounds(1), depth),
            Self::new(self.quadrant_bounds(2), depth),
            Self::new(self.quadrant_bounds(3), depth),
        ]));

        let elements = std::mem::take(&mut self.elements);
        for element in elements {
            self.insert(element, config);
        }
    }

    /// Insert an element into this node or the deepest child containing it
    fn insert(&mut self, element: QuadtreeElement<T>, config: &QuadtreeConfig) {
        if let Some(quadrant) = self.quadrant_for(&element.bounds) {
            if let Some(children) = self.children.as_mut() {
                children[quadrant].insert(element, config);
                return;
            }
        }

        self.elements.push(element);

        let should_subdivide = self.is_leaf()
            && self.elements.len() > config.max_elements_per_node
            && self.depth < config.max_depth
            && self.bounds.extents().x > config.min_node_size;
        if should_subdivide {
            self.subdivide(config);
        }
    }

    /// Remove an element, descending along the path its bounds dictate
    fn remove(&mut self, id: &T, bounds: &Bounds) -> bool {
        if let Some(quadrant) = self.quadrant_for(bounds) {
            if let Some(children) = self.children.as_mut() {
                if children[quadrant].remove(id, bounds) {
                    return true;
                }
            }
        }

        if let Some(index) = self.elements.iter().position(|element| element.id == *id) {
            self.elements.swap_remove(index);
            return true;
        }

        false
    }

    /// Remove an element wherever it is
    fn remove_anywhere(&mut self, id: &T) -> bool {
        if let Some(index) = self.elements.iter().position(|element| element.id == *id) {
            self.elements.swap_remove(index);
            return true;
        }

        self.children
            .as_mut()
            .is_some_and(|children| children.iter_mut().any(|child| child.remove_anywhere(id)))
    }

    /// Collect every element whose bounds intersect `region`
    fn query(&self, region: &Bounds, results: &mut Vec<T>) {
        for element in &self.elements {
            if element.bounds.intersects(region) {
                results.push(element.id.clone());
            }
        }

        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                if child.bounds.intersects(region) {
                    child.query(region, results);
                }
            }
        }
    }

    /// Count total elements in this node and all children
    fn count_elements(&self) -> usize {
        let mut count = self.elements.len();

        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                count += child.count_elements();
            }
        }

        count
    }

    /// Get all leaf nodes (for visualization)
    fn get_all_leaves<'a>(&'a self, leaves: &mut Vec<&'a Self>) {
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.get_all_leaves(leaves);
            }
        } else {
            leaves.push(self);
        }
    }
}

/// Quadtree spatial partitioning structure
#[derive(Debug, Clone)]
pub struct Quadtree<T> {
    /// Root node containing the entire world space
    root: QuadtreeNode<T>,

    /// Configuration
    config: QuadtreeConfig,

    /// Elements exempt from partitioning
    exempt: Vec<T>,

    /// Where each element currently lives: (exempt, bounds)
    index: HashMap<T, (bool, Bounds)>,
}

impl<T: Clone + Eq + Hash> Quadtree<T> {
    /// Create a new empty quadtree
    pub fn new(config: QuadtreeConfig) -> Self {
        Self {
            root: QuadtreeNode::new(config.world_bounds, 0),
            config,
            exempt: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add an element; an element already present is moved to the new placement
    pub fn add_element(&mut self, exempt: bool, bounds_max: Bounds, id: T) {
        if self.index.contains_key(&id) {
            self.detach(&id, None);
        }
        if exempt {
            self.exempt.push(id.clone());
        } else {
            self.root.insert(QuadtreeElement { id: id.clone(), bounds: bounds_max }, &self.config);
        }
        self.index.insert(id, (exempt, bounds_max));
    }

    /// Remove an element; removing an absent element is a no-op
    pub fn remove_element(&mut self, exempt: bool, bounds_max: Bounds, id: &T) {
        self.detach(id, Some((exempt, bounds_max)));
    }

    /// Move an element from its old placement to a new one
    pub fn update_element(
        &mut self,
        old_exempt: bool,
        old_bounds_max: Bounds,
        new_exempt: bool,
        new_bounds_max: Bounds,
        id: T,
    ) {
        self.detach(&id, Some((old_exempt, old_bounds_max)));
        self.add_element(new_exempt, new_bounds_max, id);
    }

    /// Remove using the recorded placement, falling back to the caller's hint
    fn detach(&mut self, id: &T, hint: Option<(bool, Bounds)>) {
        let Some((exempt, bounds)) = self.index.remove(id).or(hint) else {
            return;
        };
        if exempt {
            self.exempt.retain(|element| element != id);
        } else if !self.root.remove(id, &bounds) {
            self.root.remove_anywhere(id);
        }
    }

    /// Elements whose bounds intersect `region`, plus every exempt element
    pub fn query_bounds(&self, region: &Bounds) -> Vec<T> {
        let mut results = self.exempt.clone();
        self.root.query(region, &mut results);
        results
    }

    /// Elements whose bounds contain `point`, plus every exempt element
    pub fn query_point(&self, point: Vec2) -> Vec<T> {
        self.query_bounds(&Bounds::new(point, point))
    }

    /// Exempt elements only
    pub fn exempt_elements(&self) -> &[T] {
        &self.exempt
    }

    /// Whether an element is present
    pub fn contains(&self, id: &T) -> bool {
        self.index.contains_key(id)
    }

    /// Recorded placement of an element
    pub fn placement(&self, id: &T) -> Option<(bool, Bounds)> {
        self.index.get(id).copied()
    }

    /// Iterate every element id
    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.index.keys()
    }

    /// Get total element count, exempt included
    pub fn element_count(&self) -> usize {
        self.exempt.len() + self.root.count_elements()
    }

    /// Get all leaf nodes (for visualization)
    pub fn get_all_leaves(&self) -> Vec<&QuadtreeNode<T>> {
        let mut leaves = Vec::new();
        self.root.get_all_leaves(&mut leaves);
        leaves
    }

    /// Configuration in use
    pub fn config(&self) -> &QuadtreeConfig {
        &self.config
    }

    /// Clear the quadtree
    pub fn clear(&mut self) {
        self.root = QuadtreeNode::new(self.config.world_bounds, 0);
        self.exempt.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn unit_box(x: f32, y: f32) -> Bounds {
        Bounds::from_position_size(Vec2::new(x, y), Vec2::new(1.0, 1.0))
    }

    fn small_config() -> QuadtreeConfig {
        QuadtreeConfig {
            world_bounds: Bounds::new(Vec2::new(-100.0, -100.0), Vec2::new(100.0, 100.0)),
            max_elements_per_node: 4,
            max_depth: 4,
            min_node_size: 1.0,
        }
    }

    #[test]
    fn test_quadtree_basic_insertion() {
        let mut quadtree = Quadtree::new(small_config());
        quadtree.add_element(false, unit_box(0.0, 0.0), 1_u32);
        assert_eq!(quadtree.element_count(), 1);
        assert!(quadtree.contains(&1));
    }

    #[test]
    fn test_quadtree_subdivision() {
        let mut quadtree = Quadtree::new(small_config());
        for id in 0..20_u32 {
            quadtree.add_element(false, unit_box(id as f32 * 4.0 - 40.0, 10.0), id);
        }

        assert_eq!(quadtree.element_count(), 20);
        assert!(!quadtree.root.is_leaf());
        assert!(quadtree.get_all_leaves().len() >= 4);
    }

    #[test]
    fn test_region_query() {
        let mut quadtree = Quadtree::new(small_config());
        quadtree.add_element(false, unit_box(0.0, 0.0), 1_u32);
        quadtree.add_element(false, unit_box(5.0, 0.0), 2);
        quadtree.add_element(false, unit_box(50.0, 0.0), 3);
        quadtree.add_element(true, unit_box(90.0, 90.0), 4);

        let results: HashSet<u32> = quadtree
            .query_bounds(&Bounds::new(Vec2::new(-1.0, -1.0), Vec2::new(10.0, 10.0)))
            .into_iter()
            .collect();
        assert_eq!(results, HashSet::from([1, 2, 4]));

        let at_point: HashSet<u32> = quadtree.query_point(Vec2::new(50.5, 0.5)).into_iter().collect();
        assert_eq!(at_point, HashSet::from([3, 4]));
    }

    #[test]
    fn test_outside_world_bounds_stays_queryable() {
        let mut quadtree = Quadtree::new(small_config());
        quadtree.add_element(false, unit_box(500.0, 500.0), 9_u32);
        assert_eq!(quadtree.query_point(Vec2::new(500.5, 500.5)), vec![9]);
    }

    #[test]
    fn test_update_and_remove() {
        let mut quadtree = Quadtree::new(small_config());
        let old = unit_box(0.0, 0.0);
        let new = unit_box(60.0, 60.0);
        quadtree.add_element(false, old, 7_u32);
        quadtree.update_element(false, old, false, new, 7);

        assert!(quadtree.query_point(Vec2::new(0.5, 0.5)).is_empty());
        assert_eq!(quadtree.query_point(Vec2::new(60.5, 60.5)), vec![7]);

        quadtree.update_element(false, new, true, new, 7);
        assert_eq!(quadtree.exempt_elements(), &[7]);

        quadtree.remove_element(true, new, &7);
        assert_eq!(quadtree.element_count(), 0);

        // removing again is a no-op
        quadtree.remove_element(true, new, &7);
        assert_eq!(quadtree.element_count(), 0);
    }

    #[test]
    fn test_add_existing_moves_element() {
        let mut quadtree = Quadtree::new(small_config());
        quadtree.add_element(false, unit_box(0.0, 0.0), 1_u32);
        quadtree.add_element(false, unit_box(20.0, 20.0), 1);
        assert_eq!(quadtree.element_count(), 1);
        assert!(quadtree.query_point(Vec2::new(0.5, 0.5)).is_empty());
    }

    #[test]
    fn test_randomised_operations_match_brute_force() {
        // deterministic linear congruential sequence keeps the test reproducible
        let mut seed = 0x2545_F491_u64;
        let mut next = move |modulo: u64| {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            (seed >> 33) % modulo
        };

        let mut quadtree = Quadtree::new(small_config());
        let mut truth: HashMap<u32, (bool, Bounds)> = HashMap::new();
        for _ in 0..500 {
            let id = u32::try_from(next(40)).unwrap_or_default();
            let exempt = next(10) == 0;
            let x = next(220) as f32 - 110.0;
            let y = next(220) as f32 - 110.0;
            let bounds = Bounds::from_position_size(Vec2::new(x, y), Vec2::new(next(8) as f32 + 0.5, 2.0));
            match (next(3), truth.get(&id).copied()) {
                (0, Some((old_exempt, old_bounds))) => {
                    quadtree.remove_element(old_exempt, old_bounds, &id);
                    truth.remove(&id);
                }
                (1, Some((old_exempt, old_bounds))) => {
                    quadtree.update_element(old_exempt, old_bounds, exempt, bounds, id);
                    truth.insert(id, (exempt, bounds));
                }
                _ => {
                    quadtree.add_element(exempt, bounds, id);
                    truth.insert(id, (exempt, bounds));
                }
            }
        }

        let region = Bounds::new(Vec2::new(-30.0, -30.0), Vec2::new(45.0, 20.0));
        let expected: HashSet<u32> = truth
            .iter()
            .filter(|(_, (exempt, bounds))| *exempt || bounds.intersects(&region))
            .map(|(id, _)| *id)
            .collect();
        let actual: Vec<u32> = quadtree.query_bounds(&region);
        assert_eq!(actual.len(), expected.len());
        assert_eq!(actual.into_iter().collect::<HashSet<_>>(), expected);
        assert_eq!(quadtree.element_count(), truth.len());
    }
}
