use crate::{
    error::{LandscapeError, Result, ensure_open_range, ensure_positive},
    generate::Gen,
    surface::Point,
};

/// Geometry of one branch. Children derive their own set via [`BranchParams::child`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchParams {
    pub start_point: Point,
    pub length: f64,
    pub angle: f64,
    pub rotation: f64,
    pub segments: u32,
    pub sub_branches_length: f64,
    pub width: f64,
    pub width_reduction_rate: f64,
}

impl BranchParams {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("start_point.x", self.start_point.x),
            ("start_point.y", self.start_point.y),
            ("angle", self.angle),
            ("rotation", self.rotation),
        ] {
            if !value.is_finite() {
                return Err(LandscapeError::InvalidParameter {
                    name,
                    value,
                    range: "finite",
                });
            }
        }
        ensure_positive("length", self.length)?;
        if self.segments == 0 {
            return Err(LandscapeError::InvalidParameter {
                name: "segments",
                value: 0.0,
                range: "[1, inf)",
            });
        }
        ensure_open_range(
            "sub_branches_length",
            self.sub_branches_length,
            0.0,
            1.0,
            "(0, 1)",
        )?;
        ensure_positive("width", self.width)?;
        ensure_open_range(
            "width_reduction_rate",
            self.width_reduction_rate,
            0.0,
            1.0,
            "(0, 1)",
        )
    }

    /// Parameters of the `i`-th child (`1 <= i < segments`).
    ///
    /// Even children turn one way and odd children the other, each by the
    /// parent's rotation plus `delta`.
    #[must_use]
    pub fn child(&self, i: u32, delta: f64) -> BranchParams {
        let turn = self.rotation + delta;
        let rotation = if i % 2 == 0 {
            self.angle + turn
        } else {
            self.angle - turn
        };
        BranchParams {
            start_point: Point::new(
                self.start_point.x,
                self.start_point.y + (self.length / f64::from(self.segments)) * f64::from(i),
            ),
            length: self.length * self.sub_branches_length,
            angle: self.angle,
            rotation,
            segments: self.segments,
            sub_branches_length: self.sub_branches_length,
            width: self.width * (1.0 - self.width_reduction_rate),
            width_reduction_rate: self.width_reduction_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchNode {
    pub params: BranchParams,
    /// Remaining depth: the root carries the bolt's level count, leaves carry 1.
    pub level: u32,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Branch hierarchy of one bolt, stored in depth-first preorder.
#[derive(Debug, Clone, PartialEq)]
pub struct BoltTree {
    nodes: Vec<BranchNode>,
}

impl BoltTree {
    /// Grows the full hierarchy below `root`. Jitter is drawn child by child,
    /// each subtree completing before its next sibling is sampled.
    pub fn grow(root: BranchParams, levels: u32, rng: &mut Gen) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.branch(root, levels.max(1), None, rng);
        tree
    }

    fn branch(&mut self, params: BranchParams, level: u32, parent: Option<usize>, rng: &mut Gen) {
        let index = self.nodes.len();
        self.nodes.push(BranchNode {
            params,
            level,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(index);
        }
        if level <= 1 {
            return;
        }
        let spread = params.rotation * 0.1;
        for i in 1..params.segments {
            let delta = rng.random(-spread, spread, true);
            self.branch(params.child(i, delta), level - 1, Some(index), rng);
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &[BranchNode] {
        &self.nodes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.children.is_empty())
            .count()
    }
}
