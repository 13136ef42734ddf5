//! Mass-spring robot topologies.
//!
//! A robot is a fixed, ordered set of point masses connected by springs.
//! Object and spring order is the indexing contract used by forces, losses,
//! and rendering — never reordered after construction.

use gradsim_math::Vec2;
use std::collections::{HashMap, HashSet};

/// A spring connecting two objects by index.
///
/// `actuation == 0.0` makes the spring structural: the controller cannot
/// change its rest length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub object1: usize,
    pub object2: usize,
    pub rest_length: f64,
    pub stiffness: f64,
    pub actuation: f64,
}

/// A mass-spring body: objects (initial positions) plus spring topology.
#[derive(Debug, Clone, Default)]
pub struct Robot {
    pub objects: Vec<Vec2<f64>>,
    pub springs: Vec<Spring>,
}

impl Robot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn n_springs(&self) -> usize {
        self.springs.len()
    }

    /// Append an object at the given position, returning its index.
    pub fn add_object(&mut self, x: f64, y: f64) -> usize {
        self.objects.push(Vec2::new(x, y));
        self.objects.len() - 1
    }

    /// Connect two objects with a spring whose rest length is their current
    /// separation.
    pub fn add_spring(&mut self, a: usize, b: usize, stiffness: f64, actuation: f64) {
        assert!(
            a < self.objects.len() && b < self.objects.len(),
            "spring endpoints {a}, {b} out of range ({} objects)",
            self.objects.len()
        );
        let rest_length = (self.objects[a] - self.objects[b]).norm();
        self.springs.push(Spring {
            object1: a,
            object2: b,
            rest_length,
            stiffness,
            actuation,
        });
    }
}

/// Hand-authored six-object walker: two rows of three masses, fully braced,
/// every spring actuated.
pub fn walker() -> Robot {
    let mut robot = Robot::new();
    robot.add_object(0.2, 0.1);
    robot.add_object(0.3, 0.13);
    robot.add_object(0.4, 0.1);
    robot.add_object(0.2, 0.2);
    robot.add_object(0.3, 0.2);
    robot.add_object(0.4, 0.2);
    let stiffness = 14000.0;
    let actuation = 0.1;
    for (a, b) in [
        (0, 1),
        (1, 2),
        (3, 4),
        (4, 5),
        (0, 3),
        (2, 5),
        (0, 4),
        (1, 4),
        (2, 4),
        (3, 1),
        (5, 1),
    ] {
        robot.add_spring(a, b, stiffness, actuation);
    }
    robot
}

const MESH_PITCH: f64 = 0.05;
const MESH_ORIGIN: f64 = 0.1;
const MESH_STIFFNESS: f64 = 3e4;

/// Mesh-grid builder with O(1) corner de-duplication.
///
/// Grid corners shared between squares map to a single object via a
/// coordinate-keyed index; duplicate springs are skipped, first addition
/// winning (so an actuated edge stays actuated when a later square braces
/// over it).
struct MeshGrid {
    robot: Robot,
    point_ids: HashMap<(i32, i32), usize>,
    spring_pairs: HashSet<(usize, usize)>,
}

impl MeshGrid {
    fn new() -> Self {
        Self {
            robot: Robot::new(),
            point_ids: HashMap::new(),
            spring_pairs: HashSet::new(),
        }
    }

    fn point(&mut self, i: i32, j: i32) -> usize {
        if let Some(&id) = self.point_ids.get(&(i, j)) {
            return id;
        }
        let id = self.robot.add_object(
            f64::from(i) * MESH_PITCH + MESH_ORIGIN,
            f64::from(j) * MESH_PITCH + MESH_ORIGIN,
        );
        self.point_ids.insert((i, j), id);
        id
    }

    fn spring(&mut self, a: usize, b: usize, actuation: f64) {
        let pair = (a.min(b), a.max(b));
        if !self.spring_pairs.insert(pair) {
            return;
        }
        self.robot.add_spring(a, b, MESH_STIFFNESS, actuation);
    }

    /// One unit square with corners
    /// ```text
    /// b d
    /// a c
    /// ```
    /// The two vertical edges carry the square's actuation; the remaining
    /// edges and diagonals are structural.
    fn square(&mut self, i: i32, j: i32, actuation: f64) {
        let a = self.point(i, j);
        let b = self.point(i, j + 1);
        let c = self.point(i + 1, j);
        let d = self.point(i + 1, j + 1);

        self.spring(a, b, actuation);
        self.spring(c, d, actuation);

        for &p in &[a, b, c, d] {
            for &q in &[a, b, c, d] {
                if p != q {
                    self.spring(p, q, 0.0);
                }
            }
        }
    }
}

/// Mesh-grid crawler: twelve squares, the outer legs and lower torso
/// actuated.
pub fn crawler() -> Robot {
    let mut mesh = MeshGrid::new();
    mesh.square(2, 0, 0.15);
    mesh.square(0, 0, 0.15);
    mesh.square(0, 1, 0.15);
    mesh.square(0, 2, 0.0);
    mesh.square(1, 2, 0.0);
    mesh.square(2, 1, 0.15);
    mesh.square(2, 2, 0.0);
    mesh.square(2, 3, 0.0);
    mesh.square(2, 4, 0.0);
    mesh.square(3, 1, 0.0);
    mesh.square(4, 0, 0.15);
    mesh.square(4, 1, 0.15);
    mesh.robot
}
