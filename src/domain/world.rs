// Port to the physics engine that owns the local world, plus an in-memory stand-in.

use std::collections::BTreeMap;

pub type BodyId = u64;

/// Fill applied to every ball by the `changeColor` action.
pub const HIGHLIGHT_FILL: &str = "#f19648";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// One per participant; the only kind presence events add or remove.
    Ball,
    /// Static walls around the scene.
    Boundary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub x: f32,
    pub y: f32,
}

impl Default for Gravity {
    fn default() -> Self {
        Self { x: 0.0, y: 1.0 }
    }
}

/// Nothing of the requested kind was left to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyWorld;

/// Operations the presence layer needs from the simulation engine.
///
/// Stepping and rendering stay inside the engine; every method here must be
/// safe to call between frames.
pub trait Simulation {
    fn add_body(&mut self, kind: BodyKind) -> BodyId;
    fn remove_body(&mut self, id: BodyId) -> bool;
    fn body_ids(&self, kind: BodyKind) -> Vec<BodyId>;
    fn gravity(&self) -> Gravity;
    fn set_gravity(&mut self, gravity: Gravity);
    fn set_fill(&mut self, id: BodyId, fill: &str);
}

/// Removes one body of `kind`, or reports that there was none.
///
/// Which body goes is unspecified; callers must not depend on it.
pub fn remove_any<S>(world: &mut S, kind: BodyKind) -> Result<BodyId, EmptyWorld>
where
    S: Simulation + ?Sized,
{
    let id = world.body_ids(kind).pop().ok_or(EmptyWorld)?;
    if world.remove_body(id) {
        Ok(id)
    } else {
        Err(EmptyWorld)
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub kind: BodyKind,
    pub fill: Option<String>,
}

/// Body bookkeeping without physics, for headless clients and tests.
#[derive(Debug, Clone)]
pub struct HeadlessWorld {
    bodies: BTreeMap<BodyId, Body>,
    next_id: BodyId,
    gravity: Gravity,
}

impl Default for HeadlessWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessWorld {
    /// A scene enclosed by four static walls, with default downward gravity.
    pub fn new() -> Self {
        let mut world = Self {
            bodies: BTreeMap::new(),
            next_id: 1,
            gravity: Gravity::default(),
        };
        for _ in 0..4 {
            world.add_body(BodyKind::Boundary);
        }
        world
    }

    pub fn count(&self, kind: BodyKind) -> usize {
        self.bodies.values().filter(|body| body.kind == kind).count()
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }
}

impl Simulation for HeadlessWorld {
    fn add_body(&mut self, kind: BodyKind) -> BodyId {
        let id = self.next_id;
        self.next_id += 1;
        self.bodies.insert(id, Body { kind, fill: None });
        id
    }

    fn remove_body(&mut self, id: BodyId) -> bool {
        self.bodies.remove(&id).is_some()
    }

    fn body_ids(&self, kind: BodyKind) -> Vec<BodyId> {
        self.bodies
            .iter()
            .filter(|(_, body)| body.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    fn gravity(&self) -> Gravity {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Gravity) {
        self.gravity = gravity;
    }

    fn set_fill(&mut self, id: BodyId, fill: &str) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.fill = Some(fill.to_string());
        }
    }
}
