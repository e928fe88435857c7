//! Minimal built-in backend: explicit Euler, no rotation dynamics, dynamic boxes
//! pushed out of static planes, boxes and heightfields along the axis of least
//! penetration.

use std::collections::BTreeMap;

use glam::{Quat, Vec3};

use super::{BodyHandle, PhysicsBackend, PhysicsError, Shape, Transform};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Kind {
    Static,
    Dynamic { inv_mass: f32 },
}

#[derive(Debug)]
struct Body {
    shape: Shape,
    kind: Kind,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    grounded: bool,
}

#[derive(Clone, Copy, Debug)]
struct Hit {
    normal: Vec3,
    depth: f32,
}

pub struct SimpleWorld {
    gravity: Vec3,
    bodies: BTreeMap<BodyHandle, Body>,
    next_id: u32,
}

impl SimpleWorld {
    /// `gravity` is the downward acceleration magnitude.
    pub fn new(gravity: f32) -> Self {
        Self {
            gravity: Vec3::new(0.0, -gravity, 0.0),
            bodies: BTreeMap::new(),
            next_id: 1,
        }
    }

    fn insert(&mut self, shape: Shape, kind: Kind, position: Vec3) -> BodyHandle {
        let handle = BodyHandle(self.next_id);
        self.next_id += 1;
        self.bodies.insert(
            handle,
            Body {
                shape,
                kind,
                position,
                rotation: Quat::IDENTITY,
                velocity: Vec3::ZERO,
                grounded: false,
            },
        );
        handle
    }

    fn dynamic_mut(&mut self, body: BodyHandle) -> Result<(&mut Body, f32), PhysicsError> {
        let b = self
            .bodies
            .get_mut(&body)
            .ok_or(PhysicsError::UnknownBody(body))?;
        match b.kind {
            Kind::Dynamic { inv_mass } => Ok((b, inv_mass)),
            Kind::Static => Err(PhysicsError::StaticBody(body)),
        }
    }
}

impl PhysicsBackend for SimpleWorld {
    fn create_static_body(
        &mut self,
        shape: Shape,
        position: Vec3,
    ) -> Result<BodyHandle, PhysicsError> {
        shape.validate()?;
        Ok(self.insert(shape, Kind::Static, position))
    }

    fn create_dynamic_body(
        &mut self,
        shape: Shape,
        mass: f32,
        position: Vec3,
    ) -> Result<BodyHandle, PhysicsError> {
        shape.validate()?;
        if !matches!(shape, Shape::Box { .. }) {
            return Err(PhysicsError::InvalidShape(
                "dynamic bodies must be boxes".into(),
            ));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        Ok(self.insert(shape, Kind::Dynamic { inv_mass: 1.0 / mass }, position))
    }

    fn remove_body(&mut self, body: BodyHandle) -> Result<(), PhysicsError> {
        self.bodies
            .remove(&body)
            .map(|_| ())
            .ok_or(PhysicsError::UnknownBody(body))
    }

    fn step(&mut self, dt: f32) {
        let statics: Vec<(Vec3, Shape)> = self
            .bodies
            .values()
            .filter(|b| b.kind == Kind::Static)
            .map(|b| (b.position, b.shape.clone()))
            .collect();

        for body in self.bodies.values_mut() {
            if body.kind == Kind::Static {
                continue;
            }
            let Shape::Box { half_extents } = body.shape else {
                continue;
            };
            body.velocity += self.gravity * dt;
            body.position += body.velocity * dt;
            body.grounded = false;

            for (at, shape) in &statics {
                let hit = match shape {
                    Shape::Plane => plane_hit(body.position, half_extents, *at),
                    Shape::Box { half_extents: other } => {
                        box_hit(body.position, half_extents, *at, *other)
                    }
                    Shape::Heightfield(hf) => {
                        let local = body.position - *at;
                        hf.height_at(local.x, local.z).and_then(|h| {
                            plane_hit(body.position, half_extents, Vec3::new(0.0, h + at.y, 0.0))
                        })
                    }
                };
                if let Some(hit) = hit {
                    body.position += hit.normal * hit.depth;
                    // cancel the velocity component driving into the contact
                    let into = body.velocity.dot(hit.normal);
                    if into < 0.0 {
                        body.velocity -= hit.normal * into;
                    }
                    if hit.normal.y > 0.5 {
                        body.grounded = true;
                    }
                }
            }
        }
    }

    fn transform(&self, body: BodyHandle) -> Option<Transform> {
        self.bodies.get(&body).map(|b| Transform {
            translation: b.position,
            rotation: b.rotation,
        })
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|b| b.velocity)
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> Result<(), PhysicsError> {
        let (b, _) = self.dynamic_mut(body)?;
        b.velocity = velocity;
        Ok(())
    }

    fn set_translation(
        &mut self,
        body: BodyHandle,
        translation: Vec3,
    ) -> Result<(), PhysicsError> {
        let (b, _) = self.dynamic_mut(body)?;
        b.position = translation;
        Ok(())
    }

    fn apply_impulse(&mut self, body: BodyHandle, impulse: Vec3) -> Result<(), PhysicsError> {
        let (b, inv_mass) = self.dynamic_mut(body)?;
        b.velocity += impulse * inv_mass;
        Ok(())
    }

    fn is_grounded(&self, body: BodyHandle) -> bool {
        self.bodies.get(&body).is_some_and(|b| b.grounded)
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

/// Box bottom against a horizontal surface at `surface.y`.
fn plane_hit(center: Vec3, half: Vec3, surface: Vec3) -> Option<Hit> {
    let depth = surface.y - (center.y - half.y);
    (depth > 0.0).then_some(Hit {
        normal: Vec3::Y,
        depth,
    })
}

/// Axis-aligned box against box, pushing `a` out along the shallowest axis.
fn box_hit(a: Vec3, ha: Vec3, b: Vec3, hb: Vec3) -> Option<Hit> {
    let d = a - b;
    let overlap = (ha + hb) - d.abs();
    if overlap.min_element() <= 0.0 {
        return None;
    }
    let sign = |v: f32| if v < 0.0 { -1.0 } else { 1.0 };
    let hit = if overlap.x <= overlap.y && overlap.x <= overlap.z {
        Hit {
            normal: Vec3::new(sign(d.x), 0.0, 0.0),
            depth: overlap.x,
        }
    } else if overlap.y <= overlap.z {
        Hit {
            normal: Vec3::new(0.0, sign(d.y), 0.0),
            depth: overlap.y,
        }
    } else {
        Hit {
            normal: Vec3::new(0.0, 0.0, sign(d.z)),
            depth: overlap.z,
        }
    };
    Some(hit)
}
