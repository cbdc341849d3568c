//! Built-in scenes the runtime can drive.

use clap::ValueEnum;
use glam::{Quat, Vec3};
use rigid::{Body, Material, PhysicsError, Shape};

const GROUND_ID: u32 = 0;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// A single sphere dropped onto the ground.
    Drop,
    /// Three boxes stacked under a sphere.
    Stack,
    /// A grid of spheres and boxes raining onto the ground.
    Rain,
}

impl SceneKind {
    /// Creates the bodies for this scene. The ground is always first.
    pub fn build(self) -> Result<Vec<Body>, PhysicsError> {
        let mut bodies = vec![ground()?];
        match self {
            Self::Drop => {
                bodies.push(Body::new(1, Shape::sphere(0.5), 1.0)?.with_position(Vec3::new(0.0, 5.0, 0.0)));
            }
            Self::Stack => {
                for level in 0..3_u8 {
                    let y = 1.0 + f32::from(level) * 1.02;
                    bodies.push(
                        Body::new(u32::from(level) + 1, Shape::cuboid(0.5, 0.5, 0.5), 1.0)?
                            .with_position(Vec3::new(0.0, y, 0.0)),
                    );
                }
                bodies.push(
                    Body::new(4, Shape::sphere(0.4), 0.5)?
                        .with_position(Vec3::new(0.0, 4.0, 0.0))
                        .with_material(Material::bouncy()),
                );
            }
            Self::Rain => {
                let mut id = GROUND_ID + 1;
                for i in 0..5_u8 {
                    for j in 0..5_u8 {
                        let position = Vec3::new(
                            (f32::from(i) - 2.0) * 1.5,
                            3.0 + f32::from(i + j) * 0.6,
                            (f32::from(j) - 2.0) * 1.5,
                        );
                        let body = if (i + j) % 2 == 0 {
                            Body::new(id, Shape::sphere(0.4), 1.0)?
                        } else {
                            Body::new(id, Shape::cuboid(0.4, 0.3, 0.5), 2.0)?
                                .with_rotation(Quat::from_rotation_y(f32::from(i) * 0.3))
                        };
                        bodies.push(body.with_position(position));
                        id += 1;
                    }
                }
            }
        }
        Ok(bodies)
    }
}

fn ground() -> Result<Body, PhysicsError> {
    Body::new(GROUND_ID, Shape::cuboid(10.0, 0.5, 10.0), 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn scenes_have_unique_ids_and_static_ground() {
        for kind in SceneKind::value_variants() {
            let bodies = kind.build().unwrap();
            assert!(!bodies[0].is_movable());
            assert!(bodies[1..].iter().all(Body::is_movable));
            let ids: HashSet<_> = bodies.iter().map(Body::id).collect();
            assert_eq!(ids.len(), bodies.len(), "{kind:?}");
        }
    }
}
