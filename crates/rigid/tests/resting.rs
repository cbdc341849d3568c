use glam::Vec3;
use rigid::{Body, Material, Physics, PhysicsConfig, Shape};

const DT: f32 = 1.0 / 60.0;

fn ground() -> anyhow::Result<Body> {
    Ok(Body::new(1, Shape::cuboid(5.0, 0.5, 5.0), 0.0)?)
}

#[test]
fn sphere_settles_on_box() -> anyhow::Result<()> {
    let mut physics = Physics::new();
    let mut bodies = vec![
        ground()?,
        Body::new(2, Shape::sphere(0.5), 1.0)?.with_position(Vec3::new(0.0, 2.0, 0.0)),
    ];
    for _ in 0..300 {
        physics.step(&mut bodies, DT);
    }

    let ball = &bodies[1];
    let penetration = 1.0 - ball.position().y;
    assert!(penetration < physics.config().margin, "sank: {penetration}");
    assert!(penetration > -0.01, "hovering: {penetration}");
    assert!(ball.linear_velocity().length() < 0.05, "v={}", ball.linear_velocity());

    // Keeps still over another second.
    let settled = ball.position();
    for _ in 0..60 {
        physics.step(&mut bodies, DT);
    }
    assert!((bodies[1].position() - settled).length() < 0.01);
    Ok(())
}

#[test]
fn box_settles_flat_on_box() -> anyhow::Result<()> {
    let mut physics = Physics::new();
    let mut bodies = vec![
        ground()?,
        Body::new(2, Shape::cuboid(0.5, 0.5, 0.5), 1.0)?.with_position(Vec3::new(0.0, 1.5, 0.0)),
    ];
    for _ in 0..300 {
        physics.step(&mut bodies, DT);
    }

    let block = &bodies[1];
    let penetration = 1.0 - block.position().y;
    assert!(penetration < physics.config().margin, "sank: {penetration}");
    assert!(penetration > -0.01, "hovering: {penetration}");
    assert!(block.linear_velocity().length() < 0.05);
    assert!(block.angular_velocity().length() < 0.05);
    assert!(block.rotation().angle_between(glam::Quat::IDENTITY) < 0.05);

    let pair = physics.pair(1.into(), 2.into()).expect("resting pair is tracked");
    assert!(pair.is_touching());
    assert_eq!(pair.manifold().len(), 4);
    Ok(())
}

#[test]
fn bouncy_sphere_rebounds() -> anyhow::Result<()> {
    let mut physics = Physics::new();
    let mut bodies = vec![
        ground()?.with_material(Material::new(0.5, 1.0)),
        Body::new(2, Shape::sphere(0.5), 1.0)?
            .with_position(Vec3::new(0.0, 3.0, 0.0))
            .with_material(Material::bouncy()),
    ];
    let mut rose = false;
    for _ in 0..120 {
        physics.step(&mut bodies, DT);
        rose |= bodies[1].linear_velocity().y > 2.0;
    }
    assert!(rose);
    Ok(())
}

#[test]
fn sphere_rolls_down_tilted_box() -> anyhow::Result<()> {
    let mut physics = Physics::new();
    let ramp = ground()?.with_rotation(glam::Quat::from_rotation_z(0.3));
    let mut bodies = vec![
        ramp,
        Body::new(2, Shape::sphere(0.5), 1.0)?.with_position(Vec3::new(0.0, 1.2, 0.0)),
    ];
    for _ in 0..60 {
        physics.step(&mut bodies, DT);
    }
    // Positive z rotation lifts +x, so the ball heads toward -x.
    assert!(bodies[1].position().x < -0.1);
    assert!(bodies[1].angular_velocity().length() > 0.1);
    Ok(())
}

#[test]
fn box_stack_comes_to_rest() -> anyhow::Result<()> {
    let mut physics = Physics::new();
    let mut bodies = vec![ground()?];
    for level in 1..=5_u8 {
        let y = f32::from(level);
        bodies.push(Body::new(u32::from(level) + 1, Shape::cuboid(0.5, 0.5, 0.5), 1.0)?.with_position(Vec3::new(0.0, y, 0.0)));
    }
    for _ in 0..1800 {
        physics.step(&mut bodies, DT);
    }

    for (level, block) in bodies.iter().enumerate().skip(1) {
        let p = block.position();
        let drift = Vec3::new(p.x, 0.0, p.z).length();
        assert!(drift < 0.01, "box {level} drifted {drift}");
        let rest_height = f32::from(u8::try_from(level)?);
        assert!(p.y > rest_height - 0.05, "box {level} sank to {}", p.y);
        assert!(block.linear_velocity().length() < 0.01, "box {level} v={}", block.linear_velocity());
        assert!(block.angular_velocity().length() < 0.01, "box {level} w={}", block.angular_velocity());
    }
    Ok(())
}

#[test]
fn zero_margin_keeps_one_sphere_contact() -> anyhow::Result<()> {
    let config = PhysicsConfig {
        margin: 0.0,
        ..PhysicsConfig::default()
    };
    let mut physics = Physics::with_config(config)?;
    let mut bodies = vec![
        ground()?,
        Body::new(2, Shape::sphere(0.5), 1.0)?.with_position(Vec3::new(0.0, 2.0, 0.0)),
    ];
    for _ in 0..600 {
        physics.step(&mut bodies, DT);
    }

    let pair = physics.pair(1.into(), 2.into()).expect("resting pair is tracked");
    assert!(pair.is_touching());
    assert_eq!(pair.manifold().len(), 1);
    assert!(pair.manifold().points()[0].normal_impulse > 0.0);
    assert!(bodies[1].linear_velocity().length() < 0.01);
    Ok(())
}

#[test]
fn slippery_box_slides_farther() -> anyhow::Result<()> {
    let mut physics = Physics::new();
    let push = Vec3::new(3.0, 0.0, 0.0);
    let mut bodies = vec![
        ground()?,
        Body::new(2, Shape::cuboid(0.5, 0.5, 0.5), 1.0)?
            .with_position(Vec3::new(-3.0, 1.0, -2.0))
            .with_linear_velocity(push),
        Body::new(3, Shape::cuboid(0.5, 0.5, 0.5), 1.0)?
            .with_position(Vec3::new(-3.0, 1.0, 2.0))
            .with_linear_velocity(push)
            .with_material(Material::slippery()),
    ];
    for _ in 0..60 {
        physics.step(&mut bodies, DT);
    }
    let grippy = bodies[1].position().x;
    let slippery = bodies[2].position().x;
    assert!(slippery > grippy + 0.5, "grippy={grippy} slippery={slippery}");
    assert!(bodies[2].linear_velocity().x > 2.5);
    Ok(())
}
