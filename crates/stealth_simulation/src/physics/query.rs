//! Spatial queries: ray cast + sphere sweep, ближайшая блокирующая поверхность
//!
//! Используется vision (occlusion probe) и steering (obstacle avoidance).
//! Реализации:
//! - `ObstacleField`: статические spheres + AABB для headless режима (запросы через parry3d)
//! - `RapierProbe` (см. probe.rs): запросы к Rapier query pipeline
//! - `NoGeometry`: пустой мир, probe никогда не попадает

use bevy::prelude::*;
use bevy_rapier3d::rapier::parry::math::{Isometry, Point, Real, Vector};
use bevy_rapier3d::rapier::parry::query::{self, Ray, RayCast, ShapeCastOptions};
use bevy_rapier3d::rapier::parry::shape::{self as parry_shape, Shape};

/// Результат probe: ближайшая блокирующая поверхность
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeHit {
    /// Entity коллайдера (None для анонимной статической геометрии)
    pub entity: Option<Entity>,
    /// Точка контакта (world space)
    pub point: Vec3,
    /// Нормаль поверхности в точке контакта
    pub normal: Vec3,
    /// Дистанция вдоль направления probe
    pub distance: f32,
}

/// Провайдер spatial queries (world geometry, read-only)
pub trait SpatialQuery {
    /// Луч от `origin` вдоль `direction` до `max_distance`
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<ProbeHit>;

    /// Sweep сферы радиуса `radius` от `origin` вдоль `direction`
    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Dir3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<ProbeHit>;
}

/// Пустой мир: probe всегда промахивается
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeometry;

impl SpatialQuery for NoGeometry {
    fn cast_ray(&self, _: Vec3, _: Dir3, _: f32, _: Option<Entity>) -> Option<ProbeHit> {
        None
    }

    fn cast_sphere(&self, _: Vec3, _: f32, _: Dir3, _: f32, _: Option<Entity>) -> Option<ProbeHit> {
        None
    }
}

/// Форма статического препятствия
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum ObstacleShape {
    Sphere { center: Vec3, radius: f32 },
    /// Axis-aligned box
    Cuboid { center: Vec3, half_extents: Vec3 },
}

impl ObstacleShape {
    pub fn center(&self) -> Vec3 {
        match *self {
            ObstacleShape::Sphere { center, .. } | ObstacleShape::Cuboid { center, .. } => center,
        }
    }

    fn isometry(&self) -> Isometry<Real> {
        let center = self.center();
        Isometry::translation(center.x, center.y, center.z)
    }

    /// Parry shape в локальных координатах препятствия
    fn with_parry_shape<R>(&self, f: impl FnOnce(&dyn Shape) -> R) -> R {
        match *self {
            ObstacleShape::Sphere { radius, .. } => f(&parry_shape::Ball::new(radius.max(0.0))),
            ObstacleShape::Cuboid { half_extents, .. } => {
                f(&parry_shape::Cuboid::new(to_vector(half_extents.max(Vec3::ZERO))))
            }
        }
    }
}

/// Препятствие (опционально принадлежит entity: для проверки "попали в цель")
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct Obstacle {
    pub shape: ObstacleShape,
    pub owner: Option<Entity>,
}

/// Headless world geometry (resource)
///
/// Probe, стартующий внутри препятствия, это препятствие не видит
/// (как raycast физических движков, игнорирующий "начальный" коллайдер).
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct ObstacleField {
    pub obstacles: Vec<Obstacle>,
}

impl ObstacleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sphere(mut self, center: Vec3, radius: f32) -> Self {
        self.add(ObstacleShape::Sphere { center, radius }, None);
        self
    }

    pub fn with_cuboid(mut self, center: Vec3, half_extents: Vec3) -> Self {
        self.add(ObstacleShape::Cuboid { center, half_extents }, None);
        self
    }

    pub fn add(&mut self, shape: ObstacleShape, owner: Option<Entity>) {
        self.obstacles.push(Obstacle { shape, owner });
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Ближайшее попадание среди препятствий (кроме принадлежащих `exclude`)
    fn nearest(
        &self,
        exclude: Option<Entity>,
        mut probe: impl FnMut(&ObstacleShape) -> Option<(f32, Vec3, Vec3)>,
    ) -> Option<ProbeHit> {
        self.obstacles
            .iter()
            .filter(|obstacle| exclude.is_none() || obstacle.owner != exclude)
            .filter_map(|obstacle| {
                probe(&obstacle.shape).map(|(distance, point, normal)| ProbeHit {
                    entity: obstacle.owner,
                    point,
                    normal,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

impl SpatialQuery for ObstacleField {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<ProbeHit> {
        let dir = direction.as_vec3();
        let ray = Ray::new(to_point(origin), to_vector(dir));

        self.nearest(exclude, |shape| {
            // solid: луч, стартующий внутри, даёт time_of_impact = 0
            let hit = shape.with_parry_shape(|parry| {
                parry.cast_ray_and_get_normal(&shape.isometry(), &ray, max_distance.max(0.0), true)
            })?;

            (hit.time_of_impact > 0.0).then(|| {
                let distance = hit.time_of_impact;
                (distance, origin + dir * distance, to_vec3(&hit.normal))
            })
        })
    }

    fn cast_sphere(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Dir3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<ProbeHit> {
        if radius <= 0.0 {
            return self.cast_ray(origin, direction, max_distance, exclude);
        }

        let ball = parry_shape::Ball::new(radius);
        let ball_position = Isometry::translation(origin.x, origin.y, origin.z);
        let velocity = to_vector(direction.as_vec3());
        let options = ShapeCastOptions {
            max_time_of_impact: max_distance.max(0.0),
            target_distance: 0.0,
            stop_at_penetration: true,
            compute_impact_geometry_on_penetration: false,
        };

        self.nearest(exclude, |shape| {
            let hit = shape
                .with_parry_shape(|parry| {
                    query::cast_shapes(
                        &ball_position,
                        &velocity,
                        &ball,
                        &shape.isometry(),
                        &Vector::zeros(),
                        parry,
                        options,
                    )
                })
                .ok()
                .flatten()?;

            // Стартуем внутри: time_of_impact = 0
            (hit.time_of_impact > 0.0).then(|| {
                // witness2/normal2 в локальных координатах препятствия (без вращения)
                let point = shape.center() + to_vec3(&hit.witness2.coords);
                (hit.time_of_impact, point, to_vec3(&hit.normal2))
            })
        })
    }
}

fn to_vector(v: Vec3) -> Vector<Real> {
    Vector::new(v.x, v.y, v.z)
}

fn to_point(v: Vec3) -> Point<Real> {
    Point::new(v.x, v.y, v.z)
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}
