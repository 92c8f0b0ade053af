//! WorldProbe: единая точка доступа к world geometry для AI систем
//!
//! Приоритет источников:
//! 1. Rapier context (если RapierPhysicsPlugin подключен)
//! 2. ObstacleField resource (headless симуляция, тесты)
//! 3. NoGeometry (пустой мир)

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::{QueryFilter, RapierContext, ReadRapierContext, ShapeCastOptions};
use bevy_rapier3d::rapier::parry::shape::Ball;

use super::query::{NoGeometry, ObstacleField, ProbeHit, SpatialQuery};

/// Adapter: Rapier query pipeline → SpatialQuery
pub struct RapierProbe<'a>(pub RapierContext<'a>);

impl RapierProbe<'_> {
    fn filter(exclude: Option<Entity>) -> QueryFilter<'static> {
        let filter = QueryFilter::default().exclude_sensors();
        match exclude {
            Some(entity) => filter.exclude_rigid_body(entity).exclude_collider(entity),
            None => filter,
        }
    }
}

impl SpatialQuery for RapierProbe<'_> {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Dir3,
        max_distance: f32,
        exclude: Option<Entity>,
    ) -> Option<ProbeHit> {
        self.0
            .cast_ray_and_get_normal(origin, direction.as_vec3(), max_distance, true, Self::filter(exclude))
            .map(|(entity, intersection)| ProbeHit {
                entity: Some(entity),
                point: intersection.point,
                normal: intersection.normal,
                distance: intersection.time_of_impact,
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
        let ball = Ball::new(radius.max(0.0));
        let options = ShapeCastOptions {
            max_time_of_impact: max_distance,
            target_distance: 0.0,
            stop_at_penetration: false,
            compute_impact_geometry_on_penetration: true,
        };
        let dir = direction.as_vec3();

        self.0
            .cast_shape(origin, Quat::IDENTITY, dir, &ball, options, Self::filter(exclude))
            .map(|(entity, hit)| {
                let distance = hit.time_of_impact;
                let center = origin + dir * distance;
                // normal1 смотрит из сферы (без вращения) в препятствие
                let normal = match hit.details {
                    Some(details) => -details.normal1,
                    None => -dir,
                };
                ProbeHit {
                    entity: Some(entity),
                    point: center - normal * ball.radius,
                    normal,
                    distance,
                }
            })
    }
}

/// SystemParam: выбирает источник геометрии (Rapier → ObstacleField → пусто)
#[derive(SystemParam)]
pub struct WorldProbe<'w, 's> {
    rapier: ReadRapierContext<'w, 's>,
    obstacles: Option<Res<'w, ObstacleField>>,
}

impl WorldProbe<'_, '_> {
    /// Выполнить запросы против активного источника геометрии
    pub fn with<R>(&self, f: impl FnOnce(&dyn SpatialQuery) -> R) -> R {
        if let Ok(context) = self.rapier.single() {
            return f(&RapierProbe(context));
        }

        match self.obstacles.as_deref() {
            Some(field) => f(field),
            None => f(&NoGeometry),
        }
    }
}

/// Helper: является ли `entity` самим `ancestor` или его потомком (по ChildOf цепочке)
///
/// Используется vision occlusion: попадание луча в коллайдер-ребёнка цели
/// (голова, оружие) не считается препятствием.
pub fn is_self_or_descendant(entity: Entity, ancestor: Entity, parents: &Query<&ChildOf>) -> bool {
    let mut current = entity;

    // Ограничение глубины: защита от циклов в битой иерархии
    for _ in 0..64 {
        if current == ancestor {
            return true;
        }
        match parents.get(current) {
            Ok(child_of) => current = child_of.parent(),
            Err(_) => return false,
        }
    }

    false
}
