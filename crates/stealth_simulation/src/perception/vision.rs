//! Vision evaluation: два конуса (primary / peripheral) + occlusion probe
//!
//! Порядок проверок (дешёвые раньше дорогих):
//! 1. вертикальный допуск
//! 2. нулевая дистанция
//! 3. угол + дальность (Primary приоритетнее Peripheral)
//! 4. raycast на препятствия
//! 5. vision factor по дистанции

use bevy::prelude::*;

use super::config::PerceptionConfig;
use crate::math::inverse_lerp;
use crate::physics::SpatialQuery;

/// Дистанция, ниже которой цель считаем совпадающей с глазами
pub const MIN_SIGHT_DISTANCE: f32 = 0.01;

/// Максимальный vision factor периферийного зрения
pub const PERIPHERAL_FACTOR_CAP: f32 = 0.4;

/// Vision factor primary cone на максимальной дальности
pub const PRIMARY_FACTOR_FLOOR: f32 = 0.5;

/// Каким конусом увидели цель
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum VisionCone {
    Primary,
    Peripheral,
}

/// Успешное наблюдение цели
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct VisionSample {
    pub cone: VisionCone,
    pub distance: f32,
    /// Множитель скорости роста awareness
    pub factor: f32,
}

/// Геометрия одного взгляда: глаза → цель
#[derive(Debug, Clone, Copy)]
pub struct Sightline {
    pub eye: Vec3,
    pub forward: Dir3,
    pub target_position: Vec3,
    pub target: Entity,
    /// Наблюдатель (исключается из occlusion probe)
    pub observer: Option<Entity>,
}

/// Проверить видимость цели
///
/// `belongs_to_target` решает, является ли попадание луча самой целью
/// (или её потомком): такие попадания не блокируют взгляд.
pub fn evaluate_vision(
    config: &PerceptionConfig,
    sight: &Sightline,
    geometry: &dyn SpatialQuery,
    belongs_to_target: &dyn Fn(Entity) -> bool,
) -> Option<VisionSample> {
    let to_target = sight.target_position - sight.eye;

    if to_target.y.abs() > config.height_tolerance {
        return None;
    }

    let distance = to_target.length();
    if distance <= MIN_SIGHT_DISTANCE {
        return None;
    }

    let direction = Dir3::new(to_target / distance).ok()?;
    let angle = sight.forward.as_vec3().angle_between(direction.as_vec3()).to_degrees();

    // Primary проверяется первым, Peripheral: только если не Primary
    let in_primary = angle <= config.primary_fov * 0.5 && distance <= config.primary_view_distance;
    let in_peripheral = !in_primary
        && angle <= config.peripheral_fov * 0.5
        && distance <= config.peripheral_view_distance;

    let cone = if in_primary {
        VisionCone::Primary
    } else if in_peripheral {
        VisionCone::Peripheral
    } else {
        return None;
    };

    if let Some(hit) = geometry.cast_ray(sight.eye, direction, distance, sight.observer) {
        let hit_target = hit.entity.is_some_and(|entity| belongs_to_target(entity));
        if !hit_target {
            return None;
        }
    }

    let factor = match cone {
        VisionCone::Primary => {
            let closeness = inverse_lerp(config.primary_view_distance, 0.0, distance);
            PRIMARY_FACTOR_FLOOR.lerp(1.0, closeness)
        }
        VisionCone::Peripheral => {
            let closeness = inverse_lerp(config.peripheral_view_distance, 0.0, distance);
            PERIPHERAL_FACTOR_CAP * closeness
        }
    };

    Some(VisionSample {
        cone,
        distance,
        factor,
    })
}
