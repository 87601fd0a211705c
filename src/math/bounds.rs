use nalgebra_glm as glm;

/// World-space bounding sphere derived from the scene extents.
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere {
    pub center: glm::Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn from_extents(min: &glm::Vec3, max: &glm::Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            radius: glm::distance(min, max) * 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: glm::Vec3,
    pub direction: glm::Vec3,
}

/// Signed distance from the ray origin to the sphere surface along the ray,
/// negative when the origin is inside the sphere. `None` when the ray misses.
pub fn signed_distance_to_sphere_surface(ray: &Ray, sphere: &BoundingSphere) -> Option<f32> {
    let offset_from_center = sphere.center - ray.origin;
    let to_center_distance = glm::length(&offset_from_center);

    let to_center_along_ray = glm::dot(&offset_from_center, &ray.direction);
    let to_surface_distance = to_center_distance - to_center_along_ray;
    let surface_to_center_along_ray = sphere.radius - to_surface_distance;

    if sphere.radius - to_center_distance + to_center_along_ray < surface_to_center_along_ray {
        return None;
    }

    Some(to_center_along_ray - surface_to_center_along_ray)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extents_produce_centered_sphere() {
        let sphere = BoundingSphere::from_extents(
            &glm::vec3(-10.0, -10.0, -10.0),
            &glm::vec3(10.0, 10.0, 10.0),
        );
        assert!(glm::length(&sphere.center) < 1e-6);
        assert!((sphere.radius - 3.0f32.sqrt() * 10.0).abs() < 1e-4);
    }

    #[test]
    fn origin_inside_sphere_gives_negative_distance() {
        let sphere = BoundingSphere {
            center: glm::Vec3::zeros(),
            radius: 10.0,
        };
        let ray = Ray {
            origin: glm::vec3(0.0, 0.0, -5.0),
            direction: glm::vec3(0.0, 0.0, 1.0),
        };
        let d = signed_distance_to_sphere_surface(&ray, &sphere).unwrap();
        // 5 units past the near surface
        assert!((d - (-5.0)).abs() < 1e-4);
    }

    #[test]
    fn origin_outside_looking_in_gives_positive_distance() {
        let sphere = BoundingSphere {
            center: glm::Vec3::zeros(),
            radius: 10.0,
        };
        let ray = Ray {
            origin: glm::vec3(0.0, 0.0, -25.0),
            direction: glm::vec3(0.0, 0.0, 1.0),
        };
        let d = signed_distance_to_sphere_surface(&ray, &sphere).unwrap();
        // near surface is 15 units ahead
        assert!((d - 15.0).abs() < 1e-4);
    }
}
