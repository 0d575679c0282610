//! World transform calculations for SceneGraph

use glam::Mat4;

use crate::types::Pose;

use super::{NodeId, SceneError, SceneGraph};

impl SceneGraph {
    /// Get the world pose of a node
    pub fn get_world_pose(&self, node_id: NodeId) -> Result<Pose, SceneError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(SceneError::NodeNotFound(node_id));
        }

        // Build chain from node up to its root
        let mut chain = Vec::new();
        let mut current = Some(node_id);
        while let Some(id) = current {
            chain.push(id);
            current = self.parent.get(&id).copied();
        }

        // Apply local poses from root to node
        let mut pose = Pose::IDENTITY;
        for id in chain.into_iter().rev() {
            if let Some(node) = self.nodes.get(&id) {
                pose = pose.compose(&node.local);
            }
        }

        Ok(pose)
    }

    /// Get the world transform of a node as a matrix
    pub fn get_world_transform(&self, node_id: NodeId) -> Result<Mat4, SceneError> {
        Ok(self.get_world_pose(node_id)?.to_mat4())
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::scene::SceneService;

    #[test]
    fn test_world_pose_chains_parents() {
        let mut scene = SceneGraph::new();
        let root = scene.create_node("Root", None).unwrap();
        let child = scene.create_node("Child", Some(root)).unwrap();

        scene
            .set_local_pose(
                root,
                Pose::new(
                    Vec3::new(1.0, 0.0, 0.0),
                    Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
                ),
            )
            .unwrap();
        scene
            .set_local_pose(child, Pose::from_position(Vec3::new(0.0, 0.0, 2.0)))
            .unwrap();

        let world = scene.get_world_pose(child).unwrap();
        assert!(world.position.abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5));
        assert!(scene.forward(child).unwrap().abs_diff_eq(Vec3::X, 1e-5));

        let matrix = scene.get_world_transform(child).unwrap();
        assert!(
            matrix
                .transform_point3(Vec3::ZERO)
                .abs_diff_eq(Vec3::new(3.0, 0.0, 0.0), 1e-5)
        );
    }

    #[test]
    fn test_set_world_position_under_rotated_parent() {
        let mut scene = SceneGraph::new();
        let root = scene.create_node("Root", None).unwrap();
        let child = scene.create_node("Child", Some(root)).unwrap();
        scene
            .set_local_pose(
                root,
                Pose::new(Vec3::new(0.0, 5.0, 0.0), Quat::from_rotation_z(1.0)),
            )
            .unwrap();

        let target = Vec3::new(-2.0, 1.0, 4.0);
        scene.set_world_position(child, target).unwrap();
        assert!(scene.world_position(child).unwrap().abs_diff_eq(target, 1e-5));

        let orientation = Quat::from_rotation_x(0.4);
        scene.set_world_orientation(child, orientation).unwrap();
        let world = scene.world_pose(child).unwrap();
        assert!(world.orientation.abs_diff_eq(orientation, 1e-5));
        assert!(world.position.abs_diff_eq(target, 1e-5));
    }

    #[test]
    fn test_world_pose_of_missing_node() {
        let scene = SceneGraph::new();
        let missing = uuid::Uuid::new_v4();
        assert_eq!(
            scene.get_world_pose(missing),
            Err(SceneError::NodeNotFound(missing))
        );
    }
}
