//! Scene node

use glam::{Mat4, Quat, Vec3};

use super::{mesh::Mesh, Camera, Light, Transform};
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
    sync::atomic::{AtomicUsize, Ordering},
};

static NEXT_UID: AtomicUsize = AtomicUsize::new(0);

/// A node in the transform tree. A child's transform is relative to its
/// parent; `attach` guarantees each node hangs off exactly one parent.
pub struct SceneNode {
    pub(crate) uid: usize,
    pub(crate) name: Option<String>,
    pub(crate) children: Vec<Rc<RefCell<SceneNode>>>,
    pub(crate) parent: Option<Weak<RefCell<SceneNode>>>,
    pub(crate) transform: Transform,
    pub(crate) mesh: Option<Mesh>,
    pub(crate) camera: Option<Camera>,
    pub(crate) light: Option<Light>,
}

impl SceneNode {
    fn gen_uid() -> usize {
        NEXT_UID.fetch_add(1, Ordering::SeqCst)
    }

    fn bare() -> SceneNode {
        SceneNode {
            uid: Self::gen_uid(),
            name: None,
            children: vec![],
            parent: None,
            transform: Transform::identity(),
            mesh: None,
            camera: None,
            light: None,
        }
    }

    pub fn new_group() -> Rc<RefCell<SceneNode>> {
        Rc::new(RefCell::new(Self::bare()))
    }

    pub fn new_mesh(mesh: Mesh) -> Rc<RefCell<SceneNode>> {
        let mut node = Self::bare();
        node.mesh = Some(mesh);
        Rc::new(RefCell::new(node))
    }

    pub fn new_camera(camera: Camera) -> Rc<RefCell<SceneNode>> {
        let mut node = Self::bare();
        node.camera = Some(camera);
        Rc::new(RefCell::new(node))
    }

    pub fn new_light(light: Light) -> Rc<RefCell<SceneNode>> {
        let mut node = Self::bare();
        node.light = Some(light);
        Rc::new(RefCell::new(node))
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) {
        self.name = Some(name.into());
    }

    pub fn name(&self) -> Option<&String> {
        self.name.as_ref()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.transform.translation = translation;
    }

    pub fn set_yaw(&mut self, radians: f32) {
        self.transform.rotation = Quat::from_rotation_y(radians);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera.replace(camera);
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.mesh.as_ref()
    }

    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn light(&self) -> Option<&Light> {
        self.light.as_ref()
    }

    pub fn light_mut(&mut self) -> Option<&mut Light> {
        self.light.as_mut()
    }

    pub fn children(&self) -> &[Rc<RefCell<SceneNode>>] {
        &self.children
    }

    /// Moves `child` under `parent`, detaching it from any previous parent
    /// first so the graph never aliases a node under two parents.
    pub fn attach(parent: &Rc<RefCell<SceneNode>>, child: Rc<RefCell<SceneNode>>) {
        let previous = child.borrow().parent.as_ref().and_then(Weak::upgrade);
        if let Some(p) = previous {
            if Rc::ptr_eq(&p, parent) {
                return;
            }
            let index = p
                .borrow()
                .children
                .iter()
                .position(|n| Rc::ptr_eq(n, &child))
                .unwrap();
            p.borrow_mut().children.swap_remove(index);
        }
        child.borrow_mut().parent.replace(Rc::downgrade(parent));
        parent.borrow_mut().children.push(child);
    }

    /// Composes transforms up the parent chain into an absolute matrix.
    pub fn world_transform(node: &Rc<RefCell<SceneNode>>) -> Mat4 {
        let local = node.borrow().transform.matrix();
        let parent = node.borrow().parent.as_ref().and_then(Weak::upgrade);
        match parent {
            Some(p) => Self::world_transform(&p) * local,
            None => local,
        }
    }

    pub fn world_position(node: &Rc<RefCell<SceneNode>>) -> Vec3 {
        Self::world_transform(node).w_axis.truncate()
    }
}

impl PartialEq for SceneNode {
    fn eq(&self, other: &SceneNode) -> bool {
        self.uid == other.uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_reparents_without_aliasing() {
        let root = SceneNode::new_group();
        let group = SceneNode::new_group();
        let child = SceneNode::new_group();

        SceneNode::attach(&root, child.clone());
        assert_eq!(root.borrow().children().len(), 1);

        SceneNode::attach(&root, group.clone());
        SceneNode::attach(&group, child.clone());
        // The child moved; it is not left behind under the root.
        assert_eq!(root.borrow().children().len(), 1);
        assert_eq!(group.borrow().children().len(), 1);
    }

    #[test]
    fn attach_to_same_parent_is_a_no_op() {
        let root = SceneNode::new_group();
        let child = SceneNode::new_group();
        SceneNode::attach(&root, child.clone());
        SceneNode::attach(&root, child.clone());
        assert_eq!(root.borrow().children().len(), 1);
    }

    #[test]
    fn world_position_sums_parent_offsets() {
        let root = SceneNode::new_group();
        let group = SceneNode::new_group();
        let leaf = SceneNode::new_group();
        group
            .borrow_mut()
            .set_translation(Vec3::new(0.0, 1.4, -4.3));
        leaf.borrow_mut()
            .set_translation(Vec3::new(1.4, -0.75, 0.0));
        SceneNode::attach(&root, group.clone());
        SceneNode::attach(&group, leaf.clone());
        let p = SceneNode::world_position(&leaf);
        assert!(p.abs_diff_eq(Vec3::new(1.4, 0.65, -4.3), 1e-6));
    }
}
