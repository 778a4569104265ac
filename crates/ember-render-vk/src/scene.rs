use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use ember_math::{Transform2d, Vec3};

use crate::gpu::GpuDevice;
use crate::mesh::Mesh;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(0);

/// Process-wide unique object identity. Never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A drawable: shared mesh, flat color and placement.
pub struct SceneObject<D: GpuDevice> {
    id: ObjectId,
    pub mesh: Rc<Mesh<D>>,
    pub color: Vec3,
    pub transform: Transform2d,
}

impl<D: GpuDevice> SceneObject<D> {
    pub fn new(mesh: Rc<Mesh<D>>) -> Self {
        Self {
            id: ObjectId::next(),
            mesh,
            color: Vec3::ONE,
            transform: Transform2d::default(),
        }
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }
}
