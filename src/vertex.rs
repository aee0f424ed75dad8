use nalgebra::{Point2, Point3, Point4, Vector3};

pub type Position = Point3<f32>;
pub type Normal = Vector3<f32>;
pub type Texcoord = Point2<f32>;
pub type Rgba = Point4<f32>;

/// Number of `f32` components in one encoded [Vertex].
pub const VERTEX_COMPONENTS: usize = 14;

/// Size of one encoded [Vertex], in bytes.
pub const VERTEX_STRIDE: usize = VERTEX_COMPONENTS * std::mem::size_of::<f32>();

/// A single entry of the shared vertex buffer.
///
/// Tangent and bitangent are never computed; they are carried as zero so the layout matches what
/// the runtime expects.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Position,
    pub normal: Normal,
    pub tangent: Vector3<f32>,
    pub bitangent: Vector3<f32>,
    pub uv: Texcoord,
}

static_assertions::const_assert_eq!(std::mem::size_of::<Vertex>(), VERTEX_STRIDE);

impl Default for Vertex {
    fn default() -> Self {
        Self {
            position: Position::origin(),
            normal: Normal::zeros(),
            tangent: Vector3::zeros(),
            bitangent: Vector3::zeros(),
            uv: Texcoord::origin(),
        }
    }
}

impl Vertex {
    #[inline]
    pub fn new(position: Position, normal: Normal, uv: Texcoord) -> Self {
        Self {
            position,
            normal,
            uv,
            ..Default::default()
        }
    }

    /// Whether `self` carries exactly the given attributes.
    ///
    /// Only position, normal, and uv take part; f32 values are compared by value, so `-0.0` and
    /// `0.0` are the same attribute while a `NaN` never matches anything.
    #[inline]
    pub fn same_attributes(&self, position: &Position, normal: &Normal, uv: &Texcoord) -> bool {
        self.position == *position && self.normal == *normal && self.uv == *uv
    }

    /// The components of self in file order.
    pub fn components(&self) -> [f32; VERTEX_COMPONENTS] {
        let (p, n, t, b, uv) = (
            &self.position,
            &self.normal,
            &self.tangent,
            &self.bitangent,
            &self.uv,
        );
        [
            p.x, p.y, p.z, n.x, n.y, n.z, t.x, t.y, t.z, b.x, b.y, b.z, uv.x, uv.y,
        ]
    }

    /// Inverse of [Vertex::components].
    pub fn from_components(c: [f32; VERTEX_COMPONENTS]) -> Self {
        Self {
            position: Position::new(c[0], c[1], c[2]),
            normal: Normal::new(c[3], c[4], c[5]),
            tangent: Vector3::new(c[6], c[7], c[8]),
            bitangent: Vector3::new(c[9], c[10], c[11]),
            uv: Texcoord::new(c[12], c[13]),
        }
    }
}
