use std::collections::HashMap;

/// Name given to the material bound to meshes which don't specify one.
pub const DEFAULT_MATERIAL_NAME: &str = "Material";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Material {
    pub name: String,
}

/// Assigns stable indices to materials, by name, in order of first encounter.
#[derive(Debug, Default, Clone)]
pub struct MaterialRegistry {
    names: HashMap<String, u32>,
    materials: Vec<Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the index of the material named `name`, registering it if it hasn't been seen yet.
    pub fn index_of(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.names.get(name) {
            return index;
        }
        let index = self.push(name);
        self.names.insert(name.to_owned(), index);
        index
    }

    /// Get the index of the default material, creating it on first request.
    ///
    /// The default material is an ordinary entry named [DEFAULT_MATERIAL_NAME], so a host material
    /// of the same name shares its index.
    #[inline]
    pub fn default_material(&mut self) -> u32 {
        self.index_of(DEFAULT_MATERIAL_NAME)
    }

    /// Resolve an optional material name to an index.
    #[inline]
    pub fn resolve(&mut self, name: Option<&str>) -> u32 {
        match name {
            Some(name) => self.index_of(name),
            None => self.default_material(),
        }
    }

    fn push(&mut self, name: &str) -> u32 {
        // material counts are bounded by mesh counts, which are bounded by u32 submesh counts
        let index = self.materials.len() as u32;
        tracing::trace!(index, name, "registering material");
        self.materials.push(Material {
            name: name.to_owned(),
        });
        index
    }

    #[inline]
    pub fn get(&self, index: u32) -> Option<&Material> {
        self.materials.get(index as usize)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Material> {
        self.materials.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_index() {
        let mut reg = MaterialRegistry::new();
        let a = reg.index_of("M1");
        let b = reg.index_of("M2");
        assert_eq!(reg.index_of("M1"), a);
        assert_ne!(a, b);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn default_is_lazy_singleton() {
        let mut reg = MaterialRegistry::new();
        let m = reg.index_of("M1");
        assert_eq!(reg.len(), 1);
        let d = reg.default_material();
        assert_eq!(reg.default_material(), d);
        assert_ne!(d, m);
        assert_eq!(reg.get(d).map(|m| m.name.as_str()), Some(DEFAULT_MATERIAL_NAME));
        assert_eq!(reg.index_of(DEFAULT_MATERIAL_NAME), d);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn default_reuses_registered_name() {
        let mut reg = MaterialRegistry::new();
        let m = reg.index_of(DEFAULT_MATERIAL_NAME);
        assert_eq!(reg.default_material(), m);
        assert_eq!(reg.resolve(None), m);
        assert_eq!(reg.len(), 1);
    }
}
