use foundation::handles::Handle;

/// Identity of one loaded tileset instance.
///
/// Reloading a layer yields a new handle (new generation), so anything keyed
/// by `TilesetHandle` is implicitly scoped to a single load.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TilesetHandle(pub Handle);

impl TilesetHandle {
    pub fn index(&self) -> u32 {
        self.0.index()
    }

    pub fn generation(&self) -> u32 {
        self.0.generation()
    }
}

impl std::fmt::Display for TilesetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tileset#{}", self.0)
    }
}

/// Which matrix a tileset is positioned through.
///
/// Most tilesets are placed with the engine-level model matrix; some carry
/// their placement in the root tile's transform instead. Writers mirror
/// whichever convention the tileset already uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum MatrixTarget {
    #[default]
    ModelMatrix,
    RootTransform,
}
