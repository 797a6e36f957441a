use foundation::math::StableF64;
use layers::{LayerId, TileTransform};

/// Identity of the committed transform state of all visible tile layers.
///
/// The live loop only re-runs when this changes, so edits to unrelated
/// layer fields never re-apply unchanged transforms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TransformKey(Vec<(LayerId, StableF64, StableF64)>);

impl TransformKey {
    pub fn from_requests(requests: &[TileTransform]) -> Self {
        Self(
            requests
                .iter()
                .map(|r| {
                    (
                        r.layer_id.clone(),
                        StableF64(r.height_offset),
                        StableF64(r.scale),
                    )
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for TransformKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (id, h, s)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{id}:{}:{}", h.get(), s.get())?;
        }
        Ok(())
    }
}
