use crate::error::Result;
use crate::types::Arrangement;
use std::path::PathBuf;
use uuid::Uuid;

/// Storage port for arrangements. The editing session is handed an
/// implementation at construction; nothing in the core reaches for an
/// ambient store.
pub trait StorageGateway {
    /// `Ok(None)` when the scene has no arrangement yet.
    fn load_arrangement(&self, project_id: Uuid, scene_id: Uuid) -> Result<Option<Arrangement>>;

    fn save_arrangement(
        &self,
        project_id: Uuid,
        scene_id: Uuid,
        arrangement: &Arrangement,
    ) -> Result<()>;
}

// ---------------------------------------------------------------------------
// JsonStore
// ---------------------------------------------------------------------------

/// File-backed gateway: one pretty-printed JSON document per scene at
/// `<root>/<project_id>/<scene_id>.json`.
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn scene_path(&self, project_id: Uuid, scene_id: Uuid) -> PathBuf {
        self.root
            .join(project_id.to_string())
            .join(format!("{scene_id}.json"))
    }
}

impl StorageGateway for JsonStore {
    fn load_arrangement(&self, project_id: Uuid, scene_id: Uuid) -> Result<Option<Arrangement>> {
        let path = self.scene_path(project_id, scene_id);
        let data = match std::fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&data)?))
    }

    fn save_arrangement(
        &self,
        project_id: Uuid,
        scene_id: Uuid,
        arrangement: &Arrangement,
    ) -> Result<()> {
        let path = self.scene_path(project_id, scene_id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(arrangement)?;
        std::fs::write(&path, json)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
