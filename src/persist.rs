use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::http_cache::app_cache_dir;
use crate::model::MatchRecord;
use crate::view::ViewState;

const STATE_FILE: &str = "view_state.json";
const STATE_VERSION: u32 = 1;

/// The last screen is stored as its share-link query, so a saved state and a
/// pasted link restore through the same path.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StateFile {
    version: u32,
    query: String,
    #[serde(default)]
    saved_at: Option<u64>,
}

pub fn state_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(STATE_FILE))
}

/// Query string of the last saved view, if any.
pub fn load_saved_query(path: &Path) -> Option<String> {
    let raw = fs::read_to_string(path).ok()?;
    let file = serde_json::from_str::<StateFile>(&raw).ok()?;
    if file.version != STATE_VERSION {
        return None;
    }
    Some(file.query)
}

pub fn load_view(path: &Path, matches: &[MatchRecord]) -> Option<ViewState> {
    load_saved_query(path).map(|query| ViewState::from_query(&query, matches))
}

pub fn save_view(path: &Path, view: &ViewState) {
    let Some(dir) = path.parent() else {
        return;
    };
    let _ = fs::create_dir_all(dir);

    let file = StateFile {
        version: STATE_VERSION,
        query: view.to_query(),
        saved_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs()),
    };
    if let Ok(json) = serde_json::to_string(&file) {
        let tmp = path.with_extension("json.tmp");
        if fs::write(&tmp, json).is_ok() {
            let _ = fs::rename(&tmp, path);
        }
    }
}
