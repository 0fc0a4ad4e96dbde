use std::path::{Path, PathBuf};

use anyhow::Result;
use log::{debug, error};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher, recommended_watcher};
use tokio::sync::mpsc;

/// Watches the storage directory and reports writes to the record file.
/// Dropping it stops the watch.
pub struct RecordWatcher {
    _watcher: RecommendedWatcher,
}

impl RecordWatcher {
    pub fn spawn(dir: &Path, record: PathBuf) -> Result<(Self, mpsc::Receiver<PathBuf>)> {
        let (tx, rx) = mpsc::channel::<PathBuf>(32);
        let file_name = record.file_name().map(|n| n.to_os_string());

        let mut watcher = recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !is_write(&event.kind) {
                    return;
                }
                for path in event.paths {
                    if path.file_name().map(|n| n.to_os_string()) == file_name {
                        debug!("watch event: {:?}", event.kind);
                        let _ = tx.blocking_send(path);
                    }
                }
            }
            Err(e) => error!("watch error: {:?}", e),
        })?;

        std::fs::create_dir_all(dir)?;
        watcher.watch(dir, RecursiveMode::NonRecursive)?;

        Ok((Self { _watcher: watcher }, rx))
    }
}

fn is_write(kind: &EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FILES_KEY, FileStorage, Storage};
    use notify::event::{AccessKind, CreateKind, ModifyKind};
    use std::time::Duration;
    use tokio::time::timeout;

    #[test]
    fn test_is_write() {
        assert!(is_write(&EventKind::Create(CreateKind::File)));
        assert!(is_write(&EventKind::Modify(ModifyKind::Any)));
        assert!(!is_write(&EventKind::Access(AccessKind::Any)));
    }

    #[tokio::test]
    async fn test_reports_record_write_from_other_session() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let storage = FileStorage::new(dir.path());
        let record = storage.path_for(FILES_KEY);
        let (_watcher, mut rx) = RecordWatcher::spawn(storage.dir(), record.clone())?;

        let mut other = FileStorage::new(dir.path());
        other.save(FILES_KEY, r#"{"Untitled-1":"theirs"}"#)?;

        let path = timeout(Duration::from_secs(5), rx.recv()).await?;
        let name = path.as_deref().and_then(Path::file_name);
        assert_eq!(name, record.file_name());
        Ok(())
    }
}
