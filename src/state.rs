use log::{debug, info, warn};

use crate::diff::describe_change;
use crate::storage::{FILES_KEY, FileMap, Storage, decode_files, encode_files};
use crate::utils::untitled_name;

/// Notes, the open note and the live editor buffer, kept in sync with a
/// single persisted record.
///
/// The buffer is only written back on [`FileStore::save_active`]; switching
/// notes drops unsaved edits.
pub struct FileStore<S: Storage> {
    storage: S,
    files: FileMap,
    active: Option<String>,
    buffer: String,
    // record as last read or written by this session
    synced: Option<String>,
}

impl<S: Storage> FileStore<S> {
    /// Empty store. Call [`FileStore::hydrate`] to load the record.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            files: FileMap::new(),
            active: None,
            buffer: String::new(),
            synced: None,
        }
    }

    /// Builds a store and hydrates it in one go.
    pub fn open(storage: S) -> Self {
        let mut store = Self::new(storage);
        store.hydrate();
        store
    }

    #[cfg(test)]
    pub fn files(&self) -> &FileMap {
        &self.files
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    #[cfg(test)]
    pub fn content(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[cfg(test)]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[cfg(test)]
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Replaces in-memory state with the persisted record. A missing,
    /// unreadable or corrupt record loads as an empty collection.
    pub fn hydrate(&mut self) {
        self.files = self.read_record();
        self.load_first();
        info!("hydrated {} file(s), active {:?}", self.files.len(), self.active);
    }

    /// Adds an empty `Untitled-<n>` note, opens it and persists.
    pub fn create_file(&mut self) -> String {
        let name = untitled_name(&self.files);
        self.files.insert(name.clone(), String::new());
        self.active = Some(name.clone());
        self.buffer.clear();
        self.persist();

        info!("created {:?}", name);
        name
    }

    /// Opens `name`, discarding unsaved buffer edits. Unknown names are ignored.
    pub fn select_file(&mut self, name: &str) -> bool {
        let Some(content) = self.files.get(name) else {
            debug!("select: no file {:?}", name);
            return false;
        };

        if self.has_unsaved_changes() {
            debug!("discarding unsaved edits to {:?}", self.active);
        }

        self.buffer = content.clone();
        self.active = Some(name.to_string());
        debug!("selected {:?}", name);
        true
    }

    pub fn edit_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Adds `line` to the end of the buffer on its own line.
    pub fn append_buffer(&mut self, line: &str) {
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.buffer.push_str(line);
    }

    /// Writes the buffer into the open note and persists the whole
    /// collection. Returns the confirmation to show, or `None` when no note
    /// is open.
    pub fn save_active(&mut self) -> Option<String> {
        let name = self.active.clone()?;

        let previous = self.files.insert(name.clone(), self.buffer.clone());
        info!(
            "saving {:?}: {}",
            name,
            describe_change(previous.as_deref().unwrap_or_default(), &self.buffer)
        );
        self.persist();

        Some(format!("File \"{}\" saved!", name))
    }

    /// Removes `name` and persists. If it was open, the first remaining
    /// note is opened instead, or nothing when none remain.
    pub fn delete_file(&mut self, name: &str) -> bool {
        if self.files.shift_remove(name).is_none() {
            debug!("delete: no file {:?}", name);
            return false;
        }
        self.persist();
        info!("deleted {:?}", name);

        if self.active.as_deref() == Some(name) {
            self.load_first();
        }
        true
    }

    /// Names whose name or content contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&str> {
        let query = query.to_lowercase();
        self.files
            .iter()
            .filter(|(name, content)| {
                name.to_lowercase().contains(&query) || content.to_lowercase().contains(&query)
            })
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// True when the persisted record no longer matches what this session
    /// last read or wrote. Read failures report no change.
    pub fn record_changed_elsewhere(&self) -> bool {
        match self.storage.load(FILES_KEY) {
            Ok(stored) => stored != self.synced,
            Err(e) => {
                debug!("cannot check stored files: {:#}", e);
                false
            }
        }
    }

    pub(crate) fn has_unsaved_changes(&self) -> bool {
        match self.active.as_deref().and_then(|name| self.files.get(name)) {
            Some(saved) => *saved != self.buffer,
            None => false,
        }
    }

    fn load_first(&mut self) {
        match self.files.first() {
            Some((name, content)) => {
                self.active = Some(name.clone());
                self.buffer = content.clone();
            }
            None => {
                self.active = None;
                self.buffer.clear();
            }
        }
    }

    fn read_record(&mut self) -> FileMap {
        let raw = match self.storage.load(FILES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                self.synced = None;
                return FileMap::new();
            }
            Err(e) => {
                warn!("failed to read stored files: {:#}", e);
                return FileMap::new();
            }
        };

        let files = decode_files(&raw).unwrap_or_else(|e| {
            warn!("ignoring corrupt stored files: {:#}", e);
            FileMap::new()
        });
        self.synced = Some(raw);
        files
    }

    fn persist(&mut self) {
        let result = encode_files(&self.files)
            .and_then(|raw| self.storage.save(FILES_KEY, &raw).map(|()| raw));

        match result {
            Ok(raw) => self.synced = Some(raw),
            Err(e) => warn!("failed to persist files: {:#}", e),
        }
    }
}
