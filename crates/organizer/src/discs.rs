use std::collections::{BTreeSet, HashMap, HashSet};

use common::{AlbumKey, TrackRecord};

#[derive(Debug, Default)]
struct AlbumDiscState {
    discs: BTreeSet<u32>,
    explicit_multi: bool,
}

impl AlbumDiscState {
    fn is_multi_disc(&self) -> bool {
        self.discs.len() > 1 || self.explicit_multi
    }
}

/// Albums that get a `Disc NN` level in their layout.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MultiDiscSet(HashSet<AlbumKey>);

impl MultiDiscSet {
    pub fn contains(&self, key: &AlbumKey) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Accumulates disc observations per album. Observation order never matters:
/// every update is a set insert or a flag raise.
#[derive(Debug, Default)]
pub struct DiscClassifier {
    albums: HashMap<AlbumKey, AlbumDiscState>,
}

impl DiscClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, record: &TrackRecord) {
        let state = self.albums.entry(record.album_key.clone()).or_default();
        state.discs.insert(record.effective_disc());
        if record.disc_count > 1 {
            state.explicit_multi = true;
        }
    }

    pub fn finish(self) -> MultiDiscSet {
        let keys = self
            .albums
            .into_iter()
            .filter(|(_, state)| state.is_multi_disc())
            .map(|(key, _)| key)
            .collect();
        MultiDiscSet(keys)
    }
}

pub fn classify<'a, I>(records: I) -> MultiDiscSet
where
    I: IntoIterator<Item = &'a TrackRecord>,
{
    let mut classifier = DiscClassifier::new();
    for record in records {
        classifier.observe(record);
    }
    classifier.finish()
}
