//! The per-player personal-best store.
//!
//! # Serialized forms
//!
//! Every record is packed as `compress(record.export_string())`; the
//! packed alphabet is URL-safe base64, so `;` is free to separate chunks.
//!
//! ```text
//! export_string:   encodedName ; chunk₀ ; chunk₁ ; …
//! properties:      sppersonal.<name>.numRecords = N
//!                  sppersonal.<name>.<i>        = chunkᵢ     (0 ≤ i < N)
//! ```
//!
//! # Corrupt input
//!
//! Readers are per-record tolerant: a chunk that fails to inflate or
//! parse, or an index missing from the property store, is logged and
//! skipped. The rest of the store still loads.

use lobbysync_protocol::{compress, decode_text, decompress, encode_text};

use crate::{PropertyStore, RankingType, RecordEntry, RecordError};

/// Namespace of every persisted key.
const KEY_NAMESPACE: &str = "sppersonal";

/// Separates the owner name and the packed records.
const CHUNK_SEPARATOR: char = ';';

/// One player's best records, at most one per (rule, mode, game type).
///
/// Records keep their insertion order; replacing a record keeps its
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonalBestStore {
    player_name: String,
    records: Vec<RecordEntry>,
}

impl PersonalBestStore {
    /// Creates an empty store owned by `player_name`.
    pub fn new(player_name: impl Into<String>) -> Self {
        Self {
            player_name: player_name.into(),
            records: Vec::new(),
        }
    }

    /// Builds a store from [`export_string`](Self::export_string) output.
    pub fn from_exported(s: &str) -> Self {
        let mut store = Self::default();
        store.import_string(s);
        store
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    /// All records, in store order.
    pub fn records(&self) -> &[RecordEntry] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes every record. The owner name stays.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    // -- Queries and upsert -------------------------------------------------

    /// Looks up the record for a key. `None` if there isn't one.
    pub fn get_record(
        &self,
        rule: &str,
        mode: &str,
        game_type: i32,
    ) -> Option<&RecordEntry> {
        self.records.iter().find(|r| r.matches(rule, mode, game_type))
    }

    /// Returns `true` if `candidate` would be accepted by
    /// [`register_record`](Self::register_record). Doesn't mutate.
    pub fn is_new_record(
        &self,
        ranking: RankingType,
        candidate: &RecordEntry,
    ) -> bool {
        match self.get_record(
            &candidate.rule_name,
            &candidate.mode_name,
            candidate.game_type,
        ) {
            Some(existing) => candidate.compare(ranking, existing),
            None => true,
        }
    }

    /// Stores `candidate` if it's the first record for its key or
    /// strictly outranks the existing one.
    ///
    /// Returns `true` if the store changed.
    pub fn register_record(
        &mut self,
        ranking: RankingType,
        candidate: RecordEntry,
    ) -> bool {
        let existing = self.records.iter_mut().find(|r| {
            r.matches(&candidate.rule_name, &candidate.mode_name, candidate.game_type)
        });

        match existing {
            Some(existing) => {
                if !candidate.compare(ranking, existing) {
                    return false;
                }
                tracing::debug!(
                    player = %self.player_name,
                    key = %candidate.key(),
                    "personal best replaced"
                );
                *existing = candidate;
            }
            None => {
                tracing::debug!(
                    player = %self.player_name,
                    key = %candidate.key(),
                    "personal best registered"
                );
                self.records.push(candidate);
            }
        }
        true
    }

    // -- String form ----------------------------------------------------------

    /// Packs every record, `;`-joined, without the owner name.
    ///
    /// # Errors
    /// Propagates a compression failure.
    pub fn export_records(&self) -> Result<String, RecordError> {
        let chunks = self
            .records
            .iter()
            .map(pack)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(chunks.join(";"))
    }

    /// Replaces all records with those packed in `s`.
    ///
    /// Returns how many chunks were skipped as unreadable.
    pub fn import_records(&mut self, s: &str) -> usize {
        self.records.clear();
        let mut skipped = 0;
        for chunk in s.split(CHUNK_SEPARATOR).filter(|c| !c.is_empty()) {
            if !self.push_packed(chunk) {
                skipped += 1;
            }
        }
        skipped
    }

    /// Serializes the owner name and every record into one string.
    ///
    /// # Errors
    /// Propagates a compression failure.
    pub fn export_string(&self) -> Result<String, RecordError> {
        let mut out = encode_text(&self.player_name);
        for record in &self.records {
            out.push(CHUNK_SEPARATOR);
            out.push_str(&pack(record)?);
        }
        Ok(out)
    }

    /// Replaces the owner name and all records with those in `s`.
    ///
    /// Never merges: whatever was in memory before is gone. Returns how
    /// many chunks were skipped as unreadable.
    pub fn import_string(&mut self, s: &str) -> usize {
        let (name, records) = s.split_once(CHUNK_SEPARATOR).unwrap_or((s, ""));
        self.player_name = decode_text(name);
        self.import_records(records)
    }

    // -- Property store -------------------------------------------------------

    /// The key prefix this store persists under, e.g. `sppersonal.alice.`.
    pub fn property_prefix(&self) -> String {
        format!("{KEY_NAMESPACE}.{}.", self.player_name)
    }

    /// Writes the record count and one packed record per index.
    ///
    /// # Errors
    /// Propagates a compression failure; nothing is written in that case.
    pub fn write_properties<P: PropertyStore + ?Sized>(
        &self,
        props: &mut P,
    ) -> Result<(), RecordError> {
        let chunks = self
            .records
            .iter()
            .map(pack)
            .collect::<Result<Vec<_>, _>>()?;

        let prefix = self.property_prefix();
        props.set_property(
            &format!("{prefix}numRecords"),
            chunks.len().to_string(),
        );
        for (i, chunk) in chunks.into_iter().enumerate() {
            props.set_property(&format!("{prefix}{i}"), chunk);
        }
        Ok(())
    }

    /// Replaces all records with those persisted under this store's
    /// prefix.
    ///
    /// Reads the indices below `numRecords` that are actually present, in
    /// index order; a missing or unreadable index is skipped. Returns how
    /// many were skipped. The work is bounded by the keys in `props`, not
    /// by the stored count.
    pub fn read_properties<P: PropertyStore + ?Sized>(
        &mut self,
        props: &P,
    ) -> usize {
        let prefix = self.property_prefix();
        let count =
            usize::try_from(props.int_property(&format!("{prefix}numRecords"), 0)).unwrap_or(0);

        // Only a canonical index after the prefix: another player's name
        // may extend ours, and `+1` or `01` are not keys we write.
        let mut present: Vec<(usize, &str)> = props
            .keys_with_prefix(&prefix)
            .filter_map(|key| {
                let suffix = &key[prefix.len()..];
                let index = suffix.parse::<usize>().ok()?;
                (index < count && index.to_string() == suffix).then_some((index, key))
            })
            .collect();
        present.sort_unstable_by_key(|&(index, _)| index);

        self.records.clear();
        let mut loaded = 0;
        for (_, key) in present {
            if props.property(key).is_some_and(|chunk| self.push_packed(chunk)) {
                loaded += 1;
            }
        }

        let skipped = count.saturating_sub(loaded);
        if skipped > 0 {
            tracing::warn!(
                player = %self.player_name,
                count,
                loaded,
                "personal best indices missing or unreadable, skipped"
            );
        }
        skipped
    }

    /// Unpacks one chunk and appends it. Returns `false` if skipped.
    fn push_packed(&mut self, chunk: &str) -> bool {
        let record = match unpack(chunk) {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!(
                    player = %self.player_name,
                    %error,
                    "unreadable personal best skipped"
                );
                return false;
            }
        };

        // Exports never contain two records for one key, so a duplicate
        // is corruption. The first one read wins.
        if self
            .get_record(&record.rule_name, &record.mode_name, record.game_type)
            .is_some()
        {
            tracing::warn!(
                player = %self.player_name,
                key = %record.key(),
                "duplicate personal best skipped"
            );
            return false;
        }
        self.records.push(record);
        true
    }
}

fn pack(record: &RecordEntry) -> Result<String, RecordError> {
    Ok(compress(&record.export_string())?)
}

fn unpack(chunk: &str) -> Result<RecordEntry, RecordError> {
    RecordEntry::import_string(&decompress(chunk)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Properties, RecordStats};

    fn record(mode: &str, score: i64) -> RecordEntry {
        RecordEntry::new("STANDARD", mode, 0).with_stats(RecordStats {
            score,
            ..RecordStats::default()
        })
    }

    #[test]
    fn test_get_record_absent_is_none() {
        let store = PersonalBestStore::new("alice");
        assert!(store.get_record("STANDARD", "MARATHON", 0).is_none());
    }

    #[test]
    fn test_is_new_record_true_when_no_existing() {
        let store = PersonalBestStore::new("alice");
        assert!(store.is_new_record(RankingType::GenericScore, &record("M", 1)));
    }

    #[test]
    fn test_is_new_record_does_not_mutate() {
        let mut store = PersonalBestStore::new("alice");
        store.register_record(RankingType::GenericScore, record("M", 10));
        let before = store.clone();
        assert!(store.is_new_record(RankingType::GenericScore, &record("M", 20)));
        assert!(!store.is_new_record(RankingType::GenericScore, &record("M", 5)));
        assert_eq!(store, before);
    }

    #[test]
    fn test_register_record_improve_then_worsen() {
        let mut store = PersonalBestStore::new("alice");
        store.register_record(RankingType::GenericScore, record("M", 100));

        assert!(store.register_record(RankingType::GenericScore, record("M", 200)));
        assert!(!store.register_record(RankingType::GenericScore, record("M", 150)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_record("STANDARD", "M", 0).unwrap().stats.score, 200);
    }

    #[test]
    fn test_register_record_replace_keeps_position() {
        let mut store = PersonalBestStore::new("alice");
        store.register_record(RankingType::GenericScore, record("A", 1));
        store.register_record(RankingType::GenericScore, record("B", 1));
        store.register_record(RankingType::GenericScore, record("C", 1));

        assert!(store.register_record(RankingType::GenericScore, record("B", 9)));

        let modes: Vec<&str> =
            store.records().iter().map(|r| r.mode_name.as_str()).collect();
        assert_eq!(modes, ["A", "B", "C"]);
        assert_eq!(store.records()[1].stats.score, 9);
    }

    #[test]
    fn test_register_record_equal_is_rejected() {
        let mut store = PersonalBestStore::new("alice");
        assert!(store.register_record(RankingType::GenericScore, record("M", 100)));
        assert!(!store.register_record(RankingType::GenericScore, record("M", 100)));
    }

    #[test]
    fn test_export_string_empty_store() {
        let store = PersonalBestStore::new("Big Blue");
        let exported = store.export_string().unwrap();
        assert_eq!(exported, "Big+Blue");
        let imported = PersonalBestStore::from_exported(&exported);
        assert_eq!(imported, store);
    }

    #[test]
    fn test_import_string_replaces_existing_records() {
        let mut source = PersonalBestStore::new("alice");
        source.register_record(RankingType::GenericScore, record("A", 1));
        let exported = source.export_string().unwrap();

        let mut target = PersonalBestStore::new("bob");
        target.register_record(RankingType::GenericScore, record("Z", 1));
        target.import_string(&exported);

        assert_eq!(target, source);
    }

    #[test]
    fn test_import_records_skips_corrupt_chunk() {
        let mut store = PersonalBestStore::new("alice");
        store.register_record(RankingType::GenericScore, record("A", 1));
        store.register_record(RankingType::GenericScore, record("B", 2));
        let exported = store.export_records().unwrap();
        let (a, b) = exported.split_once(';').unwrap();
        let tampered = format!("{a};@@corrupt@@;{b}");

        let mut loaded = PersonalBestStore::new("alice");
        assert_eq!(loaded.import_records(&tampered), 1);
        assert_eq!(loaded.records(), store.records());
    }

    #[test]
    fn test_import_records_skips_duplicate_keys() {
        let mut store = PersonalBestStore::new("alice");
        store.register_record(RankingType::GenericScore, record("A", 1));
        let chunk = store.export_records().unwrap();

        let mut loaded = PersonalBestStore::new("alice");
        assert_eq!(loaded.import_records(&format!("{chunk};{chunk}")), 1);
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn test_write_properties_layout() {
        let mut store = PersonalBestStore::new("alice");
        store.register_record(RankingType::GenericScore, record("A", 1));
        store.register_record(RankingType::GenericScore, record("B", 2));

        let mut props = Properties::new();
        store.write_properties(&mut props).unwrap();

        assert_eq!(props.property("sppersonal.alice.numRecords"), Some("2"));
        assert!(props.property("sppersonal.alice.0").is_some());
        assert!(props.property("sppersonal.alice.1").is_some());
        assert!(props.property("sppersonal.alice.2").is_none());
    }

    #[test]
    fn test_read_properties_skips_missing_index() {
        let mut store = PersonalBestStore::new("alice");
        store.register_record(RankingType::GenericScore, record("A", 1));
        store.register_record(RankingType::GenericScore, record("B", 2));
        let mut props = Properties::new();
        store.write_properties(&mut props).unwrap();
        props.remove("sppersonal.alice.0");

        let mut loaded = PersonalBestStore::new("alice");
        assert_eq!(loaded.read_properties(&props), 1);
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.records()[0].mode_name, "B");
    }

    #[test]
    fn test_read_properties_absent_player_yields_empty() {
        let props = Properties::new();
        let mut loaded = PersonalBestStore::new("nobody");
        loaded.register_record(RankingType::GenericScore, record("A", 1));
        assert_eq!(loaded.read_properties(&props), 0);
        assert!(loaded.is_empty());
    }
}
