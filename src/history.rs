use crate::models::{Category, DailyRecord};
use crate::output::{OutputSink, HISTORY_DIR};
use anyhow::Result;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// In-run cache of loaded history series, keyed by (category, slug).
/// Lives for one assembly pass and is never shared across runs.
#[derive(Debug, Default)]
pub struct HistoryRegistry {
    series: HashMap<(Category, String), Vec<DailyRecord>>,
}

impl HistoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: Category, slug: &str) -> Option<&[DailyRecord]> {
        self.series
            .get(&(category, slug.to_string()))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Every cached series for a category, keyed by slug.
    pub fn category_rollup(&self, category: Category) -> BTreeMap<String, Vec<DailyRecord>> {
        self.series
            .iter()
            .filter(|((cat, _), _)| *cat == category)
            .map(|((_, slug), records)| (slug.clone(), records.clone()))
            .collect()
    }
}

pub struct HistoryStore<'a> {
    sink: &'a OutputSink,
}

impl<'a> HistoryStore<'a> {
    pub fn new(sink: &'a OutputSink) -> Self {
        Self { sink }
    }

    pub fn series_path(category: Category, slug: &str) -> PathBuf {
        PathBuf::from(HISTORY_DIR)
            .join(category.as_str())
            .join(format!("{}.json", slug))
    }

    pub fn rollup_path(category: Category) -> PathBuf {
        PathBuf::from(HISTORY_DIR).join(format!("{}.json", category.as_str()))
    }

    pub fn load(&self, category: Category, slug: &str) -> Result<Vec<DailyRecord>> {
        let series: Option<Vec<DailyRecord>> =
            self.sink.read_json(Self::series_path(category, slug))?;
        Ok(series.unwrap_or_default())
    }

    /// Merges `record` into the series for (category, slug) and persists it immediately.
    pub fn update_history(
        &self,
        category: Category,
        slug: &str,
        record: DailyRecord,
        registry: &mut HistoryRegistry,
    ) -> Result<Vec<DailyRecord>> {
        let key = (category, slug.to_string());
        if !registry.series.contains_key(&key) {
            let loaded = self.load(category, slug)?;
            debug!(
                "Loaded {} history records for {}/{}",
                loaded.len(),
                category,
                slug
            );
            registry.series.insert(key.clone(), loaded);
        }

        let series = registry.series.entry(key).or_default();
        merge_record(series, record);
        self.sink.write_json(Self::series_path(category, slug), &*series)?;
        Ok(series.clone())
    }

    pub fn write_rollup(&self, category: Category, registry: &HistoryRegistry) -> Result<()> {
        let rollup = registry.category_rollup(category);
        self.sink.write_json(Self::rollup_path(category), &rollup)
    }
}

/// Same date as the last record replaces it and a newer date is appended.
/// A backdated record replaces its date or is inserted in date order.
pub fn merge_record(series: &mut Vec<DailyRecord>, record: DailyRecord) {
    match series.last().map(|last| last.date) {
        Some(last) if record.date <= last => {
            match series.binary_search_by_key(&record.date, |existing| existing.date) {
                Ok(idx) => series[idx] = record,
                Err(idx) => series.insert(idx, record),
            }
        }
        _ => series.push(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn record(date: &str, close: Option<f64>) -> DailyRecord {
        DailyRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            close,
            change_pct: None,
        }
    }

    #[test]
    fn same_date_replaces_last_record() {
        let mut series = vec![
            record("2024-01-01", Some(100.0)),
            record("2024-01-02", Some(110.0)),
        ];
        merge_record(&mut series, record("2024-01-02", Some(111.0)));

        assert_eq!(series.len(), 2);
        assert_eq!(series[1].close, Some(111.0));
    }

    #[test]
    fn backdated_record_keeps_dates_unique_and_ordered() {
        let mut series = vec![
            record("2024-01-01", Some(100.0)),
            record("2024-01-03", Some(110.0)),
        ];
        merge_record(&mut series, record("2024-01-01", Some(101.0)));
        merge_record(&mut series, record("2024-01-02", Some(105.0)));

        let dates: Vec<String> = series.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(series[0].close, Some(101.0));
        assert_eq!(series.last().map(|r| r.close), Some(Some(110.0)));
    }

    #[test]
    fn backdated_rerun_does_not_duplicate_persisted_date() {
        let dir = TempDir::new().unwrap();
        let sink = OutputSink::for_project(dir.path());
        sink.write_json(
            HistoryStore::series_path(Category::Markets, "gspc"),
            &vec![
                record("2024-01-01", Some(4700.0)),
                record("2024-01-02", Some(4710.0)),
            ],
        )
        .unwrap();

        let store = HistoryStore::new(&sink);
        let mut registry = HistoryRegistry::new();
        let merged = store
            .update_history(
                Category::Markets,
                "gspc",
                record("2024-01-01", Some(4701.0)),
                &mut registry,
            )
            .unwrap();

        assert_eq!(merged.len(), 2);
        assert!(merged.windows(2).all(|pair| pair[0].date < pair[1].date));
        assert_eq!(merged[0].close, Some(4701.0));
    }

    #[test]
    fn new_date_is_appended() {
        let mut series = vec![record("2024-01-01", Some(100.0))];
        merge_record(&mut series, record("2024-01-02", None));
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].close, None);

        let mut empty = Vec::new();
        merge_record(&mut empty, record("2024-01-02", Some(1.0)));
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn update_history_is_idempotent_for_the_same_day() {
        let dir = TempDir::new().unwrap();
        let sink = OutputSink::for_project(dir.path());
        let store = HistoryStore::new(&sink);
        let mut registry = HistoryRegistry::new();

        let first = store
            .update_history(
                Category::Markets,
                "gspc",
                record("2024-01-02", Some(4700.0)),
                &mut registry,
            )
            .unwrap();
        let second = store
            .update_history(
                Category::Markets,
                "gspc",
                record("2024-01-02", Some(4700.0)),
                &mut registry,
            )
            .unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second.last(), Some(&record("2024-01-02", Some(4700.0))));
    }

    #[test]
    fn loads_persisted_series_and_writes_through_to_every_root() {
        let dir = TempDir::new().unwrap();
        let sink = OutputSink::for_project(dir.path());
        sink.write_json(
            HistoryStore::series_path(Category::Forex, "twd_x"),
            &vec![
                record("2024-01-01", Some(31.0)),
                record("2024-01-02", Some(31.2)),
            ],
        )
        .unwrap();

        let store = HistoryStore::new(&sink);
        let mut registry = HistoryRegistry::new();
        let merged = store
            .update_history(
                Category::Forex,
                "twd_x",
                record("2024-01-03", Some(31.4)),
                &mut registry,
            )
            .unwrap();
        assert_eq!(merged.len(), 3);

        for root in sink.roots() {
            let raw = fs::read_to_string(root.join("history/forex/twd_x.json")).unwrap();
            let on_disk: Vec<DailyRecord> = serde_json::from_str(&raw).unwrap();
            assert_eq!(on_disk, merged);
        }

        store.write_rollup(Category::Forex, &registry).unwrap();
        let rollup: BTreeMap<String, Vec<DailyRecord>> = sink
            .read_json(HistoryStore::rollup_path(Category::Forex))
            .unwrap()
            .unwrap();
        assert_eq!(rollup.get("twd_x"), Some(&merged));
    }

    #[test]
    fn corrupt_series_file_is_not_overwritten() {
        let dir = TempDir::new().unwrap();
        let sink = OutputSink::for_project(dir.path());
        let path = sink.primary_path(HistoryStore::series_path(Category::Crypto, "btc_usd"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let store = HistoryStore::new(&sink);
        let mut registry = HistoryRegistry::new();
        let result = store.update_history(
            Category::Crypto,
            "btc_usd",
            record("2024-01-03", Some(42_000.0)),
            &mut registry,
        );

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "not json");
    }
}
