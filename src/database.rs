use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{DatabaseError, LookupError};
use crate::series::RankSeries;

/// Every known name and its rank series, keyed by lowercase name.
///
/// Built once from a line source and never mutated afterwards. Names are
/// matched independent of case, so "Eric" and "ERIC" find the same entry.
#[derive(Debug, Default)]
pub struct NameDatabase {
    entries: HashMap<String, Rc<RankSeries>>,
    load_error: Option<DatabaseError>,
}

impl NameDatabase {
    /// Read every record from `reader`, stopping at the first malformed line.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DatabaseError> {
        let mut entries = HashMap::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let series = RankSeries::from_str(&line).map_err(|reason| {
                DatabaseError::MalformedRecord {
                    line: index + 1,
                    reason,
                }
            })?;

            let key = series.name().to_string();
            if entries.insert(key, Rc::new(series)).is_some() {
                log::debug!("line {}: duplicate record replaces earlier entry", index + 1);
            }
        }

        Ok(Self {
            entries,
            load_error: None,
        })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatabaseError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        let database = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "loaded {} names from {}",
            database.len(),
            path.display()
        );
        Ok(database)
    }

    /// Like [`NameDatabase::open`], but a failed load leaves an empty database
    /// that remembers the failure in [`NameDatabase::load_error`].
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        match Self::open(path) {
            Ok(database) => database,
            Err(err) => {
                log::debug!("continuing with an empty database: {}", err);
                Self {
                    entries: HashMap::new(),
                    load_error: Some(err),
                }
            }
        }
    }

    pub fn load_error(&self) -> Option<&DatabaseError> {
        self.load_error.as_ref()
    }

    pub fn lookup(&self, name: &str) -> Result<Rc<RankSeries>, LookupError> {
        let key = name.trim().to_lowercase();
        self.entries
            .get(&key)
            .cloned()
            .ok_or_else(|| LookupError::NameNotFound {
                name: name.trim().to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl FromStr for NameDatabase {
    type Err = DatabaseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::from_reader(source.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use crate::series::{NDECADES, Rank};
    use proptest::prelude::*;

    const SAMPLE: &str = "\
eric 1 2 3 0 0 0 0 0 0 0

Mary 1 1 1 1 1 1 2 5 15 32
sam 58 69 99 131 168 236 278 380 467 408
";

    #[test]
    fn lookup_is_case_insensitive() {
        let db: NameDatabase = SAMPLE.parse().unwrap();
        assert_eq!(db.len(), 3);

        let mary = db.lookup("MARY").unwrap();
        assert_eq!(mary.name(), "mary");
        assert_eq!(mary.rank(9), Rank::Ranked(32));
        assert!(Rc::ptr_eq(&mary, &db.lookup("mary").unwrap()));
    }

    #[test]
    fn lookup_miss_is_not_found() {
        let db: NameDatabase = SAMPLE.parse().unwrap();
        assert_eq!(
            db.lookup("zebulon"),
            Err(LookupError::NameNotFound {
                name: "zebulon".to_string()
            })
        );
    }

    #[test]
    fn first_malformed_record_fails_construction() {
        let source = "eric 1 2 3 0 0 0 0 0 0 0\nbad 1 2\nworse x\n";
        let err = source.parse::<NameDatabase>().unwrap_err();
        match err {
            DatabaseError::MalformedRecord { line, reason } => {
                assert_eq!(line, 2);
                assert_eq!(
                    reason,
                    RecordError::WrongTokenCount {
                        expected: NDECADES,
                        found: 3
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn later_duplicate_replaces_earlier() {
        let db: NameDatabase = "ann 1 1 1 1 1 1 1 1 1 1\nANN 2 2 2 2 2 2 2 2 2 2\n"
            .parse()
            .unwrap();
        assert_eq!(db.len(), 1);
        assert_eq!(db.lookup("ann").unwrap().rank(0), Rank::Ranked(2));
    }

    #[test]
    fn missing_source_leaves_empty_database() {
        let db = NameDatabase::load_or_empty("/definitely/not/here/names-data.txt");
        assert!(db.is_empty());
        assert!(matches!(
            db.load_error(),
            Some(DatabaseError::SourceUnavailable { .. })
        ));
        assert!(db.lookup("eric").is_err());
    }

    #[test]
    fn names_are_sorted() {
        let db: NameDatabase = SAMPLE.parse().unwrap();
        assert_eq!(db.names(), vec!["eric", "mary", "sam"]);
    }

    proptest! {
        #[test]
        fn parsed_ranks_survive_any_casing(
            name in "[a-z]{1,12}",
            upper_mask in proptest::collection::vec(any::<bool>(), 12),
            ranks in proptest::array::uniform10(0u16..=1000),
        ) {
            let line = format!(
                "{} {}",
                name,
                ranks.iter().map(u16::to_string).collect::<Vec<_>>().join(" ")
            );
            let db: NameDatabase = line.parse().unwrap();

            let query: String = name
                .chars()
                .zip(upper_mask.iter().chain(std::iter::repeat(&false)))
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
                .collect();

            let series = db.lookup(&query).unwrap();
            let raw: Vec<u16> = series.ranks().iter().map(|r| r.raw()).collect();
            prop_assert_eq!(raw, ranks.to_vec());
        }

        #[test]
        fn absent_names_are_never_found(query in "[a-z]{1,12}") {
            let db: NameDatabase = SAMPLE.parse().unwrap();
            prop_assume!(!["eric", "mary", "sam"].contains(&query.as_str()));
            let is_not_found = matches!(db.lookup(&query), Err(LookupError::NameNotFound { .. }));
            prop_assert!(is_not_found);
        }
    }
}
