use crate::schema::CallRecord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EntitySummary {
    pub entity_id: u64,
    pub entity_name: String,
    pub total_calls: u64,
    pub first_year: i32,
    pub last_year: i32,
    pub states: Vec<String>,
}

impl EntitySummary {
    pub fn years_range(&self) -> String {
        format!("{} - {}", self.first_year, self.last_year)
    }
}

/// Entity id → display name, using the first name seen for each id.
pub fn entity_directory(records: &[CallRecord]) -> BTreeMap<u64, String> {
    let mut names: BTreeMap<u64, Option<String>> = BTreeMap::new();
    for record in records {
        let name = names.entry(record.entity_id).or_insert(None);
        if name.is_none() {
            *name = record.entity_name.clone();
        }
    }
    names
        .into_iter()
        .map(|(id, name)| (id, name.unwrap_or_else(|| id.to_string())))
        .collect()
}

pub fn records_for_entity(records: &[CallRecord], entity_id: u64) -> Vec<&CallRecord> {
    records.iter().filter(|r| r.entity_id == entity_id).collect()
}

pub fn summarize_entity(records: &[CallRecord], entity_id: u64) -> Option<EntitySummary> {
    let matching = records_for_entity(records, entity_id);

    let first_year = matching.iter().map(|r| r.year).min()?;
    let last_year = matching.iter().map(|r| r.year).max()?;

    let entity_name = matching
        .iter()
        .find_map(|r| r.entity_name.clone())
        .unwrap_or_else(|| entity_id.to_string());

    let states: BTreeSet<String> = matching.iter().filter_map(|r| r.state.clone()).collect();

    Some(EntitySummary {
        entity_id,
        entity_name,
        total_calls: matching.iter().map(|r| r.calls).sum(),
        first_year,
        last_year,
        states: states.into_iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(entity_id: u64, name: &str, state: &str, year: i32, month: u32, calls: u64) -> CallRecord {
        CallRecord {
            entity_id,
            entity_name: Some(name.to_string()),
            state: Some(state.to_string()),
            year,
            month,
            calls,
        }
    }

    #[test]
    fn test_entity_directory() {
        let records = vec![
            CallRecord::new(3, 2023, 1, 5),
            named(3, "Acme Plumbing", "TX", 2023, 2, 5),
            named(1, "Bluebird HVAC", "CA", 2023, 1, 5),
            CallRecord::new(9, 2023, 1, 5),
        ];
        let directory = entity_directory(&records);
        assert_eq!(directory.len(), 3);
        assert_eq!(directory[&1], "Bluebird HVAC");
        assert_eq!(directory[&3], "Acme Plumbing");
        assert_eq!(directory[&9], "9");
        assert_eq!(directory.keys().copied().collect::<Vec<_>>(), vec![1, 3, 9]);
    }

    #[test]
    fn test_summarize_entity() {
        let records = vec![
            named(1, "Bluebird HVAC", "CA", 2019, 1, 100),
            named(1, "Bluebird HVAC", "NV", 2021, 5, 50),
            named(1, "Bluebird HVAC", "CA", 2020, 3, 25),
            named(2, "Other", "TX", 2015, 3, 1000),
        ];

        let summary = summarize_entity(&records, 1).unwrap();
        assert_eq!(summary.total_calls, 175);
        assert_eq!(summary.years_range(), "2019 - 2021");
        assert_eq!(summary.states, vec!["CA".to_string(), "NV".to_string()]);
        assert_eq!(summary.entity_name, "Bluebird HVAC");

        assert!(summarize_entity(&records, 42).is_none());
    }
}
