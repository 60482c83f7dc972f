//! Property tests: registry format and lifecycle against a reference model.

use filer_core::{
    encode_records, parse_records, ArtifactStatus, FilerError, LoadOptions, Registry,
    RemoveOptions, StoreOptions,
};
use filer_testkit::prelude::*;
use proptest::prelude::*;
use std::fs;

/// Reference state of one artifact.
#[derive(Debug, Clone)]
struct Expected {
    name: String,
    status: ArtifactStatus,
    payload: Vec<u8>,
    present: bool,
}

/// Outcome class of an operation.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Ok,
    NotFound,
    AlreadyExists,
    AlreadySynced,
    InvalidTransition,
    PayloadMissing,
}

fn classify<T>(result: Result<T, FilerError>) -> Outcome {
    match result {
        Ok(_) => Outcome::Ok,
        Err(FilerError::NotFound { .. }) => Outcome::NotFound,
        Err(FilerError::AlreadyExists { .. }) => Outcome::AlreadyExists,
        Err(FilerError::AlreadySynced { .. }) => Outcome::AlreadySynced,
        Err(FilerError::InvalidTransition { .. }) => Outcome::InvalidTransition,
        Err(FilerError::PayloadMissing { .. }) => Outcome::PayloadMissing,
        Err(other) => panic!("unexpected error: {other}"),
    }
}

#[derive(Default)]
struct ModelFiler {
    entries: Vec<Expected>,
}

impl ModelFiler {
    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }

    /// Moves an entry to the end, as a registry rewrite does.
    fn touch(&mut self, index: usize) -> &mut Expected {
        let entry = self.entries.remove(index);
        self.entries.push(entry);
        self.entries.last_mut().unwrap()
    }

    fn apply(&mut self, op: &FilerOperation) -> Outcome {
        match op {
            FilerOperation::Store {
                name,
                payload,
                push,
                overwrite,
            } => {
                if let Some(i) = self.position(name) {
                    if !overwrite {
                        return Outcome::AlreadyExists;
                    }
                    if self.entries[i].status == ArtifactStatus::Synced {
                        return Outcome::InvalidTransition;
                    }
                    self.entries.remove(i);
                }
                let status = if *push {
                    ArtifactStatus::Synced
                } else {
                    ArtifactStatus::Local
                };
                self.entries.push(Expected {
                    name: name.clone(),
                    status,
                    payload: payload.clone(),
                    present: true,
                });
                Outcome::Ok
            }
            FilerOperation::Push { name } => {
                let Some(i) = self.position(name) else {
                    return Outcome::NotFound;
                };
                let entry = &self.entries[i];
                if entry.status == ArtifactStatus::Synced {
                    return Outcome::AlreadySynced;
                }
                if !entry.present {
                    return Outcome::PayloadMissing;
                }
                self.touch(i).status = ArtifactStatus::Synced;
                Outcome::Ok
            }
            FilerOperation::Pull { name } => {
                let Some(i) = self.position(name) else {
                    return Outcome::NotFound;
                };
                let entry = &mut self.entries[i];
                if entry.status == ArtifactStatus::Local {
                    return Outcome::InvalidTransition;
                }
                entry.present = true;
                Outcome::Ok
            }
            FilerOperation::Load { name } => {
                let Some(i) = self.position(name) else {
                    return Outcome::NotFound;
                };
                let entry = &mut self.entries[i];
                if entry.present {
                    Outcome::Ok
                } else if entry.status == ArtifactStatus::Synced {
                    entry.present = true;
                    Outcome::Ok
                } else {
                    Outcome::PayloadMissing
                }
            }
            FilerOperation::DropLocal { name } => {
                if let Some(i) = self.position(name) {
                    self.entries[i].present = false;
                }
                Outcome::Ok
            }
            FilerOperation::Remove { name, .. } => match self.position(name) {
                Some(i) => {
                    self.entries.remove(i);
                    Outcome::Ok
                }
                None => Outcome::NotFound,
            },
        }
    }
}

fn run(fixture: &TestFiler, op: &FilerOperation) -> Outcome {
    match op {
        FilerOperation::Store {
            name,
            payload,
            push,
            overwrite,
        } => classify(fixture.store_bytes(
            payload,
            name,
            StoreOptions::new().push(*push).overwrite(*overwrite),
        )),
        FilerOperation::Push { name } => classify(fixture.push(name)),
        FilerOperation::Pull { name } => classify(fixture.pull(name)),
        FilerOperation::Load { name } => classify(fixture.load_bytes(name, LoadOptions::default())),
        FilerOperation::DropLocal { name } => {
            if let Ok(path) = fixture.local_path(name) {
                let _ = fs::remove_file(path);
            }
            Outcome::Ok
        }
        FilerOperation::Remove {
            name,
            remove_remote,
        } => classify(fixture.remove(name, RemoveOptions::new().remove_remote(*remove_remote))),
    }
}

proptest! {
    #![proptest_config(PropTestConfig::quick().to_proptest_config())]

    #[test]
    fn registry_text_round_trips(records in registry_strategy(12)) {
        let text = encode_records(&records);
        prop_assert_eq!(parse_records(&text).unwrap(), records);
    }

    #[test]
    fn registry_file_round_trips(records in registry_strategy(12)) {
        let dir = tempfile::tempdir().unwrap();
        let registry = Registry::open(&dir.path().join(".drive_registry")).unwrap();
        for record in &records {
            registry.add(record.clone()).unwrap();
        }

        let reopened = Registry::open(registry.path()).unwrap();
        prop_assert_eq!(reopened.list().unwrap(), records);
    }

    #[test]
    fn stored_bytes_load_back(name in artifact_name_strategy(), payload in payload_strategy()) {
        let fixture = TestFiler::drive();
        fixture.store_bytes(&payload, &name, StoreOptions::new()).unwrap();
        prop_assert_eq!(fixture.load_bytes(&name, LoadOptions::default()).unwrap(), payload);
    }

    #[test]
    fn lifecycle_matches_model(ops in operation_sequence_strategy(1, 40)) {
        let fixture = TestFiler::drive();
        let mut model = ModelFiler::default();

        for op in &ops {
            let expected = model.apply(op);
            let actual = run(&fixture, op);
            prop_assert_eq!(actual, expected, "operation {:?}", op);
        }

        let statuses: Vec<_> = model
            .entries
            .iter()
            .map(|e| (e.name.clone(), e.status))
            .collect();
        prop_assert_eq!(fixture.list_status().unwrap(), statuses);

        for entry in &model.entries {
            prop_assert_eq!(fixture.has_local_payload(&entry.name), entry.present);
            if entry.present {
                prop_assert_eq!(
                    fixture.load_bytes(&entry.name, LoadOptions::new().pull(false)).unwrap(),
                    entry.payload.clone()
                );
            }
        }
    }
}
