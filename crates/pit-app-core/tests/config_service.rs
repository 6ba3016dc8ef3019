// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]
use pit_app_core::config::{ConfigError, ConfigService};
use pit_app_core::params::{RunParams, DEFAULT_PARAMS};
use pit_dry_tests::InMemoryConfigStore;

#[test]
fn saved_params_load_back() {
    let store = InMemoryConfigStore::new();
    let service = ConfigService::new(store.clone());
    let mut params = RunParams::default();
    params.optimization.engine = 2;
    params.threads = 4;
    service.save("run", &params).unwrap();

    let loaded: RunParams = service.load("run").unwrap().unwrap();
    assert_eq!(loaded, params);
    assert_eq!((store.save_count(), store.load_count()), (1, 1));
}

#[test]
fn commented_default_file_loads_through_the_service() {
    let store = InMemoryConfigStore::with_entry("defaults", DEFAULT_PARAMS.as_bytes());
    let service = ConfigService::new(store);
    let loaded: Option<RunParams> = service.load("defaults").unwrap();
    assert_eq!(loaded, Some(RunParams::default()));
}

#[test]
fn missing_and_blank_entries_are_none() {
    let store = InMemoryConfigStore::with_entry("blank", b"  \n");
    let service = ConfigService::new(store);
    assert_eq!(service.load::<RunParams>("blank").unwrap(), None);
    assert_eq!(service.load::<RunParams>("absent").unwrap(), None);
}

#[test]
fn store_failures_propagate() {
    let store = InMemoryConfigStore::new();
    store.set_fail_on_load(true);
    let service = ConfigService::new(store);
    assert!(matches!(
        service.load::<RunParams>("run"),
        Err(ConfigError::Other(_))
    ));
}
