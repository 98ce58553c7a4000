//! Run loop integration tests
//!
//! A priority list of local repositories drained through the harvester, twice, so the
//! second run exercises the visited ledger.

mod common;

use common::fixtures::{FOO_BUILDER, TRAFFIC_STATE, UTIL};
use common::repo_builder::TestRepo;
use common::{files_in, ingestor_at, ledger_lines};
use reposift::app::harvest::{HarvestLimits, Harvester};
use reposift::scanner::IngestSettings;
use reposift::source::{RepositorySource, StaticSource};
use tempfile::TempDir;

fn priority_list(repos: &[(&TestRepo, &str)]) -> Vec<Box<dyn RepositorySource>> {
    let source = StaticSource::new(repos.iter().map(|(repo, name)| repo.record(name)));
    vec![Box::new(source)]
}

#[tokio::test(flavor = "multi_thread")]
async fn test_second_run_skips_visited_repositories() {
    let builders = TestRepo::new("master");
    builders
        .write("FooBuilder.java", FOO_BUILDER)
        .write("Util.java", UTIL)
        .commit("Initial commit");
    let states = TestRepo::new("main");
    states
        .write("TrafficLightState.java", TRAFFIC_STATE)
        .commit("Initial commit");
    let trunk = TestRepo::new("trunk");
    trunk.write("Util.java", UTIL).commit("Initial commit");

    let library = TempDir::new().unwrap();
    let repos = [
        (&builders, "acme/builders"),
        (&states, "acme/states"),
        (&trunk, "acme/trunk"),
    ];

    let mut first = Harvester::new(
        ingestor_at(library.path(), IngestSettings::default()),
        None,
        HarvestLimits::default(),
    );
    let summary = first.run(priority_list(&repos)).await.unwrap();
    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.no_default_branch, 1);
    assert_eq!(summary.files(), 2);
    assert_eq!(summary.categories["Builder"].files, 1);
    assert_eq!(summary.categories["State"].files, 1);
    drop(first);

    let mut visited = ledger_lines(library.path());
    visited.sort();
    assert_eq!(visited, vec!["acme/builders", "acme/states"]);

    let mut second = Harvester::new(
        ingestor_at(library.path(), IngestSettings::default()),
        None,
        HarvestLimits::default(),
    );
    let summary = second.run(priority_list(&repos)).await.unwrap();
    assert_eq!(summary.already_visited, 2);
    assert_eq!(summary.attempted, 1, "only the unrecorded repository is retried");
    assert_eq!(summary.files(), 0);
    assert_eq!(files_in(&library.path().join("Builder")).len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_repository_limit_counts_attempts() {
    let one = TestRepo::new("master");
    one.write("FooBuilder.java", FOO_BUILDER).commit("Initial commit");
    let two = TestRepo::new("master");
    two.write("FooBuilder.java", FOO_BUILDER).commit("Initial commit");

    let library = TempDir::new().unwrap();
    let limits = HarvestLimits {
        repository_limit: Some(1),
        ..HarvestLimits::default()
    };
    let mut harvester = Harvester::new(
        ingestor_at(library.path(), IngestSettings::default()),
        None,
        limits,
    );

    let summary = harvester
        .run(priority_list(&[(&one, "acme/one"), (&two, "acme/two")]))
        .await
        .unwrap();
    assert_eq!(summary.attempted, 1);
    assert_eq!(ledger_lines(library.path()), vec!["acme/one"]);
}
