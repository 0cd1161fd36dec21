// To run these tests: SFS_TEST_DATABASE_URL=postgres://... cargo test --features postgres_tests
#![cfg(feature = "postgres_tests")]

//! Relational connector against a live PostgreSQL server

mod common;

use common::{composite_form, entry};
use secure_form_storage::config::{AppConfig, DatabaseConfig, EnvOverrides};
use secure_form_storage::connectors::{DataConnector, DeleteOutcome, ReadOutcome, RelationalConnector};
use secure_form_storage::domain::{DisplayValue, FieldKey, SiteId, SubmittedFields};
use secure_form_storage::SubmissionOrchestrator;

fn database_url() -> String {
    std::env::var("SFS_TEST_DATABASE_URL").expect("SFS_TEST_DATABASE_URL must be set")
}

#[tokio::test]
async fn test_postgres_submission_cycle() {
    let mut form = composite_form("relational");
    form.settings = form.settings.clone().with("secure_database_url", database_url());
    let entry = entry(i64::from(std::process::id()), &form);

    let connector =
        RelationalConnector::new(SiteId::new(1), DatabaseConfig::default(), EnvOverrides::none());
    assert!(connector.init(&form.settings).await.unwrap());
    let report = connector.provision(&form).await.unwrap();
    assert_eq!(report.table, "site_1_form_8");

    let orchestrator = SubmissionOrchestrator::from_config(&AppConfig::default(), EnvOverrides::none());
    let inbound: SubmittedFields = [("input_2_3", "Jane"), ("input_2_4", "Doe")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    orchestrator.before_submission(&form, &inbound).await.unwrap();
    orchestrator.after_submission(&entry, &form).await.unwrap();

    let record = connector.get_record(entry.id).await.unwrap().into_record().unwrap();
    assert_eq!(record.get(&FieldKey::sub_input(2, 3)).unwrap().expose(), "Jane");

    let shown = orchestrator
        .filter_display_value(
            DisplayValue::Single("ufh-gf-secured/2.4".into()),
            &form.fields[0],
            &entry,
            &form,
        )
        .await;
    assert_eq!(shown, DisplayValue::Single("Doe".into()));

    assert_eq!(connector.delete_record(entry.id).await.unwrap(), DeleteOutcome::Deleted(1));
    assert_eq!(connector.get_record(entry.id).await.unwrap(), ReadOutcome::NotFound);
}
