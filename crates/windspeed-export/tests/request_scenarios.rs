//! End-to-end request scenarios for the windspeed export deployment,
//! hosted through DeploymentHost with an in-memory document library.

use std::sync::Arc;

use depkit_core::{
    Activation, ActivationError, Context, Dataset, Deployment, DeploymentHost, Environment,
    IoType, Payload, RequestError,
};
use serde_json::json;
use sharepoint_bridge::fakes::MemoryDocumentLibrary;
use sharepoint_bridge::SiteUrl;
use tempfile::TempDir;
use windspeed_export::{WindspeedExport, DATASET_FILE, INPUT_FIELDS, OUTPUT_FIELD};

const WINDSPEED_CSV: &str = "\
Datum;Tijd;Parameter;Locatie;Waarde;Verwachting;Eenheid;Windrichting;Windrichting eenheid;Bemonsteringshoogte;Referentievlak;
28-4-2021;13:30:00;Windsnelheid Lucht t.o.v. Mean Sea Level in m/s;Europlatform;8.65;;m/s;19.7;graden;2910;NVT;
28-4-2021;13:40:00;Windsnelheid Lucht t.o.v. Mean Sea Level in m/s;Europlatform;8.86;;m/s;18.3;graden;2910;NVT;
28-4-2021;13:50:00;Windsnelheid Lucht t.o.v. Mean Sea Level in m/s;Europlatform;8.89;;m/s;15.4;graden;2910;NVT;
28-4-2021;14:00:00;Windsnelheid Lucht t.o.v. Mean Sea Level in m/s;Europlatform;8.72;;m/s;13.2;graden;2910;NVT;
";

fn package_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(DATASET_FILE), WINDSPEED_CSV).unwrap();
    dir
}

fn context() -> Context {
    Context::structured("windspeed-export", "v1")
        .with_input_fields(INPUT_FIELDS)
        .with_output_fields([OUTPUT_FIELD])
}

fn site() -> SiteUrl {
    SiteUrl::new("https://contoso.sharepoint.com", "Operations").unwrap()
}

fn sharepoint_env() -> Environment {
    Environment::from_pairs([
        ("SHAREPOINT_BASEURL", "https://contoso.sharepoint.com"),
        ("SHAREPOINT_BASESITE", "Operations"),
        ("AZURE_UID", "svc-export@contoso.com"),
        ("AZURE_PASS", "secret"),
    ])
}

fn host_with(
    dir: &TempDir,
    library: Arc<MemoryDocumentLibrary>,
) -> DeploymentHost<WindspeedExport> {
    let activation = Activation::new(dir.path(), context(), Environment::new()).unwrap();
    let deployment = WindspeedExport::with_storage(activation, site(), library).unwrap();
    DeploymentHost::from_instance(deployment).unwrap()
}

fn target(folder: &str, file: &str) -> Payload {
    Payload::structured([("spFolderpath", json!(folder)), ("spFilename", json!(file))])
}

#[tokio::test]
async fn upload_scenario_reports_status_under_output() {
    let dir = package_dir();
    let library = Arc::new(MemoryDocumentLibrary::new());
    let host = host_with(&dir, library.clone());

    let result = host.dispatch(target("A/B/", "data.csv")).await.unwrap();

    assert_eq!(result.io_type(), IoType::Structured);
    let output = result.field("output").expect("output field");
    assert_eq!(output["status"], json!("uploaded"));
    assert_eq!(
        output["remote_path"],
        json!("/sites/Operations/Shared Documents/A/B/data.csv")
    );
    assert_eq!(output["rows"], json!(4));
    assert_eq!(output["preview"]["data"].as_array().unwrap().len(), 1);

    let stored = library.get(&site(), "A/B", "data.csv").expect("uploaded");
    let round = Dataset::from_reader(stored.as_slice(), b';').unwrap();
    assert_eq!(round.len(), 4);
    assert_eq!(round.columns()[11], "Unnamed: 11");
}

#[tokio::test]
async fn caller_file_name_is_honored() {
    let dir = package_dir();
    let library = Arc::new(MemoryDocumentLibrary::new());
    let host = host_with(&dir, library.clone());

    host.dispatch(target("07 OMM/47 Data Logging/UbiOpsdata/", "rws_windspeed_example.csv"))
        .await
        .unwrap();

    assert!(library
        .get(&site(), "07 OMM/47 Data Logging/UbiOpsdata", "rws_windspeed_example.csv")
        .is_some());
    assert_eq!(library.len(), 1);
}

#[tokio::test]
async fn upload_prefers_payload_dataset() {
    let dir = package_dir();
    let library = Arc::new(MemoryDocumentLibrary::new());
    let host = host_with(&dir, library.clone());

    let input = json!({"columns": ["Waarde"], "index": [0, 1], "data": [[1.5], [2.5]]}).to_string();
    let mut payload = target("A", "small.csv");
    if let Payload::Structured(map) = &mut payload {
        map.insert("input".to_string(), json!(input));
    }

    let result = host.dispatch(payload).await.unwrap();
    assert_eq!(result.field("output").unwrap()["rows"], json!(2));
    assert_eq!(
        library.get(&site(), "A", "small.csv").unwrap(),
        b"Waarde\n1.5\n2.5\n"
    );
}

#[tokio::test]
async fn malformed_payload_dataset_is_a_client_error() {
    let dir = package_dir();
    let host = host_with(&dir, Arc::new(MemoryDocumentLibrary::new()));

    let mut payload = target("A", "bad.csv");
    if let Payload::Structured(map) = &mut payload {
        map.insert("input".to_string(), json!({"columns": ["a"], "data": [[1, 2]]}));
    }
    let err = host.dispatch(payload).await.unwrap_err();
    assert!(matches!(err, RequestError::InvalidField { ref field, .. } if field == "input"));
    assert!(err.is_client_error());
}

#[tokio::test]
async fn missing_declared_field_fails_the_request_only() {
    let dir = package_dir();
    let host = host_with(&dir, Arc::new(MemoryDocumentLibrary::new()));

    let err = host
        .dispatch(Payload::structured([("spFolderpath", json!("A/B/"))]))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::MissingField { ref field } if field == "spFilename"));

    host.dispatch(target("A/B/", "data.csv")).await.unwrap();
}

#[tokio::test]
async fn lowercase_field_names_are_not_accepted() {
    let dir = package_dir();
    let host = host_with(&dir, Arc::new(MemoryDocumentLibrary::new()));

    let payload = Payload::structured([
        ("spfolderpath", json!("A/B/")),
        ("spfilename", json!("data.csv")),
    ]);
    let err = host.dispatch(payload).await.unwrap_err();
    assert!(matches!(err, RequestError::MissingField { .. }));
}

#[tokio::test]
async fn repeated_upload_gives_equal_results() {
    let dir = package_dir();
    let host = host_with(&dir, Arc::new(MemoryDocumentLibrary::new()));

    let first = host.dispatch(target("A/B/", "data.csv")).await.unwrap();
    let second = host.dispatch(target("A/B/", "data.csv")).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn download_parses_remote_dataset() {
    let dir = package_dir();
    let library = Arc::new(MemoryDocumentLibrary::new());
    library.insert(&site(), "A/B", "remote.csv", b"x;y\n1;a\n2;b\n3;c\n");
    let host = host_with(&dir, library);

    let mut payload = target("A/B/", "remote.csv");
    if let Payload::Structured(map) = &mut payload {
        map.insert("action".to_string(), json!("download"));
    }
    let result = host.dispatch(payload).await.unwrap();
    let output = result.field("output").unwrap();
    assert_eq!(output["status"], json!("downloaded"));
    assert_eq!(output["rows"], json!(3));
    assert_eq!(output["columns"], json!(["x", "y"]));
    assert_eq!(output["preview"]["data"], json!([[1, "a"]]));
}

#[tokio::test]
async fn storage_failure_is_scoped_to_one_request() {
    let dir = package_dir();
    let library = Arc::new(MemoryDocumentLibrary::new());
    let host = host_with(&dir, library.clone());

    library.fail_next("503 Service Unavailable");
    let err = host.dispatch(target("A/B/", "data.csv")).await.unwrap_err();
    assert!(matches!(err, RequestError::Storage(ref msg) if msg.contains("503")));
    assert!(!err.is_client_error());

    let ok = host.dispatch(target("A/B/", "data.csv")).await.unwrap();
    assert_eq!(ok.field("output").unwrap()["status"], json!("uploaded"));
    assert_eq!(host.metrics().requests_failed(), 1);
}

#[tokio::test]
async fn download_of_missing_remote_file_fails_the_request() {
    let dir = package_dir();
    let host = host_with(&dir, Arc::new(MemoryDocumentLibrary::new()));

    let mut payload = target("A/B/", "absent.csv");
    if let Payload::Structured(map) = &mut payload {
        map.insert("action".to_string(), json!("download"));
    }
    let err = host.dispatch(payload).await.unwrap_err();
    assert!(matches!(err, RequestError::Storage(ref msg) if msg.contains("not found")));
}

#[tokio::test]
async fn path_separators_in_file_name_are_rejected() {
    let dir = package_dir();
    let library = Arc::new(MemoryDocumentLibrary::new());
    let host = host_with(&dir, library.clone());

    let err = host
        .dispatch(target("A/B/", "../../etc/passwd"))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidField { ref field, .. } if field == "spFilename"));
    assert!(library.is_empty());
}

#[tokio::test]
async fn preview_touches_no_storage() {
    let dir = package_dir();
    let library = Arc::new(MemoryDocumentLibrary::new());
    let host = host_with(&dir, library.clone());

    let mut payload = target("A/B/", "data.csv");
    if let Payload::Structured(map) = &mut payload {
        map.insert("action".to_string(), json!("preview"));
    }
    let result = host.dispatch(payload).await.unwrap();
    let output = result.field("output").unwrap();
    assert_eq!(output["status"], json!("previewed"));
    assert_eq!(output["preview"]["data"][0][4], json!(8.65));
    assert!(library.is_empty());
}

#[test]
fn construct_requires_sharepoint_environment() {
    let dir = package_dir();
    let env = Environment::from_pairs([
        ("SHAREPOINT_BASEURL", "https://contoso.sharepoint.com"),
        ("SHAREPOINT_BASESITE", "Operations"),
        ("AZURE_UID", "svc-export@contoso.com"),
    ]);
    let activation = Activation::new(dir.path(), context(), env).unwrap();
    let err = DeploymentHost::<WindspeedExport>::activate(activation)
        .err()
        .expect("activation must fail");
    assert!(matches!(err, ActivationError::MissingEnvVar { ref name } if name == "AZURE_PASS"));
}

#[test]
fn construct_fails_on_missing_dataset_file() {
    let dir = tempfile::tempdir().unwrap();
    let activation = Activation::new(dir.path(), context(), sharepoint_env()).unwrap();
    let err = WindspeedExport::construct(activation)
        .err()
        .expect("activation must fail");
    match err {
        ActivationError::MissingFile { path } => assert!(path.ends_with(DATASET_FILE)),
        other => panic!("expected MissingFile, got {other:?}"),
    }
}

#[test]
fn construct_rejects_malformed_endpoint() {
    let dir = package_dir();
    let env = sharepoint_env().with_var("SHAREPOINT_BASEURL", "contoso sharepoint");
    let activation = Activation::new(dir.path(), context(), env).unwrap();
    let err = WindspeedExport::construct(activation)
        .err()
        .expect("activation must fail");
    assert!(matches!(err, ActivationError::Storage(_)));
}

#[test]
fn construct_rejects_plain_context() {
    let dir = package_dir();
    let activation =
        Activation::new(dir.path(), Context::plain("windspeed-export", "v1"), sharepoint_env())
            .unwrap();
    let err = WindspeedExport::construct(activation)
        .err()
        .expect("activation must fail");
    assert!(matches!(err, ActivationError::UnsupportedContext(_)));
}

#[test]
fn construct_with_full_environment_is_ready() {
    let dir = package_dir();
    let activation = Activation::new(dir.path(), context(), sharepoint_env()).unwrap();
    let host = DeploymentHost::<WindspeedExport>::activate(activation).unwrap();
    assert_eq!(host.deployment().dataset().len(), 4);
    assert_eq!(
        host.deployment().site().as_str(),
        "https://contoso.sharepoint.com/sites/Operations/"
    );
}

#[tokio::test]
async fn folder_outside_the_library_is_rejected() {
    let dir = package_dir();
    let library = Arc::new(MemoryDocumentLibrary::new());
    let host = host_with(&dir, library.clone());

    let err = host
        .dispatch(target("../../Other/Shared Documents", "data.csv"))
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::InvalidField { ref field, .. } if field == "spFolderpath"));
    assert!(err.is_client_error());
    assert!(library.is_empty());
}
