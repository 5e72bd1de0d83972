use joice::{Component, ConfigFormat, ConfigurationError, Context, Loader, Value};
use std::fs;
use std::rc::Rc;
use tempfile::tempdir;

// --- Test Fixtures ---

struct Endpoint {
  url: String,
  retries: i64,
}

impl Component for Endpoint {
  fn set_property(&mut self, name: &str, value: Value) -> Result<(), String> {
    match name {
      "retries" => {
        self.retries = value.as_i64().ok_or("retries must be an integer")?;
        Ok(())
      }
      other => Err(format!("no property named '{}'", other)),
    }
  }
}

fn endpoint_context() -> Rc<Context> {
  let context = Rc::new(Context::new());
  context.register_constructor("Endpoint", |arguments| {
    let url = arguments
      .first()
      .and_then(Value::as_str)
      .ok_or("Endpoint needs a url")?;
    Ok(Endpoint {
      url: url.to_string(),
      retries: 0,
    })
  });
  context
}

const ENDPOINT_YAML: &str = r#"
objects:
  - id: endpoint
    constructor: Endpoint
    initialization: eager
    arguments:
      - value: "http://${host}:${port}/api"
    properties:
      - name: retries
        value: 3
"#;

// --- Loader Tests ---

#[test]
fn test_load_files_from_disk() {
  // Arrange
  let dir = tempdir().unwrap();
  let properties = dir.path().join("endpoint.properties");
  let config = dir.path().join("context.yaml");
  fs::write(&properties, "# where the api lives\nhost = example.org\nport = 8080\n").unwrap();
  fs::write(&config, ENDPOINT_YAML).unwrap();

  let context = endpoint_context();
  let mut loader = Loader::with_context(context.clone());

  // Act
  // Each file is delivered as soon as it is read; properties must come
  // first so the configuration can be interpolated.
  assert!(loader.load_file(&properties).unwrap());
  assert!(loader.load_file(&config).unwrap());

  // Assert
  assert!(context.is_initialized());
  let id = context.get_id_for_label("endpoint").unwrap();
  assert!(context.singletons().contains(id));
  let endpoint: Rc<Endpoint> = context.require("endpoint").unwrap().downcast().unwrap();
  assert_eq!(endpoint.url, "http://example.org:8080/api");
  assert_eq!(endpoint.retries, 3);
}

#[test]
fn test_fragments_wait_for_outstanding_leases() {
  // Arrange
  let context = endpoint_context();
  let mut loader = Loader::with_context(context.clone());
  let config_lease = loader.lease();
  let properties_lease = loader.lease();

  // Act
  // The configuration arrives before the properties it refers to.
  let parsed = loader
    .deliver_config(config_lease, ConfigFormat::Yaml, ENDPOINT_YAML)
    .unwrap();
  assert!(!parsed);
  assert!(context.is_empty());

  let parsed = loader
    .deliver_properties(properties_lease, "host=localhost\nport=9000")
    .unwrap();

  // Assert
  assert!(parsed);
  let endpoint: Rc<Endpoint> = context.require("endpoint").unwrap().downcast().unwrap();
  assert_eq!(endpoint.url, "http://localhost:9000/api");
}

#[test]
fn test_late_fragments_extend_an_initialized_context() {
  // Arrange
  let context = endpoint_context();
  let mut loader = Loader::with_context(context.clone());
  let lease = loader.lease();
  loader
    .deliver_properties(lease, "host=example.org\nport=80")
    .unwrap();
  assert!(context.is_initialized());
  assert!(context.is_empty());

  // Act
  let lease = loader.lease();
  let json = r#"{ "objects": [ { "id": "backup", "constructor": "Endpoint",
                  "initialization": "eager",
                  "arguments": [ { "value": "http://${host}/backup" } ] } ] }"#;
  loader.deliver_config(lease, ConfigFormat::Json, json).unwrap();

  // Assert
  let id = context.get_id_for_label("backup").unwrap();
  assert!(context.singletons().contains(id));
}

#[test]
fn test_unreadable_files_return_their_lease() {
  // Arrange
  let dir = tempdir().unwrap();
  let mut loader = Loader::new();

  // Act
  let missing = loader.load_file(&dir.path().join("missing.yaml"));
  let unknown_path = dir.path().join("context.toml");
  fs::write(&unknown_path, "objects = []").unwrap();
  let unknown = loader.load_file(&unknown_path);

  // Assert
  assert!(matches!(missing, Err(ConfigurationError::Io(_))));
  assert!(matches!(unknown, Err(ConfigurationError::Parse(_))));
  assert_eq!(loader.outstanding(), 0);
}

#[test]
fn test_undefined_property_aborts_parsing() {
  // Arrange
  let mut loader = Loader::with_context(endpoint_context());
  let lease = loader.lease();

  // Act
  let result = loader.deliver_config(lease, ConfigFormat::Yaml, ENDPOINT_YAML);

  // Assert
  match result {
    Err(ConfigurationError::UndefinedProperty(key)) => assert_eq!(key, "host"),
    other => panic!("expected an undefined property, got {:?}", other),
  }
  assert!(!loader.context().is_initialized());
}
