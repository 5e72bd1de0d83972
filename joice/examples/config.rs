use joice::{Component, ConfigFormat, Loader, Value};
use std::rc::Rc;

struct Mailer {
  sender: String,
  transport: Option<Rc<Transport>>,
}

impl Component for Mailer {
  fn set_property(&mut self, name: &str, value: Value) -> Result<(), String> {
    match name {
      "transport" => {
        self.transport = Some(value.downcast().ok_or("transport must be a Transport")?);
        Ok(())
      }
      other => Err(format!("no property named '{}'", other)),
    }
  }
}

struct Transport {
  host: String,
}

impl Component for Transport {}

const CONTEXT: &str = r#"
objects:
  - id: mailer
    constructor: Mailer
    initialization: eager
    arguments:
      - value: "${mail.sender}"
    properties:
      - name: transport
        object: transport
  - id: transport
    constructor: Transport
    arguments:
      - value: "${mail.host}"
"#;

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .init();

  let mut loader = Loader::new();
  loader.context().register_constructor("Mailer", |arguments| {
    let sender = arguments.first().and_then(Value::as_str).ok_or("Mailer needs a sender")?;
    println!("Creating Mailer for {}...", sender);
    Ok(Mailer {
      sender: sender.to_string(),
      transport: None,
    })
  });
  loader.context().register_constructor("Transport", |arguments| {
    let host = arguments.first().and_then(Value::as_str).ok_or("Transport needs a host")?;
    Ok(Transport { host: host.to_string() })
  });

  // Both fragments are announced before either arrives.
  let config = loader.lease();
  let properties = loader.lease();

  println!("--- Delivering configuration ---");
  let ready = loader.deliver_config(config, ConfigFormat::Yaml, CONTEXT).unwrap();
  println!("Context initialized: {}", ready);

  println!("--- Delivering properties ---");
  let ready = loader
    .deliver_properties(properties, "mail.sender = noreply@example.org\nmail.host = smtp.example.org")
    .unwrap();
  println!("Context initialized: {}", ready);

  let mailer: Rc<Mailer> = loader.context().require("mailer").unwrap().downcast().unwrap();
  let transport = mailer.transport.as_ref().unwrap();
  println!("Mailer {} sends through {}", mailer.sender, transport.host);
  assert_eq!(transport.host, "smtp.example.org");
}
