use super::raw::{ConfigFragment, InitializationRaw, ObjectRaw, ObjectRefRaw, PropertyRaw};
use crate::context::Context;
use crate::error::ConfigurationError;
use crate::properties::{Interpolator, Properties};
use crate::registry::{ARRAY, OBJECT};
use crate::spec::{InitPolicy, ObjectSpecification, PropertySpec, SpecRef, SINGLETON};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

const ANONYMOUS: &str = "<anonymous>";

/// Turns configuration fragments into specifications and registers them.
///
/// Labels are remembered across fragments: a reference to a label defined in
/// an earlier fragment, or registered with the context directly, resolves to
/// that specification. Within one fragment, objects may be referenced before
/// they are defined.
pub struct ContextConfiguration {
  context: Rc<Context>,
  interpolator: Interpolator,
  specs: HashMap<String, SpecRef>,
  // Labels in the order they were first seen, which is the order they are
  // registered in.
  order: Vec<String>,
  // Registered specifications the current fragment defines again.
  redefined: Vec<SpecRef>,
}

impl ContextConfiguration {
  pub fn new(context: Rc<Context>) -> Self {
    Self {
      context,
      interpolator: Interpolator::default(),
      specs: HashMap::new(),
      order: Vec::new(),
      redefined: Vec::new(),
    }
  }

  pub fn context(&self) -> &Rc<Context> {
    &self.context
  }

  /// Makes `properties` available to `${name}` references in later fragments.
  pub fn add_properties(&mut self, properties: &Properties) {
    self.interpolator.add_properties(properties);
  }

  /// Parses one fragment and registers everything it defines.
  ///
  /// Every label seen so far must have a definition by the end of the
  /// fragment, otherwise nothing from this fragment is registered.
  pub fn parse_config(&mut self, fragment: ConfigFragment) -> Result<(), ConfigurationError> {
    self.redefined.clear();
    let mut anonymous = Vec::new();
    for object in fragment.objects {
      let spec = self.parse_object(object)?;
      if spec.name().is_none() {
        anonymous.push(spec);
      }
    }

    for label in &self.order {
      if self.specs[label].borrow().constructor.is_none() {
        return Err(ConfigurationError::MissingDefinition(label.clone()));
      }
    }

    for label in &self.order {
      self.context.add_specification(&self.specs[label])?;
    }
    for spec in &anonymous {
      self.context.add_specification(spec)?;
    }
    for spec in std::mem::take(&mut self.redefined) {
      self.refresh(&spec)?;
    }

    tracing::debug!(
      labelled = self.order.len(),
      anonymous = anonymous.len(),
      "configuration fragment registered"
    );
    Ok(())
  }

  /// Registers what a redefined specification now refers to and evicts the
  /// object built from its previous definition.
  fn refresh(&self, spec: &SpecRef) -> Result<(), ConfigurationError> {
    for dependency in spec.dependencies() {
      self.context.add_specification(&dependency)?;
    }
    if let Some(id) = spec.id() {
      self.context.release(id);
      if self.context.is_initialized() && spec.init() == InitPolicy::Eager {
        self.context.get_object(id)?;
      }
    }
    Ok(())
  }

  /// Returns the specification for `label`, creating a placeholder the first
  /// time an unknown label is seen.
  fn vivify_object(&mut self, label: Option<&str>) -> SpecRef {
    let label = match label {
      Some(label) => label,
      None => return SpecRef::placeholder(),
    };
    if let Some(spec) = self.specs.get(label) {
      return spec.clone();
    }

    let spec = self
      .context
      .get_id_for_label(label)
      .and_then(|id| self.context.get_specification(id))
      .unwrap_or_else(SpecRef::placeholder);
    spec.borrow_mut().name = Some(label.to_owned());

    self.specs.insert(label.to_owned(), spec.clone());
    self.order.push(label.to_owned());
    spec
  }

  fn parse_object(&mut self, object: ObjectRaw) -> Result<SpecRef, ConfigurationError> {
    let label = self.configure_opt(object.id.as_deref())?;
    let owner = label.clone().unwrap_or_else(|| ANONYMOUS.to_owned());
    let spec = self.vivify_object(label.as_deref());

    let mut arguments = Vec::with_capacity(object.arguments.len());
    for argument in object.arguments {
      arguments.push(self.parse_property(argument)?);
    }

    let mut properties = BTreeMap::new();
    for property in object.properties {
      let name = match property.name.as_deref() {
        Some(name) => self.interpolator.configure(name)?,
        None => return Err(ConfigurationError::MissingPropertyName { object: owner }),
      };
      properties.insert(name, self.parse_property(property)?);
    }

    let constructor = self.configure_opt(object.constructor.as_deref())?;
    if constructor.is_none() && label.is_none() {
      return Err(ConfigurationError::MissingDefinition(owner));
    }
    let scope = self
      .configure_opt(object.scope.as_deref())?
      .unwrap_or_else(|| SINGLETON.to_owned());
    let init = match object.initialization {
      Some(InitializationRaw::Eager) => InitPolicy::Eager,
      Some(InitializationRaw::Lazy) | None => InitPolicy::Lazy,
    };

    if spec.id().is_some() {
      tracing::warn!(object = %owner, "redefining an object that is already registered");
      self.redefined.push(spec.clone());
    }
    {
      let mut target = spec.borrow_mut();
      target.name = label;
      target.constructor = constructor;
      target.arguments = arguments;
      target.properties = properties;
      target.scope = scope;
      target.init = init;
    }
    Ok(spec)
  }

  fn parse_property(&mut self, property: PropertyRaw) -> Result<PropertySpec, ConfigurationError> {
    let name = property.name.clone().unwrap_or_else(|| "<argument>".to_owned());
    let count = property.value.is_some() as usize
      + property.object.is_some() as usize
      + property.array.is_some() as usize;

    match count {
      0 => return Err(ConfigurationError::EmptyProperty { property: name }),
      1 => {}
      count => return Err(ConfigurationError::AmbiguousProperty { property: name, count }),
    }

    if let Some(literal) = property.value {
      return Ok(PropertySpec::Value(self.configure_literal(literal)?));
    }

    if let Some(object) = property.object {
      let target = match object {
        ObjectRefRaw::Label(label) => {
          let label = self.interpolator.configure(&label)?;
          self.vivify_object(Some(&label))
        }
        ObjectRefRaw::Inline(mut inline) => {
          // An inline object without a constructor is a plain property bag.
          inline.constructor.get_or_insert_with(|| OBJECT.to_owned());
          self.parse_object(*inline)?
        }
      };
      return Ok(PropertySpec::Object(target));
    }

    let mut array = ObjectSpecification::new(ARRAY);
    for item in property.array.unwrap_or_default() {
      array.arguments.push(self.parse_property(item)?);
    }
    Ok(PropertySpec::Object(array.into_ref()))
  }

  fn configure_opt(&self, value: Option<&str>) -> Result<Option<String>, ConfigurationError> {
    value.map(|value| self.interpolator.configure(value)).transpose()
  }

  /// Interpolates every string inside a literal, however deeply nested.
  fn configure_literal(&self, literal: serde_json::Value) -> Result<serde_json::Value, ConfigurationError> {
    use serde_json::Value as Json;

    Ok(match literal {
      Json::String(text) => Json::String(self.interpolator.configure(&text)?),
      Json::Array(items) => Json::Array(
        items
          .into_iter()
          .map(|item| self.configure_literal(item))
          .collect::<Result<_, ConfigurationError>>()?,
      ),
      Json::Object(entries) => Json::Object(
        entries
          .into_iter()
          .map(|(key, value)| -> Result<_, ConfigurationError> {
            Ok((key, self.configure_literal(value)?))
          })
          .collect::<Result<_, ConfigurationError>>()?,
      ),
      other => other,
    })
  }
}
