use crate::context::Context;
use crate::core::ObjectId;
use crate::error::ContextError;
use crate::spec::{PropertySpec, SpecRef};
use crate::value::{Instance, Value};

/// Assembles objects for one specification.
///
/// Arguments are resolved in declaration order and passed positionally to
/// the constructor; properties are resolved afterwards and injected one by
/// one. A failure part way through drops the half-built object, nothing is
/// stored on its behalf.
pub(crate) struct ObjectFactory {
  id: ObjectId,
  spec: SpecRef,
}

impl ObjectFactory {
  pub(crate) fn new(id: ObjectId, spec: SpecRef) -> Self {
    Self { id, spec }
  }

  pub(crate) fn create_object(&self, context: &Context) -> Result<Instance, ContextError> {
    // Copy what is needed out of the specification so no borrow is held
    // while dependencies are resolved.
    let (constructor_name, arguments, properties) = {
      let spec = self.spec.borrow();
      (
        spec.constructor.clone(),
        spec.arguments.clone(),
        spec.properties.clone(),
      )
    };

    let constructor_name = constructor_name.ok_or(ContextError::MissingConstructor(self.id))?;
    let constructor = context
      .constructor(&constructor_name)
      .ok_or_else(|| ContextError::UnknownConstructor(constructor_name.clone()))?;

    let mut resolved = Vec::with_capacity(arguments.len());
    for argument in &arguments {
      resolved.push(self.resolve(context, argument)?);
    }

    tracing::trace!(id = %self.id, constructor = %constructor_name, "constructing object");
    let mut component = constructor(resolved).map_err(|message| ContextError::Construction {
      constructor: constructor_name.clone(),
      message,
    })?;

    for (property, spec) in &properties {
      let value = self.resolve(context, spec)?;
      component
        .set_property(property, value)
        .map_err(|message| ContextError::PropertyInjection {
          constructor: constructor_name.clone(),
          property: property.clone(),
          message,
        })?;
    }

    Ok(Instance::from_component(component))
  }

  fn resolve(&self, context: &Context, property: &PropertySpec) -> Result<Value, ContextError> {
    match property {
      PropertySpec::Value(literal) => Ok(Value::Literal(literal.clone())),
      PropertySpec::Object(target) => {
        let unregistered = || ContextError::UnregisteredDependency { dependent: self.id };
        let id = target.id().ok_or_else(unregistered)?;
        context
          .get_object(id)?
          .map(Value::Object)
          .ok_or_else(unregistered)
      }
    }
  }
}
