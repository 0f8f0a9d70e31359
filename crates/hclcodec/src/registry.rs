//! type registry
//!
//! Maps class names (as used in a [Shape](crate::Shape)) to prototypes. A prototype is only used to know the
//! concrete type: decoding always starts from a fresh zero value, never from the prototype's field values.
use crate::object::Object;
use indexmap::IndexMap;

#[derive(Debug, Default, Clone)]
pub struct Registry {
    prototypes: IndexMap<String, Box<dyn Object>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `prototype` under its class name
    pub fn register(&mut self, prototype: impl Object) -> &mut Self {
        let name = prototype.class_name().to_owned();
        self.register_as(name, prototype)
    }

    pub fn register_as(&mut self, name: impl Into<String>, prototype: impl Object) -> &mut Self {
        self.prototypes.insert(name.into(), Box::new(prototype));
        self
    }

    /// Builder form of [Registry::register]
    pub fn with(mut self, prototype: impl Object) -> Self {
        self.register(prototype);
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Object> {
        self.prototypes.get(name).map(AsRef::as_ref)
    }

    /// Fresh zero value of the class registered as `name`
    pub fn instantiate(&self, name: &str) -> Option<Box<dyn Object>> {
        self.get(name).map(|prototype| prototype.new_zero())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.prototypes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.prototypes.keys().map(String::as_str)
    }

    /// Registry of every struct type reachable from the field types of `root`, plus `implementations`
    ///
    /// Struct fields, pointer targets and list or map elements are followed recursively. Types are registered under
    /// both their class name and their full type path. Interface fields carry no static type, so their candidate
    /// types have to be passed as `implementations`; their fields are followed too.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn discover(root: &dyn Object, implementations: Vec<Box<dyn Object>>) -> Registry {
        let mut registry = Registry::new();
        let mut pending: Vec<Box<dyn Object>> = root
            .fields()
            .iter()
            .filter_map(|field| field.slot.prototype())
            .collect();
        pending.extend(implementations);

        while let Some(prototype) = pending.pop() {
            let path = prototype.type_path();
            if registry.contains(path) {
                continue;
            }
            tracing::trace!(class = prototype.class_name(), path, "discovered");

            pending.extend(
                prototype
                    .fields()
                    .iter()
                    .filter_map(|field| field.slot.prototype()),
            );
            registry
                .prototypes
                .insert(prototype.class_name().to_owned(), prototype.clone_object());
            registry.prototypes.insert(path.to_owned(), prototype);
        }

        registry
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;

    #[derive(Debug, Clone, Default)]
    struct Wheel {
        size: u8,
    }
    crate::hcl_object!(Wheel { size: "size" });

    #[derive(Debug, Clone, Default)]
    struct Engine {
        power: u32,
    }
    crate::hcl_object!(Engine { power: "power" });

    #[derive(Debug, Clone, Default)]
    struct Car {
        wheels: Vec<Wheel>,
        engine: Option<Box<Engine>>,
    }
    crate::hcl_object!(Car {
        wheels: "wheel",
        engine: "engine",
    });

    #[derive(Debug, Clone, Default)]
    struct Garage {
        name: String,
        cars: IndexMap<String, Car>,
        visitor: Option<Box<dyn Object>>,
    }
    crate::hcl_object!(Garage {
        name: "name",
        cars: "car",
        visitor: "visitor",
    });

    #[derive(Debug, Clone, Default)]
    struct Bike {
        gears: u8,
    }
    crate::hcl_object!(Bike { gears: "gears" });

    #[derive(Debug, Clone, Default)]
    struct Empty {}
    crate::hcl_object!(Empty {});

    #[test]
    fn discover_follows_nested_field_types() {
        let implementations: Vec<Box<dyn Object>> = vec![Box::new(Bike::default())];
        let registry = Registry::discover(&Garage::default(), implementations);

        for name in ["Car", "Wheel", "Engine", "Bike"] {
            assert!(registry.contains(name), "{name} missing");
        }
        assert!(registry.contains(std::any::type_name::<Car>()));
        assert!(!registry.contains("Garage"));
        assert_eq!(registry.len(), 8);
    }

    #[test]
    fn discover_on_empty_root_is_empty() {
        assert!(Registry::discover(&Empty::default(), vec![]).is_empty());
    }

    #[test]
    fn instantiate_yields_zero_values() {
        let mut registry = Registry::new();
        registry.register_as("bike", Bike { gears: 21 });

        let fresh = registry.instantiate("bike").expect("registered");
        let bike = crate::object::downcast::<Bike>(fresh).unwrap();
        assert_eq!(bike.gears, 0);
        assert!(registry.instantiate("Bike").is_none());
    }
}
