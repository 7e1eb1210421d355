use super::Value;
use std::collections::HashMap;
use std::fmt;

/// An instance of a user defined class.
/// Owns its property values; copying an `Object` copies every property.
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub class: String,
    pub properties: HashMap<String, Value>,
}

impl Object {
    pub fn new(class: String) -> Self {
        Self {
            class,
            properties: HashMap::new(),
        }
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.properties.get(property)
    }

    /// Overwrites a property. Returns `false` if the class has no such property
    /// or if `value` does not have the property's type.
    pub fn set(&mut self, property: &str, value: Value) -> bool {
        match self.properties.get_mut(property) {
            Some(slot) if slot.ty() == value.ty() => {
                *slot = value;
                true
            }
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} object>", self.class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_known_property_only() {
        let mut obj = Object::new("Point".to_string());
        obj.properties.insert("X".to_string(), Value::Int(0));

        assert!(obj.set("X", Value::Int(4)));
        assert!(!obj.set("Y", Value::Int(4)));
        assert_eq!(obj.get("X"), Some(&Value::Int(4)));
        assert_eq!(obj.get("Y"), None);
        assert_eq!(obj.to_string(), "<Point object>");
    }

    #[test]
    fn test_set_keeps_property_type() {
        let mut obj = Object::new("Line".to_string());
        obj.properties.insert("Len".to_string(), Value::Int(0));
        obj.properties
            .insert("End".to_string(), Value::Null("Point".to_string()));

        assert!(!obj.set("Len", Value::Bool(true)));
        assert_eq!(obj.get("Len"), Some(&Value::Int(0)));
        assert!(!obj.set("End", Value::Null("Line".to_string())));
        assert!(obj.set("End", Value::Object(Object::new("Point".to_string()))));
        assert_eq!(
            obj.get("End"),
            Some(&Value::Object(Object::new("Point".to_string())))
        );
    }

    #[test]
    fn test_clone_does_not_alias() {
        let mut a = Object::new("Point".to_string());
        a.properties.insert("X".to_string(), Value::Int(1));
        let mut b = a.clone();
        b.set("X", Value::Int(2));
        assert_eq!(a.get("X"), Some(&Value::Int(1)));
        assert_eq!(b.get("X"), Some(&Value::Int(2)));
    }
}
