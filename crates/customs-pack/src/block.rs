//! Custom block JSON parsing (blocks/*.json).

use std::collections::BTreeMap;

use customs_nbt::{NbtCompound, NbtTag};
use customs_registry::block::MAX_PERMUTATIONS;
use customs_registry::{BlockDefinition, BlockProperty};
use serde::Deserialize;
use serde_json::Value;

use crate::error::PackError;
use crate::item::MenuCategory;

/// Raw block file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockFile {
    pub format_version: String,
    #[serde(rename = "minecraft:block")]
    pub block: BlockJson,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockJson {
    pub description: BlockDescription,
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockDescription {
    pub identifier: String,
    #[serde(default)]
    pub menu_category: Option<MenuCategory>,
    /// Property name to its values: a list, or `{ "values": { "min", "max" } }`.
    #[serde(default)]
    pub states: BTreeMap<String, Value>,
}

impl BlockFile {
    pub fn parse_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Turn the file into a registrable block definition.
    pub fn extract(&self) -> Result<BlockDefinition, PackError> {
        let description = &self.block.description;
        let identifier = description.identifier.as_str();

        let mut definition = BlockDefinition::new(identifier);
        for (name, values) in &description.states {
            definition = definition.with_property(parse_state(identifier, name, values)?);
        }

        if let Some(menu) = &description.menu_category {
            definition = definition.with_category(menu.parse(identifier)?, menu.group.clone());
        }

        let mut components = NbtCompound::new();
        for (name, value) in &self.block.components {
            let tag = json_to_nbt(value)
                .ok_or_else(|| PackError::component(identifier, name, "cannot be expressed as NBT"))?;
            components.insert(name.clone(), tag);
        }
        Ok(definition.with_components(components))
    }
}

fn parse_state(identifier: &str, name: &str, values: &Value) -> Result<BlockProperty, PackError> {
    if let Some(range) = values.get("values") {
        let bound = |key: &str| {
            range
                .get(key)
                .and_then(Value::as_i64)
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| PackError::state(identifier, name, format!("range needs an integer {key}")))
        };
        let (min, max) = (bound("min")?, bound("max")?);
        if min > max {
            return Err(PackError::state(identifier, name, "min is greater than max"));
        }
        if i64::from(max) - i64::from(min) >= MAX_PERMUTATIONS as i64 {
            return Err(PackError::state(
                identifier,
                name,
                format!("range spans more than {MAX_PERMUTATIONS} values"),
            ));
        }
        return Ok(BlockProperty::ints(name, min..=max));
    }

    let list = values
        .as_array()
        .ok_or_else(|| PackError::state(identifier, name, "expected a list of values"))?;
    let values = list
        .iter()
        .map(|v| match v {
            Value::Bool(b) => Ok(NbtTag::from(*b)),
            Value::String(s) => Ok(NbtTag::from(s.as_str())),
            Value::Number(n) => n
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(NbtTag::Int)
                .ok_or_else(|| PackError::state(identifier, name, format!("{n} is not an int"))),
            other => Err(PackError::state(identifier, name, format!("unsupported value {other}"))),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(BlockProperty::new(name, values))
}

/// Convert JSON to NBT: bools become bytes, integers ints, other numbers
/// floats. A list holding any float is all floats. `null` and lists mixing
/// other kinds have no NBT form.
pub fn json_to_nbt(value: &Value) -> Option<NbtTag> {
    Some(match value {
        Value::Null => return None,
        Value::Bool(b) => NbtTag::from(*b),
        Value::Number(n) => match n.as_i64().and_then(|n| i32::try_from(n).ok()) {
            Some(i) => NbtTag::Int(i),
            None => NbtTag::Float(n.as_f64()? as f32),
        },
        Value::String(s) => NbtTag::String(s.clone()),
        Value::Array(items) => {
            let mut tags = items.iter().map(json_to_nbt).collect::<Option<Vec<_>>>()?;
            if tags.iter().any(|t| matches!(t, NbtTag::Float(_))) {
                for tag in &mut tags {
                    if let NbtTag::Int(i) = *tag {
                        *tag = NbtTag::Float(i as f32);
                    }
                }
            }
            NbtTag::list(tags).ok()?
        }
        Value::Object(map) => NbtTag::Compound(
            map.iter()
                .map(|(k, v)| Some((k.clone(), json_to_nbt(v)?)))
                .collect::<Option<_>>()?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use customs_nbt::{read_nbt_network, to_network_bytes, NbtRoot};

    use super::*;

    #[test]
    fn parse_custom_block() {
        let json = r#"{
            "format_version": "1.21.40",
            "minecraft:block": {
                "description": {
                    "identifier": "custom:lamp",
                    "menu_category": { "category": "construction", "group": "itemGroup.name.lamps" },
                    "states": {
                        "custom:lit": [false, true],
                        "custom:power": { "values": { "min": 0, "max": 3 } }
                    }
                },
                "components": {
                    "minecraft:destructible_by_mining": { "seconds_to_destroy": 2.5 },
                    "minecraft:light_emission": 15
                }
            }
        }"#;
        let def = BlockFile::parse_json(json).unwrap().extract().unwrap();
        assert_eq!(def.identifier(), "custom:lamp");
        assert_eq!(def.properties().len(), 2);
        assert_eq!(def.properties()[1].values().len(), 4);
        assert_eq!(def.permutations().len(), 8);
    }

    #[test]
    fn block_without_states_has_one_permutation() {
        let json = r#"{
            "format_version": "1.21.40",
            "minecraft:block": { "description": { "identifier": "custom:marble" } }
        }"#;
        let def = BlockFile::parse_json(json).unwrap().extract().unwrap();
        assert!(def.properties().is_empty());
        assert_eq!(def.permutations().len(), 1);
    }

    #[test]
    fn bad_states_are_rejected() {
        for states in [
            r#"{ "custom:x": 5 }"#,
            r#"{ "custom:x": [1.5] }"#,
            r#"{ "custom:x": { "values": { "min": 4, "max": 1 } } }"#,
            r#"{ "custom:x": { "values": { "min": -2147483648, "max": 2147483647 } } }"#,
            r#"{ "custom:x": { "values": { "min": 0, "max": 65536 } } }"#,
        ] {
            let json = format!(
                r#"{{"format_version":"1.21.40","minecraft:block":{{"description":{{"identifier":"custom:x","states":{states}}}}}}}"#
            );
            let err = BlockFile::parse_json(&json).unwrap().extract().unwrap_err();
            assert!(matches!(err, PackError::InvalidState { .. }), "{states}");
        }
    }

    #[test]
    fn json_components_become_nbt() {
        let value: Value = serde_json::from_str(
            r#"{ "seconds": 2.5, "solid": true, "tags": ["a", "b"], "level": 3 }"#,
        )
        .unwrap();
        let tag = json_to_nbt(&value).unwrap();
        let map = tag.as_compound().unwrap();
        assert_eq!(map.get("seconds"), Some(&NbtTag::Float(2.5)));
        assert_eq!(map.get("solid"), Some(&NbtTag::Byte(1)));
        assert_eq!(map.get("level"), Some(&NbtTag::Int(3)));
        assert_eq!(map.get("tags").and_then(NbtTag::as_list).map(<[_]>::len), Some(2));
        assert!(json_to_nbt(&Value::Null).is_none());
    }

    #[test]
    fn largest_int_range_is_accepted() {
        let json = r#"{"format_version":"1.21.40","minecraft:block":{"description":{"identifier":"custom:x","states":{"custom:x":{"values":{"min":0,"max":65535}}}}}}"#;
        let def = BlockFile::parse_json(json).unwrap().extract().unwrap();
        assert_eq!(def.properties()[0].values().len(), MAX_PERMUTATIONS);
    }

    #[test]
    fn numeric_list_with_a_float_is_all_floats() {
        let value: Value = serde_json::from_str("[-8, 0.5, -8]").unwrap();
        let tag = json_to_nbt(&value).unwrap();
        assert_eq!(
            tag,
            NbtTag::List(vec![NbtTag::Float(-8.0), NbtTag::Float(0.5), NbtTag::Float(-8.0)])
        );

        let mut compound = NbtCompound::new();
        compound.insert("origin".into(), tag);
        let root = NbtRoot::unnamed(compound);
        let bytes = to_network_bytes(&root);
        assert_eq!(read_nbt_network(&mut bytes.clone()).unwrap(), root);
    }

    #[test]
    fn mixed_lists_are_rejected() {
        for json in [r#"[1, "a"]"#, r#"[true, 2]"#, r#"[[1], {"a": 1}]"#] {
            let value: Value = serde_json::from_str(json).unwrap();
            assert!(json_to_nbt(&value).is_none(), "{json}");
        }

        let block = r#"{"format_version":"1.21.40","minecraft:block":{"description":{"identifier":"custom:x"},"components":{"minecraft:geometry":[1, "a"]}}}"#;
        let err = BlockFile::parse_json(block).unwrap().extract().unwrap_err();
        assert!(matches!(err, PackError::InvalidComponent { .. }));
    }
}
