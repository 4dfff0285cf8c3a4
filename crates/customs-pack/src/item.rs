//! Custom item JSON parsing (items/*.json).

use std::collections::BTreeMap;

use customs_registry::{CreativeCategory, ItemComponent, ItemDescriptor};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::PackError;

/// Raw item file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemFile {
    pub format_version: String,
    #[serde(rename = "minecraft:item")]
    pub item: ItemDefinition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemDefinition {
    pub description: ItemDescription,
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemDescription {
    pub identifier: String,
    #[serde(default)]
    pub menu_category: Option<MenuCategory>,
    /// Pre-1.20 spelling of `menu_category.category`.
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MenuCategory {
    pub category: String,
    #[serde(default)]
    pub group: Option<String>,
}

impl MenuCategory {
    pub(crate) fn parse(&self, identifier: &str) -> Result<CreativeCategory, PackError> {
        self.category
            .parse()
            .map_err(|e| PackError::component(identifier, "menu_category", e))
    }
}

/// An item ready to register.
#[derive(Debug, Clone, PartialEq)]
pub struct PackItem {
    pub identifier: String,
    pub name: String,
    pub descriptor: ItemDescriptor,
    pub category: CreativeCategory,
}

#[derive(Deserialize)]
struct DurabilityJson {
    max_durability: i32,
}

#[derive(Deserialize)]
struct FoodJson {
    #[serde(default)]
    can_always_eat: bool,
    #[serde(default)]
    nutrition: i32,
    #[serde(default = "default_saturation")]
    saturation_modifier: f32,
}

fn default_saturation() -> f32 {
    0.6
}

#[derive(Deserialize)]
struct UseModifiersJson {
    #[serde(default = "default_movement_modifier")]
    movement_modifier: f32,
    use_duration: f32,
}

fn default_movement_modifier() -> f32 {
    1.0
}

impl ItemFile {
    pub fn parse_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Turn the file into a registrable item.
    pub fn extract(&self) -> Result<PackItem, PackError> {
        let identifier = self.item.description.identifier.as_str();
        let category = match (&self.item.description.menu_category, &self.item.description.category) {
            (Some(menu), _) => menu.parse(identifier)?,
            (None, Some(category)) => category
                .parse()
                .map_err(|e| PackError::component(identifier, "category", e))?,
            (None, None) => CreativeCategory::None,
        };

        let mut components = Vec::new();
        for (name, value) in &self.item.components {
            if let Some(component) = parse_component(identifier, name, value)? {
                components.push(component);
            }
        }

        let max_stack_size = components.iter().find_map(|c| match c {
            ItemComponent::MaxStackSize(n) => Some(*n),
            _ => None,
        });
        let name = components
            .iter()
            .find_map(|c| match c {
                ItemComponent::DisplayName(name) => Some(name.clone()),
                _ => None,
            })
            .unwrap_or_else(|| default_name(identifier));

        let mut descriptor = if components.is_empty() {
            ItemDescriptor::simple()
        } else {
            ItemDescriptor::with_components(components)
        };
        if let Some(n) = max_stack_size {
            descriptor = descriptor.max_stack_size(n);
        }

        Ok(PackItem {
            identifier: identifier.to_string(),
            name,
            descriptor,
            category,
        })
    }
}

/// "custom:ruby_ore" becomes "ruby_ore".
pub(crate) fn default_name(identifier: &str) -> String {
    identifier
        .split_once(':')
        .map_or(identifier, |(_, path)| path)
        .to_string()
}

/// Components may be written as `{ "value": x }` or just `x`.
fn inner_value(value: &Value) -> &Value {
    value.get("value").unwrap_or(value)
}

fn typed<T: DeserializeOwned>(identifier: &str, name: &str, value: &Value) -> Result<T, PackError> {
    serde_json::from_value(value.clone()).map_err(|e| PackError::component(identifier, name, e))
}

fn parse_component(
    identifier: &str,
    name: &str,
    value: &Value,
) -> Result<Option<ItemComponent>, PackError> {
    let component = match name {
        "minecraft:max_stack_size" => {
            let n = inner_value(value)
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .ok_or_else(|| PackError::component(identifier, name, "expected 1..=64"))?;
            ItemComponent::MaxStackSize(n)
        }
        "minecraft:allow_off_hand" => ItemComponent::AllowOffHand(typed(identifier, name, inner_value(value))?),
        "minecraft:hand_equipped" => ItemComponent::HandEquipped(typed(identifier, name, inner_value(value))?),
        "minecraft:icon" => {
            let texture = value
                .as_str()
                .or_else(|| value.get("texture").and_then(Value::as_str))
                .or_else(|| value.pointer("/textures/default").and_then(Value::as_str))
                .ok_or_else(|| PackError::component(identifier, name, "missing texture"))?;
            ItemComponent::Icon(texture.to_string())
        }
        "minecraft:durability" => {
            let d: DurabilityJson = typed(identifier, name, value)?;
            ItemComponent::Durability {
                max_durability: d.max_durability,
            }
        }
        "minecraft:food" => {
            let f: FoodJson = typed(identifier, name, value)?;
            ItemComponent::Food {
                can_always_eat: f.can_always_eat,
                nutrition: f.nutrition,
                saturation_modifier: f.saturation_modifier,
            }
        }
        "minecraft:use_modifiers" => {
            let u: UseModifiersJson = typed(identifier, name, value)?;
            ItemComponent::UseModifiers {
                movement_modifier: u.movement_modifier,
                use_duration: u.use_duration,
            }
        }
        "minecraft:display_name" => ItemComponent::DisplayName(typed(identifier, name, inner_value(value))?),
        _ => {
            warn!("{identifier}: ignoring unsupported item component {name}");
            return Ok(None);
        }
    };
    Ok(Some(component))
}
