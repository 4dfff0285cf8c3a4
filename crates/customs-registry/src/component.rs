//! Item components and the descriptor that carries them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use customs_nbt::{NbtCompound, NbtTag};

use crate::error::RegistryError;

/// Creative inventory tab a custom type is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CreativeCategory {
    Construction,
    Nature,
    Equipment,
    Items,
    #[default]
    None,
}

impl CreativeCategory {
    /// Numeric id used in item properties.
    pub fn id(self) -> i32 {
        match self {
            CreativeCategory::Construction => 1,
            CreativeCategory::Nature => 2,
            CreativeCategory::Equipment => 3,
            CreativeCategory::Items => 4,
            CreativeCategory::None => 0,
        }
    }

    /// Name used in block `menu_category` entries.
    pub fn as_str(self) -> &'static str {
        match self {
            CreativeCategory::Construction => "construction",
            CreativeCategory::Nature => "nature",
            CreativeCategory::Equipment => "equipment",
            CreativeCategory::Items => "items",
            CreativeCategory::None => "none",
        }
    }
}

impl fmt::Display for CreativeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CreativeCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "construction" => Ok(CreativeCategory::Construction),
            "nature" => Ok(CreativeCategory::Nature),
            "equipment" => Ok(CreativeCategory::Equipment),
            "items" => Ok(CreativeCategory::Items),
            "none" => Ok(CreativeCategory::None),
            other => Err(format!("unknown creative category: {other}")),
        }
    }
}

/// A data-driven item component.
///
/// Some components are written under `components`, others are item
/// properties and land in `components.item_properties`.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemComponent {
    AllowOffHand(bool),
    Durability {
        max_durability: i32,
    },
    Food {
        can_always_eat: bool,
        nutrition: i32,
        saturation_modifier: f32,
    },
    HandEquipped(bool),
    Icon(String),
    MaxStackSize(u8),
    /// Slows the holder while the item is in use.
    UseModifiers {
        movement_modifier: f32,
        use_duration: f32,
    },
    DisplayName(String),
}

impl ItemComponent {
    pub fn name(&self) -> &'static str {
        match self {
            ItemComponent::AllowOffHand(_) => "allow_off_hand",
            ItemComponent::Durability { .. } => "minecraft:durability",
            ItemComponent::Food { .. } => "minecraft:food",
            ItemComponent::HandEquipped(_) => "hand_equipped",
            ItemComponent::Icon(_) => "minecraft:icon",
            ItemComponent::MaxStackSize(_) => "max_stack_size",
            ItemComponent::UseModifiers { .. } => "minecraft:use_modifiers",
            ItemComponent::DisplayName(_) => "minecraft:display_name",
        }
    }

    /// Whether this component is an item property.
    pub fn is_property(&self) -> bool {
        matches!(
            self,
            ItemComponent::AllowOffHand(_)
                | ItemComponent::HandEquipped(_)
                | ItemComponent::Icon(_)
                | ItemComponent::MaxStackSize(_)
        )
    }

    pub fn value(&self) -> NbtTag {
        match self {
            ItemComponent::AllowOffHand(v) | ItemComponent::HandEquipped(v) => (*v).into(),
            ItemComponent::Durability { max_durability } => {
                compound([("max_durability", NbtTag::Int(*max_durability))])
            }
            ItemComponent::Food {
                can_always_eat,
                nutrition,
                saturation_modifier,
            } => compound([
                ("can_always_eat", (*can_always_eat).into()),
                ("nutrition", NbtTag::Int(*nutrition)),
                ("saturation_modifier", NbtTag::Float(*saturation_modifier)),
            ]),
            ItemComponent::Icon(texture) => compound([(
                "textures",
                compound([("default", texture.as_str().into())]),
            )]),
            ItemComponent::MaxStackSize(n) => NbtTag::Int(*n as i32),
            ItemComponent::UseModifiers {
                movement_modifier,
                use_duration,
            } => compound([
                ("movement_modifier", NbtTag::Float(*movement_modifier)),
                ("use_duration", NbtTag::Float(*use_duration)),
            ]),
            ItemComponent::DisplayName(value) => compound([("value", value.as_str().into())]),
        }
    }

    fn validate(&self, identifier: &str) -> Result<(), RegistryError> {
        match self {
            ItemComponent::Durability { max_durability } if *max_durability <= 0 => Err(
                RegistryError::invalid_type(identifier, "max_durability must be positive"),
            ),
            ItemComponent::Food { nutrition, .. } if *nutrition < 0 => Err(
                RegistryError::invalid_type(identifier, "nutrition must not be negative"),
            ),
            ItemComponent::Icon(texture) if texture.is_empty() => Err(
                RegistryError::invalid_type(identifier, "icon texture must not be empty"),
            ),
            ItemComponent::MaxStackSize(n) if !(1..=64).contains(n) => Err(
                RegistryError::invalid_type(identifier, "max_stack_size must be within 1..=64"),
            ),
            ItemComponent::UseModifiers {
                movement_modifier,
                use_duration,
            } => {
                if !(0.0..=1.0).contains(movement_modifier) {
                    return Err(RegistryError::invalid_type(
                        identifier,
                        "movement_modifier must be within 0.0..=1.0",
                    ));
                }
                if !use_duration.is_finite() || *use_duration < 0.0 {
                    return Err(RegistryError::invalid_type(
                        identifier,
                        "use_duration must not be negative",
                    ));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

fn compound<const N: usize>(entries: [(&str, NbtTag); N]) -> NbtTag {
    NbtTag::Compound(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

/// Shape of an item type: how far it stacks and, for data-driven items,
/// which components the client should apply.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDescriptor {
    max_stack_size: u8,
    components: Option<Vec<ItemComponent>>,
}

impl ItemDescriptor {
    /// A plain item the client already knows how to render.
    pub fn simple() -> Self {
        Self {
            max_stack_size: 64,
            components: None,
        }
    }

    /// A data-driven item.
    pub fn with_components(components: Vec<ItemComponent>) -> Self {
        Self {
            max_stack_size: 64,
            components: Some(components),
        }
    }

    pub fn max_stack_size(mut self, size: u8) -> Self {
        self.max_stack_size = size;
        self
    }

    pub fn stack_size(&self) -> u8 {
        self.max_stack_size
    }

    pub fn is_component_based(&self) -> bool {
        self.components.is_some()
    }

    pub fn components(&self) -> &[ItemComponent] {
        self.components.as_deref().unwrap_or_default()
    }

    pub(crate) fn validate(&self, identifier: &str) -> Result<(), RegistryError> {
        if !(1..=64).contains(&self.max_stack_size) {
            return Err(RegistryError::invalid_type(
                identifier,
                "max stack size must be within 1..=64",
            ));
        }
        let Some(components) = &self.components else {
            return Ok(());
        };
        if components.is_empty() {
            return Err(RegistryError::invalid_type(
                identifier,
                "component-based item has no components",
            ));
        }
        let mut seen = HashSet::new();
        for component in components {
            if !seen.insert(component.name()) {
                return Err(RegistryError::invalid_type(
                    identifier,
                    format!("duplicate component {}", component.name()),
                ));
            }
            if let ItemComponent::MaxStackSize(n) = component {
                if *n != self.max_stack_size {
                    return Err(RegistryError::invalid_type(
                        identifier,
                        format!(
                            "max_stack_size component ({n}) disagrees with descriptor ({})",
                            self.max_stack_size
                        ),
                    ));
                }
            }
            component.validate(identifier)?;
        }
        Ok(())
    }

    /// The `components` compound sent to the client. Empty for simple items.
    pub(crate) fn component_nbt(&self, category: CreativeCategory) -> NbtCompound {
        let Some(list) = &self.components else {
            return NbtCompound::new();
        };
        let mut components = NbtCompound::new();
        let mut properties = NbtCompound::new();
        properties.insert("creative_category".into(), NbtTag::Int(category.id()));
        properties.insert(
            "max_stack_size".into(),
            NbtTag::Int(self.max_stack_size as i32),
        );
        for component in list {
            let target = if component.is_property() {
                &mut properties
            } else {
                &mut components
            };
            target.insert(component.name().to_string(), component.value());
        }
        components.insert("item_properties".into(), properties.into());

        let mut root = NbtCompound::new();
        root.insert("components".into(), components.into());
        root
    }
}

impl Default for ItemDescriptor {
    fn default() -> Self {
        Self::simple()
    }
}
