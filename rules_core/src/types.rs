//! Core types shared by the resolution pipelines

use serde::{Deserialize, Serialize};

/// Equipment slot of a character build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EquipSlot {
    Head,
    Chest,
    Hands,
    Legs,
    Feet,
    Amulet,
    Ring,
    Earring,
    Weapon1,
    Weapon2,
    /// Off-hand slot (shield), paired with sword and flail
    Weapon3,
    Arrow,
    Cartridge,
    BuffMeal,
    BuffCoating,
    BuffFood1,
    BuffFood2,
    Trophy1,
    Trophy2,
    Trophy3,
    Heartgem,
}

impl EquipSlot {
    /// Get all equipment slots
    pub fn all() -> &'static [EquipSlot] {
        &[
            EquipSlot::Head,
            EquipSlot::Chest,
            EquipSlot::Hands,
            EquipSlot::Legs,
            EquipSlot::Feet,
            EquipSlot::Amulet,
            EquipSlot::Ring,
            EquipSlot::Earring,
            EquipSlot::Weapon1,
            EquipSlot::Weapon2,
            EquipSlot::Weapon3,
            EquipSlot::Arrow,
            EquipSlot::Cartridge,
            EquipSlot::BuffMeal,
            EquipSlot::BuffCoating,
            EquipSlot::BuffFood1,
            EquipSlot::BuffFood2,
            EquipSlot::Trophy1,
            EquipSlot::Trophy2,
            EquipSlot::Trophy3,
            EquipSlot::Heartgem,
        ]
    }

    /// Whether this slot holds one of the two swappable weapons
    pub fn is_weapon_slot(&self) -> bool {
        matches!(self, EquipSlot::Weapon1 | EquipSlot::Weapon2)
    }
}

/// Which of the two weapons is currently drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponSelection {
    #[default]
    Primary,
    Secondary,
}

impl WeaponSelection {
    /// Check whether the given slot holds the selected weapon
    pub fn is_active_slot(&self, slot: EquipSlot) -> bool {
        matches!(
            (self, slot),
            (WeaponSelection::Primary, EquipSlot::Weapon1) | (WeaponSelection::Secondary, EquipSlot::Weapon2)
        )
    }
}

/// Character attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeRef {
    Con,
    Dex,
    Foc,
    Int,
    Str,
}

impl AttributeRef {
    /// All attributes in their canonical order
    pub fn all() -> &'static [AttributeRef] {
        &[
            AttributeRef::Con,
            AttributeRef::Dex,
            AttributeRef::Foc,
            AttributeRef::Int,
            AttributeRef::Str,
        ]
    }
}

/// One value per attribute
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet<T> {
    #[serde(rename = "con", default)]
    pub constitution: T,
    #[serde(rename = "dex", default)]
    pub dexterity: T,
    #[serde(rename = "foc", default)]
    pub focus: T,
    #[serde(rename = "int", default)]
    pub intelligence: T,
    #[serde(rename = "str", default)]
    pub strength: T,
}

impl<T> AttributeSet<T> {
    /// Build a set by evaluating `f` for every attribute
    pub fn from_fn(mut f: impl FnMut(AttributeRef) -> T) -> Self {
        AttributeSet {
            constitution: f(AttributeRef::Con),
            dexterity: f(AttributeRef::Dex),
            focus: f(AttributeRef::Foc),
            intelligence: f(AttributeRef::Int),
            strength: f(AttributeRef::Str),
        }
    }

    pub fn get(&self, attr: AttributeRef) -> &T {
        match attr {
            AttributeRef::Con => &self.constitution,
            AttributeRef::Dex => &self.dexterity,
            AttributeRef::Foc => &self.focus,
            AttributeRef::Int => &self.intelligence,
            AttributeRef::Str => &self.strength,
        }
    }

    pub fn get_mut(&mut self, attr: AttributeRef) -> &mut T {
        match attr {
            AttributeRef::Con => &mut self.constitution,
            AttributeRef::Dex => &mut self.dexterity,
            AttributeRef::Foc => &mut self.focus,
            AttributeRef::Int => &mut self.intelligence,
            AttributeRef::Str => &mut self.strength,
        }
    }

    /// Iterate `(attribute, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (AttributeRef, &T)> {
        AttributeRef::all().iter().map(move |attr| (*attr, self.get(*attr)))
    }

    pub fn map<U>(&self, mut f: impl FnMut(AttributeRef, &T) -> U) -> AttributeSet<U> {
        AttributeSet::from_fn(|attr| f(attr, self.get(attr)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weapon_selection_slots() {
        assert!(WeaponSelection::Primary.is_active_slot(EquipSlot::Weapon1));
        assert!(!WeaponSelection::Primary.is_active_slot(EquipSlot::Weapon2));
        assert!(WeaponSelection::Secondary.is_active_slot(EquipSlot::Weapon2));
        assert!(!WeaponSelection::Secondary.is_active_slot(EquipSlot::Weapon3));
    }

    #[test]
    fn test_slot_serde_names() {
        let slot: EquipSlot = serde_json::from_str("\"buff-food1\"").unwrap();
        assert_eq!(slot, EquipSlot::BuffFood1);
        assert_eq!(serde_json::to_string(&EquipSlot::Weapon3).unwrap(), "\"weapon3\"");
    }

    #[test]
    fn test_attribute_set_access() {
        let mut set = AttributeSet::<i32>::default();
        *set.get_mut(AttributeRef::Str) += 5;
        assert_eq!(set.strength, 5);
        assert_eq!(*set.get(AttributeRef::Str), 5);

        let doubled = set.map(|_, v| v * 2);
        assert_eq!(doubled.strength, 10);
        assert_eq!(doubled.iter().count(), 5);
    }

    #[test]
    fn test_attribute_set_serde_short_names() {
        let set: AttributeSet<i32> = serde_json::from_str(r#"{"str": 3, "con": 2}"#).unwrap();
        assert_eq!(set.strength, 3);
        assert_eq!(set.constitution, 2);
        assert_eq!(set.dexterity, 0);
    }
}
