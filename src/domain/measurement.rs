//! Daily eco measurements and the typed category registry
//!
//! Each measurement carries one fixed group per [`Category`]. Groups expose
//! their subcategories through [`CategoryGroup`] so challenge rules can name
//! fields as strings while the set of fields stays fixed at compile time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The fixed set of measurement categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Diet,
    Transport,
    Electronics,
    Clothing,
    Footwear,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diet => "Diet",
            Self::Transport => "Transport",
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Footwear => "Footwear",
        }
    }

    /// Look up a category by name (case and separator insensitive)
    pub fn parse(name: &str) -> Option<Self> {
        let key = normalize_name(name);
        Self::all()
            .iter()
            .copied()
            .find(|c| normalize_name(c.as_str()) == key)
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Diet,
            Self::Transport,
            Self::Electronics,
            Self::Clothing,
            Self::Footwear,
        ]
    }

    /// Canonical subcategory names for this category
    pub fn subcategories(&self) -> &'static [&'static str] {
        match self {
            Self::Diet => DietGroup::SUBCATEGORIES,
            Self::Transport => TransportGroup::SUBCATEGORIES,
            Self::Electronics => ElectronicsGroup::SUBCATEGORIES,
            Self::Clothing => ClothingGroup::SUBCATEGORIES,
            Self::Footwear => FootwearGroup::SUBCATEGORIES,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Uniform named-value access over one category's subcategories
pub trait CategoryGroup {
    fn category(&self) -> Category;

    /// Value of a subcategory, or `None` if the name is not part of this category
    fn value(&self, subcategory: &str) -> Option<f64>;

    /// Every subcategory with its value, in schema order
    fn entries(&self) -> Vec<(&'static str, f64)>;

    /// True if any subcategory shows consumption on this day
    fn has_activity(&self) -> bool {
        self.entries().iter().any(|(_, v)| *v > 0.0)
    }
}

/// Lowercase and drop separators, so "Plant_based", "plant based" and
/// "PlantBased" all name the same field.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! category_group {
    (
        $(#[$meta:meta])*
        $name:ident => $category:expr, { $($field:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct $name {
            $(pub $field: f64,)+
        }

        impl $name {
            pub const SUBCATEGORIES: &'static [&'static str] = &[$($label),+];
        }

        impl CategoryGroup for $name {
            fn category(&self) -> Category {
                $category
            }

            fn value(&self, subcategory: &str) -> Option<f64> {
                let key = normalize_name(subcategory);
                $(
                    if key == normalize_name($label) {
                        return Some(self.$field);
                    }
                )+
                None
            }

            fn entries(&self) -> Vec<(&'static str, f64)> {
                vec![$(($label, self.$field)),+]
            }
        }
    };
}

category_group! {
    /// Food consumption, in servings
    DietGroup => Category::Diet, {
        beef => "Beef",
        pork => "Pork",
        chicken => "Chicken",
        fish => "Fish",
        dairy => "Dairy",
        eggs => "Eggs",
        plant_based => "Plant_based",
    }
}

category_group! {
    /// Distance travelled per mode, in miles
    TransportGroup => Category::Transport, {
        walking => "Walking",
        bicycle => "Bicycle",
        car => "Car",
        bus => "Bus",
        train => "Train",
        plane => "Plane",
        motorcycle => "Motorcycle",
    }
}

category_group! {
    /// Device usage, in hours
    ElectronicsGroup => Category::Electronics, {
        phone => "Phone",
        laptop => "Laptop",
        desktop => "Desktop",
        tablet => "Tablet",
        tv => "Tv",
    }
}

category_group! {
    /// New clothing items acquired
    ClothingGroup => Category::Clothing, {
        shirts => "Shirts",
        pants => "Pants",
        dresses => "Dresses",
        jackets => "Jackets",
        sweaters => "Sweaters",
    }
}

category_group! {
    /// New footwear acquired
    FootwearGroup => Category::Footwear, {
        sneakers => "Sneakers",
        boots => "Boots",
        sandals => "Sandals",
        dress_shoes => "Dress_shoes",
    }
}

/// One day's self-reported consumption for a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EcoMeasurement {
    pub date_taken: NaiveDate,
    /// Computed ecological footprint score for the day
    #[serde(default)]
    pub eco_footprint: f64,
    #[serde(default)]
    pub diet: DietGroup,
    #[serde(default)]
    pub transport: TransportGroup,
    #[serde(default)]
    pub electronics: ElectronicsGroup,
    #[serde(default)]
    pub clothing: ClothingGroup,
    #[serde(default)]
    pub footwear: FootwearGroup,
}

impl EcoMeasurement {
    /// Empty measurement for a date (all values zero)
    pub fn on(date_taken: NaiveDate) -> Self {
        Self {
            date_taken,
            ..Self::default()
        }
    }

    pub fn group(&self, category: Category) -> &dyn CategoryGroup {
        match category {
            Category::Diet => &self.diet,
            Category::Transport => &self.transport,
            Category::Electronics => &self.electronics,
            Category::Clothing => &self.clothing,
            Category::Footwear => &self.footwear,
        }
    }
}
