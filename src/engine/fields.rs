//! Resolution of rule field names onto measurement values

use super::error::{EngineError, Result};
use crate::domain::{Category, CategoryGroup, ChallengeRule, EcoMeasurement};

/// Resolve a category name to the matching group inside a measurement
pub fn resolve_group<'m>(
    measurement: &'m EcoMeasurement,
    category_name: &str,
) -> Result<&'m dyn CategoryGroup> {
    let category = Category::parse(category_name)
        .ok_or_else(|| EngineError::UnknownCategory(category_name.to_string()))?;
    Ok(measurement.group(category))
}

/// Read a subcategory value from a group
pub fn resolve_value(group: &dyn CategoryGroup, subcategory_name: &str) -> Result<f64> {
    group
        .value(subcategory_name)
        .ok_or_else(|| unknown_subcategory(group.category(), subcategory_name))
}

/// Every sibling of `excluding` in the group, with its value
pub fn others(
    group: &dyn CategoryGroup,
    excluding: &str,
) -> Result<Vec<(&'static str, f64)>> {
    let excluded = resolve_field_name(group.category(), excluding)?;
    Ok(group
        .entries()
        .into_iter()
        .filter(|(name, _)| *name != excluded)
        .collect())
}

/// A rule's category/subcategory checked against the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedField {
    pub category: Category,
    pub subcategory: &'static str,
}

impl ResolvedField {
    /// Validate the names a rule refers to, independent of any measurement
    pub fn from_rule(rule: &ChallengeRule) -> Result<Self> {
        let category = Category::parse(&rule.category)
            .ok_or_else(|| EngineError::UnknownCategory(rule.category.clone()))?;
        let subcategory = resolve_field_name(category, &rule.subcategory)?;
        Ok(Self {
            category,
            subcategory,
        })
    }

    pub fn group<'m>(&self, measurement: &'m EcoMeasurement) -> &'m dyn CategoryGroup {
        measurement.group(self.category)
    }

    pub fn value(&self, measurement: &EcoMeasurement) -> Result<f64> {
        resolve_value(self.group(measurement), self.subcategory)
    }

    pub fn others(&self, measurement: &EcoMeasurement) -> Result<Vec<(&'static str, f64)>> {
        others(self.group(measurement), self.subcategory)
    }
}

fn resolve_field_name(category: Category, name: &str) -> Result<&'static str> {
    let key = crate::domain::normalize_name(name);
    category
        .subcategories()
        .iter()
        .copied()
        .find(|candidate| crate::domain::normalize_name(candidate) == key)
        .ok_or_else(|| unknown_subcategory(category, name))
}

fn unknown_subcategory(category: Category, name: &str) -> EngineError {
    EngineError::UnknownSubcategory {
        category: category.to_string(),
        subcategory: name.to_string(),
    }
}
