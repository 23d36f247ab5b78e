//! Material, shape and load tables
//!
//! Plain data, never mutated after construction. The standard tables are the
//! reference balance; tests and level designers may hand in their own.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deck material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Material {
    Wood,
    Stone,
    Concrete,
    Steel,
}

impl Material {
    pub const ALL: [Material; 4] = [
        Material::Wood,
        Material::Stone,
        Material::Concrete,
        Material::Steel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Material::Wood => "wood",
            Material::Stone => "stone",
            Material::Concrete => "concrete",
            Material::Steel => "steel",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Structural shape of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Straight,
    Triangle,
    Arch,
    IBeam,
}

impl Shape {
    pub const ALL: [Shape; 4] = [Shape::Straight, Shape::Triangle, Shape::Arch, Shape::IBeam];

    pub fn as_str(&self) -> &'static str {
        match self {
            Shape::Straight => "straight",
            Shape::Triangle => "triangle",
            Shape::Arch => "arch",
            Shape::IBeam => "ibeam",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// What gets driven across the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Load {
    Person,
    Car,
    Truck,
    Bus,
    Tank,
}

impl Load {
    /// Lightest to heaviest
    pub const ALL: [Load; 5] = [Load::Person, Load::Car, Load::Truck, Load::Bus, Load::Tank];

    pub fn as_str(&self) -> &'static str {
        match self {
            Load::Person => "person",
            Load::Car => "car",
            Load::Truck => "truck",
            Load::Bus => "bus",
            Load::Tank => "tank",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.to_lowercase();
        Self::ALL.into_iter().find(|v| v.as_str() == s)
    }

    /// The next heavier load, if any
    pub fn next(&self) -> Option<Load> {
        Self::ALL.get(self.index() + 1).copied()
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub id: Material,
    pub name: String,
    pub strength: f32,
    pub cost: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    pub id: Shape,
    pub name: String,
    /// Added on top of the material strength
    pub strength_bonus: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadSpec {
    pub id: Load,
    pub name: String,
    pub weight: f32,
    /// Scene units advanced per tick
    pub traversal_speed: f32,
}

/// Why a set of tables cannot be used as a catalog
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("{table} table lists {id} more than once")]
    Duplicate {
        table: &'static str,
        id: &'static str,
    },
    #[error("{id}: {field} must be positive (got {value})")]
    NotPositive {
        id: &'static str,
        field: &'static str,
        value: f32,
    },
}

/// Complete lookup tables, indexed by enum discriminant.
/// Deserialising goes through `Catalog::new`, so JSON tables may list their
/// entries in any order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogTables")]
pub struct Catalog {
    materials: [MaterialSpec; 4],
    shapes: [ShapeSpec; 4],
    loads: [LoadSpec; 5],
}

/// Tables as they arrive from JSON, before ordering and validation
#[derive(Deserialize)]
struct CatalogTables {
    materials: [MaterialSpec; 4],
    shapes: [ShapeSpec; 4],
    loads: [LoadSpec; 5],
}

impl TryFrom<CatalogTables> for Catalog {
    type Error = CatalogError;

    fn try_from(tables: CatalogTables) -> Result<Self, Self::Error> {
        Catalog::new(tables.materials, tables.shapes, tables.loads)
    }
}

fn require_positive(id: &'static str, field: &'static str, value: f32) -> Result<(), CatalogError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CatalogError::NotPositive { id, field, value })
    }
}

/// Each table has exactly one slot per variant, so no duplicates means
/// nothing is missing either
fn require_unique<T: Copy + PartialEq>(
    table: &'static str,
    ids: &[T],
    name: impl Fn(T) -> &'static str,
) -> Result<(), CatalogError> {
    for (i, &id) in ids.iter().enumerate() {
        if ids[..i].contains(&id) {
            return Err(CatalogError::Duplicate {
                table,
                id: name(id),
            });
        }
    }
    Ok(())
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    /// Reference balance
    pub fn standard() -> Self {
        let material = |id, name: &str, strength, cost| MaterialSpec {
            id,
            name: name.to_string(),
            strength,
            cost,
        };
        let shape = |id, name: &str, strength_bonus| ShapeSpec {
            id,
            name: name.to_string(),
            strength_bonus,
        };
        let load = |id, name: &str, weight, traversal_speed| LoadSpec {
            id,
            name: name.to_string(),
            weight,
            traversal_speed,
        };

        Self {
            materials: [
                material(Material::Wood, "Wood", 1.0, 500),
                material(Material::Stone, "Stone", 2.0, 800),
                material(Material::Concrete, "Concrete", 3.0, 1200),
                material(Material::Steel, "Steel", 5.0, 2000),
            ],
            shapes: [
                shape(Shape::Straight, "Straight", 0.0),
                shape(Shape::Triangle, "Triangle", 1.5),
                shape(Shape::Arch, "Arch", 2.0),
                shape(Shape::IBeam, "I-Beam", 3.0),
            ],
            loads: [
                load(Load::Person, "Person", 1.0, 2.0),
                load(Load::Car, "Car", 3.0, 3.0),
                load(Load::Truck, "Truck", 5.0, 2.5),
                load(Load::Bus, "Bus", 7.0, 2.0),
                load(Load::Tank, "Tank", 10.0, 1.5),
            ],
        }
    }

    /// Build a catalog from explicit tables. Entries are re-ordered by id so
    /// lookups stay a direct index. Every id must appear once, and costs,
    /// weights and speeds must be positive.
    pub fn new(
        mut materials: [MaterialSpec; 4],
        mut shapes: [ShapeSpec; 4],
        mut loads: [LoadSpec; 5],
    ) -> Result<Self, CatalogError> {
        require_unique("material", &materials.each_ref().map(|m| m.id), |id| id.as_str())?;
        require_unique("shape", &shapes.each_ref().map(|s| s.id), |id| id.as_str())?;
        require_unique("load", &loads.each_ref().map(|l| l.id), |id| id.as_str())?;
        for m in &materials {
            require_positive(m.id.as_str(), "cost", m.cost as f32)?;
        }
        for l in &loads {
            require_positive(l.id.as_str(), "weight", l.weight)?;
            require_positive(l.id.as_str(), "traversal_speed", l.traversal_speed)?;
        }

        materials.sort_by_key(|m| m.id.index());
        shapes.sort_by_key(|s| s.id.index());
        loads.sort_by_key(|l| l.id.index());
        Ok(Self {
            materials,
            shapes,
            loads,
        })
    }

    pub fn material(&self, id: Material) -> &MaterialSpec {
        &self.materials[id.index()]
    }

    pub fn shape(&self, id: Shape) -> &ShapeSpec {
        &self.shapes[id.index()]
    }

    pub fn load(&self, id: Load) -> &LoadSpec {
        &self.loads[id.index()]
    }

    pub fn materials(&self) -> &[MaterialSpec] {
        &self.materials
    }

    pub fn shapes(&self) -> &[ShapeSpec] {
        &self.shapes
    }

    pub fn loads(&self) -> &[LoadSpec] {
        &self.loads
    }

    /// Strength one segment contributes to the bridge
    pub fn effective_strength(&self, material: Material, shape: Shape) -> f32 {
        self.material(material).strength + self.shape(shape).strength_bonus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tables_are_monotonic() {
        let catalog = Catalog::standard();
        for pair in catalog.materials().windows(2) {
            assert!(pair[0].strength < pair[1].strength);
            assert!(pair[0].cost < pair[1].cost);
        }
        for pair in catalog.loads().windows(2) {
            assert!(pair[0].weight < pair[1].weight);
        }
    }

    #[test]
    fn test_effective_strength() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.effective_strength(Material::Wood, Shape::Straight), 1.0);
        assert_eq!(catalog.effective_strength(Material::Stone, Shape::Triangle), 3.5);
        assert_eq!(catalog.effective_strength(Material::Steel, Shape::IBeam), 8.0);
    }

    #[test]
    fn test_new_reorders_by_id() {
        let reference = Catalog::standard();
        let mut materials = reference.materials.clone();
        materials.reverse();
        let catalog =
            Catalog::new(materials, reference.shapes.clone(), reference.loads.clone()).unwrap();
        assert_eq!(catalog.material(Material::Wood).cost, 500);
        assert_eq!(catalog.material(Material::Steel).cost, 2000);
    }

    #[test]
    fn test_ids_round_trip_through_strings() {
        assert_eq!(Material::from_str("Steel"), Some(Material::Steel));
        assert_eq!(Shape::from_str("ibeam"), Some(Shape::IBeam));
        assert_eq!(Load::from_str("tank"), Some(Load::Tank));
        assert_eq!(Load::from_str("boat"), None);
    }

    #[test]
    fn test_load_progression() {
        assert_eq!(Load::Person.next(), Some(Load::Car));
        assert_eq!(Load::Tank.next(), None);
    }

    #[test]
    fn test_catalog_from_json() {
        let json = serde_json::to_string(&Catalog::standard()).unwrap();
        assert!(json.contains("\"ibeam\""));
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Catalog::standard());
    }

    fn standard_json() -> serde_json::Value {
        serde_json::to_value(Catalog::standard()).unwrap()
    }

    #[test]
    fn test_reordered_json_still_looks_up_by_id() {
        let mut json = standard_json();
        for table in ["materials", "shapes", "loads"] {
            json[table].as_array_mut().unwrap().reverse();
        }
        let catalog: Catalog = serde_json::from_value(json).unwrap();
        assert_eq!(catalog, Catalog::standard());
        assert_eq!(catalog.material(Material::Wood).id, Material::Wood);
        assert_eq!(catalog.material(Material::Wood).cost, 500);
        assert_eq!(catalog.shape(Shape::IBeam).strength_bonus, 3.0);
        assert_eq!(catalog.load(Load::Person).weight, 1.0);
    }

    #[test]
    fn test_json_with_duplicate_id_is_rejected() {
        let mut json = standard_json();
        json["materials"][3]["id"] = "wood".into();
        let err = serde_json::from_value::<Catalog>(json).unwrap_err();
        assert!(err.to_string().contains("material table lists wood more than once"));
    }

    #[test]
    fn test_non_positive_values_are_rejected() {
        let reference = Catalog::standard();

        let mut loads = reference.loads.clone();
        loads[2].traversal_speed = 0.0;
        let err = Catalog::new(reference.materials.clone(), reference.shapes.clone(), loads)
            .unwrap_err();
        assert_eq!(
            err,
            CatalogError::NotPositive {
                id: "truck",
                field: "traversal_speed",
                value: 0.0
            }
        );

        let mut materials = reference.materials.clone();
        materials[0].cost = 0;
        assert!(matches!(
            Catalog::new(materials, reference.shapes.clone(), reference.loads.clone()),
            Err(CatalogError::NotPositive { field: "cost", .. })
        ));

        let mut json = standard_json();
        json["loads"][0]["weight"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<Catalog>(json).is_err());
    }
}
