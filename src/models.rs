use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ============================================================================
// Catalogue Models
// ============================================================================
//
// The bouquet is a plain value object: it validates on construction, prices
// itself with `estimate()` and `Clone` produces an independent deep copy.
// Orders keep their own snapshot, so later edits to the customer's working
// bouquet never reach a placed order.
//
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BouquetError {
    #[error("Bouquet name cannot be empty")]
    EmptyName,

    #[error("Bouquet must contain at least one flower")]
    NoFlowers,

    #[error("Invalid flower in bouquet: {0}")]
    InvalidFlower(String),

    #[error("Flower quantity must be greater than 0")]
    InvalidQuantity,

    #[error("Invalid wrapping configuration")]
    InvalidWrapping,

    #[error("Invalid ribbon configuration")]
    InvalidRibbon,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Flower {
    pub kind: String,
    pub color: String,
    pub unit_price: f64,
}

impl Flower {
    pub fn new(kind: impl Into<String>, color: impl Into<String>, unit_price: f64) -> Self {
        Self {
            kind: kind.into(),
            color: color.into(),
            unit_price,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FlowerLine {
    pub flower: Flower,
    pub qty: u32,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WrappingKind {
    Paper,
    Satin,
    Transparent,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Wrapping {
    pub kind: WrappingKind,
    pub color: String,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RibbonMaterial {
    Silk,
    Satin,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Ribbon {
    pub material: RibbonMaterial,
    pub color: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Bouquet {
    pub name: String,
    pub items: Vec<FlowerLine>,
    pub wrapping: Wrapping,
    pub ribbon: Ribbon,
    pub card_message: String,
}

impl Bouquet {
    pub fn new(
        name: impl Into<String>,
        items: Vec<FlowerLine>,
        wrapping: Wrapping,
        ribbon: Ribbon,
        card_message: impl Into<String>,
    ) -> Result<Self, BouquetError> {
        let bouquet = Self {
            name: name.into(),
            items,
            wrapping,
            ribbon,
            card_message: card_message.into(),
        };
        bouquet.validate()?;
        Ok(bouquet)
    }

    fn validate(&self) -> Result<(), BouquetError> {
        if self.name.trim().is_empty() {
            return Err(BouquetError::EmptyName);
        }

        if self.items.is_empty() {
            return Err(BouquetError::NoFlowers);
        }

        for line in &self.items {
            if line.flower.kind.trim().is_empty() || !line.flower.unit_price.is_finite() {
                return Err(BouquetError::InvalidFlower(line.flower.kind.clone()));
            }
            if line.qty == 0 {
                return Err(BouquetError::InvalidQuantity);
            }
        }

        if self.wrapping.color.trim().is_empty() {
            return Err(BouquetError::InvalidWrapping);
        }

        if self.ribbon.color.trim().is_empty() {
            return Err(BouquetError::InvalidRibbon);
        }

        Ok(())
    }

    fn flowers_cost(&self) -> f64 {
        self.items
            .iter()
            .map(|line| line.flower.unit_price * f64::from(line.qty))
            .sum()
    }

    fn wrapping_cost(&self) -> f64 {
        match self.wrapping.kind {
            WrappingKind::Satin => 4.0,
            WrappingKind::Transparent => 2.0,
            WrappingKind::Paper => 1.5,
        }
    }

    fn ribbon_cost(&self) -> f64 {
        match self.ribbon.material {
            RibbonMaterial::Silk => 3.0,
            RibbonMaterial::Satin => 2.0,
        }
    }

    /// Total price in EUR: flowers plus wrapping plus ribbon
    pub fn estimate(&self) -> f64 {
        self.flowers_cost() + self.wrapping_cost() + self.ribbon_cost()
    }

    pub fn total_flowers(&self) -> u32 {
        self.items.iter().map(|line| line.qty).sum()
    }

    pub fn unique_flower_kinds(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.items
            .iter()
            .filter(|line| seen.insert(line.flower.kind.clone()))
            .map(|line| line.flower.kind.clone())
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} flowers ({})",
            self.name,
            self.total_flowers(),
            self.unique_flower_kinds().join(", ")
        )
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Ten red roses, satin wrapping, silk ribbon: 35.00 + 4.00 + 3.00
    pub fn red_roses() -> Bouquet {
        Bouquet::new(
            "Red Romance",
            vec![FlowerLine {
                flower: Flower::new("Rose", "Red", 3.5),
                qty: 10,
            }],
            Wrapping {
                kind: WrappingKind::Satin,
                color: "Pink".to_string(),
            },
            Ribbon {
                material: RibbonMaterial::Silk,
                color: "Red".to_string(),
            },
            "Happy anniversary",
        )
        .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate() {
        let bouquet = fixtures::red_roses();
        assert!((bouquet.estimate() - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = fixtures::red_roses();
        let mut working = original.clone();
        working.name = "Edited".to_string();
        working.items[0].qty = 1;

        assert_eq!(original.name, "Red Romance");
        assert_eq!(original.items[0].qty, 10);
    }

    #[test]
    fn test_validation() {
        let result = Bouquet::new(
            "",
            vec![],
            Wrapping {
                kind: WrappingKind::Paper,
                color: "White".to_string(),
            },
            Ribbon {
                material: RibbonMaterial::Satin,
                color: "Gold".to_string(),
            },
            "",
        );
        assert_eq!(result.unwrap_err(), BouquetError::EmptyName);

        let result = Bouquet::new(
            "Empty",
            vec![FlowerLine {
                flower: Flower::new("Tulip", "Yellow", 2.0),
                qty: 0,
            }],
            Wrapping {
                kind: WrappingKind::Paper,
                color: "White".to_string(),
            },
            Ribbon {
                material: RibbonMaterial::Satin,
                color: "Gold".to_string(),
            },
            "",
        );
        assert_eq!(result.unwrap_err(), BouquetError::InvalidQuantity);
    }

    #[test]
    fn test_summary() {
        let mut bouquet = fixtures::red_roses();
        bouquet.items.push(FlowerLine {
            flower: Flower::new("Lily", "White", 4.0),
            qty: 3,
        });
        bouquet.items.push(FlowerLine {
            flower: Flower::new("Rose", "White", 3.0),
            qty: 2,
        });

        assert_eq!(bouquet.total_flowers(), 15);
        assert_eq!(bouquet.summary(), "Red Romance: 15 flowers (Rose, Lily)");
    }
}
