use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{require_id, require_quantity, require_text, FieldErrors, FieldKind, FieldMeta, Form, REQUIRED};
use crate::money::Quantity;

name_form!(
    /// A class of products, e.g. cakes or tea.
    CategoryForm,
    "category",
    "Cakes"
);

name_form!(
    /// How a product is counted, e.g. pieces or kilograms.
    UnitForm,
    "unit",
    "kg"
);

#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
#[serde(default)]
pub struct ProductForm {
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub name: String,
    pub category: Option<i64>,
    pub unit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanProduct {
    pub name: String,
    pub category_id: i64,
    pub unit_id: i64,
}

impl Form for ProductForm {
    const NAME: &'static str = "product";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("name", "Name", FieldKind::Text).with_placeholder("Brownie"),
        FieldMeta::required("category", "Category", FieldKind::Choice),
        FieldMeta::required("unit", "Unit", FieldKind::Choice),
    ];
    type Cleaned = CleanProduct;

    fn clean(&self) -> Result<CleanProduct, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(e) => FieldErrors::from(e),
        };
        require_text(&mut errors, "name", &self.name);
        let category_id = require_id(&mut errors, "category", self.category);
        let unit_id = require_id(&mut errors, "unit", self.unit);

        match (category_id, unit_id) {
            (Some(category_id), Some(unit_id)) if errors.is_empty() => Ok(CleanProduct {
                name: self.name.trim().to_owned(),
                category_id,
                unit_id,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct FullProductForm {
    pub product: Option<i64>,
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanFullProduct {
    pub product_id: i64,
    pub amount: Quantity,
}

impl Form for FullProductForm {
    const NAME: &'static str = "full_product";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("product", "Product", FieldKind::Choice),
        FieldMeta::required("amount", "Quantity", FieldKind::Quantity),
    ];
    type Cleaned = CleanFullProduct;

    fn clean(&self) -> Result<CleanFullProduct, FieldErrors> {
        let mut errors = FieldErrors::default();
        let product_id = require_id(&mut errors, "product", self.product);
        let amount = require_quantity(&mut errors, "amount", self.amount);
        match (product_id, amount) {
            (Some(product_id), Some(amount)) => Ok(CleanFullProduct { product_id, amount }),
            _ => Err(errors),
        }
    }
}

/// Stock count: one quantity per product, at least one product.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ReportForm {
    pub full_products: Vec<FullProductForm>,
}

impl Form for ReportForm {
    const NAME: &'static str = "report";
    const FIELDS: &'static [FieldMeta] = &[FieldMeta::required(
        "full_products",
        "Products",
        FieldKind::Collection,
    )];
    type Cleaned = Vec<CleanFullProduct>;

    fn clean(&self) -> Result<Vec<CleanFullProduct>, FieldErrors> {
        clean_entries(self.full_products.iter().enumerate())
    }
}

fn clean_entries<'a>(
    entries: impl Iterator<Item = (usize, &'a FullProductForm)>,
) -> Result<Vec<CleanFullProduct>, FieldErrors> {
    let mut errors = FieldErrors::default();
    let mut cleaned = Vec::new();
    let mut seen = HashSet::new();
    for (index, entry) in entries {
        match entry.clean() {
            Ok(entry) => {
                if !seen.insert(entry.product_id) {
                    errors.add("full_products", "Report should not contain two same products.");
                }
                cleaned.push(entry);
            }
            Err(e) => errors.merge_prefixed(&format!("full_products.{}", index), e),
        }
    }
    if cleaned.is_empty() && errors.is_empty() {
        errors.add("full_products", "Report must contain at least one product.");
    }

    errors.finish(|| cleaned)
}

/// A stock count filled in from a stencil sheet. Sheet lines left without an
/// amount are skipped; at least one line must be filled.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(default)]
pub struct StencilReportForm {
    pub full_products: Vec<FullProductForm>,
}

impl Form for StencilReportForm {
    const NAME: &'static str = "stencil_report";
    const FIELDS: &'static [FieldMeta] = &[FieldMeta::required(
        "full_products",
        "Products",
        FieldKind::Collection,
    )];
    type Cleaned = Vec<CleanFullProduct>;

    fn clean(&self) -> Result<Vec<CleanFullProduct>, FieldErrors> {
        clean_entries(
            self.full_products
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.amount.is_some()),
        )
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, Validate)]
#[serde(default)]
pub struct StencilForm {
    #[validate(length(max = 100, message = "Ensure this value has at most 100 characters."))]
    pub name: String,
    #[validate(length(max = 500, message = "Ensure this value has at most 500 characters."))]
    pub description: Option<String>,
    pub categories: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanStencil {
    pub name: String,
    pub description: Option<String>,
    pub category_ids: Vec<i64>,
}

impl Form for StencilForm {
    const NAME: &'static str = "stencil";
    const FIELDS: &'static [FieldMeta] = &[
        FieldMeta::required("name", "Name", FieldKind::Text),
        FieldMeta::optional("description", "Description", FieldKind::LongText),
        FieldMeta::required("categories", "Categories", FieldKind::MultipleChoice),
    ];
    type Cleaned = CleanStencil;

    fn clean(&self) -> Result<CleanStencil, FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::default(),
            Err(e) => FieldErrors::from(e),
        };
        let name = self.name.trim();
        if name.is_empty() {
            errors.add("name", "Stencil name is not valid.");
        }
        if self.categories.is_empty() {
            errors.add("categories", REQUIRED);
        }

        let mut seen = HashSet::new();
        let category_ids = self
            .categories
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        errors.finish(|| CleanStencil {
            name: name.to_owned(),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_owned),
            category_ids,
        })
    }
}
