use crate::domain::decimal::{format_money, lenient_f64, lenient_opt_f64};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MaterialCategory {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl MaterialCategory {
    pub fn display_type(&self) -> &'static str {
        category_type_label(self.category_type.as_deref())
    }
}

pub fn category_type_label(category_type: Option<&str>) -> &'static str {
    match category_type {
        None => "Sin categoría",
        Some("construction") => "Construcción",
        Some("lighting") => "Iluminación",
        Some("electrical") => "Eléctrico",
        Some("plumbing") => "Plomería",
        Some("finishes") => "Acabados",
        Some(_) => "Otros",
    }
}

const DEFAULT_WASTE_FACTOR: f64 = 0.10;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Material {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    /// Present on detail responses only.
    #[serde(default)]
    pub category: Option<MaterialCategory>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub category_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub reference_price: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub yield_per_unit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub waste_factor: Option<f64>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub finish: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub coverage_per_liter: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub density: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub power_per_meter: Option<f64>,
    #[serde(default)]
    pub wire_gauge: Option<String>,
}

impl Material {
    pub fn display_name(&self) -> String {
        let mut name = self.name.clone();
        if let Some(brand) = self.brand.as_deref().filter(|b| !b.is_empty()) {
            name.push_str(" - ");
            name.push_str(brand);
        }
        if let Some(color) = self.color.as_deref().filter(|c| !c.is_empty()) {
            name.push_str(&format!(" ({})", color));
        }
        name
    }

    pub fn formatted_price(&self) -> String {
        match self.reference_price {
            Some(price) => format!(
                "{}/{}",
                format_money(price),
                self.unit.as_deref().unwrap_or("unidad")
            ),
            None => "Precio no disponible".to_string(),
        }
    }

    pub fn waste(&self) -> f64 {
        self.waste_factor.unwrap_or(DEFAULT_WASTE_FACTOR)
    }

    pub fn price_with_waste(&self, base_price: f64) -> f64 {
        base_price * (1.0 + self.waste())
    }

    /// Units needed to cover `area_or_length` with `layers` passes, waste
    /// included, rounded up to two decimals. `None` without a yield.
    pub fn quantity_needed(&self, area_or_length: f64, layers: Option<u32>) -> Option<f64> {
        let yield_per_unit = self.yield_per_unit.filter(|y| *y > 0.0)?;
        let layers = f64::from(layers.unwrap_or(1));
        let base = area_or_length * layers / yield_per_unit;
        let with_waste = base * (1.0 + self.waste());
        Some((with_waste * 100.0).ceil() / 100.0)
    }

    pub fn category_type(&self) -> &str {
        self.category_type
            .as_deref()
            .or_else(|| self.category.as_ref().and_then(|c| c.category_type.as_deref()))
            .unwrap_or("unknown")
    }

    pub fn is_construction(&self) -> bool {
        self.category_type() == "construction"
    }

    pub fn is_lighting(&self) -> bool {
        self.category_type() == "lighting"
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialFilters {
    pub search: Option<String>,
    pub category: Option<i64>,
    pub unit: Option<String>,
    pub category_type: Option<String>,
}

impl MaterialFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(category) = self.category {
            query.push(("category", category.to_string()));
        }
        if let Some(unit) = &self.unit {
            query.push(("unit", unit.clone()));
        }
        if let Some(category_type) = &self.category_type {
            query.push(("category_type", category_type.clone()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Supplier {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub commercial_name: Option<String>,
    #[serde(default)]
    pub supplier_type: Option<String>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub whatsapp_number: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub is_preferred: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Supplier {
    pub fn display_name(&self) -> &str {
        self.commercial_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.name)
    }

    pub fn whatsapp_url(&self) -> Option<String> {
        let number = self
            .whatsapp_number
            .as_deref()
            .filter(|n| !n.is_empty())
            .or_else(|| self.phone.as_deref().filter(|p| !p.is_empty()))?;
        let digits: String = number.chars().filter(char::is_ascii_digit).collect();
        if digits.is_empty() {
            return None;
        }
        Some(format!("https://wa.me/{}", digits))
    }

    pub fn full_address(&self) -> String {
        let mut full = String::new();
        if let Some(address) = self.address.as_deref().filter(|a| !a.is_empty()) {
            full.push_str(address);
        }
        if let Some(city) = self.city.as_deref().filter(|c| !c.is_empty()) {
            if !full.is_empty() {
                full.push_str(", ");
            }
            full.push_str(city);
        }
        if let Some(zone) = self.zone.as_deref().filter(|z| !z.is_empty()) {
            if !full.is_empty() {
                full.push_str(" - ");
            }
            full.push_str(zone);
        }
        full
    }

    pub fn preferred(&self) -> bool {
        self.is_preferred.unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplierFilters {
    pub search: Option<String>,
    pub supplier_type: Option<String>,
    pub city: Option<String>,
    pub is_preferred: Option<bool>,
    pub is_active: Option<bool>,
}

impl SupplierFilters {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(supplier_type) = &self.supplier_type {
            query.push(("supplier_type", supplier_type.clone()));
        }
        if let Some(city) = &self.city {
            query.push(("city", city.clone()));
        }
        if let Some(preferred) = self.is_preferred {
            query.push(("is_preferred", preferred.to_string()));
        }
        if let Some(active) = self.is_active {
            query.push(("is_active", active.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SupplierGroup {
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
}

/// `suppliers/by_category/` answers with a plain listing when filtered and a
/// map of supplier type to group otherwise.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SupplierListing {
    Paged(crate::domain::page::Page<Supplier>),
    Grouped(std::collections::BTreeMap<String, SupplierGroup>),
}

impl SupplierListing {
    pub fn into_suppliers(self) -> Vec<Supplier> {
        match self {
            SupplierListing::Paged(page) => page.into_results(),
            SupplierListing::Grouped(groups) => groups
                .into_values()
                .flat_map(|group| group.suppliers)
                .collect(),
        }
    }
}

/// The `supplier` column of a price row is an id on the plain listing and
/// a nested object on the enriched one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SupplierRef {
    Id(i64),
    Nested(Box<Supplier>),
}

impl SupplierRef {
    pub fn id(&self) -> i64 {
        match self {
            SupplierRef::Id(id) => *id,
            SupplierRef::Nested(supplier) => supplier.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SupplierPrice {
    #[serde(default)]
    pub id: Option<i64>,
    pub supplier: SupplierRef,
    #[serde(default)]
    pub supplier_name: Option<String>,
    #[serde(default)]
    pub material: Option<i64>,
    #[serde(default)]
    pub material_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub discount_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt_f64")]
    pub final_price: Option<f64>,
    #[serde(default)]
    pub is_current: Option<bool>,
}

/// A supplier offer for a given material, ready for comparison.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SupplierWithPrice {
    pub supplier_id: i64,
    pub supplier_name: String,
    pub commercial_name: Option<String>,
    pub price: f64,
    pub currency: String,
    pub discount_percentage: f64,
    pub delivery_time: String,
    pub rating: f64,
    pub is_preferred: bool,
    pub location: String,
    pub phone: String,
    pub whatsapp_url: String,
}

impl SupplierWithPrice {
    pub fn from_supplier(supplier: &Supplier, price: f64, currency: &str, discount: f64) -> Self {
        Self {
            supplier_id: supplier.id,
            supplier_name: supplier.name.clone(),
            commercial_name: supplier.commercial_name.clone(),
            price,
            currency: currency.to_string(),
            discount_percentage: discount,
            delivery_time: supplier
                .delivery_time
                .clone()
                .unwrap_or_else(|| "No especificado".to_string()),
            rating: supplier.rating.unwrap_or(0.0),
            is_preferred: supplier.preferred(),
            location: supplier.city.clone().unwrap_or_default(),
            phone: supplier.phone.clone().unwrap_or_default(),
            whatsapp_url: supplier.whatsapp_url().unwrap_or_default(),
        }
    }

    /// Only rows that embed the supplier can be turned into an offer.
    pub fn from_price_row(row: &SupplierPrice) -> Option<Self> {
        match &row.supplier {
            SupplierRef::Nested(supplier) => Some(Self::from_supplier(
                supplier,
                row.price,
                row.currency.as_deref().unwrap_or("USD"),
                row.discount_percentage.unwrap_or(0.0),
            )),
            SupplierRef::Id(_) => None,
        }
    }

    pub fn display_name(&self) -> &str {
        self.commercial_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.supplier_name)
    }

    pub fn final_price(&self) -> f64 {
        crate::core::pricing::supplier_final_price(self.price, self.discount_percentage)
    }

    pub fn formatted_price(&self) -> String {
        format_money(self.final_price())
    }

    pub fn has_discount(&self) -> bool {
        self.discount_percentage > 0.0
    }

    pub fn discount_text(&self) -> String {
        if self.has_discount() {
            format!("{:.0}% descuento", self.discount_percentage)
        } else {
            String::new()
        }
    }

    pub fn rating_stars(&self) -> String {
        "⭐".repeat(self.rating.round().max(0.0) as usize)
    }
}

impl std::fmt::Display for SupplierWithPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.display_name(),
            self.formatted_price(),
            self.delivery_time
        )
    }
}
