use serde_json::Value;

use crate::domain::record::{Fields, RecordError, cell};
use crate::domain::row::Row;
use crate::domain::types::ProductId;
use crate::domain::variant::Variant;
use crate::html::clean_html;

/// A product parsed from a storefront feed.
///
/// Only the attributes written to the products dataset are retained. The
/// description is stored already stripped of markup.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub handle: String,
    pub body_text: String,
    pub published_at: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub vendor: String,
    pub product_type: String,
    pub tags: Vec<String>,
    pub variants: Vec<Variant>,
}

impl Product {
    /// Validating parse of one element of the feed's `products` array.
    pub fn from_value(value: &Value) -> Result<Self, RecordError> {
        let fields = Fields::new("product", value)?;
        let id: ProductId = fields.id("id")?;
        let body_html = fields.text("body_html")?;

        let variants = fields
            .array("variants")?
            .iter()
            .map(|variant| Variant::from_value(variant, id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            title: fields.scalar("title")?,
            handle: fields.scalar("handle")?,
            body_text: clean_html(body_html.as_deref()),
            published_at: fields.text("published_at")?,
            created_at: fields.text("created_at")?,
            updated_at: fields.text("updated_at")?,
            vendor: fields.scalar("vendor")?,
            product_type: fields.scalar("product_type")?,
            tags: fields.strings("tags")?,
            variants,
        })
    }

    /// Tags in the joined form stored in the dataset.
    pub fn joined_tags(&self) -> String {
        self.tags.join(", ")
    }

    /// Projects the product into a products-dataset row.
    pub fn to_row(&self) -> Row {
        Row::new(vec![
            self.id.to_string(),
            self.title.clone(),
            self.handle.clone(),
            self.body_text.clone(),
            cell(&self.published_at),
            cell(&self.created_at),
            cell(&self.updated_at),
            self.vendor.clone(),
            self.product_type.clone(),
            self.joined_tags(),
        ])
    }

    /// Projects every variant into a variants-dataset row.
    pub fn variant_rows(&self) -> Vec<Row> {
        self.variants.iter().map(Variant::to_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::{PRODUCT_COLUMNS, VARIANT_COLUMNS};
    use serde_json::json;

    fn sample_product() -> Value {
        json!({
            "id": 101,
            "title": "House Espresso",
            "handle": "house-espresso",
            "body_html": "<p>Hello <b>World</b></p>",
            "published_at": "2024-03-01T09:00:00+00:00",
            "created_at": "2024-02-28T20:15:00+00:00",
            "updated_at": "2024-03-02T10:00:00+00:00",
            "vendor": "Roastery",
            "product_type": "Coffee",
            "tags": ["a", "b", "c"],
            "variants": [
                {
                    "id": 9001,
                    "title": "250g / Whole Bean",
                    "option1": "250g",
                    "option2": "Whole Bean",
                    "option3": null,
                    "sku": "HE-250-WB",
                    "requires_shipping": true,
                    "taxable": false,
                    "featured_image": { "src": "https://cdn.example.com/he.jpg" },
                    "available": true,
                    "price": "9.50",
                    "grams": 250,
                    "compare_at_price": null,
                    "position": 1,
                    "product_id": 101,
                    "created_at": "2024-02-28T20:15:00+00:00",
                    "updated_at": "2024-03-02T10:00:00+00:00"
                },
                {
                    "id": 9002,
                    "title": "1kg / Ground",
                    "option1": "1kg",
                    "option2": "Ground",
                    "option3": null,
                    "sku": "",
                    "requires_shipping": true,
                    "taxable": true,
                    "featured_image": null,
                    "available": false,
                    "price": "32.00",
                    "grams": 1000,
                    "compare_at_price": "36.00",
                    "position": 2,
                    "product_id": 101,
                    "created_at": "2024-02-28T20:15:00+00:00",
                    "updated_at": "2024-03-02T10:00:00+00:00"
                }
            ]
        })
    }

    #[test]
    fn maps_product_row_in_column_order() {
        let product = Product::from_value(&sample_product()).unwrap();
        let row = product.to_row();

        assert_eq!(row.len(), PRODUCT_COLUMNS.len());
        assert_eq!(
            row.cells(),
            [
                "101",
                "House Espresso",
                "house-espresso",
                "Hello World",
                "2024-03-01T09:00:00+00:00",
                "2024-02-28T20:15:00+00:00",
                "2024-03-02T10:00:00+00:00",
                "Roastery",
                "Coffee",
                "a, b, c",
            ]
        );
    }

    #[test]
    fn emits_one_variant_row_per_variant() {
        let product = Product::from_value(&sample_product()).unwrap();
        let rows = product.variant_rows();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.len() == VARIANT_COLUMNS.len()));
    }

    #[test]
    fn product_without_variants_yields_no_rows() {
        let mut value = sample_product();
        value["variants"] = json!([]);
        let product = Product::from_value(&value).unwrap();
        assert!(product.variant_rows().is_empty());
    }

    #[test]
    fn missing_key_is_a_typed_error() {
        let mut value = sample_product();
        value.as_object_mut().unwrap().remove("handle");
        assert_eq!(
            Product::from_value(&value).unwrap_err(),
            RecordError::MissingField {
                entity: "product",
                field: "handle"
            }
        );
    }

    #[test]
    fn null_optional_fields_map_to_empty_cells() {
        let mut value = sample_product();
        value["body_html"] = Value::Null;
        value["published_at"] = Value::Null;
        value["vendor"] = Value::Null;
        let row = Product::from_value(&value).unwrap().to_row();
        assert_eq!(row.get(3), "");
        assert_eq!(row.get(4), "");
        assert_eq!(row.get(7), "");
    }

    #[test]
    fn empty_tag_list_joins_to_empty_string() {
        let mut value = sample_product();
        value["tags"] = json!([]);
        let product = Product::from_value(&value).unwrap();
        assert_eq!(product.joined_tags(), "");
    }
}
