use serde_json::Value;

use crate::domain::record::{Fields, RecordError, cell, render_scalar};
use crate::domain::row::Row;
use crate::domain::types::{ProductId, VariantId};

/// A purchasable configuration of a [`crate::domain::product::Product`].
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub title: String,
    pub option1: Option<String>,
    pub option2: Option<String>,
    pub option3: Option<String>,
    pub sku: Option<String>,
    pub requires_shipping: Option<bool>,
    pub taxable: Option<bool>,
    pub featured_image_src: Option<String>,
    pub available: Option<bool>,
    pub price: String,
    pub grams: String,
    pub compare_at_price: String,
    pub position: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Variant {
    /// Parses one element of a product's `variants` array.
    ///
    /// The variant must reference `parent`, the product it is nested under.
    pub fn from_value(value: &Value, parent: ProductId) -> Result<Self, RecordError> {
        let fields = Fields::new("variant", value)?;
        let product_id: ProductId = fields.id("product_id")?;
        if product_id != parent {
            return Err(RecordError::InvalidField {
                entity: "variant",
                field: "product_id",
                reason: format!("references product {product_id}, nested under {parent}"),
            });
        }

        Ok(Self {
            id: fields.id("id")?,
            product_id,
            title: fields.scalar("title")?,
            option1: fields.text("option1")?,
            option2: fields.text("option2")?,
            option3: fields.text("option3")?,
            sku: fields.text("sku")?,
            requires_shipping: fields.flag("requires_shipping")?,
            taxable: fields.flag("taxable")?,
            featured_image_src: featured_image_src(&fields),
            available: fields.flag("available")?,
            price: fields.scalar("price")?,
            grams: fields.scalar("grams")?,
            compare_at_price: fields.scalar("compare_at_price")?,
            position: fields.scalar("position")?,
            created_at: fields.text("created_at")?,
            updated_at: fields.text("updated_at")?,
        })
    }

    /// Projects the variant into a variants-dataset row.
    pub fn to_row(&self) -> Row {
        Row::new(vec![
            self.id.to_string(),
            self.title.clone(),
            cell(&self.option1),
            cell(&self.option2),
            cell(&self.option3),
            cell(&self.sku),
            cell(&self.requires_shipping),
            cell(&self.taxable),
            cell(&self.featured_image_src),
            cell(&self.available),
            self.price.clone(),
            self.grams.clone(),
            self.compare_at_price.clone(),
            self.position.clone(),
            self.product_id.to_string(),
            cell(&self.created_at),
            cell(&self.updated_at),
        ])
    }
}

/// `featured_image.src` when the image object is present, otherwise `None`.
fn featured_image_src(fields: &Fields<'_>) -> Option<String> {
    fields
        .optional("featured_image")
        .and_then(|image| image.get("src"))
        .and_then(render_scalar)
        .filter(|src| !src.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parent() -> ProductId {
        ProductId::new(101).unwrap()
    }

    fn sample_variant() -> Value {
        json!({
            "id": 9001,
            "title": "250g",
            "option1": "250g",
            "option2": null,
            "option3": null,
            "sku": "HE-250",
            "requires_shipping": true,
            "taxable": false,
            "available": true,
            "price": "9.50",
            "grams": 250,
            "compare_at_price": null,
            "position": 1,
            "product_id": 101,
            "created_at": "2024-02-28T20:15:00+00:00",
            "updated_at": "2024-03-02T10:00:00+00:00"
        })
    }

    #[test]
    fn absent_featured_image_maps_to_empty_cell() {
        let variant = Variant::from_value(&sample_variant(), parent()).unwrap();
        assert_eq!(variant.featured_image_src, None);
        assert_eq!(variant.to_row().get(8), "");
    }

    #[test]
    fn extracts_nested_featured_image_src() {
        let mut value = sample_variant();
        value["featured_image"] = json!({ "id": 5, "src": "https://cdn.example.com/x.jpg" });
        let row = Variant::from_value(&value, parent()).unwrap().to_row();
        assert_eq!(row.get(8), "https://cdn.example.com/x.jpg");
    }

    #[test]
    fn renders_row_in_column_order() {
        let row = Variant::from_value(&sample_variant(), parent())
            .unwrap()
            .to_row();
        assert_eq!(
            row.cells(),
            [
                "9001",
                "250g",
                "250g",
                "",
                "",
                "HE-250",
                "true",
                "false",
                "",
                "true",
                "9.50",
                "250",
                "",
                "1",
                "101",
                "2024-02-28T20:15:00+00:00",
                "2024-03-02T10:00:00+00:00",
            ]
        );
    }

    #[test]
    fn rejects_variant_of_another_product() {
        let mut value = sample_variant();
        value["product_id"] = json!(202);
        let err = Variant::from_value(&value, parent()).unwrap_err();
        assert!(matches!(
            err,
            RecordError::InvalidField {
                field: "product_id",
                ..
            }
        ));
    }

    #[test]
    fn missing_flag_is_reported() {
        let mut value = sample_variant();
        value.as_object_mut().unwrap().remove("taxable");
        assert_eq!(
            Variant::from_value(&value, parent()).unwrap_err(),
            RecordError::MissingField {
                entity: "variant",
                field: "taxable"
            }
        );
    }
}
