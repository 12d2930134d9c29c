//! Flat rows and tables shared by the CSV store and the spreadsheet sync.

/// Column order of the products dataset.
pub const PRODUCT_COLUMNS: [&str; 10] = [
    "id",
    "title",
    "handle",
    "body_html",
    "published_at",
    "created_at",
    "updated_at",
    "vendor",
    "product_type",
    "tags",
];

/// Column order of the variants dataset.
pub const VARIANT_COLUMNS: [&str; 17] = [
    "id",
    "title",
    "option1",
    "option2",
    "option3",
    "sku",
    "requires_shipping",
    "taxable",
    "featured_image_src",
    "available",
    "price",
    "grams",
    "compare_at_price",
    "position",
    "product_id",
    "created_at",
    "updated_at",
];

/// One record of a dataset, cells in column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cell value at `index`, empty when out of range.
    pub fn get(&self, index: usize) -> &str {
        self.0.get(index).map(String::as_str).unwrap_or("")
    }
}

impl From<Vec<String>> for Row {
    fn from(cells: Vec<String>) -> Self {
        Self(cells)
    }
}

impl From<Row> for Vec<String> {
    fn from(row: Row) -> Self {
        row.0
    }
}

/// A header plus its data rows, as loaded from a dataset file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows }
    }

    /// Number of data rows, header excluded.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Appends a column, filling each row through `value_for`.
    pub fn push_column<F>(&mut self, name: &str, mut value_for: F)
    where
        F: FnMut(&Row) -> String,
    {
        for row in &mut self.rows {
            let value = value_for(row);
            row.0.push(value);
        }
        self.headers.push(name.to_string());
    }

    /// Rewrites every cell of the named column in place.
    ///
    /// Returns `false` when the column does not exist.
    pub fn map_column<F>(&mut self, name: &str, mut map: F) -> bool
    where
        F: FnMut(&str) -> String,
    {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            if let Some(cell) = row.0.get_mut(index) {
                *cell = map(cell);
            }
        }
        true
    }

    /// Header followed by the data rows, as a grid of cell values.
    pub fn to_values(&self) -> Vec<Vec<String>> {
        std::iter::once(self.headers.clone())
            .chain(self.rows.iter().map(|row| row.0.clone()))
            .collect()
    }
}
