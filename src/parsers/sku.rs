const LABEL_SEPARATORS: [char; 2] = [':', '：'];

/// Strip whitespace and a leading label such as `SKU：` from a scraped SKU.
///
/// An empty result means the SKU was not found.
pub fn clean_sku(sku_text: &str) -> String {
    let sku = sku_text.trim();
    match sku.rsplit(&LABEL_SEPARATORS[..]).next() {
        Some(value) => value.trim().to_string(),
        None => String::new(),
    }
}

/// Canonical form used for SKU equality.
pub fn normalize_sku(sku: &str) -> String {
    sku.trim().to_uppercase()
}
