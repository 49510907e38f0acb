//! Retail search links shown under each recommendation.

/// Search pages for one title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseLinks {
    pub amazon: String,
    pub flipkart: String,
}

/// Build the two search URLs; only spaces are rewritten (to `+`)
pub fn purchase_links(title: &str) -> PurchaseLinks {
    let query = title.replace(' ', "+");
    PurchaseLinks {
        amazon: format!("https://www.amazon.in/s?k={}", query),
        flipkart: format!("https://www.flipkart.com/search?q={}", query),
    }
}
