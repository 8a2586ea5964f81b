// 🏷️ Label Catalog - closed category set + hardcoded training examples
//
// The catalog is data, not logic: 8 categories, 10 example messages each.
// It is only read once, to build the training set for the classifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// CATEGORY
// ============================================================================

/// Spending category assigned to a transaction message.
///
/// Declaration order is significant: it is the classifier's label order and
/// the tie-break order for frequency charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Food,
    Bills,
    Shopping,
    Travel,
    Rent,
    Income,
    Entertainment,
    Others,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Bills,
        Category::Shopping,
        Category::Travel,
        Category::Rent,
        Category::Income,
        Category::Entertainment,
        Category::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Bills => "Bills",
            Category::Shopping => "Shopping",
            Category::Travel => "Travel",
            Category::Rent => "Rent",
            Category::Income => "Income",
            Category::Entertainment => "Entertainment",
            Category::Others => "Others",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0:?}")]
pub struct ParseCategoryError(pub String);

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

// ============================================================================
// TRAINING EXAMPLES
// ============================================================================

/// One labeled message used to fit the classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingExample {
    pub text: String,
    pub category: Category,
}

impl TrainingExample {
    pub fn new(text: impl Into<String>, category: Category) -> Self {
        TrainingExample {
            text: text.into(),
            category,
        }
    }
}

const FOOD: [&str; 10] = [
    "INR 250 spent at Domino's",
    "INR 1500 spent at BigBasket",
    "INR 300 spent at Zomato",
    "INR 450 spent at Swiggy",
    "INR 200 spent at McDonald's",
    "INR 1200 spent at Grofers",
    "INR 800 spent at Amazon Pantry",
    "INR 350 spent at KFC",
    "INR 600 spent at Barista",
    "INR 1000 spent at Starbucks",
];

const BILLS: [&str; 10] = [
    "INR 1200 paid for electricity bill",
    "INR 500 paid for mobile recharge",
    "INR 800 paid for DTH recharge",
    "INR 1500 paid for broadband bill",
    "INR 2000 paid for gas cylinder",
    "INR 1000 paid for water bill",
    "INR 1500 paid for landline bill",
    "INR 1200 paid for insurance premium",
    "INR 800 paid for credit card bill",
    "INR 2000 paid for loan EMI",
];

const SHOPPING: [&str; 10] = [
    "INR 5000 spent at Flipkart",
    "INR 3000 spent at Myntra",
    "INR 1500 spent at Ajio",
    "INR 2000 spent at Snapdeal",
    "INR 1000 spent at Tata CLiQ",
    "INR 2500 spent at Croma",
    "INR 1200 spent at Shoppers Stop",
    "INR 1800 spent at Reliance Digital",
    "INR 2200 spent at Decathlon",
    "INR 1500 spent at Lifestyle",
];

const TRAVEL: [&str; 10] = [
    "INR 500 spent on Uber ride",
    "INR 1500 spent on Ola ride",
    "INR 3000 spent on train ticket",
    "INR 5000 spent on flight booking",
    "INR 2000 spent on hotel booking",
    "INR 800 spent on bus ticket",
    "INR 1000 spent on metro card recharge",
    "INR 1500 spent on car rental",
    "INR 2500 spent on travel insurance",
    "INR 1200 spent on taxi fare",
];

const RENT: [&str; 10] = [
    "INR 15000 paid for monthly rent",
    "INR 2000 paid for society maintenance",
    "INR 5000 paid for house cleaning",
    "INR 1000 paid for parking charges",
    "INR 3000 paid for electricity bill (rented house)",
    "INR 2000 paid for water charges",
    "INR 1500 paid for internet charges",
    "INR 1000 paid for security charges",
    "INR 2500 paid for repair charges",
    "INR 1200 paid for garbage collection",
];

const INCOME: [&str; 10] = [
    "INR 50000 credited as salary",
    "INR 2000 credited as freelance payment",
    "INR 10000 credited as bonus",
    "INR 15000 credited as part-time job payment",
    "INR 3000 credited as cashback",
    "INR 5000 credited as gift money",
    "INR 2000 credited as rent income",
    "INR 1000 credited as investment return",
    "INR 1500 credited as refund",
    "INR 2500 credited as affiliate income",
];

const ENTERTAINMENT: [&str; 10] = [
    "INR 500 spent on movie tickets",
    "INR 1000 spent on Netflix subscription",
    "INR 800 spent on Amazon Prime subscription",
    "INR 600 spent on Spotify subscription",
    "INR 1500 spent on gaming",
    "INR 1200 spent on concert tickets",
    "INR 2000 spent on event tickets",
    "INR 1000 spent on amusement park",
    "INR 800 spent on clubbing",
    "INR 1500 spent on sports event",
];

const OTHERS: [&str; 10] = [
    "INR 500 spent on education",
    "INR 1000 spent on healthcare",
    "INR 2000 spent on gifts",
    "INR 800 spent on charity",
    "INR 1500 spent on pet care",
    "INR 1200 spent on home improvement",
    "INR 1000 spent on personal care",
    "INR 2000 spent on subscriptions",
    "INR 1500 spent on hobbies",
    "INR 1200 spent on miscellaneous",
];

fn examples_for(category: Category) -> &'static [&'static str] {
    match category {
        Category::Food => &FOOD,
        Category::Bills => &BILLS,
        Category::Shopping => &SHOPPING,
        Category::Travel => &TRAVEL,
        Category::Rent => &RENT,
        Category::Income => &INCOME,
        Category::Entertainment => &ENTERTAINMENT,
        Category::Others => &OTHERS,
    }
}

/// The built-in training set: 80 raw messages, 10 per category,
/// in category declaration order.
pub fn label_catalog() -> Vec<TrainingExample> {
    Category::ALL
        .iter()
        .flat_map(|&category| {
            examples_for(category)
                .iter()
                .map(move |text| TrainingExample::new(*text, category))
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_has_ten_examples_per_category() {
        let catalog = label_catalog();
        assert_eq!(catalog.len(), 80);

        for category in Category::ALL {
            let count = catalog.iter().filter(|e| e.category == category).count();
            assert_eq!(count, 10, "{} should have 10 examples", category);
        }
    }

    #[test]
    fn test_catalog_is_grouped_in_declaration_order() {
        let catalog = label_catalog();
        assert_eq!(catalog[0].text, "INR 250 spent at Domino's");
        assert_eq!(catalog[0].category, Category::Food);
        assert_eq!(catalog[79].category, Category::Others);
    }

    #[test]
    fn test_category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
            assert_eq!(category.to_string(), category.as_str());
        }
    }

    #[test]
    fn test_unknown_category_is_rejected() {
        let err = "Groceries".parse::<Category>().unwrap_err();
        assert_eq!(err, ParseCategoryError("Groceries".to_string()));
        assert!("food".parse::<Category>().is_err());
    }
}
