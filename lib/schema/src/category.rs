//! Categorical answer fields and their closed sets of levels
//!
//! Every categorical field owns an ordered level table. The first entry is
//! the baseline: the level the model sees as "all indicator columns zero".

use serde::{Deserialize, Serialize};

const SEX: &[&str] = &["Female", "Male"];
const YES_NO: &[&str] = &["No", "Yes"];
const PHONE_LINES: &[&str] = &["No", "No phone service", "Yes"];
const INTERNET: &[&str] = &["DSL", "Fiber optic", "No"];
const ADD_ON: &[&str] = &["No", "No internet service", "Yes"];
const CONTRACT: &[&str] = &["Month-to-month", "One year", "Two year"];
const PAYMENT: &[&str] = &[
    "Bank transfer (automatic)",
    "Credit card (automatic)",
    "Electronic check",
    "Mailed check",
];

/// A categorical answer field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "gender")]
    Gender,
    Partner,
    Dependents,
    PhoneService,
    MultipleLines,
    InternetService,
    OnlineSecurity,
    OnlineBackup,
    DeviceProtection,
    TechSupport,
    StreamingTV,
    StreamingMovies,
    Contract,
    PaperlessBilling,
    PaymentMethod,
}

impl Category {
    pub const COUNT: usize = 15;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Gender,
        Category::Partner,
        Category::Dependents,
        Category::PhoneService,
        Category::MultipleLines,
        Category::InternetService,
        Category::OnlineSecurity,
        Category::OnlineBackup,
        Category::DeviceProtection,
        Category::TechSupport,
        Category::StreamingTV,
        Category::StreamingMovies,
        Category::Contract,
        Category::PaperlessBilling,
        Category::PaymentMethod,
    ];

    /// Answer field name, as submitted by clients
    pub const fn field(self) -> &'static str {
        match self {
            Category::Gender => "gender",
            Category::Partner => "Partner",
            Category::Dependents => "Dependents",
            Category::PhoneService => "PhoneService",
            Category::MultipleLines => "MultipleLines",
            Category::InternetService => "InternetService",
            Category::OnlineSecurity => "OnlineSecurity",
            Category::OnlineBackup => "OnlineBackup",
            Category::DeviceProtection => "DeviceProtection",
            Category::TechSupport => "TechSupport",
            Category::StreamingTV => "StreamingTV",
            Category::StreamingMovies => "StreamingMovies",
            Category::Contract => "Contract",
            Category::PaperlessBilling => "PaperlessBilling",
            Category::PaymentMethod => "PaymentMethod",
        }
    }

    /// Ordered level labels; index 0 is the baseline
    pub const fn levels(self) -> &'static [&'static str] {
        match self {
            Category::Gender => SEX,
            Category::Partner
            | Category::Dependents
            | Category::PhoneService
            | Category::PaperlessBilling => YES_NO,
            Category::MultipleLines => PHONE_LINES,
            Category::InternetService => INTERNET,
            Category::OnlineSecurity
            | Category::OnlineBackup
            | Category::DeviceProtection
            | Category::TechSupport
            | Category::StreamingTV
            | Category::StreamingMovies => ADD_ON,
            Category::Contract => CONTRACT,
            Category::PaymentMethod => PAYMENT,
        }
    }

    /// Alternate spellings accepted for a level, as `(label, index)`
    const fn aliases(self) -> &'static [(&'static str, u8)] {
        match self {
            Category::PaymentMethod => &[("Bank transfer", 0)],
            _ => &[],
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn baseline(self) -> Level {
        Level { category: self, index: 0 }
    }

    /// Look up a level by its exact label
    pub fn resolve(self, label: &str) -> Option<Level> {
        let index = self
            .levels()
            .iter()
            .position(|l| *l == label)
            .map(|i| i as u8)
            .or_else(|| {
                self.aliases()
                    .iter()
                    .find(|(alias, _)| *alias == label)
                    .map(|(_, i)| *i)
            })?;
        Some(Level { category: self, index })
    }

    /// Find the category for an answer field name
    pub fn from_field(name: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.field() == name)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

/// One level of a category, referenced by its position in the level table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Level {
    category: Category,
    index: u8,
}

impl Level {
    /// Returns `None` when `index` is outside the category's level table
    pub fn new(category: Category, index: u8) -> Option<Self> {
        ((index as usize) < category.levels().len()).then_some(Self { category, index })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn label(&self) -> &'static str {
        self.category.levels()[self.index as usize]
    }

    pub fn is_baseline(&self) -> bool {
        self.index == 0
    }
}
