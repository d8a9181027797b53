//! Column names recognised by the cleaning pipeline.
//!
//! Every column is optional. Stages look columns up by these names and skip
//! any that are absent from the input table.

pub const ORDER_ID: &str = "order_id";
pub const CUSTOMER_ID: &str = "customer_id";
pub const ORDER_DATE: &str = "order_date";
pub const TOTAL_AMOUNT: &str = "total_amount";
pub const QUANTITY: &str = "quantity";
pub const UNIT_PRICE: &str = "unit_price";
pub const CUSTOMER_AGE: &str = "customer_age";
pub const CUSTOMER_EMAIL: &str = "customer_email";
pub const CUSTOMER_PHONE: &str = "customer_phone";
pub const PRODUCT_CATEGORY: &str = "product_category";
pub const CUSTOMER_GENDER: &str = "customer_gender";
pub const PAYMENT_METHOD: &str = "payment_method";

// Derived
pub const ORDER_YEAR: &str = "order_year";
pub const ORDER_MONTH: &str = "order_month";
pub const ORDER_DAY: &str = "order_day";
pub const ORDER_WEEKDAY: &str = "order_weekday";
pub const ORDER_QUARTER: &str = "order_quarter";
pub const AGE_GROUP: &str = "age_group";
pub const REVENUE_PER_ITEM: &str = "revenue_per_item";

/// Columns whose missingness excludes a row.
pub const CRITICAL_COLUMNS: [&str; 4] = [ORDER_ID, CUSTOMER_ID, ORDER_DATE, TOTAL_AMOUNT];

/// Columns coerced to numbers before imputation and filtering.
pub const NUMERIC_COLUMNS: [&str; 4] = [CUSTOMER_AGE, TOTAL_AMOUNT, QUANTITY, UNIT_PRICE];

/// Columns that must be strictly positive, checked in this order.
pub const POSITIVE_COLUMNS: [&str; 3] = [QUANTITY, UNIT_PRICE, TOTAL_AMOUNT];

/// Free-text categorical columns normalised to title case.
pub const TITLE_CASE_COLUMNS: [&str; 2] = [PRODUCT_CATEGORY, PAYMENT_METHOD];
