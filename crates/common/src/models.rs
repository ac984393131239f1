//! Request and response bodies for the checkout API.
//!
//! Field declaration order is the serialized key order, which is also the
//! order the signature covers.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub discount_id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub discount_type: DiscountType,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub sku: String,
    pub price: f64,
    pub quantity: u32,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub discounts: Vec<Discount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartInformation {
    pub line_items: Vec<LineItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingAddress {
    pub same_as_shipping: bool,
    #[serde(flatten)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Renewal {
    pub original_purchase_date: String,
    pub original_transaction_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutConfiguration {
    pub success_return_url: String,
    pub failure_return_url: String,
    pub allow_user_discount_codes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_order_id: Option<String>,
}

/// Cart and customer details submitted to `/checkout` and
/// `/calculate-tax-estimate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart_information: CartInformation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_discounts: Vec<Discount>,
    pub shipping_address: Address,
    pub billing_address: BillingAddress,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal: Option<Renewal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_client_id: Option<String>,
    pub configuration: CheckoutConfiguration,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantOfRecord {
    #[serde(default)]
    pub customer_id: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Older API versions report `orderId`, newer ones `paymentId`.
    #[serde(default, alias = "paymentId")]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemTotal {
    pub sku: String,
    #[serde(default)]
    pub tax: Option<f64>,
    #[serde(default)]
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Financials {
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub total_discount: Option<f64>,
    #[serde(default, alias = "totalTaxCharged")]
    pub total_tax: Option<f64>,
    #[serde(default)]
    pub line_item_totals: Vec<LineItemTotal>,
}

/// Body returned by the status and tax-estimate endpoints.
///
/// Every section is optional; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutStatus {
    #[serde(default)]
    pub status: Option<StatusMessage>,
    #[serde(default)]
    pub merchant_of_record: Option<MerchantOfRecord>,
    #[serde(default)]
    pub financials: Option<Financials>,
}

/// A fully populated cart useful for trying the API end to end.
#[must_use]
pub fn sample_checkout_request() -> CheckoutRequest {
    CheckoutRequest {
        cart_information: CartInformation {
            line_items: vec![LineItem {
                sku: "PROD-001".into(),
                price: 29.99,
                quantity: 2,
                description: "Premium Widget".into(),
                discounts: vec![Discount {
                    discount_id: "DISC-001".into(),
                    description: "10% off".into(),
                    discount_type: DiscountType::Percentage,
                    value: 10.0,
                }],
            }],
        },
        order_discounts: vec![Discount {
            discount_id: "ORDER-DISC-001".into(),
            description: "Order discount".into(),
            discount_type: DiscountType::Fixed,
            value: 5.0,
        }],
        shipping_address: Address {
            first_name: "John".into(),
            last_name: "Doe".into(),
            address_line1: "123 Main St".into(),
            address_line2: Some("Apt 4B".into()),
            city: "New York".into(),
            state: "NY".into(),
            postal_code: "10001".into(),
            country: "US".into(),
            phone: Some("+1-555-123-4567".into()),
        },
        billing_address: BillingAddress {
            same_as_shipping: false,
            address: Some(Address {
                first_name: "John".into(),
                last_name: "Doe".into(),
                address_line1: "456 Oak Ave".into(),
                address_line2: Some("Suite 100".into()),
                city: "New York".into(),
                state: "NY".into(),
                postal_code: "10002".into(),
                country: "US".into(),
                phone: Some("+1-555-987-6543".into()),
            }),
        },
        email: "john.doe@example.com".into(),
        renewal: Some(Renewal {
            original_purchase_date: "2023-01-15".into(),
            original_transaction_id: "TXN-12345".into(),
        }),
        existing_client_id: Some("CLIENT-789".into()),
        configuration: CheckoutConfiguration {
            success_return_url: "https://example-partner.com/success".into(),
            failure_return_url: "https://example-partner.com/failure".into(),
            allow_user_discount_codes: true,
            external_order_id: Some("ORD-2024-123456".into()),
        },
    }
}
