//! Cart submission and order lookup commands.

use std::fs;
use std::path::Path;

use mor_checkout_common::client::CheckoutClient;
use mor_checkout_common::dispatch::ApiResponse;
use mor_checkout_common::models::{sample_checkout_request, CheckoutRequest, CheckoutStatus};
use mor_checkout_common::settings::Settings;

use crate::error::CliError;

/// Which identifier a status lookup uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderRef {
    Mor(String),
    External(String),
}

/// Reads a cart from `file`, or falls back to the sample cart.
pub(crate) fn load_cart(file: Option<&Path>) -> Result<CheckoutRequest, CliError> {
    match file {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let cart = serde_json::from_str(&content)?;
            log::debug!("Loaded cart from {}", path.display());
            Ok(cart)
        }
        None => {
            log::info!("No cart file given, using the sample cart");
            Ok(sample_checkout_request())
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Renders the outcome of a checkout submission.
pub(crate) fn render_checkout(response: &ApiResponse) -> Vec<String> {
    match response {
        ApiResponse::Redirect { status, location } => {
            let mut lines = vec![format!("Received redirect (HTTP {status})")];
            match location {
                Some(url) => {
                    lines.push(format!("Redirect the customer to: {url}"));
                    lines.push(
                        "After payment the customer returns to your success or failure URL \
                         with mor_order_id and external_order_id parameters."
                            .to_string(),
                    );
                }
                None => lines.push("The redirect carried no Location header".to_string()),
            }
            lines
        }
        ApiResponse::Json { status, data } if response.is_success() => {
            vec![format!("API Response (Status: {status}):"), pretty(data)]
        }
        ApiResponse::Json { status, data } => {
            vec![
                format!("Checkout failed with status: {status}"),
                format!("Response: {}", pretty(data)),
            ]
        }
    }
}

/// Renders a status lookup: a field summary on success, "not found" on 404,
/// otherwise the raw answer.
pub(crate) fn render_status(response: &ApiResponse) -> Vec<String> {
    match response {
        ApiResponse::Json { status: 404, .. } => vec!["Order not found".to_string()],
        ApiResponse::Json { status, data } if response.is_success() => {
            match serde_json::from_value::<CheckoutStatus>(data.clone()) {
                Ok(order) => summarize(&order),
                Err(e) => {
                    log::debug!("Status body did not match the expected shape: {e}");
                    vec![format!("Order status (HTTP {status}):"), pretty(data)]
                }
            }
        }
        ApiResponse::Json { status, data } => vec![
            format!("Status check failed with code: {status}"),
            pretty(data),
        ],
        ApiResponse::Redirect { status, location } => vec![format!(
            "Unexpected redirect (HTTP {status}) to {}",
            location.as_deref().unwrap_or("<none>")
        )],
    }
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("${v:.2}"))
}

fn summarize(order: &CheckoutStatus) -> Vec<String> {
    let mut lines = vec!["Order Status Retrieved Successfully!".to_string()];

    if let Some(message) = order.status.as_ref().and_then(|s| s.message.as_deref()) {
        lines.push(format!("Status: {message}"));
    }

    if let Some(mor) = &order.merchant_of_record {
        let field = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
        lines.push(format!("Customer ID: {}", field(&mor.customer_id)));
        lines.push(format!("Transaction ID: {}", field(&mor.transaction_id)));
        lines.push(format!("Order ID: {}", field(&mor.order_id)));
    }

    if let Some(financials) = &order.financials {
        lines.push(format!("Total Amount: {}", money(financials.total_amount)));
        lines.push(format!("Total Discount: {}", money(financials.total_discount)));
        lines.push(format!("Total Tax: {}", money(financials.total_tax)));
        for item in &financials.line_item_totals {
            lines.push(format!(
                "  {}: tax {}, total {}",
                item.sku,
                money(item.tax),
                money(item.total)
            ));
        }
    }

    lines
}

/// Renders a tax estimate as its financials block.
pub(crate) fn render_tax_estimate(response: &ApiResponse) -> Vec<String> {
    match response {
        ApiResponse::Json { data, .. } if response.is_success() => {
            match serde_json::from_value::<CheckoutStatus>(data.clone()) {
                Ok(CheckoutStatus {
                    financials: Some(financials),
                    ..
                }) => {
                    let mut lines = vec![
                        format!("Total Amount: {}", money(financials.total_amount)),
                        format!("Total Discount: {}", money(financials.total_discount)),
                        format!("Total Tax: {}", money(financials.total_tax)),
                    ];
                    for item in &financials.line_item_totals {
                        lines.push(format!("  {}: tax {}", item.sku, money(item.tax)));
                    }
                    lines
                }
                _ => vec!["Tax estimate:".to_string(), pretty(data)],
            }
        }
        ApiResponse::Json { status, data } => vec![
            format!("Tax estimate failed with status: {status}"),
            pretty(data),
        ],
        ApiResponse::Redirect { status, location } => vec![format!(
            "Unexpected redirect (HTTP {status}) to {}",
            location.as_deref().unwrap_or("<none>")
        )],
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

pub fn checkout(settings: &Settings, file: Option<&Path>) -> Result<(), CliError> {
    let cart = load_cart(file)?;
    let client = CheckoutClient::from_settings(settings);

    println!("Processing checkout...");
    let response = client.checkout(&cart)?;
    print_lines(&render_checkout(&response));
    Ok(())
}

pub fn status(settings: &Settings, order: &OrderRef) -> Result<(), CliError> {
    let client = CheckoutClient::from_settings(settings);
    let response = match order {
        OrderRef::Mor(id) => {
            println!("Checking status for MOR order: {id}");
            client.checkout_status(id)?
        }
        OrderRef::External(id) => {
            println!("Checking status for external order: {id}");
            client.checkout_status_by_external_id(id)?
        }
    };
    print_lines(&render_status(&response));
    Ok(())
}

pub fn tax_estimate(settings: &Settings, file: Option<&Path>) -> Result<(), CliError> {
    let cart = load_cart(file)?;
    let client = CheckoutClient::from_settings(settings);
    let response = client.calculate_tax_estimate(&cart)?;
    print_lines(&render_tax_estimate(&response));
    Ok(())
}

pub fn sample() -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&sample_checkout_request())?;
    println!("{json}");
    Ok(())
}
