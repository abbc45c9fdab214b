//! CSV export handlers.
//!
//! Exports share the listing filters but are never paginated; the CSV is
//! built in memory and returned with a download filename.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::IntoResponse,
};
use tracing::instrument;

use crate::db::{OrderFilter, OrderRepository, RefundFilter, RefundRepository, UserRepository};
use crate::error::Result;
use crate::middleware::RequireBackOffice;
use crate::routes::{orders, refunds};
use crate::state::AppState;

/// GET /exports/orders.csv
#[instrument(skip(state, _admin))]
pub async fn orders_csv(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Query(query): Query<orders::ListQuery>,
) -> Result<impl IntoResponse> {
    let rows = OrderRepository::new(state.pool())
        .list_all(&OrderFilter::from(&query))
        .await?;

    let mut csv = csv_row(&[
        "order_number",
        "email",
        "status",
        "payment_status",
        "subtotal",
        "shipping",
        "total",
        "created_at",
    ]);
    for order in &rows {
        csv.push_str(&csv_row(&[
            &order.order_number,
            &order.email,
            &order.status.to_string(),
            &order.payment_status.to_string(),
            &order.subtotal.display(),
            &order.shipping.display(),
            &order.total.display(),
            &order.created_at.to_rfc3339(),
        ]));
    }

    Ok(csv_response("orders.csv", csv))
}

/// GET /exports/refunds.csv
#[instrument(skip(state, _admin))]
pub async fn refunds_csv(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
    Query(query): Query<refunds::ListQuery>,
) -> Result<impl IntoResponse> {
    let rows = RefundRepository::new(state.pool())
        .list_all(&RefundFilter::from(&query))
        .await?;

    let mut csv = csv_row(&["id", "order_id", "amount", "status", "reason", "created_at"]);
    for refund in &rows {
        csv.push_str(&csv_row(&[
            &refund.id.to_string(),
            &refund.order_id.to_string(),
            &refund.amount.display(),
            &refund.status.to_string(),
            refund.reason.as_deref().unwrap_or(""),
            &refund.created_at.to_rfc3339(),
        ]));
    }

    Ok(csv_response("refunds.csv", csv))
}

/// GET /exports/users.csv
#[instrument(skip(state, _admin))]
pub async fn users_csv(
    State(state): State<AppState>,
    RequireBackOffice(_admin): RequireBackOffice,
) -> Result<impl IntoResponse> {
    let rows = UserRepository::new(state.pool()).list_all().await?;

    let mut csv = csv_row(&["id", "email", "role", "created_at"]);
    for user in &rows {
        csv.push_str(&csv_row(&[
            &user.id.to_string(),
            user.email.as_str(),
            &user.role.to_string(),
            &user.created_at.to_rfc3339(),
        ]));
    }

    Ok(csv_response("users.csv", csv))
}

/// Build one CSV row with a trailing newline.
fn csv_row(fields: &[&str]) -> String {
    let mut row = fields
        .iter()
        .map(|f| escape_csv(f))
        .collect::<Vec<_>>()
        .join(",");
    row.push('\n');
    row
}

/// Quote a field when it contains a delimiter, quote, or newline.
fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn csv_response(filename: &str, body: String) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    if let Ok(disposition) =
        HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
    {
        headers.insert(header::CONTENT_DISPOSITION, disposition);
    }
    (headers, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_csv_passthrough() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("₹1499.00"), "₹1499.00");
    }

    #[test]
    fn test_escape_csv_quotes_delimiters() {
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("line\nbreak"), "\"line\nbreak\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_row_layout() {
        assert_eq!(csv_row(&["a", "b,c", "d"]), "a,\"b,c\",d\n");
    }
}
