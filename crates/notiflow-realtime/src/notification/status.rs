//! Order status code to display text.

/// Display text for an order status code.
///
/// Unknown codes pass through unchanged.
pub fn status_text(code: &str) -> &str {
    match code {
        "pending" => "đang chờ xử lý",
        "confirmed" => "đã xác nhận",
        "shipped" => "đang giao hàng",
        "delivered" => "đã giao hàng",
        "cancelled" => "đã hủy",
        other => other,
    }
}
