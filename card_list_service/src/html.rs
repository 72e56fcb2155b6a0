//! Printable HTML page for a stored card list

use crate::models::CardList;

const PAGE_STYLE: &str = "
    body { font-family: Arial, sans-serif; margin: 0; padding: 20px; }
    h1 { color: #333; }
    table { width: 100%; border-collapse: collapse; }
    th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
    th { background-color: #f2f2f2; }
    td.num { text-align: right; }
    .share { margin-top: 16px; font-size: 0.9em; color: #555; word-break: break-all; }
    @media print { .share { color: #000; } }
";

/// Escape text for use inside HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Render a list as a printable page with name, set, quantity and price
pub fn render_card_list_page(list: &CardList, share_url: &str) -> String {
    let rows: String = list
        .items
        .iter()
        .map(|item| {
            format!(
                "<tr><td>{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">${:.2}</td></tr>\n",
                escape_html(&item.name),
                escape_html(&item.set_code),
                item.quantity,
                item.price
            )
        })
        .collect();

    let title = escape_html(&list.name);
    let share_url = escape_html(share_url);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{style}</style>
</head>
<body>
    <h1>{title}</h1>
    <table>
        <tr><th>Name</th><th>Set</th><th>Quantity</th><th>Price</th></tr>
{rows}        <tr><th colspan="2">Total</th><th class="num">{quantity}</th><th class="num">${total:.2}</th></tr>
    </table>
    <p class="share">Shared list: <a href="{share_url}">{share_url}</a></p>
</body>
</html>
"#,
        title = title,
        style = PAGE_STYLE,
        rows = rows,
        quantity = list.total_quantity(),
        total = list.total_price(),
        share_url = share_url,
    )
}

/// Page shown for an unknown list id
pub fn render_not_found_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Card list not found</title><style>{}</style></head>
<body><h1>Card list not found</h1></body>
</html>
"#,
        PAGE_STYLE
    )
}
