use std::fmt::Write;

use crate::models::{ListOrder, StockRecord};
use crate::routes::stocks::MOUNT_PATH;

pub struct ListView<'a> {
    pub stocks: &'a [StockRecord],
    pub order: ListOrder,
    pub query: Option<&'a str>,
    pub toast: Option<&'a str>,
}

pub fn render_list(view: &ListView<'_>) -> String {
    let mut body = String::new();

    if let Some(toast) = view.toast.filter(|t| !t.trim().is_empty()) {
        let _ = write!(body, r#"<p class="toast">{}</p>"#, escape(toast));
    }

    let _ = write!(
        body,
        r#"<form method="get" action="{m}/list">
<input type="text" name="q" value="{q}" placeholder="code or name">
<input type="hidden" name="mode" value="{mode}">
<button type="submit">Search</button>
</form>
<p><a href="{m}/list?mode=name">By name</a> | <a href="{m}/list?mode=inserted">By insertion</a> | <a href="{m}/new">New stock</a></p>
"#,
        m = MOUNT_PATH,
        q = escape(view.query.unwrap_or_default()),
        mode = view.order.as_mode(),
    );

    body.push_str("<table>\n<tr><th>ID</th><th>Code</th><th>Name</th><th>PBR</th><th>PER</th><th>Created</th><th></th></tr>\n");
    for stock in view.stocks {
        let code = escape(&stock.stock_code);
        let _ = write!(
            body,
            r#"<tr><td>{id}</td><td>{code}</td><td>{name}</td><td>{pbr}</td><td>{per}</td><td>{created}</td><td><a href="{m}/edit?code={code_param}">Edit</a> <form method="post" action="{m}/delete"><input type="hidden" name="code" value="{code}"><button type="submit">Delete</button></form></td></tr>
"#,
            id = stock.id,
            name = escape(stock.stock_name.as_deref().unwrap_or_default()),
            pbr = metric(stock.pbr),
            per = metric(stock.per),
            created = stock.create_date_text(),
            m = MOUNT_PATH,
            code_param = url_encode(&stock.stock_code),
        );
    }
    body.push_str("</table>");

    page("Stocks", &body)
}

/// Create form when `prefill` is `None`, update form otherwise.
pub fn render_form(prefill: Option<&StockRecord>) -> String {
    let (action, title) = match prefill {
        Some(_) => ("update", "Edit stock"),
        None => ("create", "New stock"),
    };

    let mut body = String::new();
    let _ = writeln!(body, r#"<form method="post" action="{}/{}">"#, MOUNT_PATH, action);
    if let Some(stock) = prefill {
        let _ = writeln!(body, r#"<input type="hidden" name="id" value="{}">"#, stock.id);
    }

    let fields = [
        ("stockCode", "Code", prefill.map(|s| escape(&s.stock_code)).unwrap_or_default()),
        (
            "stockName",
            "Name",
            prefill
                .and_then(|s| s.stock_name.as_deref())
                .map(escape)
                .unwrap_or_default(),
        ),
        ("pbr", "PBR", prefill.and_then(|s| s.pbr).map(|v| v.to_string()).unwrap_or_default()),
        ("per", "PER", prefill.and_then(|s| s.per).map(|v| v.to_string()).unwrap_or_default()),
    ];
    for (name, label, value) in fields {
        let _ = writeln!(
            body,
            r#"<label>{label} <input type="text" name="{name}" value="{value}"></label><br>"#
        );
    }
    let _ = write!(
        body,
        r#"<button type="submit">Save</button>
</form>
<p><a href="{}/list">Back to list</a></p>"#,
        MOUNT_PATH
    );

    page(title, &body)
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<h1>{title}</h1>\n{body}\n</body>\n</html>\n"
    )
}

fn metric(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".into())
}

fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
